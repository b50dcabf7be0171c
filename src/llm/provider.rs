use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, warn};
use crate::config::GeminiConfig;
use crate::governor::RateGovernor;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// LLM client whose every outbound call passes through the rate governor
pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    governor: Arc<RateGovernor>,
    permission_timeout: Duration,
}

impl LLM {
    pub fn new(
        adapter: Box<dyn LLMAdapter>,
        governor: Arc<RateGovernor>,
        permission_timeout: Duration,
    ) -> Self {
        Self {
            adapter,
            governor,
            permission_timeout,
        }
    }

    /// Gemini-backed client built from configuration
    pub fn gemini(
        config: &GeminiConfig,
        governor: Arc<RateGovernor>,
        permission_timeout: Duration,
    ) -> AppResult<Self> {
        let adapter = crate::llm::google::GoogleAdapter::with_base_url(&config.api_key, &config.base_url)
            .with_timeout(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::new(Box::new(adapter), governor, permission_timeout))
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let permit = match timeout(self.permission_timeout, self.governor.await_permission()).await {
            Ok(permit) => permit?,
            Err(_) => {
                warn!(
                    seconds = self.permission_timeout.as_secs(),
                    "Gave up waiting for rate limit permission"
                );
                return Err(AppError::Timeout(format!(
                    "no rate limit permission within {}s",
                    self.permission_timeout.as_secs()
                )));
            }
        };

        // Counted before dispatch: a failed request still spends provider quota
        self.governor.record_call(permit);

        self.adapter
            .create_chat_completion(request)
            .await
            .inspect_err(|e| error!(error = %e, model = %request.model, "Error calling Gemini API"))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::types::TokenUsage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Adapter that answers with fixed text and remembers what it was asked
    #[derive(Default)]
    pub struct ScriptedAdapter {
        pub reply: String,
        pub fail: bool,
        pub calls: Arc<AtomicUsize>,
        pub requests: Arc<Mutex<Vec<LLMRequest>>>,
    }

    impl ScriptedAdapter {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl LLMAdapter for ScriptedAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(AppError::LLMApi("scripted failure".to_string()));
            }
            Ok(LLMResponse {
                content: self.reply.clone(),
                finish_reason: "STOP".to_string(),
                usage: TokenUsage::default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedAdapter;
    use super::*;
    use crate::governor::{GovernorError, RateLimits};
    use crate::types::LLMMessage;
    use std::sync::atomic::Ordering;

    fn request() -> LLMRequest {
        LLMRequest {
            model: "gemini-1.5-flash".to_string(),
            messages: vec![LLMMessage::user("hello")],
            max_tokens: None,
            temperature: None,
            system_instruction: None,
        }
    }

    fn governor(per_minute: usize, per_day: usize) -> Arc<RateGovernor> {
        Arc::new(RateGovernor::new(RateLimits {
            per_minute,
            per_day,
            min_spacing: Duration::ZERO,
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_recorded() {
        let governor = governor(10, 10);
        let llm = LLM::new(
            Box::new(ScriptedAdapter::replying("ok")),
            governor.clone(),
            Duration::from_secs(90),
        );

        let response = llm.create_chat_completion(&request()).await.unwrap();

        assert_eq!(response.content, "ok");
        assert_eq!(governor.status().requests_last_minute, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_calls_still_spend_quota() {
        let governor = governor(10, 10);
        let adapter = ScriptedAdapter {
            fail: true,
            ..Default::default()
        };
        let llm = LLM::new(Box::new(adapter), governor.clone(), Duration::from_secs(90));

        assert!(matches!(
            llm.create_chat_completion(&request()).await,
            Err(AppError::LLMApi(_))
        ));
        assert_eq!(governor.status().requests_last_day, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_exceeded_skips_adapter() {
        let governor = governor(10, 1);
        let adapter = ScriptedAdapter::replying("ok");
        let calls = adapter.calls.clone();
        let llm = LLM::new(Box::new(adapter), governor, Duration::from_secs(90));

        llm.create_chat_completion(&request()).await.unwrap();
        let error = llm.create_chat_completion(&request()).await.unwrap_err();

        assert!(matches!(
            error,
            AppError::QuotaExceeded(GovernorError::QuotaExceeded { limit: 1 })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_timeout_reported_separately() {
        let governor = governor(1, 10);
        let adapter = ScriptedAdapter::replying("ok");
        let calls = adapter.calls.clone();
        let llm = LLM::new(Box::new(adapter), governor.clone(), Duration::from_secs(5));

        llm.create_chat_completion(&request()).await.unwrap();
        let error = llm.create_chat_completion(&request()).await.unwrap_err();

        assert!(matches!(error, AppError::Timeout(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(governor.status().requests_last_day, 1);
    }
}
