// Prompt builders for recommendation content

use crate::models::{ActivityStatus, SkillSnapshot};

pub const SYSTEM_INSTRUCTION: &str = "You are an expert learning advisor and skill development coach specializing in helping developers and professionals grow their careers. Your advice should be:
- Practical and immediately actionable
- Tailored to the user's current situation
- Structured with clear headers and bullet points
- Focused on modern best practices and industry standards
- Encouraging yet realistic about timelines and effort required

Format all responses in clear markdown with headers (##, ###), bullet points, and **bold** emphasis where appropriate.";

/// Most skills a weekly schedule plans for
const SCHEDULE_SKILL_LIMIT: usize = 5;

#[derive(Default)]
struct Prompt {
    text: String,
}

impl Prompt {
    fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
        self
    }

    fn blank(&mut self) -> &mut Self {
        self.text.push('\n');
        self
    }

    fn finish(self) -> String {
        self.text
    }
}

pub fn learning_path(skill: &SkillSnapshot) -> String {
    let mut p = Prompt::default();
    p.line("# Task: Create a Personalized Learning Path")
        .blank()
        .line("## Skill Information:")
        .line(format!("- **Skill Name:** {}", skill.name))
        .line(format!(
            "- **Category:** {}",
            skill.category.as_deref().unwrap_or("General")
        ))
        .line(format!("- **Current Proficiency:** {}/5", skill.proficiency_level))
        .line(format!("- **Target Proficiency:** {}/5", skill.target_level))
        .line(format!("- **Proficiency Gap:** {} levels to improve", skill.gap()));

    if let Some(description) = skill.description.as_deref().filter(|d| !d.is_empty()) {
        p.line(format!("- **Additional Context:** {}", description));
    }

    p.blank()
        .line("## Progress Tracking:")
        .line(format!("- Total activities logged: {}", skill.activities.len()));

    if !skill.activities.is_empty() {
        let completed = skill
            .activities
            .iter()
            .filter(|a| a.status == ActivityStatus::Completed)
            .count();
        let total_minutes: u64 = skill
            .activities
            .iter()
            .map(|a| u64::from(a.duration_minutes))
            .sum();
        p.line(format!("- Completed activities: {}", completed))
            .line(format!(
                "- Total study time invested: {:.1} hours",
                total_minutes as f64 / 60.0
            ));
    }

    p.blank()
        .line("## Required Output:")
        .line("Create a comprehensive, actionable learning path structured as follows:")
        .blank()
        .line("### 1. Learning Roadmap")
        .line("Break down the journey from current level to target level into clear stages.")
        .blank()
        .line("### 2. Topic Breakdown")
        .line("For each stage, list specific topics, concepts, and technologies to master.")
        .blank()
        .line("### 3. Recommended Resources")
        .line("Suggest high-quality courses, books, documentation, tutorials, and video content for each stage.")
        .blank()
        .line("### 4. Practical Projects")
        .line("Propose hands-on projects that will solidify learning and build portfolio pieces.")
        .blank()
        .line("### 5. Timeline Estimation")
        .line("Provide realistic time estimates for each stage based on 5-10 hours per week of dedicated study.")
        .blank()
        .line("### 6. Milestones & Success Criteria")
        .line("Define clear checkpoints to measure progress at each stage.");

    p.finish()
}

/// Skills a weekly schedule should cover: largest gaps first, then highest targets
pub fn prioritize_for_schedule(skills: &[SkillSnapshot]) -> Vec<&SkillSnapshot> {
    let mut ordered: Vec<&SkillSnapshot> = skills.iter().collect();
    ordered.sort_by(|a, b| {
        b.gap()
            .cmp(&a.gap())
            .then_with(|| b.target_level.cmp(&a.target_level))
    });
    ordered.truncate(SCHEDULE_SKILL_LIMIT);
    ordered
}

pub fn weekly_schedule(skills: &[SkillSnapshot]) -> String {
    let mut p = Prompt::default();
    p.line("# Task: Design a Balanced Weekly Study Schedule")
        .blank()
        .line("## Active Skills Requiring Development:");

    for skill in prioritize_for_schedule(skills) {
        p.line(format!(
            "- **{}** ({})",
            skill.name,
            skill.category.as_deref().unwrap_or("General")
        ))
        .line(format!("  - Current Level: {}/5", skill.proficiency_level))
        .line(format!("  - Target Level: {}/5", skill.target_level))
        .line(format!("  - Gap: {} levels", skill.gap()));
    }

    p.blank()
        .line("## Schedule Requirements:")
        .line("- **Total Weekly Hours:** 7-10 hours distributed across the week")
        .line("- **Priority System:** Allocate more time to skills with larger proficiency gaps")
        .line("- **Learning Balance:** Mix of theory, practice, and project work")
        .line("- **Work-Life Balance:** Consider typical work schedules (evenings 7-9 PM on weekdays, flexible weekend blocks)")
        .blank()
        .line("## Required Output:")
        .line("Create a day-by-day schedule with the following structure:")
        .blank()
        .line("### For each day (Monday-Sunday):")
        .line("- Time slot (e.g., 7:00 PM - 8:30 PM)")
        .line("- Skill to focus on")
        .line("- Specific task or activity (e.g., 'Complete React hooks tutorial', 'Build mini-project')")
        .line("- Duration in minutes")
        .blank()
        .line("### Additional Elements:")
        .line("- Include at least one rest day")
        .line("- Suggest short 15-minute review sessions for reinforcement")
        .line("- Recommend one longer weekend session (2-3 hours) for project work");

    p.finish()
}

fn gap_indicator(gap: i32) -> &'static str {
    if gap > 2 {
        "⚠️ Large Gap"
    } else if gap > 0 {
        "→ Growing"
    } else {
        "✓ Target Reached"
    }
}

/// Skills grouped by category, largest group first (ties keep the order the
/// categories first appear in), each group sorted by proficiency descending
pub fn group_by_category(skills: &[SkillSnapshot]) -> Vec<(&str, Vec<&SkillSnapshot>)> {
    let mut groups: Vec<(&str, Vec<&SkillSnapshot>)> = Vec::new();
    for skill in skills {
        let category = skill.category.as_deref().unwrap_or("Uncategorized");
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(skill),
            None => groups.push((category, vec![skill])),
        }
    }

    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    for (_, members) in groups.iter_mut() {
        members.sort_by(|a, b| b.proficiency_level.cmp(&a.proficiency_level));
    }
    groups
}

pub fn skill_gap_analysis(skills: &[SkillSnapshot]) -> String {
    let mut p = Prompt::default();
    p.line("# Task: Comprehensive Skill Gap Analysis")
        .blank()
        .line("## Current Skill Portfolio:");

    for (category, members) in group_by_category(skills) {
        p.blank().line(format!("### {}:", category));
        for skill in members {
            p.line(format!(
                "- **{}**: Level {}/5 → Target: {}/5 ({})",
                skill.name,
                skill.proficiency_level,
                skill.target_level,
                gap_indicator(skill.gap())
            ));
        }
    }

    p.blank()
        .line("## Analysis Requirements:")
        .blank()
        .line("### 1. Skill Distribution Assessment")
        .line("Analyze the balance across different categories. Identify if the developer is:")
        .line("- Well-rounded or specialized")
        .line("- Frontend-heavy, backend-heavy, or full-stack")
        .line("- Lacking in any critical areas")
        .blank()
        .line("### 2. Critical Gaps Identification")
        .line("Highlight the most significant gaps that should be prioritized, considering:")
        .line("- Skills with largest proficiency gaps")
        .line("- Industry demands and market trends")
        .line("- Synergies between existing and missing skills")
        .blank()
        .line("### 3. Complementary Skills Recommendations")
        .line("Suggest 3-5 new skills that would:")
        .line("- Enhance the existing skill set")
        .line("- Fill obvious gaps in the portfolio")
        .line("- Increase marketability and career opportunities")
        .blank()
        .line("### 4. 90-Day Priority Action Plan")
        .line("Recommend specific skills to focus on for the next 3 months, with clear reasoning.")
        .blank()
        .line("### 5. Career Path Alignment")
        .line("Based on the current skills, suggest 2-3 career paths or roles that would be a good fit:")
        .line("- Roles that align well with current strengths")
        .line("- Emerging opportunities that match the skill trajectory")
        .line("- What additional skills would be needed for each path");

    p.finish()
}
