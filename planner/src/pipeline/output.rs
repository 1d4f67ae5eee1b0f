//! Parsing the final task's output into a `ProjectPlan`

use std::sync::OnceLock;

use regex::Regex;

use crate::config::ReferencePolicy;
use crate::error::PlannerError;
use crate::types::ProjectPlan;

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").expect("fenced block regex is valid")
    })
}

/// Extract a JSON object from model output.
///
/// Handles:
/// - ```json fenced blocks, after any non-JSON fenced blocks
/// - Generic ``` fenced blocks
/// - Prose around a bare object (outermost `{` to last `}`, only if it parses)
pub fn extract_json(text: &str) -> Option<&str> {
    let fenced = fenced_block()
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|body| body.as_str().trim())
        .find(|body| body.starts_with('{'));
    if fenced.is_some() {
        return fenced;
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    let candidate = &text[start..=end];
    serde_json::from_str::<serde_json::Value>(candidate)
        .is_ok()
        .then_some(candidate)
}

/// Parse and validate the structured plan.
///
/// A plan must have at least one task and one milestone, and no negative
/// estimates. Dangling milestone references are handled per `policy`.
pub fn parse_plan(text: &str, policy: ReferencePolicy) -> Result<ProjectPlan, PlannerError> {
    let json = extract_json(text).ok_or_else(|| {
        PlannerError::Pipeline("final task output contains no JSON object".to_string())
    })?;

    let plan: ProjectPlan = serde_json::from_str(json).map_err(|e| {
        PlannerError::Pipeline(format!("final task output does not match ProjectPlan: {}", e))
    })?;

    if plan.tasks.is_empty() {
        return Err(PlannerError::Pipeline("project plan has no tasks".to_string()));
    }
    if plan.milestones.is_empty() {
        return Err(PlannerError::Pipeline("project plan has no milestones".to_string()));
    }
    if let Some(task) = plan
        .tasks
        .iter()
        .find(|t| !t.estimated_time_hours.is_finite() || t.estimated_time_hours < 0.0)
    {
        return Err(PlannerError::Pipeline(format!(
            "task '{}' has an invalid estimate of {} hours",
            task.task_name, task.estimated_time_hours
        )));
    }

    let dangling = plan.dangling_references();
    if !dangling.is_empty() {
        match policy {
            ReferencePolicy::Ignore => {}
            ReferencePolicy::Warn => {
                for (milestone, task) in &dangling {
                    tracing::warn!(
                        "Milestone '{}' references unknown task '{}'",
                        milestone,
                        task
                    );
                }
            }
            ReferencePolicy::Reject => {
                let refs: Vec<String> = dangling
                    .iter()
                    .map(|(m, t)| format!("{} -> {}", m, t))
                    .collect();
                return Err(PlannerError::Pipeline(format!(
                    "milestones reference unknown tasks: {}",
                    refs.join(", ")
                )));
            }
        }
    }

    Ok(plan)
}
