//! Prompt rendering for crew agents and tasks

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::types::{ProjectInput, ProjectPlan, TaskOutput};

use super::assembler::{CrewTask, OutputSchema};
use super::config::AgentConfig;

/// Build the placeholder context for a project input
pub fn input_context(input: &ProjectInput) -> HashMap<&'static str, &str> {
    input.fields().into_iter().collect()
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"))
}

/// Substitute {variable} placeholders in a string.
///
/// One left-to-right pass: substituted values are never rescanned.
/// Unknown placeholders are left as written.
pub fn interpolate(template: &str, context: &HashMap<&'static str, &str>) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures| match context.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// System prompt describing who the agent is
pub fn agent_system_prompt(agent: &AgentConfig, context: &HashMap<&'static str, &str>) -> String {
    format!(
        "You are {role}. {backstory}\nYour personal goal is: {goal}",
        role = interpolate(&agent.role, context),
        backstory = interpolate(&agent.backstory, context),
        goal = interpolate(&agent.goal, context),
    )
}

/// User prompt for a task, including outputs of earlier tasks
pub fn task_prompt(
    task: &CrewTask,
    context: &HashMap<&'static str, &str>,
    previous: &[TaskOutput],
) -> String {
    let mut prompt = format!(
        "Current Task: {}\n\nThis is the expected criteria for your final answer: {}\n",
        interpolate(&task.config.description, context),
        interpolate(&task.config.expected_output, context),
    );

    if task.output == OutputSchema::ProjectPlan {
        let schema = serde_json::to_string_pretty(&ProjectPlan::json_schema()).unwrap_or_default();
        prompt.push_str(
            "\nYour final answer must be a single JSON object conforming to this JSON schema, \
             with no other text:\n",
        );
        prompt.push_str(&schema);
        prompt.push('\n');
    } else {
        prompt.push_str(
            "You MUST return the actual complete content as the final answer, not a summary.\n",
        );
    }

    if !previous.is_empty() {
        prompt.push_str("\nThis is the context you're working with:\n");
        for output in previous {
            prompt.push_str(&format!("\n### {} ({})\n{}\n", output.name, output.agent, output.raw));
        }
    }

    prompt.push_str(
        "\nBegin! This is VERY important to you, give your best Final Answer, \
         your job depends on it!",
    );
    prompt
}
