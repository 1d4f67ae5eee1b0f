//! Request and plan data schemas
//!
//! `ProjectInput` is what callers submit; `ProjectPlan` is the structured
//! artifact the final crew task must produce.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// USD per one million tokens, prompt and completion priced alike
pub const COST_PER_MILLION_TOKENS: f64 = 0.150;

/// Free-text description of the project to plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectInput {
    #[schemars(description = "Type of the project (e.g., 'software', 'construction')")]
    pub project_type: String,
    #[schemars(description = "Objectives of the project")]
    pub project_objectives: String,
    #[schemars(description = "Industry in which the project is being executed")]
    pub industry: String,
    #[schemars(description = "List of team members involved in the project")]
    pub team_members: String,
    #[schemars(description = "Requirements and constraints of the project")]
    pub project_requirements: String,
}

impl ProjectInput {
    /// Field names paired with their values, in declaration order
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("project_type", self.project_type.as_str()),
            ("project_objectives", self.project_objectives.as_str()),
            ("industry", self.industry.as_str()),
            ("team_members", self.team_members.as_str()),
            ("project_requirements", self.project_requirements.as_str()),
        ]
    }

    /// Names of fields that are empty or whitespace only
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Estimate for a single task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaskEstimate {
    #[schemars(description = "Name of the task")]
    pub task_name: String,
    #[schemars(description = "Estimated time to complete the task in hours")]
    pub estimated_time_hours: f64,
    #[schemars(description = "List of resources required to complete the task")]
    pub required_resources: Vec<String>,
}

/// A project milestone grouping task names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Milestone {
    #[schemars(description = "Name of the milestone")]
    pub milestone_name: String,
    #[schemars(description = "List of task IDs associated with this milestone")]
    pub tasks: Vec<String>,
}

/// Structured output of the resource allocation task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectPlan {
    #[schemars(description = "List of tasks with their estimates")]
    pub tasks: Vec<TaskEstimate>,
    #[schemars(description = "List of project milestones")]
    pub milestones: Vec<Milestone>,
}

impl ProjectPlan {
    /// Sum of `estimated_time_hours` across all tasks
    pub fn total_estimated_hours(&self) -> f64 {
        self.tasks.iter().map(|t| t.estimated_time_hours).sum()
    }

    /// Milestone task references with no matching `task_name`, as
    /// `(milestone_name, task_ref)` pairs
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        let tasks = &self.tasks;
        self.milestones
            .iter()
            .flat_map(move |m| {
                m.tasks
                    .iter()
                    .filter(move |r| !tasks.iter().any(|t| t.task_name == **r))
                    .map(move |r| (m.milestone_name.as_str(), r.as_str()))
            })
            .collect()
    }

    /// JSON schema handed to the model for the final task
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(ProjectPlan)).unwrap_or_default()
    }
}

/// Token usage accumulated over one crew run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub successful_requests: u64,
}

impl UsageMetrics {
    /// Fold one LLM call into the running totals
    pub fn record(&mut self, prompt_tokens: u64, completion_tokens: u64) {
        self.prompt_tokens += prompt_tokens;
        self.completion_tokens += completion_tokens;
        self.total_tokens += prompt_tokens + completion_tokens;
        self.successful_requests += 1;
    }

    /// Approximate run cost in USD
    pub fn estimated_cost_usd(&self) -> f64 {
        COST_PER_MILLION_TOKENS * (self.prompt_tokens + self.completion_tokens) as f64
            / 1_000_000.0
    }
}

/// Raw output of a single crew task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub name: String,
    pub agent: String,
    pub raw: String,
}

/// Result of one complete run of the crew
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutput {
    pub plan: ProjectPlan,
    pub usage: UsageMetrics,
    #[serde(default)]
    pub tasks_output: Vec<TaskOutput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> ProjectPlan {
        ProjectPlan {
            tasks: vec![
                TaskEstimate {
                    task_name: "Design".to_string(),
                    estimated_time_hours: 12.5,
                    required_resources: vec!["Jane".to_string()],
                },
                TaskEstimate {
                    task_name: "Build".to_string(),
                    estimated_time_hours: 40.0,
                    required_resources: vec![],
                },
            ],
            milestones: vec![Milestone {
                milestone_name: "MVP".to_string(),
                tasks: vec!["Design".to_string(), "Deploy".to_string()],
            }],
        }
    }

    #[test]
    fn test_missing_fields() {
        let input = ProjectInput {
            project_type: "software".to_string(),
            project_objectives: "  ".to_string(),
            industry: "Technology".to_string(),
            team_members: String::new(),
            project_requirements: "ship".to_string(),
        };

        assert_eq!(input.missing_fields(), vec!["project_objectives", "team_members"]);
    }

    #[test]
    fn test_input_requires_every_field() {
        let json = r#"{"project_type": "software", "industry": "Technology"}"#;
        assert!(serde_json::from_str::<ProjectInput>(json).is_err());
    }

    #[test]
    fn test_total_hours() {
        assert_eq!(sample_plan().total_estimated_hours(), 52.5);
    }

    #[test]
    fn test_dangling_references() {
        let plan = sample_plan();
        assert_eq!(plan.dangling_references(), vec![("MVP", "Deploy")]);
    }

    #[test]
    fn test_cost_estimate() {
        let usage = UsageMetrics {
            prompt_tokens: 1000,
            completion_tokens: 500,
            ..Default::default()
        };
        let cost = usage.estimated_cost_usd();
        assert!((cost - 0.000225).abs() < 1e-6);
        assert_eq!(format!("{:.6}", cost), "0.000225");
    }

    #[test]
    fn test_usage_record() {
        let mut usage = UsageMetrics::default();
        usage.record(100, 20);
        usage.record(50, 5);

        assert_eq!(usage.prompt_tokens, 150);
        assert_eq!(usage.completion_tokens, 25);
        assert_eq!(usage.total_tokens, 175);
        assert_eq!(usage.successful_requests, 2);
    }

    #[test]
    fn test_plan_schema_names_fields() {
        let schema = ProjectPlan::json_schema().to_string();
        assert!(schema.contains("milestone_name"));
        assert!(schema.contains("estimated_time_hours"));
    }
}
