//! Crew assembly
//!
//! Binds the three planning agents to the three planning tasks in a fixed
//! order. Later tasks read earlier task outputs, so the order never changes.

use crate::error::PlannerError;

use super::config::{AgentConfig, CrewConfigs, TaskConfig};

/// Agent that breaks the project into tasks
pub const PROJECT_PLANNING_AGENT: &str = "project_planning_agent";
/// Agent that estimates time and resources
pub const ESTIMATION_AGENT: &str = "estimation_agent";
/// Agent that allocates resources and produces the final plan
pub const RESOURCE_ALLOCATION_AGENT: &str = "resource_allocation_agent";

pub const TASK_BREAKDOWN: &str = "task_breakdown";
pub const TIME_RESOURCE_ESTIMATION: &str = "time_resource_estimation";
pub const RESOURCE_ALLOCATION: &str = "resource_allocation";

/// Task name paired with the agent that runs it, in execution order
pub const TASK_ORDER: [(&str, &str); 3] = [
    (TASK_BREAKDOWN, PROJECT_PLANNING_AGENT),
    (TIME_RESOURCE_ESTIMATION, ESTIMATION_AGENT),
    (RESOURCE_ALLOCATION, RESOURCE_ALLOCATION_AGENT),
];

/// Structured output a task must conform to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    /// Free-form text
    Text,
    /// JSON matching `ProjectPlan`
    ProjectPlan,
}

/// A task bound to the agent that runs it
#[derive(Debug, Clone, PartialEq)]
pub struct CrewTask {
    pub config: TaskConfig,
    pub agent: AgentConfig,
    pub output: OutputSchema,
}

impl CrewTask {
    pub fn name(&self) -> &str {
        &self.config.name
    }
}

/// The assembled planning crew
#[derive(Debug, Clone, PartialEq)]
pub struct Crew {
    tasks: Vec<CrewTask>,
}

impl Crew {
    /// Build the crew from loaded configs.
    ///
    /// Fails if any of the fixed agents or tasks is not declared.
    pub fn assemble(configs: &CrewConfigs) -> Result<Self, PlannerError> {
        let mut tasks = Vec::with_capacity(TASK_ORDER.len());

        for (index, (task_name, agent_name)) in TASK_ORDER.iter().enumerate() {
            let agent = configs.agent(agent_name)?.clone();
            let config = configs.task(task_name)?.clone();

            if let Some(declared) = config.agent.as_deref() {
                if declared != *agent_name {
                    tracing::warn!(
                        "Task '{}' declares agent '{}' but is bound to '{}'",
                        task_name,
                        declared,
                        agent_name
                    );
                }
            }

            let output = if index == TASK_ORDER.len() - 1 {
                OutputSchema::ProjectPlan
            } else {
                OutputSchema::Text
            };

            tasks.push(CrewTask {
                config,
                agent,
                output,
            });
        }

        Ok(Self { tasks })
    }

    /// Tasks in execution order
    pub fn tasks(&self) -> &[CrewTask] {
        &self.tasks
    }

    /// Agents in the order their tasks run
    pub fn agents(&self) -> impl Iterator<Item = &AgentConfig> {
        self.tasks.iter().map(|t| &t.agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn agent(name: &str) -> AgentConfig {
        AgentConfig {
            name: name.to_string(),
            role: format!("{} role", name),
            goal: "goal".to_string(),
            backstory: "backstory".to_string(),
            llm: None,
            temperature: None,
        }
    }

    fn task(name: &str) -> TaskConfig {
        TaskConfig {
            name: name.to_string(),
            description: format!("{} description", name),
            expected_output: "output".to_string(),
            agent: None,
        }
    }

    fn full_configs() -> CrewConfigs {
        let agents: BTreeMap<_, _> = [
            PROJECT_PLANNING_AGENT,
            ESTIMATION_AGENT,
            RESOURCE_ALLOCATION_AGENT,
        ]
        .into_iter()
        .map(|n| (n.to_string(), agent(n)))
        .collect();
        let tasks: BTreeMap<_, _> = [RESOURCE_ALLOCATION, TASK_BREAKDOWN, TIME_RESOURCE_ESTIMATION]
            .into_iter()
            .map(|n| (n.to_string(), task(n)))
            .collect();
        CrewConfigs { agents, tasks }
    }

    #[test]
    fn test_fixed_order() {
        let crew = Crew::assemble(&full_configs()).unwrap();
        let order: Vec<_> = crew
            .tasks()
            .iter()
            .map(|t| (t.name(), t.agent.name.as_str()))
            .collect();

        assert_eq!(
            order,
            vec![
                (TASK_BREAKDOWN, PROJECT_PLANNING_AGENT),
                (TIME_RESOURCE_ESTIMATION, ESTIMATION_AGENT),
                (RESOURCE_ALLOCATION, RESOURCE_ALLOCATION_AGENT),
            ]
        );
    }

    #[test]
    fn test_only_last_task_is_structured() {
        let crew = Crew::assemble(&full_configs()).unwrap();
        let outputs: Vec<_> = crew.tasks().iter().map(|t| t.output).collect();

        assert_eq!(
            outputs,
            vec![OutputSchema::Text, OutputSchema::Text, OutputSchema::ProjectPlan]
        );
    }

    #[test]
    fn test_missing_agent_fails() {
        let mut configs = full_configs();
        configs.agents.remove(ESTIMATION_AGENT);

        let err = Crew::assemble(&configs).unwrap_err();
        assert!(err.to_string().contains(ESTIMATION_AGENT));
    }

    #[test]
    fn test_missing_task_fails() {
        let mut configs = full_configs();
        configs.tasks.remove(RESOURCE_ALLOCATION);

        assert!(matches!(Crew::assemble(&configs), Err(PlannerError::Config(_))));
    }
}
