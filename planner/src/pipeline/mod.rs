//! Crew execution
//!
//! [`PlanRunner`] is the capability the HTTP service and the form consume.
//! [`CrewRunner`] implements it by running the crew's tasks one after another
//! against an [`Llm`], feeding each task the outputs of the tasks before it.

mod output;

pub use output::{extract_json, parse_plan};

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::config::ReferencePolicy;
use crate::crew::{prompts, Crew, OutputSchema};
use crate::error::PlannerError;
use crate::llm::{CallOptions, Llm, Message};
use crate::types::{PlanOutput, ProjectInput, TaskOutput, UsageMetrics};

/// Produces a project plan from a project description
#[async_trait]
pub trait PlanRunner: Send + Sync {
    async fn run(&self, input: &ProjectInput) -> Result<PlanOutput, PlannerError>;
}

/// Sequential crew runner backed by an LLM
pub struct CrewRunner {
    crew: Crew,
    llm: Arc<dyn Llm>,
    reference_policy: ReferencePolicy,
}

impl CrewRunner {
    pub fn new(crew: Crew, llm: Arc<dyn Llm>) -> Self {
        Self {
            crew,
            llm,
            reference_policy: ReferencePolicy::default(),
        }
    }

    /// Set how dangling milestone references are handled
    pub fn with_reference_policy(mut self, policy: ReferencePolicy) -> Self {
        self.reference_policy = policy;
        self
    }
}

#[async_trait]
impl PlanRunner for CrewRunner {
    async fn run(&self, input: &ProjectInput) -> Result<PlanOutput, PlannerError> {
        let context = prompts::input_context(input);
        let mut usage = UsageMetrics::default();
        let mut tasks_output: Vec<TaskOutput> = Vec::new();
        let mut plan = None;

        let total = self.crew.tasks().len();
        for (index, task) in self.crew.tasks().iter().enumerate() {
            let start = Instant::now();
            tracing::info!(
                "[Task {}/{}] {} (agent: {})",
                index + 1,
                total,
                task.name(),
                task.agent.name
            );

            let messages = [
                Message::system(prompts::agent_system_prompt(&task.agent, &context)),
                Message::user(prompts::task_prompt(task, &context, &tasks_output)),
            ];
            let options = CallOptions {
                model: task.agent.llm.clone(),
                temperature: task.agent.temperature,
                json: task.output == OutputSchema::ProjectPlan,
            };

            let completion = self
                .llm
                .complete(&messages, &options)
                .await
                .map_err(|e| {
                    PlannerError::Pipeline(format!("task '{}' failed: {:#}", task.name(), e))
                })?;

            usage.record(completion.usage.prompt_tokens, completion.usage.completion_tokens);
            tracing::info!(
                prompt_tokens = completion.usage.prompt_tokens,
                completion_tokens = completion.usage.completion_tokens,
                "Task {} completed in {}ms",
                task.name(),
                start.elapsed().as_millis()
            );

            if task.output == OutputSchema::ProjectPlan {
                plan = Some(parse_plan(&completion.content, self.reference_policy)?);
            }

            tasks_output.push(TaskOutput {
                name: task.name().to_string(),
                agent: task.agent.name.clone(),
                raw: completion.content,
            });
        }

        let plan = plan.ok_or_else(|| {
            PlannerError::Pipeline("crew has no task producing a project plan".to_string())
        })?;

        tracing::info!(
            tasks = plan.tasks.len(),
            milestones = plan.milestones.len(),
            total_tokens = usage.total_tokens,
            "Project plan generated"
        );

        Ok(PlanOutput {
            plan,
            usage,
            tasks_output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::assembler::{
        ESTIMATION_AGENT, PROJECT_PLANNING_AGENT, RESOURCE_ALLOCATION, RESOURCE_ALLOCATION_AGENT,
        TASK_BREAKDOWN, TIME_RESOURCE_ESTIMATION,
    };
    use crate::crew::{AgentConfig, CrewConfigs, TaskConfig};
    use crate::llm::{Completion, TokenUsage};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records every conversation it receives
    struct ScriptedLlm {
        replies: Mutex<VecDeque<anyhow::Result<String>>>,
        calls: Mutex<Vec<(Vec<Message>, CallOptions)>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<anyhow::Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Llm for ScriptedLlm {
        async fn complete(
            &self,
            messages: &[Message],
            options: &CallOptions,
        ) -> anyhow::Result<Completion> {
            self.calls
                .lock()
                .unwrap()
                .push((messages.to_vec(), options.clone()));
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted reply")))?;
            Ok(Completion {
                content: reply,
                usage: TokenUsage {
                    prompt_tokens: 100,
                    completion_tokens: 50,
                },
            })
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    const PLAN_JSON: &str = r#"{
        "tasks": [
            {"task_name": "Design", "estimated_time_hours": 16, "required_resources": ["Jane - PM"]},
            {"task_name": "Build", "estimated_time_hours": 40.5, "required_resources": []}
        ],
        "milestones": [{"milestone_name": "MVP", "tasks": ["Design", "Build"]}]
    }"#;

    fn crew() -> Crew {
        let agent = |name: &str| AgentConfig {
            name: name.to_string(),
            role: format!("{} for {{industry}}", name),
            goal: "goal".to_string(),
            backstory: "backstory".to_string(),
            llm: None,
            temperature: None,
        };
        let task = |name: &str| TaskConfig {
            name: name.to_string(),
            description: format!("{}: {{project_objectives}}", name),
            expected_output: "output".to_string(),
            agent: None,
        };

        let mut configs = CrewConfigs::default();
        for name in [PROJECT_PLANNING_AGENT, ESTIMATION_AGENT, RESOURCE_ALLOCATION_AGENT] {
            configs.agents.insert(name.to_string(), agent(name));
        }
        for name in [TASK_BREAKDOWN, TIME_RESOURCE_ESTIMATION, RESOURCE_ALLOCATION] {
            configs.tasks.insert(name.to_string(), task(name));
        }
        Crew::assemble(&configs).unwrap()
    }

    fn input() -> ProjectInput {
        ProjectInput {
            project_type: "software".to_string(),
            project_objectives: "build an app".to_string(),
            industry: "Technology".to_string(),
            team_members: "Jane - PM".to_string(),
            project_requirements: "must ship in 2 weeks".to_string(),
        }
    }

    #[tokio::test]
    async fn test_runs_tasks_in_order_with_context() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("BREAKDOWN OUTPUT".to_string()),
            Ok("ESTIMATION OUTPUT".to_string()),
            Ok(PLAN_JSON.to_string()),
        ]));
        let runner = CrewRunner::new(crew(), llm.clone());

        let output = runner.run(&input()).await.unwrap();

        assert_eq!(output.plan.tasks.len(), 2);
        assert_eq!(output.plan.total_estimated_hours(), 56.5);
        let names: Vec<_> = output.tasks_output.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec![TASK_BREAKDOWN, TIME_RESOURCE_ESTIMATION, RESOURCE_ALLOCATION]);

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].0[0].content.contains("project_planning_agent for Technology"));
        assert!(calls[0].0[1].content.contains("task_breakdown: build an app"));
        assert!(!calls[0].0[1].content.contains("BREAKDOWN OUTPUT"));
        assert!(calls[1].0[1].content.contains("BREAKDOWN OUTPUT"));
        assert!(calls[2].0[1].content.contains("ESTIMATION OUTPUT"));
        assert!(!calls[1].1.json);
        assert!(calls[2].1.json);
    }

    #[tokio::test]
    async fn test_usage_accumulates() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("a".to_string()),
            Ok("b".to_string()),
            Ok(PLAN_JSON.to_string()),
        ]));
        let output = CrewRunner::new(crew(), llm).run(&input()).await.unwrap();

        assert_eq!(output.usage.prompt_tokens, 300);
        assert_eq!(output.usage.completion_tokens, 150);
        assert_eq!(output.usage.successful_requests, 3);
    }

    #[tokio::test]
    async fn test_llm_failure_stops_run() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("a".to_string()),
            Err(anyhow::anyhow!("rate limited")),
        ]));
        let runner = CrewRunner::new(crew(), llm.clone());

        let err = runner.run(&input()).await.unwrap_err();

        assert!(matches!(err, PlannerError::Pipeline(_)));
        assert!(err.to_string().contains("time_resource_estimation"));
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(llm.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_plan_is_pipeline_error() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("a".to_string()),
            Ok("b".to_string()),
            Ok("I could not produce a plan.".to_string()),
        ]));
        let err = CrewRunner::new(crew(), llm).run(&input()).await.unwrap_err();
        assert!(matches!(err, PlannerError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_agent_model_override_is_passed() {
        let mut crew = crew();
        let mut configs = CrewConfigs::default();
        for task in crew.tasks() {
            let mut agent = task.agent.clone();
            if agent.name == ESTIMATION_AGENT {
                agent.llm = Some("gpt-4o-mini".to_string());
            }
            configs.agents.insert(agent.name.clone(), agent);
            configs.tasks.insert(task.name().to_string(), task.config.clone());
        }
        crew = Crew::assemble(&configs).unwrap();

        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("a".to_string()),
            Ok("b".to_string()),
            Ok(PLAN_JSON.to_string()),
        ]));
        CrewRunner::new(crew, llm.clone()).run(&input()).await.unwrap();

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls[0].1.model, None);
        assert_eq!(calls[1].1.model.as_deref(), Some("gpt-4o-mini"));
    }
}
