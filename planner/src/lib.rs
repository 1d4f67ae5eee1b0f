//! Multi-agent project planner
//!
//! This crate provides:
//! - YAML-declared agents and tasks assembled into a fixed planning crew
//! - A sequential crew runner backed by an OpenAI-compatible or Ollama LLM
//! - An HTTP service (`web` feature) and an interactive terminal form
//!
//! # Example
//!
//! ```rust,ignore
//! use project_planner::{Crew, CrewConfigs, CrewRunner, PlanRunner};
//!
//! let configs = CrewConfigs::load(Path::new("config"))?;
//! let runner = CrewRunner::new(Crew::assemble(&configs)?, llm);
//!
//! let output = runner.run(&input).await?;
//! println!("{} tasks", output.plan.tasks.len());
//! ```

pub mod config;
pub mod crew;
pub mod error;
pub mod form;
pub mod llm;
pub mod pipeline;
pub mod types;
#[cfg(feature = "web")]
pub mod web;

pub use crew::{Crew, CrewConfigs};
pub use error::PlannerError;
pub use pipeline::{CrewRunner, PlanRunner};
pub use types::{Milestone, PlanOutput, ProjectInput, ProjectPlan, TaskEstimate, UsageMetrics};
