//! Crew definition: YAML-declared agents and tasks assembled into a fixed
//! three-step planning sequence.

pub mod assembler;
pub mod config;
pub mod prompts;

pub use assembler::{Crew, CrewTask, OutputSchema, TASK_ORDER};
pub use config::{AgentConfig, CrewConfigs, TaskConfig};
