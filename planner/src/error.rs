//! Error taxonomy for the planner
//!
//! Every failure falls into one of three kinds. The HTTP layer maps each kind
//! to a status code through [`PlannerError::status_code`].

/// Errors surfaced by config loading, request validation and crew runs
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Missing or malformed configuration; fatal at startup
    #[error("Config error: {0}")]
    Config(String),

    /// Request payload rejected before the crew runs
    #[error("Validation error: {0}")]
    Validation(String),

    /// The crew run failed (LLM call, output parsing, schema conformance)
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl PlannerError {
    /// HTTP status code for this error kind
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) | Self::Pipeline(_) => 500,
            Self::Validation(_) => 422,
        }
    }

    /// Short label for logging
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Validation(_) => "validation",
            Self::Pipeline(_) => "pipeline",
        }
    }
}
