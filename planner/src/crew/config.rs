//! Agent and task definitions loaded from YAML
//!
//! Loading is split in two: [`load_yaml_config`] does the I/O and returns a
//! raw mapping, while [`agents_from_mapping`] and [`tasks_from_mapping`] turn
//! a mapping into validated records without touching the filesystem.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::PlannerError;

/// File holding agent definitions inside the crew config directory
pub const AGENTS_FILE: &str = "agents.yaml";
/// File holding task definitions inside the crew config directory
pub const TASKS_FILE: &str = "tasks.yaml";

/// Configuration for one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Key under which the agent is declared
    #[serde(skip)]
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    /// Model override for this agent
    #[serde(default)]
    pub llm: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Configuration for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Key under which the task is declared
    #[serde(skip)]
    pub name: String,
    pub description: String,
    pub expected_output: String,
    /// Agent named in the YAML, informational only
    #[serde(default)]
    pub agent: Option<String>,
}

/// Read a YAML file as a mapping
pub fn load_yaml_config(path: &Path) -> Result<Mapping, PlannerError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| PlannerError::Config(format!("cannot read {}: {}", path.display(), e)))?;

    match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(PlannerError::Config(format!(
            "{} must contain a mapping at the top level",
            path.display()
        ))),
        Err(e) => Err(PlannerError::Config(format!(
            "failed to parse {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Build agent configs from a raw mapping
pub fn agents_from_mapping(raw: &Mapping) -> Result<BTreeMap<String, AgentConfig>, PlannerError> {
    entries_from_mapping(raw, &["role", "goal", "backstory"], |name, mut agent: AgentConfig| {
        agent.name = name;
        agent
    })
}

/// Build task configs from a raw mapping
pub fn tasks_from_mapping(raw: &Mapping) -> Result<BTreeMap<String, TaskConfig>, PlannerError> {
    entries_from_mapping(raw, &["description", "expected_output"], |name, mut task: TaskConfig| {
        task.name = name;
        task
    })
}

fn entries_from_mapping<T, F>(
    raw: &Mapping,
    required: &[&str],
    finish: F,
) -> Result<BTreeMap<String, T>, PlannerError>
where
    T: serde::de::DeserializeOwned,
    F: Fn(String, T) -> T,
{
    let mut entries = BTreeMap::new();

    for (key, value) in raw {
        let name = key
            .as_str()
            .ok_or_else(|| PlannerError::Config(format!("entry key {:?} is not a string", key)))?
            .to_string();

        let fields = value.as_mapping().ok_or_else(|| {
            PlannerError::Config(format!("entry '{}' must be a mapping", name))
        })?;

        for field in required {
            match fields.get(*field) {
                Some(Value::String(_)) => {}
                Some(_) => {
                    return Err(PlannerError::Config(format!(
                        "entry '{}': '{}' must be a string",
                        name, field
                    )))
                }
                None => {
                    return Err(PlannerError::Config(format!(
                        "entry '{}' is missing required key '{}'",
                        name, field
                    )))
                }
            }
        }

        let record: T = serde_yaml::from_value(value.clone())
            .map_err(|e| PlannerError::Config(format!("entry '{}': {}", name, e)))?;
        entries.insert(name.clone(), finish(name, record));
    }

    Ok(entries)
}

/// Agent and task definitions for one crew
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrewConfigs {
    pub agents: BTreeMap<String, AgentConfig>,
    pub tasks: BTreeMap<String, TaskConfig>,
}

impl CrewConfigs {
    /// Load `agents.yaml` and `tasks.yaml` from a directory
    pub fn load(dir: &Path) -> Result<Self, PlannerError> {
        tracing::debug!("Loading crew config from {}", dir.display());

        let agents = agents_from_mapping(&load_yaml_config(&dir.join(AGENTS_FILE))?)?;
        let tasks = tasks_from_mapping(&load_yaml_config(&dir.join(TASKS_FILE))?)?;

        tracing::info!(
            agents = agents.len(),
            tasks = tasks.len(),
            "Crew config loaded from {}",
            dir.display()
        );

        Ok(Self { agents, tasks })
    }

    /// Look up an agent, failing if it is not declared
    pub fn agent(&self, name: &str) -> Result<&AgentConfig, PlannerError> {
        self.agents.get(name).ok_or_else(|| {
            PlannerError::Config(format!("agent '{}' is not defined in {}", name, AGENTS_FILE))
        })
    }

    /// Look up a task, failing if it is not declared
    pub fn task(&self, name: &str) -> Result<&TaskConfig, PlannerError> {
        self.tasks.get(name).ok_or_else(|| {
            PlannerError::Config(format!("task '{}' is not defined in {}", name, TASKS_FILE))
        })
    }
}
