//! Interactive terminal form
//!
//! Collects the five project fields, runs the planner in-process and prints
//! the resulting plan as tables.

mod render;

pub use render::{render_report, render_table};

use std::io::{self, BufRead, Write};

use crate::pipeline::PlanRunner;
use crate::types::ProjectInput;

/// A field shown in the form
struct FormField {
    label: &'static str,
    placeholder: &'static str,
    help: &'static str,
    /// Multi-line fields end on an empty line
    multiline: bool,
}

const FIELDS: [FormField; 5] = [
    FormField {
        label: "Project Type",
        placeholder: "e.g., software, construction, marketing",
        help: "Enter the type of project you want to plan",
        multiline: false,
    },
    FormField {
        label: "Project Objectives",
        placeholder: "What are the main goals and objectives of your project?",
        help: "Clearly state what you want to achieve with this project",
        multiline: true,
    },
    FormField {
        label: "Industry",
        placeholder: "e.g., Technology, Healthcare, Finance",
        help: "Enter the industry sector for this project",
        multiline: false,
    },
    FormField {
        label: "Team Members",
        placeholder: "List your team members and their roles, e.g.\n    John Doe - Senior Developer\n    Jane Smith - Project Manager",
        help: "Enter the team members who will be working on this project",
        multiline: true,
    },
    FormField {
        label: "Project Requirements",
        placeholder: "List the key requirements and constraints for your project",
        help: "Include both functional and non-functional requirements",
        multiline: true,
    },
];

/// Shown when the form is submitted with blank fields
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields before submitting.";

fn read_field<R: BufRead, W: Write>(
    field: &FormField,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<String> {
    writeln!(writer, "\n{}", field.label)?;
    writeln!(writer, "  {}", field.help)?;
    writeln!(writer, "  ({})", field.placeholder)?;

    if !field.multiline {
        write!(writer, "> ")?;
        writer.flush()?;
        let mut line = String::new();
        reader.read_line(&mut line)?;
        return Ok(line.trim().to_string());
    }

    writeln!(writer, "  [end with an empty line]")?;
    writer.flush()?;
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
        lines.push(line.trim_end().to_string());
    }
    Ok(lines.join("\n"))
}

/// Prompt for every field
pub fn collect_input<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> io::Result<ProjectInput> {
    let mut values = Vec::with_capacity(FIELDS.len());
    for field in &FIELDS {
        values.push(read_field(field, reader, writer)?);
    }

    let mut values = values.into_iter();
    let mut next = || values.next().unwrap_or_default();
    Ok(ProjectInput {
        project_type: next(),
        project_objectives: next(),
        industry: next(),
        team_members: next(),
        project_requirements: next(),
    })
}

/// Run the form once: collect, validate, plan, render.
///
/// Validation failures and planning errors are shown to the user and are not
/// returned as errors; only I/O failures are.
pub async fn run_form<R: BufRead, W: Write>(
    runner: &dyn PlanRunner,
    reader: &mut R,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "{}", "═".repeat(60))?;
    writeln!(writer, "  PROJECT PLANNER")?;
    writeln!(writer, "{}", "═".repeat(60))?;
    writeln!(
        writer,
        "Enter your project details below to get a comprehensive project plan."
    )?;

    let input = collect_input(reader, writer)?;

    if !input.missing_fields().is_empty() {
        tracing::debug!("Form submitted with blank fields: {:?}", input.missing_fields());
        writeln!(writer, "\n✗ {}", MISSING_FIELDS_MESSAGE)?;
        return Ok(());
    }

    writeln!(
        writer,
        "\nGenerating your project plan... This may take a few minutes..."
    )?;
    writer.flush()?;

    match runner.run(&input).await {
        Ok(output) => {
            writeln!(writer, "\n✓ Project plan generated successfully!\n")?;
            write!(writer, "{}", render_report(&output))?;
        }
        Err(e) => {
            tracing::error!("Error during project planning: {}", e);
            writeln!(writer, "\n✗ Error during project planning: {}", e)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::types::{Milestone, PlanOutput, ProjectPlan, TaskEstimate, UsageMetrics};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeRunner {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PlanRunner for FakeRunner {
        async fn run(&self, _input: &ProjectInput) -> Result<PlanOutput, PlannerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PlannerError::Pipeline("model unavailable".to_string()));
            }
            Ok(PlanOutput {
                plan: ProjectPlan {
                    tasks: vec![TaskEstimate {
                        task_name: "Design".to_string(),
                        estimated_time_hours: 8.0,
                        required_resources: vec!["Jane".to_string()],
                    }],
                    milestones: vec![Milestone {
                        milestone_name: "MVP".to_string(),
                        tasks: vec!["Design".to_string()],
                    }],
                },
                usage: UsageMetrics::default(),
                tasks_output: vec![],
            })
        }
    }

    const FILLED: &str = "software\nbuild an app\nwith offline mode\n\nTechnology\nJane - PM\nJohn - Dev\n\nmust ship in 2 weeks\n\n";

    #[test]
    fn test_collect_input_multiline() {
        let mut reader = Cursor::new(FILLED);
        let mut out = Vec::new();
        let input = collect_input(&mut reader, &mut out).unwrap();

        assert_eq!(input.project_type, "software");
        assert_eq!(input.project_objectives, "build an app\nwith offline mode");
        assert_eq!(input.industry, "Technology");
        assert_eq!(input.team_members, "Jane - PM\nJohn - Dev");
        assert_eq!(input.project_requirements, "must ship in 2 weeks");

        let prompts = String::from_utf8(out).unwrap();
        assert!(prompts.contains("Project Requirements"));
    }

    #[test]
    fn test_collect_input_eof() {
        let mut reader = Cursor::new("software\n");
        let input = collect_input(&mut reader, &mut Vec::new()).unwrap();

        assert_eq!(input.project_type, "software");
        assert_eq!(input.missing_fields().len(), 4);
    }

    #[tokio::test]
    async fn test_blank_fields_skip_run() {
        let runner = FakeRunner { calls: AtomicUsize::new(0), fail: false };
        let mut reader = Cursor::new("software\n\nTechnology\n\n\n");
        let mut out = Vec::new();

        run_form(&runner, &mut reader, &mut out).await.unwrap();

        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
        assert!(String::from_utf8(out).unwrap().contains(MISSING_FIELDS_MESSAGE));
    }

    #[tokio::test]
    async fn test_successful_run_renders_tables() {
        let runner = FakeRunner { calls: AtomicUsize::new(0), fail: false };
        let mut reader = Cursor::new(FILLED);
        let mut out = Vec::new();

        run_form(&runner, &mut reader, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
        assert!(out.contains("Project plan generated successfully!"));
        assert!(out.contains("Milestones"));
        assert!(out.contains("8.0 hours"));
    }

    #[tokio::test]
    async fn test_failure_shows_banner() {
        let runner = FakeRunner { calls: AtomicUsize::new(0), fail: true };
        let mut reader = Cursor::new(FILLED);
        let mut out = Vec::new();

        run_form(&runner, &mut reader, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Error during project planning: Pipeline error: model unavailable"));
        assert!(!out.contains("Tasks"));
    }
}
