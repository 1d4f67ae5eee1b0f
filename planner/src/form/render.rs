//! Plain-text rendering of a plan report

use crate::types::PlanOutput;

/// Render rows as an aligned, bordered text table
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let border: String = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let border = format!("+{}+\n", border);

    let line = |cells: &mut dyn Iterator<Item = &str>| {
        let cells: Vec<String> = widths
            .iter()
            .map(|w| {
                let cell = cells.next().unwrap_or("");
                let pad = w - cell.chars().count().min(*w);
                format!(" {}{} ", cell, " ".repeat(pad))
            })
            .collect();
        format!("|{}|\n", cells.join("|"))
    };

    let mut output = String::new();
    output.push_str(&border);
    output.push_str(&line(&mut headers.iter().copied()));
    output.push_str(&border);
    for row in rows {
        output.push_str(&line(&mut row.iter().map(|c| c.as_str())));
    }
    output.push_str(&border);
    output
}

/// Render usage, tasks, milestones and total duration for a finished run
pub fn render_report(output: &PlanOutput) -> String {
    let mut report = String::new();
    let usage = &output.usage;

    report.push_str("📊 Usage Metrics\n\n");
    report.push_str(&format!("Total Cost: ${:.4}\n\n", usage.estimated_cost_usd()));
    report.push_str(&render_table(
        &["prompt_tokens", "completion_tokens", "total_tokens", "successful_requests"],
        &[vec![
            usage.prompt_tokens.to_string(),
            usage.completion_tokens.to_string(),
            usage.total_tokens.to_string(),
            usage.successful_requests.to_string(),
        ]],
    ));

    report.push_str("\n📋 Tasks\n\n");
    let task_rows: Vec<Vec<String>> = output
        .plan
        .tasks
        .iter()
        .map(|t| {
            vec![
                t.task_name.clone(),
                format!("{}", t.estimated_time_hours),
                t.required_resources.join(", "),
            ]
        })
        .collect();
    report.push_str(&render_table(
        &["task_name", "estimated_time_hours", "required_resources"],
        &task_rows,
    ));

    report.push_str("\n🏁 Milestones\n\n");
    let milestone_rows: Vec<Vec<String>> = output
        .plan
        .milestones
        .iter()
        .map(|m| vec![m.milestone_name.clone(), m.tasks.join(", ")])
        .collect();
    report.push_str(&render_table(&["milestone_name", "tasks"], &milestone_rows));

    report.push_str(&format!(
        "\nTotal Estimated Project Duration: {:.1} hours\n",
        output.plan.total_estimated_hours()
    ));

    report
}
