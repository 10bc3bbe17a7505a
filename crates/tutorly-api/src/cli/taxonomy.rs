//! CLI handlers for subject seeding and listing.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use tutorly_types::error::TaxonomyError;
use tutorly_types::taxonomy::SeedOutcome;

use crate::state::AppState;

/// Run the subject seeder once and report per-subject outcomes.
pub async fn seed(state: &AppState, json: bool) -> Result<()> {
    let outcomes = state.seeder.run().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
        return Ok(());
    }

    if outcomes.is_empty() {
        println!();
        println!(
            "  {} Every subject already has topics. Add subjects under {} in config.toml.",
            style("i").blue().bold(),
            style("[seeding].subjects").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", outcome_table(&outcomes));
    let failed = outcomes.iter().filter(|o| !o.success).count();
    println!(
        "  {} seeded, {} failed",
        style(outcomes.len() - failed).green().bold(),
        style(failed).red().bold()
    );
    println!();
    Ok(())
}

fn outcome_table(outcomes: &[SeedOutcome]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Subject").fg(Color::White),
        Cell::new("Result").fg(Color::White),
        Cell::new("Error").fg(Color::White),
    ]);
    for outcome in outcomes {
        let result = if outcome.success {
            Cell::new("● seeded").fg(Color::Green)
        } else {
            Cell::new("✗ failed").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&outcome.subject).fg(Color::Cyan),
            result,
            Cell::new(outcome.error.as_deref().unwrap_or("")).fg(Color::DarkGrey),
        ]);
    }
    table
}

/// List subjects with the number of topics each has.
pub async fn list_subjects(state: &AppState, json: bool) -> Result<()> {
    let subjects = state.taxonomy_service.subjects().await?;

    let mut rows = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let topics = match state.taxonomy_service.topics(subject.id).await {
            Ok(topics) => topics.len(),
            Err(TaxonomyError::NoCandidates(_)) => 0,
            Err(e) => return Err(e.into()),
        };
        rows.push((subject, topics));
    }

    if json {
        let value: Vec<serde_json::Value> = rows
            .iter()
            .map(|(s, topics)| serde_json::json!({"id": s.id, "name": s.name, "topics": topics}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!();
        println!(
            "  {} No subjects yet. Run {} after adding some to config.toml.",
            style("i").blue().bold(),
            style("tutorly seed").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Subject").fg(Color::White),
        Cell::new("Topics").fg(Color::White),
    ]);
    for (subject, topics) in &rows {
        let count = if *topics == 0 {
            Cell::new("pending").fg(Color::Yellow)
        } else {
            Cell::new(topics)
        };
        table.add_row(vec![
            Cell::new(subject.id).fg(Color::DarkGrey),
            Cell::new(&subject.name).fg(Color::Cyan),
            count,
        ]);
    }
    println!();
    println!("{table}");
    println!();
    Ok(())
}
