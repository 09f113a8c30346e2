use std::fs;
use std::io::Read;

use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, path: &str, format: &OutputFormat) -> Result<()> {
    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
    };

    let capsule = app
        .state
        .capsules
        .import_json(&text)
        .with_context(|| format!("Could not import {}", path))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": capsule.id,
                "title": capsule.meta.title,
                "notes": capsule.notes.len(),
                "flashcards": capsule.flashcards.len(),
                "questions": capsule.quiz.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Imported capsule \"{}\"", capsule.meta.title);
            println!(
                "  {} notes, {} flashcards, {} questions",
                capsule.notes.len(),
                capsule.flashcards.len(),
                capsule.quiz.len()
            );
            println!("  ID: {}", capsule.id);
        }
    }

    Ok(())
}
