use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, time_ago, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cards = app.state.library.overview()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No capsules yet. Create one with `pocket-cli new --title ...`");
                return Ok(());
            }

            let now = chrono::Utc::now();
            for card in &cards {
                let entry = &card.entry;
                let subject = if entry.subject.is_empty() {
                    String::new()
                } else {
                    format!(" \u{00b7} {}", entry.subject)
                };
                println!(
                    "{}{}  {}",
                    paint(&entry.title, Color::BOLD, use_color),
                    subject,
                    paint(&entry.level, Color::DIM, use_color),
                );
                println!(
                    "    {}  best {}%  known {}  {}",
                    paint(&entry.id, Color::GRAY, use_color),
                    card.best_score,
                    card.known_cards,
                    time_ago(entry.updated_at, now),
                );
            }
        }
    }

    Ok(())
}
