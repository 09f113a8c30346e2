use anyhow::{bail, Result};

use crate::app::App;
use crate::{CardMark, OutputFormat};

pub fn run(app: &App, name: &str, mark: CardMark, index: usize, format: &OutputFormat) -> Result<()> {
    let capsule = app.find_capsule(name)?;
    let Some(card) = capsule.flashcards.get(index) else {
        bail!(
            "Capsule \"{}\" has {} flashcards; index {} is out of range",
            capsule.meta.title,
            capsule.flashcards.len(),
            index
        );
    };

    let progress = match mark {
        CardMark::Known => app.state.progress.mark_known(&capsule.id, index)?,
        CardMark::Unknown => app.state.progress.mark_unknown(&capsule.id, index)?,
    };

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": capsule.id,
                "index": index,
                "known": progress.is_known(index),
                "knownCount": progress.known_count(),
                "total": capsule.flashcards.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let status = if progress.is_known(index) { "known" } else { "unknown" };
            println!("Marked \"{}\" as {}", card.front, status);
            println!("  Known: {}/{}", progress.known_count(), capsule.flashcards.len());
        }
    }

    Ok(())
}
