use anyhow::{bail, Context, Result};

use pocket_lib::capsules::{Flashcard, QuizQuestion};
use pocket_lib::study::AuthorDraft;

use crate::app::App;
use crate::OutputFormat;

/// Raw `new` arguments, before parsing
pub struct NewCapsule {
    pub title: String,
    pub subject: Option<String>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub notes: Vec<String>,
    pub cards: Vec<String>,
    pub questions: Vec<String>,
}

pub fn run(app: &App, form: NewCapsule, format: &OutputFormat) -> Result<()> {
    let mut draft = AuthorDraft::new();
    draft.meta.title = form.title;
    draft.meta.subject = form.subject.unwrap_or_default();
    if let Some(level) = form.level {
        draft.meta.level = level;
    }
    draft.meta.description = form.description.unwrap_or_default();
    draft.notes_text = form.notes.join("\n");
    draft.flashcards = form
        .cards
        .iter()
        .map(|c| parse_card(c))
        .collect::<Result<_>>()?;
    draft.quiz = form
        .questions
        .iter()
        .map(|q| parse_question(q))
        .collect::<Result<_>>()?;

    let capsule = draft
        .commit(&app.state.capsules)
        .context("Failed to create capsule")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": capsule.id,
                "title": capsule.meta.title,
                "level": capsule.meta.level,
                "notes": capsule.notes.len(),
                "flashcards": capsule.flashcards.len(),
                "questions": capsule.quiz.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Created capsule \"{}\"", capsule.meta.title);
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

/// `FRONT::BACK`
fn parse_card(raw: &str) -> Result<Flashcard> {
    match raw.split_once("::") {
        Some((front, back)) => Ok(Flashcard::new(front, back)),
        None => bail!("Invalid flashcard '{}': expected FRONT::BACK", raw),
    }
}

/// `QUESTION|CHOICE|CHOICE|...|ANSWER_INDEX`, answer index zero-based
fn parse_question(raw: &str) -> Result<QuizQuestion> {
    let parts: Vec<&str> = raw.split('|').collect();
    if parts.len() < 4 {
        bail!(
            "Invalid question '{}': expected QUESTION|CHOICE|CHOICE|...|ANSWER_INDEX",
            raw
        );
    }

    let question = parts[0];
    let choices: Vec<String> = parts[1..parts.len() - 1]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let answer_raw = parts[parts.len() - 1].trim();
    let answer: usize = answer_raw
        .parse()
        .with_context(|| format!("Invalid answer index '{}' in question '{}'", answer_raw, question))?;

    Ok(QuizQuestion::new(question, choices, answer))
}
