use std::io::{self, BufRead, Write};

use anyhow::Result;

use pocket_lib::study::{QuizState, StudySession, StudyTab};

use crate::app::App;
use crate::render::terminal::{choice_letter, paint, Color};

/// Run the quiz interactively on stdin/stdout.
/// Answer with a letter or a number; `s` skips, `q` quits without a score.
pub fn run(app: &App, name: &str, use_color: bool) -> Result<()> {
    let capsule = app.find_capsule(name)?;
    let progress = &app.state.progress;
    let previous_best = progress.load(&capsule.id)?.best_score;

    let mut session = StudySession::new(capsule);
    session.show_tab(StudyTab::Quiz);

    let total = session.quiz().total_questions();
    if total == 0 {
        println!("\"{}\" has no quiz questions.", session.capsule().meta.title);
        return Ok(());
    }

    println!(
        "{} ({} questions, best so far {}%)",
        paint(&session.capsule().meta.title, Color::BOLD, use_color),
        total,
        previous_best
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let QuizState::InProgress { index, .. } = session.quiz().state() {
        let Some(question) = session.quiz().current_question().cloned() else {
            break;
        };

        println!();
        println!("{}/{}  {}", index + 1, total, question.question);
        for (i, choice) in question.choices.iter().enumerate() {
            println!("  {}. {}", choice_letter(i), choice);
        }

        let choice = loop {
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                println!();
                println!("Quiz abandoned.");
                return Ok(());
            };
            match parse_choice(&line?, question.choices.len()) {
                Some(Input::Choice(c)) => break Some(c),
                Some(Input::Skip) => break None,
                Some(Input::Quit) => {
                    println!("Quiz abandoned.");
                    return Ok(());
                }
                None => println!("Enter A-{} (or s to skip, q to quit)", choice_letter(question.choices.len().saturating_sub(1))),
            }
        };

        match choice {
            Some(c) => {
                let outcome = session.answer(c, progress)?;
                if outcome.correct {
                    println!("{}", paint("Correct!", Color::GREEN, use_color));
                } else {
                    let right = question
                        .choices
                        .get(outcome.correct_answer)
                        .map(String::as_str)
                        .unwrap_or("?");
                    println!(
                        "{} The answer was {}. {}",
                        paint("Wrong.", Color::RED, use_color),
                        choice_letter(outcome.correct_answer),
                        right
                    );
                }
                if !outcome.explanation.is_empty() {
                    println!("{}", paint(&outcome.explanation, Color::DIM, use_color));
                }
            }
            None => {
                session.skip_question(progress)?;
                println!("{}", paint("Skipped.", Color::YELLOW, use_color));
            }
        }
    }

    if let QuizState::Finished { percentage, is_new_best } = session.quiz().state() {
        println!();
        println!("Score: {}%", percentage);
        if is_new_best {
            println!("{}", paint("New best score!", Color::GREEN, use_color));
        } else {
            println!("Best: {}%", previous_best);
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq)]
enum Input {
    Choice(usize),
    Skip,
    Quit,
}

/// "b", "B" and "2" all select the second choice
fn parse_choice(line: &str, choice_count: usize) -> Option<Input> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "s" | "skip" => return Some(Input::Skip),
        "q" | "quit" => return Some(Input::Quit),
        _ => {}
    }

    let index = if let Ok(n) = line.parse::<usize>() {
        n.checked_sub(1)?
    } else {
        let mut chars = line.chars();
        let c = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() || !c.is_ascii_uppercase() {
            return None;
        }
        (c as u8 - b'A') as usize
    };

    (index < choice_count).then_some(Input::Choice(index))
}
