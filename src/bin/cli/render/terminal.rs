use chrono::{DateTime, Utc};

use pocket_lib::capsules::Capsule;
use pocket_lib::progress::ProgressRecord;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in `code` when color is on
pub fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", code, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// "42s ago", "5m ago", "3h ago", "12d ago", else the date
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let s = (now - then).num_seconds().max(0);
    if s < 60 {
        return format!("{}s ago", s);
    }
    let m = s / 60;
    if m < 60 {
        return format!("{}m ago", m);
    }
    let h = m / 60;
    if h < 24 {
        return format!("{}h ago", h);
    }
    let d = h / 24;
    if d < 30 {
        return format!("{}d ago", d);
    }
    then.format("%Y-%m-%d").to_string()
}

/// Render a full capsule: header, notes, flashcards, quiz
pub fn render_capsule(capsule: &Capsule, progress: &ProgressRecord, use_color: bool) -> String {
    let mut lines = Vec::new();
    let meta = &capsule.meta;

    lines.push(paint(&meta.title, Color::BOLD, use_color));
    let mut tagline = vec![meta.level.clone()];
    if !meta.subject.is_empty() {
        tagline.insert(0, meta.subject.clone());
    }
    lines.push(paint(&tagline.join(" \u{00b7} "), Color::DIM, use_color));
    if !meta.description.is_empty() {
        lines.extend(wrap_lines(&meta.description, "", 80));
    }
    lines.push(format!(
        "Best quiz: {}% \u{00b7} Known cards: {}/{}",
        progress.best_score,
        progress.known_count(),
        capsule.flashcards.len()
    ));

    if !capsule.notes.is_empty() {
        lines.push(String::new());
        lines.push(paint("Notes", Color::CYAN, use_color));
        for note in &capsule.notes {
            lines.extend(wrap_lines(note, "  \u{2022} ", 80));
        }
    }

    if !capsule.flashcards.is_empty() {
        lines.push(String::new());
        lines.push(paint("Flashcards", Color::CYAN, use_color));
        for (i, card) in capsule.flashcards.iter().enumerate() {
            let mark = if progress.is_known(i) { "\u{2713}" } else { " " };
            lines.push(format!("  [{}] {}. {} \u{2192} {}", mark, i, card.front, card.back));
        }
    }

    if !capsule.quiz.is_empty() {
        lines.push(String::new());
        lines.push(paint("Quiz", Color::CYAN, use_color));
        for (i, q) in capsule.quiz.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, q.question));
            for (c, choice) in q.choices.iter().enumerate() {
                lines.push(format!("     {}. {}", choice_letter(c), choice));
            }
        }
    }

    lines.join("\n")
}

/// A, B, C, D, ... up to Z; anything past that (or out of range) is '?'
pub fn choice_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
        .unwrap_or('?')
}

fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.chars().count());

    for line in text.lines() {
        if line.chars().count() <= effective_width {
            lines.push(format!("{}{}", prefix, line));
        } else {
            // Simple word wrap
            let mut current_line = String::new();
            for word in line.split_whitespace() {
                if current_line.is_empty() {
                    current_line = word.to_string();
                } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                    current_line.push(' ');
                    current_line.push_str(word);
                } else {
                    lines.push(format!("{}{}", prefix, current_line));
                    current_line = word.to_string();
                }
            }
            if !current_line.is_empty() {
                lines.push(format!("{}{}", prefix, current_line));
            }
        }
    }

    if lines.is_empty() && !text.is_empty() {
        lines.push(format!("{}{}", prefix, text));
    }

    lines
}
