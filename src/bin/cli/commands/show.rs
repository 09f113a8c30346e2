use anyhow::Result;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let capsule = app.find_capsule(name)?;
    let progress = app.state.progress.load(&capsule.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "capsule": capsule,
                "progress": progress,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::render_capsule(&capsule, &progress, use_color));
        }
    }

    Ok(())
}
