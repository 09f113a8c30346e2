use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, name: &str, format: &OutputFormat) -> Result<()> {
    let capsule = app.find_capsule(name)?;
    app.state.capsules.delete(&capsule.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": capsule.id,
                "title": capsule.meta.title,
                "deleted": true,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Deleted capsule \"{}\" ({})", capsule.meta.title, capsule.id);
        }
    }

    Ok(())
}
