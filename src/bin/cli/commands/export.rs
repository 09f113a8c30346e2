use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::app::App;

pub fn run(app: &App, name: &str, output: Option<&Path>) -> Result<()> {
    let capsule = app.find_capsule(name)?;
    let json = app.state.capsules.export_json(&capsule)?;

    match output {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("Exported \"{}\" to {}", capsule.meta.title, path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
