use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use pocket_lib::capsules::{Capsule, IndexEntry};
use pocket_lib::config::Config;
use pocket_lib::AppState;

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub state: AppState,
}

impl App {
    /// Load config (flag path or default location) and open the store
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {:?}", path))?,
            None => match Config::default_path() {
                Some(path) => Config::load(&path)
                    .with_context(|| format!("Failed to load config {:?}", path))?,
                None => Config::default(),
            },
        };

        if data_dir.is_some() {
            config.data_dir = data_dir;
        }

        let state = AppState::from_config(&config)
            .context("Failed to open capsule storage")?;

        Ok(Self { config, state })
    }

    /// Capsule summaries, most recent first
    pub fn list_capsules(&self) -> Result<Vec<IndexEntry>> {
        self.state.capsules.list().context("Failed to read capsule index")
    }

    /// Find a capsule by id, or by title (case-insensitive, exact then prefix match)
    pub fn find_capsule(&self, name: &str) -> Result<Capsule> {
        if let Some(capsule) = self.state.capsules.load(name)? {
            return Ok(capsule);
        }

        let entries = self.list_capsules()?;
        let name_lower = name.to_lowercase();

        let entry = if let Some(e) = entries.iter().find(|e| e.title.to_lowercase() == name_lower) {
            e
        } else {
            let matches: Vec<&IndexEntry> = entries.iter()
                .filter(|e| e.title.to_lowercase().starts_with(&name_lower))
                .collect();

            match matches.len() {
                0 => bail!("No capsule matching '{}'. Available capsules:\n{}", name,
                    entries.iter().map(|e| format!("  - {} ({})", e.title, e.id)).collect::<Vec<_>>().join("\n")),
                1 => matches[0],
                _ => bail!("Ambiguous capsule name '{}'. Matches:\n{}", name,
                    matches.iter().map(|e| format!("  - {} ({})", e.title, e.id)).collect::<Vec<_>>().join("\n")),
            }
        };

        self.state
            .capsules
            .load(&entry.id)?
            .with_context(|| format!("Capsule {} is indexed but missing or unreadable; try `reindex`", entry.id))
    }
}
