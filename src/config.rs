use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Visual size variant of the uploader, carried for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComponentSize {
    Sm,
    #[default]
    Normal,
}

/// Uploader configuration supplied by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploaderOptions {
    /// Accepted file extensions (e.g. ".png", ".jpg"); empty accepts everything
    #[serde(default)]
    pub accept: Vec<String>,
    /// Whether the collection may hold more than one file at once
    #[serde(default = "default_multiple")]
    pub multiple: bool,
    /// Maximum file size in bytes
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
    #[serde(default)]
    pub size: ComponentSize,
}

fn default_multiple() -> bool {
    true
}

fn default_max_size_bytes() -> u64 {
    500_000
}

impl Default for UploaderOptions {
    fn default() -> Self {
        Self {
            accept: Vec::new(),
            multiple: true,
            max_size_bytes: 500_000,
            size: ComponentSize::Normal,
        }
    }
}

impl UploaderOptions {
    /// Check a file name against the accepted extension list
    pub fn accepts(&self, file_name: &str) -> bool {
        if self.accept.is_empty() {
            return true;
        }
        let lower = file_name.to_lowercase();
        self.accept
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }

    /// Maximum size in whole kilobytes, for user-facing messages
    pub fn max_size_kb(&self) -> u64 {
        self.max_size_bytes / 1000
    }

    pub fn load(path: &Path) -> Option<UploaderOptions> {
        if !path.exists() {
            return None;
        }

        let contents = fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Save the options to disk
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }
}
