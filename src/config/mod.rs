pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Location of the project store document. `None` picks the platform
    /// data directory.
    pub projects_file: Option<PathBuf>,
    /// Rendered when an image payload is empty or unusable.
    pub placeholder_image: String,
    /// Slug of the project that was open when the app last closed.
    pub last_project: Option<String>,
    pub window_size: (f64, f64),
    pub window_position: (f64, f64),
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        settings::load_config()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            projects_file: None,
            placeholder_image: "/placeholder.svg".to_string(),
            last_project: None,
            window_size: (1200.0, 800.0),
            window_position: (100.0, 100.0),
        }
    }
}
