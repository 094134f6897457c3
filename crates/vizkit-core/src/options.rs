//! Configuration options for vizkit.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VizError};

/// Environment variable naming a JSON options file.
pub const CONFIG_ENV: &str = "VIZKIT_CONFIG";

/// Window and resource options shared by every viewer.
///
/// Missing fields in a JSON file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Window width in pixels.
    pub window_width: u32,

    /// Window height in pixels.
    pub window_height: u32,

    /// Window title.
    pub title: String,

    /// Default background color of new renderers.
    pub background_color: Vec3,

    /// Directory holding data files. See [`crate::paths::data_path`].
    pub data_path: Option<PathBuf>,

    /// Directory holding shader sources. See [`crate::paths::shader_path`].
    pub shader_path: Option<PathBuf>,

    /// Synchronize presentation with the display refresh.
    pub vsync: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 800,
            title: "vizkit".to_string(),
            background_color: Vec3::ZERO,
            data_path: None,
            shader_path: None,
            vsync: true,
        }
    }
}

impl Options {
    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| VizError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let options = serde_json::from_str(&text)?;
        log::debug!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Loads the file named by `VIZKIT_CONFIG`, or returns the defaults when
    /// the variable is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts: Options =
            serde_json::from_str(r#"{"title": "streamlines", "vsync": false}"#).unwrap();
        assert_eq!(opts.title, "streamlines");
        assert!(!opts.vsync);
        assert_eq!(opts.window_width, 800);
        assert_eq!(opts.window_height, 800);
        assert!(opts.data_path.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Options::load("/no/such/vizkit.json"),
            Err(VizError::Open { .. })
        ));
    }

    #[test]
    fn test_load_invalid_json() {
        let path = std::env::temp_dir().join(format!("vizkit-{}-bad.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Options::load(&path), Err(VizError::Json(_))));
        std::fs::remove_file(path).ok();
    }
}
