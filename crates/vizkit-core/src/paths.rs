//! Locations of bundled data and shader files.
//!
//! Each directory is resolved in order from an environment variable, the
//! global [`Options`], and finally the directory shipped with the workspace.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Result, VizError};
use crate::options::Options;

/// Overrides the data directory.
pub const DATA_PATH_ENV: &str = "VIZKIT_DATA_PATH";
/// Overrides the shader directory.
pub const SHADER_PATH_ENV: &str = "VIZKIT_SHADER_PATH";

const DEFAULT_DATA_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data");
const DEFAULT_SHADER_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../shaders");

static CONFIGURED: RwLock<(Option<PathBuf>, Option<PathBuf>)> = RwLock::new((None, None));

/// Takes the data and shader directories from `options`.
pub fn configure(options: &Options) {
    if let Ok(mut paths) = CONFIGURED.write() {
        *paths = (options.data_path.clone(), options.shader_path.clone());
    }
}

fn resolve(env: &str, configured: Option<PathBuf>, default: &str) -> PathBuf {
    std::env::var_os(env)
        .map(PathBuf::from)
        .or(configured)
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Directory holding the data files.
#[must_use]
pub fn data_path() -> PathBuf {
    let configured = CONFIGURED.read().ok().and_then(|p| p.0.clone());
    resolve(DATA_PATH_ENV, configured, DEFAULT_DATA_PATH)
}

/// Directory holding the shader sources.
#[must_use]
pub fn shader_path() -> PathBuf {
    let configured = CONFIGURED.read().ok().and_then(|p| p.1.clone());
    resolve(SHADER_PATH_ENV, configured, DEFAULT_SHADER_PATH)
}

/// Full path of a file in the data directory.
#[must_use]
pub fn data_file(name: impl AsRef<Path>) -> PathBuf {
    data_path().join(name)
}

/// Reads a shader source from the shader directory.
///
/// Failures are logged and returned; callers fall back to a built-in shader.
pub fn read_shader_source(name: impl AsRef<Path>) -> Result<String> {
    let path = shader_path().join(name);
    std::fs::read_to_string(&path).map_err(|source| {
        log::error!("could not read shader {}: {source}", path.display());
        VizError::Open { path, source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_order() {
        let configured = Some(PathBuf::from("/from/options"));
        assert_eq!(
            resolve("VIZKIT_TEST_UNSET_VARIABLE", configured.clone(), "/default"),
            PathBuf::from("/from/options")
        );
        assert_eq!(
            resolve("VIZKIT_TEST_UNSET_VARIABLE", None, "/default"),
            PathBuf::from("/default")
        );
    }

    #[test]
    fn test_data_file_joins_name() {
        assert!(data_file("noise.vtk").ends_with("noise.vtk"));
    }

    #[test]
    fn test_missing_shader_is_an_error() {
        assert!(matches!(
            read_shader_source("no_such_shader.wgsl"),
            Err(VizError::Open { .. })
        ));
    }
}
