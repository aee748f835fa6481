//! `.env` file support.
//!
//! Values from the file only fill gaps: a variable already present in the
//! process environment is never overwritten, which keeps explicit exports
//! and CLI-provided environment ahead of the file.

use crate::ConfigError;
use std::path::Path;

/// Loads `path` into the process environment without overriding.
///
/// Returns `Ok(false)` when the file does not exist.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
	let path = path.as_ref();
	match dotenvy::from_path(path) {
		Ok(()) => {
			tracing::debug!(path = %path.display(), "Loaded env file");
			Ok(true)
		},
		Err(e) if e.not_found() => Ok(false),
		Err(dotenvy::Error::Io(e)) => Err(ConfigError::Io(e)),
		Err(e) => Err(ConfigError::Parse(format!(
			"invalid env file {}: {e}",
			path.display()
		))),
	}
}
