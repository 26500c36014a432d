//! Global configuration.
//!
//! The config file is searched for in order:
//! 1. Directories listed in `SIFT_CONFIG_PATH` (colon-separated), if set
//! 2. Otherwise `~` then `/etc/sift`
//!
//! Within each directory the names `.siftrc`, `sift.yaml` and `sift.yml` are
//! tried in order; the first existing file wins. An explicit path skips the
//! search entirely.
//!
//! Config files are declarative YAML. Required fields must be present and
//! non-null; optional fields default to `None`.

mod loader;
mod provider;
mod types;

pub use loader::{CONFIG_FILE_NAMES, CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, SYSTEM_CONFIG_DIR};
pub use provider::ConfigProvider;
pub use types::*;
