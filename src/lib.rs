//! Layered configuration resolver for per-project containerized dev
//! environments.
//!
//! Fragments are discovered across scopes (user config dir, project root,
//! project-local override, transitively-declared extras), interpolated
//! against a layered env map, deep-merged in precedence order, validated
//! against the schema once, and finished with a per-host parameter overlay.

pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod expand;
pub mod init;
pub mod load;
pub mod merge;
pub mod overlay;
pub mod paths;
pub mod persist;

pub use config::{Config, FakeHome, HostParams};
pub use context::{Context, PlatformPaths};
pub use error::{ConfigError, ConfigResult};
pub use init::init;
pub use load::{load_config, load_scope, resolve};
pub use overlay::{apply_host_overlay, ALL_HOSTS};
pub use paths::ConfigScope;
pub use persist::{persist, save_config};
