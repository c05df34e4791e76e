use std::{
    fs,
    path::{Path, PathBuf},
};

use toml::Table;
use tracing::debug;

use crate::config::Config;
use crate::context::{Context, PlatformPaths};
use crate::error::{ConfigError, ConfigResult};
use crate::paths::ConfigScope;

/// Serialize a configuration to a fragment file.
///
/// With `suppress_defaults`, top-level fields equal to the schema default are
/// left out so override files stay minimal and diff-friendly; without it,
/// every representable field is written and the file is self-describing.
/// The write is all-or-nothing: content goes to a sibling temp file which is
/// then renamed into place.
pub fn save_config(config: &Config, path: &Path, suppress_defaults: bool) -> ConfigResult<()> {
    let table = if suppress_defaults {
        config.to_sparse_table()?
    } else {
        config.to_table()?
    };
    write_fragment(&table, path)
}

/// Route a configuration to its scope's fragment path. The user-scope file is
/// the canonical, fully-written one; project and local files are
/// default-suppressed.
pub fn persist(
    ctx: &Context,
    paths: &PlatformPaths,
    config: &Config,
    scope: ConfigScope,
) -> ConfigResult<()> {
    let path = scope.fragment_path(ctx, paths);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    save_config(config, &path, scope != ConfigScope::User)
}

fn write_fragment(table: &Table, path: &Path) -> ConfigResult<()> {
    let text = toml::to_string(table)?;

    let tmp = temp_path(path);
    fs::write(&tmp, text).map_err(|e| ConfigError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!(path = %path.display(), "wrote config fragment");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "fragment".into());
    name.push(".tmp");
    path.with_file_name(name)
}
