use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use toml::Table;
use tracing::{debug, warn};

use crate::config::Config;
use crate::context::{Context, PlatformPaths};
use crate::env::{build_env_map, EnvMap};
use crate::error::{ConfigError, ConfigResult};
use crate::expand::expand_table;
use crate::merge::merge_tables;
use crate::overlay::apply_host_overlay;
use crate::paths::ConfigScope;

/// Resolve the effective configuration for a context: layered load plus the
/// per-host overlay. This is what the command surface consumes.
pub fn resolve(ctx: &Context, paths: &PlatformPaths) -> ConfigResult<Config> {
    let mut config = load_config(ctx, paths)?;
    apply_host_overlay(&mut config, &ctx.hostname);
    Ok(config)
}

/// Discover, expand, and fold every configuration fragment into one typed
/// configuration.
///
/// The user-scope and project-scope files seed the load queue; fragments may
/// declare `extra_config_paths` (relative to the project root unless
/// absolute), which join the queue until a fixed point is reached. A path is
/// processed at most once, so cyclic declarations terminate. The local
/// override file is folded in last and its extra paths are ignored.
pub fn load_config(ctx: &Context, paths: &PlatformPaths) -> ConfigResult<Config> {
    let env = build_env_map(ctx, paths)?;
    let mut merged = Table::new();

    let mut queue: Vec<PathBuf> = vec![
        ConfigScope::User.fragment_path(ctx, paths),
        ConfigScope::Project.fragment_path(ctx, paths),
    ];
    let mut seen: HashSet<PathBuf> = queue.iter().cloned().collect();

    let mut next = 0;
    while next < queue.len() {
        let path = queue[next].clone();
        next += 1;

        for extra in load_fragment_into(&mut merged, &path, Some(&env))? {
            let resolved = if extra.is_absolute() {
                extra
            } else {
                ctx.project_dir.join(extra)
            };
            if seen.insert(resolved.clone()) {
                debug!(path = %resolved.display(), "discovered extra config fragment");
                queue.push(resolved);
            }
        }
    }

    // Local config is terminal: highest precedence, and it cannot pull in
    // further fragments.
    let local = ConfigScope::ProjectLocal.fragment_path(ctx, paths);
    let extras = load_fragment_into(&mut merged, &local, Some(&env))?;
    if !extras.is_empty() {
        warn!(path = %local.display(), "extra_config_paths in the local config are ignored");
    }

    Config::from_table(merged)
}

/// Load a single scope's fragment on its own, optionally without env
/// interpolation (so literal `$VAR` values survive a read-modify-write).
pub fn load_scope(
    ctx: &Context,
    paths: &PlatformPaths,
    scope: ConfigScope,
    interpolate: bool,
) -> ConfigResult<Config> {
    let env = if interpolate {
        Some(build_env_map(ctx, paths)?)
    } else {
        None
    };

    let mut merged = Table::new();
    load_fragment_into(&mut merged, &scope.fragment_path(ctx, paths), env.as_ref())?;
    Config::from_table(merged)
}

/// Parse one fragment (missing file contributes nothing), expand it, merge it
/// into the accumulator, and report the extra paths it declares.
fn load_fragment_into(
    merged: &mut Table,
    path: &Path,
    env: Option<&EnvMap>,
) -> ConfigResult<Vec<PathBuf>> {
    let Some(table) = read_fragment(path)? else {
        debug!(path = %path.display(), "config fragment not found, skipping");
        return Ok(Vec::new());
    };

    let table = match env {
        Some(env) => expand_table(table, env, path)?,
        None => table,
    };

    let extras = extra_paths_of(&table)?;
    debug!(path = %path.display(), "loaded config fragment");
    merge_tables(merged, table)?;
    Ok(extras)
}

fn read_fragment(path: &Path) -> ConfigResult<Option<Table>> {
    if !path.exists() {
        return Ok(None);
    }

    let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let table = text.parse::<Table>().map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(Some(table))
}

fn extra_paths_of(table: &Table) -> ConfigResult<Vec<PathBuf>> {
    match table.get("extra_config_paths") {
        None => Ok(Vec::new()),
        Some(value) => value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Schema {
                message: format!("extra_config_paths: {e}"),
            }),
    }
}
