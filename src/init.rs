use rand::Rng;
use tracing::debug;

use crate::config::{Config, HostParams};
use crate::context::{Context, PlatformPaths};
use crate::error::ConfigResult;
use crate::load::{load_config, load_scope, resolve};
use crate::merge::merge_tables;
use crate::overlay::ALL_HOSTS;
use crate::paths::ConfigScope;
use crate::persist::persist;

const SSH_PORT_RANGE: std::ops::Range<u16> = 22_000..23_000;

fn random_ssh_port() -> u16 {
    rand::thread_rng().gen_range(SSH_PORT_RANGE)
}

/// First-run scaffolding.
///
/// Creates the project config if it does not exist yet, seeding it with a
/// random ssh port, a `HOME` passthrough, and the `"all"` hosts bucket; on an
/// existing project it only adds what is missing (a bucket for the current
/// host, a port when unset). The pending update is merged over the target
/// scope's existing fragment, read without interpolation so literal `$VAR`
/// values survive the rewrite. Returns the resolved configuration.
pub fn init(ctx: &Context, paths: &PlatformPaths) -> ConfigResult<Config> {
    let project_conf = ConfigScope::Project.fragment_path(ctx, paths);

    let (current, mut update) = if project_conf.is_file() {
        (load_config(ctx, paths)?, Config::default())
    } else {
        let mut seed = Config::default();
        seed.ssh_port = Some(random_ssh_port());
        seed.environment
            .insert("HOME".to_string(), "$HOME".to_string());
        seed.hosts.insert(ALL_HOSTS.to_string(), HostParams::default());
        (seed.clone(), seed)
    };

    if !current.hosts.contains_key(&ctx.hostname) {
        update
            .hosts
            .insert(ctx.hostname.clone(), HostParams::default());
    }

    if current.ssh_port.unwrap_or(0) == 0 {
        update.ssh_port = Some(random_ssh_port());
    }

    let scope = if current.use_local_config {
        ConfigScope::ProjectLocal
    } else {
        ConfigScope::Project
    };
    let target = scope.fragment_path(ctx, paths);

    if update.is_nontrivial()? || !target.is_file() {
        let existing = load_scope(ctx, paths, scope, false)?;
        let merged = merge_update(&existing, &update)?;
        persist(ctx, paths, &merged, scope)?;
        debug!(path = %target.display(), "initialized config fragment");
    }

    resolve(ctx, paths)
}

/// Layer a sparse update (explicitly-set fields only) over a full base
/// configuration.
fn merge_update(base: &Config, update: &Config) -> ConfigResult<Config> {
    let mut table = base.to_table()?;
    merge_tables(&mut table, update.to_sparse_table()?)?;
    Config::from_table(table)
}
