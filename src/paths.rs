use std::path::PathBuf;

use crate::context::{Context, PlatformPaths};

pub const MAIN_CONF_NAME: &str = "denvrc.toml";
pub const LOCAL_CONF_NAME: &str = "denvrc.local.toml";
pub const USER_CONF_NAME: &str = "rc.toml";

pub const MAIN_ENV_NAME: &str = "denv.env";
pub const LOCAL_ENV_NAME: &str = "denv.local.env";

/// Precedence tier of a configuration fragment.
///
/// `User` and `Project` seed the loader; `ProjectLocal` is always the final,
/// highest-precedence layer. Extra fragments declared via
/// `extra_config_paths` carry no scope of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    User,
    Project,
    ProjectLocal,
}

impl ConfigScope {
    pub fn fragment_path(self, ctx: &Context, paths: &PlatformPaths) -> PathBuf {
        match self {
            ConfigScope::User => paths.config_dir.join(USER_CONF_NAME),
            ConfigScope::Project => ctx.project_dir.join(MAIN_CONF_NAME),
            ConfigScope::ProjectLocal => ctx.project_dir.join(LOCAL_CONF_NAME),
        }
    }
}

/// Companion env files, in increasing precedence order.
pub fn env_file_paths(ctx: &Context, paths: &PlatformPaths) -> [PathBuf; 3] {
    [
        paths.config_dir.join(MAIN_ENV_NAME),
        ctx.project_dir.join(MAIN_ENV_NAME),
        ctx.project_dir.join(LOCAL_ENV_NAME),
    ]
}
