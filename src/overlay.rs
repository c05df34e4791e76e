use crate::config::Config;

/// Synthetic bucket holding parameters shared by every host.
pub const ALL_HOSTS: &str = "all";

/// Fold the current host's declared parameters into the `"all"` bucket and
/// republish the merged bucket under both keys, so `hosts[hostname]` always
/// reads as "all" plus "this host". Idempotent.
pub fn apply_host_overlay(config: &mut Config, hostname: &str) {
    let mut merged = config.hosts.get(ALL_HOSTS).cloned().unwrap_or_default();

    if let Some(host) = config.hosts.get(hostname) {
        for path in &host.bind_paths {
            if !merged.bind_paths.contains(path) {
                merged.bind_paths.push(path.clone());
            }
        }
    }

    config.hosts.insert(ALL_HOSTS.to_string(), merged.clone());
    config.hosts.insert(hostname.to_string(), merged);
}
