pub const DEFAULT_DOCKER_ENDPOINT: &str = "unix:///var/run/docker.sock";
pub const DEFAULT_DOCKER_CONNECT_TIMEOUT_SECS: u64 = 10;

// machine.docker.unused_containers_cleanup_period_min
pub const DEFAULT_CLEANUP_PERIOD_MIN: u64 = 60;
// one year
pub const MAX_CLEANUP_PERIOD_MIN: u64 = 365 * 24 * 60;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const CONFIG_ENV_PREFIX: &str = "DOCKHAND";
pub const CONFIG_DIR_NAME: &str = "dockhand";
pub const CONFIG_FILE_NAME: &str = "config.toml";
