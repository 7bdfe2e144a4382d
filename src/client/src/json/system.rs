use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body of `GET /info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ServerVersion")]
    pub server_version: String,
    #[serde(rename = "Containers")]
    pub containers: i64,
    #[serde(rename = "ContainersRunning")]
    pub containers_running: i64,
    #[serde(rename = "ContainersPaused")]
    pub containers_paused: i64,
    #[serde(rename = "ContainersStopped")]
    pub containers_stopped: i64,
    #[serde(rename = "Images")]
    pub images: i64,
    #[serde(rename = "Driver")]
    pub driver: String,
    #[serde(rename = "DockerRootDir")]
    pub docker_root_dir: String,
    #[serde(rename = "MemTotal")]
    pub mem_total: i64,
    #[serde(rename = "NCPU")]
    pub ncpu: i64,
    #[serde(rename = "OperatingSystem")]
    pub operating_system: String,
    #[serde(rename = "OSType")]
    pub os_type: String,
    #[serde(rename = "Architecture")]
    pub architecture: String,
    #[serde(rename = "KernelVersion")]
    pub kernel_version: String,
    #[serde(rename = "Labels")]
    pub labels: Option<Vec<String>>,
    #[serde(rename = "DriverStatus")]
    pub driver_status: Option<Vec<Vec<String>>>,
    #[serde(rename = "RegistryConfig")]
    pub registry_config: Option<HashMap<String, serde_json::Value>>,
}

/// Body of `GET /version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "ApiVersion")]
    pub api_version: String,
    #[serde(rename = "MinAPIVersion")]
    pub min_api_version: Option<String>,
    #[serde(rename = "GoVersion")]
    pub go_version: String,
    #[serde(rename = "GitCommit")]
    pub git_commit: String,
    #[serde(rename = "Os")]
    pub os: String,
    #[serde(rename = "Arch")]
    pub arch: String,
    #[serde(rename = "KernelVersion")]
    pub kernel_version: String,
    #[serde(rename = "BuildTime")]
    pub build_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_keys_map_field_by_field() {
        let raw = r#"{
          "BuildTime": "2016-03-10T15:54:52.312835708+00:00",
          "KernelVersion": "3.16.0-53-generic",
          "Arch": "amd64",
          "Os": "linux",
          "GoVersion": "go1.5.3",
          "GitCommit": "20f81dd",
          "ApiVersion": "1.22",
          "Version": "1.10.3"
        }"#;

        let version: Version = serde_json::from_str(raw).unwrap();

        assert_eq!(version.version, "1.10.3");
        assert_eq!(version.api_version, "1.22");
        assert_eq!(version.go_version, "go1.5.3");
        assert_eq!(version.git_commit, "20f81dd");
        assert_eq!(version.os, "linux");
        assert_eq!(version.arch, "amd64");
        assert_eq!(version.kernel_version, "3.16.0-53-generic");
        assert!(version.min_api_version.is_none());
    }

    #[test]
    fn info_tolerates_unknown_and_missing_keys() {
        let info: SystemInfo =
            serde_json::from_str(r#"{"ID":"7TRN","NCPU":4,"Swarm":{"NodeID":""}}"#).unwrap();
        assert_eq!(info.id, "7TRN");
        assert_eq!(info.ncpu, 4);
        assert_eq!(info.containers, 0);
    }
}
