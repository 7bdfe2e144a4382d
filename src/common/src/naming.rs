//! Container names for workspace machines.
//!
//! A machine's container (and the images committed from it) is named
//! `<user>_<workspace id>_<machine id>_<machine name>`, lowercased. The
//! workspace and machine ids are fixed-width generated tokens, so decoding
//! anchors on them and treats whatever surrounds them as the user and
//! machine names.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const WORKSPACE_ID_PATTERN: &str = "workspace[0-9a-z]{16}";
const MACHINE_ID_PATTERN: &str = "machine[0-9a-z]{16}";

const SEPARATOR: char = '_';

static IDENTITY_INFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?P<workspace>{WORKSPACE_ID_PATTERN}){SEPARATOR}(?P<machine>{MACHINE_ID_PATTERN})"
    ))
    .expect("identity infix pattern is valid")
});

/// Identity of a workspace machine as carried by its container name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerIdentity {
    pub user_name: String,
    pub workspace_id: String,
    pub machine_id: String,
    pub machine_name: String,
}

impl ContainerIdentity {
    pub fn new(
        user_name: impl Into<String>,
        workspace_id: impl Into<String>,
        machine_id: impl Into<String>,
        machine_name: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            workspace_id: workspace_id.into(),
            machine_id: machine_id.into(),
            machine_name: machine_name.into(),
        }
    }

    /// Container name for this identity, see [`encode`].
    pub fn container_name(&self) -> String {
        encode(
            &self.user_name,
            &self.workspace_id,
            &self.machine_id,
            &self.machine_name,
        )
    }
}

impl fmt::Display for ContainerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user={} workspace={} machine={} name={}",
            self.user_name, self.workspace_id, self.machine_id, self.machine_name
        )
    }
}

/// Builds the container name for a machine.
///
/// Fields are joined with `_` and the result is lowercased. Underscores inside
/// `user_name` or `machine_name` are not escaped.
pub fn encode(user_name: &str, workspace_id: &str, machine_id: &str, machine_name: &str) -> String {
    format!(
        "{user_name}{SEPARATOR}{workspace_id}{SEPARATOR}{machine_id}{SEPARATOR}{machine_name}"
    )
    .to_lowercase()
}

/// Parses a container or image name produced by [`encode`].
///
/// Anything up to and including the first `/` is dropped first, which covers
/// both registry namespaces (`eclipse-che/<name>`) and the leading slash the
/// daemon reports on container names. Returns `None` for names that carry no
/// workspace/machine infix; those belong to someone else.
pub fn decode(name: &str) -> Option<ContainerIdentity> {
    let name = match name.find('/') {
        Some(idx) => &name[idx + 1..],
        None => name,
    };

    let captures = IDENTITY_INFIX.captures(name)?;
    let infix = captures.get(0)?;

    let user_name = name[..infix.start()]
        .strip_suffix(SEPARATOR)
        .unwrap_or(&name[..infix.start()]);
    let machine_name = name[infix.end()..]
        .strip_prefix(SEPARATOR)
        .unwrap_or(&name[infix.end()..]);

    Some(ContainerIdentity {
        user_name: user_name.to_string(),
        workspace_id: captures["workspace"].to_string(),
        machine_id: captures["machine"].to_string(),
        machine_name: machine_name.to_string(),
    })
}

/// Machine name carried by a container or image name, if it is one of ours.
pub fn machine_name(name: &str) -> Option<String> {
    decode(name).map(|identity| identity.machine_name)
}
