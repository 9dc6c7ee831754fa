use thiserror::Error;

use crate::pm::PackageManager;

/// Terminal failure conditions of a setup run. Every variant maps to exit
/// code 1; seed-data failure is deliberately absent (warning only).
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("root privileges or a working sudo are required to install the database service")]
    Privileges,

    #[error("no supported package manager found on this host")]
    Detection,

    #[error("package installation failed via {0}")]
    Install(PackageManager),

    #[error("database service '{0}' did not reach running state")]
    ServiceStart(&'static str),

    #[error("no authentication strategy succeeded for the administrative account")]
    Auth,

    #[error("SQL batch failed during {0}")]
    Sql(&'static str),

    #[error("connectivity check as '{0}' failed")]
    Connectivity(String),
}

impl SetupError {
    /// Actionable follow-up printed under the error line.
    pub fn remediation(&self) -> Option<String> {
        match self {
            Self::Privileges => {
                Some("Re-run as root, or install sudo for the current user.".to_string())
            }
            Self::Detection => Some(format!(
                "Supported package managers: {}.",
                PackageManager::supported_list()
            )),
            Self::Install(manager) => Some(format!(
                "Check the {} output above and your network connection, then re-run.",
                manager
            )),
            Self::ServiceStart(service) => Some(format!(
                "Inspect the service log, e.g. journalctl -u {}.",
                service
            )),
            Self::Auth => Some(
                "Verify the service is running, then try mysql_secure_installation to set a known root password."
                    .to_string(),
            ),
            Self::Connectivity(_) => Some(
                "Re-run without --test-only to (re)create the service account and its grants."
                    .to_string(),
            ),
            Self::Sql(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_remediation_lists_managers() {
        let hint = SetupError::Detection.remediation().unwrap();
        assert!(hint.contains("apt"));
        assert!(hint.contains("pacman"));
        assert!(hint.contains("apk"));
    }

    #[test]
    fn test_sql_failure_has_no_generic_hint() {
        assert!(SetupError::Sql("schema creation").remediation().is_none());
    }
}
