//! Package manager catalogue - SINGLE SOURCE OF TRUTH for how the database
//! service is installed on each supported distribution family.

pub mod detect;
pub mod install;

use crate::service::InitSystem;

/// A supported Linux package manager. The set is closed and known at
/// design time, so profile data lives in match arms rather than a
/// registry of trait objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    /// APT - Debian/Ubuntu family
    Apt,
    /// DNF - Fedora/RHEL family
    Dnf,
    /// Yum - older RHEL/CentOS
    Yum,
    /// Pacman - Arch Linux family
    Pacman,
    /// Zypper - openSUSE
    Zypper,
    /// apk - Alpine Linux
    Apk,
}

impl PackageManager {
    /// All supported managers in detection priority order. On a host where
    /// several probe successfully (e.g. a Debian box with a stray pacman
    /// binary), the earliest entry wins.
    pub const ALL: [PackageManager; 6] = [
        Self::Apt,
        Self::Dnf,
        Self::Yum,
        Self::Pacman,
        Self::Zypper,
        Self::Apk,
    ];

    /// Command whose zero exit status marks this manager as present.
    pub fn detect_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Apt => ("apt-get", &["--version"]),
            Self::Dnf => ("dnf", &["--version"]),
            Self::Yum => ("yum", &["--version"]),
            Self::Pacman => ("pacman", &["--version"]),
            Self::Zypper => ("zypper", &["--version"]),
            Self::Apk => ("apk", &["--version"]),
        }
    }

    /// Metadata refresh command. Failures here are reported but never
    /// abort the run.
    pub fn update_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Apt => ("apt-get", &["update"]),
            Self::Dnf => ("dnf", &["makecache"]),
            Self::Yum => ("yum", &["makecache"]),
            Self::Pacman => ("pacman", &["-Sy", "--noconfirm"]),
            Self::Zypper => ("zypper", &["refresh"]),
            Self::Apk => ("apk", &["update"]),
        }
    }

    /// Install command prefix; the package list is appended.
    pub fn install_command(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Apt => ("apt-get", &["install", "-y"]),
            Self::Dnf => ("dnf", &["install", "-y"]),
            Self::Yum => ("yum", &["install", "-y"]),
            Self::Pacman => ("pacman", &["-S", "--noconfirm", "--needed"]),
            Self::Zypper => ("zypper", &["install", "-y"]),
            Self::Apk => ("apk", &["add"]),
        }
    }

    /// Packages providing the MariaDB server and client on this family.
    pub fn packages(&self) -> &'static [&'static str] {
        match self {
            Self::Apt => &["mariadb-server", "mariadb-client"],
            Self::Dnf | Self::Yum => &["mariadb-server", "mariadb"],
            Self::Pacman => &["mariadb"],
            Self::Zypper => &["mariadb", "mariadb-client"],
            Self::Apk => &["mariadb", "mariadb-client", "mariadb-openrc"],
        }
    }

    /// Name of the installed service unit.
    pub fn service_name(&self) -> &'static str {
        // Every supported family ships the MariaDB unit under this name;
        // Debian keeps a mysql alias but the canonical unit is mariadb.
        "mariadb"
    }

    /// Init system the service is controlled through.
    pub fn init_system(&self) -> InitSystem {
        match self {
            Self::Apk => InitSystem::OpenRc,
            _ => InitSystem::Systemd,
        }
    }

    /// Whether the package leaves the data directory uninitialized
    /// (Arch ships the engine without running mariadb-install-db).
    pub fn needs_datadir_init(&self) -> bool {
        matches!(self, Self::Pacman)
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Apk => "apk",
        }
    }

    /// Comma-separated list of all supported managers, for error text.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|manager| manager.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        // apt outranks pacman so mixed hosts resolve deterministically
        let apt_pos = PackageManager::ALL
            .iter()
            .position(|m| *m == PackageManager::Apt)
            .unwrap();
        let pacman_pos = PackageManager::ALL
            .iter()
            .position(|m| *m == PackageManager::Pacman)
            .unwrap();
        assert!(apt_pos < pacman_pos);
    }

    #[test]
    fn test_every_manager_has_server_package() {
        for manager in PackageManager::ALL {
            assert!(
                manager
                    .packages()
                    .iter()
                    .any(|p| p.starts_with("mariadb")),
                "{} has no mariadb package",
                manager
            );
        }
    }

    #[test]
    fn test_init_system_assignment() {
        assert_eq!(PackageManager::Apk.init_system(), InitSystem::OpenRc);
        assert_eq!(PackageManager::Apt.init_system(), InitSystem::Systemd);
        assert_eq!(PackageManager::Pacman.init_system(), InitSystem::Systemd);
    }

    #[test]
    fn test_only_pacman_needs_datadir_init() {
        for manager in PackageManager::ALL {
            assert_eq!(
                manager.needs_datadir_init(),
                manager == PackageManager::Pacman
            );
        }
    }

    #[test]
    fn test_supported_list_mentions_all() {
        let list = PackageManager::supported_list();
        for manager in PackageManager::ALL {
            assert!(list.contains(manager.display_name()));
        }
    }
}
