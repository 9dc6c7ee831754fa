//! Package manager detection.

use std::process::{Command, Stdio};

use super::PackageManager;

/// Probe the host for an available package manager. Returns the first
/// catalogue entry whose detection command exits zero, or `None` when no
/// manager is usable (the caller treats that as fatal - there is no way
/// to install the service without one).
pub fn detect() -> Option<PackageManager> {
    detect_with(probe)
}

/// Detection core with an injectable probe, so priority and first-match
/// behavior are testable without spawning subprocesses.
pub(crate) fn detect_with(probe: impl Fn(PackageManager) -> bool) -> Option<PackageManager> {
    PackageManager::ALL.into_iter().find(|manager| probe(*manager))
}

fn probe(manager: PackageManager) -> bool {
    let (program, args) = manager.detect_command();
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        // Both apt and pacman "present": apt is earlier in the catalogue
        let detected = detect_with(|manager| {
            matches!(manager, PackageManager::Apt | PackageManager::Pacman)
        });
        assert_eq!(detected, Some(PackageManager::Apt));
    }

    #[test]
    fn test_later_manager_found_when_earlier_absent() {
        let detected = detect_with(|manager| manager == PackageManager::Zypper);
        assert_eq!(detected, Some(PackageManager::Zypper));
    }

    #[test]
    fn test_none_when_no_probe_succeeds() {
        assert_eq!(detect_with(|_| false), None);
    }

    #[test]
    fn test_every_manager_is_probed_at_most_once() {
        use std::cell::RefCell;
        let probed = RefCell::new(Vec::new());
        let _ = detect_with(|manager| {
            probed.borrow_mut().push(manager);
            false
        });
        assert_eq!(probed.borrow().len(), PackageManager::ALL.len());
    }
}
