//! Database service installation through a detected package manager.

use anyhow::{Context, Result};
use duct::cmd;

use super::PackageManager;
use crate::error::SetupError;
use crate::privilege;
use crate::ui;

/// Install the database service: metadata refresh (best-effort), package
/// install (fatal on failure), then per-manager post-install quirks
/// (best-effort). Starting the service is the orchestrator's job, which
/// re-verifies running state independently. Safe to call when the
/// packages are already installed.
pub fn install(manager: PackageManager) -> Result<(), SetupError> {
    refresh_metadata(manager);

    ui::info(&format!(
        "Installing {} via {}",
        manager.packages().join(", "),
        manager
    ));
    if let Err(err) = install_packages(manager) {
        ui::error(&format!("package installation failed: {:#}", err));
        return Err(SetupError::Install(manager));
    }

    post_install(manager);
    Ok(())
}

/// Refresh package metadata. Mirror or network hiccups here should not
/// kill the run; the install step will surface real problems.
fn refresh_metadata(manager: PackageManager) {
    let (program, args) = manager.update_command();
    ui::info(&format!("Refreshing {} package metadata", manager));
    let (head, rest) = privilege::privileged_parts(program, args);
    match cmd(head, rest).unchecked().run() {
        Ok(output) if output.status.success() => {}
        Ok(_) => ui::warning(&format!(
            "{} metadata refresh failed; continuing with cached metadata",
            manager
        )),
        Err(err) => ui::warning(&format!("could not run {} update: {}", manager, err)),
    }
}

fn install_packages(manager: PackageManager) -> Result<()> {
    let (program, base_args) = manager.install_command();
    let mut args: Vec<&str> = base_args.to_vec();
    args.extend(manager.packages());

    let (head, rest) = privilege::privileged_parts(program, &args);
    cmd(head, rest)
        .run()
        .with_context(|| format!("installing packages with {}", manager))?;
    Ok(())
}

/// Platform quirks that the package itself does not take care of.
fn post_install(manager: PackageManager) {
    if manager.needs_datadir_init() {
        ui::info("Initializing MariaDB data directory");
        let (head, rest) = privilege::privileged_parts(
            "mariadb-install-db",
            &[
                "--user=mysql",
                "--basedir=/usr",
                "--datadir=/var/lib/mysql",
            ],
        );
        match cmd(head, rest).unchecked().run() {
            Ok(output) if output.status.success() => {}
            // Already-initialized data directories make this fail; the
            // service start that follows is the real arbiter.
            Ok(_) => ui::warning("data directory initialization reported an error"),
            Err(err) => ui::warning(&format!("could not run mariadb-install-db: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args_include_packages() {
        let (_, base_args) = PackageManager::Apt.install_command();
        let mut args: Vec<&str> = base_args.to_vec();
        args.extend(PackageManager::Apt.packages());
        assert!(args.contains(&"install"));
        assert!(args.contains(&"mariadb-server"));
        assert!(args.contains(&"mariadb-client"));
    }

    #[test]
    fn test_pacman_install_is_idempotent_flavored() {
        // --needed keeps reruns from reinstalling an up-to-date package
        let (_, base_args) = PackageManager::Pacman.install_command();
        assert!(base_args.contains(&"--needed"));
        assert!(base_args.contains(&"--noconfirm"));
    }
}
