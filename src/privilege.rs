//! Privilege detection and escalation for system-level steps.

use std::process::Command;

use sudo::RunningAs;

use crate::error::SetupError;

/// True when the process already runs with root privileges.
pub fn is_root() -> bool {
    matches!(sudo::check(), RunningAs::Root)
}

/// True when a sudo binary is available for escalation.
pub fn can_escalate() -> bool {
    which::which("sudo").is_ok()
}

/// Installation and service control need root one way or another. Checked
/// once, up front, so the run fails before any system mutation.
pub fn require_provisioning_privileges() -> Result<(), SetupError> {
    if is_root() || can_escalate() {
        Ok(())
    } else {
        Err(SetupError::Privileges)
    }
}

/// Build a command that runs with root privileges: direct when already
/// root, prefixed with sudo otherwise.
pub fn privileged(program: &str, args: &[&str]) -> Command {
    if is_root() {
        let mut command = Command::new(program);
        command.args(args);
        command
    } else {
        let mut command = Command::new("sudo");
        command.arg(program).args(args);
        command
    }
}

/// Same escalation rule as [`privileged`], returned as `(program, args)`
/// for callers that assemble their own invocation.
pub fn privileged_parts(program: &str, args: &[&str]) -> (String, Vec<String>) {
    if is_root() {
        (
            program.to_string(),
            args.iter().map(|arg| arg.to_string()).collect(),
        )
    } else {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(program.to_string());
        full.extend(args.iter().map(|arg| arg.to_string()));
        ("sudo".to_string(), full)
    }
}
