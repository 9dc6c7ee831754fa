//! Post-provisioning connectivity check.
//!
//! Runs as the freshly created service account, not the administrative
//! one - the whole point is to catch grant or host-scope mistakes the
//! administrative path would mask.

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use dialoguer::Password;

use crate::config::DatabaseConfig;

/// One round-trip query as the service account. Prompts once for that
/// account's password; the prompt is labeled to distinguish it from any
/// earlier administrative prompt.
pub fn verify(config: &DatabaseConfig) -> Result<()> {
    let password = Password::new()
        .with_prompt(format!(
            "Password for service account '{}' (to test connectivity)",
            config.user
        ))
        .interact()
        .context("reading service account password")?;

    let args = client_args(config, &password);
    let output = Command::new("mysql")
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .context("running the database client")?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        anyhow::bail!("connection as '{}' failed: {}", config.user, stderr);
    }
}

fn client_args(config: &DatabaseConfig, password: &str) -> Vec<String> {
    vec![
        "-u".to_string(),
        config.user.clone(),
        format!("--password={}", password),
        "-h".to_string(),
        config.host.clone(),
        "-P".to_string(),
        config.port.to_string(),
        "-D".to_string(),
        config.name.clone(),
        "-e".to_string(),
        "SELECT 1;".to_string(),
    ]
}
