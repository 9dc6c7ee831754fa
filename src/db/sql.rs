//! Administrative SQL execution through the mysql client binary.

use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::db::auth::{AuthOutcome, AuthStrategy};
use crate::privilege;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error("could not run the database client: {0}")]
    Client(#[from] std::io::Error),

    #[error("database client exited with an error")]
    Failed { stderr: String },

    #[error("no usable authentication strategy")]
    NoStrategy,
}

/// Run a SQL batch as the administrative account, using the connection
/// style fixed by the auth probe. With `use_named_database` the batch
/// runs against the configured database; otherwise server-level.
///
/// Stdin stays attached to the terminal so the interactive-password
/// strategy can prompt; stdout/stderr are captured and the stderr text is
/// returned verbatim on failure. No retries at this layer.
pub fn execute(
    sql: &str,
    config: &DatabaseConfig,
    use_named_database: bool,
    auth: &AuthOutcome,
) -> Result<(), SqlError> {
    let strategy = auth.strategy.ok_or(SqlError::NoStrategy)?;
    let args = client_args(sql, config, use_named_database, strategy);
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let mut command = match strategy {
        // Socket auth rides on local peer credentials of root
        AuthStrategy::Socket => privilege::privileged("mysql", &arg_refs),
        AuthStrategy::NoPassword | AuthStrategy::Password => {
            let mut command = Command::new("mysql");
            command.args(&arg_refs);
            command
        }
    };

    let output = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()?;

    if output.status.success() {
        Ok(())
    } else {
        Err(SqlError::Failed {
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Client arguments for a strategy, without the program or any sudo
/// prefix. Socket auth talks to the local peer socket and therefore
/// carries no endpoint flags; the database-selection flag, when present,
/// sits directly ahead of the final execute flag.
pub(crate) fn client_args(
    sql: &str,
    config: &DatabaseConfig,
    use_named_database: bool,
    strategy: AuthStrategy,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-u".to_string(), "root".to_string()];

    match strategy {
        AuthStrategy::Socket => {}
        AuthStrategy::NoPassword => {
            args.extend(endpoint_args(config));
        }
        AuthStrategy::Password => {
            // Bare -p: the client prompts on the terminal
            args.push("-p".to_string());
            args.extend(endpoint_args(config));
        }
    }

    if use_named_database {
        args.push("-D".to_string());
        args.push(config.name.clone());
    }

    args.push("-e".to_string());
    args.push(sql.to_string());
    args
}

fn endpoint_args(config: &DatabaseConfig) -> Vec<String> {
    vec![
        "-h".to_string(),
        config.host.clone(),
        "-P".to_string(),
        config.port.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DatabaseConfig {
        DatabaseConfig::default()
    }

    #[test]
    fn test_socket_args_omit_endpoint() {
        let args = client_args("SELECT 1;", &config(), false, AuthStrategy::Socket);
        assert_eq!(args, vec!["-u", "root", "-e", "SELECT 1;"]);
    }

    #[test]
    fn test_no_password_args_carry_endpoint() {
        let args = client_args("SELECT 1;", &config(), false, AuthStrategy::NoPassword);
        assert_eq!(
            args,
            vec!["-u", "root", "-h", "localhost", "-P", "3306", "-e", "SELECT 1;"]
        );
    }

    #[test]
    fn test_password_args_prompt_interactively() {
        let args = client_args("SELECT 1;", &config(), false, AuthStrategy::Password);
        assert!(args.contains(&"-p".to_string()));
        // Never an inline password
        assert!(!args.iter().any(|arg| arg.contains("Password123!")));
    }

    #[test]
    fn test_named_database_flag_precedes_execute_flag() {
        let args = client_args("SHOW TABLES;", &config(), true, AuthStrategy::Socket);
        let d = args.iter().position(|a| a == "-D").unwrap();
        let e = args.iter().position(|a| a == "-e").unwrap();
        assert_eq!(args[d + 1], "universal_db");
        assert!(d < e);
    }

    #[test]
    fn test_execute_refuses_failed_outcome() {
        let auth = AuthOutcome::failed();
        let result = execute("SELECT 1;", &config(), false, &auth);
        assert!(matches!(result, Err(SqlError::NoStrategy)));
    }
}
