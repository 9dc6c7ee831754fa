//! Administrative authentication probing.
//!
//! The host's auth configuration is unknown a priori - fresh installs
//! usually accept local peer (socket) auth for root, hardened ones want a
//! password. The prober discovers a working strategy empirically and the
//! rest of the run sticks with it.

use crate::config::DatabaseConfig;
use crate::db::sql;
use crate::ui;

/// How the administrative connection authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Local peer auth over the unix socket, elevated via sudo.
    Socket,
    /// Direct client connection, no password set.
    NoPassword,
    /// Interactive password prompt by the client.
    Password,
}

impl AuthStrategy {
    /// Probe order: least interactive and most likely on a fresh install
    /// first, escalating to the interactive prompt only as a last resort.
    pub const PROBE_ORDER: [AuthStrategy; 3] =
        [Self::Socket, Self::NoPassword, Self::Password];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Socket => "socket authentication (sudo)",
            Self::NoPassword => "root without password",
            Self::Password => "root with password",
        }
    }
}

/// Result of the probe. Produced once, read by every later SQL call.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub strategy: Option<AuthStrategy>,
    pub succeeded: bool,
    pub requires_interactive_password: bool,
}

impl AuthOutcome {
    pub fn for_strategy(strategy: AuthStrategy) -> Self {
        Self {
            strategy: Some(strategy),
            succeeded: true,
            requires_interactive_password: strategy == AuthStrategy::Password,
        }
    }

    pub fn failed() -> Self {
        Self {
            strategy: None,
            succeeded: false,
            requires_interactive_password: false,
        }
    }
}

/// Try each strategy in order with a trivial query; the first success
/// fixes the strategy for the remainder of the run.
pub fn probe(config: &DatabaseConfig) -> AuthOutcome {
    probe_with(|strategy| attempt(strategy, config))
}

pub(crate) fn probe_with(attempt: impl Fn(AuthStrategy) -> bool) -> AuthOutcome {
    for strategy in AuthStrategy::PROBE_ORDER {
        if attempt(strategy) {
            return AuthOutcome::for_strategy(strategy);
        }
    }
    AuthOutcome::failed()
}

fn attempt(strategy: AuthStrategy, config: &DatabaseConfig) -> bool {
    if strategy == AuthStrategy::Password {
        // The upcoming prompt comes from the mysql client itself; make it
        // unambiguous whose password is wanted.
        ui::info(
            "Trying password login; enter the password of the database ROOT account \
             (not the web service account)",
        );
    }
    let outcome = AuthOutcome::for_strategy(strategy);
    sql::execute("SELECT 1;", config, false, &outcome).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_first_successful_strategy_wins() {
        let outcome = probe_with(|_| true);
        assert!(outcome.succeeded);
        assert_eq!(outcome.strategy, Some(AuthStrategy::Socket));
        assert!(!outcome.requires_interactive_password);
    }

    #[test]
    fn test_falls_through_to_password() {
        let outcome = probe_with(|strategy| strategy == AuthStrategy::Password);
        assert!(outcome.succeeded);
        assert_eq!(outcome.strategy, Some(AuthStrategy::Password));
        assert!(outcome.requires_interactive_password);
    }

    #[test]
    fn test_all_strategies_fail() {
        let outcome = probe_with(|_| false);
        assert!(!outcome.succeeded);
        assert_eq!(outcome.strategy, None);
    }

    #[test]
    fn test_probe_order_is_fixed() {
        let attempts = RefCell::new(Vec::new());
        let _ = probe_with(|strategy| {
            attempts.borrow_mut().push(strategy);
            false
        });
        assert_eq!(
            *attempts.borrow(),
            vec![
                AuthStrategy::Socket,
                AuthStrategy::NoPassword,
                AuthStrategy::Password
            ]
        );
    }

    #[test]
    fn test_probe_stops_after_success() {
        let attempts = RefCell::new(0);
        let outcome = probe_with(|strategy| {
            *attempts.borrow_mut() += 1;
            strategy == AuthStrategy::NoPassword
        });
        assert_eq!(*attempts.borrow(), 2);
        assert_eq!(outcome.strategy, Some(AuthStrategy::NoPassword));
    }
}
