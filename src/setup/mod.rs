//! Top-level provisioning sequence.
//!
//! Strictly sequential: privilege check, package manager detection,
//! install-if-absent, start-if-stopped, auth probe, schema and account
//! provisioning, connectivity verification, optional seed data. Any
//! failure is terminal - no retry, no rollback. Partial state is left in
//! place for inspection; since every batch is idempotent, the recovery
//! story is simply "run it again".

use colored::*;

use crate::config::{DatabaseConfig, SetupOptions};
use crate::db::auth;
use crate::db::schema;
use crate::db::sql::SqlError;
use crate::db::verify;
use crate::error::SetupError;
use crate::pm;
use crate::privilege;
use crate::service::ServiceController;
use crate::ui;

/// States of the provisioning run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    PrivilegeCheck,
    Detect,
    EnsureInstalled,
    EnsureRunning,
    AuthProbe,
    ProvisionSchema,
    ProvisionUser,
    Verify,
    Seed,
}

impl SetupStep {
    pub fn title(&self) -> &'static str {
        match self {
            Self::PrivilegeCheck => "Check privileges",
            Self::Detect => "Detect package manager",
            Self::EnsureInstalled => "Install database service",
            Self::EnsureRunning => "Start database service",
            Self::AuthProbe => "Probe administrative authentication",
            Self::ProvisionSchema => "Create database and schema",
            Self::ProvisionUser => "Create service account",
            Self::Verify => "Verify connectivity",
            Self::Seed => "Insert sample data",
        }
    }
}

/// The step sequence a run with these options will execute. `--test-only`
/// is the single non-linear path: straight to verification.
pub(crate) fn plan(options: &SetupOptions) -> Vec<SetupStep> {
    if options.test_only {
        return vec![SetupStep::Verify];
    }
    let mut steps = vec![
        SetupStep::PrivilegeCheck,
        SetupStep::Detect,
        SetupStep::EnsureInstalled,
        SetupStep::EnsureRunning,
        SetupStep::AuthProbe,
        SetupStep::ProvisionSchema,
        SetupStep::ProvisionUser,
        SetupStep::Verify,
    ];
    if options.sample_data {
        steps.push(SetupStep::Seed);
    }
    steps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepStatus {
    Pass,
    Warn,
}

struct StepOutcome {
    step: SetupStep,
    status: StepStatus,
    message: String,
}

/// Run the full setup. Returns the first terminal failure; `main` maps
/// that to exit code 1.
pub fn run(options: &SetupOptions) -> Result<(), SetupError> {
    let config = DatabaseConfig::resolve(&options.config_path);
    if options.verbose {
        ui::detail(&format!(
            "target: database '{}' on {}, service account '{}'",
            config.name,
            config.endpoint(),
            config.user
        ));
    }

    if options.test_only {
        return run_test_only(&config);
    }

    let steps = plan(options);
    let total = steps.len();
    let mut banner = StepBanner::new(total);
    let mut report: Vec<StepOutcome> = Vec::new();

    // PrivilegeCheck
    banner.next(SetupStep::PrivilegeCheck);
    privilege::require_provisioning_privileges()?;
    let privilege_note = if privilege::is_root() {
        "running as root"
    } else {
        "sudo available for escalation"
    };
    if options.verbose {
        ui::detail(privilege_note);
    }
    report.push(pass(SetupStep::PrivilegeCheck, privilege_note));

    // Detect
    banner.next(SetupStep::Detect);
    let Some(manager) = pm::detect::detect() else {
        return Err(SetupError::Detection);
    };
    ui::success(&format!("found {}", manager));
    report.push(pass(SetupStep::Detect, manager.display_name()));

    // EnsureInstalled
    banner.next(SetupStep::EnsureInstalled);
    if which::which("mysql").is_ok() {
        ui::success("database client already installed");
        report.push(pass(SetupStep::EnsureInstalled, "already installed"));
    } else {
        pm::install::install(manager)?;
        ui::success("database service installed");
        report.push(pass(SetupStep::EnsureInstalled, "installed"));
    }

    // EnsureRunning
    banner.next(SetupStep::EnsureRunning);
    let controller = ServiceController::new(manager.init_system());
    let service = manager.service_name();
    if controller.is_active(service) {
        ui::success(&format!("service '{}' already running", service));
        report.push(pass(SetupStep::EnsureRunning, "already running"));
    } else {
        if let Err(err) = controller.start(service) {
            ui::warning(&format!("start command failed: {:#}", err));
        }
        if let Err(err) = controller.enable(service) {
            ui::warning(&format!("enable command failed: {:#}", err));
        }
        controller.wait_for_startup();
        if !controller.is_active(service) {
            return Err(SetupError::ServiceStart(service));
        }
        ui::success(&format!("service '{}' started", service));
        report.push(pass(SetupStep::EnsureRunning, "started and enabled"));
    }

    // AuthProbe
    banner.next(SetupStep::AuthProbe);
    let auth_outcome = auth::probe(&config);
    let Some(strategy) = auth_outcome.strategy else {
        return Err(SetupError::Auth);
    };
    ui::success(&format!("authenticated via {}", strategy.display_name()));
    if auth_outcome.requires_interactive_password {
        ui::warning("each provisioning step will prompt for the root password again");
    }
    report.push(pass(SetupStep::AuthProbe, strategy.display_name()));

    // ProvisionSchema
    banner.next(SetupStep::ProvisionSchema);
    provision(
        SetupStep::ProvisionSchema,
        "schema creation",
        schema::create_database(&config, &auth_outcome),
        &mut report,
    )?;
    ui::success(&format!("database '{}' and tables ready", config.name));

    // ProvisionUser
    banner.next(SetupStep::ProvisionUser);
    provision(
        SetupStep::ProvisionUser,
        "service account creation",
        schema::create_user(&config, &auth_outcome),
        &mut report,
    )?;
    ui::success(&format!("service account '{}' ready", config.user));

    // Verify
    banner.next(SetupStep::Verify);
    if let Err(err) = verify::verify(&config) {
        ui::error(&format!("{:#}", err));
        return Err(SetupError::Connectivity(config.user.clone()));
    }
    ui::success("connectivity verified");
    report.push(pass(SetupStep::Verify, "round-trip query succeeded"));

    // Seed (optional, never fatal)
    if options.sample_data {
        banner.next(SetupStep::Seed);
        match schema::seed(&config, &auth_outcome) {
            Ok(()) => {
                ui::success("sample data inserted");
                report.push(pass(SetupStep::Seed, "inserted"));
            }
            Err(err) => {
                report_sql_failure("seed data", &err);
                ui::warning("continuing without sample data");
                report.push(StepOutcome {
                    step: SetupStep::Seed,
                    status: StepStatus::Warn,
                    message: "failed, schema unaffected".to_string(),
                });
            }
        }
    }

    print_summary(&report, &config);
    Ok(())
}

fn run_test_only(config: &DatabaseConfig) -> Result<(), SetupError> {
    ui::info(&format!(
        "Test-only mode: verifying connectivity for '{}' on {}",
        config.user,
        config.endpoint()
    ));
    match verify::verify(config) {
        Ok(()) => {
            ui::success("connectivity verified");
            Ok(())
        }
        Err(err) => {
            ui::error(&format!("{:#}", err));
            Err(SetupError::Connectivity(config.user.clone()))
        }
    }
}

/// Run a fatal provisioning batch: failures log captured diagnostics and
/// convert to the terminal error for this stage.
fn provision(
    step: SetupStep,
    stage: &'static str,
    result: Result<(), SqlError>,
    report: &mut Vec<StepOutcome>,
) -> Result<(), SetupError> {
    match result {
        Ok(()) => {
            report.push(pass(step, "done"));
            Ok(())
        }
        Err(err) => {
            report_sql_failure(stage, &err);
            Err(SetupError::Sql(stage))
        }
    }
}

fn report_sql_failure(stage: &str, err: &SqlError) {
    ui::error(&format!("{} failed: {}", stage, err));
    if let SqlError::Failed { stderr } = err
        && !stderr.is_empty()
    {
        ui::diagnostics(stderr);
    }
}

fn pass(step: SetupStep, message: &str) -> StepOutcome {
    StepOutcome {
        step,
        status: StepStatus::Pass,
        message: message.to_string(),
    }
}

struct StepBanner {
    index: usize,
    total: usize,
}

impl StepBanner {
    fn new(total: usize) -> Self {
        Self { index: 0, total }
    }

    fn next(&mut self, step: SetupStep) {
        self.index += 1;
        ui::step(self.index, self.total, step.title());
    }
}

fn print_summary(report: &[StepOutcome], config: &DatabaseConfig) {
    println!();
    println!(
        "{: <36} [{}] {}",
        "Step".bold(),
        "Status".bold(),
        "Result".bold()
    );
    for outcome in report {
        let status = match outcome.status {
            StepStatus::Pass => "PASS".green(),
            StepStatus::Warn => "WARN".yellow(),
        };
        println!(
            "{: <36} [{}] {}",
            outcome.step.title(),
            status,
            outcome.message
        );
    }
    println!();
    ui::success(&format!(
        "Database '{}' is ready at {}",
        config.name,
        config.endpoint()
    ));
    ui::info(&format!(
        "The application can connect as '{}' with the configured password",
        config.user
    ));
    ui::info("Consider running mysql_secure_installation to harden the server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn options(sample_data: bool, test_only: bool) -> SetupOptions {
        SetupOptions {
            sample_data,
            test_only,
            verbose: false,
            config_path: PathBuf::from("db_config.json"),
        }
    }

    #[test]
    fn test_full_plan_order() {
        let steps = plan(&options(false, false));
        assert_eq!(
            steps,
            vec![
                SetupStep::PrivilegeCheck,
                SetupStep::Detect,
                SetupStep::EnsureInstalled,
                SetupStep::EnsureRunning,
                SetupStep::AuthProbe,
                SetupStep::ProvisionSchema,
                SetupStep::ProvisionUser,
                SetupStep::Verify,
            ]
        );
    }

    #[test]
    fn test_sample_data_appends_seed_after_verify() {
        let steps = plan(&options(true, false));
        assert_eq!(steps.last(), Some(&SetupStep::Seed));
        let verify_pos = steps.iter().position(|s| *s == SetupStep::Verify).unwrap();
        assert_eq!(verify_pos, steps.len() - 2);
    }

    #[test]
    fn test_test_only_short_circuits_to_verify() {
        let steps = plan(&options(false, true));
        assert_eq!(steps, vec![SetupStep::Verify]);
    }

    #[test]
    fn test_test_only_ignores_sample_data() {
        let steps = plan(&options(true, true));
        assert_eq!(steps, vec![SetupStep::Verify]);
    }

    #[test]
    fn test_auth_probe_precedes_all_provisioning() {
        let steps = plan(&options(true, false));
        let probe = steps
            .iter()
            .position(|s| *s == SetupStep::AuthProbe)
            .unwrap();
        for provisioning in [
            SetupStep::ProvisionSchema,
            SetupStep::ProvisionUser,
            SetupStep::Seed,
        ] {
            let pos = steps.iter().position(|s| *s == provisioning).unwrap();
            assert!(probe < pos);
        }
    }
}
