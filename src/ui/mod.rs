//! Leveled terminal output for the setup run.

use colored::*;

/// Progress line for a step that is about to run or is in flight.
pub fn info(msg: &str) {
    println!("{} {}", "::".blue().bold(), msg);
}

/// A step finished as expected.
pub fn success(msg: &str) {
    println!("{} {}", "ok".green().bold(), msg);
}

/// Something went sideways but the run continues.
pub fn warning(msg: &str) {
    println!("{} {}", "warning:".yellow().bold(), msg);
}

/// Fatal condition; the caller decides whether to exit.
pub fn error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

/// Extra detail, only shown in verbose mode (callers gate on the flag).
pub fn detail(msg: &str) {
    println!("   {}", msg.dimmed());
}

/// Numbered step banner, e.g. `[3/8] Install database service`.
pub fn step(index: usize, total: usize, title: &str) {
    println!("{} {}", format!("[{}/{}]", index, total).bold(), title.bold());
}

/// Diagnostic text captured from a failed subprocess, indented under the
/// error line that preceded it.
pub fn diagnostics(text: &str) {
    for line in text.lines() {
        eprintln!("    {}", line.red());
    }
}
