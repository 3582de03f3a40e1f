//! Colored, verbosity-gated stderr logger.
//!
//! Direct generalization of the teacher's hand-rolled logger: level tags in
//! ANSI color, a `progress_active` flag so a single-line progress refresh
//! (carriage-return redrawn) is cleared before a log line interrupts it, then
//! resumes on the observer's next tick.

use std::sync::atomic::{AtomicBool, Ordering};

const GREEN: &str = "\x1b[0;32m";
const RED: &str = "\x1b[0;31m";
const MAGENTA: &str = "\x1b[0;35m";
const CYAN: &str = "\x1b[0;96m";
const NC: &str = "\x1b[0m";

pub struct Logger {
    verbose: u8,
    progress_active: AtomicBool,
}

impl Logger {
    pub fn new(verbose: u8) -> Self {
        Self {
            verbose,
            progress_active: AtomicBool::new(false),
        }
    }

    /// Marks whether a single-line progress bar currently owns the cursor.
    pub fn set_progress_active(&self, active: bool) {
        self.progress_active.store(active, Ordering::Relaxed);
    }

    fn emit(&self, msg: &str) {
        if self.progress_active.load(Ordering::Relaxed) {
            eprint!("\r\x1b[K");
        }
        eprintln!("{msg}");
    }

    pub fn info(&self, msg: &str) {
        self.emit(&format!("{GREEN}[INFO]{NC} {msg}"));
    }

    pub fn error(&self, msg: &str) {
        self.emit(&format!("{RED}[ERROR]{NC} {msg}"));
    }

    pub fn debug(&self, msg: &str) {
        if self.verbose >= 1 {
            self.emit(&format!("{MAGENTA}[DEBUG]{NC} {msg}"));
        }
    }

    pub fn trace(&self, msg: &str) {
        if self.verbose >= 2 {
            self.emit(&format!("{CYAN}[TRACE]{NC} {msg}"));
        }
    }
}
