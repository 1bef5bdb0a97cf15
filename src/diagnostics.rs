//! Diagnostic Log - Append-Only Run Record
//!
//! Each run appends a timestamped session header followed by whatever the
//! run has to report. Existing content is never rewritten.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::validation::Rejection;

pub const DEFAULT_LOG_FILE: &str = "LHP.log";

const SESSION_RULE: &str = "========================";

pub struct DiagnosticLog {
    file: File,
    path: PathBuf,
}

impl DiagnosticLog {
    /// Open (or create) the log in append mode and write a session header.
    pub fn open(path: &Path) -> io::Result<Self> {
        Self::open_at(path, Local::now())
    }

    pub fn open_at(path: &Path, now: DateTime<Local>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut log = Self {
            file,
            path: path.to_path_buf(),
        };
        log.file.write_all(session_header(now).as_bytes())?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.file, "{}", message)?;
        self.file.flush()
    }

    /// One entry per violated rule, naming the template file.
    pub fn record_rejection(&mut self, file_name: &str, rejection: &Rejection) -> io::Result<()> {
        for violation in &rejection.violations {
            self.record(&format!("Error with {} file! {}", file_name, violation))?;
        }
        Ok(())
    }

    /// A handle that child processes can write their stderr into.
    pub fn sink(&self) -> io::Result<File> {
        self.file.try_clone()
    }
}

/// Blank line, rule, `asctime`-style local timestamp, rule.
pub fn session_header(now: DateTime<Local>) -> String {
    format!(
        "\n{}\n{}\n{}\n",
        SESSION_RULE,
        now.format("%a %b %e %H:%M:%S %Y"),
        SESSION_RULE
    )
}
