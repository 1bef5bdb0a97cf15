//! Native toolchain invocation.
//!
//! Builds the generated program into an executable linked against the
//! FastCGI and MySQL client libraries. The compiler's stderr goes straight
//! into the diagnostic log.

use std::fmt;
use std::io;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::diagnostics::DiagnosticLog;
use crate::naming::{executable_name, source_path};

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("No supported build command on this OS ({os})")]
    Unavailable { os: &'static str },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Build of {executable} failed ({status})")]
    Failed { executable: String, status: ExitStatus },

    #[error("Could not write diagnostic log: {0}")]
    Log(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Linux,
    Unix,
    Windows,
    Other,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(unix) {
            Self::Unix
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::Unix => "Unix",
            Self::Windows => "Windows",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildCommand {
    /// The compiler invocation for `base.c -> base.exe`. `extra_flags` are
    /// appended last (database client flags).
    pub fn for_platform(
        platform: HostPlatform,
        base: &str,
        extra_flags: &[String],
    ) -> Result<Self, ToolchainError> {
        let mut args: Vec<String> = ["-g", "-std=c99", "-Wall"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        match platform {
            HostPlatform::Linux => {}
            HostPlatform::Unix => args.push("-lfcgi".to_string()),
            HostPlatform::Windows | HostPlatform::Other => {
                return Err(ToolchainError::Unavailable {
                    os: platform.label(),
                })
            }
        }

        args.push("-o".to_string());
        args.push(executable_name(base));
        args.push(source_path(base).display().to_string());
        args.push("-lfcgi".to_string());
        args.extend(extra_flags.iter().cloned());

        Ok(Self {
            program: "gcc".to_string(),
            args,
        })
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Ask `mysql_config` for compile and link flags. `None` when it is not
/// installed or fails.
pub fn mysql_flags() -> Option<Vec<String>> {
    let output = Command::new("mysql_config")
        .args(["--cflags", "--libs"])
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let flags = String::from_utf8_lossy(&output.stdout);
    Some(flags.split_whitespace().map(str::to_string).collect())
}

/// Compile `base.c` into `base.exe`, recording the outcome in the log.
pub fn build(base: &str, log: &mut DiagnosticLog) -> Result<(), ToolchainError> {
    build_on(HostPlatform::current(), base, log)
}

pub fn build_on(
    platform: HostPlatform,
    base: &str,
    log: &mut DiagnosticLog,
) -> Result<(), ToolchainError> {
    if matches!(platform, HostPlatform::Windows | HostPlatform::Other) {
        log.record(&format!(
            "Incorrect Operating System in use (OS: {}).",
            platform.label()
        ))?;
        log.record("This program cannot be run on this OS.")?;
        log.record("Please move to a Linux/Unix OS to use this.")?;
        return Err(ToolchainError::Unavailable {
            os: platform.label(),
        });
    }

    log.record(&format!(
        "Correct Operating System in use (OS: {}).",
        platform.label()
    ))?;

    let extra_flags = mysql_flags().unwrap_or_else(|| {
        debug!("mysql_config unavailable, building without database flags");
        Vec::new()
    });
    if extra_flags.is_empty() {
        log.record("mysql_config not found; building without MySQL flags.")?;
    }

    let command = BuildCommand::for_platform(platform, base, &extra_flags)?;
    info!(%command, "invoking native toolchain");

    let status = command
        .to_command()
        .stderr(Stdio::from(log.sink()?))
        .status()
        .map_err(|source| ToolchainError::Spawn {
            program: command.program.clone(),
            source,
        })?;

    let executable = executable_name(base);
    if status.success() {
        log.record(&format!(
            "The file '{}' has been successfully compiled.",
            executable
        ))?;
        Ok(())
    } else {
        Err(ToolchainError::Failed { executable, status })
    }
}
