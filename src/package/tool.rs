//! External tool invocation.

use std::process::Command;

use crate::error::{ImpError, Result};

/// Outcome of an external tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

impl ToolStatus {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            stderr: String::new(),
        }
    }
}

/// Runs an external program to completion.
pub trait ToolRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ToolStatus>;
}

/// Runs programs as blocking subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<ToolStatus> {
        let output = Command::new(program).args(args).output().map_err(|e| {
            ImpError::Package {
                message: format!("Failed to run {}: {}", program, e),
                help: Some(format!("Check that {} is installed and on PATH", program)),
            }
        })?;

        Ok(ToolStatus {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
