//! The host compiler command for one invocation.

use std::fmt;
use std::process::Command;

use acpp_config::invocation::is_pure_linking_stage;
use acpp_config::ResolvedConfig;
use acpp_targets::BackendDecision;
use anyhow::{Context, Result};

/// Arguments that stop the compiler before the link step.
const NO_LINK_FLAGS: &[&str] = &["-c", "-S", "-E"];

/// A planned compiler execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl CompilerInvocation {
    /// Build the command from the backend decision.
    ///
    /// Layout: backend compile flags (skipped when only linking), the
    /// forwarded arguments in their original order, then backend link
    /// flags (skipped when the compiler stops before linking).
    pub fn plan(config: &ResolvedConfig, decision: &BackendDecision) -> Result<Self> {
        let forwarded = config.forwarded_args();
        let mut args = Vec::new();

        if !is_pure_linking_stage(forwarded) {
            for backend in &decision.backends {
                args.extend(backend.host_pass_flags(config)?);
            }
        }
        args.extend(forwarded.iter().cloned());
        if !forwarded.iter().any(|a| NO_LINK_FLAGS.contains(&a.as_str())) {
            for backend in &decision.backends {
                args.extend(backend.link_flags(config)?);
            }
        }

        Ok(Self {
            program: decision.host_compiler.clone(),
            args,
        })
    }

    /// Run the command and return its exit code.
    pub fn run(&self) -> Result<i32> {
        log::info!("executing: {self}");
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .with_context(|| format!("failed to execute host compiler '{}'", self.program))?;
        // A signal-terminated compiler has no exit code.
        Ok(status.code().unwrap_or(-1))
    }
}

impl fmt::Display for CompilerInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}
