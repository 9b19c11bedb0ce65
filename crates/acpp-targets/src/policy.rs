//! Backend policy: multipass mode and host compiler selection.
//!
//! The decision is a pure function of the resolved configuration and the
//! parsed targets. Conflicts never fail the invocation: a combination that
//! cannot share one compiler pass is moved to explicit multipass with an
//! advisory warning instead.

use acpp_config::ResolvedConfig;

use crate::backend::{BackendKind, MultipassMode};
use crate::error::{Result, TargetError};
use crate::invocation::{BackendInvocation, CompilerPreference};
use crate::spec::TargetSpec;

/// Backends that cannot share an integrated compiler pass.
const EXCLUSIVE_IN_INTEGRATED_MODE: (BackendKind, BackendKind) = (BackendKind::Hip, BackendKind::Cuda);

/// The outcome of backend selection for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDecision {
    /// Requested targets, in the order given.
    pub targets: Vec<TargetSpec>,
    /// Elaborated backends, parallel to `targets`.
    pub backends: Vec<BackendInvocation>,
    pub multipass_mode: MultipassMode,
    /// Executable used for the host pass.
    pub host_compiler: String,
    /// Advisory messages, in the order the rules produced them.
    pub warnings: Vec<String>,
}

impl BackendDecision {
    /// Whether `backend` was requested.
    pub fn has_backend(&self, backend: BackendKind) -> bool {
        self.backends.iter().any(|b| b.backend() == backend)
    }
}

/// Decide multipass mode, backend variants and host compiler.
pub fn decide(config: &ResolvedConfig, targets: &[TargetSpec]) -> Result<BackendDecision> {
    let mut warnings = Vec::new();

    // 1. Conflict detection
    let mut mode = if config.flag("is-explicit-multipass")? {
        MultipassMode::Explicit
    } else {
        MultipassMode::Integrated
    };
    let requested = |kind: BackendKind| targets.iter().any(|t| t.backend == kind);
    let (a, b) = EXCLUSIVE_IN_INTEGRATED_MODE;
    if requested(a) && requested(b) && mode != MultipassMode::Explicit {
        warnings.push(
            "CUDA and HIP cannot be targeted simultaneously in non-explicit multipass; \
             enabling explicit multipass compilation."
                .to_string(),
        );
        mode = MultipassMode::Explicit;
    }

    // 2. Per-backend elaboration
    let mut backends = Vec::with_capacity(targets.len());
    for spec in targets {
        let mut backend = BackendInvocation::elaborate(spec, config, mode)?;

        // 4. The global mode overrides any disagreeing per-backend default
        if let Some(own) = backend.default_multipass().filter(|own| *own != mode) {
            let requested_name = backend.unique_name();
            backend.apply_multipass(mode);
            warnings.push(format!(
                "backend {requested_name} operates in {own} by default, but {mode} is in effect; \
                 using {}.",
                backend.unique_name()
            ));
        }
        log::debug!("elaborated target {spec} as {}", backend.unique_name());
        backends.push(backend);
    }

    // 3. Host compiler selection
    let host_compiler = select_host_compiler(config, &backends)?;
    log::debug!("selected host compiler {host_compiler} ({mode})");

    Ok(BackendDecision {
        targets: targets.to_vec(),
        backends,
        multipass_mode: mode,
        host_compiler,
        warnings,
    })
}

/// Highest-priority compiler preference; the first listed backend wins ties.
///
/// Falls back to `cpu-compiler` when no backend offers a preference.
pub fn select_host_compiler(config: &ResolvedConfig, backends: &[BackendInvocation]) -> Result<String> {
    let mut best: Option<CompilerPreference> = None;
    for backend in backends {
        let Some(pref) = backend.compiler_preference(config)? else {
            continue;
        };
        if best.as_ref().map_or(true, |b| pref.priority > b.priority) {
            best = Some(pref);
        }
    }
    if let Some(pref) = best {
        return Ok(pref.executable);
    }
    config
        .optional_value("cpu-compiler")?
        .map(str::to_string)
        .ok_or_else(|| TargetError::NoHostCompiler {
            option: "cpu-compiler (--acpp-cpu-cxx)".into(),
        })
}
