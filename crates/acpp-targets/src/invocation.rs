//! Backend variants and their capabilities.
//!
//! Each requested backend is elaborated into exactly one
//! [`BackendInvocation`]. The variants share a small capability surface: a
//! unique name, the multipass mode they would pick on their own, a host
//! compiler preference and the extra flags they add to the host pass.

use acpp_config::ResolvedConfig;

use crate::backend::{BackendKind, Flavor, MultipassMode};
use crate::error::Result;
use crate::spec::TargetSpec;

/// A candidate host compiler and how strongly a backend wants it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerPreference {
    pub executable: String,
    pub priority: u32,
}

/// State shared by the clang-based GPU backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInvocation {
    /// Flavor given in `targets`, if any.
    pub flavor: Option<Flavor>,
    pub architectures: Vec<String>,
    /// Mode the backend runs in; follows the global mode once decided.
    pub multipass: MultipassMode,
}

/// One elaborated backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendInvocation {
    /// OpenMP with any OpenMP-capable host compiler.
    OmpLibraryOnly,
    /// OpenMP with clang compiler support for nd_range parallel_for.
    OmpAccelerated,
    Cuda(DeviceInvocation),
    CudaNvcxx { architecture: Option<String> },
    Hip(DeviceInvocation),
    /// The generic single-source, single-compiler-pass flow.
    Sscp,
}

impl BackendInvocation {
    /// Elaborate a target into its backend variant.
    ///
    /// GPU backends start in the mode their flavor pins, or in the global
    /// `mode` when the flavor does not pin one.
    pub fn elaborate(spec: &TargetSpec, config: &ResolvedConfig, mode: MultipassMode) -> Result<Self> {
        let device = || DeviceInvocation {
            flavor: spec.flavor,
            architectures: spec.architectures.clone(),
            multipass: spec.flavor.and_then(|f| f.multipass_mode()).unwrap_or(mode),
        };
        Ok(match spec.backend {
            BackendKind::Omp => {
                let accelerated = match spec.flavor {
                    Some(Flavor::Accelerated) => true,
                    Some(Flavor::LibraryOnly) => false,
                    _ => config.flag("use-accelerated-cpu")?,
                };
                if accelerated {
                    BackendInvocation::OmpAccelerated
                } else {
                    BackendInvocation::OmpLibraryOnly
                }
            }
            BackendKind::Cuda => BackendInvocation::Cuda(device()),
            BackendKind::Hip => BackendInvocation::Hip(device()),
            BackendKind::CudaNvcxx => BackendInvocation::CudaNvcxx {
                architecture: spec.architectures.first().cloned(),
            },
            BackendKind::Generic => BackendInvocation::Sscp,
        })
    }

    pub fn backend(&self) -> BackendKind {
        match self {
            BackendInvocation::OmpLibraryOnly | BackendInvocation::OmpAccelerated => BackendKind::Omp,
            BackendInvocation::Cuda(_) => BackendKind::Cuda,
            BackendInvocation::CudaNvcxx { .. } => BackendKind::CudaNvcxx,
            BackendInvocation::Hip(_) => BackendKind::Hip,
            BackendInvocation::Sscp => BackendKind::Generic,
        }
    }

    /// Unique name of the variant, e.g. `hip.explicit-multipass`.
    pub fn unique_name(&self) -> &'static str {
        match self {
            BackendInvocation::OmpLibraryOnly => "omp.library-only",
            BackendInvocation::OmpAccelerated => "omp.accelerated",
            BackendInvocation::Cuda(d) => match d.multipass {
                MultipassMode::Integrated => "cuda.integrated-multipass",
                MultipassMode::Explicit => "cuda.explicit-multipass",
            },
            BackendInvocation::CudaNvcxx { .. } => "cuda-nvcxx",
            BackendInvocation::Hip(d) => match d.multipass {
                MultipassMode::Integrated => "hip.integrated-multipass",
                MultipassMode::Explicit => "hip.explicit-multipass",
            },
            BackendInvocation::Sscp => "sscp",
        }
    }

    /// The multipass mode this variant insists on, if any.
    ///
    /// OpenMP runs in the host pass and has no preference. CUDA and HIP
    /// follow the global mode unless a flavor pins one. nvc++ and the
    /// generic flow always compile in a single integrated pass.
    pub fn default_multipass(&self) -> Option<MultipassMode> {
        match self {
            BackendInvocation::OmpLibraryOnly | BackendInvocation::OmpAccelerated => None,
            BackendInvocation::Cuda(d) | BackendInvocation::Hip(d) => {
                d.flavor.and_then(|f| f.multipass_mode())
            }
            BackendInvocation::CudaNvcxx { .. } | BackendInvocation::Sscp => {
                Some(MultipassMode::Integrated)
            }
        }
    }

    /// Switch a GPU backend to `mode`. Other variants are unaffected.
    pub fn apply_multipass(&mut self, mode: MultipassMode) {
        if let BackendInvocation::Cuda(d) | BackendInvocation::Hip(d) = self {
            d.multipass = mode;
        }
    }

    /// The host compiler this variant wants, if its executable is configured.
    pub fn compiler_preference(&self, config: &ResolvedConfig) -> Result<Option<CompilerPreference>> {
        let (option, priority) = match self {
            BackendInvocation::OmpLibraryOnly => ("cpu-compiler", 1),
            BackendInvocation::OmpAccelerated
            | BackendInvocation::Cuda(_)
            | BackendInvocation::Hip(_)
            | BackendInvocation::Sscp => ("clang", 2),
            BackendInvocation::CudaNvcxx { .. } => ("nvcxx", 3),
        };
        Ok(config
            .optional_value(option)?
            .map(|executable| CompilerPreference {
                executable: executable.to_string(),
                priority,
            }))
    }

    /// Option holding the configured compile flags for this backend.
    fn cxx_flags_option(&self) -> Option<&'static str> {
        match self {
            BackendInvocation::OmpLibraryOnly | BackendInvocation::OmpAccelerated => Some("omp-cxx-flags"),
            BackendInvocation::Cuda(_) => Some("cuda-cxx-flags"),
            BackendInvocation::Hip(_) => Some("rocm-cxx-flags"),
            BackendInvocation::CudaNvcxx { .. } | BackendInvocation::Sscp => None,
        }
    }

    /// Option holding the configured link line for this backend.
    fn link_line_option(&self) -> Option<&'static str> {
        match self {
            BackendInvocation::OmpLibraryOnly | BackendInvocation::OmpAccelerated => Some("omp-link-line"),
            BackendInvocation::Cuda(_) => Some("cuda-link-line"),
            BackendInvocation::Hip(_) => Some("rocm-link-line"),
            BackendInvocation::CudaNvcxx { .. } | BackendInvocation::Sscp => None,
        }
    }

    /// Flags this backend adds to the host compiler invocation.
    pub fn host_pass_flags(&self, config: &ResolvedConfig) -> Result<Vec<String>> {
        let mut flags = split_configured(config, self.cxx_flags_option())?;
        match self {
            BackendInvocation::Cuda(d) if d.multipass == MultipassMode::Integrated => {
                flags.extend(["-x".to_string(), "cuda".to_string()]);
                flags.extend(d.architectures.iter().map(|a| format!("--cuda-gpu-arch={a}")));
                if let Some(path) = config.optional_value("cuda-path")? {
                    flags.push(format!("--cuda-path={path}"));
                }
            }
            BackendInvocation::Hip(d) if d.multipass == MultipassMode::Integrated => {
                flags.extend(["-x".to_string(), "hip".to_string()]);
                flags.extend(d.architectures.iter().map(|a| format!("--offload-arch={a}")));
                if let Some(path) = config.optional_value("rocm-path")? {
                    flags.push(format!("--rocm-path={path}"));
                }
            }
            BackendInvocation::CudaNvcxx { architecture } => {
                flags.push("-cuda".to_string());
                if let Some(cc) = architecture {
                    flags.push(format!("-gpu={cc}"));
                }
            }
            _ => {}
        }
        Ok(flags)
    }

    /// Configured link line arguments for this backend.
    pub fn link_flags(&self, config: &ResolvedConfig) -> Result<Vec<String>> {
        split_configured(config, self.link_line_option())
    }
}

fn split_configured(config: &ResolvedConfig, option: Option<&str>) -> Result<Vec<String>> {
    let Some(option) = option else {
        return Ok(Vec::new());
    };
    Ok(config
        .optional_value(option)?
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default())
}
