//! The built-in option catalog.
//!
//! Every driver option has three external spellings: a command line flag
//! (`--acpp-<name>`), an environment variable (`ACPP_<NAME>`) and a key in
//! the config files (`default-<name>`). The registry is constructed once at
//! startup and handed by reference to the resolver and the policy engine.

use std::collections::BTreeSet;

use crate::error::{ConfigError, Result};

/// An immutable descriptor for one driver option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOption {
    /// Canonical key, e.g. `targets` or `is-explicit-multipass`.
    pub key: &'static str,
    /// Command line flag, e.g. `--acpp-targets`.
    pub cli_flag: &'static str,
    /// Environment variable, e.g. `ACPP_TARGETS`.
    pub env_var: &'static str,
    /// Key in the config-file database, e.g. `default-targets`.
    pub config_key: &'static str,
    /// Help text shown in the usage listing.
    pub description: &'static str,
    /// Boolean switch rather than a value-bearing option.
    pub is_flag: bool,
    /// Built-in default used when no source supplies a value.
    pub default_value: Option<&'static str>,
}

impl DriverOption {
    const fn value(
        key: &'static str,
        cli_flag: &'static str,
        env_var: &'static str,
        config_key: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            cli_flag,
            env_var,
            config_key,
            description,
            is_flag: false,
            default_value: None,
        }
    }

    const fn flag(
        key: &'static str,
        cli_flag: &'static str,
        env_var: &'static str,
        config_key: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            cli_flag,
            env_var,
            config_key,
            description,
            is_flag: true,
            default_value: None,
        }
    }

    const fn with_default(mut self, default_value: &'static str) -> Self {
        self.default_value = Some(default_value);
        self
    }
}

const TARGETS_HELP: &str = "\
Specify backends and targets to compile for. Example: --acpp-targets='omp;hip:gfx900,gfx906'
  Available backends:
    * omp - OpenMP CPU backend
             Backend Flavors:
             - omp.library-only: Works with any OpenMP enabled CPU compiler.
                                 Uses Boost.Fiber for nd_range parallel_for support.
             - omp.accelerated: Uses clang as host compiler to enable compiler support
                                for nd_range parallel_for (see --acpp-use-accelerated-cpu).
    * cuda - CUDA backend
             Requires specification of targets of the form sm_XY,
             e.g. sm_70 for Volta, sm_60 for Pascal
             Backend Flavors:
             - cuda.explicit-multipass: CUDA backend in explicit multipass mode
                                        (see --acpp-explicit-multipass)
             - cuda.integrated-multipass: Force CUDA backend to operate in integrated
                                          multipass mode.
    * cuda-nvcxx - CUDA backend with nvc++. Target specification is optional;
             if given requires the format ccXY.
    * hip  - HIP backend
             Requires specification of targets of the form gfxXYZ,
             e.g. gfx906 for Vega 20, gfx900 for Vega 10
             Backend Flavors:
             - hip.explicit-multipass: HIP backend in explicit multipass mode
                                       (see --acpp-explicit-multipass)
             - hip.integrated-multipass: Force HIP backend to operate in integrated
                                         multipass mode.
    * generic - use generic LLVM SSCP compilation flow, and JIT at runtime to target device";

const PREFETCH_HELP: &str = "\
AdaptiveCpp supports issuing automatic USM prefetch operations for allocations used inside
offloaded C++ PSTL algorithms. This flag determines the strategy for submitting such prefetches.
  Supported values are:
    * always      - Prefetches every allocation used by every stdpar kernel
    * never       - Disables prefetching
    * after-sync  - Prefetch all allocations used by the first kernel submitted after each
                    synchronization point. (Prefetches running on non-idling queues can be expensive!)
    * first       - Prefetch allocations only the very first time they are used in a kernel
    * auto        - Let AdaptiveCpp decide (default)";

const BUILTIN_OPTIONS: &[DriverOption] = &[
    DriverOption::value(
        "platform",
        "--acpp-platform",
        "ACPP_PLATFORM",
        "default-platform",
        "(deprecated) The platform that AdaptiveCpp should target. Valid values:\n\
         * cuda: Target NVIDIA CUDA GPUs\n\
         * rocm: Target AMD GPUs running on the ROCm platform\n\
         * cpu: Target only CPUs",
    ),
    DriverOption::value(
        "clang",
        "--acpp-clang",
        "ACPP_CLANG",
        "default-clang",
        "The path to the clang executable that should be used for compilation\n\
         (Note: *must* be compatible with the clang version that the\n\
         AdaptiveCpp clang plugin was compiled against!)",
    ),
    DriverOption::value(
        "nvcxx",
        "--acpp-nvcxx",
        "ACPP_NVCXX",
        "default-nvcxx",
        "The path to the nvc++ executable that should be used for compilation\n\
         with the cuda-nvcxx backend.",
    ),
    DriverOption::value(
        "cuda-path",
        "--acpp-cuda-path",
        "ACPP_CUDA_PATH",
        "default-cuda-path",
        "The path to the CUDA toolkit installation directory",
    ),
    DriverOption::value(
        "rocm-path",
        "--acpp-rocm-path",
        "ACPP_ROCM_PATH",
        "default-rocm-path",
        "The path to the ROCm installation directory",
    ),
    DriverOption::value(
        "gpu-arch",
        "--acpp-gpu-arch",
        "ACPP_GPU_ARCH",
        "default-gpu-arch",
        "(deprecated) The GPU architecture that should be targeted when compiling for GPUs.\n\
         For CUDA, the architecture has the form sm_XX, e.g. sm_60 for Pascal.\n\
         For ROCm, the architecture has the form gfxYYY, e.g. gfx900 for Vega 10, gfx906 for Vega 20.",
    ),
    DriverOption::value(
        "cpu-compiler",
        "--acpp-cpu-cxx",
        "ACPP_CPU_CXX",
        "default-cpu-cxx",
        "The compiler that should be used when targeting only CPUs.",
    ),
    DriverOption::value(
        "clang-include-path",
        "--acpp-clang-include-path",
        "ACPP_CLANG_INCLUDE_PATH",
        "default-clang-include-path",
        "The path to clang's internal include headers. Typically of the form\n\
         $PREFIX/include/clang/<version>/include. Only required by ROCm.",
    ),
    DriverOption::value(
        "sequential-link-line",
        "--acpp-sequential-link-line",
        "ACPP_SEQUENTIAL_LINK_LINE",
        "default-sequential-link-line",
        "The arguments passed to the linker for the sequential backend",
    ),
    DriverOption::value(
        "sequential-cxx-flags",
        "--acpp-sequential-cxx-flags",
        "ACPP_SEQUENTIAL_CXX_FLAGS",
        "default-sequential-cxx-flags",
        "The arguments passed to the compiler to compile for the sequential backend",
    ),
    DriverOption::value(
        "omp-link-line",
        "--acpp-omp-link-line",
        "ACPP_OMP_LINK_LINE",
        "default-omp-link-line",
        "The arguments passed to the linker for the OpenMP backend.",
    ),
    DriverOption::value(
        "omp-cxx-flags",
        "--acpp-omp-cxx-flags",
        "ACPP_OMP_CXX_FLAGS",
        "default-omp-cxx-flags",
        "The arguments passed to the compiler to compile for the OpenMP backend",
    ),
    DriverOption::value(
        "rocm-link-line",
        "--acpp-rocm-link-line",
        "ACPP_ROCM_LINK_LINE",
        "default-rocm-link-line",
        "The arguments passed to the linker for the ROCm backend.",
    ),
    DriverOption::value(
        "rocm-cxx-flags",
        "--acpp-rocm-cxx-flags",
        "ACPP_ROCM_CXX_FLAGS",
        "default-rocm-cxx-flags",
        "The arguments passed to the compiler to compile for the ROCm backend",
    ),
    DriverOption::value(
        "cuda-link-line",
        "--acpp-cuda-link-line",
        "ACPP_CUDA_LINK_LINE",
        "default-cuda-link-line",
        "The arguments passed to the linker for the CUDA backend.",
    ),
    DriverOption::value(
        "cuda-cxx-flags",
        "--acpp-cuda-cxx-flags",
        "ACPP_CUDA_CXX_FLAGS",
        "default-cuda-cxx-flags",
        "The arguments passed to the compiler to compile for the CUDA backend",
    ),
    DriverOption::value(
        "config-file-dir",
        "--acpp-config-file-dir",
        "ACPP_CONFIG_FILE_DIR",
        "default-config-file-dir",
        "Select an alternative path for the config files containing the default AdaptiveCpp\n\
         settings. It is normally not necessary for the user to change this setting.",
    ),
    DriverOption::value(
        "targets",
        "--acpp-targets",
        "ACPP_TARGETS",
        "default-targets",
        TARGETS_HELP,
    )
    .with_default("generic"),
    DriverOption::value(
        "stdpar-prefetch-mode",
        "--acpp-stdpar-prefetch-mode",
        "ACPP_STDPAR_PREFETCH_MODE",
        "default-stdpar-prefetch-mode",
        PREFETCH_HELP,
    )
    .with_default("auto"),
    DriverOption::flag(
        "use-accelerated-cpu",
        "--acpp-use-accelerated-cpu",
        "ACPP_USE_ACCELERATED_CPU",
        "default-use-accelerated-cpu",
        "If set, Clang is used for host compilation and explicit compiler support\n\
         is enabled for accelerating the nd-range parallel_for on CPU.\n\
         Uses continuation-based synchronization to execute all work-items\n\
         of a work-group in a single thread, eliminating scheduling overhead\n\
         and enabling enhanced vectorization opportunities compared to the fiber variant.",
    ),
    DriverOption::flag(
        "is-dryrun",
        "--acpp-dryrun",
        "ACPP_DRYRUN",
        "default-is-dryrun",
        "If set, only shows compilation commands that would be executed,\n\
         but does not actually execute it.",
    ),
    DriverOption::flag(
        "is-explicit-multipass",
        "--acpp-explicit-multipass",
        "ACPP_EXPLICIT_MULTIPASS",
        "default-is-explicit-multipass",
        "If set, executes device passes as separate compiler invocation and lets AdaptiveCpp\n\
         control embedding device images into the host binary. This allows targeting multiple\n\
         backends simultaneously that might otherwise be incompatible. In this mode, source code\n\
         level interoperability may not be supported in the host pass.",
    ),
    DriverOption::flag(
        "should-save-temps",
        "--acpp-save-temps",
        "ACPP_SAVE_TEMPS",
        "default-save-temps",
        "If set, do not delete temporary files created during compilation.",
    ),
    DriverOption::flag(
        "stdpar",
        "--acpp-stdpar",
        "ACPP_STDPAR",
        "default-is-stdpar",
        "If set, enables SYCL offloading of C++ standard parallel algorithms.",
    ),
    DriverOption::flag(
        "stdpar-system-usm",
        "--acpp-stdpar-system-usm",
        "ACPP_STDPAR_SYSTEM_USM",
        "default-is-stdpar-system-usm",
        "If set, assume availability of system-level unified shared memory where every pointer\n\
         from regular malloc() is accessible on GPU. This disables automatic hijacking of memory\n\
         allocations at the compiler level by AdaptiveCpp.",
    ),
    DriverOption::flag(
        "stdpar-unconditional-offload",
        "--acpp-stdpar-unconditional-offload",
        "ACPP_STDPAR_UNCONDITIONAL_OFFLOAD",
        "default-is-stdpar-unconditional-offload",
        "Normally, heuristics are employed to determine whether algorithms should be offloaded.\n\
         If this flag is set, supported parallel STL algorithms will be offloaded unconditionally.",
    ),
    DriverOption::flag(
        "is-export-all",
        "--acpp-export-all",
        "ACPP_EXPORT_ALL",
        "default-export-all",
        "(Experimental) Treat all functions implicitly as SYCL_EXTERNAL. Only supported with\n\
         the generic target.",
    ),
];

/// The catalog of all options the driver understands.
#[derive(Debug, Clone)]
pub struct OptionRegistry {
    options: Vec<DriverOption>,
}

impl OptionRegistry {
    /// The built-in option table.
    pub fn builtin() -> Self {
        Self::from_options(BUILTIN_OPTIONS.to_vec())
    }

    /// Build a registry from an explicit table.
    pub fn from_options(options: Vec<DriverOption>) -> Self {
        Self { options }
    }

    /// Look up an option by its canonical key.
    pub fn lookup(&self, key: &str) -> Result<&DriverOption> {
        self.options
            .iter()
            .find(|o| o.key == key)
            .ok_or_else(|| ConfigError::UnknownOption { key: key.into() })
    }

    /// Find the option whose command line flag is exactly `flag`.
    pub fn by_cli_flag(&self, flag: &str) -> Option<&DriverOption> {
        self.options.iter().find(|o| o.cli_flag == flag)
    }

    /// Find the option read from the environment variable `var`.
    pub fn by_env_var(&self, var: &str) -> Option<&DriverOption> {
        self.options.iter().find(|o| o.env_var == var)
    }

    /// All registered command line flags.
    pub fn all_commandline_flags(&self) -> BTreeSet<&'static str> {
        self.options.iter().map(|o| o.cli_flag).collect()
    }

    /// All registered environment variable names.
    pub fn all_env_vars(&self) -> BTreeSet<&'static str> {
        self.options.iter().map(|o| o.env_var).collect()
    }

    /// Every option in table order.
    pub fn iter(&self) -> impl Iterator<Item = &DriverOption> {
        self.options.iter()
    }

    /// Value-bearing options in table order.
    pub fn value_options(&self) -> impl Iterator<Item = &DriverOption> {
        self.options.iter().filter(|o| !o.is_flag)
    }

    /// Boolean switches in table order.
    pub fn flags(&self) -> impl Iterator<Item = &DriverOption> {
        self.options.iter().filter(|o| o.is_flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_key() {
        let reg = OptionRegistry::builtin();
        let opt = reg.lookup("clang").unwrap();
        assert_eq!(opt.cli_flag, "--acpp-clang");
        assert_eq!(opt.env_var, "ACPP_CLANG");
        assert_eq!(opt.config_key, "default-clang");
        assert!(!opt.is_flag);
    }

    #[test]
    fn lookup_unknown_key_fails() {
        let reg = OptionRegistry::builtin();
        let err = reg.lookup("no-such-option").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption { .. }));
    }

    #[test]
    fn cpu_compiler_uses_cxx_spelling() {
        let reg = OptionRegistry::builtin();
        let opt = reg.by_cli_flag("--acpp-cpu-cxx").unwrap();
        assert_eq!(opt.key, "cpu-compiler");
        assert_eq!(reg.by_env_var("ACPP_CPU_CXX").unwrap().key, "cpu-compiler");
    }

    #[test]
    fn keys_and_spellings_are_unique() {
        let reg = OptionRegistry::builtin();
        let count = reg.iter().count();
        let keys: BTreeSet<_> = reg.iter().map(|o| o.key).collect();
        assert_eq!(keys.len(), count);
        assert_eq!(reg.all_commandline_flags().len(), count);
        assert_eq!(reg.all_env_vars().len(), count);
    }

    #[test]
    fn flags_and_values_partition_the_table() {
        let reg = OptionRegistry::builtin();
        assert_eq!(
            reg.flags().count() + reg.value_options().count(),
            reg.iter().count()
        );
        assert!(reg.flags().any(|o| o.key == "is-explicit-multipass"));
        assert!(reg.value_options().any(|o| o.key == "targets"));
    }

    #[test]
    fn builtin_defaults() {
        let reg = OptionRegistry::builtin();
        assert_eq!(reg.lookup("targets").unwrap().default_value, Some("generic"));
        assert_eq!(
            reg.lookup("stdpar-prefetch-mode").unwrap().default_value,
            Some("auto")
        );
        assert_eq!(reg.lookup("clang").unwrap().default_value, None);
    }

    #[test]
    fn every_spelling_follows_the_acpp_convention() {
        let reg = OptionRegistry::builtin();
        for opt in reg.iter() {
            assert!(opt.cli_flag.starts_with("--acpp-"), "{}", opt.cli_flag);
            assert!(opt.env_var.starts_with("ACPP_"), "{}", opt.env_var);
            assert!(opt.config_key.starts_with("default-"), "{}", opt.config_key);
        }
    }
}
