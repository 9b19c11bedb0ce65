//! Backend and flavor enumerations.

use std::fmt;

/// The compute backends the driver can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    /// OpenMP CPU backend.
    Omp,
    /// CUDA through clang.
    Cuda,
    /// CUDA through nvc++.
    CudaNvcxx,
    /// HIP through clang.
    Hip,
    /// Generic LLVM SSCP flow, JIT-compiled at runtime.
    Generic,
}

impl BackendKind {
    /// Every backend, in documentation order.
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Omp,
        BackendKind::Cuda,
        BackendKind::CudaNvcxx,
        BackendKind::Hip,
        BackendKind::Generic,
    ];

    /// Name used in `targets` values.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Omp => "omp",
            BackendKind::Cuda => "cuda",
            BackendKind::CudaNvcxx => "cuda-nvcxx",
            BackendKind::Hip => "hip",
            BackendKind::Generic => "generic",
        }
    }

    /// Parse a backend name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Flavors that may follow the backend name after a `.`.
    pub fn flavors(&self) -> &'static [Flavor] {
        match self {
            BackendKind::Omp => &[Flavor::LibraryOnly, Flavor::Accelerated],
            BackendKind::Cuda | BackendKind::Hip => {
                &[Flavor::ExplicitMultipass, Flavor::IntegratedMultipass]
            }
            BackendKind::CudaNvcxx | BackendKind::Generic => &[],
        }
    }

    /// Whether `flavor` is valid for this backend.
    pub fn accepts_flavor(&self, flavor: Flavor) -> bool {
        self.flavors().contains(&flavor)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named variant of a backend's compilation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    LibraryOnly,
    Accelerated,
    ExplicitMultipass,
    IntegratedMultipass,
}

impl Flavor {
    pub fn name(&self) -> &'static str {
        match self {
            Flavor::LibraryOnly => "library-only",
            Flavor::Accelerated => "accelerated",
            Flavor::ExplicitMultipass => "explicit-multipass",
            Flavor::IntegratedMultipass => "integrated-multipass",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        [
            Flavor::LibraryOnly,
            Flavor::Accelerated,
            Flavor::ExplicitMultipass,
            Flavor::IntegratedMultipass,
        ]
        .into_iter()
        .find(|f| f.name() == name)
    }

    /// The multipass mode a flavor pins, if it pins one.
    pub fn multipass_mode(&self) -> Option<MultipassMode> {
        match self {
            Flavor::ExplicitMultipass => Some(MultipassMode::Explicit),
            Flavor::IntegratedMultipass => Some(MultipassMode::Integrated),
            Flavor::LibraryOnly | Flavor::Accelerated => None,
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether device and host code are compiled in one invocation or separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultipassMode {
    #[default]
    Integrated,
    Explicit,
}

impl fmt::Display for MultipassMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultipassMode::Integrated => write!(f, "integrated multipass"),
            MultipassMode::Explicit => write!(f, "explicit multipass"),
        }
    }
}
