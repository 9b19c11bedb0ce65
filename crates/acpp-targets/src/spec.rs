//! Parsing of the `targets` option.
//!
//! The value is a `;`-separated list of backend segments. Each segment is a
//! backend name with an optional `.flavor`, optionally followed by `:` and a
//! `,`-separated architecture list:
//!
//! ```text
//! omp.accelerated;cuda:sm_70,sm_80;hip.explicit-multipass:gfx906
//! ```

use std::fmt;

use crate::backend::{BackendKind, Flavor};
use crate::error::{Result, TargetError};

/// One backend requested in `targets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub backend: BackendKind,
    pub flavor: Option<Flavor>,
    pub architectures: Vec<String>,
}

impl TargetSpec {
    /// A spec without flavor or architectures.
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            flavor: None,
            architectures: Vec::new(),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.backend)?;
        if let Some(flavor) = self.flavor {
            write!(f, ".{flavor}")?;
        }
        if !self.architectures.is_empty() {
            write!(f, ":{}", self.architectures.join(","))?;
        }
        Ok(())
    }
}

/// Parse a `targets` value into its backend segments, in order.
///
/// Empty segments are skipped. Fails with [`TargetError::InvalidTargetSpec`]
/// for unknown backends or flavors, malformed architectures, architectures on
/// a backend that takes none, duplicate backends and an empty list.
pub fn parse_targets(value: &str) -> Result<Vec<TargetSpec>> {
    let invalid = |detail: String| TargetError::InvalidTargetSpec {
        spec: value.to_string(),
        detail,
    };

    let mut specs: Vec<TargetSpec> = Vec::new();
    for segment in value.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, arch_list) = match segment.split_once(':') {
            Some((name, archs)) => (name.trim(), Some(archs)),
            None => (segment, None),
        };

        let (backend_name, flavor_name) = match name.split_once('.') {
            Some((backend, flavor)) => (backend, Some(flavor)),
            None => (name, None),
        };

        let backend = BackendKind::from_name(backend_name)
            .ok_or_else(|| invalid(format!("unknown backend '{backend_name}'")))?;

        let flavor = match flavor_name {
            Some(f) => {
                let flavor = Flavor::from_name(f)
                    .filter(|fl| backend.accepts_flavor(*fl))
                    .ok_or_else(|| invalid(format!("unknown flavor '{f}' for backend '{backend}'")))?;
                Some(flavor)
            }
            None => None,
        };

        let mut architectures = Vec::new();
        if let Some(list) = arch_list {
            for arch in list.split(',').map(str::trim) {
                if arch.is_empty() {
                    return Err(invalid(format!("empty architecture in '{segment}'")));
                }
                architectures.push(arch.to_string());
            }
        }
        validate_architectures(backend, &architectures).map_err(invalid)?;

        if specs.iter().any(|s| s.backend == backend) {
            return Err(invalid(format!("backend '{backend}' is listed more than once")));
        }

        specs.push(TargetSpec {
            backend,
            flavor,
            architectures,
        });
    }

    if specs.is_empty() {
        return Err(invalid("no backends specified".into()));
    }
    log::debug!(
        "parsed targets: {}",
        specs.iter().map(|s| s.to_string()).collect::<Vec<_>>().join("; ")
    );
    Ok(specs)
}

fn validate_architectures(backend: BackendKind, archs: &[String]) -> std::result::Result<(), String> {
    match backend {
        BackendKind::Omp | BackendKind::Generic => {
            if let Some(arch) = archs.first() {
                return Err(format!(
                    "backend '{backend}' does not accept an architecture list (got '{arch}')"
                ));
            }
        }
        BackendKind::CudaNvcxx => {
            if archs.len() > 1 {
                return Err(format!(
                    "backend '{backend}' accepts at most one architecture, got {}",
                    archs.len()
                ));
            }
            check_prefixed(backend, archs, "cc", "ccXY, e.g. cc70")?;
        }
        BackendKind::Cuda => check_prefixed(backend, archs, "sm_", "sm_XY, e.g. sm_70")?,
        BackendKind::Hip => check_prefixed(backend, archs, "gfx", "gfxXYZ, e.g. gfx906")?,
    }
    Ok(())
}

/// Every architecture must be `prefix` followed by a digit and then alphanumerics.
fn check_prefixed(
    backend: BackendKind,
    archs: &[String],
    prefix: &str,
    form: &str,
) -> std::result::Result<(), String> {
    for arch in archs {
        let well_formed = arch.strip_prefix(prefix).is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_ascii_digit())
                && rest.chars().all(|c| c.is_ascii_alphanumeric())
        });
        if !well_formed {
            return Err(format!(
                "'{arch}' is not a valid {backend} architecture (expected {form})"
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_omp_and_hip() {
        let specs = parse_targets("omp;hip:gfx900,gfx906").unwrap();
        assert_eq!(
            specs,
            vec![
                TargetSpec::new(BackendKind::Omp),
                TargetSpec {
                    backend: BackendKind::Hip,
                    flavor: None,
                    architectures: vec!["gfx900".into(), "gfx906".into()],
                },
            ]
        );
    }

    #[test]
    fn parses_flavors() {
        let specs = parse_targets("omp.accelerated;cuda.explicit-multipass:sm_70").unwrap();
        assert_eq!(specs[0].flavor, Some(Flavor::Accelerated));
        assert_eq!(specs[1].backend, BackendKind::Cuda);
        assert_eq!(specs[1].flavor, Some(Flavor::ExplicitMultipass));
        assert_eq!(specs[1].architectures, vec!["sm_70"]);
    }

    #[test]
    fn unknown_backend_rejected() {
        let err = parse_targets("omp;spirv").unwrap_err();
        assert!(matches!(err, TargetError::InvalidTargetSpec { .. }));
        assert!(err.to_string().contains("spirv"));
    }

    #[test]
    fn flavor_of_other_backend_rejected() {
        assert!(parse_targets("omp.explicit-multipass").is_err());
        assert!(parse_targets("generic.accelerated").is_err());
        assert!(parse_targets("hip.fast:gfx906").is_err());
    }

    #[test]
    fn generic_and_omp_take_no_architectures() {
        assert!(parse_targets("generic:sm_70").is_err());
        assert!(parse_targets("omp:x86_64").is_err());
    }

    #[test]
    fn nvcxx_accepts_one_optional_cc_arch() {
        assert!(parse_targets("cuda-nvcxx").is_ok());
        let specs = parse_targets("cuda-nvcxx:cc70").unwrap();
        assert_eq!(specs[0].architectures, vec!["cc70"]);
        assert!(parse_targets("cuda-nvcxx:cc70,cc80").is_err());
        assert!(parse_targets("cuda-nvcxx:sm_70").is_err());
    }

    #[test]
    fn architecture_forms_are_checked() {
        assert!(parse_targets("cuda:sm_90a").is_ok());
        assert!(parse_targets("hip:gfx90a").is_ok());
        assert!(parse_targets("cuda:gfx906").is_err());
        assert!(parse_targets("hip:sm_70").is_err());
        assert!(parse_targets("hip:").is_err());
        assert!(parse_targets("cuda:sm_70,,sm_80").is_err());
    }

    #[test]
    fn empty_segments_skipped() {
        let specs = parse_targets(" omp ; ;generic; ").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].backend, BackendKind::Generic);
    }

    #[test]
    fn empty_and_duplicate_lists_rejected() {
        assert!(parse_targets("").is_err());
        assert!(parse_targets(";;").is_err());
        assert!(parse_targets("omp;omp.accelerated").is_err());
    }

    #[test]
    fn display_matches_input_syntax() {
        let specs = parse_targets("hip.explicit-multipass:gfx900,gfx906").unwrap();
        assert_eq!(specs[0].to_string(), "hip.explicit-multipass:gfx900,gfx906");
    }
}
