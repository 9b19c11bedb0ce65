//! Upgrading deprecated option spellings.
//!
//! AdaptiveCpp was previously distributed as hipSYCL and Open SYCL, and the
//! driver still accepts the old prefixes on the command line and in the
//! environment.

const LEGACY_CLI_PREFIXES: &[&str] = &["--hipsycl-", "--opensycl-"];
const LEGACY_ENV_PREFIXES: &[&str] = &["HIPSYCL_", "OPENSYCL_"];

const CLI_PREFIX: &str = "--acpp-";
const ENV_PREFIX: &str = "ACPP_";

/// Map a deprecated spelling to its canonical form.
///
/// Applies to both command line tokens (`--hipsycl-targets=omp`) and
/// environment variable names (`OPENSYCL_TARGETS`). Canonical and unknown
/// names are returned unchanged, so the function is idempotent.
pub fn upgrade_legacy_name(name: &str) -> String {
    for prefix in LEGACY_CLI_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return format!("{CLI_PREFIX}{rest}");
        }
    }
    for prefix in LEGACY_ENV_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return format!("{ENV_PREFIX}{rest}");
        }
    }
    name.to_string()
}

/// Whether `name` uses one of the deprecated prefixes.
pub fn is_legacy_name(name: &str) -> bool {
    LEGACY_CLI_PREFIXES
        .iter()
        .chain(LEGACY_ENV_PREFIXES)
        .any(|p| name.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrades_cli_prefixes() {
        assert_eq!(
            upgrade_legacy_name("--hipsycl-targets=omp"),
            "--acpp-targets=omp"
        );
        assert_eq!(upgrade_legacy_name("--opensycl-clang"), "--acpp-clang");
    }

    #[test]
    fn upgrades_env_prefixes() {
        assert_eq!(upgrade_legacy_name("HIPSYCL_TARGETS"), "ACPP_TARGETS");
        assert_eq!(upgrade_legacy_name("OPENSYCL_CLANG"), "ACPP_CLANG");
    }

    #[test]
    fn canonical_and_unknown_names_are_identity() {
        for name in ["--acpp-targets", "ACPP_CLANG", "-O2", "main.cpp", "PATH", ""] {
            assert_eq!(upgrade_legacy_name(name), name);
        }
    }

    #[test]
    fn upgrade_is_idempotent() {
        for name in [
            "--hipsycl-targets=hip:gfx900",
            "OPENSYCL_CPU_CXX",
            "--acpp-dryrun",
            "-fopenmp",
        ] {
            let once = upgrade_legacy_name(name);
            assert_eq!(upgrade_legacy_name(&once), once);
        }
    }

    #[test]
    fn detects_legacy_names() {
        assert!(is_legacy_name("HIPSYCL_TARGETS"));
        assert!(is_legacy_name("--opensycl-dryrun"));
        assert!(!is_legacy_name("ACPP_TARGETS"));
    }
}
