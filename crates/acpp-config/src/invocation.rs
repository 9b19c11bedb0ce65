//! Checks on the raw invocation that run before and after resolution.

use std::path::Path;

use crate::error::{ConfigError, Result};

/// Flag prefixes belonging to other SYCL implementations.
pub const FOREIGN_FLAG_PREFIXES: &[&str] = &["-fsycl"];

/// Spellings that request the version report instead of a compilation.
pub const VERSION_FLAGS: &[&str] = &["--acpp-version", "--opensycl-version", "--hipsycl-version"];

/// Names under which the driver was installed before the rename to `acpp`.
pub const DEPRECATED_INVOCATION_NAMES: &[&str] = &["syclcc", "syclcc-clang"];

const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cxx", "cc", "c", "c++", "cu", "hip", "sycl"];

const INSUFFICIENT_CXX_STANDARDS: &[&str] = &["98", "03", "11", "14", "0x"];

/// Fail on the first argument that belongs to a different SYCL implementation.
pub fn reject_foreign_flags<S: AsRef<str>>(args: &[S]) -> Result<()> {
    for arg in args {
        let arg = arg.as_ref();
        if FOREIGN_FLAG_PREFIXES.iter().any(|p| arg.starts_with(p)) {
            return Err(ConfigError::ForeignFlagRejected { flag: arg.into() });
        }
    }
    Ok(())
}

/// A deprecation warning if the driver was started under an old name.
pub fn deprecated_invocation_warning(argv0: &str) -> Option<String> {
    let name = Path::new(argv0).file_name()?.to_str()?;
    DEPRECATED_INVOCATION_NAMES
        .contains(&name)
        .then(|| format!("{name} is deprecated; please use acpp instead."))
}

/// Whether any forwarded argument selects an optimization level.
pub fn has_optimization_flag<S: AsRef<str>>(forwarded: &[S]) -> bool {
    forwarded.iter().any(|a| a.as_ref().starts_with("-O"))
}

/// Whether no forwarded argument names a source file, i.e. the invocation
/// only links objects.
pub fn is_pure_linking_stage<S: AsRef<str>>(forwarded: &[S]) -> bool {
    !forwarded.iter().any(|a| {
        let a = a.as_ref();
        !a.starts_with('-')
            && Path::new(a)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
    })
}

/// The first `-std=` argument selecting a standard older than C++17.
pub fn insufficient_cxx_standard<S: AsRef<str>>(forwarded: &[S]) -> Option<&str> {
    forwarded.iter().map(|a| a.as_ref()).find(|a| {
        a.strip_prefix("-std=")
            .and_then(|std| std.strip_prefix("c++").or_else(|| std.strip_prefix("gnu++")))
            .is_some_and(|version| INSUFFICIENT_CXX_STANDARDS.contains(&version))
    })
}

/// Non-fatal warnings about the forwarded compiler arguments.
pub fn forwarded_arg_warnings<S: AsRef<str>>(forwarded: &[S]) -> Vec<String> {
    let mut warnings = Vec::new();
    if !is_pure_linking_stage(forwarded) && !has_optimization_flag(forwarded) {
        warnings.push(
            "No optimization flag was given, optimizations are disabled by default. \
             Performance may be degraded. Compile with e.g. -O2/-O3 to enable optimizations."
                .to_string(),
        );
    }
    if let Some(std) = insufficient_cxx_standard(forwarded) {
        warnings.push(format!(
            "{std} selects a C++ standard older than C++17, which AdaptiveCpp requires."
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_foreign_sycl_flags() {
        let err = reject_foreign_flags(&["-O2", "-fsycl-targets=spir64"]).unwrap_err();
        assert!(matches!(err, ConfigError::ForeignFlagRejected { ref flag } if flag == "-fsycl-targets=spir64"));
        assert!(reject_foreign_flags(&["-fopenmp", "main.cpp"]).is_ok());
    }

    #[test]
    fn deprecated_names_warn() {
        assert!(deprecated_invocation_warning("/usr/bin/syclcc").is_some());
        assert!(deprecated_invocation_warning("syclcc-clang")
            .unwrap()
            .contains("syclcc-clang"));
        assert!(deprecated_invocation_warning("/usr/bin/acpp").is_none());
    }

    #[test]
    fn optimization_flag_detection() {
        assert!(has_optimization_flag(&["main.cpp", "-O3"]));
        assert!(!has_optimization_flag(&["main.cpp", "-g"]));
    }

    #[test]
    fn linking_stage_detection() {
        assert!(is_pure_linking_stage(&["a.o", "b.o", "-o", "app"]));
        assert!(!is_pure_linking_stage(&["main.cpp", "-o", "app"]));
        assert!(!is_pure_linking_stage(&["kernel.CU"]));
        assert!(is_pure_linking_stage::<&str>(&[]));
    }

    #[test]
    fn old_standards_are_detected() {
        assert_eq!(insufficient_cxx_standard(&["-std=c++14"]), Some("-std=c++14"));
        assert_eq!(insufficient_cxx_standard(&["-std=gnu++11"]), Some("-std=gnu++11"));
        assert_eq!(insufficient_cxx_standard(&["-std=c++17"]), None);
        assert_eq!(insufficient_cxx_standard(&["-std=c++20"]), None);
    }

    #[test]
    fn warnings_for_unoptimized_compile() {
        let warnings = forwarded_arg_warnings(&["main.cpp"]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("No optimization flag"));

        assert!(forwarded_arg_warnings(&["main.cpp", "-O2"]).is_empty());
        assert!(forwarded_arg_warnings(&["main.o"]).is_empty());
        assert_eq!(forwarded_arg_warnings(&["main.cpp", "-O2", "-std=c++11"]).len(), 1);
    }
}
