//! Deriving `targets` from the deprecated `platform` and `gpu-arch` options.

use acpp_config::{ResolvedConfig, ValueSource};

use crate::error::{Result, TargetError};

/// Translate a legacy platform selection into a `targets` value.
pub fn targets_from_platform(platform: &str, gpu_arch: Option<&str>) -> Result<String> {
    let backend = match platform.to_ascii_lowercase().as_str() {
        "cpu" | "host" | "omp" => return Ok("omp".into()),
        "cuda" | "nvidia" => "cuda",
        "rocm" | "hip" | "amd" => "hip",
        other => {
            return Err(TargetError::InvalidTargetSpec {
                spec: platform.to_string(),
                detail: format!("unknown legacy platform '{other}' (expected cpu, cuda or rocm)"),
            })
        }
    };
    Ok(match gpu_arch {
        Some(arch) => format!("{backend}:{arch}"),
        None => backend.to_string(),
    })
}

/// The `targets` value to parse, plus any deprecation warning.
///
/// An explicitly configured `targets` always wins. Only when `targets`
/// fell back to its built-in default and `platform` is set is the value
/// derived from `platform` and `gpu-arch`.
pub fn effective_targets(config: &ResolvedConfig) -> Result<(String, Option<String>)> {
    let targets = config.value("targets")?;
    if config.source("targets")? != Some(ValueSource::Default) {
        return Ok((targets.to_string(), None));
    }
    let Some(platform) = config.optional_value("platform")? else {
        return Ok((targets.to_string(), None));
    };
    let derived = targets_from_platform(platform, config.optional_value("gpu-arch")?)?;
    let warning = format!(
        "--acpp-platform and --acpp-gpu-arch are deprecated; \
         use --acpp-targets='{derived}' instead."
    );
    Ok((derived, Some(warning)))
}
