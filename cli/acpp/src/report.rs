//! `acpp --acpp-version` — version and effective configuration.

use std::io::Write;

use acpp_config::ResolvedConfig;
use anyhow::Result;

pub fn print_version(out: &mut impl Write) -> Result<()> {
    writeln!(out, "acpp [AdaptiveCpp compilation driver], version {}", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

/// Every option with its effective value and where it came from.
pub fn print_config(config: &ResolvedConfig, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Configuration:")?;
    let width = config.iter().map(|o| o.option.key.len()).max().unwrap_or(0);
    for entry in config.iter() {
        match &entry.resolved {
            Some(r) => writeln!(
                out,
                "  {:<width$}  {} ({})",
                entry.option.key, r.value, r.source
            )?,
            None => writeln!(out, "  {:<width$}  <unset>", entry.option.key)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acpp_config::{ConfigDb, ConfigResolver, Environment, OptionRegistry};

    #[test]
    fn report_lists_values_and_sources() {
        let registry = OptionRegistry::builtin();
        let config = ConfigResolver::new(&registry)
            .resolve(
                &["--acpp-clang=/opt/clang++"],
                &Environment::from_pairs([("ACPP_CPU_CXX", "g++")]),
                &ConfigDb::empty(),
            )
            .unwrap();

        let mut out = Vec::new();
        print_version(&mut out).unwrap();
        print_config(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(env!("CARGO_PKG_VERSION")));
        let line = |key: &str| {
            text.lines()
                .find(|l| l.split_whitespace().next() == Some(key))
                .unwrap()
                .to_string()
        };
        assert!(line("clang").ends_with("/opt/clang++ (command line)"));
        assert!(line("cpu-compiler").ends_with("g++ (environment)"));
        assert!(line("targets").ends_with("generic (default)"));
        assert!(line("nvcxx").ends_with("<unset>"));
    }
}
