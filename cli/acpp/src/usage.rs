//! `acpp --help` — usage text built from the option registry.
//!
//! The command is only rendered, never used for parsing: arguments the
//! driver does not know must reach the compiler untouched.

use std::io::Write;

use acpp_config::{DriverOption, OptionRegistry};
use anyhow::Result;
use clap::{Arg, ArgAction, Command};

const AFTER_HELP: &str = "\
Any other options will be forwarded to the compiler.

Note: Command line arguments take precedence over environment variables,
which take precedence over the config files in --acpp-config-file-dir.";

/// The usage description of the driver.
pub fn command(registry: &OptionRegistry) -> Command {
    let mut cmd = Command::new("acpp")
        .about("AdaptiveCpp compiler driver")
        .override_usage("acpp <options> [compiler arguments...]")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .after_help(AFTER_HELP);

    for option in registry.value_options() {
        cmd = cmd.arg(
            option_arg(option)
                .value_name("VALUE")
                .action(ArgAction::Set),
        );
    }
    for option in registry.flags() {
        cmd = cmd.arg(option_arg(option).action(ArgAction::SetTrue));
    }

    cmd.arg(
        Arg::new("acpp-version")
            .long("acpp-version")
            .action(ArgAction::SetTrue)
            .help("Print AdaptiveCpp version and configuration"),
    )
    .arg(
        Arg::new("help")
            .long("help")
            .action(ArgAction::SetTrue)
            .help("Print this help message"),
    )
}

fn option_arg(option: &DriverOption) -> Arg {
    let mut help = format!(
        "{}\n[env: {}] [config: {}]",
        option.description, option.env_var, option.config_key
    );
    if let Some(default) = option.default_value {
        help.push_str(&format!(" [default: {default}]"));
    }
    Arg::new(option.key)
        .long(option.cli_flag.trim_start_matches("--"))
        .help(help)
}

/// Write the usage text.
pub fn print_usage(registry: &OptionRegistry, out: &mut impl Write) -> Result<()> {
    let help = command(registry).render_help();
    writeln!(out, "{help}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_option_is_listed() {
        let registry = OptionRegistry::builtin();
        let mut out = Vec::new();
        print_usage(&registry, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        for option in registry.iter() {
            assert!(text.contains(option.cli_flag), "missing {}", option.cli_flag);
            assert!(text.contains(option.env_var), "missing {}", option.env_var);
        }
        assert!(text.contains("--acpp-version"));
        assert!(text.contains("--help"));
        assert!(text.contains("forwarded to the compiler"));
    }

    #[test]
    fn defaults_are_shown() {
        let registry = OptionRegistry::builtin();
        let text = command(&registry).render_help().to_string();
        assert!(text.contains("[default: generic]"));
    }
}
