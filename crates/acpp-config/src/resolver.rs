//! Layered configuration resolution.
//!
//! Every option's effective value comes from the first source that supplies
//! one, in this order:
//!
//! 1. an explicit command line argument (`--acpp-clang=/a`)
//! 2. the environment (`ACPP_CLANG=/b`)
//! 3. the config-file database (`"default-clang": "/c"`)
//! 4. the option's built-in default
//!
//! Arguments that are not driver options are kept verbatim, in order, for
//! the underlying compiler.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::config_db::{ConfigDb, DEFAULT_CONFIG_DIR};
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::legacy::{is_legacy_name, upgrade_legacy_name};
use crate::registry::{DriverOption, OptionRegistry};

/// Whether an argument is consumed by the driver or passed to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgClass {
    Driver,
    Forwarded,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValueSource {
    CommandLine,
    Environment,
    ConfigFile,
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueSource::CommandLine => "command line",
            ValueSource::Environment => "environment",
            ValueSource::ConfigFile => "config file",
            ValueSource::Default => "default",
        };
        f.write_str(s)
    }
}

/// The effective value of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Flag(bool),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Text(s) => f.write_str(s),
            OptionValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// A value together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: OptionValue,
    pub source: ValueSource,
}

/// Interpret the textual value of a flag.
///
/// Case-insensitive: `0`, `off` and `false` are false, everything else
/// (including the empty string) is true.
pub fn interpret_flag(value: &str) -> bool {
    let v = value.to_ascii_lowercase();
    !matches!(v.as_str(), "0" | "off" | "false")
}

/// Resolves options against the registry.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'r> {
    registry: &'r OptionRegistry,
}

impl<'r> ConfigResolver<'r> {
    pub fn new(registry: &'r OptionRegistry) -> Self {
        Self { registry }
    }

    /// The option a token names, if any, without legacy upgrading.
    fn option_for_token(&self, token: &str) -> Option<&'r DriverOption> {
        let name = token.split_once('=').map_or(token, |(name, _)| name);
        self.registry.by_cli_flag(name)
    }

    /// Classify one argument token.
    ///
    /// A token belongs to the driver if it is a registered flag, or
    /// `flag=value` for a registered flag, either directly or after
    /// upgrading a legacy spelling.
    pub fn classify(&self, token: &str) -> ArgClass {
        if self.option_for_token(token).is_some()
            || self.option_for_token(&upgrade_legacy_name(token)).is_some()
        {
            ArgClass::Driver
        } else {
            ArgClass::Forwarded
        }
    }

    /// Split arguments into driver and forwarded tokens, preserving order.
    pub fn partition<S: AsRef<str>>(&self, args: &[S]) -> (Vec<String>, Vec<String>) {
        let mut driver = Vec::new();
        let mut forwarded = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            let class = self.classify(arg);
            log::trace!("argument '{arg}' classified as {class:?}");
            match class {
                ArgClass::Driver => driver.push(arg.to_string()),
                ArgClass::Forwarded => forwarded.push(arg.to_string()),
            }
        }
        (driver, forwarded)
    }

    /// Values given on the command line, keyed by option key. Last occurrence wins.
    fn command_line_values(&self, driver_args: &[String]) -> Result<BTreeMap<&'r str, OptionValue>> {
        let mut values = BTreeMap::new();
        for arg in driver_args {
            let canonical = upgrade_legacy_name(arg);
            if is_legacy_name(arg) {
                log::debug!("upgraded deprecated argument '{arg}' to '{canonical}'");
            }
            let (name, explicit) = match canonical.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (canonical.as_str(), None),
            };
            let Some(option) = self.registry.by_cli_flag(name) else {
                continue;
            };
            let value = match (option.is_flag, explicit) {
                (true, None) => OptionValue::Flag(true),
                (true, Some(v)) => OptionValue::Flag(interpret_flag(v)),
                (false, Some(v)) => OptionValue::Text(v.to_string()),
                (false, None) => {
                    return Err(ConfigError::ConfigParseError {
                        detail: format!("option {} requires a value ({}=<value>)", name, name),
                    })
                }
            };
            values.insert(option.key, value);
        }
        Ok(values)
    }

    /// Values given in the environment, keyed by option key.
    ///
    /// Canonical variables take precedence over legacy spellings of the same option.
    fn environment_values(&self, env: &Environment) -> BTreeMap<&'r str, String> {
        let mut legacy = BTreeMap::new();
        let mut canonical = BTreeMap::new();
        for (name, value) in env.iter() {
            if let Some(option) = self.registry.by_env_var(name) {
                canonical.insert(option.key, value.to_string());
            } else if let Some(option) = self.registry.by_env_var(&upgrade_legacy_name(name)) {
                log::debug!("using deprecated environment variable {name} for {}", option.env_var);
                legacy.insert(option.key, value.to_string());
            }
        }
        legacy.extend(canonical);
        legacy
    }

    /// Resolve every registered option.
    pub fn resolve<S: AsRef<str>>(
        &self,
        args: &[S],
        env: &Environment,
        config_db: &ConfigDb,
    ) -> Result<ResolvedConfig> {
        let (driver_args, forwarded_args) = self.partition(args);
        let mut from_cli = self.command_line_values(&driver_args)?;
        let mut from_env = self.environment_values(env);

        let mut options = Vec::new();
        for option in self.registry.iter() {
            let resolved = if let Some(value) = from_cli.remove(option.key) {
                Some(Resolved {
                    value,
                    source: ValueSource::CommandLine,
                })
            } else if let Some(raw) = from_env.remove(option.key) {
                Some(Resolved {
                    value: text_or_flag(option, raw),
                    source: ValueSource::Environment,
                })
            } else if let Some(raw) = config_db.lookup(option.config_key) {
                Some(Resolved {
                    value: text_or_flag(option, raw.to_string()),
                    source: ValueSource::ConfigFile,
                })
            } else {
                option.default_value.map(|d| Resolved {
                    value: text_or_flag(option, d.to_string()),
                    source: ValueSource::Default,
                })
            };
            if let Some(r) = &resolved {
                log::debug!("{} = '{}' (from {})", option.key, r.value, r.source);
            }
            options.push(ResolvedOption {
                option: option.clone(),
                resolved,
            });
        }

        Ok(ResolvedConfig {
            options,
            driver_args,
            forwarded_args,
        })
    }

    /// Directories to scan for config files.
    ///
    /// `config-file-dir` is read from the command line or the environment
    /// only, since the config files cannot locate themselves.
    pub fn config_file_dirs<S: AsRef<str>>(&self, args: &[S], env: &Environment) -> Result<Vec<PathBuf>> {
        let (driver_args, _) = self.partition(args);
        let key = "config-file-dir";
        let option = self.registry.lookup(key)?;
        let dir = match self.command_line_values(&driver_args)?.remove(key) {
            Some(value) => value.to_string(),
            None => self
                .environment_values(env)
                .remove(key)
                .or_else(|| option.default_value.map(str::to_string))
                .unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string()),
        };
        Ok(vec![PathBuf::from(dir)])
    }
}

fn text_or_flag(option: &DriverOption, raw: String) -> OptionValue {
    if option.is_flag {
        OptionValue::Flag(interpret_flag(&raw))
    } else {
        OptionValue::Text(raw)
    }
}

/// One option and its effective value, if any.
#[derive(Debug, Clone)]
pub struct ResolvedOption {
    pub option: DriverOption,
    pub resolved: Option<Resolved>,
}

/// The effective configuration of one invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    options: Vec<ResolvedOption>,
    driver_args: Vec<String>,
    forwarded_args: Vec<String>,
}

impl ResolvedConfig {
    fn entry(&self, key: &str) -> Result<&ResolvedOption> {
        self.options
            .iter()
            .find(|o| o.option.key == key)
            .ok_or_else(|| ConfigError::UnknownOption { key: key.into() })
    }

    /// Effective value of a value option.
    ///
    /// Fails with [`ConfigError::OptionNotSet`] when no source and no
    /// default supplied one.
    pub fn value(&self, key: &str) -> Result<&str> {
        let entry = self.entry(key)?;
        match &entry.resolved {
            Some(Resolved {
                value: OptionValue::Text(s),
                ..
            }) => Ok(s.as_str()),
            Some(Resolved {
                value: OptionValue::Flag(_),
                ..
            }) => Err(ConfigError::ConfigParseError {
                detail: format!("'{key}' is a flag, not a value option"),
            }),
            None => Err(ConfigError::OptionNotSet {
                key: key.into(),
                cli_flag: entry.option.cli_flag.into(),
                env_var: entry.option.env_var.into(),
                config_key: entry.option.config_key.into(),
            }),
        }
    }

    /// Effective value of a value option, `None` when unset.
    pub fn optional_value(&self, key: &str) -> Result<Option<&str>> {
        match self.value(key) {
            Ok(v) => Ok(Some(v)),
            Err(ConfigError::OptionNotSet { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Effective state of a flag; absent flags are false.
    pub fn flag(&self, key: &str) -> Result<bool> {
        let entry = self.entry(key)?;
        Ok(matches!(
            entry.resolved,
            Some(Resolved {
                value: OptionValue::Flag(true),
                ..
            })
        ))
    }

    /// Source of an option's value, `None` when unset.
    pub fn source(&self, key: &str) -> Result<Option<ValueSource>> {
        Ok(self.entry(key)?.resolved.as_ref().map(|r| r.source))
    }

    /// Arguments consumed by the driver, in order.
    pub fn driver_args(&self) -> &[String] {
        &self.driver_args
    }

    /// Arguments for the underlying compiler, verbatim and in order.
    pub fn forwarded_args(&self) -> &[String] {
        &self.forwarded_args
    }

    /// Every registered option with its resolution, in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedOption> {
        self.options.iter()
    }
}
