//! acpp — the AdaptiveCpp compiler driver.

mod compile;
mod report;
mod usage;

use std::io::{self, Write};
use std::process;

use acpp_config::invocation::{
    deprecated_invocation_warning, forwarded_arg_warnings, reject_foreign_flags, VERSION_FLAGS,
};
use acpp_config::{ConfigDb, ConfigResolver, Environment, OptionRegistry, ResolvedConfig};
use acpp_targets::{decide, effective_targets, parse_targets};
use anyhow::Result;

use compile::CompilerInvocation;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("ACPP_LOG", "warn")).init();

    let mut argv = std::env::args_os().map(|a| a.to_string_lossy().into_owned());
    let argv0 = argv.next().unwrap_or_default();
    let args: Vec<String> = argv.collect();
    let env = Environment::from_process();

    let stdout = io::stdout();
    let stderr = io::stderr();
    let code = match run(&argv0, &args, &env, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("acpp error: fatal: {e:#}");
            -1
        }
    };
    process::exit(code);
}

fn warn(err: &mut impl Write, msg: &str) -> io::Result<()> {
    writeln!(err, "acpp warning: {msg}")
}

/// Drive one invocation and return the process exit code.
///
/// Help, version and foreign-flag checks run in argument order before any
/// compilation work, so the first of them on the command line decides.
fn run(
    argv0: &str,
    args: &[String],
    env: &Environment,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    if let Some(msg) = deprecated_invocation_warning(argv0) {
        warn(err, &msg)?;
    }

    let registry = OptionRegistry::builtin();
    let resolver = ConfigResolver::new(&registry);

    if args.is_empty() {
        usage::print_usage(&registry, out)?;
        return Ok(-1);
    }
    for (i, arg) in args.iter().enumerate() {
        if arg == "--help" {
            usage::print_usage(&registry, out)?;
            return Ok(0);
        }
        if VERSION_FLAGS.contains(&arg.as_str()) {
            let config = resolve_config(&resolver, args, env)?;
            report::print_version(out)?;
            report::print_config(&config, out)?;
            return Ok(0);
        }
        reject_foreign_flags(&args[i..=i])?;
    }

    let config = resolve_config(&resolver, args, env)?;
    for msg in forwarded_arg_warnings(config.forwarded_args()) {
        warn(err, &msg)?;
    }

    let (targets, legacy_warning) = effective_targets(&config)?;
    if let Some(msg) = legacy_warning {
        warn(err, &msg)?;
    }
    let specs = parse_targets(&targets)?;
    let decision = decide(&config, &specs)?;
    for msg in &decision.warnings {
        warn(err, msg)?;
    }

    let invocation = CompilerInvocation::plan(&config, &decision)?;
    if config.flag("is-dryrun")? {
        writeln!(out, "{invocation}")?;
        return Ok(0);
    }
    out.flush()?;
    err.flush()?;
    invocation.run()
}

fn resolve_config(resolver: &ConfigResolver<'_>, args: &[String], env: &Environment) -> Result<ResolvedConfig> {
    let dirs = resolver.config_file_dirs(args, env)?;
    let config_db = ConfigDb::load(&dirs)?;
    Ok(resolver.resolve(args, env, &config_db)?)
}
