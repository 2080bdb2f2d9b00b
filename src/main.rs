use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use grprefs::output::{
    print_diff, print_error, print_files, print_mapping, print_saved, print_warning, use_colors,
    OutputContext,
};
use grprefs::{
    load_files, parse_bool, parse_double, parse_long, read_source_or_empty, save, LoadError,
    LoadPolicy, Prefs, PrefsPaths,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grprefs")]
#[command(version, about = "Inspect and edit layered preference files")]
struct Cli {
    /// Directory holding the system-wide *.conf files
    #[arg(long, value_name = "DIR")]
    prefsdir: Option<PathBuf>,

    /// User override file, merged after the system files
    #[arg(long, value_name = "FILE")]
    user_config: Option<PathBuf>,

    /// Extra file merged last (repeatable)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    configs: Vec<PathBuf>,

    /// Print a single value
    #[arg(long, value_name = "SECTION.OPTION", value_parser = parse_key)]
    get: Option<OptionKey>,

    /// How to interpret the value printed by --get
    #[arg(long = "type", value_enum, default_value_t = ValueType::String)]
    value_type: ValueType,

    /// Value printed by --get when the option is unset or unparseable
    #[arg(long, value_name = "VALUE", requires = "get")]
    default: Option<String>,

    /// Set a value before printing or saving (repeatable)
    #[arg(long, value_name = "SECTION.OPTION=VALUE", value_parser = parse_assignment)]
    set: Vec<Assignment>,

    /// Write the merged preferences to the user config file
    #[arg(long)]
    save: bool,

    /// Show what --save would change in the user config file
    #[arg(short, long)]
    diff: bool,

    /// List the files that would be merged, in order
    #[arg(long)]
    list_files: bool,

    /// Skip unreadable or malformed files instead of failing
    #[arg(long)]
    keep_going: bool,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValueType {
    String,
    Bool,
    Long,
    Double,
}

#[derive(Debug, Clone)]
struct OptionKey {
    section: String,
    option: String,
}

#[derive(Debug, Clone)]
struct Assignment {
    key: OptionKey,
    value: String,
}

fn parse_key(s: &str) -> Result<OptionKey, String> {
    match s.split_once('.') {
        Some((section, option)) if !section.is_empty() && !option.is_empty() => Ok(OptionKey {
            section: section.to_string(),
            option: option.to_string(),
        }),
        _ => Err(format!("expected SECTION.OPTION, got '{s}'")),
    }
}

fn parse_assignment(s: &str) -> Result<Assignment, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SECTION.OPTION=VALUE, got '{s}'"))?;
    Ok(Assignment {
        key: parse_key(key)?,
        value: value.to_string(),
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = OutputContext::new(use_colors(cli.color, cli.no_color));

    match run(&cli, &ctx) {
        Ok(code) => code,
        Err(e) => {
            print_error(&e.to_string(), &ctx);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "grprefs=debug" } else { "grprefs=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_paths(cli: &Cli) -> PrefsPaths {
    let detected = PrefsPaths::detect();
    PrefsPaths {
        system_dir: cli.prefsdir.clone().or(detected.system_dir),
        user_file: cli.user_config.clone().or(detected.user_file),
    }
}

fn run(cli: &Cli, ctx: &OutputContext) -> Result<ExitCode, LoadError> {
    let paths = resolve_paths(cli);

    // Extra files go after the user file so they win over everything on disk.
    let mut files = paths.discover();
    files.extend(cli.configs.iter().cloned());

    if cli.list_files {
        print_files(&files);
        return Ok(ExitCode::SUCCESS);
    }

    let policy = if cli.keep_going {
        LoadPolicy::SkipInvalid
    } else {
        LoadPolicy::Strict
    };

    let mut prefs = Prefs::new();
    load_files(&mut prefs, &files, policy)?;

    for assignment in &cli.set {
        let key = &assignment.key;
        prefs.set_string(&key.section, &key.option, &assignment.value);
    }

    if let Some(key) = &cli.get {
        return Ok(print_value(&prefs, key, cli));
    }

    if cli.diff || cli.save {
        let Some(user_file) = &paths.user_file else {
            print_error("no user config location; pass --user-config", ctx);
            return Ok(ExitCode::from(1));
        };

        if cli.diff {
            let current = read_source_or_empty(user_file)?;
            print_diff(&user_file.display().to_string(), &current, &prefs.to_text());
        }
        if cli.save {
            save(&prefs, user_file)?;
            print_saved(user_file, ctx);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if prefs.mapping().is_empty() && files.is_empty() {
        print_warning("no preference files found", ctx);
    }
    print_mapping(prefs.mapping(), ctx);

    Ok(ExitCode::SUCCESS)
}

/// Exit code 1 means the option is unset and no default was given.
fn print_value(prefs: &Prefs, key: &OptionKey, cli: &Cli) -> ExitCode {
    let (section, option) = (key.section.as_str(), key.option.as_str());

    if cli.default.is_none() && !prefs.has_option(section, option) {
        return ExitCode::from(1);
    }

    let default = cli.default.as_deref().unwrap_or("");
    let value = match cli.value_type {
        ValueType::String => prefs.get_string(section, option, default),
        ValueType::Bool => prefs
            .get_bool(section, option, parse_bool(default).unwrap_or(false))
            .to_string(),
        ValueType::Long => prefs
            .get_long(section, option, parse_long(default).unwrap_or(0))
            .to_string(),
        ValueType::Double => prefs
            .get_double(section, option, parse_double(default).unwrap_or(0.0))
            .to_string(),
    };

    println!("{value}");
    ExitCode::SUCCESS
}
