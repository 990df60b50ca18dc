//! eagle-mclib: convert and inspect EAGLE libraries, schematics and boards
//!
//! This tool imports EAGLE XML drawings and writes them as `.mclib` YAML
//! interchange documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use regex::Regex;
use serde_json::json;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use eagle_mclib::config::{self, Config};
use eagle_mclib::eagle::{mclib, Design, Drawing};

/// Convert and inspect EAGLE libraries, schematics and boards.
///
/// Reads `.lbr`, `.sch` and `.brd` files and writes `.mclib` YAML documents.
#[derive(Parser, Debug)]
#[command(name = "eagle-mclib")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert drawings to .mclib documents
    Convert {
        /// Input files or glob patterns
        #[arg(required = true, value_name = "INPUT")]
        inputs: Vec<String>,

        /// Output directory (defaults to the configured one, then next to each input)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Print a JSON summary of a drawing
    Info {
        /// Drawing to summarise
        file: PathBuf,
    },

    /// Find symbols, packages and device sets by name
    Search {
        /// Name pattern (glob, or regex with --regex); case-insensitive
        pattern: String,

        /// Files to search
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,
    },
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Converts a simple glob pattern to a regex pattern.
///
/// Supports `*` (any characters) and `?` (single character).
fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() * 2);
    for c in glob.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '.' | '+' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex
}

/// Builds the case-insensitive, whole-name matcher for `search`.
fn name_matcher(pattern: &str, is_regex: bool) -> Result<Regex, regex::Error> {
    let regex_pattern = if is_regex {
        pattern.to_string()
    } else {
        glob_to_regex(pattern)
    };
    Regex::new(&format!("(?i)^(?:{regex_pattern})$"))
}

/// Expands glob patterns; a pattern that matches nothing is kept as a path.
fn expand_inputs(inputs: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        let matched: Vec<PathBuf> = match glob::glob(input) {
            Ok(entries) => entries
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable glob match");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                warn!(pattern = %input, error = %e, "Invalid glob pattern, using as path");
                Vec::new()
            }
        };
        if matched.is_empty() {
            paths.push(PathBuf::from(input));
        } else {
            paths.extend(matched);
        }
    }
    paths
}

fn summary(path: &Path, drawing: &Drawing) -> serde_json::Value {
    let mut value = json!({
        "path": path.display().to_string(),
        "kind": drawing.kind().as_str(),
        "version": drawing.version,
        "layers": drawing.layers().len(),
        "grid_mm": drawing.grid().distance_mm(),
    });

    let details = match &drawing.design {
        Design::Library(lib) => json!({
            "name": lib.name,
            "symbols": lib.symbols().len(),
            "packages": lib.packages().len(),
            "packages3d": lib.packages3d().len(),
            "device_sets": lib.device_sets().len(),
            "devices": lib.device_sets().iter().map(|ds| ds.devices.len()).sum::<usize>(),
        }),
        Design::Schematic(sch) => json!({
            "libraries": sch.libraries.len(),
            "parts": sch.parts.len(),
            "sheets": sch.sheets.len(),
            "nets": sch.sheets.iter().map(|s| s.nets.iter().filter(|n| !n.is_bus()).count()).sum::<usize>(),
            "busses": sch.sheets.iter().map(|s| s.busses().count()).sum::<usize>(),
            "classes": sch.classes.len(),
        }),
        Design::Board(brd) => json!({
            "libraries": brd.libraries.len(),
            "elements": brd.elements.len(),
            "signals": brd.signals.len(),
            "classes": brd.classes.len(),
            "design_rules": brd.design_rules.as_ref().map(|dr| dr.name.clone()),
        }),
    };

    if let (Some(obj), serde_json::Value::Object(extra)) = (value.as_object_mut(), details) {
        obj.extend(extra);
    }
    value
}

fn print_json(value: &serde_json::Value) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to encode output");
            false
        }
    }
}

fn run_convert(cfg: &Config, inputs: &[String], output: Option<&Path>) -> ExitCode {
    let output_dir = output.or(cfg.output_dir.as_deref());
    if let Some(dir) = output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            error!(path = %dir.display(), error = %e, "Cannot create output directory");
            return ExitCode::FAILURE;
        }
    }

    let read_options = cfg.read_options();
    let export_options = cfg.export_options();
    let mut failed = 0usize;
    let mut converted = 0usize;

    for input in expand_inputs(inputs) {
        let input = cfg.resolve_input(&input);
        let target = mclib::output_path(&input, output_dir, &cfg.export.extension);
        let result = Drawing::open_with(&input, &read_options)
            .and_then(|drawing| mclib::save(&drawing, &target, &export_options));
        match result {
            Ok(backup) => {
                converted += 1;
                info!(
                    input = %input.display(),
                    output = %target.display(),
                    backup = ?backup,
                    "Converted"
                );
            }
            Err(e) => {
                failed += 1;
                error!(input = %input.display(), error = %e, "Conversion failed");
            }
        }
    }

    info!(converted, failed, "Conversion finished");
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_info(cfg: &Config, file: &Path) -> ExitCode {
    let file = cfg.resolve_input(file);
    match Drawing::open_with(&file, &cfg.read_options()) {
        Ok(drawing) if print_json(&summary(&file, &drawing)) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Failed to read drawing");
            ExitCode::FAILURE
        }
    }
}

fn run_search(cfg: &Config, pattern: &str, files: &[PathBuf], is_regex: bool) -> ExitCode {
    let matcher = match name_matcher(pattern, is_regex) {
        Ok(re) => re,
        Err(e) => {
            error!(pattern, error = %e, "Invalid pattern");
            return ExitCode::FAILURE;
        }
    };

    let mut results = Vec::new();
    let mut failed = false;
    for file in files {
        let file = cfg.resolve_input(file);
        let drawing = match Drawing::open_with(&file, &cfg.read_options()) {
            Ok(drawing) => drawing,
            Err(e) => {
                error!(error = %e, "Failed to read drawing");
                failed = true;
                continue;
            }
        };

        for lib in drawing.libraries() {
            let library = lib.name.clone();
            let names = lib
                .symbols()
                .iter()
                .map(|s| ("symbol", s.name.as_str()))
                .chain(lib.packages().iter().map(|p| ("package", p.name.as_str())))
                .chain(lib.device_sets().iter().map(|d| ("device_set", d.name.as_str())));
            for (kind, name) in names.filter(|(_, name)| matcher.is_match(name)) {
                results.push(json!({
                    "file": file.display().to_string(),
                    "library": library,
                    "kind": kind,
                    "name": name,
                }));
            }
        }
    }

    info!(pattern, matches = results.len(), "Search finished");
    let printed = print_json(&json!({ "pattern": pattern, "results": results }));
    if printed && !failed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Entry point for the eagle-mclib tool.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig read from: {}", default_path.display());
                    eprintln!("Compare with config/example-config.json");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting eagle-mclib");

    match &args.command {
        Command::Convert { inputs, output } => run_convert(&cfg, inputs, output.as_deref()),
        Command::Info { file } => run_info(&cfg, file),
        Command::Search {
            pattern,
            files,
            regex,
        } => run_search(&cfg, pattern, files, *regex),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn parse_convert_args() {
        let args = Args::try_parse_from(["eagle-mclib", "-vv", "convert", "*.lbr", "-o", "out"])
            .unwrap();
        assert_eq!(args.verbose, 2);
        match args.command {
            Command::Convert { inputs, output } => {
                assert_eq!(inputs, vec!["*.lbr".to_string()]);
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn log_level_precedence() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
        assert_eq!(get_log_level(1, false, "error"), Level::INFO);
        assert_eq!(get_log_level(5, false, "warn"), Level::TRACE);
    }

    #[test]
    fn glob_patterns() {
        assert_eq!(glob_to_regex("R*"), "R.*");
        assert_eq!(glob_to_regex("C0?05"), "C0.05");
        assert_eq!(glob_to_regex("SOT-23.5"), "SOT-23\\.5");

        let re = name_matcher("r*", false).unwrap();
        assert!(re.is_match("R0805"));
        assert!(!re.is_match("CR0805"));

        let re = name_matcher("c0(402|603)", true).unwrap();
        assert!(re.is_match("C0603"));
        assert!(!re.is_match("C0805"));
    }

    #[test]
    fn expand_keeps_unmatched_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.lbr"), "").unwrap();
        std::fs::write(dir.path().join("b.lbr"), "").unwrap();

        let pattern = dir.path().join("*.lbr").display().to_string();
        let missing = dir.path().join("missing.sch").display().to_string();
        let paths = expand_inputs(&[pattern, missing.clone()]);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2], PathBuf::from(missing));
    }

    #[test]
    fn library_summary() {
        let drawing = Drawing::new_library();
        let value = summary(Path::new("x.lbr"), &drawing);
        assert_eq!(value["kind"], "library");
        assert_eq!(value["symbols"], 0);
        assert!(value["layers"].as_u64().unwrap() > 0);
    }
}
