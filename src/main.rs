//! Switchfix CLI binary
//!
//! This is the main entry point for the switchfix command-line interface.
//! The CLI is a thin adapter over existing APIs - NO logic is implemented here.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use switchfix::cli::{CliErrorPayload, CliSuccessPayload, Commands, RunArgs};
use switchfix::{PatchConfig, SwitchfixError};

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = switchfix::cli::parse_args();

    // Initialize logger if verbose
    if cli.verbose {
        env_logger::init();
    }

    // No subcommand means a plain batch run
    let command = cli.command.unwrap_or(Commands::Run(RunArgs::default()));
    let json = command.json();

    let result = match command {
        Commands::Run(args) => execute_run(&args),
        Commands::Scan { config, root, json } => {
            execute_scan(config.as_deref(), root.as_deref(), json)
        }
        Commands::Undo { manifest, root } => execute_undo(&manifest, root.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            if json {
                print_json(&CliErrorPayload::from_error(&e));
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(1)
        }
    }
}

/// Execute the run command.
///
/// Prints one line per target as it finishes, then the aggregate counts
/// and `Done!`. Exits non-zero when any file failed.
fn execute_run(args: &RunArgs) -> Result<ExitCode, SwitchfixError> {
    use switchfix::batch::{run_batch, BatchOptions};
    use switchfix::cli::{file_line, summary_line};

    let config = load_config(args.config.as_deref())?;
    let options = BatchOptions {
        root: resolve_root(args.root.as_deref())?,
        dry_run: args.dry_run,
        fail_fast: args.fail_fast,
        create_backup: args.create_backup,
        operation_id: args.operation_id.clone(),
    };

    let report = run_batch(&config, &options, |file| {
        if !args.json {
            println!("{}", file_line(file, options.dry_run));
        }
    })?;

    let counts = report.counts();
    if args.json {
        let data = serde_json::to_value(&report)
            .map_err(|e| SwitchfixError::Other(format!("Failed to serialize report: {}", e)))?;
        print_json(&CliSuccessPayload::with_data(summary_line(&counts), data));
    } else {
        if let Some(manifest) = &report.backup_manifest {
            println!("Backup manifest: {}", manifest.display());
        }
        println!("{}", summary_line(&counts));
        println!("Done!");
    }

    Ok(if report.has_failures() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Execute the scan command.
fn execute_scan(
    config_path: Option<&Path>,
    root: Option<&Path>,
    json: bool,
) -> Result<ExitCode, SwitchfixError> {
    use switchfix::batch::scan_targets;
    use switchfix::cli::scan_lines;

    let config = load_config(config_path)?;
    let reports = scan_targets(&config, &resolve_root(root)?)?;

    if json {
        let data = serde_json::to_value(&reports)
            .map_err(|e| SwitchfixError::Other(format!("Failed to serialize scan: {}", e)))?;
        print_json(&CliSuccessPayload::with_data(
            format!("Scanned {} file(s)", reports.len()),
            data,
        ));
    } else {
        for report in &reports {
            for line in scan_lines(report) {
                println!("{}", line);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Execute the undo command.
fn execute_undo(manifest: &Path, root: Option<&Path>) -> Result<ExitCode, SwitchfixError> {
    use switchfix::patch::restore_from_manifest;

    let restored = restore_from_manifest(manifest, &resolve_root(root)?)?;
    println!(
        "Restored {} file(s) from {}",
        restored,
        manifest.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn load_config(path: Option<&Path>) -> Result<PatchConfig, SwitchfixError> {
    match path {
        Some(path) => PatchConfig::load(path),
        None => Ok(PatchConfig::default()),
    }
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf, SwitchfixError> {
    match root {
        Some(root) => Ok(root.to_path_buf()),
        None => std::env::current_dir().map_err(|e| SwitchfixError::Io {
            path: PathBuf::from("."),
            source: e,
        }),
    }
}

fn print_json<T: serde::Serialize>(payload: &T) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: failed to serialize output: {}", e),
    }
}
