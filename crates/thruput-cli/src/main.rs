//! Throughput calculator CLI.
//!
//! Provides the `thruput` binary. Tables are installed into the home
//! directory on first use (or when the built-in graphs change), then
//! obsmodes are resolved against them and curves are composed from the data
//! directory.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use thruput_core::{CoreError, FileCurveSource, ObservationMode};
use thruput_storage::{
    ensure_tables, install_curves, install_tables, list_keywords, load_catalog, load_graph_table,
    SqliteStore, StorageError, ThruputConfig,
};

/// Throughput and sensitivity of ULTRACAM, HiPERCAM and ULTRASPEC light paths.
#[derive(Parser)]
#[command(name = "thruput", about = "Instrument throughput calculator")]
struct Cli {
    /// Home directory for the table database (default: $THRUPUT_HOME or ~/.ucam_thruput).
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Directory holding the curve files (default: $THRUPUT_DATA or <home>/data).
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Spectral library directory for install-curves (default: $THRUPUT_CDBS).
    #[arg(long, global = true)]
    cdbs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Install the graph and component tables.
    Install {
        /// Reinstall even if the tables are up to date.
        #[arg(short, long)]
        force: bool,
    },

    /// List every keyword usable in an obsmode.
    Keywords,

    /// Resolve an obsmode and print the light path as JSON.
    Resolve {
        /// Comma or space separated keywords, e.g. "ucam,wht,g".
        obsmode: String,
    },

    /// List the curve files an obsmode multiplies together.
    Files { obsmode: String },

    /// Write the composed throughput curve.
    Throughput {
        obsmode: String,

        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the sensitivity curve in counts/s/Å per erg/cm²/s/Å.
    Sensitivity {
        obsmode: String,

        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Copy the curve files into the spectral library.
    InstallCurves,

    /// Report graph components missing from the component table.
    Check,
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = load_config(&cli).and_then(|config| match cli.command {
        Commands::Install { force } => run_install(&config, force),
        Commands::Keywords => run_keywords(&config),
        Commands::Resolve { obsmode } => run_resolve(&config, &obsmode),
        Commands::Files { obsmode } => run_files(&config, &obsmode),
        Commands::Throughput { obsmode, output } => {
            run_throughput(&config, &obsmode, output.as_deref())
        }
        Commands::Sensitivity { obsmode, output } => {
            run_sensitivity(&config, &obsmode, output.as_deref())
        }
        Commands::InstallCurves => run_install_curves(&config),
        Commands::Check => run_check(&config),
    });

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            error_exit_code(&e)
        }
    };
    process::exit(exit_code);
}

/// Exit code for a failed command: 1 for a bad obsmode or configuration,
/// 3 for I/O and database errors.
fn error_exit_code(e: &StorageError) -> i32 {
    match e {
        StorageError::Core(CoreError::Io { .. } | CoreError::CurveParse { .. }) => 3,
        StorageError::Core(_) | StorageError::Config { .. } | StorageError::LibraryDir { .. } => 1,
        _ => 3,
    }
}

/// Environment configuration with command line overrides applied.
fn load_config(cli: &Cli) -> Result<ThruputConfig, StorageError> {
    let mut config = ThruputConfig::from_env_with_home(cli.home.clone())?;
    if let Some(data) = &cli.data {
        config = config.with_data_dir(data);
    }
    if let Some(cdbs) = &cli.cdbs {
        config = config.with_library_dir(cdbs);
    }
    tracing::debug!(
        home = %config.home().display(),
        data = %config.data_dir().display(),
        "configuration"
    );
    Ok(config)
}

/// Opens the table database, creating the home directory if needed.
fn open_store(config: &ThruputConfig) -> Result<SqliteStore, StorageError> {
    std::fs::create_dir_all(config.home()).map_err(|source| StorageError::Io {
        path: config.home().to_path_buf(),
        source,
    })?;
    SqliteStore::new(&config.database_path())
}

/// Opens the store, installing the tables if they are missing or stale.
fn open_installed(config: &ThruputConfig) -> Result<SqliteStore, StorageError> {
    let mut store = open_store(config)?;
    ensure_tables(&mut store)?;
    Ok(store)
}

fn resolve_mode(config: &ThruputConfig, obsmode: &str) -> Result<ObservationMode, StorageError> {
    let store = open_installed(config)?;
    let graph = load_graph_table(&store)?;
    let catalog = load_catalog(&store, config)?;
    Ok(ObservationMode::new(obsmode, &graph, &catalog)?)
}

/// Runs `write` against `output`, or stdout when no file is given.
fn write_output<F>(output: Option<&Path>, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StorageError::Io { path, source }
    };
    match output {
        Some(path) => {
            let file = File::create(path).map_err(io_error(path))?;
            let mut out = BufWriter::new(file);
            write(&mut out).map_err(io_error(path))?;
            out.flush().map_err(io_error(path))
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write(&mut out).map_err(io_error(Path::new("<stdout>")))
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn run_install(config: &ThruputConfig, force: bool) -> Result<i32, StorageError> {
    let mut store = open_store(config)?;
    let installed = if force {
        install_tables(&mut store)?;
        true
    } else {
        ensure_tables(&mut store)?
    };
    if installed {
        println!("Installed tables in {}", config.database_path().display());
    } else {
        println!("Tables in {} are up to date", config.database_path().display());
    }
    Ok(0)
}

fn run_keywords(config: &ThruputConfig) -> Result<i32, StorageError> {
    let store = open_installed(config)?;
    for keyword in list_keywords(&store)? {
        println!("{}", keyword);
    }
    Ok(0)
}

fn run_resolve(config: &ThruputConfig, obsmode: &str) -> Result<i32, StorageError> {
    let mode = resolve_mode(config, obsmode)?;
    let report = serde_json::json!({
        "obsmode": mode.to_string(),
        "telescope": mode.telescope(),
        "primary_area": mode.primary_area(),
        "resolution": mode.resolution(),
        "files": mode.showfiles(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}

fn run_files(config: &ThruputConfig, obsmode: &str) -> Result<i32, StorageError> {
    let mode = resolve_mode(config, obsmode)?;
    for path in mode.throughput_files() {
        println!("{}", path.display());
    }
    Ok(0)
}

fn run_throughput(
    config: &ThruputConfig,
    obsmode: &str,
    output: Option<&Path>,
) -> Result<i32, StorageError> {
    let mode = resolve_mode(config, obsmode)?;
    match mode.throughput(&FileCurveSource)? {
        Some(curve) => {
            write_output(output, |out| curve.write_to(out))?;
            Ok(0)
        }
        None => {
            eprintln!("Error: obsmode '{}' has no throughput components", mode);
            Ok(1)
        }
    }
}

fn run_sensitivity(
    config: &ThruputConfig,
    obsmode: &str,
    output: Option<&Path>,
) -> Result<i32, StorageError> {
    let mode = resolve_mode(config, obsmode)?;
    match mode.sensitivity(&FileCurveSource)? {
        Some(sensitivity) => {
            write_output(output, |out| sensitivity.write_to(out))?;
            Ok(0)
        }
        None => {
            eprintln!("Error: obsmode '{}' has no throughput components", mode);
            Ok(1)
        }
    }
}

fn run_install_curves(config: &ThruputConfig) -> Result<i32, StorageError> {
    let store = open_installed(config)?;
    let copied = install_curves(&store, config)?;
    println!("Copied {} curve files", copied.len());
    Ok(0)
}

fn run_check(config: &ThruputConfig) -> Result<i32, StorageError> {
    let store = open_installed(config)?;
    let graph = load_graph_table(&store)?;
    let catalog = load_catalog(&store, config)?;

    let missing = catalog.missing(&graph);
    if missing.is_empty() {
        println!(
            "{} components, {} graph rows: component table is complete",
            catalog.len(),
            graph.row_count()
        );
        return Ok(0);
    }
    for name in &missing {
        eprintln!("Error: component '{}' has no component table entry", name);
    }
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_global_overrides() {
        let cli = Cli::parse_from([
            "thruput", "--home", "/tmp/h", "--data", "/tmp/d", "throughput", "ucam,wht,g", "-o",
            "g.txt",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.home(), Path::new("/tmp/h"));
        assert_eq!(config.data_dir(), Path::new("/tmp/d"));
        match cli.command {
            Commands::Throughput { obsmode, output } => {
                assert_eq!(obsmode, "ucam,wht,g");
                assert_eq!(output, Some(PathBuf::from("g.txt")));
            }
            _ => panic!("expected throughput subcommand"),
        }
    }

    #[test]
    fn resolution_errors_exit_with_one() {
        let e = StorageError::Core(CoreError::UnusedMode {
            modes: vec!["x".into()],
        });
        assert_eq!(error_exit_code(&e), 1);
        let e = StorageError::IntegrityError {
            reason: "empty".into(),
        };
        assert_eq!(error_exit_code(&e), 3);
    }

    #[test]
    fn commands_run_against_a_temporary_home() {
        let dir = tempfile::tempdir().unwrap();
        let config = ThruputConfig::with_home(dir.path().join("home"));
        assert_eq!(run_install(&config, false).unwrap(), 0);
        assert_eq!(run_keywords(&config).unwrap(), 0);
        assert_eq!(run_resolve(&config, "ucam,wht,g").unwrap(), 0);
        // No curve files were written, so the data directory lookup fails.
        let err = run_throughput(&config, "ucam,wht,g", None).unwrap_err();
        assert_eq!(error_exit_code(&err), 3);
        let err = run_resolve(&config, "ucam,g").unwrap_err();
        assert_eq!(error_exit_code(&err), 1);
    }
}
