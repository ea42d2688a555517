//! chainconf CLI - Command-line interface for chainconf documents
//!
//! Usage:
//!   chainconf get episode.config padding horizontal
//!   chainconf dump episode.config --format json
//!   chainconf check shows/*.config

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use chainconf_core::{KeyStore, Loader, LoaderOptions};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, LevelFilter};

/// chainconf - Inheritable configuration documents
#[derive(Parser, Debug)]
#[command(name = "chainconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory searched for bare document names (e.g., "episode" -> DIR/episode.config)
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a specific value from the configuration
    Get {
        /// Configuration document
        file: PathBuf,

        /// Key segments, joined with '/' (e.g., padding horizontal)
        #[arg(required = true)]
        key: Vec<String>,

        /// Output format: text, json, yaml
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Default value if key not found
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Export the resolved configuration
    Dump {
        /// Configuration document
        file: PathBuf,

        /// Output format: yaml, json
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show source documents instead of values
        #[arg(long)]
        sources: bool,
    },

    /// Load documents and report whether they resolve
    Check {
        /// Configuration document(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(cli)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn execute(cli: Cli) -> ExitCode {
    let loader = loader(cli.config_dir);

    match cli.command {
        Commands::Get {
            file,
            key,
            format,
            default,
        } => cmd_get(&loader, file, &key, &format, default),

        Commands::Dump {
            file,
            format,
            output,
            sources,
        } => cmd_dump(&loader, file, &format, output, sources),

        Commands::Check { files } => cmd_check(&loader, files),
    }
}

fn loader(config_dir: Option<PathBuf>) -> Loader {
    let mut options = LoaderOptions::default();
    if let Some(dir) = config_dir {
        options = options.with_search_dir(dir);
    }
    Loader::with_options(options)
}

fn load_store(loader: &Loader, file: &PathBuf) -> Result<KeyStore, String> {
    debug!("loading {}", file.display());
    loader
        .load(file)
        .map_err(|e| format!("Failed to load {}: {}", file.display(), e))
}

fn write_output(content: &str, output: Option<PathBuf>) -> ExitCode {
    match output {
        Some(output_path) => {
            if let Err(e) = std::fs::write(&output_path, content) {
                eprintln!("{}: {}", "Error writing file".red(), e);
                return ExitCode::from(1);
            }
            eprintln!("{} Wrote to {}", "✓".green(), output_path.display());
        }
        None => print!("{}", content),
    }
    ExitCode::SUCCESS
}

fn format_value(value: &str, format: &str) -> Result<String, String> {
    match format {
        "json" => serde_json::to_string(value)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        "yaml" => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        "text" => Ok(format!("{}\n", value)),
        other => Err(format!(
            "Unsupported format: {}. Use text, json, or yaml.",
            other
        )),
    }
}

fn cmd_get(
    loader: &Loader,
    file: PathBuf,
    key: &[String],
    format: &str,
    default: Option<String>,
) -> ExitCode {
    let store = match load_store(loader, &file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    let value = match (store.get(key), default.as_deref()) {
        (Ok(value), _) => value,
        (Err(_), Some(fallback)) => fallback,
        (Err(e), None) => {
            eprintln!("{}: {}", "Error".red(), e);
            return ExitCode::from(1);
        }
    };

    match format_value(value, format) {
        Ok(content) => {
            print!("{}", content);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.red());
            ExitCode::from(1)
        }
    }
}

fn render_store(store: &KeyStore, format: &str, sources: bool) -> Result<String, String> {
    if sources {
        let source_map: BTreeMap<&str, String> = store
            .sources()
            .iter()
            .map(|(k, p)| (k.as_str(), p.display().to_string()))
            .collect();

        return match format {
            "json" => serde_json::to_string_pretty(&source_map)
                .map(|s| s + "\n")
                .map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::to_string(&source_map).map_err(|e| e.to_string()),
            other => Err(format!("Unsupported format: {}. Use yaml or json.", other)),
        };
    }

    match format {
        "json" => serde_json::to_string_pretty(store)
            .map(|s| s + "\n")
            .map_err(|e| e.to_string()),
        "yaml" | "yml" => serde_yaml::to_string(store).map_err(|e| e.to_string()),
        other => Err(format!("Unsupported format: {}. Use yaml or json.", other)),
    }
}

fn cmd_dump(
    loader: &Loader,
    file: PathBuf,
    format: &str,
    output: Option<PathBuf>,
    sources: bool,
) -> ExitCode {
    let store = match load_store(loader, &file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e.red());
            return ExitCode::from(2);
        }
    };

    match render_store(&store, format, sources) {
        Ok(content) => write_output(&content, output),
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn cmd_check(loader: &Loader, files: Vec<PathBuf>) -> ExitCode {
    let mut all_valid = true;

    for file in files {
        match loader.load(&file) {
            Ok(store) => {
                println!(
                    "{} {}: {} keys",
                    "✓".green(),
                    file.display(),
                    store.len()
                );
            }
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e);
                all_valid = false;
            }
        }
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
