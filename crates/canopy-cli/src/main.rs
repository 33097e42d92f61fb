use std::io::Read;
use std::path::{Path, PathBuf};

use canopy::{ColorEncoding, Layout, LayoutCache, LayoutNode, LayoutOptions, RawEntry};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Layout(#[from] canopy::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn io(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().display().to_string();
        move |source| Self::Io { path, source }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "canopy-cli",
    version,
    about = "Lay out a file tree as nested circles (headless)."
)]
struct Cli {
    /// Log pipeline milestones to stderr (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a file tree as JSON and print the laid-out circles as JSON.
    Layout(LayoutArgs),
}

#[derive(Debug, clap::Args)]
struct LayoutArgs {
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Layout options as JSON (camelCase keys); flags below override it.
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Positions from a previous run. A missing file means a cold start.
    #[arg(long, value_name = "JSON")]
    cache: Option<PathBuf>,

    /// Where to write the cache for the next run.
    #[arg(long, value_name = "JSON")]
    cache_out: Option<PathBuf>,

    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// type, number-of-changes or last-change.
    #[arg(long, value_name = "ENCODING")]
    color_encoding: Option<ColorEncoding>,

    #[arg(long, value_name = "N")]
    max_nodes: Option<usize>,

    /// Write the layout here instead of stdout.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Input tree; `-` or nothing reads stdin.
    input: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOut<'a> {
    width: f64,
    height: f64,
    nodes: &'a [LayoutNode],
    highlighted_paths: &'a [String],
    truncated: usize,
}

impl<'a> From<&'a Layout> for LayoutOut<'a> {
    fn from(layout: &'a Layout) -> Self {
        Self {
            width: layout.width,
            height: layout.height,
            nodes: &layout.nodes,
            highlighted_paths: &layout.highlighted_paths,
            truncated: layout.truncated,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(CliError::io("<stdin>"))?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path).map_err(CliError::io(path)),
    }
}

fn load_options(args: &LayoutArgs) -> Result<LayoutOptions, CliError> {
    let mut options = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(CliError::io(path))?;
            LayoutOptions::from_json(&text)?
        }
        None => LayoutOptions::default(),
    };
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if let Some(encoding) = args.color_encoding {
        options.color_encoding = encoding;
    }
    if let Some(max_nodes) = args.max_nodes {
        options.max_nodes = max_nodes;
    }
    options.validate()?;
    Ok(options)
}

fn load_cache(path: Option<&Path>) -> Result<LayoutCache, CliError> {
    let Some(path) = path else {
        return Ok(LayoutCache::new());
    };
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(LayoutCache::from_json(&text)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no cache yet, starting cold");
            Ok(LayoutCache::new())
        }
        Err(err) => Err(CliError::io(path)(err)),
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&Path>) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match out {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => std::fs::write(path, text).map_err(CliError::io(path)),
    }
}

fn run_layout(args: LayoutArgs) -> Result<(), CliError> {
    let options = load_options(&args)?;
    let cache = load_cache(args.cache.as_deref())?;
    let raw: RawEntry = serde_json::from_str(&read_input(args.input.as_deref())?)?;

    let layout = canopy::layout(&raw, &cache, &options)?;
    debug!(
        nodes = layout.nodes.len(),
        truncated = layout.truncated,
        "layout done"
    );

    if let Some(path) = &args.cache_out {
        let text = layout.cache.to_json()?;
        std::fs::write(path, text).map_err(CliError::io(path))?;
    }
    write_json(&LayoutOut::from(&layout), args.pretty, args.out.as_deref())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Layout(args) => run_layout(args),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
