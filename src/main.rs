// Command-line entry point for include_trace.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use include_trace::api::dto::{JsonTreeExporter, ScopeDto};
use include_trace::application::{AnalyzeOptions, AnalyzeUsecase};
use include_trace::domain::path::PathNormalizer;
use include_trace::infrastructure::concurrency::init_thread_pool;
use include_trace::infrastructure::config_loader::{FileConfig, Overrides, Settings};
use include_trace::infrastructure::{load_trace, FsSourceResolver};
use include_trace::ports::cluster_exporter::ClusterDotExporter;
use include_trace::ports::GraphExporter;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Dot,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Header inclusion trace (e.g. the stderr of `gcc -H`)
    #[arg(short, long)]
    file: PathBuf,

    /// Directory that paths beginning with `.` are relative to
    #[arg(long)]
    base: Option<String>,

    /// Ignore trace lines nested deeper than this
    #[arg(long = "max-level")]
    max_level: Option<usize>,

    /// Dump the scope tree as JSON before rendering
    #[arg(long = "print-tree")]
    print_tree: bool,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path prefixes merged into a single node, first match wins
    #[arg(long, num_args = 0..)]
    collapse: Vec<String>,

    /// Directories searched when resolving headers for the include scan
    #[arg(long, num_args = 0..)]
    include: Vec<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name of the implicit root the first-level includes hang off
    #[arg(long = "root-name")]
    root_name: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "dot")]
    format: Format,

    /// Skip scanning header contents for further includes
    #[arg(long = "no-scan")]
    no_scan: bool,

    /// Write include targets found by the scan to this file, one per line
    #[arg(long = "includes-out")]
    includes_out: Option<PathBuf>,

    /// Worker threads for the include scan
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

fn run(cli: Cli) -> Result<()> {
    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        file_config,
        Overrides {
            base: cli.base.clone(),
            max_level: cli.max_level,
            root_name: cli.root_name.clone(),
            collapse: cli.collapse.clone(),
            include: cli.include.clone(),
        },
    );
    log::debug!("effective settings: {:?}", settings);

    let trace = load_trace(&cli.file)?;

    if !cli.no_scan {
        init_thread_pool(cli.jobs)?;
    }

    let normalizer = PathNormalizer::new(settings.normalizer_config());
    let resolver = FsSourceResolver::new(settings.include.clone());
    let exporter: &dyn GraphExporter = match cli.format {
        Format::Dot => &ClusterDotExporter,
        Format::Json => &JsonTreeExporter,
    };
    let usecase = AnalyzeUsecase {
        normalizer: &normalizer,
        resolver: &resolver,
        exporter,
    };

    let analysis = usecase
        .analyze(
            &trace,
            &AnalyzeOptions {
                max_depth: settings.max_level,
                root_name: settings.root_name.clone(),
                scan: !cli.no_scan,
            },
        )
        .with_context(|| format!("Malformed trace file {}", cli.file.display()))?;

    log::info!(
        "{} files in {} scopes, {} edges",
        analysis.tree.node_count(),
        analysis.tree.scope_count(),
        analysis.tree.edge_count()
    );

    if let Some(report) = &analysis.scan {
        // Skips are part of the run's output, not diagnostics, so `-q` keeps them.
        for path in &report.skipped {
            eprintln!("skipped: {}", path);
        }
        log::info!(
            "scanned {} files, {} include targets, {} skipped",
            report.scanned,
            report.discovered.len(),
            report.skipped.len()
        );
        if let Some(path) = &cli.includes_out {
            let mut content = report.discovered.join("\n");
            content.push('\n');
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    if cli.print_tree {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        serde_json::to_writer_pretty(&mut lock, &ScopeDto::from_tree(&analysis.tree))?;
        writeln!(lock)?;
    }

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            usecase
                .render(&analysis, &mut writer)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            usecase
                .render(&analysis, &mut writer)
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
