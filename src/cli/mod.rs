//! # CLI Module
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! # Preview what would happen
//! photo-organize organize --source ~/Camera --destination ~/Library --dry-run
//!
//! # Copy instead of move, Year/Month folders
//! photo-organize organize --source ~/Camera --destination ~/Library --operation copy --structure year-month
//!
//! # Only report duplicates
//! photo-organize duplicates ~/Camera --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_organizer::core::organize::{FolderStructure, OperationMode, OrganizeResult};
use photo_organizer::core::pipeline::{Pipeline, PipelineConfig, PipelineResult};
use photo_organizer::error::Result;
use photo_organizer::events::{
    AnalyzeEvent, Event, EventChannel, EventReceiver, ExecuteEvent, PipelineEvent, ScanEvent,
};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Dry-run previews list at most this many moves
const PREVIEW_LIMIT: usize = 50;

/// Photo Organizer - one copy of every photo, filed by date
#[derive(Parser, Debug)]
#[command(name = "photo-organize")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deduplicate a folder and file the kept photos into dated folders
    Organize {
        /// Source folder containing photos to organize
        #[arg(long)]
        source: PathBuf,

        /// Destination folder for organized photos
        #[arg(long)]
        destination: PathBuf,

        /// Preview changes without moving files
        #[arg(long)]
        dry_run: bool,

        /// Move (default) or copy the kept photos
        #[arg(long)]
        operation: Option<Operation>,

        /// Date folder layout
        #[arg(long)]
        structure: Option<Structure>,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Report duplicate groups without touching any file
    Duplicates {
        /// Directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct DetectionArgs {
    /// Disable filename similarity detection
    #[arg(long)]
    skip_filename_similarity: bool,

    /// Skip filename similarity above this many photos
    #[arg(long)]
    large_dataset_threshold: Option<usize>,

    /// Only group by capture time when it comes from EXIF
    #[arg(long)]
    temporal_exif_only: bool,

    /// Include hidden files and folders
    #[arg(long)]
    include_hidden: bool,

    /// JSON config file (flags override its values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl DetectionArgs {
    fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if self.skip_filename_similarity {
            config.detection.skip_filename_similarity = true;
        }
        if let Some(threshold) = self.large_dataset_threshold {
            config.detection.large_dataset_threshold = threshold;
        }
        if self.temporal_exif_only {
            config.detection.temporal_exif_only = true;
        }
        if self.include_hidden {
            config.scan.include_hidden = true;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Operation {
    Move,
    Copy,
}

impl From<Operation> for OperationMode {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Move => OperationMode::Move,
            Operation::Copy => OperationMode::Copy,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Structure {
    /// 2024/01/15
    YearMonthDay,
    /// 2024/01 - January
    YearMonth,
    /// 2024-01
    YearMonthFlat,
}

impl From<Structure> for FolderStructure {
    fn from(structure: Structure) -> Self {
        match structure {
            Structure::YearMonthDay => FolderStructure::YearMonthDay,
            Structure::YearMonth => FolderStructure::YearMonth,
            Structure::YearMonthFlat => FolderStructure::YearMonthFlat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (excluded duplicate paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Organize {
            source,
            destination,
            dry_run,
            operation,
            structure,
            detection,
            output,
        } => {
            photo_organizer::init_tracing(detection.verbose);
            let mut config = detection.to_config()?;
            config.sources = vec![source];
            config.destination = Some(destination);
            if let Some(op) = operation {
                config.operation = op.into();
            }
            if let Some(structure) = structure {
                config.folder_structure = structure.into();
            }
            run_organize(config, dry_run, output, detection.verbose)
        }
        Commands::Duplicates {
            paths,
            detection,
            output,
        } => {
            photo_organizer::init_tracing(detection.verbose);
            let mut config = detection.to_config()?;
            config.sources = paths;
            config.destination = None;
            run_duplicates(config, output, detection.verbose)
        }
    }
}

fn run_organize(config: PipelineConfig, dry_run: bool, output: OutputFormat, verbose: bool) -> Result<()> {
    let term = Term::stderr();
    let pretty = output == OutputFormat::Pretty;
    let source = config.sources.first().cloned().unwrap_or_default();
    let destination = config.destination.clone().unwrap_or_default();

    if pretty {
        print_header(&term);
        term.write_line(&format!("  Source:      {}", display_path(&source))).ok();
        term.write_line(&format!("  Destination: {}", display_path(&destination))).ok();
        let mode = if dry_run {
            style("DRY-RUN (preview only)".to_string()).yellow()
        } else {
            style(format!("LIVE (will {} files)", config.operation)).red().bold()
        };
        term.write_line(&format!("  Mode:        {}", mode)).ok();
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder().config(config).build()?;
    let result = run_with_progress(&pipeline, pretty && !verbose)?;

    let outcome = if dry_run {
        None
    } else {
        Some(execute_with_progress(&pipeline, &result, pretty && !verbose)?)
    };

    match output {
        OutputFormat::Pretty => {
            print_statistics(&term, &result);
            if let Some(outcome) = &outcome {
                print_outcome(&term, &pipeline, outcome);
            } else {
                print_preview(&term, &result, &source, &destination);
                term.write_line(&format!(
                    "{}",
                    style("Dry-run complete. Run without --dry-run to organize the files.").dim()
                ))
                .ok();
            }
        }
        OutputFormat::Json => print_json_organize(&result, outcome.as_ref()),
        OutputFormat::Minimal => {
            if let Some(plan) = &result.plan {
                for file in &plan.files {
                    println!("{}\t{}", file.source.display(), file.destination.display());
                }
            }
        }
    }

    Ok(())
}

fn run_duplicates(config: PipelineConfig, output: OutputFormat, verbose: bool) -> Result<()> {
    let term = Term::stderr();
    let pretty = output == OutputFormat::Pretty;

    if pretty {
        print_header(&term);
    }

    let pipeline = Pipeline::builder().config(config).build()?;
    let result = run_with_progress(&pipeline, pretty && !verbose)?;

    match output {
        OutputFormat::Pretty => {
            print_statistics(&term, &result);
            print_groups(&term, &result, verbose);
            term.write_line(&format!(
                "{}",
                style("No files were changed. Review carefully before taking action.").dim()
            ))
            .ok();
        }
        OutputFormat::Json => print_json_duplicates(&result),
        OutputFormat::Minimal => {
            for &id in &result.selection.exclude {
                println!("{}", result.store[id].path.display());
            }
        }
    }

    Ok(())
}

fn new_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(bar_style);
    pb
}

/// Drain pipeline events into a progress bar on a separate thread
fn spawn_progress(receiver: EventReceiver, pb: Option<ProgressBar>) -> JoinHandle<()> {
    thread::spawn(move || {
        let Some(pb) = pb else {
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Completed { total_photos }) => {
                    pb.set_length(total_photos as u64);
                    pb.set_position(0);
                }
                Event::Analyze(AnalyzeEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Execute(ExecuteEvent::Started { total_files }) => {
                    pb.set_length(total_files as u64);
                    pb.set_position(0);
                }
                Event::Execute(ExecuteEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Execute(ExecuteEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
        pb.finish_and_clear();
    })
}

fn run_with_progress(pipeline: &Pipeline, show_bar: bool) -> Result<PipelineResult> {
    let (sender, receiver) = EventChannel::new();
    let handle = spawn_progress(receiver, show_bar.then(new_progress_bar));

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    handle.join().ok();
    result
}

fn execute_with_progress(
    pipeline: &Pipeline,
    result: &PipelineResult,
    show_bar: bool,
) -> Result<OrganizeResult> {
    let (sender, receiver) = EventChannel::new();
    let handle = spawn_progress(receiver, show_bar.then(new_progress_bar));

    let outcome = pipeline.execute_with_events(result, &sender);

    drop(sender);
    handle.join().ok();
    Ok(outcome?)
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("Photo Organizer").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_statistics(term: &Term, result: &PipelineResult) {
    let rule = "=".repeat(60);
    term.write_line(&rule).ok();
    term.write_line(&format!("{}", style("ORGANIZATION STATISTICS").bold())).ok();
    term.write_line(&rule).ok();
    term.write_line(&format!(
        "  Total photos scanned:     {}",
        style(result.total_photos()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  Duplicate groups found:   {}",
        style(result.partition.groups().len()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  Total duplicate photos:   {}",
        style(result.duplicate_count()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  Unique photos to keep:    {}",
        style(result.selection.keep.len()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  Potential space savings:  {}",
        style(format_bytes(result.potential_savings_bytes())).yellow()
    ))
    .ok();
    if let Some(plan) = &result.plan {
        term.write_line(&format!(
            "  Renamed / conflicts:      {} / {}",
            plan.renamed_count, plan.conflict_count
        ))
        .ok();
    }
    term.write_line(&format!(
        "  Completed in:             {:.1}s",
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&rule).ok();

    if !result.errors.is_empty() {
        term.write_line(&format!(
            "  {} {} files had problems (run with --verbose for details)",
            style("!").yellow().bold(),
            result.errors.len()
        ))
        .ok();
    }
    term.write_line("").ok();
}

fn print_preview(term: &Term, result: &PipelineResult, source: &Path, destination: &Path) {
    let Some(plan) = &result.plan else {
        return;
    };

    term.write_line(&format!(
        "{}",
        style("PREVIEW (DRY-RUN MODE - No files will be moved)").bold().underlined()
    ))
    .ok();
    for file in plan.files.iter().take(PREVIEW_LIMIT) {
        let from = file.source.strip_prefix(source).unwrap_or(&file.source);
        let to = file
            .destination
            .strip_prefix(destination)
            .unwrap_or(&file.destination);
        term.write_line(&format!("  {}  ->  {}", from.display(), style(to.display()).green()))
            .ok();
    }
    if plan.files.len() > PREVIEW_LIMIT {
        term.write_line(&format!(
            "\n  ... and {} more files",
            plan.files.len() - PREVIEW_LIMIT
        ))
        .ok();
    }
    term.write_line("").ok();
}

fn print_outcome(term: &Term, pipeline: &Pipeline, outcome: &OrganizeResult) {
    let verb = match pipeline.config().operation {
        OperationMode::Move => "moved",
        OperationMode::Copy => "copied",
    };
    term.write_line(&format!(
        "{} Completed: {} files {}, {} errors",
        style("✓").green().bold(),
        style(outcome.files_processed).cyan(),
        verb,
        outcome.errors.len()
    ))
    .ok();
    for error in &outcome.errors {
        term.write_line(&format!("  {} {}", style("✗").red(), error)).ok();
    }
}

fn print_groups(term: &Term, result: &PipelineResult, verbose: bool) {
    if result.partition.groups().is_empty() {
        term.write_line(&format!("  {} No duplicates found!", style("✓").green()))
            .ok();
        term.write_line("").ok();
        return;
    }

    term.write_line(&format!("{}", style("Duplicate Groups:").bold().underlined()))
        .ok();
    term.write_line("").ok();

    for (group, winner) in result.partition.groups().iter().zip(&result.selection.winners) {
        term.write_line(&format!(
            "  {} {} ({} photos)",
            style(format!("{}:", group.id)).bold(),
            style(group.method.to_string()).yellow(),
            group.len()
        ))
        .ok();

        for &id in &group.members {
            let marker = if id == winner.keep {
                style("★").green().to_string()
            } else {
                style("○").dim().to_string()
            };
            term.write_line(&format!("    {} {}", marker, display_path(&result.store[id].path)))
                .ok();
        }

        if verbose {
            term.write_line(&format!(
                "    {} {}",
                style("Kept because:").dim(),
                style(winner.reason).dim()
            ))
            .ok();
        }
        term.write_line("").ok();
    }
}

fn summary_json(result: &PipelineResult) -> serde_json::Value {
    serde_json::json!({
        "total_photos": result.total_photos(),
        "duplicate_groups": result.partition.groups().len(),
        "duplicate_count": result.duplicate_count(),
        "kept": result.selection.keep.len(),
        "potential_savings_bytes": result.potential_savings_bytes(),
        "duration_ms": result.duration_ms,
        "errors": result.errors,
    })
}

fn print_json_duplicates(result: &PipelineResult) {
    let groups: Vec<_> = result
        .partition
        .groups()
        .iter()
        .zip(&result.selection.winners)
        .map(|(group, winner)| {
            serde_json::json!({
                "id": group.id,
                "method": group.method.tag(),
                "key": group.key,
                "photos": group.members.iter().map(|&id| &result.store[id].path).collect::<Vec<_>>(),
                "keep": result.store[winner.keep].path,
                "keep_reason": winner.reason,
            })
        })
        .collect();

    let mut output = summary_json(result);
    output["groups"] = serde_json::Value::from(groups);
    println!("{:#}", output);
}

fn print_json_organize(result: &PipelineResult, outcome: Option<&OrganizeResult>) {
    let mut output = summary_json(result);
    output["dry_run"] = serde_json::Value::from(outcome.is_none());
    output["plan"] = serde_json::to_value(&result.plan).unwrap_or_default();
    output["result"] = serde_json::to_value(outcome).unwrap_or_default();
    println!("{:#}", output);
}

/// Show paths under the home directory as `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
