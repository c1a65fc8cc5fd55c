//! pdfdesk CLI - PDF split, merge, compress, and cleanup tool

use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfdesk::{
    workspace, CompressionLevel, Job, JobEvent, JobSettings, SplitOptions,
};

#[derive(Parser)]
#[command(name = "pdfdesk")]
#[command(version)]
#[command(about = "Split, merge, compress, and clean up PDF documents", long_about = None)]
struct Cli {
    /// Input PDF file (shows document information)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Split a PDF into parts
    Split {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (input's directory if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Pages per part (one part per page if not specified)
        #[arg(long, value_name = "N", conflicts_with = "ranges")]
        chunks: Option<u32>,

        /// Page ranges, one part each (e.g., "1-3,7-9")
        #[arg(long, value_name = "RANGES")]
        ranges: Option<String>,
    },

    /// Merge PDF files into one
    Merge {
        /// Input PDF files, merged in order
        #[arg(value_name = "FILES", num_args = 2..)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Drop the first document's metadata
        #[arg(long)]
        strip_metadata: bool,
    },

    /// Recompress a PDF's streams
    Compress {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file ({name}_compressed.pdf if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Compression level
        #[arg(long, value_enum, default_value = "balanced")]
        level: LevelArg,
    },

    /// Delete pages from a PDF
    Delete {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pages to delete (e.g., "2-4, 7")
        #[arg(value_name = "PAGES")]
        pages: String,

        /// Output file ({name}_trimmed.pdf if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run a JSON settings file against a PDF
    Run {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Settings file
        #[arg(short, long, value_name = "FILE")]
        settings: PathBuf,

        /// Print the job report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a folder's entries
    List {
        /// Folder to list (platform root if not specified)
        #[arg(value_name = "DIR")]
        path: Option<PathBuf>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search a folder tree for files by name
    Search {
        /// Name fragment to look for
        #[arg(value_name = "PATTERN")]
        pattern: String,

        /// Folder to search (platform root if not specified)
        #[arg(value_name = "DIR")]
        path: Option<PathBuf>,
    },

    /// Sort a folder's files into category subfolders
    Organize {
        /// Folder to organize
        #[arg(value_name = "DIR")]
        path: PathBuf,

        /// Show planned moves without touching anything
        #[arg(long)]
        dry_run: bool,

        /// Print the move list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    /// Copy the file unchanged
    None,
    /// Compress uncompressed streams, speed-biased
    Fast,
    /// Compress uncompressed streams and prune orphans (default)
    Balanced,
    /// Also re-encode existing Flate streams at the best level
    Maximum,
}

impl From<LevelArg> for CompressionLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::None => CompressionLevel::None,
            LevelArg::Fast => CompressionLevel::Fast,
            LevelArg::Balanced => CompressionLevel::Balanced,
            LevelArg::Maximum => CompressionLevel::Maximum,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Split {
            input,
            output,
            chunks,
            ranges,
        }) => cmd_split(&input, output.as_deref(), chunks, ranges.as_deref()),
        Some(Commands::Merge {
            inputs,
            output,
            strip_metadata,
        }) => cmd_merge(&inputs, &output, strip_metadata),
        Some(Commands::Compress {
            input,
            output,
            level,
        }) => cmd_compress(&input, output.as_deref(), level),
        Some(Commands::Delete {
            input,
            pages,
            output,
        }) => cmd_delete(&input, &pages, output.as_deref()),
        Some(Commands::Run {
            input,
            settings,
            json,
        }) => cmd_run(&input, &settings, json),
        Some(Commands::List { path, json }) => cmd_list(path.as_deref(), json),
        Some(Commands::Search { pattern, path }) => cmd_search(&pattern, path.as_deref()),
        Some(Commands::Organize {
            path,
            dry_run,
            json,
        }) => cmd_organize(&path, dry_run, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: show info if a file is provided
            if let Some(input) = cli.input {
                cmd_info(&input)
            } else {
                println!("{}", "Usage: pdfdesk <FILE>".yellow());
                println!("       pdfdesk <COMMAND> --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let summary = pdfdesk::inspect_file(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), summary.path.display());
    println!("{}: PDF {}", "Format".bold(), summary.pdf_version);
    println!("{}: {}", "Pages".bold(), summary.page_count);
    println!("{}: {}", "Size".bold(), format_bytes(summary.file_size));
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if summary.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = summary.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = summary.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = summary.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref keywords) = summary.keywords {
        println!("{}: {}", "Keywords".bold(), keywords);
    }
    if let Some(ref creator) = summary.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = summary.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = summary.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = summary.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    Ok(())
}

fn cmd_split(
    input: &Path,
    output: Option<&Path>,
    chunks: Option<u32>,
    ranges: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = if let Some(expr) = ranges {
        SplitOptions::ranges(expr)
    } else if let Some(size) = chunks {
        SplitOptions::chunks(size)
    } else {
        SplitOptions::single()
    };

    let output_dir = output
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    let (parts, stats) = pdfdesk::split_file(input, &options, &output_dir)?;

    println!("{}", "Output files:".green().bold());
    for (i, part) in parts.iter().enumerate() {
        let glyph = if i + 1 == parts.len() { "└─" } else { "├─" };
        println!("  {} {}", glyph.dimmed(), part.display());
    }
    println!(
        "\n{} {} pages -> {} parts in {}",
        "Done!".green().bold(),
        stats.input_pages,
        parts.len(),
        output_dir.display()
    );

    Ok(())
}

fn cmd_merge(
    inputs: &[PathBuf],
    output: &Path,
    strip_metadata: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = pdfdesk::merge_files(inputs, output, !strip_metadata)?;

    println!(
        "{} {} files -> {} ({} pages, {})",
        "Merged".green().bold(),
        inputs.len(),
        output.display(),
        stats.output_pages,
        format_bytes(stats.output_bytes)
    );

    Ok(())
}

fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    level: LevelArg,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derived_name(input, "_compressed"));

    let stats = pdfdesk::compress_file(input, level.into(), &output)?;

    println!("{} {}", "Saved to".green(), output.display());
    println!(
        "  {} -> {} ({})",
        format_bytes(stats.input_bytes),
        format_bytes(stats.output_bytes),
        savings(stats.input_bytes, stats.output_bytes)
    );

    Ok(())
}

fn cmd_delete(
    input: &Path,
    pages: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| derived_name(input, "_trimmed"));

    let stats = pdfdesk::delete_pages(input, pages, &output)?;

    println!("{} {}", "Saved to".green(), output.display());
    println!(
        "  {} pages -> {} pages",
        stats.input_pages, stats.output_pages
    );

    Ok(())
}

fn cmd_run(input: &Path, settings: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = JobSettings::load(settings)?;
    let job = Job::new(input, settings);

    if json {
        let report = job.run()?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (sender, receiver) = crossbeam_channel::unbounded();
    let printer = thread::spawn(move || {
        let mut bar: Option<ProgressBar> = None;
        for event in receiver {
            match event {
                JobEvent::JobStarted { stages, .. } => {
                    let pb = ProgressBar::new(stages.len() as u64);
                    if let Ok(style) = ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
                    {
                        pb.set_style(style.progress_chars("#>-"));
                    }
                    bar = Some(pb);
                }
                JobEvent::StageStarted { stage } => {
                    if let Some(pb) = &bar {
                        pb.set_message(format!("{}...", stage));
                    }
                }
                JobEvent::StageFinished { .. } => {
                    if let Some(pb) = &bar {
                        pb.inc(1);
                    }
                }
                JobEvent::JobFinished { .. } => {
                    if let Some(pb) = &bar {
                        pb.finish_with_message("Done!");
                    }
                }
            }
        }
    });

    let result = job.run_with_events(sender);
    printer.join().ok();
    let report = result?;

    println!("\n{}", "Output files:".green().bold());
    for (i, path) in report.outputs.iter().enumerate() {
        let glyph = if i + 1 == report.outputs.len() {
            "└─"
        } else {
            "├─"
        };
        println!("  {} {}", glyph.dimmed(), path.display());
    }
    println!(
        "\n{} {} -> {} in {} ms",
        "Done!".green().bold(),
        format_bytes(report.input_bytes),
        format_bytes(report.output_bytes),
        report.elapsed_ms
    );

    Ok(())
}

fn cmd_list(path: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(workspace::default_root);
    let entries = workspace::list_folder(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", path.display().to_string().cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for entry in &entries {
        if entry.is_dir {
            println!("  {}/", entry.name.blue().bold());
        } else {
            println!("  {:<36} {}", entry.name, format_bytes(entry.size).dimmed());
        }
    }
    println!("\n{} entries", entries.len());

    Ok(())
}

fn cmd_search(pattern: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let root = path
        .map(Path::to_path_buf)
        .unwrap_or_else(workspace::default_root);
    let found = workspace::search_folder(&root, pattern)?;

    if found.is_empty() {
        println!("{}", "No matches".yellow());
        return Ok(());
    }

    for entry in &found {
        println!(
            "{} {}",
            entry.path.display(),
            format_bytes(entry.size).dimmed()
        );
    }
    println!("\n{} {} file(s)", "Found".green().bold(), found.len());

    Ok(())
}

fn cmd_organize(path: &Path, dry_run: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let moves = workspace::organize_folder(path, dry_run)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&moves)?);
        return Ok(());
    }

    if moves.is_empty() {
        println!("{}", "Nothing to organize".yellow());
        return Ok(());
    }

    let verb = if dry_run { "Would move" } else { "Moved" };
    for m in &moves {
        let target = m
            .to
            .strip_prefix(path)
            .unwrap_or(&m.to)
            .display()
            .to_string();
        println!("{} {} -> {}", verb.green(), m.from.display(), target);
    }
    println!(
        "\n{} {} file(s){}",
        "Done!".green().bold(),
        moves.len(),
        if dry_run { " (dry run)" } else { "" }
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfdesk".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF split, merge, compress, and cleanup tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/pdfdesk/pdfdesk".dimmed()
    );
    println!("License: MIT");
}

fn derived_name(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = format!("{}{}.pdf", stem, suffix);
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn savings(before: u64, after: u64) -> String {
    if before == 0 || after >= before {
        return "no savings".to_string();
    }
    let percent = (before - after) as f64 / before as f64 * 100.0;
    format!("{:.1}% smaller", percent)
}
