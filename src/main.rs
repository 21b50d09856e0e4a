//! mrs - command-line tool for MRS game archives.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use mrs_archive::{MrsArchive, MrsNode};

/// MRS game archive extraction tool
#[derive(Parser)]
#[command(name = "mrs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Extract an archive into ./<stem>
    #[arg(short = 'e', value_name = "ARCHIVE")]
    extract: Option<PathBuf>,

    /// Extract one directory: -d <archive> <dir>
    #[arg(short = 'd', num_args = 2, value_names = ["ARCHIVE", "DIR"])]
    dir: Option<Vec<String>>,

    /// Extract one file: -f <archive> <file> [dest]
    #[arg(short = 'f', num_args = 2..=3, value_names = ["ARCHIVE", "FILE", "DEST"])]
    file: Option<Vec<String>>,

    /// Print the archive's tree
    #[arg(short = 't', value_name = "ARCHIVE")]
    tree: Option<PathBuf>,

    /// Extract every archive under a directory (defaults to .)
    #[arg(short = 'a', value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    all: Option<PathBuf>,

    /// Archive extension matched by -a
    #[arg(long, value_name = "EXT", default_value = ".mrs")]
    ext: String,

    /// Fall back to recovery scanning when strict open fails
    #[arg(long)]
    force: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(archive) = cli.extract {
        return cmd_extract(&archive, cli.force);
    }
    if let Some(args) = cli.dir {
        return cmd_extract_dir(Path::new(&args[0]), &args[1], cli.force);
    }
    if let Some(args) = cli.file {
        return cmd_extract_file(Path::new(&args[0]), &args[1], args.get(2), cli.force);
    }
    if let Some(archive) = cli.tree {
        return cmd_tree(&archive, cli.force);
    }
    if let Some(dir) = cli.all {
        return cmd_extract_all(&dir, &cli.ext, cli.force);
    }

    Err(anyhow!("no action specified (use -e, -d, -f, -t or -a)"))
}

fn open_archive(path: &Path, force: bool) -> Result<MrsArchive> {
    match MrsArchive::open(path) {
        Ok(archive) => Ok(archive),
        Err(err) if force => {
            eprintln!(
                "{}: strict open failed ({err}), scanning for recoverable data",
                path.display()
            );
            MrsArchive::open_forced(path)
                .with_context(|| format!("recovery failed for {}", path.display()))
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to open archive {}", path.display()))
        }
    }
}

/// Destination directory for an archive extracted in place.
fn output_dir(archive: &Path) -> PathBuf {
    match archive.file_stem() {
        Some(stem) if !stem.is_empty() => PathBuf::from(stem),
        _ => PathBuf::from("archive"),
    }
}

fn extraction_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn report(archive: &Path, summary: &mrs_archive::ExtractSummary, dest: &Path) {
    println!(
        "{}: {} extracted, {} skipped, {} failed -> {}",
        archive.display(),
        summary.written,
        summary.skipped,
        summary.failed.len(),
        dest.display()
    );
    for (name, err) in &summary.failed {
        eprintln!("  {name}: {err}");
    }
}

fn cmd_extract(archive_path: &Path, force: bool) -> Result<()> {
    let archive = open_archive(archive_path, force)?;
    println!(
        "Opened {} ({}, {} entries)",
        archive_path.display(),
        archive.variant(),
        archive.entry_count()
    );

    let dest = output_dir(archive_path);
    let pb = extraction_bar(archive.entry_count())?;
    let start = Instant::now();
    let summary = archive.extract_dir_with("", &dest, |_| pb.inc(1))?;
    pb.finish_and_clear();

    report(archive_path, &summary, &dest);
    println!("Extraction completed in {:?}", start.elapsed());
    Ok(())
}

fn cmd_extract_dir(archive_path: &Path, dir: &str, force: bool) -> Result<()> {
    let archive = open_archive(archive_path, force)?;
    let dest = output_dir(archive_path);

    let summary = archive
        .extract_dir(dir, &dest)
        .with_context(|| format!("no directory {dir:?} in {}", archive_path.display()))?;
    report(archive_path, &summary, &dest);
    Ok(())
}

fn cmd_extract_file(
    archive_path: &Path,
    name: &str,
    dest: Option<&String>,
    force: bool,
) -> Result<()> {
    let archive = open_archive(archive_path, force)?;
    let dest = dest.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let written = archive
        .extract_file(name, &dest)
        .with_context(|| format!("failed to extract {name}"))?;
    if written {
        println!("{name} -> {}", dest.display());
    } else {
        println!("{name}: destination already exists, skipped");
    }
    Ok(())
}

fn cmd_tree(archive_path: &Path, force: bool) -> Result<()> {
    let archive = open_archive(archive_path, force)?;
    println!("{} ({})", archive_path.display(), archive.variant());

    let mut children: Vec<_> = archive.root().children().collect();
    children.sort_by(|a, b| a.0.cmp(b.0));
    for (name, node) in children {
        print_node(name, node, 1);
    }

    println!("\nTotal: {} entries", archive.entry_count());
    Ok(())
}

fn print_node(name: &str, node: &MrsNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node.entry() {
        Some(entry) => println!(
            "{indent}{name} ({} bytes, {})",
            entry.uncompressed_size, entry.last_modified
        ),
        None => println!("{indent}{name}/"),
    }

    let mut children: Vec<_> = node.children().collect();
    children.sort_by(|a, b| a.0.cmp(b.0));
    for (child_name, child) in children {
        print_node(child_name, child, depth + 1);
    }
}

fn cmd_extract_all(dir: &Path, ext: &str, force: bool) -> Result<()> {
    let suffix = if ext.starts_with('.') {
        ext.to_lowercase()
    } else {
        format!(".{}", ext.to_lowercase())
    };

    let archives: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| name.to_lowercase().ends_with(&suffix))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    if archives.is_empty() {
        println!("No {suffix} archives found under {}", dir.display());
        return Ok(());
    }

    println!("Extracting {} archives...", archives.len());
    let start = Instant::now();
    let mut errors = 0;
    for path in &archives {
        match open_archive(path, force).and_then(|archive| {
            archive
                .extract_archive()
                .with_context(|| format!("extraction failed for {}", path.display()))
        }) {
            Ok(summary) => {
                let dest = path.with_extension("");
                report(path, &summary, &dest);
            }
            Err(err) => {
                eprintln!("{}: {err:#}", path.display());
                errors += 1;
            }
        }
    }

    println!(
        "Processed {} archives in {:?} ({errors} errors)",
        archives.len(),
        start.elapsed()
    );
    Ok(())
}
