//! File-level conversion: reading, rewriting, atomic writes and parallel runs over directory trees.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ConvertOptions;
use crate::errors::ConvertError;
use crate::ir::transforms::RecipeBook;
use crate::ir::visitor::{AssertRewriter, Rewrite};

/// Outcome of converting one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    /// Text as read from disk.
    pub original: String,
    pub rewrite: Rewrite,
    /// Whether the converted text was written back.
    pub written: bool,
}

impl FileReport {
    pub fn changed(&self) -> bool {
        self.rewrite.changed()
    }
}

/// Aggregate of a run over many files.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
    pub failures: Vec<(PathBuf, ConvertError)>,
    /// Files never started because the run was cancelled.
    pub cancelled: usize,
}

impl RunSummary {
    pub fn converted_files(&self) -> usize {
        self.reports.iter().filter(|report| report.changed()).count()
    }

    pub fn unchanged_files(&self) -> usize {
        self.reports.len() - self.converted_files()
    }

    pub fn failed_files(&self) -> usize {
        self.failures.len()
    }

    pub fn converted_sites(&self) -> usize {
        self.reports.iter().map(|report| report.rewrite.converted).sum()
    }

    pub fn skipped_sites(&self) -> usize {
        self.reports.iter().map(|report| report.rewrite.skipped.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Converts a single file.
///
/// # Arguments
/// * `path` - The Python file
/// * `write` - Replace the file with the converted text when something changed
/// * `options` - Conversion options; `options.write` is ignored in favour of `write`
///
/// # Returns
/// The report for the file. On error the file on disk is untouched.
pub fn convert_file(path: &Path, write: bool, options: &ConvertOptions) -> Result<FileReport, ConvertError> {
    let book = RecipeBook::standard()?;
    convert_file_with(book, path, write, options, &write_atomically)
}

/// Replaces a file's content with converted text.
type WriteFn = dyn Fn(&Path, &str) -> io::Result<()> + Sync;

fn convert_file_with(
    book: &RecipeBook,
    path: &Path,
    write: bool,
    options: &ConvertOptions,
    write_file: &WriteFn,
) -> Result<FileReport, ConvertError> {
    let original = fs::read_to_string(path)
        .map_err(|source| ConvertError::Read { path: path.to_path_buf(), source })?;
    let rewrite = AssertRewriter::new(book, options.places).rewrite_source(&original)?;

    for skipped in &rewrite.skipped {
        warn!("{}:{}: {} left unconverted ({})", path.display(), skipped.line, skipped.name, skipped.reason);
    }

    let written = write && rewrite.changed();
    if written {
        write_file(path, &rewrite.text)
            .map_err(|source| ConvertError::Write { path: path.to_path_buf(), source })?;
    }
    if rewrite.changed() {
        info!(
            "{} {} assertion(s) in {}",
            if written { "Converted" } else { "Would convert" },
            rewrite.converted,
            path.display()
        );
    } else {
        debug!("No changes in {}", path.display());
    }
    Ok(FileReport { path: path.to_path_buf(), original, rewrite, written })
}

/// Writes `text` to a temporary file next to `path`, then renames it over `path`.
///
/// The original permissions are carried over; the original file is intact until the rename.
fn write_atomically(path: &Path, text: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Expands `paths` into the list of files to convert.
///
/// Directories are walked recursively for files with one of `extensions`; files named explicitly are
/// taken as they are. A path that does not exist is an error.
pub fn collect_files(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>, ConvertError> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = fs::metadata(path)
            .map_err(|source| ConvertError::Read { path: path.clone(), source })?;
        if !metadata.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|result| result.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
            })
            .map(|entry| entry.path().to_path_buf())
            .collect();
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Converts every file under `paths` in parallel.
///
/// # Arguments
/// * `paths` - Files and directories
/// * `options` - Conversion options, including whether to write and how many workers to use
/// * `cancel` - Once set, no further file is started; files in progress complete
///
/// # Returns
/// The run summary, or an error if a path is missing or the worker pool cannot be built. Per-file
/// failures are collected in the summary and never stop the run.
pub fn convert_paths(
    paths: &[PathBuf],
    options: &ConvertOptions,
    cancel: &AtomicBool,
) -> Result<RunSummary, ConvertError> {
    convert_paths_with(paths, options, cancel, &write_atomically)
}

fn convert_paths_with(
    paths: &[PathBuf],
    options: &ConvertOptions,
    cancel: &AtomicBool,
    write_file: &WriteFn,
) -> Result<RunSummary, ConvertError> {
    let start = Instant::now();
    let book = RecipeBook::standard()?;
    let files = collect_files(paths, &options.extensions)?;
    info!("Found {} file(s) to convert", files.len());

    let run = || -> Vec<Option<(PathBuf, Result<FileReport, ConvertError>)>> {
        files
            .par_iter()
            .map(|path| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                Some((path.clone(), convert_file_with(book, path, options.write, options, write_file)))
            })
            .collect()
    };
    let results = match options.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?.install(run),
        None => run(),
    };

    let mut summary = RunSummary::default();
    for result in results {
        match result {
            None => summary.cancelled += 1,
            Some((_, Ok(report))) => summary.reports.push(report),
            Some((path, Err(err))) => {
                warn!("Failed to convert {}: {}", path.display(), err);
                summary.failures.push((path, err));
            }
        }
    }

    info!(
        "Converted {} assertion(s) in {} file(s), {} unchanged, {} failed, {} call(s) left, in {:?}",
        summary.converted_sites(),
        summary.converted_files(),
        summary.unchanged_files(),
        summary.failed_files(),
        summary.skipped_sites(),
        start.elapsed()
    );
    Ok(summary)
}
