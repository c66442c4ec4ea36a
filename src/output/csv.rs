//! CSV export writers
//!
//! Fields are quoted only when they contain a comma, quote or line break;
//! embedded quotes are doubled. Every line ends with `\n`.

use crate::metrics::record_combined_file;
use crate::ExportEntry;
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::path::ExportPaths;
use super::{EntriesWriter, ExportFormat, OutputError, OutputResult, OutputWriter};

const DEFAULT_BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Flush every N entries
const FLUSH_INTERVAL: u64 = 1_000;

/// CSV writer for export entries in one format
pub struct CsvEntriesWriter {
    writer: Writer<BufWriter<File>>,
    format: ExportFormat,
    path: PathBuf,
    entries_written: u64,
}

impl CsvEntriesWriter {
    /// Create a writer and emit the format's header, if any
    ///
    /// # Arguments
    /// * `path` - Output file path; parent directories are created
    /// * `format` - Row layout
    pub fn new<P: AsRef<Path>>(path: P, format: ExportFormat) -> OutputResult<Self> {
        let path = path.as_ref();
        debug!("Creating CSV writer: path={} format={}", path.display(), format);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    OutputError::IoError(format!("Failed to create directory: {e}"))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            OutputError::IoError(format!("Failed to create file {}: {e}", path.display()))
        })?;

        let buf_writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(buf_writer);

        if let Some(header) = format.header() {
            writer
                .write_record(header)
                .map_err(|e| OutputError::CsvError(format!("Failed to write header: {e}")))?;
        }

        Ok(Self {
            writer,
            format,
            path: path.to_path_buf(),
            entries_written: 0,
        })
    }

    /// Number of entries written so far
    pub fn entries_written(&self) -> u64 {
        self.entries_written
    }
}

impl EntriesWriter for CsvEntriesWriter {
    fn write_entry(&mut self, entry: &ExportEntry) -> OutputResult<()> {
        self.writer
            .write_record(self.format.row(entry))
            .map_err(|e| OutputError::CsvError(format!("Failed to write entry: {e}")))?;

        self.entries_written += 1;

        if self.entries_written % FLUSH_INTERVAL == 0 {
            self.flush()?;
        }

        Ok(())
    }
}

impl OutputWriter for CsvEntriesWriter {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
    }

    fn close(mut self) -> OutputResult<()> {
        self.flush()?;

        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {e}")))?;

        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {e}")))?;

        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("Failed to sync file: {e}")))?;

        debug!(
            "CSV writer closed: {} ({} entries)",
            self.path.display(),
            self.entries_written
        );
        Ok(())
    }
}

/// Write one set's entries to `{CODE}_prices.csv`
///
/// Zero-out is not a per-set layout; it is written as item-wizard rows.
pub fn write_set_file(
    paths: &ExportPaths,
    display_code: &str,
    entries: &[ExportEntry],
    format: ExportFormat,
) -> OutputResult<PathBuf> {
    paths.ensure_root()?;
    let path = paths.set_file(display_code);

    let mut writer = CsvEntriesWriter::new(&path, format.per_set_layout())?;
    writer.write_entries(entries)?;
    writer.close()?;

    info!(
        "Exported {} entries to {}",
        entries.len(),
        path.display()
    );
    Ok(path)
}

/// One combined file and how many entries it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedFile {
    /// File path
    pub path: PathBuf,
    /// Entries in this batch
    pub entries: usize,
}

/// Writes aggregated entries into consecutive fixed-size batch files
#[derive(Debug, Clone)]
pub struct CombinedFileWriter {
    paths: ExportPaths,
}

impl CombinedFileWriter {
    /// Writer targeting `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: ExportPaths::new(root),
        }
    }

    /// Writer sharing existing export paths
    pub fn with_paths(paths: ExportPaths) -> Self {
        Self { paths }
    }

    /// Write `entries` in batches of at most `split_threshold`
    ///
    /// Returns the created paths in batch order.
    ///
    /// # Errors
    /// [`OutputError::InvalidSplitThreshold`] for a zero threshold; I/O errors
    /// from the first batch that fails. Batches written before the failure
    /// are removed.
    pub fn write(
        &self,
        entries: &[ExportEntry],
        format: ExportFormat,
        split_threshold: usize,
    ) -> OutputResult<Vec<PathBuf>> {
        Ok(self
            .write_batches(entries, format, split_threshold)?
            .into_iter()
            .map(|f| f.path)
            .collect())
    }

    /// Like [`write`](Self::write), also reporting each batch size
    pub fn write_batches(
        &self,
        entries: &[ExportEntry],
        format: ExportFormat,
        split_threshold: usize,
    ) -> OutputResult<Vec<CombinedFile>> {
        if split_threshold == 0 {
            return Err(OutputError::InvalidSplitThreshold(split_threshold));
        }

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        self.paths.ensure_root()?;

        let mut files: Vec<CombinedFile> = Vec::with_capacity(entries.len().div_ceil(split_threshold));
        for (index, batch) in entries.chunks(split_threshold).enumerate() {
            let path = self.paths.combined_file(index);

            if let Err(e) = write_batch(&path, batch, format) {
                let mut partial: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
                partial.push(path);
                return Err(discard_partial(&partial, e));
            }

            record_combined_file(batch.len());
            info!(
                "Created combined file: {} ({} entries)",
                path.display(),
                batch.len()
            );

            files.push(CombinedFile {
                path,
                entries: batch.len(),
            });
        }

        Ok(files)
    }
}

fn write_batch(path: &Path, batch: &[ExportEntry], format: ExportFormat) -> OutputResult<()> {
    let mut writer = CsvEntriesWriter::new(path, format)?;
    writer.write_entries(batch)?;
    writer.close()
}

/// Remove batch files from a failed combined run
///
/// Files that cannot be removed are named in the returned error.
fn discard_partial(paths: &[PathBuf], error: OutputError) -> OutputError {
    let mut leftover = Vec::new();
    for path in paths.iter().filter(|p| p.is_file()) {
        match std::fs::remove_file(path) {
            Ok(()) => warn!("Removed partial combined file: {}", path.display()),
            Err(e) => {
                warn!("Failed to remove {}: {}", path.display(), e);
                leftover.push(path.display().to_string());
            }
        }
    }

    if leftover.is_empty() {
        error
    } else {
        OutputError::IoError(format!(
            "{error}; partial combined files left on disk: {}",
            leftover.join(", ")
        ))
    }
}
