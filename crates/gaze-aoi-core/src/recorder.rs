//! Session recording of attention rows
//!
//! Layout on disk:
//!
//! ```text
//! <root>/<YYYY_MM_DD>/<NNN>/aoi_labels.csv
//! ```
//!
//! `NNN` is a zero-padded index, one higher than the largest existing session
//! of that date. The log starts with the header `Surface,AOI,Timestamps`;
//! each row holds the surface, the AOI (empty when looking at nothing) and one
//! or more timestamps. Fields are never quoted, so commas and line breaks in
//! surface or AOI names are replaced with `;`.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use csv::{QuoteStyle, ReaderBuilder, Terminator, Writer, WriterBuilder};
use tracing::{debug, info};

use crate::error::{GazeError, Result};
use crate::types::{AttentionRow, Timestamp};

pub const LOG_FILE_NAME: &str = "aoi_labels.csv";
pub const LOG_HEADER: [&str; 3] = ["Surface", "AOI", "Timestamps"];
const DATE_DIR_FORMAT: &str = "%Y_%m_%d";

/// Name of the per-date directory, e.g. `2024_03_09`
pub fn date_dir_name(date: NaiveDate) -> String {
    date.format(DATE_DIR_FORMAT).to_string()
}

/// Index of every `NNN` session directory under `date_dir`, unsorted
fn session_indices(date_dir: &Path) -> io::Result<Vec<u32>> {
    let mut indices = Vec::new();
    for entry in fs::read_dir(date_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = name.parse::<u32>() {
                indices.push(index);
            }
        }
    }
    Ok(indices)
}

/// Create `<root>/<date>/<next index>/` and return its path.
pub fn create_session_dir(root: &Path, date: NaiveDate) -> Result<PathBuf> {
    let date_dir = root.join(date_dir_name(date));
    fs::create_dir_all(&date_dir).map_err(|source| GazeError::DirectoryCreation {
        path: date_dir.clone(),
        source,
    })?;

    let indices = session_indices(&date_dir).map_err(|source| GazeError::DirectoryCreation {
        path: date_dir.clone(),
        source,
    })?;
    let mut index = indices.iter().max().map(|max| max + 1).unwrap_or(0);

    // Another process may claim the same index between scan and create
    loop {
        let session_dir = date_dir.join(format!("{:03}", index));
        match fs::create_dir(&session_dir) {
            Ok(()) => return Ok(session_dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => index += 1,
            Err(source) => {
                return Err(GazeError::DirectoryCreation {
                    path: session_dir,
                    source,
                })
            }
        }
    }
}

/// Highest-index session directory of `date`, if any exists.
pub fn latest_session_dir(root: &Path, date: NaiveDate) -> Option<PathBuf> {
    let date_dir = root.join(date_dir_name(date));
    let latest = session_indices(&date_dir).ok()?.into_iter().max()?;
    Some(date_dir.join(format!("{:03}", latest)))
}

fn sanitize(field: &str) -> String {
    field.replace([',', '\n', '\r'], ";")
}

fn format_timestamp(ts: Timestamp) -> String {
    format!("{:?}", ts)
}

/// Append-only writer for one session's `aoi_labels.csv`.
pub struct SessionRecorder {
    dir: PathBuf,
    path: PathBuf,
    writer: Writer<Box<dyn Write + Send>>,
    rows_written: usize,
}

impl std::fmt::Debug for SessionRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecorder")
            .field("path", &self.path)
            .field("rows_written", &self.rows_written)
            .finish()
    }
}

impl SessionRecorder {
    /// Start a new session for today under `root`.
    pub fn start(root: &Path) -> Result<Self> {
        Self::start_on(root, Local::now().date_naive())
    }

    /// Start a new session for `date` under `root`.
    pub fn start_on(root: &Path, date: NaiveDate) -> Result<Self> {
        let dir = create_session_dir(root, date)?;
        let recorder = Self::open(&dir)?;
        info!("Recording session to {}", recorder.path.display());
        Ok(recorder)
    }

    /// Create (or truncate) the log inside `dir` and write the header.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(LOG_FILE_NAME);
        let file = File::create(&path).map_err(|e| GazeError::io(&path, e))?;
        Self::with_sink(dir, path, Box::new(file))
    }

    /// Write the header to `sink`; `path` is only used in messages.
    pub(crate) fn with_sink(dir: &Path, path: PathBuf, sink: Box<dyn Write + Send>) -> Result<Self> {
        let writer = WriterBuilder::new()
            .flexible(true)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(sink);

        let mut recorder = Self {
            dir: dir.to_path_buf(),
            path,
            writer,
            rows_written: 0,
        };
        recorder.write_fields(LOG_HEADER.iter().map(|s| s.to_string()))?;
        Ok(recorder)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Append one row and flush it to disk.
    pub fn record(&mut self, row: &AttentionRow) -> Result<()> {
        let fields = [sanitize(&row.surface), sanitize(&row.aoi)]
            .into_iter()
            .chain(row.timestamps.iter().copied().map(format_timestamp));
        self.write_fields(fields)?;
        self.rows_written += 1;
        debug!(
            "Recorded row {} ({}, '{}', {} timestamps)",
            self.rows_written,
            row.surface,
            row.aoi,
            row.timestamps.len()
        );
        Ok(())
    }

    fn write_fields(&mut self, fields: impl Iterator<Item = String>) -> Result<()> {
        let path = &self.path;
        self.writer
            .write_record(fields)
            .map_err(|e| GazeError::io(path, e.into()))?;
        self.writer.flush().map_err(|e| GazeError::io(path, e))
    }

    /// Flush and close the log.
    pub fn close(mut self) -> Result<()> {
        self.writer.flush().map_err(|e| GazeError::io(&self.path, e))?;
        info!(
            "Closed session log {} ({} rows)",
            self.path.display(),
            self.rows_written
        );
        Ok(())
    }
}

/// Parse a session log back into rows.
pub fn read_session_log(path: &Path) -> Result<Vec<AttentionRow>> {
    let file = File::open(path).map_err(|e| GazeError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let malformed = |reason: String| GazeError::MalformedLog {
        path: path.to_path_buf(),
        reason,
    };

    let headers = reader.headers().map_err(|e| malformed(e.to_string()))?;
    if headers.iter().ne(LOG_HEADER.iter().copied()) {
        return Err(malformed(format!("unexpected header {:?}", headers)));
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(e.to_string()))?;
        if record.len() < 3 {
            return Err(malformed(format!(
                "row {} has {} fields, expected at least 3",
                line + 1,
                record.len()
            )));
        }

        let timestamps = record
            .iter()
            .skip(2)
            .map(|field| {
                field.parse::<f64>().map_err(|_| {
                    malformed(format!("row {}: '{}' is not a timestamp", line + 1, field))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        rows.push(AttentionRow {
            surface: record[0].to_string(),
            aoi: record[1].to_string(),
            timestamps,
        });
    }
    Ok(rows)
}
