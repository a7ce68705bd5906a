//! Per-AOI summary of a recorded session

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use gaze_aoi_core::recorder::LOG_FILE_NAME;
use gaze_aoi_core::{latest_session_dir, read_session_log, AttentionRow, Timestamp};

/// Rows and samples recorded for one `(surface, AOI)` pair
#[derive(Debug, Clone, PartialEq)]
pub struct AoiSummary {
    pub surface: String,
    pub aoi: String,
    pub rows: usize,
    pub samples: usize,
    pub first: Option<Timestamp>,
    pub last: Option<Timestamp>,
}

pub fn summarize(rows: &[AttentionRow]) -> Vec<AoiSummary> {
    let mut by_aoi: BTreeMap<(&str, &str), AoiSummary> = BTreeMap::new();

    for row in rows {
        let entry = by_aoi
            .entry((row.surface.as_str(), row.aoi.as_str()))
            .or_insert_with(|| AoiSummary {
                surface: row.surface.clone(),
                aoi: row.aoi.clone(),
                rows: 0,
                samples: 0,
                first: None,
                last: None,
            });
        entry.rows += 1;
        entry.samples += row.timestamps.len();
        for &ts in &row.timestamps {
            entry.first = Some(entry.first.map_or(ts, |first| first.min(ts)));
            entry.last = Some(entry.last.map_or(ts, |last| last.max(ts)));
        }
    }

    by_aoi.into_values().collect()
}

/// Plain-text table, one line per AOI
pub fn render(summaries: &[AoiSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<40} {:>6} {:>8} {:>12} {:>12}",
        "SURFACE", "AOI", "ROWS", "SAMPLES", "FIRST", "LAST"
    );
    for s in summaries {
        let aoi = if s.aoi.is_empty() { "<nothing>" } else { &s.aoi };
        let _ = writeln!(
            out,
            "{:<12} {:<40} {:>6} {:>8} {:>12} {:>12}",
            s.surface,
            aoi,
            s.rows,
            s.samples,
            s.first.map(|t| format!("{:.3}", t)).unwrap_or_default(),
            s.last.map(|t| format!("{:.3}", t)).unwrap_or_default(),
        );
    }
    out
}

/// Resolve the log to summarize.
///
/// `session` may name the CSV itself or its session directory; without it
/// the latest session of `today` under `root` is used.
pub fn session_log_path(session: Option<&Path>, root: &Path, today: NaiveDate) -> Result<PathBuf> {
    let path = match session {
        Some(path) if path.is_dir() => path.join(LOG_FILE_NAME),
        Some(path) => path.to_path_buf(),
        None => latest_session_dir(root, today)
            .ok_or_else(|| anyhow!("No session recorded on {} under {}", today, root.display()))?
            .join(LOG_FILE_NAME),
    };
    Ok(path)
}

pub fn summarize_file(path: &Path) -> Result<Vec<AoiSummary>> {
    let rows = read_session_log(path)
        .with_context(|| format!("Failed to read session log {}", path.display()))?;
    Ok(summarize(&rows))
}
