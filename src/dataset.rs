//! Uploaded training dataset
//!
//! A single CSV file at a fixed path. Uploads replace it wholesale, the
//! distribution endpoint reads one column of it split by the target class.

use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::charts;

/// Built-in sample used when the dashboard runs without a dataset
pub const SYNTHETIC_ACCEPTED: [f64; 12] = [
    0.62, 0.71, 0.55, 0.68, 0.74, 0.59, 0.66, 0.80, 0.57, 0.69, 0.73, 0.64,
];
pub const SYNTHETIC_REJECTED: [f64; 12] = [
    0.31, 0.42, 0.28, 0.47, 0.36, 0.22, 0.39, 0.45, 0.33, 0.26, 0.41, 0.50,
];

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("No dataset uploaded: '{0}' does not exist, upload a CSV file first")]
    MissingFile(PathBuf),

    #[error("Variable '{0}' not found in the dataset")]
    MissingColumn(String),

    #[error("Target column '{0}' not found in the dataset")]
    MissingTarget(String),

    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl DatasetError {
    /// Problems the caller can fix by uploading a different file
    pub fn is_missing_resource(&self) -> bool {
        matches!(
            self,
            Self::MissingFile(_) | Self::MissingColumn(_) | Self::MissingTarget(_)
        )
    }
}

/// Values of one variable partitioned by target class (0 = accepted, 1 = rejected)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassSplit {
    pub accepted: Vec<f64>,
    pub rejected: Vec<f64>,
}

impl ClassSplit {
    pub fn synthetic() -> Self {
        Self {
            accepted: SYNTHETIC_ACCEPTED.to_vec(),
            rejected: SYNTHETIC_REJECTED.to_vec(),
        }
    }

    pub fn render(&self) -> Result<Vec<u8>, charts::ChartError> {
        charts::density_comparison(&self.accepted, &self.rejected)
    }
}

/// Read `variable` from the CSV at `path`, split by `target`.
///
/// Rows whose variable or target cell is empty or not a number are skipped,
/// as are target values other than 0 and 1.
pub fn load_split(path: &Path, variable: &str, target: &str) -> Result<ClassSplit, DatasetError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DatasetError::MissingFile(path.to_path_buf()),
        _ => DatasetError::Io(e),
    })?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr.headers()?.clone();
    let var_idx = headers
        .iter()
        .position(|h| h == variable)
        .ok_or_else(|| DatasetError::MissingColumn(variable.to_string()))?;
    let target_idx = headers
        .iter()
        .position(|h| h == target)
        .ok_or_else(|| DatasetError::MissingTarget(target.to_string()))?;

    let mut split = ClassSplit::default();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let record = result?;
        let value = record.get(var_idx).and_then(parse_number);
        let class = record.get(target_idx).and_then(parse_number);

        match (value, class) {
            (Some(v), Some(c)) if c == 0.0 => split.accepted.push(v),
            (Some(v), Some(c)) if c == 1.0 => split.rejected.push(v),
            _ => skipped += 1,
        }
    }

    tracing::debug!(
        "Dataset split for '{}': {} accepted, {} rejected, {} rows skipped",
        variable, split.accepted.len(), split.rejected.len(), skipped
    );

    Ok(split)
}

/// Replace the dataset with `contents`.
///
/// Each call writes its own temp file next to the target and persists it over
/// the target, so a concurrent reader sees either the old file or a complete
/// new one, and overlapping uploads never share a temp file.
pub async fn replace<B>(path: &Path, contents: B) -> std::io::Result<()>
where
    B: AsRef<[u8]> + Send + 'static,
{
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(contents.as_ref())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)?;
        Ok(())
    })
    .await?
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
