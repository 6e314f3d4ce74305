//! Dated CSV artifact writer
//!
//! Each export replaces `<data_dir>/<YYYY-MM-DD>.csv` in full with the given
//! snapshot. The bytes go to a sibling temp file first and are renamed into
//! place, so readers never see a partially written artifact.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tokio::fs;
use tracing::{debug, info};

use crate::domain::record::{EXPORT_COLUMNS, Record};
use crate::infrastructure::scrape_error::ExportError;

pub struct ExportWriter {
    data_dir: PathBuf,
}

impl ExportWriter {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Artifact path for a run date
    pub fn artifact_path(&self, run_date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("{}.csv", run_date.format("%Y-%m-%d")))
    }

    /// Create the output directory if missing. Idempotent.
    pub async fn ensure_output_dir(&self) -> Result<(), ExportError> {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| ExportError::CreateDir {
                path: self.data_dir.clone(),
                source,
            })
    }

    /// Serialize records with a header row, in fixed column order
    pub fn render(records: &[Record]) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(EXPORT_COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Serialize(csv::Error::from(e.into_error())))
    }

    /// Replace the artifact for `run_date` with `records`
    pub async fn export(&self, records: &[Record], run_date: NaiveDate) -> Result<PathBuf, ExportError> {
        self.ensure_output_dir().await?;

        let bytes = Self::render(records)?;
        let path = self.artifact_path(run_date);
        let staging = path.with_extension("csv.tmp");

        if let Err(source) = fs::write(&staging, &bytes).await {
            discard_staging(&staging).await;
            return Err(ExportError::Write { path: staging, source });
        }
        debug!("Staged {} bytes at {:?}", bytes.len(), staging);

        if let Err(source) = fs::rename(&staging, &path).await {
            discard_staging(&staging).await;
            return Err(ExportError::Persist { path, source });
        }

        info!("CSV successfully saved: {:?} ({} record(s))", path, records.len());
        Ok(path)
    }
}

/// Best-effort removal of a staging file left by a failed export
async fn discard_staging(staging: &Path) {
    if let Err(e) = fs::remove_file(staging).await {
        debug!("Could not remove staging file {:?}: {}", staging, e);
    }
}
