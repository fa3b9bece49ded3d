use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AnalysisResult, BatchResult};

/// Write-only persistence for finished analyses.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn store(&self, result: &AnalysisResult) -> Result<()>;

    /// Stores every successful entry and returns how many were written.
    async fn store_batch(&self, batch: &BatchResult) -> Result<usize> {
        let mut stored = 0;
        for entry in &batch.entries {
            if let Ok(result) = &entry.outcome {
                self.store(result).await?;
                stored += 1;
            }
        }
        Ok(stored)
    }
}

/// Writes each result as `<analysisId>.json` under one directory.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, analysis_id: &str) -> PathBuf {
        self.dir.join(format!("{analysis_id}.json"))
    }
}

#[async_trait]
impl ResultSink for JsonDirSink {
    async fn store(&self, result: &AnalysisResult) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&result.analysis_id);
        let json = serde_json::to_vec_pretty(result)?;
        tokio::fs::write(&path, json).await?;
        tracing::debug!(path = %path.display(), "Stored analysis result");
        Ok(())
    }
}
