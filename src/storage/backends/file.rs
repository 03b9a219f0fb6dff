//! File-based plan storage
//!
//! Each plan is one pretty-printed JSON document at
//! `<base_dir>/pacemakers/<id>.json`. Writes go to a sibling temp file which
//! is then renamed over the target, so a reader never sees a partial plan.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::plan::Pacemaker;
use crate::storage::{
    error::{StorageError, StorageResult},
    traits::PlanStore,
};

const PLAN_DIR: &str = "pacemakers";

#[derive(Debug, Clone)]
pub struct FileBackend {
    base_dir: PathBuf,
}

impl FileBackend {
    pub async fn new(base_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(base_dir.join(PLAN_DIR)).await?;
        debug!("File storage rooted at {}", base_dir.display());
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn plan_path(&self, id: &str) -> StorageResult<PathBuf> {
        // ids become file names
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StorageError::configuration(format!(
                "'{}' cannot be used as a plan id",
                id
            )));
        }
        Ok(self.base_dir.join(PLAN_DIR).join(format!("{}.json", id)))
    }

    async fn read_plan(path: &Path) -> StorageResult<Pacemaker> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_atomic(path: &Path, content: &str) -> StorageResult<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content).await?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl PlanStore for FileBackend {
    async fn save(&self, plan: &Pacemaker) -> StorageResult<()> {
        let path = self.plan_path(&plan.id)?;
        let content = serde_json::to_string_pretty(plan)?;
        Self::write_atomic(&path, &content).await?;
        debug!("Wrote pacemaker {} to {}", plan.id, path.display());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Pacemaker>> {
        let path = self.plan_path(id)?;
        match Self::read_plan(&path).await {
            Ok(plan) => Ok(Some(plan)),
            Err(StorageError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete_by_running_ids(&self, running_ids: &[String]) -> StorageResult<usize> {
        let mut entries = fs::read_dir(self.base_dir.join(PLAN_DIR)).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let plan = match Self::read_plan(&path).await {
                Ok(plan) => plan,
                Err(e) => {
                    warn!("Skipping unreadable plan file {}: {}", path.display(), e);
                    continue;
                }
            };

            let attached = plan
                .running_id
                .as_ref()
                .is_some_and(|running_id| running_ids.contains(running_id));
            if attached {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        debug!("Removed {} plan files for {} runs", removed, running_ids.len());
        Ok(removed)
    }
}
