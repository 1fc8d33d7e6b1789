use crate::export::row::{to_active_row, to_row};
use crate::storage::open_export_database;
use crate::storage::entity::SurveyRow;
use crate::storage::store::{RecordStore, StoreError};
use chrono::Local;
use log::{error, info, warn};
use sea_orm::{DbErr, EntityTrait, TransactionTrait};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// 单条 INSERT 的行数上限，避开 SQLite 参数个数限制
const INSERT_CHUNK: usize = 50;

/// 导出结果，仅展示给管理员
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    InvalidKey,
    NotReady,
    Failed(String),
    Success { path: PathBuf, rows: usize },
}

impl ExportStatus {
    pub fn message(&self) -> String {
        match self {
            ExportStatus::InvalidKey => "✗ Invalid export key".to_string(),
            ExportStatus::NotReady => "⚠ Export engine not ready yet, try again shortly".to_string(),
            ExportStatus::Failed(reason) => format!("✗ Export failed: {}", reason),
            ExportStatus::Success { path, rows } => {
                format!("✓ Exported {} responses to {}", rows, path.display())
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum ExportError {
    #[error("read records: {0}")]
    Store(#[from] StoreError),
    #[error("write database: {0}")]
    Db(#[from] DbErr),
    #[error("file: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ExportSink {
    store: Arc<dyn RecordStore>,
    dir: PathBuf,
    passphrase: String,
    ready: AtomicBool,
}

impl ExportSink {
    pub fn new(store: Arc<dyn RecordStore>, dir: impl Into<PathBuf>, passphrase: String) -> Self {
        Self {
            store,
            dir: dir.into(),
            passphrase,
            ready: AtomicBool::new(false),
        }
    }

    /// 准备导出目录；失败时保持未就绪，不影响问卷流程
    pub async fn prepare(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        self.ready.store(true, Ordering::SeqCst);
        info!("导出目录就绪: {}", self.dir.display());
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn file_name_for(date: &str) -> String {
        format!("survey_responses_{}.db", date)
    }

    pub async fn export_all(&self, passphrase: &str) -> ExportStatus {
        // 口令错误时不读取任何记录
        if passphrase.trim() != self.passphrase {
            warn!("导出口令错误");
            return ExportStatus::InvalidKey;
        }
        if !self.is_ready() {
            warn!("导出引擎未就绪");
            return ExportStatus::NotReady;
        }

        let date = Local::now().format("%Y-%m-%d").to_string();
        let path = self.dir.join(Self::file_name_for(&date));
        match self.write_file(&path).await {
            Ok(rows) => {
                info!("✓ 导出完成: {} 条 -> {}", rows, path.display());
                ExportStatus::Success { path, rows }
            }
            Err(e) => {
                error!("✗ 导出失败: {}", e);
                ExportStatus::Failed(e.to_string())
            }
        }
    }

    async fn write_file(&self, path: &Path) -> Result<usize, ExportError> {
        // 先写临时文件，成功后再替换，失败不会留下半个文件
        let partial = path.with_extension("db.partial");
        if tokio::fs::try_exists(&partial).await? {
            tokio::fs::remove_file(&partial).await?;
        }

        let result = self.write_partial(&partial, path).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&partial).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("清理临时导出文件失败 {}: {}", partial.display(), e);
                }
            }
        }
        result
    }

    async fn write_partial(&self, partial: &Path, path: &Path) -> Result<usize, ExportError> {
        let records = self.store.list_all().await?;
        let rows: Vec<_> = records.iter().map(to_row).collect();

        let db = open_export_database(partial).await?;
        let txn = db.begin().await?;
        for chunk in rows.chunks(INSERT_CHUNK) {
            SurveyRow::insert_many(chunk.iter().cloned().map(to_active_row))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;
        db.close().await?;

        tokio::fs::rename(partial, path).await?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kiosk::model::NewSurveyResponse;
    use crate::storage::store::testing::MemoryStore;
    use std::collections::{BTreeMap, BTreeSet};

    const KEY: &str = "booth-key";

    fn temp_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "expokiosk-{}-{}-{}",
            tag,
            std::process::id(),
            nanos
        ))
    }

    fn response(sector: &[&str], followup: &str) -> NewSurveyResponse {
        NewSurveyResponse {
            sector: sector.iter().map(|s| s.to_string()).collect(),
            solution: BTreeSet::from(["Other".to_string()]),
            capacity: "Above 50 MW".to_string(),
            challenges: BTreeSet::new(),
            ratings: BTreeMap::new(),
            seeking: "Exploring options for the future".to_string(),
            followup: followup.to_string(),
            name: None,
            company: None,
            contact: None,
        }
    }

    #[tokio::test]
    async fn wrong_key_never_reads_store() {
        let store = Arc::new(MemoryStore::default());
        let sink = ExportSink::new(store.clone(), temp_dir("badkey"), KEY.to_string());
        sink.prepare().await.unwrap();

        assert_eq!(sink.export_all("guess").await, ExportStatus::InvalidKey);
        assert_eq!(sink.export_all("").await, ExportStatus::InvalidKey);
        assert_eq!(store.list_all_calls(), 0);
    }

    #[tokio::test]
    async fn not_ready_until_prepared() {
        let store = Arc::new(MemoryStore::default());
        let sink = ExportSink::new(store.clone(), temp_dir("unready"), KEY.to_string());

        assert_eq!(sink.export_all(KEY).await, ExportStatus::NotReady);
        assert_eq!(store.list_all_calls(), 0);
    }

    #[tokio::test]
    async fn exports_every_record_into_dated_file() {
        let store = Arc::new(MemoryStore::default());
        store.insert(response(&["Mining", "Healthcare"], "No")).await.unwrap();
        store.insert(response(&["Construction"], "No")).await.unwrap();

        let dir = temp_dir("ok");
        let sink = ExportSink::new(store.clone(), &dir, KEY.to_string());
        sink.prepare().await.unwrap();

        let status = sink.export_all(KEY).await;
        let ExportStatus::Success { path, rows } = &status else {
            panic!("unexpected status: {:?}", status);
        };
        assert_eq!(*rows, 2);
        let today = Local::now().format("%Y-%m-%d").to_string();
        assert!(path.ends_with(ExportSink::file_name_for(&today)));
        assert!(path.exists());

        let db = open_export_database(path).await.unwrap();
        let exported = SurveyRow::find().all(&db).await.unwrap();
        assert_eq!(exported.len(), 2);
        assert!(exported.iter().any(|r| r.sector == "Healthcare; Mining"));
        db.close().await.unwrap();

        // 导出不会删除记录
        assert_eq!(store.list_all().await.unwrap().len(), 2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn failed_export_leaves_no_partial_file() {
        let store = Arc::new(MemoryStore::default());
        store.insert(response(&["Mining"], "No")).await.unwrap();

        let dir = temp_dir("blocked");
        let sink = ExportSink::new(store.clone(), &dir, KEY.to_string());
        sink.prepare().await.unwrap();

        // 目标位置被非空目录占用，最后的 rename 会失败
        let today = Local::now().format("%Y-%m-%d").to_string();
        let target = dir.join(ExportSink::file_name_for(&today));
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        assert!(matches!(sink.export_all(KEY).await, ExportStatus::Failed(_)));
        assert!(!target.with_extension("db.partial").exists());
        assert!(target.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let store = Arc::new(MemoryStore::default());
        store.insert(response(&["Mining"], "No")).await.unwrap();

        let dir = temp_dir("gone");
        let sink = ExportSink::new(store.clone(), &dir, KEY.to_string());
        sink.prepare().await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(sink.export_all(KEY).await, ExportStatus::Failed(_)));
    }
}
