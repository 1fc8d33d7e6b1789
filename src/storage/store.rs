use crate::kiosk::model::{NewSurveyResponse, StoredResponse};
use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// 本地问卷记录存储：只追加，不提供更新与删除
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 分配 id 与 timestamp 后持久化；失败必须返回给调用方
    async fn insert(&self, response: NewSurveyResponse) -> Result<StoredResponse, StoreError>;
    /// 返回全部记录，不保证顺序
    async fn list_all(&self) -> Result<Vec<StoredResponse>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
}
