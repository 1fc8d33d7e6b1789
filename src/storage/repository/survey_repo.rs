use crate::kiosk::model::{NewSurveyResponse, StoredResponse};
use crate::storage::entity::survey_response::{
    self, ActiveModel as SurveyResponseActiveModel, Entity as SurveyResponse,
    Model as SurveyResponseModel,
};
use crate::storage::store::{RecordStore, StoreError};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use log::warn;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// 列内 JSON 损坏时记录告警并回退为空值
fn decode_column<T>(id: i32, column: &str, raw: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("记录 {} 的 {} 列无法解析 ({}): {:?}", id, column, e, raw);
            T::default()
        }
    }
}

impl From<SurveyResponseModel> for StoredResponse {
    fn from(model: SurveyResponseModel) -> Self {
        let id = model.id;
        Self {
            id,
            timestamp: model.timestamp,
            response: NewSurveyResponse {
                sector: decode_column(id, "sector_json", &model.sector_json),
                solution: decode_column(id, "solution_json", &model.solution_json),
                capacity: model.capacity,
                challenges: decode_column(id, "challenges_json", &model.challenges_json),
                ratings: decode_column(id, "ratings_json", &model.ratings_json),
                seeking: model.seeking,
                followup: model.followup,
                name: model.name,
                company: model.company,
                contact: model.contact,
            },
        }
    }
}

pub struct SurveyRepository;

impl SurveyRepository {
    pub async fn insert(
        db: &DatabaseConnection,
        response: NewSurveyResponse,
    ) -> Result<StoredResponse, StoreError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let active_model = SurveyResponseActiveModel {
            timestamp: Set(timestamp),
            sector_json: Set(serde_json::to_string(&response.sector)?),
            solution_json: Set(serde_json::to_string(&response.solution)?),
            challenges_json: Set(serde_json::to_string(&response.challenges)?),
            capacity: Set(response.capacity),
            ratings_json: Set(serde_json::to_string(&response.ratings)?),
            seeking: Set(response.seeking),
            followup: Set(response.followup),
            name: Set(response.name),
            company: Set(response.company),
            contact: Set(response.contact),
            ..Default::default()
        };

        let model = active_model.insert(db).await?;
        Ok(StoredResponse::from(model))
    }

    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<StoredResponse>, StoreError> {
        let models = SurveyResponse::find()
            .order_by_asc(survey_response::Column::Id)
            .all(db)
            .await?;
        Ok(models.into_iter().map(StoredResponse::from).collect())
    }

    pub async fn count(db: &DatabaseConnection) -> Result<u64, StoreError> {
        Ok(SurveyResponse::find().count(db).await?)
    }
}

/// 基于 SQLite 的 RecordStore
#[derive(Clone)]
pub struct SqliteRecordStore {
    db: Arc<DatabaseConnection>,
}

impl SqliteRecordStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, response: NewSurveyResponse) -> Result<StoredResponse, StoreError> {
        SurveyRepository::insert(&self.db, response).await
    }

    async fn list_all(&self) -> Result<Vec<StoredResponse>, StoreError> {
        SurveyRepository::list_all(&self.db).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        SurveyRepository::count(&self.db).await
    }
}
