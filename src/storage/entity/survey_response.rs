use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "survey_responses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub timestamp: String, // RFC 3339，写入时由存储层生成

    // 多选题以 JSON 数组保存
    pub sector_json: String,
    pub solution_json: String,
    pub challenges_json: String,
    pub capacity: String,
    // PartnerFactor -> Rating 的 JSON 对象
    pub ratings_json: String,
    pub seeking: String,
    pub followup: String,

    #[sea_orm(nullable)]
    pub name: Option<String>,
    #[sea_orm(nullable)]
    pub company: Option<String>,
    #[sea_orm(nullable)]
    pub contact: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
