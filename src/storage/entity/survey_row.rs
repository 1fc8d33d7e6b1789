use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 导出文件中的 surveys 表，一行一份问卷，多选以 "; " 拼接
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "surveys")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub timestamp: String,
    pub sector: String,
    pub solution: String,
    pub capacity: String,
    pub challenges: String,
    #[sea_orm(nullable)]
    pub fast_deployment: Option<String>,
    #[sea_orm(nullable)]
    pub cost_efficiency: Option<String>,
    #[sea_orm(nullable)]
    pub environmental_sustainability: Option<String>,
    #[sea_orm(nullable)]
    pub technical_support: Option<String>,
    #[sea_orm(nullable)]
    pub long_term_partnership: Option<String>,
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
