use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 合作伙伴重要性评分题（第 5 题），序列化名即导出列名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerFactor {
    FastDeployment,
    CostEfficiency,
    EnvironmentalSustainability,
    TechnicalSupport,
    LongTermPartnership,
}

impl PartnerFactor {
    pub const ALL: [PartnerFactor; 5] = [
        PartnerFactor::FastDeployment,
        PartnerFactor::CostEfficiency,
        PartnerFactor::EnvironmentalSustainability,
        PartnerFactor::TechnicalSupport,
        PartnerFactor::LongTermPartnership,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PartnerFactor::FastDeployment => "Fast deployment & availability",
            PartnerFactor::CostEfficiency => "Cost efficiency",
            PartnerFactor::EnvironmentalSustainability => "Environmental sustainability",
            PartnerFactor::TechnicalSupport => "Technical support & reliability",
            PartnerFactor::LongTermPartnership => "Long-term partnership",
        }
    }
}

/// 1 = Not Important, 5 = Very Important
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Rating> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Rating(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Not Important",
            2 => "Slightly Important",
            3 => "Moderately Important",
            4 => "Important",
            _ => "Very Important",
        }
    }
}

/// 已通过校验、等待写入的问卷快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSurveyResponse {
    pub sector: BTreeSet<String>,
    pub solution: BTreeSet<String>,
    pub capacity: String,
    pub challenges: BTreeSet<String>,
    pub ratings: BTreeMap<PartnerFactor, Rating>,
    pub seeking: String,
    pub followup: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub contact: Option<String>,
}

/// 已落库的问卷记录，id 与 timestamp 由存储层分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub id: i32,
    pub timestamp: String,
    #[serde(flatten)]
    pub response: NewSurveyResponse,
}
