use crate::kiosk::model::{PartnerFactor, StoredResponse};
use crate::storage::entity::survey_row;
use sea_orm::Set;
use std::collections::BTreeSet;

pub const LIST_SEPARATOR: &str = "; ";

pub fn join_set(values: &BTreeSet<String>) -> String {
    values
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn rating_cell(record: &StoredResponse, factor: PartnerFactor) -> Option<String> {
    record
        .response
        .ratings
        .get(&factor)
        .map(|r| r.value().to_string())
}

/// 把一条记录拍平成导出表的一行
pub fn to_row(record: &StoredResponse) -> survey_row::Model {
    let r = &record.response;
    survey_row::Model {
        id: record.id,
        timestamp: record.timestamp.clone(),
        sector: join_set(&r.sector),
        solution: join_set(&r.solution),
        capacity: r.capacity.clone(),
        challenges: join_set(&r.challenges),
        fast_deployment: rating_cell(record, PartnerFactor::FastDeployment),
        cost_efficiency: rating_cell(record, PartnerFactor::CostEfficiency),
        environmental_sustainability: rating_cell(
            record,
            PartnerFactor::EnvironmentalSustainability,
        ),
        technical_support: rating_cell(record, PartnerFactor::TechnicalSupport),
        long_term_partnership: rating_cell(record, PartnerFactor::LongTermPartnership),
        seeking: r.seeking.clone(),
        followup: r.followup.clone(),
        name: r.name.clone(),
        company: r.company.clone(),
        contact: r.contact.clone(),
    }
}

pub fn to_active_row(row: survey_row::Model) -> survey_row::ActiveModel {
    survey_row::ActiveModel {
        id: Set(row.id),
        timestamp: Set(row.timestamp),
        sector: Set(row.sector),
        solution: Set(row.solution),
        capacity: Set(row.capacity),
        challenges: Set(row.challenges),
        fast_deployment: Set(row.fast_deployment),
        cost_efficiency: Set(row.cost_efficiency),
        environmental_sustainability: Set(row.environmental_sustainability),
        technical_support: Set(row.technical_support),
        long_term_partnership: Set(row.long_term_partnership),
        seeking: Set(row.seeking),
        followup: Set(row.followup),
        name: Set(row.name),
        company: Set(row.company),
        contact: Set(row.contact),
    }
}
