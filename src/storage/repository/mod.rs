pub mod survey_repo;

pub use survey_repo::{SqliteRecordStore, SurveyRepository};
