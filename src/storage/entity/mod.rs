pub mod survey_response;
pub mod survey_row;

pub use survey_response::Entity as SurveyResponse;
pub use survey_row::Entity as SurveyRow;
