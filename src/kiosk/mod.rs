pub mod admin;
pub mod controller;
pub mod form;
pub mod model;
pub mod questions;
pub mod timer;
pub mod validation;

pub use controller::{KioskController, Notice, Screen, SubmitError, Timings};
pub use form::{MultiKey, SingleKey, SurveyForm};
pub use model::{NewSurveyResponse, PartnerFactor, Rating, StoredResponse};
pub use timer::TimerFired;
