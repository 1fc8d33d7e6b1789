pub mod connection;
pub mod entity;
pub mod repository;
pub mod store;

pub use connection::{establish_connection, open_export_database};
pub use repository::{SqliteRecordStore, SurveyRepository};
pub use store::{RecordStore, StoreError};
