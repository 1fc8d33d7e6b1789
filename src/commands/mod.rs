pub mod app_command;
pub mod export;
pub mod submit;

pub use app_command::AppCommand;
