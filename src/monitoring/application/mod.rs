pub mod dashboard;
pub mod scheduler;
pub mod settings;
