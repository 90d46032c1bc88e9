//! Background health and storage monitoring of one openmediavault host.

pub mod application;
pub mod domain;
pub mod infrastructure;
