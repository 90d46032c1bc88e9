pub mod application;
pub mod domain;
pub(crate) mod infrastructure;
