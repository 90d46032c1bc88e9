pub mod alert;
pub mod alert_policy;
pub mod monitoring_config;
pub mod ports;
