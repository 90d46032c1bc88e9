pub mod cpu_stats;
pub mod credentials;
pub mod filesystem_stats;
pub mod memory_stats;
pub mod rpc_envelope;
pub mod session;
pub mod system_information;
pub mod update_info;
