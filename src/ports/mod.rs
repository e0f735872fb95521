//! Port traits decoupling the domain from data, config, and report I/O.

pub mod config_port;
pub mod data_port;
pub mod report_port;
