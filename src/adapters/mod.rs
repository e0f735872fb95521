//! Concrete adapter implementations for the ports.

pub mod cache_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod text_report_adapter;
