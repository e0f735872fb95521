//! Configuration access port trait.
//!
//! Missing keys fall back to the caller's default; a value that is present
//! but unparseable is a configuration error.

use crate::domain::error::SigbenchError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, SigbenchError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, SigbenchError>;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, SigbenchError>;
}
