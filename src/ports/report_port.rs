//! Report output port trait.

use crate::domain::error::SigbenchError;
use crate::domain::report::RunReport;

/// Port for writing run reports. `"-"` as the output path means stdout.
pub trait ReportPort {
    fn write(&self, report: &RunReport, output_path: &str) -> Result<(), SigbenchError>;
}
