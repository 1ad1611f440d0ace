pub mod engine;
pub mod scanner;

pub use engine::{DashboardEngine, ScanPlan};
pub use scanner::{ScanReport, Scanner};
