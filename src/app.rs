pub mod bootstrap;
pub mod controller;
pub mod report;

pub use controller::{run_scan, AppController, ScanOptions};
pub use report::{ConsoleReporter, SortColumn, SortSpec};
