mod walk;
mod year;

pub use walk::{scan, ScanIter, ScanOptions};
pub use year::{year_from_folder, DEFAULT_YEAR_RANGE};
