pub mod dates;
pub mod emissions;
pub mod reporting;
pub mod workforce;
