pub mod activity;
pub mod employee;
pub mod location;

pub use activity::{ActivityCategory, ActivityRecord, BillingMode, Scope};
pub use employee::{AgeBand, EmployeeRecord, Sex};
pub use location::{Location, LocationIndex};
