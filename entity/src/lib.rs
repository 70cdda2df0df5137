//! Typed views over the single HR table.
//!
//! The table itself is shaped by ingestion and may carry arbitrary
//! pass-through columns. The dashboard only ever reads and writes the
//! columns named in [`columns`], through the record types below.

pub mod columns;
pub mod employee;

pub use employee::{EmployeeRecord, NewEmployee, YesNo};
