#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for fare-control records.
//!
//! Every function here is a pure reduction: it reads a slice of records
//! once, never mutates them, and returns freshly built statistics. Calling
//! any of them twice on the same input yields identical output.

pub mod embarkment;
pub mod inspection;
pub mod trend;

pub use embarkment::{aggregate_embarkment, aggregate_mission};
pub use inspection::{LocationGroups, aggregate, aggregate_extended, group_by_location};
pub use trend::{iso_week_start, weekly_trend};
