//! Tests for the dagbridge-engine crate.

mod helpers;

mod basic;
mod concurrency;
mod edge_cases;
