//! Production session scenarios with in-memory collaborators.

pub mod cycle_tests;
pub mod fakes;
pub mod operation_tests;
