//! Operator-only operations and background maintenance.

pub mod admin;
pub mod sweeper;
