//! Workforce engine: attendance tracking and leave management.
//!
//! This crate records check-in/check-out shifts with nested breaks,
//! auto-closes shifts left open too long, and runs leave requests through a
//! decision state machine backed by a per-employee balance ledger.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod clock;
pub mod config;
pub mod error;
pub mod leave;
pub mod models;
pub mod store;
