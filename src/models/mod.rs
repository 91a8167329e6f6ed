//! Core data models for the workforce engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod leave;
mod shift;

pub use employee::{Actor, Employee, Role};
pub use leave::{
    LeaveBalance, LeavePolicy, LeaveRequest, LeaveSpan, LeaveStatus, LeaveType,
};
pub use shift::{Break, Shift};
