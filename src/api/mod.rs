//! HTTP API module for the workforce engine.
//!
//! This module exposes the attendance and leave engines as a REST API.
//! Caller identity arrives in headers set by the upstream auth layer.

mod extract;
mod handlers;
mod request;
mod response;
mod state;

pub use extract::{CurrentActor, EMPLOYEE_ID_HEADER, ROLE_HEADER, USER_ID_HEADER, actor_from_headers};
pub use handlers::create_router;
pub use request::{
    BalanceQuery, BreakActionRequest, CheckInRequest, CreateLeaveRequest, LeaveRequestQuery,
    ManualBreakRequest, PolicyQuery, ShiftActionRequest, ShiftQuery, UpdatePoliciesRequest,
};
pub use response::{ApiError, ApiErrorResponse, BalanceView, DeletedCount, ShiftView};
pub use state::AppState;
