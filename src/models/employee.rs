//! Employee model and caller identity types.
//!
//! Employee records are owned by an external system; the engine only reads
//! the hire date for leave proration. [`Actor`] carries the already
//! authenticated caller context handed in by the transport layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// The role a caller acts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access.
    Admin,
    /// Managerial access; privileged like admin for attendance and leave.
    Manager,
    /// Self-service access to one's own records only.
    Employee,
}

impl Role {
    /// Returns true for roles allowed to backdate times and decide leave.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl std::str::FromStr for Role {
    type Err = EngineError;

    fn from_str(value: &str) -> EngineResult<Self> {
        match value {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            other => Err(EngineError::invalid_input(format!("unknown role '{other}'"))),
        }
    }
}

/// An employee as far as this engine is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// The date employment started; unset for legacy records.
    #[serde(default)]
    pub hired_at: Option<NaiveDate>,
}

/// The authenticated caller of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The caller's role.
    pub role: Role,
    /// The caller's user account id; recorded as approver on leave decisions.
    pub user_id: Uuid,
    /// The employee record linked to the caller, if any.
    pub employee_id: Option<Uuid>,
}

impl Actor {
    /// Creates a privileged actor with no linked employee record.
    pub fn admin(user_id: Uuid) -> Self {
        Self {
            role: Role::Admin,
            user_id,
            employee_id: None,
        }
    }

    /// Creates a self-service actor linked to `employee_id`.
    pub fn employee(user_id: Uuid, employee_id: Uuid) -> Self {
        Self {
            role: Role::Employee,
            user_id,
            employee_id: Some(employee_id),
        }
    }

    /// Returns true if the actor holds a privileged role.
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }

    /// Fails with `Forbidden` unless the actor is privileged.
    pub fn require_privileged(&self) -> EngineResult<()> {
        if self.is_privileged() {
            Ok(())
        } else {
            Err(EngineError::forbidden("privileged role required"))
        }
    }

    /// The employee id of a self-service caller.
    pub fn own_employee_id(&self) -> EngineResult<Uuid> {
        self.employee_id
            .ok_or_else(|| EngineError::forbidden("no employee record linked to caller"))
    }

    /// Resolves which employee an operation targets.
    ///
    /// Self-service callers always target themselves; any requested id is
    /// ignored. Privileged callers must name an employee.
    pub fn target_employee(&self, requested: Option<Uuid>) -> EngineResult<Uuid> {
        if self.is_privileged() {
            requested.ok_or_else(|| EngineError::invalid_input("employee_id required"))
        } else {
            self.own_employee_id()
        }
    }

    /// Returns true if the actor may act on records owned by `employee_id`.
    pub fn owns(&self, employee_id: Uuid) -> bool {
        self.employee_id == Some(employee_id)
    }
}
