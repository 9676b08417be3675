//! Account rows, as owned by the external identity subsystem.

use serde::Serialize;
use sqlx::FromRow;

use docuflow_core::policy::Role;
use docuflow_core::types::{DbId, Timestamp};

/// A row from the `users` table. Read-only to this service.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: Option<String>,
    pub role: String,
    pub department: Option<String>,
    pub student_number: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    /// Parsed account role.
    pub fn role(&self) -> Role {
        Role::from_str_value(&self.role)
    }

    /// Course string used for policy resolution (empty when unset).
    pub fn course_or_empty(&self) -> &str {
        self.course.as_deref().unwrap_or("")
    }
}
