//! Repository for the `users` table (read-only to this service).

use sqlx::PgPool;

use docuflow_core::types::DbId;

use crate::models::user::User;

/// Column list for users queries.
const COLUMNS: &str =
    "id, username, email, phone, course, role, department, student_number, created_at";

pub struct UserRepo;

impl UserRepo {
    /// Find an account by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
