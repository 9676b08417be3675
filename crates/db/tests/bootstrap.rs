use sqlx::PgPool;

/// Full bootstrap test: connect, verify schema.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    // Health check
    docuflow_db::health_check(&pool).await.unwrap();

    // Verify every workflow table exists and is empty after migration.
    let tables = [
        "users",
        "document_types",
        "requests",
        "request_documents",
        "request_clearances",
        "student_clearance",
        "document_cart",
        "clearance_notifications",
    ];

    for table in tables {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

/// New clearance rows default every department to pending.
#[sqlx::test(migrations = "./migrations")]
async fn test_clearance_rows_default_pending(pool: PgPool) {
    let (student_id,): (i64,) =
        sqlx::query_as("INSERT INTO users (username, role) VALUES ('amara', 'student') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();

    sqlx::query("INSERT INTO student_clearance (student_id) VALUES ($1)")
        .bind(student_id)
        .execute(&pool)
        .await
        .unwrap();

    let (registrar, criminology, expiry): (String, String, Option<chrono::DateTime<chrono::Utc>>) =
        sqlx::query_as(
            "SELECT registrar_status, criminology_status, clearance_expiry
             FROM student_clearance WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(registrar, "pending");
    assert_eq!(criminology, "pending");
    assert!(expiry.is_none());
}
