use askline_db::{create_pool, run_migrations, DbRuntimeSettings};

#[test]
fn pooled_connections_share_a_file_database() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("askline.db");
    let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default())
        .expect("failed to create pool");

    {
        let conn = pool.get().expect("failed to get connection");
        let applied = run_migrations(&conn).expect("failed to run migrations");
        assert_eq!(applied, 3);
        conn.execute(
            "INSERT INTO questions (content, timestamp) VALUES ('hello', '2024-01-01T00:00:00Z')",
            [],
        )
        .expect("failed to insert question");
    }

    // Hold one connection open so the next checkout is a different one.
    let first = pool.get().expect("failed to get first connection");
    let second = pool.get().expect("failed to get second connection");
    for conn in [&first, &second] {
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))
            .expect("failed to count questions");
        assert_eq!(count, 1);
    }
}

#[test]
fn answers_require_existing_question() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("askline.db");
    let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default())
        .expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    run_migrations(&conn).expect("failed to run migrations");

    let result = conn.execute(
        "INSERT INTO answers (question_id, content, timestamp) VALUES (999, 'orphan', '2024-01-01T00:00:00Z')",
        [],
    );
    assert!(result.is_err(), "foreign key should reject orphan answers");
}
