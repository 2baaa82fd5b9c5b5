use shared::domain::TodoId;
use storage::Storage;

#[tokio::test]
async fn completion_and_order_survive_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("todos.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("open");
    let milk = storage.insert_todo("Buy milk").await.expect("milk");
    let bread = storage.insert_todo("Buy bread").await.expect("bread");
    storage.set_completed(milk.id, true).await.expect("complete");
    storage.move_todo(bread.id, milk.id).await.expect("move");
    storage.close().await;

    let reopened = Storage::new(&database_url).await.expect("reopen");
    let todos = reopened.list_todos().await.expect("list");
    let ids: Vec<TodoId> = todos.iter().map(|todo| todo.id).collect();
    assert_eq!(ids, vec![bread.id, milk.id]);
    assert!(todos[1].completed);
    assert!(!todos[0].completed);
    reopened.close().await;
}

#[tokio::test]
async fn opens_table_created_without_position_column() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("legacy.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(&database_url)
            .expect("options")
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("legacy pool");
        sqlx::query(
            "CREATE TABLE todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                completed INTEGER DEFAULT 0,
                created_at INTEGER DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
            )",
        )
        .execute(&pool)
        .await
        .expect("legacy table");
        sqlx::query("INSERT INTO todos (content) VALUES ('first'), ('second')")
            .execute(&pool)
            .await
            .expect("legacy rows");
        pool.close().await;
    }

    let storage = Storage::new(&database_url).await.expect("migrate legacy db");
    let contents: Vec<String> = storage
        .list_todos()
        .await
        .expect("list")
        .into_iter()
        .map(|todo| todo.content)
        .collect();
    assert_eq!(contents, vec!["first", "second"]);
    storage.close().await;
}
