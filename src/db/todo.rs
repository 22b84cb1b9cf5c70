use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct TodoStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
}

#[derive(sqlx::FromRow)]
struct TodoRow {
    id: i64,
    user_id: i64,
    title: String,
    completed: i32,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            completed: row.completed != 0,
        }
    }
}

impl TodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a todo for a user. Returns the todo ID.
    pub async fn create(
        &self,
        user_id: i64,
        title: &str,
        completed: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO todos (user_id, title, completed) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(title)
            .bind(completed as i32)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// List all todos for a user, oldest first.
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Todo>, sqlx::Error> {
        let rows: Vec<TodoRow> = sqlx::query_as(
            "SELECT id, user_id, title, completed FROM todos WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    /// Get a todo by ID, scoped to its owner.
    pub async fn get(&self, id: i64, user_id: i64) -> Result<Option<Todo>, sqlx::Error> {
        let row: Option<TodoRow> = sqlx::query_as(
            "SELECT id, user_id, title, completed FROM todos WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    /// Update a todo, scoped to its owner. Returns false if it does not exist.
    pub async fn update(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
        completed: bool,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE todos SET title = ?, completed = ? WHERE id = ? AND user_id = ?")
                .bind(title)
                .bind(completed as i32)
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a todo, scoped to its owner. Returns false if it does not exist.
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
