/// Task model, database operations and the list query builder
///
/// Tasks are always queried through `created_by`; the owning user row keeps
/// no reference list, so creating or deleting a task is one write.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('high', 'medium', 'low');
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(100) NOT NULL,
///     description VARCHAR(500) NOT NULL,
///     due_date TIMESTAMPTZ NOT NULL,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     status task_status NOT NULL DEFAULT 'pending',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     completed_at TIMESTAMPTZ,
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The wire format for priority is `"High" | "Medium" | "Low"` and for
/// status `"Pending" | "In Progress" | "Completed"`; the database stores
/// lowercase enum labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task urgency tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "High",
            TaskPriority::Medium => "Medium",
            TaskPriority::Low => "Low",
        }
    }
}

/// Task workflow state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,

    #[serde(rename = "In Progress")]
    InProgress,

    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// True iff this is the terminal Completed state
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

/// A user-owned task
///
/// `completed` and `completed_at` are derived from `status` by the
/// lifecycle engine; `created_by` is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short summary, 3-100 characters
    pub title: String,

    /// Longer description, 10-500 characters
    pub description: String,

    /// Deadline; strictly in the future at creation time
    pub due_date: DateTime<Utc>,

    /// Urgency tag
    pub priority: TaskPriority,

    /// Workflow state
    pub status: TaskStatus,

    /// Derived: true iff status == Completed
    pub completed: bool,

    /// Set when the task enters Completed, cleared when it leaves
    pub completed_at: Option<DateTime<Utc>>,

    /// Owning user
    pub created_by: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a new task
///
/// Status, completion and timestamps come from the column defaults
/// (`pending`, not completed).
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub created_by: Uuid,
}

/// Listing filter, combined with the mandatory `created_by` predicate
///
/// `completed` is a coarse two-state filter: the HTTP `status` query param
/// maps `"completed"` to `Some(true)` and any other supplied value to
/// `Some(false)`. It is not a three-way status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub priority: Option<TaskPriority>,
}

/// Whitelisted sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    DueDate,
    Priority,
    Status,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
}

impl SortField {
    /// Parses the `sortBy` query parameter; unknown names are rejected by
    /// the caller rather than silently ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(SortField::Title),
            "dueDate" => Some(SortField::DueDate),
            "priority" => Some(SortField::Priority),
            "status" => Some(SortField::Status),
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            "completedAt" => Some(SortField::CompletedAt),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::DueDate => "due_date",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::CompletedAt => "completed_at",
        }
    }
}

/// Sort direction; ascending unless the request says `desc`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A resolved sort criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

const TASK_COLUMNS: &str = "id, title, description, due_date, priority, status, \
     completed, completed_at, created_by, created_at, updated_at";

/// Builds the SELECT for a filtered, sorted listing
///
/// Bind order: $1 = owner, then `completed` and `priority` in that order
/// when present. Column names come from the `SortField` whitelist, never
/// from request input.
fn build_list_sql(filter: &TaskFilter, sort: Option<TaskSort>) -> String {
    let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE created_by = $1");
    let mut bind = 1;

    if filter.completed.is_some() {
        bind += 1;
        sql.push_str(&format!(" AND completed = ${bind}"));
    }
    if filter.priority.is_some() {
        bind += 1;
        sql.push_str(&format!(" AND priority = ${bind}"));
    }

    match sort {
        Some(sort) => {
            sql.push_str(&format!(
                " ORDER BY {} {}",
                sort.field.column(),
                sort.direction.sql()
            ));
        }
        // Creation order, the stable default.
        None => sql.push_str(" ORDER BY created_at ASC"),
    }

    sql
}

impl Task {
    /// Inserts a new task in the default Pending state
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO tasks (title, description, due_date, priority, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.due_date)
            .bind(data.priority)
            .bind(data.created_by)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists an owner's tasks with optional filter and sort
    ///
    /// No matches is an empty vector, never an error.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner: Uuid,
        filter: &TaskFilter,
        sort: Option<TaskSort>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = build_list_sql(filter, sort);

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(owner);
        if let Some(completed) = filter.completed {
            query = query.bind(completed);
        }
        if let Some(priority) = filter.priority {
            query = query.bind(priority);
        }

        let tasks = query.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Fetches the analytics input set: an owner's tasks with a due date
    ///
    /// The due-date predicate is part of the aggregation contract even
    /// though the current schema makes it vacuous (`due_date` is NOT NULL).
    pub async fn list_for_analytics(pool: &PgPool, owner: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE created_by = $1 AND due_date IS NOT NULL"
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Persists this task's mutable fields after a lifecycle patch
    ///
    /// Writes every mutable column from the in-memory row (the lifecycle
    /// engine has already merged and re-derived them); `id`, `created_by`
    /// and `created_at` are never touched. Last write wins on concurrent
    /// updates.
    pub async fn save(&self, pool: &PgPool) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                due_date = $4,
                priority = $5,
                status = $6,
                completed = $7,
                completed_at = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(self.id)
            .bind(&self.title)
            .bind(&self.description)
            .bind(self.due_date)
            .bind(self.priority)
            .bind(self.status)
            .bind(self.completed)
            .bind(self.completed_at)
            .bind(self.updated_at)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Deletes a task row
    ///
    /// Returns false if the id did not exist; the store is left unchanged.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_wire_format() {
        assert_eq!(serde_json::to_string(&TaskPriority::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&TaskPriority::Low).unwrap(), "\"Low\"");

        let parsed: TaskPriority = serde_json::from_str("\"Medium\"").unwrap();
        assert_eq!(parsed, TaskPriority::Medium);

        assert!(serde_json::from_str::<TaskPriority>("\"urgent\"").is_err());
    }

    #[test]
    fn status_wire_format_uses_spaces() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"In Progress\""
        );

        let parsed: TaskStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);

        assert_eq!(serde_json::to_string(&TaskStatus::Pending).unwrap(), "\"Pending\"");
    }

    #[test]
    fn status_completed_predicate() {
        assert!(TaskStatus::Completed.is_completed());
        assert!(!TaskStatus::Pending.is_completed());
        assert!(!TaskStatus::InProgress.is_completed());
    }

    #[test]
    fn default_priority_is_medium() {
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    }

    #[test]
    fn sort_field_parsing_whitelist() {
        assert_eq!(SortField::parse("dueDate"), Some(SortField::DueDate));
        assert_eq!(SortField::parse("createdAt"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("priority"), Some(SortField::Priority));

        // Unknown or column-cased names are rejected.
        assert_eq!(SortField::parse("due_date"), None);
        assert_eq!(SortField::parse("passwordHash"), None);
        assert_eq!(SortField::parse(""), None);
    }

    #[test]
    fn sort_direction_defaults_to_ascending() {
        assert_eq!(SortDirection::parse(Some("desc")), SortDirection::Desc);
        assert_eq!(SortDirection::parse(Some("asc")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(Some("descending")), SortDirection::Asc);
        assert_eq!(SortDirection::parse(None), SortDirection::Asc);
    }

    #[test]
    fn list_sql_base_predicate_only() {
        let sql = build_list_sql(&TaskFilter::default(), None);

        assert!(sql.contains("WHERE created_by = $1"));
        assert!(!sql.contains("$2"));
        assert!(sql.ends_with("ORDER BY created_at ASC"));
    }

    #[test]
    fn list_sql_with_filters_binds_in_order() {
        let filter = TaskFilter {
            completed: Some(true),
            priority: Some(TaskPriority::High),
        };
        let sql = build_list_sql(&filter, None);

        assert!(sql.contains("AND completed = $2"));
        assert!(sql.contains("AND priority = $3"));
    }

    #[test]
    fn list_sql_priority_only_takes_second_bind() {
        let filter = TaskFilter {
            completed: None,
            priority: Some(TaskPriority::Low),
        };
        let sql = build_list_sql(&filter, None);

        assert!(sql.contains("AND priority = $2"));
        assert!(!sql.contains("completed ="));
    }

    #[test]
    fn list_sql_sort_clause() {
        let sort = TaskSort {
            field: SortField::DueDate,
            direction: SortDirection::Desc,
        };
        let sql = build_list_sql(&TaskFilter::default(), Some(sort));

        assert!(sql.ends_with("ORDER BY due_date DESC"));
    }

    #[test]
    fn task_wire_format_is_camel_case() {
        let task = Task {
            id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            description: "Get milk from the store today".to_string(),
            due_date: Utc::now(),
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            completed: false,
            completed_at: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("dueDate").is_some());
        assert!(json.get("createdBy").is_some());
        assert!(json.get("completedAt").is_some());
        assert!(json.get("due_date").is_none());
        assert_eq!(json["priority"], "High");
        assert_eq!(json["status"], "Pending");
    }
}
