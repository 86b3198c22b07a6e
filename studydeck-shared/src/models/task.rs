/// Task model, filter/sort query builder, and database operations
///
/// Tasks belong to exactly one user and every query here is scoped by that
/// user's id. [`TaskFilter`] can only be constructed with an owner, so an
/// unscoped task query cannot be expressed; cross-user visibility would be a
/// security defect.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     subject VARCHAR(255),
///     description TEXT,
///     priority VARCHAR(50),
///     status VARCHAR(50) NOT NULL DEFAULT 'pending',
///     deadline TIMESTAMPTZ,
///     subtasks JSONB,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `priority` and `status` are open string sets; the dashboard gives special
/// meaning only to `pending` and `completed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Status value counted as completed by the dashboard.
pub const STATUS_COMPLETED: &str = "completed";

/// Status value counted as pending by the dashboard (also the default).
pub const STATUS_PENDING: &str = "pending";

/// Number of tasks returned in the dashboard's upcoming list.
pub const UPCOMING_LIMIT: i64 = 5;

/// A single subtask within a task's checklist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    /// Subtask label
    pub title: String,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,
}

/// Task owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user. Immutable after creation.
    #[serde(rename = "userId")]
    pub user_id: Uuid,

    /// Task title (required, non-empty)
    pub title: String,

    /// Optional subject/category (e.g. "Math")
    pub subject: Option<String>,

    /// Optional free-text description
    pub description: Option<String>,

    /// Optional priority (open set, e.g. "low"/"medium"/"high")
    pub priority: Option<String>,

    /// Status (open set; "pending" and "completed" drive the dashboard)
    pub status: String,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Optional ordered checklist
    pub subtasks: Option<Json<Vec<Subtask>>>,

    /// When the task was created. Immutable.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub user_id: Uuid,

    /// Title (caller has already checked non-empty)
    pub title: String,

    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,

    /// Status; defaults to "pending" when absent
    pub status: Option<String>,

    pub deadline: Option<DateTime<Utc>>,
    pub subtasks: Option<Vec<Subtask>>,
}

/// Partial update for a task
///
/// Only fields that are `Some` are written; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub subtasks: Option<Vec<Subtask>>,
}

impl UpdateTask {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subject.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.deadline.is_none()
            && self.subtasks.is_none()
    }
}

/// Filter over a user's tasks
///
/// Always includes the owner's id; the optional parts layer in with AND:
///
/// - `subject`: case-insensitive substring match
/// - `priority` / `status`: exact match
/// - `q`: case-insensitive substring over title OR description OR subject
/// - `from` / `to`: inclusive bounds on `created_at`
#[derive(Debug, Clone)]
pub struct TaskFilter {
    user_id: Uuid,
    pub subject: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// Creates a filter scoped to a user with no extra conditions.
    pub fn scoped(user_id: Uuid) -> Self {
        Self {
            user_id,
            subject: None,
            priority: None,
            status: None,
            q: None,
            from: None,
            to: None,
        }
    }

    /// Returns a copy of this filter with `status` forced to the given value.
    ///
    /// Used by the dashboard's completed/pending counts, which override any
    /// caller-supplied status.
    pub fn with_status(&self, status: &str) -> Self {
        let mut filter = self.clone();
        filter.status = Some(status.to_string());
        filter
    }

    /// Appends the WHERE clause for this filter to a query builder.
    ///
    /// The owner scope always comes first; it is not optional.
    fn apply<'args>(&self, builder: &mut QueryBuilder<'args, Postgres>) {
        builder.push(" WHERE user_id = ");
        builder.push_bind(self.user_id);

        if let Some(ref subject) = self.subject {
            builder.push(" AND subject ILIKE ");
            builder.push_bind(contains_pattern(subject));
        }

        if let Some(ref priority) = self.priority {
            builder.push(" AND priority = ");
            builder.push_bind(priority.clone());
        }

        if let Some(ref status) = self.status {
            builder.push(" AND status = ");
            builder.push_bind(status.clone());
        }

        if let Some(ref q) = self.q {
            let pattern = contains_pattern(q);
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR subject ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        if let Some(from) = self.from {
            builder.push(" AND created_at >= ");
            builder.push_bind(from);
        }

        if let Some(to) = self.to {
            builder.push(" AND created_at <= ");
            builder.push_bind(to);
        }
    }
}

/// Builds an ILIKE pattern for a case-insensitive "contains" match.
///
/// `%`, `_`, and `\` in the needle are escaped so they match literally.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Field a task listing can be sorted by
///
/// A closed set: the column name goes into SQL verbatim, so arbitrary caller
/// input is never accepted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Subject,
    Priority,
    Status,
    Deadline,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Parses a field name from a `sortBy` parameter.
    pub fn parse(field: &str) -> Option<Self> {
        match field {
            "title" => Some(SortField::Title),
            "subject" => Some(SortField::Subject),
            "priority" => Some(SortField::Priority),
            "status" => Some(SortField::Status),
            "deadline" => Some(SortField::Deadline),
            "createdAt" | "created_at" => Some(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }

    /// Column name for the ORDER BY clause.
    fn as_column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Subject => "subject",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::Deadline => "deadline",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Parsed sort specification for a task listing
///
/// A single field only; ties in the chosen field have unspecified relative
/// order. This matches the source system and is a documented limitation, not
/// a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for TaskSort {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TaskSort {
    /// Parses a `sortBy` parameter of the form `field` or `field:direction`.
    ///
    /// Direction is ascending unless it is literally `desc`. An absent
    /// parameter or an unrecognized field falls back to the default
    /// (`created_at` descending).
    pub fn parse(sort_by: Option<&str>) -> Self {
        let Some(sort_by) = sort_by else {
            return Self::default();
        };

        let (field_name, direction) = match sort_by.split_once(':') {
            Some((field, dir)) => (field, dir),
            None => (sort_by, ""),
        };

        let Some(field) = SortField::parse(field_name) else {
            return Self::default();
        };

        let direction = if direction == "desc" {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };

        Self { field, direction }
    }

    /// Appends the ORDER BY clause to a query builder.
    fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" ORDER BY ");
        builder.push(self.field.as_column());
        builder.push(" ");
        builder.push(self.direction.as_sql());
    }
}

const TASK_COLUMNS: &str = "id, user_id, title, subject, description, priority, status, \
                            deadline, subtasks, created_at, updated_at";

const DELETE_SQL: &str = "DELETE FROM tasks WHERE id = $1 AND user_id = $2";

/// Builds the UPDATE statement for a partial patch.
///
/// Only fields present in the patch are written; `updated_at` is always
/// touched. The WHERE clause matches id AND owner, so the statement cannot
/// reach another user's task. `$1` is the task id, `$2` the owner; patch
/// values bind from `$3` in field order.
fn update_statement(data: &UpdateTask) -> String {
    let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
    let mut bind_count = 2;

    if data.title.is_some() {
        bind_count += 1;
        query.push_str(&format!(", title = ${}", bind_count));
    }
    if data.subject.is_some() {
        bind_count += 1;
        query.push_str(&format!(", subject = ${}", bind_count));
    }
    if data.description.is_some() {
        bind_count += 1;
        query.push_str(&format!(", description = ${}", bind_count));
    }
    if data.priority.is_some() {
        bind_count += 1;
        query.push_str(&format!(", priority = ${}", bind_count));
    }
    if data.status.is_some() {
        bind_count += 1;
        query.push_str(&format!(", status = ${}", bind_count));
    }
    if data.deadline.is_some() {
        bind_count += 1;
        query.push_str(&format!(", deadline = ${}", bind_count));
    }
    if data.subtasks.is_some() {
        bind_count += 1;
        query.push_str(&format!(", subtasks = ${}", bind_count));
    }

    query.push_str(
        " WHERE id = $1 AND user_id = $2 RETURNING id, user_id, title, subject, \
         description, priority, status, deadline, subtasks, created_at, updated_at",
    );

    query
}

impl Task {
    /// Creates a new task owned by `data.user_id`.
    ///
    /// `created_at` is set by the database at insertion; status defaults to
    /// "pending" when absent.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, subject, description, priority, status, deadline, subtasks)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'pending'), $7, $8)
            RETURNING id, user_id, title, subject, description, priority, status,
                      deadline, subtasks, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.subject)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.deadline)
        .bind(data.subtasks.map(Json))
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks matching the filter in the given order.
    ///
    /// An empty result is success, not an error.
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        sort: &TaskSort,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM tasks", TASK_COLUMNS));
        filter.apply(&mut builder);
        sort.apply(&mut builder);

        builder.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Counts tasks matching the filter.
    pub async fn count(pool: &PgPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM tasks");
        filter.apply(&mut builder);

        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Lists the next tasks whose deadline is at or after `now`, soonest
    /// first, capped at [`UPCOMING_LIMIT`].
    pub async fn upcoming(
        pool: &PgPool,
        filter: &TaskFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::new(format!("SELECT {} FROM tasks", TASK_COLUMNS));
        filter.apply(&mut builder);
        builder.push(" AND deadline >= ");
        builder.push_bind(now);
        builder.push(" ORDER BY deadline ASC LIMIT ");
        builder.push_bind(UPCOMING_LIMIT);

        builder.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Applies a partial update to a task matched by id AND owner.
    ///
    /// Matching by id alone would let a user mutate another user's task by
    /// guessing its id, so the owner is part of the match, never an
    /// afterthought. Returns `None` when no owned task matches. An empty
    /// patch still matches and returns the task unchanged (bar `updated_at`).
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = update_statement(&data);

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id).bind(user_id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(subject) = data.subject {
            q = q.bind(subject);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(deadline) = data.deadline {
            q = q.bind(deadline);
        }
        if let Some(subtasks) = data.subtasks {
            q = q.bind(Json(subtasks));
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task matched by id AND owner.
    ///
    /// Returns true if a row was removed; false means no task with that id is
    /// owned by this user.
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(DELETE_SQL)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &TaskFilter) -> String {
        let mut builder = QueryBuilder::new("SELECT * FROM tasks");
        filter.apply(&mut builder);
        builder.sql().to_string()
    }

    #[test]
    fn test_filter_always_scoped_by_owner() {
        let filter = TaskFilter::scoped(Uuid::new_v4());
        let sql = sql_for(&filter);

        assert_eq!(sql, "SELECT * FROM tasks WHERE user_id = $1");
    }

    #[test]
    fn test_filter_layers_conditions_with_and() {
        let mut filter = TaskFilter::scoped(Uuid::new_v4());
        filter.subject = Some("math".to_string());
        filter.priority = Some("high".to_string());
        filter.status = Some("pending".to_string());

        let sql = sql_for(&filter);
        assert!(sql.contains("WHERE user_id = $1"));
        assert!(sql.contains("AND subject ILIKE $2"));
        assert!(sql.contains("AND priority = $3"));
        assert!(sql.contains("AND status = $4"));
    }

    #[test]
    fn test_filter_free_text_matches_three_fields() {
        let mut filter = TaskFilter::scoped(Uuid::new_v4());
        filter.q = Some("essay".to_string());

        let sql = sql_for(&filter);
        assert!(sql.contains("AND (title ILIKE $2 OR description ILIKE $3 OR subject ILIKE $4)"));
    }

    #[test]
    fn test_filter_date_bounds_are_inclusive() {
        let mut filter = TaskFilter::scoped(Uuid::new_v4());
        filter.from = Some(Utc::now());
        filter.to = Some(Utc::now());

        let sql = sql_for(&filter);
        assert!(sql.contains("AND created_at >= $2"));
        assert!(sql.contains("AND created_at <= $3"));
    }

    #[test]
    fn test_with_status_overrides_existing_status() {
        let mut filter = TaskFilter::scoped(Uuid::new_v4());
        filter.status = Some("archived".to_string());

        let completed = filter.with_status(STATUS_COMPLETED);
        assert_eq!(completed.status.as_deref(), Some("completed"));
        // Original is untouched
        assert_eq!(filter.status.as_deref(), Some("archived"));
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("essay"), "%essay%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn test_sort_default_is_created_at_desc() {
        let sort = TaskSort::parse(None);
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_parses_field_and_direction() {
        let sort = TaskSort::parse(Some("priority:asc"));
        assert_eq!(sort.field, SortField::Priority);
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort = TaskSort::parse(Some("deadline:desc"));
        assert_eq!(sort.field, SortField::Deadline);
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_direction_asc_unless_literally_desc() {
        // Anything that is not exactly "desc" means ascending
        assert_eq!(
            TaskSort::parse(Some("title")).direction,
            SortDirection::Asc
        );
        assert_eq!(
            TaskSort::parse(Some("title:descending")).direction,
            SortDirection::Asc
        );
        assert_eq!(
            TaskSort::parse(Some("title:DESC")).direction,
            SortDirection::Asc
        );
    }

    #[test]
    fn test_sort_unknown_field_falls_back_to_default() {
        let sort = TaskSort::parse(Some("evil; DROP TABLE tasks--:asc"));
        assert_eq!(sort, TaskSort::default());
    }

    #[test]
    fn test_sort_accepts_camel_and_snake_case() {
        assert_eq!(
            TaskSort::parse(Some("createdAt:desc")).field,
            SortField::CreatedAt
        );
        assert_eq!(
            TaskSort::parse(Some("created_at:desc")).field,
            SortField::CreatedAt
        );
    }

    #[test]
    fn test_update_statement_matches_id_and_owner() {
        // Mutations carry the same owner scope as reads; id alone never
        // selects the row.
        let sql = update_statement(&UpdateTask::default());
        assert!(sql.contains("WHERE id = $1 AND user_id = $2"));

        let full = UpdateTask {
            title: Some("t".to_string()),
            subject: Some("s".to_string()),
            description: Some("d".to_string()),
            priority: Some("high".to_string()),
            status: Some("completed".to_string()),
            deadline: Some(Utc::now()),
            subtasks: Some(vec![]),
        };
        let sql = update_statement(&full);
        assert!(sql.contains("WHERE id = $1 AND user_id = $2"));
    }

    #[test]
    fn test_update_statement_binds_patch_fields_in_order() {
        let patch = UpdateTask {
            title: Some("t".to_string()),
            status: Some("completed".to_string()),
            ..Default::default()
        };

        let sql = update_statement(&patch);
        assert!(sql.starts_with("UPDATE tasks SET updated_at = NOW(), title = $3, status = $4"));
        assert!(!sql.contains("subject ="));
        assert!(!sql.contains("deadline ="));
    }

    #[test]
    fn test_delete_statement_matches_id_and_owner() {
        assert!(DELETE_SQL.contains("WHERE id = $1 AND user_id = $2"));
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());

        let patch = UpdateTask {
            title: Some("New title".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_subtask_completed_defaults_to_false() {
        let subtask: Subtask = serde_json::from_str(r#"{"title": "Read chapter 1"}"#).unwrap();
        assert_eq!(subtask.title, "Read chapter 1");
        assert!(!subtask.completed);
    }

    #[test]
    fn test_task_serializes_camel_case_wire_fields() {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Essay".to_string(),
            subject: None,
            description: None,
            priority: None,
            status: "pending".to_string(),
            deadline: None,
            subtasks: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("user_id").is_none());
    }
}
