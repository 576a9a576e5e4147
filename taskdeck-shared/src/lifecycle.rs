/// Task lifecycle engine
///
/// Pure validation and state-derivation rules for tasks. Nothing here
/// touches the database: callers validate first, then persist, so a
/// rejected request has no side effects.
///
/// # Rules
///
/// - title 3-100 characters, description 10-500 characters
/// - due date strictly in the future, checked at creation only
/// - `completed` is true iff `status == Completed`; `completed_at` is set
///   exactly when `completed` is true
/// - the derivation runs after every patch merge, whether or not the patch
///   named `status`
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use taskdeck_shared::lifecycle::NewTask;
/// use taskdeck_shared::models::task::TaskPriority;
///
/// let now = Utc::now();
/// let valid = NewTask {
///     title: Some("Buy milk".to_string()),
///     description: Some("Get milk from the store today".to_string()),
///     due_date: Some(now + Duration::days(1)),
///     priority: Some(TaskPriority::High),
/// }
/// .validate(now)
/// .unwrap();
///
/// assert_eq!(valid.title, "Buy milk");
/// ```

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::task::{Task, TaskPriority, TaskStatus};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 100;
const DESCRIPTION_MIN: usize = 10;
const DESCRIPTION_MAX: usize = 500;

/// Validation failures raised before any write happens
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// A required creation field was absent from the request
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A supplied field violated its constraint
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The creation due date was not strictly in the future
    #[error("Due date must be in the future")]
    DueDateNotFuture,
}

fn validate_title(title: &str) -> Result<(), LifecycleError> {
    let len = title.chars().count();
    if len < TITLE_MIN {
        return Err(LifecycleError::Validation {
            field: "title",
            message: format!("Title must be at least {TITLE_MIN} characters long"),
        });
    }
    if len > TITLE_MAX {
        return Err(LifecycleError::Validation {
            field: "title",
            message: format!("Title cannot be longer than {TITLE_MAX} characters"),
        });
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), LifecycleError> {
    let len = description.chars().count();
    if len < DESCRIPTION_MIN {
        return Err(LifecycleError::Validation {
            field: "description",
            message: format!("Description must be at least {DESCRIPTION_MIN} characters long"),
        });
    }
    if len > DESCRIPTION_MAX {
        return Err(LifecycleError::Validation {
            field: "description",
            message: format!("Description cannot be longer than {DESCRIPTION_MAX} characters"),
        });
    }
    Ok(())
}

/// Incoming task-creation payload
///
/// Every field is optional at the type level so a missing field can be
/// reported as `MissingField` rather than a generic deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
}

/// A creation payload that passed every lifecycle check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
}

impl NewTask {
    /// Checks presence, length bounds and due-date futurity
    ///
    /// # Errors
    ///
    /// - `MissingField` if any of title/description/dueDate/priority is
    ///   absent
    /// - `Validation` for a length violation, naming the offending field
    /// - `DueDateNotFuture` unless `due_date > now`
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidTask, LifecycleError> {
        let title = self.title.ok_or(LifecycleError::MissingField("title"))?;
        let description = self
            .description
            .ok_or(LifecycleError::MissingField("description"))?;
        let due_date = self
            .due_date
            .ok_or(LifecycleError::MissingField("dueDate"))?;
        let priority = self
            .priority
            .ok_or(LifecycleError::MissingField("priority"))?;

        validate_title(&title)?;
        validate_description(&description)?;

        if due_date <= now {
            return Err(LifecycleError::DueDateNotFuture);
        }

        Ok(ValidTask {
            title,
            description,
            due_date,
            priority,
        })
    }
}

/// Partial update with presence tracked per field
///
/// A field that is `None` was not supplied and is left untouched; a field
/// that is `Some` is applied even if the value is "falsy" (an empty title
/// fails validation instead of being silently dropped).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Merges the patch into `task` and re-derives completion state
    ///
    /// Supplied fields are validated before anything is merged, so a
    /// failing patch leaves the task untouched. The completion derivation
    /// runs unconditionally on the post-merge status: entering (or staying
    /// in) Completed stamps `completed_at = now`, any other status clears
    /// it. The due date is not re-validated on update, and `created_by`
    /// is never modified.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }

        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }

        if task.status.is_completed() {
            task.completed = true;
            task.completed_at = Some(now);
        } else {
            task.completed = false;
            task.completed_at = None;
        }

        task.updated_at = now;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn tomorrow() -> DateTime<Utc> {
        Utc::now() + Duration::days(1)
    }

    fn new_task(title: &str, description: &str) -> NewTask {
        NewTask {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            due_date: Some(tomorrow()),
            priority: Some(TaskPriority::High),
        }
    }

    fn stored_task() -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            description: "Get milk from the store today".to_string(),
            due_date: now + Duration::days(1),
            priority: TaskPriority::High,
            status: TaskStatus::Pending,
            completed: false,
            completed_at: None,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn valid_creation_passes() {
        let valid = new_task("Buy milk", "Get milk from the store today")
            .validate(Utc::now())
            .unwrap();

        assert_eq!(valid.title, "Buy milk");
        assert_eq!(valid.priority, TaskPriority::High);
    }

    #[test]
    fn missing_fields_are_named() {
        let now = Utc::now();

        let mut task = new_task("Buy milk", "Get milk from the store today");
        task.title = None;
        assert_eq!(
            task.validate(now).unwrap_err(),
            LifecycleError::MissingField("title")
        );

        let mut task = new_task("Buy milk", "Get milk from the store today");
        task.due_date = None;
        assert_eq!(
            task.validate(now).unwrap_err(),
            LifecycleError::MissingField("dueDate")
        );

        let mut task = new_task("Buy milk", "Get milk from the store today");
        task.priority = None;
        assert_eq!(
            task.validate(now).unwrap_err(),
            LifecycleError::MissingField("priority")
        );
    }

    #[test]
    fn title_length_bounds() {
        let now = Utc::now();

        let err = new_task("ab", "Get milk from the store today")
            .validate(now)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation { field: "title", .. }));

        let err = new_task(&"x".repeat(101), "Get milk from the store today")
            .validate(now)
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Validation { field: "title", .. }));

        // Boundary lengths are accepted.
        assert!(new_task("abc", "Get milk from the store today")
            .validate(now)
            .is_ok());
        assert!(new_task(&"x".repeat(100), "Get milk from the store today")
            .validate(now)
            .is_ok());
    }

    #[test]
    fn description_length_bounds() {
        let now = Utc::now();

        let err = new_task("Buy milk", "too short")
            .validate(now)
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Validation {
                field: "description",
                ..
            }
        ));

        assert!(new_task("Buy milk", &"d".repeat(500)).validate(now).is_ok());
        assert!(new_task("Buy milk", &"d".repeat(501)).validate(now).is_err());
    }

    #[test]
    fn due_date_must_be_future_at_creation() {
        let now = Utc::now();

        let mut task = new_task("Buy milk", "Get milk from the store today");
        task.due_date = Some(now - Duration::hours(1));
        assert_eq!(task.validate(now).unwrap_err(), LifecycleError::DueDateNotFuture);

        // Exactly "now" is not in the future.
        let mut task = new_task("Buy milk", "Get milk from the store today");
        task.due_date = Some(now);
        assert_eq!(task.validate(now).unwrap_err(), LifecycleError::DueDateNotFuture);
    }

    #[test]
    fn patch_to_completed_derives_completion() {
        let mut task = stored_task();
        let now = Utc::now();

        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        patch.apply_to(&mut task, now).unwrap();

        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));
        assert_eq!(task.updated_at, now);
        // Unrelated fields survive the merge.
        assert_eq!(task.priority, TaskPriority::High);
    }

    #[test]
    fn patch_away_from_completed_clears_completion() {
        let mut task = stored_task();
        task.status = TaskStatus::Completed;
        task.completed = true;
        task.completed_at = Some(Utc::now());

        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        patch.apply_to(&mut task, Utc::now()).unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn derivation_fires_without_status_in_patch() {
        // A patch that never mentions status still re-derives from the
        // task's current status, refreshing completed_at.
        let mut task = stored_task();
        task.status = TaskStatus::Completed;
        task.completed = true;
        let stale = Utc::now() - Duration::days(2);
        task.completed_at = Some(stale);

        let now = Utc::now();
        let patch = TaskPatch {
            priority: Some(TaskPriority::Low),
            ..Default::default()
        };
        patch.apply_to(&mut task, now).unwrap();

        assert_eq!(task.priority, TaskPriority::Low);
        assert!(task.completed);
        assert_eq!(task.completed_at, Some(now));
    }

    #[test]
    fn derivation_clears_stale_completion_on_pending_task() {
        let mut task = stored_task();

        let patch = TaskPatch {
            title: Some("Buy oat milk".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut task, Utc::now()).unwrap();

        assert_eq!(task.title, "Buy oat milk");
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn invalid_patch_leaves_task_untouched() {
        let mut task = stored_task();
        let before = task.clone();

        let patch = TaskPatch {
            title: Some("ab".to_string()),
            priority: Some(TaskPriority::Low),
            ..Default::default()
        };
        let err = patch.apply_to(&mut task, Utc::now()).unwrap_err();

        assert!(matches!(err, LifecycleError::Validation { field: "title", .. }));
        assert_eq!(task.title, before.title);
        assert_eq!(task.priority, before.priority);
        assert_eq!(task.updated_at, before.updated_at);
    }

    #[test]
    fn patch_does_not_revalidate_due_date() {
        let mut task = stored_task();
        let past = Utc::now() - Duration::days(7);

        let patch = TaskPatch {
            due_date: Some(past),
            ..Default::default()
        };
        patch.apply_to(&mut task, Utc::now()).unwrap();

        assert_eq!(task.due_date, past);
    }

    #[test]
    fn empty_patch_still_derives_and_stamps() {
        let mut task = stored_task();
        let now = Utc::now();

        TaskPatch::default().apply_to(&mut task, now).unwrap();

        assert_eq!(task.updated_at, now);
        assert!(!task.completed);
    }
}
