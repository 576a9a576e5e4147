/// Dashboard analytics aggregator
///
/// Computes derived summary statistics over one user's tasks: the priority
/// distribution and a per-day completion rate. Nothing is persisted; the
/// summaries are recomputed from a single task scan per request, so a
/// failed scan fails the whole operation with no partial result.
///
/// Grouping happens in memory with an explicit day key rather than in a
/// database aggregation pipeline: the day bucket for a task is the UTC
/// calendar date of `completed_at` when present, else of `created_at`.
///
/// # Example
///
/// ```
/// use taskdeck_shared::analytics::compute_analytics;
///
/// let data = compute_analytics(&[]);
/// assert_eq!(data.priority_data.total_tasks, 0);
/// assert!(data.day_wise_completion_data.is_empty());
/// ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::task::{Task, TaskPriority};

/// Priority distribution over the analyzed task set
///
/// Always present in a response, all-zero when the set is empty, so the
/// response shape stays stable for chart consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritySummary {
    pub high_priority: u64,
    pub medium_priority: u64,
    pub low_priority: u64,
    pub total_tasks: u64,
}

/// Completion statistics for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCompletion {
    /// UTC calendar day the bucket groups on
    pub day: NaiveDate,

    /// Tasks whose bucket day this is
    pub total_tasks: u64,

    /// Tasks in the bucket with status Completed
    pub completed_tasks: u64,

    /// 100 * completed / total, 0 when the bucket is empty
    pub completion_percentage: f64,
}

/// The full analytics payload for one user
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub priority_data: PrioritySummary,
    pub day_wise_completion_data: Vec<DayCompletion>,
}

fn completion_percentage(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    completed as f64 * 100.0 / total as f64
}

/// The day a task is grouped under: completion date when completed,
/// creation date otherwise
fn bucket_day(task: &Task) -> NaiveDate {
    task.completed_at.unwrap_or(task.created_at).date_naive()
}

/// Aggregates a user's task scan into dashboard summaries
///
/// Buckets come back in chronological day order.
pub fn compute_analytics(tasks: &[Task]) -> AnalyticsData {
    let mut priority_data = PrioritySummary::default();
    let mut days: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();

    for task in tasks {
        match task.priority {
            TaskPriority::High => priority_data.high_priority += 1,
            TaskPriority::Medium => priority_data.medium_priority += 1,
            TaskPriority::Low => priority_data.low_priority += 1,
        }
        priority_data.total_tasks += 1;

        let (total, completed) = days.entry(bucket_day(task)).or_default();
        *total += 1;
        if task.status.is_completed() {
            *completed += 1;
        }
    }

    let day_wise_completion_data = days
        .into_iter()
        .map(|(day, (total, completed))| DayCompletion {
            day,
            total_tasks: total,
            completed_tasks: completed,
            completion_percentage: completion_percentage(completed, total),
        })
        .collect();

    AnalyticsData {
        priority_data,
        day_wise_completion_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn task_at(
        created_at: DateTime<Utc>,
        priority: TaskPriority,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: "Quarterly report for the team".to_string(),
            due_date: created_at + Duration::days(3),
            priority,
            status,
            completed: status.is_completed(),
            completed_at,
            created_by: Uuid::new_v4(),
            created_at,
            updated_at: created_at,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn empty_set_yields_zero_record_and_no_buckets() {
        let data = compute_analytics(&[]);

        assert_eq!(data.priority_data, PrioritySummary::default());
        assert_eq!(data.priority_data.total_tasks, 0);
        assert!(data.day_wise_completion_data.is_empty());
    }

    #[test]
    fn priority_counts_add_up() {
        let created = at(2025, 6, 1, 9);
        let tasks = vec![
            task_at(created, TaskPriority::High, TaskStatus::Pending, None),
            task_at(created, TaskPriority::High, TaskStatus::InProgress, None),
            task_at(created, TaskPriority::Medium, TaskStatus::Pending, None),
            task_at(created, TaskPriority::Low, TaskStatus::Pending, None),
        ];

        let data = compute_analytics(&tasks);

        assert_eq!(data.priority_data.high_priority, 2);
        assert_eq!(data.priority_data.medium_priority, 1);
        assert_eq!(data.priority_data.low_priority, 1);
        assert_eq!(data.priority_data.total_tasks, 4);
    }

    #[test]
    fn buckets_group_by_utc_day() {
        // Two tasks created the same day, one the day after; different
        // hours must not split a bucket.
        let tasks = vec![
            task_at(at(2025, 6, 1, 0), TaskPriority::Medium, TaskStatus::Pending, None),
            task_at(at(2025, 6, 1, 23), TaskPriority::Medium, TaskStatus::Pending, None),
            task_at(at(2025, 6, 2, 12), TaskPriority::Medium, TaskStatus::Pending, None),
        ];

        let data = compute_analytics(&tasks);

        assert_eq!(data.day_wise_completion_data.len(), 2);
        assert_eq!(data.day_wise_completion_data[0].total_tasks, 2);
        assert_eq!(data.day_wise_completion_data[1].total_tasks, 1);
    }

    #[test]
    fn completed_tasks_bucket_on_completion_day() {
        // Created June 1st, completed June 5th: counts toward June 5th.
        let completed = task_at(
            at(2025, 6, 1, 9),
            TaskPriority::High,
            TaskStatus::Completed,
            Some(at(2025, 6, 5, 17)),
        );
        let pending = task_at(at(2025, 6, 1, 9), TaskPriority::Low, TaskStatus::Pending, None);

        let data = compute_analytics(&[completed, pending]);

        let days: Vec<NaiveDate> = data
            .day_wise_completion_data
            .iter()
            .map(|b| b.day)
            .collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            ]
        );

        let june5 = &data.day_wise_completion_data[1];
        assert_eq!(june5.total_tasks, 1);
        assert_eq!(june5.completed_tasks, 1);
        assert_eq!(june5.completion_percentage, 100.0);
    }

    #[test]
    fn percentage_formula_and_bounds() {
        let day = at(2025, 6, 3, 8);
        let tasks = vec![
            task_at(day, TaskPriority::Medium, TaskStatus::Completed, Some(day)),
            task_at(day, TaskPriority::Medium, TaskStatus::Pending, None),
            task_at(day, TaskPriority::Medium, TaskStatus::InProgress, None),
            task_at(day, TaskPriority::Medium, TaskStatus::Pending, None),
        ];

        let data = compute_analytics(&tasks);
        assert_eq!(data.day_wise_completion_data.len(), 1);

        let bucket = &data.day_wise_completion_data[0];
        assert!(bucket.completed_tasks <= bucket.total_tasks);
        assert_eq!(bucket.total_tasks, 4);
        assert_eq!(bucket.completed_tasks, 1);
        assert_eq!(bucket.completion_percentage, 25.0);
    }

    #[test]
    fn zero_total_guard() {
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(3, 4), 75.0);
    }

    #[test]
    fn buckets_are_chronological() {
        let tasks = vec![
            task_at(at(2025, 6, 9, 10), TaskPriority::Low, TaskStatus::Pending, None),
            task_at(at(2025, 6, 2, 10), TaskPriority::Low, TaskStatus::Pending, None),
            task_at(at(2025, 6, 5, 10), TaskPriority::Low, TaskStatus::Pending, None),
        ];

        let data = compute_analytics(&tasks);
        let days: Vec<NaiveDate> = data
            .day_wise_completion_data
            .iter()
            .map(|b| b.day)
            .collect();

        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
    }

    #[test]
    fn wire_format_matches_dashboard_contract() {
        let day = at(2025, 6, 3, 8);
        let data = compute_analytics(&[task_at(
            day,
            TaskPriority::High,
            TaskStatus::Completed,
            Some(day),
        )]);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["priorityData"]["highPriority"], 1);
        assert_eq!(json["priorityData"]["totalTasks"], 1);

        let bucket = &json["dayWiseCompletionData"][0];
        assert_eq!(bucket["day"], "2025-06-03");
        assert_eq!(bucket["totalTasks"], 1);
        assert_eq!(bucket["completedTasks"], 1);
        assert_eq!(bucket["completionPercentage"], 100.0);
    }
}
