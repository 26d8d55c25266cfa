//! Expansion of one task template plus a recurrence rule into dated instances.

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn all() -> &'static [Frequency] {
        &[Frequency::Daily, Frequency::Weekly, Frequency::Monthly]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Start date of occurrence `n` (0-based) anchored at `anchor`.
    ///
    /// Monthly steps are taken from the anchor, clamping to the last day of
    /// shorter months, so Jan 31 yields Feb 28/29, Mar 31, Apr 30.
    fn nth(&self, anchor: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => anchor.checked_add_signed(Duration::days(n as i64)),
            Frequency::Weekly => anchor.checked_add_signed(Duration::weeks(n as i64)),
            Frequency::Monthly => anchor.checked_add_months(Months::new(n)),
        }
    }
}

/// Ephemeral request: consumed once by [`expand`], never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Last date (inclusive) an occurrence may start on.
    pub end_date: NaiveDate,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, end_date: NaiveDate) -> Self {
        Self {
            frequency,
            end_date,
        }
    }
}

/// Generate every occurrence of `template` permitted by `rule`.
///
/// Each instance keeps the template's duration, gets a fresh id, an empty
/// dependency list, and a name suffixed with its own start date. All
/// instances share one new `recurring_instance_id`. An `end_date` before the
/// template start yields no instances.
pub fn expand(template: &Task, rule: &RecurrenceRule) -> Vec<Task> {
    let span = Duration::days((template.end - template.start).num_days().max(0));
    let series = Uuid::new_v4();

    let mut out = Vec::new();
    let mut n = 0u32;
    while let Some(start) = rule.frequency.nth(template.start, n) {
        if start > rule.end_date {
            break;
        }
        let mut instance = Task::new(
            format!("{} ({})", template.name, start.format("%Y-%m-%d")),
            start,
            start + span,
        );
        instance.description = template.description.clone();
        instance.priority = template.priority;
        instance.status = template.status;
        instance.assignee_id = template.assignee_id;
        instance.parent_id = template.parent_id;
        instance.recurring_instance_id = Some(series);
        out.push(instance);
        n += 1;
    }
    out
}

/// Human-readable audit line for a generated series.
pub fn describe(template: &Task, rule: &RecurrenceRule, count: usize) -> String {
    format!(
        "Created {} {} occurrence{} of \"{}\" through {}",
        count,
        rule.frequency.label(),
        if count == 1 { "" } else { "s" },
        template.name,
        rule.end_date.format("%Y-%m-%d"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaskPriority, TaskStatus};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn weekly_series_through_end_date() {
        let template = Task::new("Fire drill", d("2024-08-01"), d("2024-08-01"));
        let rule = RecurrenceRule::new(Frequency::Weekly, d("2024-08-22"));
        let series = expand(&template, &rule);

        let starts: Vec<_> = series.iter().map(|t| t.start).collect();
        assert_eq!(
            starts,
            vec![d("2024-08-01"), d("2024-08-08"), d("2024-08-15"), d("2024-08-22")]
        );
        assert!(series.iter().all(|t| t.duration_days() == 1));
        assert_eq!(series[1].name, "Fire drill (2024-08-08)");
    }

    #[test]
    fn end_before_start_yields_nothing() {
        let template = Task::new("Review", d("2024-08-10"), d("2024-08-12"));
        let rule = RecurrenceRule::new(Frequency::Daily, d("2024-08-09"));
        assert!(expand(&template, &rule).is_empty());
    }

    #[test]
    fn instances_share_series_id_but_not_task_id() {
        let mut template = Task::new("Inspection", d("2024-08-01"), d("2024-08-03"))
            .with_dependency(Uuid::new_v4());
        template.priority = TaskPriority::High;
        template.status = TaskStatus::InProgress;
        let rule = RecurrenceRule::new(Frequency::Daily, d("2024-08-05"));
        let series = expand(&template, &rule);

        assert_eq!(series.len(), 5);
        let tag = series[0].recurring_instance_id;
        assert!(tag.is_some());
        for t in &series {
            assert_eq!(t.recurring_instance_id, tag);
            assert_ne!(t.id, template.id);
            assert!(t.dependencies.is_empty());
            assert_eq!(t.duration_days(), 3);
            assert_eq!(t.priority, TaskPriority::High);
            assert_eq!(t.status, TaskStatus::InProgress);
        }
        let ids: std::collections::HashSet<_> = series.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn instances_stay_under_the_template_parent() {
        let parent = Uuid::new_v4();
        let mut template =
            Task::new("Backup check", d("2024-08-01"), d("2024-08-01")).with_parent(parent);
        template.description = "Restore one file".to_string();
        let rule = RecurrenceRule::new(Frequency::Weekly, d("2024-08-15"));

        for t in expand(&template, &rule) {
            assert_eq!(t.parent_id, Some(parent));
            assert_eq!(t.description, "Restore one file");
        }
    }

    #[test]
    fn monthly_clamps_to_month_end_without_drift() {
        let template = Task::new("Report", d("2024-01-31"), d("2024-01-31"));
        let rule = RecurrenceRule::new(Frequency::Monthly, d("2024-05-31"));
        let starts: Vec<_> = expand(&template, &rule).iter().map(|t| t.start).collect();
        assert_eq!(
            starts,
            vec![
                d("2024-01-31"),
                d("2024-02-29"),
                d("2024-03-31"),
                d("2024-04-30"),
                d("2024-05-31"),
            ]
        );
    }

    #[test]
    fn describe_mentions_count_and_frequency() {
        let template = Task::new("Fire drill", d("2024-08-01"), d("2024-08-01"));
        let rule = RecurrenceRule::new(Frequency::Weekly, d("2024-08-22"));
        assert_eq!(
            describe(&template, &rule, 4),
            "Created 4 weekly occurrences of \"Fire drill\" through 2024-08-22"
        );
    }
}
