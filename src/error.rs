//! Crate-wide error type and result alias.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Task not found: {0}")]
    UnknownTask(Uuid),

    #[error("Task {id} would end ({end}) before it starts ({start})")]
    InvalidDateRange {
        id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Task {child} cannot be placed under {parent}: parent is its own descendant")]
    HierarchyCycle { child: Uuid, parent: Uuid },

    #[error("Duplicate task id: {0}")]
    DuplicateTask(Uuid),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
