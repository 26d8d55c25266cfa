//! Interactive scheduling engine for a dependency-aware task timeline.
//!
//! The [`model`] is the source of truth. [`layout`] derives a read-only
//! projection from it, [`interaction`] turns pointer gestures into batched
//! patches, [`paths`] computes dependency curves, and [`recurrence`] expands
//! recurring tasks. [`engine::TimelineEngine`] ties them together.

pub mod config;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod logging;
pub mod model;
pub mod paths;
pub mod recurrence;

pub use engine::{TaskSink, TimelineEngine};
pub use error::{Result, ScheduleError};
pub use layout::{Point, TimelineProjection};
pub use model::{Task, TaskGraph, TaskPatch, TaskPriority, TaskStatus, User};
