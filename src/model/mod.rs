pub mod graph;
pub mod task;
pub mod timeline;

pub use graph::TaskGraph;
pub use task::{Task, TaskPatch, TaskPriority, TaskStatus, User};
pub use timeline::TimelineViewport;
