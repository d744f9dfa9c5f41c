pub mod api;
pub mod models;
pub mod timestamp;
pub mod variant;

pub use models::{Task, TaskPriority, TaskStatus, TaskType, User};
