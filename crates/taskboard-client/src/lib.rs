//! Client side of the task board: a typed HTTP client for the REST API and
//! the board state a Kanban view renders from.

pub mod board;
pub mod client;
pub mod error;

pub use board::{BoardApi, Card, Column, DropLocation, KanbanBoard, MoveOutcome};
pub use client::TaskboardClient;
pub use error::ClientError;
