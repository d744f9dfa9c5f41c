//! Kanban board state.
//!
//! [`KanbanBoard`] holds what a board view renders from: every task plus the
//! task types and users needed to decorate cards. Mutations go to the server
//! first and the task list is then re-fetched, so the board never shows a
//! status the server did not accept.

use std::future::Future;

use taskboard_types::api::{CreateTaskRequest, TaskFilter, UpdateTaskRequest};
use taskboard_types::variant::TaskVariant;
use taskboard_types::{Task, TaskStatus, TaskType, User};
use tracing::{debug, warn};

use crate::client::TaskboardClient;
use crate::error::ClientError;

/// The calls a board needs from the server.
pub trait BoardApi {
    fn fetch_tasks(&self) -> impl Future<Output = Result<Vec<Task>, ClientError>> + Send;

    fn fetch_task_types(&self) -> impl Future<Output = Result<Vec<TaskType>, ClientError>> + Send;

    fn fetch_users(&self) -> impl Future<Output = Result<Vec<User>, ClientError>> + Send;

    fn submit_task(
        &self,
        req: &CreateTaskRequest,
    ) -> impl Future<Output = Result<Task, ClientError>> + Send;

    fn patch_task(
        &self,
        id: i64,
        patch: &UpdateTaskRequest,
    ) -> impl Future<Output = Result<Task, ClientError>> + Send;

    fn remove_task(&self, id: i64) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl BoardApi for TaskboardClient {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.list_tasks(&TaskFilter::default()).await
    }

    async fn fetch_task_types(&self) -> Result<Vec<TaskType>, ClientError> {
        self.list_task_types().await
    }

    async fn fetch_users(&self) -> Result<Vec<User>, ClientError> {
        self.list_users().await
    }

    async fn submit_task(&self, req: &CreateTaskRequest) -> Result<Task, ClientError> {
        self.create_task(req).await
    }

    async fn patch_task(&self, id: i64, patch: &UpdateTaskRequest) -> Result<Task, ClientError> {
        self.update_task(id, patch).await
    }

    async fn remove_task(&self, id: i64) -> Result<(), ClientError> {
        self.delete_task(id).await.map(|_| ())
    }
}

/// Where a card was picked up or dropped: a column id and a position in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropLocation<'a> {
    pub droppable_id: &'a str,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The server accepted the new status and tasks were reloaded.
    Moved,
    /// Nothing to do; no request was sent.
    Unchanged,
}

/// A task as the board shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Card<'a> {
    pub task: &'a Task,
    pub variant: TaskVariant,
    pub task_type: Option<&'a TaskType>,
    pub assignee: Option<&'a User>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub cards: Vec<Card<'a>>,
}

impl Column<'_> {
    pub fn title(&self) -> &'static str {
        self.status.as_str()
    }
}

pub struct KanbanBoard<A> {
    api: A,
    tasks: Vec<Task>,
    task_types: Vec<TaskType>,
    users: Vec<User>,
}

impl<A: BoardApi> KanbanBoard<A> {
    /// An empty board. Call [`Self::reload`] to fill it.
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            task_types: Vec::new(),
            users: Vec::new(),
        }
    }

    pub async fn load(api: A) -> Result<Self, ClientError> {
        let mut board = Self::new(api);
        board.reload().await?;
        Ok(board)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task_types(&self) -> &[TaskType] {
        &self.task_types
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Re-fetches tasks, task types and users.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        self.task_types = self.api.fetch_task_types().await?;
        self.users = self.api.fetch_users().await?;
        self.reload_tasks().await
    }

    pub async fn reload_tasks(&mut self) -> Result<(), ClientError> {
        self.tasks = self.api.fetch_tasks().await?;
        debug!(count = self.tasks.len(), "Board tasks reloaded");
        Ok(())
    }

    /// One column per status in board order, each holding its tasks in list order.
    pub fn columns(&self) -> Vec<Column<'_>> {
        TaskStatus::ALL
            .into_iter()
            .map(|status| Column {
                status,
                cards: self
                    .tasks
                    .iter()
                    .filter(|t| t.status == status)
                    .map(|t| self.card(t))
                    .collect(),
            })
            .collect()
    }

    fn card<'a>(&'a self, task: &'a Task) -> Card<'a> {
        let task_type = task
            .task_type_id
            .and_then(|id| self.task_types.iter().find(|t| t.id == id));
        let assignee = task
            .assigned_to_user_id
            .and_then(|id| self.users.iter().find(|u| u.id == id));

        Card {
            task,
            variant: task_type
                .map(|t| TaskVariant::for_type_name(&t.name))
                .unwrap_or_default(),
            task_type,
            assignee,
        }
    }

    /// Sends a status-only update. Unknown tasks and tasks already in `status`
    /// are left alone. On failure the tasks are still re-fetched so the board
    /// reflects the server, and the update error is returned.
    pub async fn move_task(
        &mut self,
        id: i64,
        status: TaskStatus,
    ) -> Result<MoveOutcome, ClientError> {
        match self.task(id) {
            Some(task) if task.status != status => {}
            _ => return Ok(MoveOutcome::Unchanged),
        }

        let patch = UpdateTaskRequest::status_only(status);
        if let Err(err) = self.api.patch_task(id, &patch).await {
            warn!(task_id = id, %status, "Failed to move task: {}", err);
            if let Err(reload_err) = self.reload_tasks().await {
                warn!("Reload after failed move also failed: {}", reload_err);
            }
            return Err(err);
        }

        self.reload_tasks().await?;
        Ok(MoveOutcome::Moved)
    }

    /// Handles the end of a drag. Drops outside any column, back onto the
    /// starting slot, or onto a column that is not a status are ignored.
    pub async fn drop_card(
        &mut self,
        draggable_id: &str,
        source: DropLocation<'_>,
        destination: Option<DropLocation<'_>>,
    ) -> Result<MoveOutcome, ClientError> {
        let Some(destination) = destination else {
            return Ok(MoveOutcome::Unchanged);
        };
        if destination == source {
            return Ok(MoveOutcome::Unchanged);
        }
        let Ok(status) = destination.droppable_id.parse::<TaskStatus>() else {
            warn!(column = destination.droppable_id, "Dropped on unknown column");
            return Ok(MoveOutcome::Unchanged);
        };
        let Ok(id) = draggable_id.parse::<i64>() else {
            return Ok(MoveOutcome::Unchanged);
        };

        self.move_task(id, status).await
    }

    pub async fn add_task(&mut self, req: &CreateTaskRequest) -> Result<Task, ClientError> {
        let task = self.api.submit_task(req).await?;
        self.reload_tasks().await?;
        Ok(task)
    }

    pub async fn edit_task(
        &mut self,
        id: i64,
        patch: &UpdateTaskRequest,
    ) -> Result<Task, ClientError> {
        let task = self.api.patch_task(id, patch).await?;
        self.reload_tasks().await?;
        Ok(task)
    }

    pub async fn delete_task(&mut self, id: i64) -> Result<(), ClientError> {
        self.api.remove_task(id).await?;
        self.reload_tasks().await
    }
}
