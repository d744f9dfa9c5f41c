//! Business rules between the handlers and the database.
//!
//! Services are synchronous and borrow the [`Database`]; handlers run them on
//! the blocking pool.

use taskboard_db::Database;
use taskboard_types::api::{
    CreateTaskRequest, CreateTaskTypeRequest, CreateUserRequest, FieldError, TaskFilter,
    UpdateTaskRequest, UpdateTaskTypeRequest, UpdateUserRequest,
};
use taskboard_types::{Task, TaskType, User};
use tracing::debug;

use crate::error::ApiError;

const TASK_TYPE_CONFLICT: &str = "Task type name already exists";
const USER_CONFLICT: &str = "Username already exists";

pub struct TaskService<'a> {
    db: &'a Database,
}

impl<'a> TaskService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        Ok(self.db.list_tasks(filter)?)
    }

    pub fn get(&self, id: i64) -> Result<Option<Task>, ApiError> {
        Ok(self.db.get_task(id)?)
    }

    pub fn create(&self, req: &CreateTaskRequest) -> Result<Task, ApiError> {
        self.check_references(req.task_type_id, req.assigned_to_user_id)?;
        let task = self.db.create_task(req).map_err(ApiError::from_task_write)?;
        debug!(task_id = task.id, "Task created");
        Ok(task)
    }

    /// `Ok(None)` when the task does not exist.
    pub fn update(&self, id: i64, patch: &UpdateTaskRequest) -> Result<Option<Task>, ApiError> {
        if !self.db.task_exists(id)? {
            return Ok(None);
        }
        self.check_references(patch.task_type_id.flatten(), patch.assigned_to_user_id.flatten())?;
        self.db
            .update_task(id, patch)
            .map_err(ApiError::from_task_write)
    }

    pub fn delete(&self, id: i64) -> Result<bool, ApiError> {
        Ok(self.db.delete_task(id)?)
    }

    fn check_references(
        &self,
        task_type_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if let Some(id) = task_type_id {
            if !self.db.task_type_exists(id)? {
                errors.push(FieldError {
                    field: "taskTypeId".into(),
                    message: format!("Task type {id} does not exist"),
                });
            }
        }
        if let Some(id) = user_id {
            if !self.db.user_exists(id)? {
                errors.push(FieldError {
                    field: "assignedToUserId".into(),
                    message: format!("User {id} does not exist"),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

pub struct TaskTypeService<'a> {
    db: &'a Database,
}

impl<'a> TaskTypeService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<TaskType>, ApiError> {
        Ok(self.db.list_task_types()?)
    }

    pub fn get(&self, id: i64) -> Result<Option<TaskType>, ApiError> {
        Ok(self.db.get_task_type(id)?)
    }

    pub fn create(&self, req: &CreateTaskTypeRequest) -> Result<TaskType, ApiError> {
        self.db
            .create_task_type(req)
            .map_err(|e| ApiError::from_db(e, TASK_TYPE_CONFLICT))
    }

    pub fn update(
        &self,
        id: i64,
        patch: &UpdateTaskTypeRequest,
    ) -> Result<Option<TaskType>, ApiError> {
        if !self.db.task_type_exists(id)? {
            return Ok(None);
        }
        self.db
            .update_task_type(id, patch)
            .map_err(|e| ApiError::from_db(e, TASK_TYPE_CONFLICT))
    }

    /// Tasks of this type keep existing with their type cleared.
    pub fn delete(&self, id: i64) -> Result<bool, ApiError> {
        Ok(self.db.delete_task_type(id)?)
    }
}

pub struct UserService<'a> {
    db: &'a Database,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.db.list_users()?)
    }

    pub fn get(&self, id: i64) -> Result<Option<User>, ApiError> {
        Ok(self.db.get_user(id)?)
    }

    pub fn create(&self, req: &CreateUserRequest) -> Result<User, ApiError> {
        let user = self
            .db
            .create_user(req)
            .map_err(|e| ApiError::from_db(e, USER_CONFLICT))?;
        debug!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    pub fn update(&self, id: i64, patch: &UpdateUserRequest) -> Result<Option<User>, ApiError> {
        if !self.db.user_exists(id)? {
            return Ok(None);
        }
        self.db
            .update_user(id, patch)
            .map_err(|e| ApiError::from_db(e, USER_CONFLICT))
    }

    /// Tasks assigned to this user become unassigned.
    pub fn delete(&self, id: i64) -> Result<bool, ApiError> {
        Ok(self.db.delete_user(id)?)
    }
}
