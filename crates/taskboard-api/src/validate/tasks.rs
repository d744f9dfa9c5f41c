use std::collections::HashMap;

use serde_json::Value;
use taskboard_types::api::{CreateTaskRequest, FieldError, TaskFilter, UpdateTaskRequest};
use taskboard_types::{TaskPriority, TaskStatus};

use super::{TextRule, Validator, is_date, object};
use crate::error::ApiError;

const TITLE: TextRule = TextRule {
    min: 1,
    max: 200,
    too_short: "Title is required",
    too_long: "Title must be less than 200 characters",
};

const DESCRIPTION: TextRule = TextRule {
    min: 1,
    max: 1000,
    too_short: "Description is required",
    too_long: "Description must be less than 1000 characters",
};

const STATUS: &str = "Status must be To Do, In Progress, Review, or Done";
const PRIORITY: &str = "Priority must be Low, Medium, or High";
const DUE_DATE: &str = "Due date must be a valid date (YYYY-MM-DD)";
const DATE: &str = "Date must be a valid date (YYYY-MM-DD)";

pub fn create(body: &Value) -> Result<CreateTaskRequest, ApiError> {
    let mut v = Validator::new(object(body)?);

    let title = v.required_text("title", &TITLE);
    let description = v.required_text("description", &DESCRIPTION);
    let status = v.optional_enum::<TaskStatus>("status", STATUS);
    let priority = v.required_enum::<TaskPriority>("priority", PRIORITY);
    let task_type_id = v.nullable_id("taskTypeId");
    let assigned_to_user_id = v.nullable_id("assignedToUserId");
    let due_date = v.blank_as_null("dueDate", is_date, DUE_DATE);

    let (Some(title), Some(description), Some(priority)) = (title, description, priority) else {
        return Err(v.into_error());
    };
    v.finish()?;

    Ok(CreateTaskRequest {
        title,
        description,
        status,
        priority,
        task_type_id: task_type_id.flatten(),
        assigned_to_user_id: assigned_to_user_id.flatten(),
        due_date: due_date.flatten(),
    })
}

pub fn update(body: &Value) -> Result<UpdateTaskRequest, ApiError> {
    let mut v = Validator::new(object(body)?);

    let patch = UpdateTaskRequest {
        title: v.optional_text("title", &TITLE),
        description: v.optional_text("description", &DESCRIPTION),
        status: v.optional_enum("status", STATUS),
        priority: v.optional_enum("priority", PRIORITY),
        task_type_id: v.nullable_id("taskTypeId"),
        assigned_to_user_id: v.nullable_id("assignedToUserId"),
        due_date: v.blank_as_null("dueDate", is_date, DUE_DATE),
    };
    v.finish()?;
    Ok(patch)
}

/// Query string for `GET /api/tasks`. Empty values count as absent; unknown keys are ignored.
pub fn filter(query: &HashMap<String, String>) -> Result<TaskFilter, ApiError> {
    let mut errors = Vec::new();
    let mut reject = |field: &str, message: &str| {
        errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        })
    };
    let param = |key: &str| query.get(key).map(String::as_str).filter(|s| !s.is_empty());

    let status = param("status").and_then(|raw| {
        let parsed = raw.parse::<TaskStatus>().ok();
        if parsed.is_none() {
            reject("status", STATUS);
        }
        parsed
    });
    let priority = param("priority").and_then(|raw| {
        let parsed = raw.parse::<TaskPriority>().ok();
        if parsed.is_none() {
            reject("priority", PRIORITY);
        }
        parsed
    });
    let date = param("date").and_then(|raw| {
        if is_date(raw) {
            Some(raw.to_string())
        } else {
            reject("date", DATE);
            None
        }
    });

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    Ok(TaskFilter {
        status,
        priority,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn minimal_create_is_accepted() {
        let req = create(&json!({
            "title": "Test Task",
            "description": "Test Description",
            "priority": "Medium"
        }))
        .unwrap();

        assert_eq!(req.title, "Test Task");
        assert_eq!(req.priority, TaskPriority::Medium);
        assert_eq!(req.status, None);
        assert_eq!(req.due_date, None);
    }

    #[test]
    fn create_reports_each_bad_field() {
        let err = create(&json!({ "title": "", "priority": "Invalid" })).unwrap_err();
        assert_eq!(fields(err), vec!["title", "description", "priority"]);
    }

    #[test]
    fn create_checks_bounds_and_references() {
        let err = create(&json!({
            "title": "x".repeat(201),
            "description": "ok",
            "priority": "High",
            "status": "Blocked",
            "taskTypeId": 0,
            "assignedToUserId": "7",
            "dueDate": "31/12/2024"
        }))
        .unwrap_err();
        assert_eq!(
            fields(err),
            vec!["title", "status", "taskTypeId", "assignedToUserId", "dueDate"]
        );
    }

    #[test]
    fn blank_due_date_becomes_null() {
        for due in [json!(""), json!(null)] {
            let req = create(&json!({
                "title": "t",
                "description": "d",
                "priority": "Low",
                "dueDate": due
            }))
            .unwrap();
            assert_eq!(req.due_date, None);
        }
    }

    #[test]
    fn update_keeps_absent_separate_from_cleared() {
        let body = json!({ "status": "Done", "dueDate": "", "taskTypeId": null });
        let patch = update(&body).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::Done));
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.task_type_id, Some(None));
        assert_eq!(patch.assigned_to_user_id, None);
        assert_eq!(patch.title, None);

        assert!(update(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn update_rejects_empty_title() {
        let err = update(&json!({ "title": "" })).unwrap_err();
        assert_eq!(fields(err), vec!["title"]);
    }

    #[test]
    fn filter_parses_known_params() {
        let query: HashMap<String, String> = [
            ("status".to_string(), "In Progress".to_string()),
            ("date".to_string(), "2024-12-31".to_string()),
            ("page".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();

        let filter = filter(&query).unwrap();
        assert_eq!(filter.status, Some(TaskStatus::InProgress));
        assert_eq!(filter.priority, None);
        assert_eq!(filter.date.as_deref(), Some("2024-12-31"));
    }

    #[test]
    fn filter_rejects_unknown_enum_values() {
        let query: HashMap<String, String> = [
            ("status".to_string(), "InvalidStatus".to_string()),
            ("priority".to_string(), "urgent".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(fields(filter(&query).unwrap_err()), vec!["status", "priority"]);
    }
}
