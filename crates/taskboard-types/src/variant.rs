use serde::{Deserialize, Serialize};

/// Kind-specific card details. One record with a tag instead of a subtype per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "typeTask")]
pub enum TaskVariant {
    #[default]
    Task,
    #[serde(rename_all = "camelCase")]
    Subtask {
        #[serde(default)]
        parent_task_id: Option<i64>,
    },
    #[serde(rename_all = "camelCase")]
    Bug {
        #[serde(default)]
        steps_to_reproduce: Option<String>,
        #[serde(default)]
        expected_result: Option<String>,
        #[serde(default)]
        actual_result: Option<String>,
        #[serde(default)]
        severity: Option<Severity>,
    },
    #[serde(rename_all = "camelCase")]
    Story {
        #[serde(default)]
        story_points: Option<u32>,
        #[serde(default)]
        acceptance_criteria: Vec<String>,
        #[serde(default)]
        assignee: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Epic {
        #[serde(default)]
        related_stories: Vec<i64>,
        #[serde(default)]
        goals: Vec<String>,
        #[serde(default)]
        business_value: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskVariant {
    /// Picks the variant matching a task type name, with an empty payload.
    pub fn for_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "subtask" => Self::Subtask {
                parent_task_id: None,
            },
            "bug" => Self::Bug {
                steps_to_reproduce: None,
                expected_result: None,
                actual_result: None,
                severity: None,
            },
            "story" => Self::Story {
                story_points: None,
                acceptance_criteria: Vec::new(),
                assignee: None,
            },
            "epic" => Self::Epic {
                related_stories: Vec::new(),
                goals: Vec::new(),
                business_value: None,
            },
            _ => Self::Task,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Subtask { .. } => "Subtask",
            Self::Bug { .. } => "Bug",
            Self::Story { .. } => "Story",
            Self::Epic { .. } => "Epic",
        }
    }
}
