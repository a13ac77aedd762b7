//! The entity types as they cross the API boundary. The wire format is
//! camelCase json, ids are assigned by the storage layer and timestamps are
//! unix seconds.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub current_week: i64,
    pub total_points: i64,
    pub streak_days: i64,
    pub level: i64,
    /// earned achievement codes, see [`crate::progress::achievement_code`]
    pub achievements: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub week_number: i64,
    pub total_lessons: i64,
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub sample_code: Option<String>,
    pub expected_output: Option<String>,
    pub lesson_number: i64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    /// absent for course-level records
    pub lesson_id: Option<i64>,
    pub completed: bool,
    /// stamped when `completed` flips to true, never erased afterwards
    pub completed_at: Option<i64>,
    pub code_submitted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub points: i64,
    pub sample_code: Option<String>,
    pub solution: Option<String>,
    pub is_daily: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: i64,
    /// opaque trigger key interpreted by the progress evaluator
    pub condition: String,
}

// ---- creation inputs, ids and stamps are assigned by the store ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub current_week: Option<i64>,
    #[serde(default)]
    pub total_points: Option<i64>,
    #[serde(default)]
    pub streak_days: Option<i64>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub week_number: i64,
    pub total_lessons: i64,
    #[serde(default)]
    pub is_locked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLesson {
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub sample_code: Option<String>,
    #[serde(default)]
    pub expected_output: Option<String>,
    pub lesson_number: i64,
    #[serde(default)]
    pub points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProgress {
    pub student_id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub lesson_id: Option<i64>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub code_submitted: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChallenge {
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub points: i64,
    #[serde(default)]
    pub sample_code: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub is_daily: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAchievement {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: i64,
    pub condition: String,
}

// ---- partial updates ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub current_week: Option<i64>,
    #[serde(default)]
    pub total_points: Option<i64>,
    #[serde(default)]
    pub streak_days: Option<i64>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPatch {
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub code_submitted: Option<String>,
}
