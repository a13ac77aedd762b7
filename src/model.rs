//! Row models for the sqlite store. The api-facing types live in
//! [`crate::schema`]; these mirror the table columns, with the earned
//! achievement codes kept as a json text column.

use crate::schema::{Achievement, Challenge, Course, Lesson, Progress, Student};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct StudentRow {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub current_week: i64,
    pub total_points: i64,
    pub streak_days: i64,
    pub level: i64,
    pub achievements: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub week_number: i64,
    pub total_lessons: i64,
    pub is_locked: bool,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct LessonRow {
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

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct ProgressRow {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub lesson_id: Option<i64>,
    pub completed: bool,
    pub completed_at: Option<i64>,
    pub code_submitted: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct ChallengeRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub points: i64,
    pub sample_code: Option<String>,
    pub solution: Option<String>,
    pub is_daily: bool,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct AchievementRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points: i64,
    pub condition: String,
}

pub fn student_row2schema(row: StudentRow) -> Student {
    Student {
        id: row.id,
        name: row.name,
        username: row.username,
        current_week: row.current_week,
        total_points: row.total_points,
        streak_days: row.streak_days,
        level: row.level,
        achievements: serde_json::from_str(&row.achievements).unwrap_or_default(),
        created_at: row.created_at,
    }
}

pub fn course_row2schema(row: CourseRow) -> Course {
    Course {
        id: row.id,
        title: row.title,
        description: row.description,
        week_number: row.week_number,
        total_lessons: row.total_lessons,
        is_locked: row.is_locked,
    }
}

pub fn lesson_row2schema(row: LessonRow) -> Lesson {
    Lesson {
        id: row.id,
        course_id: row.course_id,
        title: row.title,
        description: row.description,
        content: row.content,
        sample_code: row.sample_code,
        expected_output: row.expected_output,
        lesson_number: row.lesson_number,
        points: row.points,
    }
}

pub fn progress_row2schema(row: ProgressRow) -> Progress {
    Progress {
        id: row.id,
        student_id: row.student_id,
        course_id: row.course_id,
        lesson_id: row.lesson_id,
        completed: row.completed,
        completed_at: row.completed_at,
        code_submitted: row.code_submitted,
    }
}

pub fn challenge_row2schema(row: ChallengeRow) -> Challenge {
    Challenge {
        id: row.id,
        title: row.title,
        description: row.description,
        difficulty: row.difficulty,
        points: row.points,
        sample_code: row.sample_code,
        solution: row.solution,
        is_daily: row.is_daily,
    }
}

pub fn achievement_row2schema(row: AchievementRow) -> Achievement {
    Achievement {
        id: row.id,
        name: row.name,
        description: row.description,
        icon: row.icon,
        points: row.points,
        condition: row.condition,
    }
}
