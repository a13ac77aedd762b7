//! The storage layer owns every entity instance. All reads and writes go
//! through the [`Storage`] trait so the handlers never care whether they talk
//! to the in-memory store or the sqlite one. Both implementations share the
//! default/merge semantics defined here.

pub mod mem;
pub mod sqlite;

use crate::progress::TOTAL_WEEKS;
use crate::schema::{
    Achievement, Challenge, Course, Lesson, NewAchievement, NewChallenge, NewCourse, NewLesson,
    NewProgress, NewStudent, Progress, ProgressPatch, Student, StudentPatch,
};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound { message: String },
    Conflict { message: String },
    BadRequest { message: String },
    Internal { message: String },
}

impl StoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        StoreError::NotFound {
            message: message.into(),
        }
    }
    pub fn conflict(message: impl Into<String>) -> Self {
        StoreError::Conflict {
            message: message.into(),
        }
    }
    pub fn bad_request(message: impl Into<String>) -> Self {
        StoreError::BadRequest {
            message: message.into(),
        }
    }
    pub fn internal(message: impl Into<String>) -> Self {
        StoreError::Internal {
            message: message.into(),
        }
    }
}

/// Repository capability used by the api layer and the progress evaluator.
///
/// Lookups return `Ok(None)` on a missing id, updates fail with `NotFound`.
/// Courses are ordered by ascending week number, lessons by ascending lesson
/// number within their course; the remaining list operations carry no
/// ordering guarantee.
#[allow(async_fn_in_trait)]
pub trait Storage {
    async fn get_student(&self, id: i64) -> Result<Option<Student>, StoreError>;
    async fn get_student_by_username(&self, username: &str)
        -> Result<Option<Student>, StoreError>;
    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError>;
    async fn update_student(&self, id: i64, patch: StudentPatch) -> Result<Student, StoreError>;

    async fn get_all_courses(&self) -> Result<Vec<Course>, StoreError>;
    async fn get_course(&self, id: i64) -> Result<Option<Course>, StoreError>;
    async fn create_course(&self, new: NewCourse) -> Result<Course, StoreError>;

    async fn get_lessons_by_course(&self, course_id: i64) -> Result<Vec<Lesson>, StoreError>;
    async fn get_lesson(&self, id: i64) -> Result<Option<Lesson>, StoreError>;
    async fn create_lesson(&self, new: NewLesson) -> Result<Lesson, StoreError>;

    async fn get_student_progress(&self, student_id: i64) -> Result<Vec<Progress>, StoreError>;
    async fn get_student_course_progress(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Progress>, StoreError>;
    async fn create_progress(&self, new: NewProgress) -> Result<Progress, StoreError>;
    async fn update_progress(&self, id: i64, patch: ProgressPatch)
        -> Result<Progress, StoreError>;

    async fn get_all_challenges(&self) -> Result<Vec<Challenge>, StoreError>;
    async fn get_daily_challenge(&self) -> Result<Option<Challenge>, StoreError>;
    async fn create_challenge(&self, new: NewChallenge) -> Result<Challenge, StoreError>;

    async fn get_all_achievements(&self) -> Result<Vec<Achievement>, StoreError>;
    async fn create_achievement(&self, new: NewAchievement) -> Result<Achievement, StoreError>;
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn check_week(week: i64) -> Result<(), StoreError> {
    // week 13 means "curriculum finished"
    if !(1..=TOTAL_WEEKS + 1).contains(&week) {
        return Err(StoreError::bad_request(format!(
            "currentWeek must be between 1 and {}",
            TOTAL_WEEKS + 1
        )));
    }
    Ok(())
}

// The build_* functions apply the declared creation defaults and validate the
// field invariants. The id is a placeholder, the store assigns the real one.

pub(crate) fn build_student(new: NewStudent) -> Result<Student, StoreError> {
    if new.username.trim().is_empty() {
        return Err(StoreError::bad_request("username must not be empty"));
    }
    let current_week = new.current_week.unwrap_or(1);
    check_week(current_week)?;
    Ok(Student {
        id: 0,
        name: new.name,
        username: new.username,
        current_week,
        total_points: new.total_points.unwrap_or(0).max(0),
        streak_days: new.streak_days.unwrap_or(0).max(0),
        level: new.level.unwrap_or(1).max(1),
        achievements: new.achievements.unwrap_or_default(),
        created_at: unix_now(),
    })
}

pub(crate) fn build_course(new: NewCourse) -> Result<Course, StoreError> {
    if !(1..=TOTAL_WEEKS).contains(&new.week_number) {
        return Err(StoreError::bad_request(format!(
            "weekNumber must be between 1 and {}",
            TOTAL_WEEKS
        )));
    }
    if new.total_lessons <= 0 {
        return Err(StoreError::bad_request("totalLessons must be positive"));
    }
    Ok(Course {
        id: 0,
        title: new.title,
        description: new.description,
        week_number: new.week_number,
        total_lessons: new.total_lessons,
        is_locked: new.is_locked.unwrap_or(false),
    })
}

pub(crate) fn build_lesson(new: NewLesson) -> Result<Lesson, StoreError> {
    if new.lesson_number <= 0 {
        return Err(StoreError::bad_request("lessonNumber must be positive"));
    }
    let points = new.points.unwrap_or(50);
    if points < 0 {
        return Err(StoreError::bad_request("points must not be negative"));
    }
    Ok(Lesson {
        id: 0,
        course_id: new.course_id,
        title: new.title,
        description: new.description,
        content: new.content,
        sample_code: new.sample_code,
        expected_output: new.expected_output,
        lesson_number: new.lesson_number,
        points,
    })
}

pub(crate) fn build_progress(new: NewProgress) -> Result<Progress, StoreError> {
    let completed = new.completed.unwrap_or(false);
    Ok(Progress {
        id: 0,
        student_id: new.student_id,
        course_id: new.course_id,
        lesson_id: new.lesson_id,
        completed,
        completed_at: if completed { Some(unix_now()) } else { None },
        code_submitted: new.code_submitted,
    })
}

pub(crate) fn build_challenge(new: NewChallenge) -> Result<Challenge, StoreError> {
    if new.points <= 0 {
        return Err(StoreError::bad_request("points must be positive"));
    }
    Ok(Challenge {
        id: 0,
        title: new.title,
        description: new.description,
        difficulty: new.difficulty,
        points: new.points,
        sample_code: new.sample_code,
        solution: new.solution,
        is_daily: new.is_daily.unwrap_or(false),
    })
}

pub(crate) fn build_achievement(new: NewAchievement) -> Result<Achievement, StoreError> {
    if new.points <= 0 {
        return Err(StoreError::bad_request("points must be positive"));
    }
    Ok(Achievement {
        id: 0,
        name: new.name,
        description: new.description,
        icon: new.icon,
        points: new.points,
        condition: new.condition,
    })
}

/// Merge a partial student update. The current week may never move backwards.
pub(crate) fn merge_student(current: &Student, patch: StudentPatch) -> Result<Student, StoreError> {
    let mut student = current.clone();
    if let Some(name) = patch.name {
        student.name = name;
    }
    if let Some(username) = patch.username {
        if username.trim().is_empty() {
            return Err(StoreError::bad_request("username must not be empty"));
        }
        student.username = username;
    }
    if let Some(week) = patch.current_week {
        check_week(week)?;
        if week < current.current_week {
            return Err(StoreError::bad_request(
                "currentWeek must not move backwards",
            ));
        }
        student.current_week = week;
    }
    if let Some(points) = patch.total_points {
        student.total_points = points.max(0);
    }
    if let Some(days) = patch.streak_days {
        student.streak_days = days.max(0);
    }
    if let Some(level) = patch.level {
        student.level = level.max(1);
    }
    if let Some(achievements) = patch.achievements {
        student.achievements = achievements;
    }
    Ok(student)
}

/// Merge a partial progress update. Setting `completed = true` stamps
/// `completed_at` in the same operation; anything else leaves an existing
/// stamp in place.
pub(crate) fn merge_progress(current: &Progress, patch: ProgressPatch) -> Progress {
    let mut record = current.clone();
    if let Some(completed) = patch.completed {
        record.completed = completed;
        if completed {
            record.completed_at = Some(unix_now());
        }
    }
    if let Some(code) = patch.code_submitted {
        record.code_submitted = Some(code);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        build_student(NewStudent {
            name: "Alex Kim".to_string(),
            username: "alex_kim".to_string(),
            current_week: Some(3),
            total_points: None,
            streak_days: None,
            level: None,
            achievements: None,
        })
        .unwrap()
    }

    #[test]
    fn student_defaults() {
        let s = build_student(NewStudent {
            name: "Sam".to_string(),
            username: "sam".to_string(),
            current_week: None,
            total_points: None,
            streak_days: None,
            level: None,
            achievements: None,
        })
        .unwrap();
        assert_eq!(s.current_week, 1);
        assert_eq!(s.total_points, 0);
        assert_eq!(s.streak_days, 0);
        assert_eq!(s.level, 1);
        assert!(s.achievements.is_empty());
        assert!(s.created_at > 0);
    }

    #[test]
    fn student_week_out_of_range() {
        let mut new = NewStudent {
            name: "Sam".to_string(),
            username: "sam".to_string(),
            current_week: Some(0),
            total_points: None,
            streak_days: None,
            level: None,
            achievements: None,
        };
        assert!(build_student(new.clone()).is_err());
        new.current_week = Some(14);
        assert!(build_student(new).is_err());
    }

    #[test]
    fn merge_keeps_unpatched_fields() {
        let s = student();
        let merged = merge_student(
            &s,
            StudentPatch {
                total_points: Some(100),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(merged.name, s.name);
        assert_eq!(merged.current_week, 3);
        assert_eq!(merged.total_points, 100);
    }

    #[test]
    fn week_must_not_move_backwards() {
        let s = student();
        let result = merge_student(
            &s,
            StudentPatch {
                current_week: Some(2),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::BadRequest { .. })));
        let forward = merge_student(
            &s,
            StudentPatch {
                current_week: Some(4),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(forward.current_week, 4);
    }

    #[test]
    fn completing_progress_stamps_timestamp() {
        let record = build_progress(NewProgress {
            student_id: 1,
            course_id: 1,
            lesson_id: Some(1),
            completed: None,
            code_submitted: None,
        })
        .unwrap();
        assert!(!record.completed);
        assert_eq!(record.completed_at, None);

        let done = merge_progress(
            &record,
            ProgressPatch {
                completed: Some(true),
                code_submitted: None,
            },
        );
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        // clearing the flag must not erase the stamp
        let cleared = merge_progress(
            &done,
            ProgressPatch {
                completed: Some(false),
                code_submitted: None,
            },
        );
        assert!(!cleared.completed);
        assert_eq!(cleared.completed_at, done.completed_at);
    }

    #[test]
    fn challenge_needs_positive_points() {
        let result = build_challenge(NewChallenge {
            title: "t".to_string(),
            description: "d".to_string(),
            difficulty: "Easy".to_string(),
            points: 0,
            sample_code: None,
            solution: None,
            is_daily: None,
        });
        assert!(matches!(result, Err(StoreError::BadRequest { .. })));
    }
}
