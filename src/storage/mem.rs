//! In-memory store. Plain maps keyed by id behind a single lock, with one
//! monotonic id counter per entity type. Ids are never reused.

use super::{
    build_achievement, build_challenge, build_course, build_lesson, build_progress, build_student,
    merge_progress, merge_student, StoreError, Storage,
};
use crate::schema::{
    Achievement, Challenge, Course, Lesson, NewAchievement, NewChallenge, NewCourse, NewLesson,
    NewProgress, NewStudent, Progress, ProgressPatch, Student, StudentPatch,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    students: HashMap<i64, Student>,
    courses: HashMap<i64, Course>,
    lessons: HashMap<i64, Lesson>,
    progress: HashMap<i64, Progress>,
    challenges: HashMap<i64, Challenge>,
    achievements: HashMap<i64, Achievement>,
    next_student_id: i64,
    next_course_id: i64,
    next_lesson_id: i64,
    next_progress_id: i64,
    next_challenge_id: i64,
    next_achievement_id: i64,
}

pub struct MemStorage {
    state: RwLock<State>,
}

impl MemStorage {
    /// An empty store. Call [`crate::seed::load`] to fill it with the
    /// curriculum fixtures.
    pub fn new() -> Self {
        MemStorage {
            state: RwLock::new(State {
                next_student_id: 1,
                next_course_id: 1,
                next_lesson_id: 1,
                next_progress_id: 1,
                next_challenge_id: 1,
                next_achievement_id: 1,
                ..Default::default()
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::internal("storage lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::internal("storage lock poisoned"))
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        MemStorage::new()
    }
}

impl Storage for MemStorage {
    async fn get_student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        Ok(self.read()?.students.get(&id).cloned())
    }

    async fn get_student_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Student>, StoreError> {
        Ok(self
            .read()?
            .students
            .values()
            .find(|s| s.username == username)
            .cloned())
    }

    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let mut student = build_student(new)?;
        let mut state = self.write()?;
        if state
            .students
            .values()
            .any(|s| s.username == student.username)
        {
            return Err(StoreError::conflict(format!(
                "username '{}' is already taken",
                student.username
            )));
        }
        student.id = state.next_student_id;
        state.next_student_id += 1;
        state.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn update_student(&self, id: i64, patch: StudentPatch) -> Result<Student, StoreError> {
        let mut state = self.write()?;
        let current = state
            .students
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Student not found"))?;
        let updated = merge_student(&current, patch)?;
        if updated.username != current.username
            && state.students.values().any(|s| s.username == updated.username)
        {
            return Err(StoreError::conflict(format!(
                "username '{}' is already taken",
                updated.username
            )));
        }
        state.students.insert(id, updated.clone());
        Ok(updated)
    }

    async fn get_all_courses(&self) -> Result<Vec<Course>, StoreError> {
        let mut courses: Vec<Course> = self.read()?.courses.values().cloned().collect();
        courses.sort_by_key(|c| c.week_number);
        Ok(courses)
    }

    async fn get_course(&self, id: i64) -> Result<Option<Course>, StoreError> {
        Ok(self.read()?.courses.get(&id).cloned())
    }

    async fn create_course(&self, new: NewCourse) -> Result<Course, StoreError> {
        let mut course = build_course(new)?;
        let mut state = self.write()?;
        if state
            .courses
            .values()
            .any(|c| c.week_number == course.week_number)
        {
            return Err(StoreError::conflict(format!(
                "a course for week {} already exists",
                course.week_number
            )));
        }
        course.id = state.next_course_id;
        state.next_course_id += 1;
        state.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn get_lessons_by_course(&self, course_id: i64) -> Result<Vec<Lesson>, StoreError> {
        let mut lessons: Vec<Lesson> = self
            .read()?
            .lessons
            .values()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.lesson_number);
        Ok(lessons)
    }

    async fn get_lesson(&self, id: i64) -> Result<Option<Lesson>, StoreError> {
        Ok(self.read()?.lessons.get(&id).cloned())
    }

    async fn create_lesson(&self, new: NewLesson) -> Result<Lesson, StoreError> {
        let mut lesson = build_lesson(new)?;
        let mut state = self.write()?;
        if !state.courses.contains_key(&lesson.course_id) {
            return Err(StoreError::bad_request("unknown course"));
        }
        if state
            .lessons
            .values()
            .any(|l| l.course_id == lesson.course_id && l.lesson_number == lesson.lesson_number)
        {
            return Err(StoreError::conflict(format!(
                "lesson {} already exists in this course",
                lesson.lesson_number
            )));
        }
        lesson.id = state.next_lesson_id;
        state.next_lesson_id += 1;
        state.lessons.insert(lesson.id, lesson.clone());
        Ok(lesson)
    }

    async fn get_student_progress(&self, student_id: i64) -> Result<Vec<Progress>, StoreError> {
        Ok(self
            .read()?
            .progress
            .values()
            .filter(|p| p.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn get_student_course_progress(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Progress>, StoreError> {
        Ok(self
            .read()?
            .progress
            .values()
            .filter(|p| p.student_id == student_id && p.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_progress(&self, new: NewProgress) -> Result<Progress, StoreError> {
        let mut record = build_progress(new)?;
        let mut state = self.write()?;
        if !state.students.contains_key(&record.student_id) {
            return Err(StoreError::bad_request("unknown student"));
        }
        if !state.courses.contains_key(&record.course_id) {
            return Err(StoreError::bad_request("unknown course"));
        }
        if let Some(lesson_id) = record.lesson_id {
            if !state.lessons.contains_key(&lesson_id) {
                return Err(StoreError::bad_request("unknown lesson"));
            }
            if state
                .progress
                .values()
                .any(|p| p.student_id == record.student_id && p.lesson_id == Some(lesson_id))
            {
                return Err(StoreError::conflict(
                    "progress for this lesson is already recorded",
                ));
            }
        }
        record.id = state.next_progress_id;
        state.next_progress_id += 1;
        state.progress.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_progress(
        &self,
        id: i64,
        patch: ProgressPatch,
    ) -> Result<Progress, StoreError> {
        let mut state = self.write()?;
        let current = state
            .progress
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Progress not found"))?;
        let updated = merge_progress(&current, patch);
        state.progress.insert(id, updated.clone());
        Ok(updated)
    }

    async fn get_all_challenges(&self) -> Result<Vec<Challenge>, StoreError> {
        Ok(self.read()?.challenges.values().cloned().collect())
    }

    async fn get_daily_challenge(&self) -> Result<Option<Challenge>, StoreError> {
        Ok(self
            .read()?
            .challenges
            .values()
            .find(|c| c.is_daily)
            .cloned())
    }

    async fn create_challenge(&self, new: NewChallenge) -> Result<Challenge, StoreError> {
        let mut challenge = build_challenge(new)?;
        let mut state = self.write()?;
        if challenge.is_daily && state.challenges.values().any(|c| c.is_daily) {
            return Err(StoreError::conflict("a daily challenge already exists"));
        }
        challenge.id = state.next_challenge_id;
        state.next_challenge_id += 1;
        state.challenges.insert(challenge.id, challenge.clone());
        Ok(challenge)
    }

    async fn get_all_achievements(&self) -> Result<Vec<Achievement>, StoreError> {
        Ok(self.read()?.achievements.values().cloned().collect())
    }

    async fn create_achievement(&self, new: NewAchievement) -> Result<Achievement, StoreError> {
        let mut achievement = build_achievement(new)?;
        let mut state = self.write()?;
        achievement.id = state.next_achievement_id;
        state.next_achievement_id += 1;
        state
            .achievements
            .insert(achievement.id, achievement.clone());
        Ok(achievement)
    }
}
