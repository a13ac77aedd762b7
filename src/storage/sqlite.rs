//! Sqlite-backed store for the persistent variant. Ids come from
//! `AUTOINCREMENT` so they are monotonic and never reused; the declared
//! creation defaults and merge semantics are shared with the in-memory store
//! through the build_*/merge_* helpers.

use super::{
    build_achievement, build_challenge, build_course, build_lesson, build_progress, build_student,
    merge_progress, merge_student, StoreError, Storage,
};
use crate::model::{
    achievement_row2schema, challenge_row2schema, course_row2schema, lesson_row2schema,
    progress_row2schema, student_row2schema, AchievementRow, ChallengeRow, CourseRow, LessonRow,
    ProgressRow, StudentRow,
};
use crate::schema::{
    Achievement, Challenge, Course, Lesson, NewAchievement, NewChallenge, NewCourse, NewLesson,
    NewProgress, NewStudent, Progress, ProgressPatch, Student, StudentPatch,
};
use log::info;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePool;
use sqlx::Sqlite;

pub struct SqliteStorage {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::internal(e.to_string())
}

impl SqliteStorage {
    /// Connect to (and if needed create) the database at `url`, then run the
    /// migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("creating database at {}", url);
            Sqlite::create_database(url).await.map_err(db_err)?;
        }
        let pool = SqlitePool::connect(url).await.map_err(db_err)?;
        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| StoreError::internal(e.to_string()))?;
        Ok(SqliteStorage { pool })
    }

    /// Wrap an already migrated pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        SqliteStorage { pool }
    }

    async fn username_taken(&self, username: &str) -> Result<bool, StoreError> {
        let existing = sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(existing.is_some())
    }

    async fn write_student(&self, student: &Student) -> Result<(), StoreError> {
        let achievements =
            serde_json::to_string(&student.achievements).map_err(|e| StoreError::internal(e.to_string()))?;
        sqlx::query(
            "UPDATE students SET name = ?, username = ?, current_week = ?, total_points = ?, \
             streak_days = ?, level = ?, achievements = ? WHERE id = ?",
        )
        .bind(&student.name)
        .bind(&student.username)
        .bind(student.current_week)
        .bind(student.total_points)
        .bind(student.streak_days)
        .bind(student.level)
        .bind(achievements)
        .bind(student.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

impl Storage for SqliteStorage {
    async fn get_student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(student_row2schema))
    }

    async fn get_student_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(student_row2schema))
    }

    async fn create_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let student = build_student(new)?;
        if self.username_taken(&student.username).await? {
            return Err(StoreError::conflict(format!(
                "username '{}' is already taken",
                student.username
            )));
        }
        let achievements =
            serde_json::to_string(&student.achievements).map_err(|e| StoreError::internal(e.to_string()))?;
        let row = sqlx::query_as::<_, StudentRow>(
            "INSERT INTO students(name, username, current_week, total_points, streak_days, \
             level, achievements, created_at) VALUES (?,?,?,?,?,?,?,?) RETURNING *",
        )
        .bind(&student.name)
        .bind(&student.username)
        .bind(student.current_week)
        .bind(student.total_points)
        .bind(student.streak_days)
        .bind(student.level)
        .bind(achievements)
        .bind(student.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(student_row2schema(row))
    }

    async fn update_student(&self, id: i64, patch: StudentPatch) -> Result<Student, StoreError> {
        let current = self
            .get_student(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Student not found"))?;
        let updated = merge_student(&current, patch)?;
        if updated.username != current.username && self.username_taken(&updated.username).await? {
            return Err(StoreError::conflict(format!(
                "username '{}' is already taken",
                updated.username
            )));
        }
        self.write_student(&updated).await?;
        Ok(updated)
    }

    async fn get_all_courses(&self) -> Result<Vec<Course>, StoreError> {
        let rows =
            sqlx::query_as::<_, CourseRow>("SELECT * FROM courses ORDER BY week_number ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(course_row2schema).collect())
    }

    async fn get_course(&self, id: i64) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query_as::<_, CourseRow>("SELECT * FROM courses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(course_row2schema))
    }

    async fn create_course(&self, new: NewCourse) -> Result<Course, StoreError> {
        let course = build_course(new)?;
        let existing = sqlx::query_as::<_, CourseRow>("SELECT * FROM courses WHERE week_number = ?")
            .bind(course.week_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Err(StoreError::conflict(format!(
                "a course for week {} already exists",
                course.week_number
            )));
        }
        let row = sqlx::query_as::<_, CourseRow>(
            "INSERT INTO courses(title, description, week_number, total_lessons, is_locked) \
             VALUES (?,?,?,?,?) RETURNING *",
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.week_number)
        .bind(course.total_lessons)
        .bind(course.is_locked)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(course_row2schema(row))
    }

    async fn get_lessons_by_course(&self, course_id: i64) -> Result<Vec<Lesson>, StoreError> {
        let rows = sqlx::query_as::<_, LessonRow>(
            "SELECT * FROM lessons WHERE course_id = ? ORDER BY lesson_number ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(lesson_row2schema).collect())
    }

    async fn get_lesson(&self, id: i64) -> Result<Option<Lesson>, StoreError> {
        let row = sqlx::query_as::<_, LessonRow>("SELECT * FROM lessons WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(lesson_row2schema))
    }

    async fn create_lesson(&self, new: NewLesson) -> Result<Lesson, StoreError> {
        let lesson = build_lesson(new)?;
        if self.get_course(lesson.course_id).await?.is_none() {
            return Err(StoreError::bad_request("unknown course"));
        }
        let existing = sqlx::query_as::<_, LessonRow>(
            "SELECT * FROM lessons WHERE course_id = ? AND lesson_number = ?",
        )
        .bind(lesson.course_id)
        .bind(lesson.lesson_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        if existing.is_some() {
            return Err(StoreError::conflict(format!(
                "lesson {} already exists in this course",
                lesson.lesson_number
            )));
        }
        let row = sqlx::query_as::<_, LessonRow>(
            "INSERT INTO lessons(course_id, title, description, content, sample_code, \
             expected_output, lesson_number, points) VALUES (?,?,?,?,?,?,?,?) RETURNING *",
        )
        .bind(lesson.course_id)
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(&lesson.content)
        .bind(&lesson.sample_code)
        .bind(&lesson.expected_output)
        .bind(lesson.lesson_number)
        .bind(lesson.points)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(lesson_row2schema(row))
    }

    async fn get_student_progress(&self, student_id: i64) -> Result<Vec<Progress>, StoreError> {
        let rows = sqlx::query_as::<_, ProgressRow>("SELECT * FROM progress WHERE student_id = ?")
            .bind(student_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(progress_row2schema).collect())
    }

    async fn get_student_course_progress(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Vec<Progress>, StoreError> {
        let rows = sqlx::query_as::<_, ProgressRow>(
            "SELECT * FROM progress WHERE student_id = ? AND course_id = ?",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(progress_row2schema).collect())
    }

    async fn create_progress(&self, new: NewProgress) -> Result<Progress, StoreError> {
        let record = build_progress(new)?;
        if self.get_student(record.student_id).await?.is_none() {
            return Err(StoreError::bad_request("unknown student"));
        }
        if self.get_course(record.course_id).await?.is_none() {
            return Err(StoreError::bad_request("unknown course"));
        }
        if let Some(lesson_id) = record.lesson_id {
            if self.get_lesson(lesson_id).await?.is_none() {
                return Err(StoreError::bad_request("unknown lesson"));
            }
            let existing = sqlx::query_as::<_, ProgressRow>(
                "SELECT * FROM progress WHERE student_id = ? AND lesson_id = ?",
            )
            .bind(record.student_id)
            .bind(lesson_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
            if existing.is_some() {
                return Err(StoreError::conflict(
                    "progress for this lesson is already recorded",
                ));
            }
        }
        let row = sqlx::query_as::<_, ProgressRow>(
            "INSERT INTO progress(student_id, course_id, lesson_id, completed, completed_at, \
             code_submitted) VALUES (?,?,?,?,?,?) RETURNING *",
        )
        .bind(record.student_id)
        .bind(record.course_id)
        .bind(record.lesson_id)
        .bind(record.completed)
        .bind(record.completed_at)
        .bind(&record.code_submitted)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(progress_row2schema(row))
    }

    async fn update_progress(
        &self,
        id: i64,
        patch: ProgressPatch,
    ) -> Result<Progress, StoreError> {
        let row = sqlx::query_as::<_, ProgressRow>("SELECT * FROM progress WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        let current = row
            .map(progress_row2schema)
            .ok_or_else(|| StoreError::not_found("Progress not found"))?;
        let updated = merge_progress(&current, patch);
        sqlx::query(
            "UPDATE progress SET completed = ?, completed_at = ?, code_submitted = ? WHERE id = ?",
        )
        .bind(updated.completed)
        .bind(updated.completed_at)
        .bind(&updated.code_submitted)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(updated)
    }

    async fn get_all_challenges(&self) -> Result<Vec<Challenge>, StoreError> {
        let rows = sqlx::query_as::<_, ChallengeRow>("SELECT * FROM challenges")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(challenge_row2schema).collect())
    }

    async fn get_daily_challenge(&self) -> Result<Option<Challenge>, StoreError> {
        let row = sqlx::query_as::<_, ChallengeRow>("SELECT * FROM challenges WHERE is_daily = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(challenge_row2schema))
    }

    async fn create_challenge(&self, new: NewChallenge) -> Result<Challenge, StoreError> {
        let challenge = build_challenge(new)?;
        if challenge.is_daily && self.get_daily_challenge().await?.is_some() {
            return Err(StoreError::conflict("a daily challenge already exists"));
        }
        let row = sqlx::query_as::<_, ChallengeRow>(
            "INSERT INTO challenges(title, description, difficulty, points, sample_code, \
             solution, is_daily) VALUES (?,?,?,?,?,?,?) RETURNING *",
        )
        .bind(&challenge.title)
        .bind(&challenge.description)
        .bind(&challenge.difficulty)
        .bind(challenge.points)
        .bind(&challenge.sample_code)
        .bind(&challenge.solution)
        .bind(challenge.is_daily)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(challenge_row2schema(row))
    }

    async fn get_all_achievements(&self) -> Result<Vec<Achievement>, StoreError> {
        let rows = sqlx::query_as::<_, AchievementRow>("SELECT * FROM achievements")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(achievement_row2schema).collect())
    }

    async fn create_achievement(&self, new: NewAchievement) -> Result<Achievement, StoreError> {
        let achievement = build_achievement(new)?;
        let row = sqlx::query_as::<_, AchievementRow>(
            "INSERT INTO achievements(name, description, icon, points, condition) \
             VALUES (?,?,?,?,?) RETURNING *",
        )
        .bind(&achievement.name)
        .bind(&achievement.description)
        .bind(&achievement.icon)
        .bind(achievement.points)
        .bind(&achievement.condition)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(achievement_row2schema(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NewProgress, NewStudent, ProgressPatch};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn fresh_store() -> SqliteStorage {
        // a single connection keeps the in-memory database alive for the test
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        SqliteStorage::from_pool(pool)
    }

    #[actix_rt::test]
    async fn migration_runs() {
        let _ = fresh_store().await;
    }

    #[actix_rt::test]
    async fn seed_and_read_back() {
        let store = fresh_store().await;
        crate::seed::load(&store).await.unwrap();

        let alex = store
            .get_student_by_username("alex_kim")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alex.current_week, 3);
        assert_eq!(
            alex.achievements,
            vec!["first_steps", "variable_master", "decision_maker"]
        );

        let courses = store.get_all_courses().await.unwrap();
        assert_eq!(courses.len(), 12);
        assert_eq!(courses[0].week_number, 1);

        let lessons = store.get_lessons_by_course(courses[0].id).await.unwrap();
        assert_eq!(lessons.len(), 3);
        assert_eq!(lessons[0].lesson_number, 1);

        let daily = store.get_daily_challenge().await.unwrap().unwrap();
        assert_eq!(daily.title, "Age Group Classifier");
    }

    #[actix_rt::test]
    async fn progress_update_stamps_completed_at() {
        let store = fresh_store().await;
        crate::seed::load(&store).await.unwrap();

        let alex = store
            .get_student_by_username("alex_kim")
            .await
            .unwrap()
            .unwrap();
        let open = store
            .get_student_progress(alex.id)
            .await
            .unwrap()
            .into_iter()
            .find(|p| !p.completed)
            .unwrap();
        assert_eq!(open.completed_at, None);

        let updated = store
            .update_progress(
                open.id,
                ProgressPatch {
                    completed: Some(true),
                    code_submitted: Some("print(\"done\")".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(updated.completed);
        assert!(updated.completed_at.is_some());
    }

    #[actix_rt::test]
    async fn duplicate_username_is_a_conflict() {
        let store = fresh_store().await;
        crate::seed::load(&store).await.unwrap();
        let dup = store
            .create_student(NewStudent {
                name: "Other".to_string(),
                username: "alex_kim".to_string(),
                current_week: None,
                total_points: None,
                streak_days: None,
                level: None,
                achievements: None,
            })
            .await;
        assert!(matches!(dup, Err(StoreError::Conflict { .. })));
    }

    #[actix_rt::test]
    async fn duplicate_lesson_progress_is_a_conflict() {
        let store = fresh_store().await;
        crate::seed::load(&store).await.unwrap();
        let dup = store
            .create_progress(NewProgress {
                student_id: 1,
                course_id: 1,
                lesson_id: Some(1),
                completed: None,
                code_submitted: None,
            })
            .await;
        assert!(matches!(dup, Err(StoreError::Conflict { .. })));
    }
}
