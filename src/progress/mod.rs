//! Derived progress state. Lock state, completion percentages and
//! achievement eligibility are never stored, they are recomputed here from
//! the student's progress records. Apart from [`sync_student`], which writes
//! the re-derived week and achievement grants back through the store,
//! everything in this module is a pure function of its inputs.

use crate::schema::{Achievement, Course, Lesson, Progress, Student, StudentPatch};
use crate::storage::{StoreError, Storage};
use log::{debug, info};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// Fixed curriculum length. `current_week` of 13 means the course plan is
/// finished.
pub const TOTAL_WEEKS: i64 = 12;

/// Where a course sits for a given student. Exactly one variant applies to
/// every (course, student) pair.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    Completed,
    Current,
    Locked,
}

pub fn standing(course: &Course, student: &Student) -> Standing {
    if course.week_number < student.current_week {
        Standing::Completed
    } else if course.week_number == student.current_week {
        Standing::Current
    } else {
        Standing::Locked
    }
}

/// Curriculum completion in percent, rounded half-up and clamped to 0..=100.
pub fn overall_progress(current_week: i64) -> i64 {
    let weeks_done = (current_week - 1).clamp(0, TOTAL_WEEKS);
    ((weeks_done * 100) as f64 / TOTAL_WEEKS as f64).round() as i64
}

/// Lesson-level completion of a single course, against its declared lesson
/// count. Completed courses report 100, locked ones 0.
pub fn course_percent(standing: Standing, course: &Course, progress: &[Progress]) -> i64 {
    match standing {
        Standing::Completed => 100,
        Standing::Locked => 0,
        Standing::Current => {
            if course.total_lessons <= 0 {
                return 0;
            }
            let done: HashSet<i64> = progress
                .iter()
                .filter(|p| p.course_id == course.id && p.completed)
                .filter_map(|p| p.lesson_id)
                .collect();
            let percent =
                ((done.len() as i64 * 100) as f64 / course.total_lessons as f64).round() as i64;
            percent.clamp(0, 100)
        }
    }
}

/// True when every stored lesson of the course has a completed record for
/// this student. A course without stored lessons never counts as complete.
pub fn course_complete(student_id: i64, lessons: &[Lesson], progress: &[Progress]) -> bool {
    !lessons.is_empty()
        && lessons.iter().all(|lesson| {
            progress.iter().any(|p| {
                p.student_id == student_id && p.lesson_id == Some(lesson.id) && p.completed
            })
        })
}

/// Aggregate stats the achievement conditions are evaluated against. The
/// code-derived counts are heuristics over the submitted source text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StudentStats {
    pub lessons_completed: usize,
    pub variables_created: usize,
    pub if_statements: usize,
    pub loops_created: usize,
    pub challenges_solved: usize,
    pub course_finished: bool,
}

fn count_assignments(code: &str) -> usize {
    let re = Regex::new(r"(?m)^\s*[A-Za-z_]\w*\s*=\s*[^=]").unwrap();
    re.find_iter(code).count()
}

fn count_keyword(code: &str, keyword: &str) -> usize {
    let re = Regex::new(&format!(r"\b{}\b", keyword)).unwrap();
    re.find_iter(code).count()
}

pub fn collect_stats(current_week: i64, progress: &[Progress]) -> StudentStats {
    let mut stats = StudentStats {
        course_finished: current_week > TOTAL_WEEKS,
        ..Default::default()
    };
    let mut lessons_done: HashSet<i64> = HashSet::new();
    for record in progress {
        if record.completed {
            match record.lesson_id {
                Some(lesson_id) => {
                    lessons_done.insert(lesson_id);
                }
                // completed course-level records are challenge solutions
                None => stats.challenges_solved += 1,
            }
        }
        if let Some(code) = &record.code_submitted {
            stats.variables_created += count_assignments(code);
            stats.if_statements += count_keyword(code, "if");
            stats.loops_created += count_keyword(code, "for") + count_keyword(code, "while");
        }
    }
    stats.lessons_completed = lessons_done.len();
    stats
}

/// Whether a condition key is satisfied. Unknown keys are never met.
pub fn condition_met(condition: &str, stats: &StudentStats) -> bool {
    match condition {
        "complete_first_lesson" => stats.lessons_completed >= 1,
        "create_10_variables" => stats.variables_created >= 10,
        "use_5_if_statements" => stats.if_statements >= 5,
        "create_first_loop" => stats.loops_created >= 1,
        "solve_10_challenges" => stats.challenges_solved >= 10,
        "complete_course" => stats.course_finished,
        _ => false,
    }
}

/// The code stored in a student's earned set: the snake_case slug of the
/// achievement name ("First Steps" -> "first_steps").
pub fn achievement_code(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() {
                '_'
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// Achievements the student qualifies for but has not earned yet.
pub fn newly_earned<'a>(
    student: &Student,
    catalog: &'a [Achievement],
    stats: &StudentStats,
) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| {
            !student.achievements.contains(&achievement_code(&a.name))
                && condition_met(&a.condition, stats)
        })
        .collect()
}

/// Re-derive a student's week and achievement grants after a progress or
/// student mutation and persist whatever changed. Idempotent: a second run
/// without new completions is a no-op. Business-rule edge cases are
/// well-defined results, only storage misses surface as errors.
pub async fn sync_student<S: Storage>(store: &S, student_id: i64) -> Result<Student, StoreError> {
    let student = store
        .get_student(student_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Student not found"))?;
    let progress = store.get_student_progress(student_id).await?;
    let courses = store.get_all_courses().await?;

    let mut week = student.current_week;
    while week <= TOTAL_WEEKS {
        let Some(course) = courses.iter().find(|c| c.week_number == week) else {
            break;
        };
        let lessons = store.get_lessons_by_course(course.id).await?;
        if !course_complete(student_id, &lessons, &progress) {
            break;
        }
        debug!("student {} finished week {}", student_id, week);
        week += 1;
    }

    let stats = collect_stats(week, &progress);
    let catalog = store.get_all_achievements().await?;
    let earned = newly_earned(&student, &catalog, &stats);

    if week == student.current_week && earned.is_empty() {
        return Ok(student);
    }

    let mut achievements = student.achievements.clone();
    let mut total_points = student.total_points;
    for achievement in &earned {
        info!(
            "student {} earned '{}' (+{} points)",
            student_id, achievement.name, achievement.points
        );
        achievements.push(achievement_code(&achievement.name));
        total_points += achievement.points;
    }

    store
        .update_student(
            student_id,
            StudentPatch {
                current_week: Some(week),
                total_points: Some(total_points),
                achievements: Some(achievements),
                ..Default::default()
            },
        )
        .await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStanding {
    #[serde(flatten)]
    pub course: Course,
    pub standing: Standing,
    pub percent_complete: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverview {
    pub student: Student,
    pub overall_progress: i64,
    pub courses: Vec<CourseStanding>,
}

/// The derived view the dashboard consumes: every course with its standing
/// and completion percentage plus the overall curriculum progress.
pub async fn student_overview<S: Storage>(
    store: &S,
    student_id: i64,
) -> Result<StudentOverview, StoreError> {
    let student = store
        .get_student(student_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Student not found"))?;
    let progress = store.get_student_progress(student_id).await?;
    let courses = store
        .get_all_courses()
        .await?
        .into_iter()
        .map(|course| {
            let standing = standing(&course, &student);
            let percent_complete = course_percent(standing, &course, &progress);
            CourseStanding {
                standing,
                percent_complete,
                course,
            }
        })
        .collect();

    Ok(StudentOverview {
        overall_progress: overall_progress(student.current_week),
        student,
        courses,
    })
}
