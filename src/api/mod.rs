//! Thin HTTP boundary: every route maps to one storage/engine call, bodies
//! are parsed against the creation schemas and storage failures are
//! translated to status codes here and nowhere else. Progress and student
//! mutations are followed by a derived-state sync so week advancement and
//! achievement grants never lag behind the stored records.

use crate::progress;
use crate::run::{CodeRunner, PrintSimulator, RunRequest};
use crate::schema::{NewProgress, NewStudent, ProgressPatch, StudentPatch};
use crate::storage::{StoreError, Storage};
use crate::{BadRequest, Conflict, InternalServer, NotFound};
use actix_web::{web, HttpResponse};
use log::error;

pub fn config<S: Storage + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/students", web::post().to(create_student::<S>))
            .route(
                "/students/username/{username}",
                web::get().to(get_student_by_username::<S>),
            )
            .route("/students/{id}", web::get().to(get_student::<S>))
            .route("/students/{id}", web::patch().to(update_student::<S>))
            .route(
                "/students/{id}/overview",
                web::get().to(get_student_overview::<S>),
            )
            .route(
                "/students/{id}/progress",
                web::get().to(get_student_progress::<S>),
            )
            .route(
                "/students/{id}/courses/{courseId}/progress",
                web::get().to(get_student_course_progress::<S>),
            )
            .route("/courses", web::get().to(get_all_courses::<S>))
            .route("/courses/{id}", web::get().to(get_course::<S>))
            .route(
                "/courses/{id}/lessons",
                web::get().to(get_lessons_by_course::<S>),
            )
            .route("/lessons/{id}", web::get().to(get_lesson::<S>))
            .route("/progress", web::post().to(create_progress::<S>))
            .route("/progress/{id}", web::patch().to(update_progress::<S>))
            .route("/challenges", web::get().to(get_all_challenges::<S>))
            .route("/challenges/daily", web::get().to(get_daily_challenge::<S>))
            .route("/achievements", web::get().to(get_all_achievements::<S>))
            .route("/execute", web::post().to(execute_code)),
    );
}

/// The only place store errors become status codes. Internal detail is
/// logged, the client gets a generic message.
fn store_error(e: StoreError) -> HttpResponse {
    match e {
        StoreError::NotFound { message } => NotFound!(message),
        StoreError::Conflict { message } => Conflict!(message),
        StoreError::BadRequest { message } => BadRequest!(message),
        StoreError::Internal { message } => {
            error!("storage failure: {}", message);
            InternalServer!("Internal server error")
        }
    }
}

async fn get_student<S: Storage>(store: web::Data<S>, path: web::Path<i64>) -> HttpResponse {
    match store.get_student(path.into_inner()).await {
        Ok(Some(student)) => HttpResponse::Ok().json(student),
        Ok(None) => NotFound!("Student not found"),
        Err(e) => store_error(e),
    }
}

async fn get_student_by_username<S: Storage>(
    store: web::Data<S>,
    path: web::Path<String>,
) -> HttpResponse {
    match store.get_student_by_username(&path.into_inner()).await {
        Ok(Some(student)) => HttpResponse::Ok().json(student),
        Ok(None) => NotFound!("Student not found"),
        Err(e) => store_error(e),
    }
}

async fn create_student<S: Storage>(
    store: web::Data<S>,
    body: web::Json<NewStudent>,
) -> HttpResponse {
    match store.create_student(body.into_inner()).await {
        Ok(student) => HttpResponse::Created().json(student),
        Err(e) => store_error(e),
    }
}

async fn update_student<S: Storage>(
    store: web::Data<S>,
    path: web::Path<i64>,
    body: web::Json<StudentPatch>,
) -> HttpResponse {
    let id = path.into_inner();
    if let Err(e) = store.update_student(id, body.into_inner()).await {
        return store_error(e);
    }
    // the patch may have unlocked achievements (e.g. a week bump)
    match progress::sync_student(store.get_ref(), id).await {
        Ok(student) => HttpResponse::Ok().json(student),
        Err(e) => store_error(e),
    }
}

async fn get_student_overview<S: Storage>(
    store: web::Data<S>,
    path: web::Path<i64>,
) -> HttpResponse {
    match progress::student_overview(store.get_ref(), path.into_inner()).await {
        Ok(overview) => HttpResponse::Ok().json(overview),
        Err(e) => store_error(e),
    }
}

async fn get_all_courses<S: Storage>(store: web::Data<S>) -> HttpResponse {
    match store.get_all_courses().await {
        Ok(courses) => HttpResponse::Ok().json(courses),
        Err(e) => store_error(e),
    }
}

async fn get_course<S: Storage>(store: web::Data<S>, path: web::Path<i64>) -> HttpResponse {
    match store.get_course(path.into_inner()).await {
        Ok(Some(course)) => HttpResponse::Ok().json(course),
        Ok(None) => NotFound!("Course not found"),
        Err(e) => store_error(e),
    }
}

async fn get_lessons_by_course<S: Storage>(
    store: web::Data<S>,
    path: web::Path<i64>,
) -> HttpResponse {
    match store.get_lessons_by_course(path.into_inner()).await {
        Ok(lessons) => HttpResponse::Ok().json(lessons),
        Err(e) => store_error(e),
    }
}

async fn get_lesson<S: Storage>(store: web::Data<S>, path: web::Path<i64>) -> HttpResponse {
    match store.get_lesson(path.into_inner()).await {
        Ok(Some(lesson)) => HttpResponse::Ok().json(lesson),
        Ok(None) => NotFound!("Lesson not found"),
        Err(e) => store_error(e),
    }
}

async fn get_student_progress<S: Storage>(
    store: web::Data<S>,
    path: web::Path<i64>,
) -> HttpResponse {
    match store.get_student_progress(path.into_inner()).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => store_error(e),
    }
}

async fn get_student_course_progress<S: Storage>(
    store: web::Data<S>,
    path: web::Path<(i64, i64)>,
) -> HttpResponse {
    let (student_id, course_id) = path.into_inner();
    match store
        .get_student_course_progress(student_id, course_id)
        .await
    {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => store_error(e),
    }
}

async fn create_progress<S: Storage>(
    store: web::Data<S>,
    body: web::Json<NewProgress>,
) -> HttpResponse {
    let record = match store.create_progress(body.into_inner()).await {
        Ok(record) => record,
        Err(e) => return store_error(e),
    };
    match progress::sync_student(store.get_ref(), record.student_id).await {
        Ok(_) => HttpResponse::Created().json(record),
        Err(e) => store_error(e),
    }
}

async fn update_progress<S: Storage>(
    store: web::Data<S>,
    path: web::Path<i64>,
    body: web::Json<ProgressPatch>,
) -> HttpResponse {
    let record = match store.update_progress(path.into_inner(), body.into_inner()).await {
        Ok(record) => record,
        Err(e) => return store_error(e),
    };
    match progress::sync_student(store.get_ref(), record.student_id).await {
        Ok(_) => HttpResponse::Ok().json(record),
        Err(e) => store_error(e),
    }
}

async fn get_all_challenges<S: Storage>(store: web::Data<S>) -> HttpResponse {
    match store.get_all_challenges().await {
        Ok(challenges) => HttpResponse::Ok().json(challenges),
        Err(e) => store_error(e),
    }
}

async fn get_daily_challenge<S: Storage>(store: web::Data<S>) -> HttpResponse {
    match store.get_daily_challenge().await {
        Ok(Some(challenge)) => HttpResponse::Ok().json(challenge),
        Ok(None) => NotFound!("No daily challenge found"),
        Err(e) => store_error(e),
    }
}

async fn get_all_achievements<S: Storage>(store: web::Data<S>) -> HttpResponse {
    match store.get_all_achievements().await {
        Ok(achievements) => HttpResponse::Ok().json(achievements),
        Err(e) => store_error(e),
    }
}

async fn execute_code(body: web::Json<RunRequest>) -> HttpResponse {
    HttpResponse::Ok().json(PrintSimulator.run(&body.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Challenge, Course, Lesson, Progress, Student};
    use crate::storage::mem::MemStorage;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    macro_rules! seeded_app {
        () => {{
            let store = MemStorage::new();
            crate::seed::load(&store).await.unwrap();
            test::init_service(
                App::new()
                    .app_data(web::Data::new(store))
                    .configure(config::<MemStorage>),
            )
            .await
        }};
    }

    #[actix_rt::test]
    async fn student_lookup_by_id_and_username() {
        let app = seeded_app!();

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/students/1").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let student: Student = test::read_body_json(resp).await;
        assert_eq!(student.username, "alex_kim");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/students/username/alex_kim")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/students/99").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn creating_a_student_applies_defaults() {
        let app = seeded_app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/students")
                .set_json(serde_json::json!({"name": "Mia", "username": "mia"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let student: Student = test::read_body_json(resp).await;
        assert_eq!(student.current_week, 1);
        assert_eq!(student.level, 1);

        // a second student with the same username is rejected
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/students")
                .set_json(serde_json::json!({"name": "Other", "username": "mia"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // missing required field fails schema parsing
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/students")
                .set_json(serde_json::json!({"name": "No Username"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn current_week_cannot_move_backwards() {
        let app = seeded_app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri("/api/students/1")
                .set_json(serde_json::json!({"currentWeek": 2}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn courses_and_lessons_come_back_ordered() {
        let app = seeded_app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/courses").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let courses: Vec<Course> = test::read_body_json(resp).await;
        assert_eq!(courses.len(), 12);
        assert!(courses.windows(2).all(|w| w[0].week_number < w[1].week_number));

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/courses/1/lessons")
                .to_request(),
        )
        .await;
        let lessons: Vec<Lesson> = test::read_body_json(resp).await;
        assert_eq!(lessons.len(), 3);
        assert!(lessons.windows(2).all(|w| w[0].lesson_number < w[1].lesson_number));

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/courses/99").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn progress_listing_and_patching() {
        let app = seeded_app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/students/1/progress")
                .to_request(),
        )
        .await;
        let records: Vec<Progress> = test::read_body_json(resp).await;
        assert_eq!(records.len(), 4);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/students/1/courses/1/progress")
                .to_request(),
        )
        .await;
        let records: Vec<Progress> = test::read_body_json(resp).await;
        assert_eq!(records.len(), 2);

        let open = records.iter().find(|r| !r.completed);
        assert!(open.is_none(), "course 1 fixtures are all completed");

        let resp = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri("/api/progress/4")
                .set_json(serde_json::json!({"completed": true}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let record: Progress = test::read_body_json(resp).await;
        assert!(record.completed);
        assert!(record.completed_at.is_some());
    }

    #[actix_rt::test]
    async fn duplicate_lesson_progress_is_rejected() {
        let app = seeded_app!();
        let body = serde_json::json!({
            "studentId": 1,
            "courseId": 1,
            "lessonId": 3,
            "completed": true,
            "codeSubmitted": "print(\"Python is awesome!\")"
        });
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/progress")
                .set_json(body.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/progress")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_rt::test]
    async fn challenges_and_achievements() {
        let app = seeded_app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/challenges").to_request(),
        )
        .await;
        let challenges: Vec<Challenge> = test::read_body_json(resp).await;
        assert_eq!(challenges.len(), 2);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/challenges/daily")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let daily: Challenge = test::read_body_json(resp).await;
        assert!(daily.is_daily);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/achievements").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn overview_reports_derived_state() {
        let app = seeded_app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/students/1/overview")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let overview: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(overview["overallProgress"], 17);
        assert_eq!(overview["courses"][0]["standing"], "completed");
        assert_eq!(overview["courses"][2]["standing"], "current");
        assert_eq!(overview["courses"][11]["standing"], "locked");
    }

    #[actix_rt::test]
    async fn execute_echoes_print_output() {
        let app = seeded_app!();
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/execute")
                .set_json(serde_json::json!({"code": "print(\"Hello, World!\")"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let result: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(result["output"], "Hello, World!");
        assert_eq!(result["hasError"], false);
    }
}
