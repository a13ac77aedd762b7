//! Just a few helper macros for Http Responses

/**
 * Returns a HttpResponse with the message attached as json body:
 * ```rust,ignore
 *  NotFound!("Student not found")
 * ```
 *
 * Possible are:
 * - NotFound
 * - Conflict
 * - BadRequest
 * - InternalServer
 */
#[macro_use]
pub mod res {
    #[macro_export]
    macro_rules! NotFound{
        ($message:expr) => {
            HttpResponse::NotFound().json(serde_json::json!({"message": $message}))
        };
    }
    #[macro_export]
    macro_rules! Conflict{
        ($message:expr) => {
            HttpResponse::Conflict().json(serde_json::json!({"message": $message}))
        };
    }
    #[macro_export]
    macro_rules! BadRequest{
        ($message:expr) => {
            HttpResponse::BadRequest().json(serde_json::json!({"message": $message}))
        };
    }
    #[macro_export]
    macro_rules! InternalServer{
        ($message:expr) => {
            HttpResponse::InternalServerError().json(serde_json::json!({"message": $message}))
        };
    }
}
