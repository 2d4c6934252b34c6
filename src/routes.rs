use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse, Responder, web};

use crate::runner::SubmissionRunner;
use crate::tasks::SubmissionTask;

/// `POST /api/v1/grader`: runs the whole grading pipeline synchronously.
///
/// The caller is a trusted internal service, so failures come back as a 500
/// with the raw error text and the caller applies its own timeout/retry
/// policy around the request.
pub async fn post_grader_handler(
    runner: web::Data<SubmissionRunner>,
    body: web::Json<SubmissionTask>,
) -> impl Responder {
    let task = body.into_inner();
    let submission_id = task.submission_id;
    log::info!("Received grading task for submission {submission_id}");

    match runner.run_submission(&task).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => {
            log::error!("Submission {submission_id} run failed: {e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().body(err.to_string());
    InternalError::from_response(err, response).into()
}
