use actix_web::{
    get,
    http::header::ContentType,
    post,
    web::{self, ServiceConfig},
    HttpResponse, Responder,
};
use tokio::task;
use tracing::{error, info};

use crate::app_state::AppState;
use crate::jobs::{run_email_job, WEB_OUTPUT_NAME};
use crate::params::{validate_form, MashupForm};

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// Every outcome is a 200 with a single plain-text line; callers read the
/// line, not the status code.
fn plain(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(body)
}

/// GET /
/// Renders the request form.
#[get("/")]
pub async fn form_page() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

/// POST /
/// Validates the form, then builds, zips and mails the mashup before
/// answering. The job blocks, so it runs on the blocking pool.
#[post("/")]
pub async fn submit(
    state: web::Data<AppState>,
    form: Option<web::Form<MashupForm>>,
) -> impl Responder {
    info!("POST / endpoint called");

    // 1) Validate before touching the filesystem or the network
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let job = match validate_form(&form, WEB_OUTPUT_NAME) {
        Ok(job) => job,
        Err(e) => {
            info!("Rejected form: {:?}", e);
            return plain(e.web_message().to_string());
        }
    };
    let recipient = job.recipient.to_string();

    // 2) Run the whole job to completion
    let state = state.into_inner();
    let result = task::spawn_blocking(move || {
        run_email_job(
            &state.workspace_root,
            &job,
            state.source.as_ref(),
            state.engine.as_ref(),
            state.mailer.as_ref(),
        )
    })
    .await;

    // 3) Report a single line either way
    match result {
        Ok(Ok(())) => {
            info!("Mashup sent to {}", recipient);
            plain(format!("SUCCESS: Mashup ZIP sent to {recipient}"))
        }
        Ok(Err(e)) => {
            error!("Mashup job for {} failed: {}", recipient, e);
            plain(format!("ERROR: {e}"))
        }
        Err(join_err) => {
            error!("Mashup job for {} panicked: {:?}", recipient, join_err);
            plain(format!("ERROR: {join_err}"))
        }
    }
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(form_page).service(submit);
}
