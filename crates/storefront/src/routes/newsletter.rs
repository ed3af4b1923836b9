//! Newsletter subscription route handlers.
//!
//! The footer form posts here. HTMX requests get an HTML fragment that
//! replaces the form; everything else gets the JSON envelope
//! `{subscriber, error}`. Both respond `200` so HTMX always swaps.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::services::newsletter::{SubscribeResponse, subscribe as subscribe_email};
use crate::state::AppState;

/// Newsletter subscription form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    #[serde(default)]
    pub email: String,
}

/// Success fragment template (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "newsletter/subscribe_success.html")]
pub struct SubscribeSuccessTemplate {
    pub email: String,
}

/// Error fragment template (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "newsletter/subscribe_error.html")]
pub struct SubscribeErrorTemplate {
    pub message: String,
    pub email: String,
}

/// Subscribe to the newsletter.
#[instrument(skip_all)]
pub async fn subscribe(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<SubscribeForm>,
) -> Response {
    add_breadcrumb("newsletter", "Submitted signup form", None);

    let result = subscribe_email(state.admin(), &session, &form.email, Utc::now()).await;

    if !is_htmx(&headers) {
        return Json(SubscribeResponse::from(result)).into_response();
    }

    match result {
        Ok(subscriber) => SubscribeSuccessTemplate {
            email: subscriber.email.unwrap_or_default(),
        }
        .into_response(),
        Err(err) => SubscribeErrorTemplate {
            message: err.message().to_string(),
            email: form.email.trim().to_string(),
        }
        .into_response(),
    }
}

/// The form only posts; a stray GET goes back to the home page.
pub async fn redirect_home() -> Redirect {
    Redirect::to("/")
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}
