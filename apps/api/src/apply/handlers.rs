use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::apply::form::{check_cv, read_multipart};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/apply
///
/// Steps short-circuit in order: origin check, field validation, CV gate,
/// reCAPTCHA, persistence. Nothing is written on any rejection path.
pub async fn handle_apply(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    // Same-origin script marker. Plain cross-site form posts cannot set this
    // header, so its absence means the request did not come from our client.
    let xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok());
    if xhr != Some("XMLHttpRequest") {
        return Err(AppError::Unauthorized);
    }

    let (form, cv) = read_multipart(multipart).await?;
    form.validate()?;

    let Some(cv) = cv.filter(|c| !c.data.is_empty()) else {
        return Err(AppError::Validation("CV is required".to_string()));
    };
    let ext = check_cv(&cv)?;

    let enforce = state.config.runtime_mode.enforces_recaptcha();
    match state.verifier.verify(&form.recaptcha_token).await {
        Ok(true) => {}
        Ok(false) if enforce => return Err(AppError::RecaptchaRejected),
        Err(e) if enforce => {
            warn!("reCAPTCHA verification call failed: {e}");
            return Err(AppError::RecaptchaRejected);
        }
        Ok(false) => warn!("reCAPTCHA rejected token (not enforced in this mode)"),
        Err(e) => warn!("reCAPTCHA verification call failed (not enforced in this mode): {e}"),
    }

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown".to_string());

    let saved = state.store.save(&form, &cv, &ext, user_agent, ip).await?;
    info!(cv = %saved.cv_filename, record = %saved.record_filename, "application stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Application submitted successfully" })),
    ))
}

/// GET /api/apply/config
///
/// Exposes the public site key so the client-side challenge widget can
/// bootstrap without baking the key into the page.
pub async fn handle_widget_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "recaptchaSiteKey": state.config.recaptcha_site_key }))
}
