use axum::{extract::State, http::HeaderMap, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::notify::{Notification, RateDecision, RateRule};
use crate::state::AppState;

const MAX_EMAIL_LEN: usize = 254;

fn ip_rule() -> RateRule {
    RateRule {
        window: Duration::minutes(15),
        max: 3,
    }
}

fn email_rule() -> RateRule {
    RateRule {
        window: Duration::hours(1),
        max: 5,
    }
}

#[derive(Debug, Deserialize)]
pub struct DemoRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiringRequest {
    #[serde(default)]
    pub person_name: String,
    #[serde(default)]
    pub organisation: String,
    #[serde(default)]
    pub job_position: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRequest {
    #[serde(default)]
    pub referral_name: String,
    #[serde(default)]
    pub referral_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    pub success: bool,
    pub message: String,
    pub message_id: String,
}

/// First hop of `x-forwarded-for`, then `x-real-ip`, then loopback.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or("127.0.0.1")
        .to_string()
}

fn require_all(values: &[&str]) -> Result<(), AppError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }
    Ok(())
}

/// POST /api/v1/requests/demo
pub async fn handle_demo_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DemoRequest>,
) -> Result<Json<NotifyResponse>, AppError> {
    let email = req.email.trim();
    if !email.contains('@') || email.len() > MAX_EMAIL_LEN {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }

    let ip_key = format!("ip:{}", client_ip(&headers));
    let email_key = format!("email:{email}");
    let decision = state.rate_limits.hit_all(
        &[(ip_key.as_str(), ip_rule()), (email_key.as_str(), email_rule())],
        Utc::now(),
    );
    match decision {
        RateDecision::Allowed => {}
        RateDecision::Limited { check: 0 } => {
            return Err(AppError::RateLimited(
                "Too many requests from this IP. Please try again later.".to_string(),
            ))
        }
        RateDecision::Limited { .. } => {
            return Err(AppError::RateLimited(
                "This email has already requested multiple demos. Please contact us directly."
                    .to_string(),
            ))
        }
    }

    let message_id = state
        .notifier
        .send(Notification {
            to: state.config.notify_to.clone(),
            from: state.config.notify_from.clone(),
            reply_to: Some(email.to_string()),
            subject: format!("New Demo Request from {email}"),
            text: format!(
                "A new demo request was submitted.\n\nEmail: {email}\nRequested at: {}\n\nReply directly to: {email}",
                Utc::now().to_rfc3339()
            ),
        })
        .await?;

    state
        .notifier
        .send(Notification {
            to: email.to_string(),
            from: state.config.notify_from.clone(),
            reply_to: None,
            subject: "Your Fornix Demo Request - We'll be in touch soon!".to_string(),
            text: "Thanks for your interest in Fornix. Our team will reach out within 24 hours to schedule your demo.".to_string(),
        })
        .await?;

    info!(%message_id, "Demo request accepted");
    Ok(Json(NotifyResponse {
        success: true,
        message: "Demo request submitted successfully".to_string(),
        message_id,
    }))
}

/// POST /api/v1/requests/hiring
pub async fn handle_hiring_request(
    State(state): State<AppState>,
    Json(req): Json<HiringRequest>,
) -> Result<Json<NotifyResponse>, AppError> {
    require_all(&[
        &req.person_name,
        &req.organisation,
        &req.job_position,
        &req.description,
        &req.contact_email,
    ])?;

    let phone_line = req
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("Phone: {p}\n"))
        .unwrap_or_default();

    let message_id = state
        .notifier
        .send(Notification {
            to: state.config.notify_to.clone(),
            from: state.config.notify_from.clone(),
            reply_to: Some(req.contact_email.clone()),
            subject: format!(
                "New Hiring Request: {} at {}",
                req.job_position, req.organisation
            ),
            text: format!(
                "Contact Person: {}\nOrganization: {}\nEmail: {}\n{}Position: {}\n\nJob Description:\n{}",
                req.person_name,
                req.organisation,
                req.contact_email,
                phone_line,
                req.job_position,
                req.description
            ),
        })
        .await?;

    state
        .notifier
        .send(Notification {
            to: req.contact_email.clone(),
            from: state.config.notify_from.clone(),
            reply_to: None,
            subject: format!(
                "Your Hiring Request for {} has been received",
                req.job_position
            ),
            text: format!(
                "Hi {},\n\nThanks for submitting your hiring request for {} at {}. Our team will review it and get back to you shortly.",
                req.person_name, req.job_position, req.organisation
            ),
        })
        .await?;

    info!(%message_id, organisation = %req.organisation, "Hiring request accepted");
    Ok(Json(NotifyResponse {
        success: true,
        message: "Hiring request submitted successfully".to_string(),
        message_id,
    }))
}

/// POST /api/v1/referrals
pub async fn handle_referral(
    State(state): State<AppState>,
    Json(req): Json<ReferralRequest>,
) -> Result<Json<NotifyResponse>, AppError> {
    require_all(&[
        &req.referral_name,
        &req.referral_email,
        &req.user_name,
        &req.user_email,
    ])?;

    let message_id = state
        .notifier
        .send(Notification {
            to: req.referral_email.clone(),
            from: state.config.notify_from.clone(),
            reply_to: Some(req.user_email.clone()),
            subject: format!(
                "Professional Referral Notification - {} has listed you as a reference",
                req.user_name
            ),
            text: format!(
                "Dear {},\n\n{} ({}) has listed you as a professional reference on Fornix. You may be contacted by potential employers regarding their work.\n\nYou can reply to this message to reach {} directly.",
                req.referral_name, req.user_name, req.user_email, req.user_name
            ),
        })
        .await?;

    info!(%message_id, "Referral notice sent");
    Ok(Json(NotifyResponse {
        success: true,
        message: "Referral email sent successfully".to_string(),
        message_id,
    }))
}
