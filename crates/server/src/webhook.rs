use std::sync::Arc;

use aseobi_core::signature::{self, SIGNATURE_HEADER};
use aseobi_core::{ApplicationError, InterfaceError};
use aseobi_whatsapp::events::EventContext;
use aseobi_whatsapp::processor::{ProcessOutcome, WebhookProcessor};
use aseobi_whatsapp::verify::verify;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, warn};

pub const WEBHOOK_PATH: &str = "/whatsapp/webhook";
const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct WebhookState {
    processor: Arc<WebhookProcessor>,
    verify_token: SecretString,
    app_secret: Option<SecretString>,
}

impl WebhookState {
    pub fn new(
        processor: Arc<WebhookProcessor>,
        verify_token: SecretString,
        app_secret: Option<SecretString>,
    ) -> Self {
        Self { processor, verify_token, app_secret }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct VerificationQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
}

/// Plain-text error body with a status matching the interface error class.
struct ErrorResponse(InterfaceError);

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            InterfaceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        };

        (
            status,
            [(CORRELATION_HEADER, self.0.correlation_id().to_owned())],
            self.0.user_message(),
        )
            .into_response()
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route(WEBHOOK_PATH, get(verify_subscription).post(receive_delivery))
        .with_state(state)
}

async fn verify_subscription(
    State(state): State<WebhookState>,
    Query(query): Query<VerificationQuery>,
) -> Response {
    let context = EventContext::generate();

    match verify(
        query.mode.as_deref(),
        query.challenge.as_deref(),
        query.verify_token.as_deref(),
        state.verify_token.expose_secret(),
    ) {
        Ok(challenge) => {
            info!(
                event_name = "whatsapp.webhook.verified",
                correlation_id = %context.correlation_id,
                "webhook subscription verified"
            );
            (StatusCode::OK, challenge).into_response()
        }
        Err(error) => {
            warn!(
                event_name = "whatsapp.webhook.verification_failed",
                correlation_id = %context.correlation_id,
                error = %error,
                "webhook subscription verification rejected"
            );
            ErrorResponse(
                ApplicationError::Verification(error.to_string())
                    .into_interface(context.correlation_id),
            )
            .into_response()
        }
    }
}

async fn receive_delivery(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let context = EventContext::generate();

    if let Some(secret) = &state.app_secret {
        let provided = headers.get(SIGNATURE_HEADER).and_then(|value| value.to_str().ok());
        if let Err(error) = signature::verify(secret.expose_secret().as_bytes(), &body, provided) {
            warn!(
                event_name = "whatsapp.webhook.signature_rejected",
                correlation_id = %context.correlation_id,
                error = %error,
                "webhook delivery signature rejected"
            );
            let interface = ApplicationError::from(error).into_interface(context.correlation_id);
            return ErrorResponse(interface).into_response();
        }
    }

    match state.processor.process_body(&body, &context).await {
        Ok(outcome) => {
            if let ProcessOutcome::Dispatched { outcome, .. } = &outcome {
                if !outcome.is_complete() {
                    // Partial plans are acknowledged; nothing is resent.
                    warn!(
                        event_name = "whatsapp.webhook.partially_delivered",
                        correlation_id = %context.correlation_id,
                        delivered = outcome.delivered(),
                        "webhook acknowledged after partial delivery"
                    );
                }
            }
            StatusCode::OK.into_response()
        }
        Err(error) => {
            warn!(
                event_name = "whatsapp.webhook.malformed",
                correlation_id = %context.correlation_id,
                error = %error,
                "webhook delivery could not be processed"
            );
            ErrorResponse(error.into_interface(context.correlation_id)).into_response()
        }
    }
}
