use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use folio_core_contact_contracts::{ContactSendMessageError, ContactService};
use folio_models::contact::{ContactFormFields, ContactMessage};
use folio_ratelimit_contracts::{RateLimitDecision, RateLimitService};
use tracing::debug;

use super::{error, internal_server_error};
use crate::{
    middlewares::client_ip::ClientIp,
    models::contact::{ApiConfirmation, ApiValidationErrors, MESSAGE_SENT, RATE_LIMITED, SEND_FAILED},
};

pub struct ContactState<Contact, RateLimit> {
    pub contact: Contact,
    pub rate_limit: RateLimit,
}

pub fn router(
    state: Arc<ContactState<impl ContactService, impl RateLimitService>>,
) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(send_message))
        .with_state(state)
}

async fn send_message(
    state: State<Arc<ContactState<impl ContactService, impl RateLimitService>>>,
    Extension(client_ip): Extension<ClientIp>,
    Json(form): Json<ContactFormFields>,
) -> Response {
    // Admission control runs before any validation or email work, so
    // over-quota requests never count toward the transport's own limits.
    match state.rate_limit.check(client_ip.0).await {
        Ok(RateLimitDecision::Allowed { .. }) => {}
        Ok(RateLimitDecision::Limited { retry_after }) => {
            debug!(client_ip = %client_ip.0, ?retry_after, "contact form rate limited");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.as_secs().to_string())],
                Json(ApiConfirmation {
                    message: RATE_LIMITED,
                }),
            )
                .into_response();
        }
        Err(err) => return internal_server_error(err),
    }

    let message = match ContactMessage::validate(&form) {
        Ok(message) => message,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiValidationErrors { errors }),
            )
                .into_response();
        }
    };

    match state.contact.send_message(message).await {
        Ok(()) => Json(ApiConfirmation {
            message: MESSAGE_SENT,
        })
        .into_response(),
        Err(ContactSendMessageError::Send) => error(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED),
        Err(ContactSendMessageError::Other(err)) => internal_server_error(err),
    }
}

#[cfg(test)]
mod tests {
    use std::{net::IpAddr, time::Duration};

    use axum::body::Body;
    use folio_core_contact_contracts::MockContactService;
    use folio_models::contact::{ContactMessageAuthor, EMAIL_ERROR, MESSAGE_LENGTH_ERROR};
    use folio_ratelimit_contracts::MockRateLimitService;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    const ORIGIN: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(203, 0, 113, 7));

    fn valid_form() -> serde_json::Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "subject": "Hello",
            "message": "This is a test message.",
        })
    }

    fn valid_message() -> ContactMessage {
        ContactMessage {
            author: ContactMessageAuthor {
                name: "Jane Doe".try_into().unwrap(),
                email: "jane@example.com".parse().unwrap(),
            },
            subject: "Hello".try_into().unwrap(),
            content: "This is a test message.".try_into().unwrap(),
        }
    }

    async fn request(
        contact: MockContactService,
        rate_limit: MockRateLimitService,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let router = router(Arc::new(ContactState {
            contact,
            rate_limit,
        }));

        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/api/contact")
                    .header(header::CONTENT_TYPE, "application/json")
                    .extension(ClientIp(ORIGIN))
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn valid_submission() {
        // Arrange
        let contact = MockContactService::new().with_send_message(valid_message(), Ok(()));
        let rate_limit = MockRateLimitService::new()
            .with_check(ORIGIN, RateLimitDecision::Allowed { remaining: 4 });

        // Act
        let (status, body) = request(contact, rate_limit, valid_form()).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Message sent successfully"}));
    }

    #[tokio::test]
    async fn invalid_email() {
        // Arrange
        let contact = MockContactService::new();
        let rate_limit = MockRateLimitService::new()
            .with_check(ORIGIN, RateLimitDecision::Allowed { remaining: 4 });
        let mut form = valid_form();
        form["email"] = "not-an-email".into();

        // Act
        let (status, body) = request(contact, rate_limit, form).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"errors": [{"param": "email", "msg": EMAIL_ERROR}]})
        );
    }

    #[tokio::test]
    async fn all_field_errors_reported() {
        // Arrange
        let contact = MockContactService::new();
        let rate_limit = MockRateLimitService::new()
            .with_check(ORIGIN, RateLimitDecision::Allowed { remaining: 4 });
        let mut form = valid_form();
        form["email"] = "not-an-email".into();
        form["message"] = "hi".into();

        // Act
        let (status, body) = request(contact, rate_limit, form).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"errors": [
                {"param": "email", "msg": EMAIL_ERROR},
                {"param": "message", "msg": MESSAGE_LENGTH_ERROR},
            ]})
        );
    }

    #[tokio::test]
    async fn rate_limited_before_validation_and_dispatch() {
        // Arrange: the contact service has no expectations, so any email
        // work would fail the test; the payload is even invalid.
        let contact = MockContactService::new();
        let rate_limit = MockRateLimitService::new().with_check(
            ORIGIN,
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(600),
            },
        );
        let mut form = valid_form();
        form["message"] = "hi".into();

        // Act
        let (status, body) = request(contact, rate_limit, form).await;

        // Assert
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body,
            json!({"message": "Too many contact requests, please try again later"})
        );
    }

    #[tokio::test]
    async fn transport_failure() {
        // Arrange
        let contact = MockContactService::new()
            .with_send_message(valid_message(), Err(ContactSendMessageError::Send));
        let rate_limit = MockRateLimitService::new()
            .with_check(ORIGIN, RateLimitDecision::Allowed { remaining: 4 });

        // Act
        let (status, body) = request(contact, rate_limit, valid_form()).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to send message"}));
    }

    #[tokio::test]
    async fn internal_error_is_not_leaked() {
        // Arrange
        let contact = MockContactService::new().with_send_message(
            valid_message(),
            Err(anyhow::anyhow!("smtp auth rejected for user x").into()),
        );
        let rate_limit = MockRateLimitService::new()
            .with_check(ORIGIN, RateLimitDecision::Allowed { remaining: 4 });

        // Act
        let (status, body) = request(contact, rate_limit, valid_form()).await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }
}
