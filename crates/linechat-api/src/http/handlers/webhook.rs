//! LINE webhook handler.
//!
//! POST /callback
//!
//! Verifies `X-Line-Signature` against the raw body, then spawns one
//! tracked task per text message event and returns `OK` immediately.
//! Each task runs the dispatcher and delivers the reply; failures there are
//! logged and never affect the webhook response.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use linechat_infra::line::{SIGNATURE_HEADER, SignatureError, verify_signature};
use linechat_types::line::WebhookPayload;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /callback - Receive a LINE webhook delivery.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::Missing)?;

    if let Err(e) = verify_signature(
        state.channel_secret.expose_secret().as_bytes(),
        &body,
        signature,
    ) {
        warn!(error = %e, "Rejected webhook delivery");
        return Err(e.into());
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Malformed webhook body: {e}")))?;

    let mut scheduled = 0usize;
    for event in &payload.events {
        let Some(message) = event.as_text_message() else {
            debug!(kind = %event.kind, "Ignoring webhook event");
            continue;
        };

        let task_state = state.clone();
        let user_id = message.user_id.to_string();
        let text = message.text.to_string();
        let reply_token = message.reply_token.to_string();

        state.tasks.spawn(async move {
            handle_text_message(&task_state, &user_id, &text, &reply_token).await;
        });
        scheduled += 1;
    }

    info!(
        events = payload.events.len(),
        scheduled, "Webhook delivery accepted"
    );
    Ok("OK")
}

/// Dispatch one message and deliver the reply.
async fn handle_text_message(state: &AppState, user_id: &str, text: &str, reply_token: &str) {
    let response = state.dispatcher.handle(user_id, text).await;

    if let Err(e) = state.replies.reply(reply_token, &response).await {
        warn!(user_id, error = %e, "Failed to deliver reply");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use linechat_infra::line::compute_signature;
    use linechat_types::chat::{OutboundResponse, Turn};
    use linechat_types::image::ImageLocator;

    use crate::http::router::build_router;
    use crate::http::test_support::{CHANNEL_SECRET, body_json, test_state};

    fn text_delivery(events: &[(&str, &str, &str)]) -> String {
        let events: Vec<serde_json::Value> = events
            .iter()
            .map(|(user, text, token)| {
                serde_json::json!({
                    "type": "message",
                    "mode": "active",
                    "timestamp": 1_625_665_242_211_i64,
                    "source": {"type": "user", "userId": user},
                    "replyToken": token,
                    "message": {"type": "text", "id": "1", "text": text}
                })
            })
            .collect();
        serde_json::json!({"destination": "Ubot", "events": events}).to_string()
    }

    fn signed_request(body: &str, secret: &str) -> Request<Body> {
        let signature = compute_signature(secret.as_bytes(), body.as_bytes()).unwrap();
        Request::post("/callback")
            .header("content-type", "application/json")
            .header("x-line-signature", signature)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn recv(
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<(String, OutboundResponse)>,
    ) -> (String, OutboundResponse) {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("reply not delivered in time")
            .expect("reply channel closed")
    }

    #[tokio::test]
    async fn test_text_message_is_answered() {
        let (state, mut rx) = test_state();
        let app = build_router(state.clone());

        let body = text_delivery(&[("U1", "hi", "rt-1")]);
        let response = app.oneshot(signed_request(&body, CHANNEL_SECRET)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");

        let (token, reply) = recv(&mut rx).await;
        assert_eq!(token, "rt-1");
        assert_eq!(reply, OutboundResponse::text("echo: hi"));
        assert_eq!(
            state.dispatcher.memory().get("U1"),
            vec![Turn::user("hi"), Turn::assistant("echo: hi")]
        );
    }

    #[tokio::test]
    async fn test_imagine_replies_with_image() {
        let (state, mut rx) = test_state();
        let app = build_router(state.clone());

        let body = text_delivery(&[("U1", "/imagine a red fox", "rt-img")]);
        let response = app.oneshot(signed_request(&body, CHANNEL_SECRET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (token, reply) = recv(&mut rx).await;
        assert_eq!(token, "rt-img");
        assert_eq!(
            reply,
            OutboundResponse::image(ImageLocator::new("https://img.test/a-red-fox.png"))
        );
        assert!(state.dispatcher.memory().get("U1").is_empty());
    }

    #[tokio::test]
    async fn test_each_event_gets_its_own_reply() {
        let (state, mut rx) = test_state();
        let app = build_router(state);

        let body = text_delivery(&[("U1", "one", "rt-a"), ("U2", "two", "rt-b")]);
        let response = app.oneshot(signed_request(&body, CHANNEL_SECRET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut replies = vec![recv(&mut rx).await, recv(&mut rx).await];
        replies.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            replies,
            vec![
                ("rt-a".to_string(), OutboundResponse::text("echo: one")),
                ("rt-b".to_string(), OutboundResponse::text("echo: two")),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_signature_is_rejected() {
        let (state, mut rx) = test_state();
        let app = build_router(state);

        let request = Request::post("/callback")
            .header("content-type", "application/json")
            .body(Body::from(text_delivery(&[("U1", "hi", "rt")])))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["code"], "INVALID_SIGNATURE");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let (state, mut rx) = test_state();
        let app = build_router(state.clone());

        let body = text_delivery(&[("U1", "hi", "rt")]);
        let response = app.oneshot(signed_request(&body, "not-the-secret")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(rx.try_recv().is_err());
        assert_eq!(state.dispatcher.memory().user_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let (state, _rx) = test_state();
        let app = build_router(state);

        let response = app
            .oneshot(signed_request("{not json", CHANNEL_SECRET))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_verification_delivery_without_events() {
        let (state, mut rx) = test_state();
        let app = build_router(state);

        let body = r#"{"destination":"Ubot","events":[]}"#;
        let response = app.oneshot(signed_request(body, CHANNEL_SECRET)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_accepted_messages_finish_during_drain() {
        let (state, mut rx) = test_state();
        let app = build_router(state.clone());

        let body = text_delivery(&[("U1", "still there?", "rt-late")]);
        let response = app.oneshot(signed_request(&body, CHANNEL_SECRET)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert!(state.drain(Duration::from_secs(5)).await);
        let (token, reply) = rx.try_recv().unwrap();
        assert_eq!(token, "rt-late");
        assert_eq!(reply, OutboundResponse::text("echo: still there?"));
    }
}
