//! Booking assistant chat endpoints

use std::sync::Arc;

use axum::{Extension, Json};
use clinic_core::{BookingDialogue, ConversationState, TurnOutcome, cancel_current_booking};
use serde::{Deserialize, Serialize};

use crate::db::AppointmentRepository;
use crate::middleware::CurrentSession;

/// Dialogue controller persisting into PostgreSQL
pub type ChatDialogue = BookingDialogue<AppointmentRepository>;

/// Request body for a chat turn
#[derive(Deserialize)]
pub struct ChatRequest {
    user_input: String,
}

/// Response body for chat endpoints
#[derive(Serialize)]
pub struct ChatResponse {
    chatbot_response: String,
    booking_in_progress: bool,
}

/// POST /chat - Run one turn of the booking dialogue
///
/// The session's chat lock is held for the whole turn, so turns of one
/// session never interleave.
pub async fn chat(
    Extension(dialogue): Extension<Arc<ChatDialogue>>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Json(body): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let mut chat = session.chat.lock().await;
    let state = chat.state.clone();

    let TurnOutcome {
        reply,
        state,
        persisted,
        kind,
    } = dialogue
        .handle_turn(
            &body.user_input,
            &session.identity,
            state,
            chat.responder.as_mut(),
        )
        .await;

    chat.state = state;

    tracing::info!(user = %session.identity.user_id, turn = kind.as_str(), "Chat turn");
    metrics::counter!("chat_turns_total", "kind" => kind.as_str()).increment(1);
    if persisted.is_some() {
        metrics::counter!("appointments_booked_total").increment(1);
    }

    Json(ChatResponse {
        chatbot_response: reply,
        booking_in_progress: chat.state.booking_in_progress,
    })
}

/// POST /cancel_booking - Abandon the booking in progress, if any
pub async fn cancel_booking(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<ChatResponse> {
    let mut chat = session.chat.lock().await;
    let state = std::mem::take(&mut chat.state);
    chat.state = cancel_current_booking(state);

    tracing::info!(user = %session.identity.user_id, "Booking cancelled");

    Json(ChatResponse {
        chatbot_response: clinic_core::dialogue::CANCELLED_REPLY.to_string(),
        booking_in_progress: false,
    })
}

/// GET /chat/state - Current conversation state of the session
pub async fn state(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<ConversationState> {
    Json(session.chat.lock().await.state.clone())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use clinic_core::dialogue::{CANCELLED_REPLY, RESPONDER_UNAVAILABLE_REPLY};
    use clinic_core::{ClinicError, Identity, Responder};

    use super::*;
    use crate::ai::responder::TimeoutResponder;
    use crate::session::SessionStore;

    /// Never answers
    struct StalledResponder;

    #[async_trait]
    impl Responder for StalledResponder {
        async fn send(&mut self, _utterance: &str) -> Result<String, ClinicError> {
            std::future::pending().await
        }
    }

    /// Dialogue over a pool that never connects; fallback turns do not touch it
    async fn offline_dialogue() -> Arc<ChatDialogue> {
        let pool = crate::db::create_pool("host=localhost user=postgres dbname=clinic")
            .await
            .unwrap();
        Arc::new(BookingDialogue::new(AppointmentRepository::new(pool)))
    }

    #[tokio::test]
    async fn test_cancel_not_blocked_by_stalled_responder() {
        let sessions = SessionStore::new(Duration::from_secs(60));
        let responder = TimeoutResponder::new(StalledResponder, Duration::from_millis(300));
        let session = sessions
            .create(Identity::patient("alice"), Box::new(responder))
            .await;

        let turn = tokio::spawn(chat(
            Extension(offline_dialogue().await),
            Extension(CurrentSession(session.clone())),
            Json(ChatRequest {
                user_input: "What are your opening hours?".to_string(),
            }),
        ));

        // Let the turn take the session lock
        tokio::time::sleep(Duration::from_millis(50)).await;

        let Json(cancelled) = tokio::time::timeout(
            Duration::from_secs(2),
            cancel_booking(Extension(CurrentSession(session.clone()))),
        )
        .await
        .expect("cancel stayed blocked behind the chat turn");
        assert_eq!(cancelled.chatbot_response, CANCELLED_REPLY);
        assert!(!cancelled.booking_in_progress);

        let Json(answered) = turn.await.unwrap();
        assert_eq!(answered.chatbot_response, RESPONDER_UNAVAILABLE_REPLY);
        assert!(!answered.booking_in_progress);
    }
}
