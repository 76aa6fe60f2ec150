//! General-purpose chat responders backing the dialogue fallback

use std::time::Duration;

use async_trait::async_trait;
use clinic_core::{ClinicError, Responder};

use super::client::{ChatRole, ClaudeClient, Message};

const SYSTEM_PROMPT: &str = r#"You are the front-desk assistant of a small clinic. Answer patients' general questions politely and briefly.

Appointment booking, cancellation and listing are handled by the clinic system itself. If a patient wants to book, tell them to say "book an appointment". To see existing bookings they can say "show my bookings", and to stop a booking in progress they can say "cancel booking".

Never give a diagnosis. For urgent symptoms, advise contacting emergency services."#;

/// Messages of history kept per session
const MAX_HISTORY: usize = 40;

/// Longest a chat turn waits for the upstream model; the session stays locked meanwhile
pub const RESPONDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Claude-backed responder that remembers the session's previous turns
pub struct ClaudeResponder {
    client: ClaudeClient,
    history: Vec<Message>,
}

impl ClaudeResponder {
    pub fn new(client: ClaudeClient) -> Self {
        Self {
            client,
            history: Vec::new(),
        }
    }
}

#[async_trait]
impl Responder for ClaudeResponder {
    async fn send(&mut self, utterance: &str) -> Result<String, ClinicError> {
        let mut messages = self.history.clone();
        messages.push(Message::user(utterance));

        let result = self.client.send(Some(SYSTEM_PROMPT), &messages).await;
        settle_turn(&mut self.history, utterance, result)
    }
}

/// Record a finished exchange. History only grows when the model answered,
/// so it keeps alternating roles after failures and dropped calls.
fn settle_turn(
    history: &mut Vec<Message>,
    utterance: &str,
    result: Result<String, String>,
) -> Result<String, ClinicError> {
    let reply = result.map_err(ClinicError::Responder)?;
    history.push(Message::user(utterance));
    history.push(Message::assistant(&reply));
    trim_history(history, MAX_HISTORY);
    Ok(reply)
}

/// Gives up on the wrapped responder after a fixed delay
pub struct TimeoutResponder<R> {
    inner: R,
    limit: Duration,
}

impl<R> TimeoutResponder<R> {
    pub fn new(inner: R, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<R: Responder> Responder for TimeoutResponder<R> {
    async fn send(&mut self, utterance: &str) -> Result<String, ClinicError> {
        match tokio::time::timeout(self.limit, self.inner.send(utterance)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(limit_ms = self.limit.as_millis() as u64, "Responder timed out");
                Err(ClinicError::Responder(format!(
                    "no reply within {}s",
                    self.limit.as_secs()
                )))
            }
        }
    }
}

/// Responder used when no API key is configured
pub struct UnavailableResponder;

#[async_trait]
impl Responder for UnavailableResponder {
    async fn send(&mut self, _utterance: &str) -> Result<String, ClinicError> {
        Err(ClinicError::Responder(
            "ANTHROPIC_API_KEY not configured".to_string(),
        ))
    }
}

/// Fresh responder for a new session
pub fn responder_for(client: Option<&ClaudeClient>) -> Box<dyn Responder> {
    match client {
        Some(client) => Box::new(TimeoutResponder::new(
            ClaudeResponder::new(client.clone()),
            RESPONDER_TIMEOUT,
        )),
        None => Box::new(UnavailableResponder),
    }
}

/// Keep at most `max` messages, dropping the oldest, and start on a user message
fn trim_history(history: &mut Vec<Message>, max: usize) {
    if history.len() <= max {
        return;
    }

    let mut start = history.len() - max;
    while start < history.len() && history[start].role != ChatRole::User {
        start += 1;
    }
    history.drain(..start);
}
