//! Booking dialogue controller
//!
//! Handles one chat turn at a time. Fixed keyword commands (cancel, list,
//! start booking) are checked first, then slot filling for a booking in
//! progress, and everything else goes to the general-purpose responder.
//!
//! Keyword detection is a plain case-insensitive substring test, so
//! "show off my bookings" is a list command. Intent classification could
//! replace it later; until then the matching stays literal.

use crate::appointment::NewAppointment;
use crate::conversation::{ConversationState, Slot, parse_date, parse_time};
use crate::identity::Identity;
use crate::store::{AppointmentStore, Responder};

pub const CANCELLED_REPLY: &str = "The booking process has been canceled.";
pub const LIST_HEADER: &str = "Here are your upcoming appointments:";
pub const NO_APPOINTMENTS_REPLY: &str = "You have no upcoming appointments.";
pub const ASK_LOCATION_REPLY: &str = "Sure! Where would you like to book the appointment?";
pub const ASK_DATE_REPLY: &str = "Got it! What date would you like the appointment?";
pub const ASK_TIME_REPLY: &str = "Great! What time would you prefer?";
pub const INVALID_DATE_REPLY: &str = "Please enter a valid date in DD-MM-YYYY format.";
pub const INVALID_TIME_REPLY: &str = "Please enter a valid time in HH:MM format.";
pub const BOOKED_REPLY: &str = "✅ Your appointment has been booked successfully!";
pub const RESPONDER_UNAVAILABLE_REPLY: &str =
    "Sorry, I can't answer that right now. Please try again later.";

/// Which branch of the decision tree handled a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    Cancelled,
    Listed,
    BookingStarted,
    SlotFilled(Slot),
    InvalidInput(Slot),
    Booked,
    BookingFailed,
    Fallback,
}

impl TurnKind {
    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnKind::Cancelled => "cancelled",
            TurnKind::Listed => "listed",
            TurnKind::BookingStarted => "booking_started",
            TurnKind::SlotFilled(_) => "slot_filled",
            TurnKind::InvalidInput(_) => "invalid_input",
            TurnKind::Booked => "booked",
            TurnKind::BookingFailed => "booking_failed",
            TurnKind::Fallback => "fallback",
        }
    }
}

/// Result of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: String,
    pub state: ConversationState,
    /// Set when this turn persisted a booking
    pub persisted: Option<NewAppointment>,
    pub kind: TurnKind,
}

impl TurnOutcome {
    fn new(reply: impl Into<String>, state: ConversationState, kind: TurnKind) -> Self {
        Self {
            reply: reply.into(),
            state,
            persisted: None,
            kind,
        }
    }
}

/// Reset a conversation, whatever it was doing.
///
/// Also reachable outside a chat turn, e.g. from a cancel button.
pub fn cancel_current_booking(_state: ConversationState) -> ConversationState {
    ConversationState::default()
}

/// True when `text` (already lowercased) contains both keywords
fn mentions(text: &str, first: &str, second: &str) -> bool {
    text.contains(first) && text.contains(second)
}

/// Drives appointment booking through chat turns
pub struct BookingDialogue<S> {
    store: S,
}

impl<S: AppointmentStore> BookingDialogue<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one utterance from `user`.
    ///
    /// Never fails: store and responder errors are turned into replies.
    pub async fn handle_turn<R>(
        &self,
        utterance: &str,
        user: &Identity,
        state: ConversationState,
        responder: &mut R,
    ) -> TurnOutcome
    where
        R: Responder + ?Sized,
    {
        let lowered = utterance.to_lowercase();

        if mentions(&lowered, "cancel", "booking") {
            tracing::info!(user = %user.user_id, "Booking cancelled by chat command");
            return TurnOutcome::new(
                CANCELLED_REPLY,
                cancel_current_booking(state),
                TurnKind::Cancelled,
            );
        }

        if mentions(&lowered, "show", "bookings") {
            let listing = self.list_appointments(&user.user_id).await;
            return TurnOutcome::new(
                format!("{LIST_HEADER}\n{listing}"),
                state,
                TurnKind::Listed,
            );
        }

        if !state.booking_in_progress && mentions(&lowered, "book", "appointment") {
            tracing::info!(user = %user.user_id, "Booking started");
            return TurnOutcome::new(
                ASK_LOCATION_REPLY,
                ConversationState::booking_started(),
                TurnKind::BookingStarted,
            );
        }

        if state.booking_in_progress {
            return self.fill_slot(utterance, user, state).await;
        }

        match responder.send(utterance).await {
            Ok(reply) => TurnOutcome::new(reply, state, TurnKind::Fallback),
            Err(e) => {
                tracing::warn!(error = %e, code = e.code(), "General-purpose responder failed");
                TurnOutcome::new(RESPONDER_UNAVAILABLE_REPLY, state, TurnKind::Fallback)
            }
        }
    }

    /// Newline-joined listing of the user's appointments
    async fn list_appointments(&self, user: &str) -> String {
        match self.store.list_by_user(user).await {
            Ok(appointments) if appointments.is_empty() => NO_APPOINTMENTS_REPLY.to_string(),
            Ok(appointments) => appointments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => {
                tracing::error!(error = %e, code = e.code(), user = %user, "Failed to list appointments");
                format!("Error fetching appointments: {e}")
            }
        }
    }

    async fn fill_slot(
        &self,
        utterance: &str,
        user: &Identity,
        mut state: ConversationState,
    ) -> TurnOutcome {
        let pending = &state.pending;
        let appointment = match (pending.location.clone(), pending.date, pending.time) {
            (None, _, _) => {
                state.pending.location = Some(utterance.to_string());
                return TurnOutcome::new(ASK_DATE_REPLY, state, TurnKind::SlotFilled(Slot::Location));
            }
            (Some(_), None, _) => match parse_date(utterance) {
                Ok(date) => {
                    state.pending.date = Some(date);
                    return TurnOutcome::new(ASK_TIME_REPLY, state, TurnKind::SlotFilled(Slot::Date));
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected date slot input");
                    return TurnOutcome::new(
                        INVALID_DATE_REPLY,
                        state,
                        TurnKind::InvalidInput(Slot::Date),
                    );
                }
            },
            (Some(location), Some(date), None) => match parse_time(utterance) {
                Ok(time) => {
                    state.pending.time = Some(time);
                    NewAppointment {
                        user: user.user_id.clone(),
                        location,
                        date,
                        time,
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected time slot input");
                    return TurnOutcome::new(
                        INVALID_TIME_REPLY,
                        state,
                        TurnKind::InvalidInput(Slot::Time),
                    );
                }
            },
            // Every slot was already filled: an earlier insert failed, try again.
            (Some(location), Some(date), Some(time)) => {
                tracing::info!(user = %user.user_id, "Retrying persistence of completed booking");
                NewAppointment {
                    user: user.user_id.clone(),
                    location,
                    date,
                    time,
                }
            }
        };

        self.persist(appointment, state).await
    }

    /// Insert the completed booking and reset the conversation on success.
    ///
    /// On failure `state` is handed back untouched, all slots still filled.
    async fn persist(&self, appointment: NewAppointment, state: ConversationState) -> TurnOutcome {
        match self.store.insert(&appointment).await {
            Ok(()) => {
                tracing::info!(
                    user = %appointment.user,
                    date = %appointment.date,
                    time = %appointment.time,
                    "Appointment booked"
                );
                TurnOutcome {
                    reply: BOOKED_REPLY.to_string(),
                    state: ConversationState::default(),
                    persisted: Some(appointment),
                    kind: TurnKind::Booked,
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    code = e.code(),
                    user = %appointment.user,
                    "Failed to persist appointment"
                );
                TurnOutcome::new(
                    format!("❌ Failed to book appointment: {e}"),
                    state,
                    TurnKind::BookingFailed,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::appointment::AppointmentSummary;
    use crate::conversation::PendingAppointment;
    use crate::error::ClinicError;

    /// In-memory store; `fail_with` makes every insert fail with that detail,
    /// `fail_list_with` does the same for listings
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<NewAppointment>>,
        fail_with: Mutex<Option<String>>,
        fail_list_with: Mutex<Option<String>>,
    }

    impl MemoryStore {
        fn failing(detail: &str) -> Self {
            Self {
                fail_with: Mutex::new(Some(detail.to_string())),
                ..Self::default()
            }
        }

        fn failing_list(detail: &str) -> Self {
            Self {
                fail_list_with: Mutex::new(Some(detail.to_string())),
                ..Self::default()
            }
        }

        fn recover(&self) {
            *self.fail_with.lock().unwrap() = None;
        }

        fn rows(&self) -> Vec<NewAppointment> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AppointmentStore for MemoryStore {
        async fn insert(&self, appointment: &NewAppointment) -> Result<(), ClinicError> {
            if let Some(detail) = self.fail_with.lock().unwrap().clone() {
                return Err(ClinicError::Persistence(detail));
            }
            self.rows.lock().unwrap().push(appointment.clone());
            Ok(())
        }

        async fn list_by_user(&self, user: &str) -> Result<Vec<AppointmentSummary>, ClinicError> {
            if let Some(detail) = self.fail_list_with.lock().unwrap().clone() {
                return Err(ClinicError::Persistence(detail));
            }
            let mut rows: Vec<AppointmentSummary> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.user == user)
                .map(|a| AppointmentSummary {
                    location: a.location.clone(),
                    date: a.date,
                    time: a.time,
                })
                .collect();
            rows.sort_by(|a, b| b.date.cmp(&a.date));
            Ok(rows)
        }
    }

    /// Responder that echoes and remembers what it was sent
    #[derive(Default)]
    struct EchoResponder {
        seen: Vec<String>,
    }

    #[async_trait]
    impl Responder for EchoResponder {
        async fn send(&mut self, utterance: &str) -> Result<String, ClinicError> {
            self.seen.push(utterance.to_string());
            Ok(format!("echo: {utterance}"))
        }
    }

    struct DownResponder;

    #[async_trait]
    impl Responder for DownResponder {
        async fn send(&mut self, _utterance: &str) -> Result<String, ClinicError> {
            Err(ClinicError::Responder("connection refused".to_string()))
        }
    }

    fn alice() -> Identity {
        Identity::patient("alice")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn filled_state() -> ConversationState {
        ConversationState {
            booking_in_progress: true,
            pending: PendingAppointment {
                location: Some("City Clinic".to_string()),
                date: Some(date(2026, 1, 1)),
                time: Some(time(9, 0)),
            },
        }
    }

    /// Run a sequence of utterances, threading the state through
    async fn converse(
        dialogue: &BookingDialogue<MemoryStore>,
        responder: &mut EchoResponder,
        utterances: &[&str],
    ) -> Vec<TurnOutcome> {
        let mut state = ConversationState::default();
        let mut outcomes = Vec::new();
        for utterance in utterances {
            let outcome = dialogue
                .handle_turn(utterance, &alice(), state, responder)
                .await;
            state = outcome.state.clone();
            outcomes.push(outcome);
        }
        outcomes
    }

    #[tokio::test]
    async fn test_full_booking_conversation() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        let outcomes = converse(
            &dialogue,
            &mut responder,
            &[
                "I'd like to book an appointment",
                "City Clinic",
                "01-01-2026",
                "09:00",
            ],
        )
        .await;

        assert_eq!(outcomes[0].reply, ASK_LOCATION_REPLY);
        assert_eq!(outcomes[0].state, ConversationState::booking_started());

        assert_eq!(outcomes[1].reply, ASK_DATE_REPLY);
        assert_eq!(
            outcomes[1].state.pending.location.as_deref(),
            Some("City Clinic")
        );

        assert_eq!(outcomes[2].reply, ASK_TIME_REPLY);
        assert_eq!(outcomes[2].state.pending.date, Some(date(2026, 1, 1)));

        assert_eq!(outcomes[3].reply, BOOKED_REPLY);
        assert_eq!(outcomes[3].kind, TurnKind::Booked);
        assert!(outcomes[3].state.is_idle());

        let expected = NewAppointment {
            user: "alice".to_string(),
            location: "City Clinic".to_string(),
            date: date(2026, 1, 1),
            time: time(9, 0),
        };
        assert_eq!(outcomes[3].persisted, Some(expected.clone()));
        assert_eq!(dialogue.store().rows(), vec![expected]);

        // Commands and slot answers never reach the responder
        assert!(responder.seen.is_empty());
    }

    #[tokio::test]
    async fn test_location_is_taken_verbatim() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        let outcome = dialogue
            .handle_turn(
                "  Ward 3, next to the pharmacy ",
                &alice(),
                ConversationState::booking_started(),
                &mut responder,
            )
            .await;

        assert_eq!(
            outcome.state.pending.location.as_deref(),
            Some("  Ward 3, next to the pharmacy ")
        );
    }

    #[tokio::test]
    async fn test_cancel_resets_any_state() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        for state in [
            ConversationState::default(),
            ConversationState::booking_started(),
            filled_state(),
        ] {
            let outcome = dialogue
                .handle_turn("Never mind, CANCEL my Booking", &alice(), state, &mut responder)
                .await;
            assert_eq!(outcome.reply, CANCELLED_REPLY);
            assert_eq!(outcome.kind, TurnKind::Cancelled);
            assert!(outcome.state.is_idle());
        }
    }

    #[tokio::test]
    async fn test_double_cancel_is_stable() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        let outcomes = converse(
            &dialogue,
            &mut responder,
            &["book an appointment", "cancel booking", "cancel booking"],
        )
        .await;

        assert_eq!(outcomes[1].state, outcomes[2].state);
        assert_eq!(outcomes[2].reply, CANCELLED_REPLY);
        assert!(outcomes[2].state.is_idle());
    }

    #[test]
    fn test_cancel_current_booking_outside_a_turn() {
        assert_eq!(
            cancel_current_booking(filled_state()),
            ConversationState::default()
        );
    }

    #[tokio::test]
    async fn test_list_without_appointments() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        let outcome = dialogue
            .handle_turn(
                "show me my bookings",
                &alice(),
                ConversationState::default(),
                &mut responder,
            )
            .await;

        assert_eq!(
            outcome.reply,
            "Here are your upcoming appointments:\nYou have no upcoming appointments."
        );
        assert_eq!(outcome.kind, TurnKind::Listed);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_only_own() {
        let store = MemoryStore::default();
        for (user, location, day) in [
            ("alice", "City Clinic", date(2026, 1, 1)),
            ("bob", "Elsewhere", date(2026, 6, 1)),
            ("alice", "Harbour Clinic", date(2026, 3, 5)),
        ] {
            store
                .insert(&NewAppointment {
                    user: user.to_string(),
                    location: location.to_string(),
                    date: day,
                    time: time(9, 0),
                })
                .await
                .unwrap();
        }
        let dialogue = BookingDialogue::new(store);
        let mut responder = EchoResponder::default();

        let outcome = dialogue
            .handle_turn(
                "Show BOOKINGS",
                &alice(),
                ConversationState::default(),
                &mut responder,
            )
            .await;

        assert_eq!(
            outcome.reply,
            "Here are your upcoming appointments:\n\
             Location: Harbour Clinic, Date: 2026-03-05, Time: 09:00:00\n\
             Location: City Clinic, Date: 2026-01-01, Time: 09:00:00"
        );
    }

    #[tokio::test]
    async fn test_list_reports_store_failure() {
        let dialogue = BookingDialogue::new(MemoryStore::failing_list("relation does not exist"));
        let mut responder = EchoResponder::default();
        let mut state = ConversationState::booking_started();
        state.pending.location = Some("City Clinic".to_string());

        let outcome = dialogue
            .handle_turn("show my bookings", &alice(), state.clone(), &mut responder)
            .await;

        assert_eq!(
            outcome.reply,
            "Here are your upcoming appointments:\nError fetching appointments: relation does not exist"
        );
        assert_eq!(outcome.kind, TurnKind::Listed);
        assert_eq!(outcome.state, state);
        assert!(responder.seen.is_empty());
    }

    #[tokio::test]
    async fn test_list_keeps_booking_state() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();
        let mut state = ConversationState::booking_started();
        state.pending.location = Some("City Clinic".to_string());

        let outcome = dialogue
            .handle_turn(
                "I want to show off my bookings",
                &alice(),
                state.clone(),
                &mut responder,
            )
            .await;

        assert_eq!(outcome.kind, TurnKind::Listed);
        assert_eq!(outcome.state, state);
    }

    #[tokio::test]
    async fn test_invalid_date_does_not_advance() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        let outcomes = converse(
            &dialogue,
            &mut responder,
            &["book appointment", "City Clinic", "2025-03-15", "15-03-2025"],
        )
        .await;

        assert_eq!(outcomes[2].reply, INVALID_DATE_REPLY);
        assert_eq!(outcomes[2].kind, TurnKind::InvalidInput(Slot::Date));
        assert_eq!(outcomes[2].state.pending.date, None);
        assert_eq!(outcomes[2].state, outcomes[1].state);

        assert_eq!(outcomes[3].reply, ASK_TIME_REPLY);
        assert_eq!(outcomes[3].state.pending.date, Some(date(2025, 3, 15)));
    }

    #[tokio::test]
    async fn test_invalid_time_does_not_persist() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        let outcomes = converse(
            &dialogue,
            &mut responder,
            &["book appointment", "City Clinic", "15-03-2025", "2:30 PM", "14:30"],
        )
        .await;

        assert_eq!(outcomes[3].reply, INVALID_TIME_REPLY);
        assert_eq!(outcomes[3].state.pending.time, None);
        assert!(outcomes[3].state.booking_in_progress);

        assert_eq!(outcomes[4].kind, TurnKind::Booked);
        assert_eq!(dialogue.store().rows().len(), 1);
        assert_eq!(dialogue.store().rows()[0].time, time(14, 30));
    }

    #[tokio::test]
    async fn test_book_keywords_ignored_while_booking() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        let outcomes = converse(
            &dialogue,
            &mut responder,
            &["book an appointment", "the appointment book store"],
        )
        .await;

        // Second mention of book/appointment is the location answer
        assert_eq!(outcomes[1].reply, ASK_DATE_REPLY);
        assert_eq!(
            outcomes[1].state.pending.location.as_deref(),
            Some("the appointment book store")
        );
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_slots() {
        let dialogue = BookingDialogue::new(MemoryStore::failing("connection reset"));
        let mut responder = EchoResponder::default();

        let outcomes = converse(
            &dialogue,
            &mut responder,
            &["book appointment", "City Clinic", "01-01-2026", "09:00"],
        )
        .await;

        let failed = &outcomes[3];
        assert_eq!(failed.reply, "❌ Failed to book appointment: connection reset");
        assert_eq!(failed.kind, TurnKind::BookingFailed);
        assert_eq!(failed.persisted, None);
        assert_eq!(failed.state, filled_state());
    }

    #[tokio::test]
    async fn test_persistence_retried_on_next_turn() {
        let dialogue = BookingDialogue::new(MemoryStore::failing("connection reset"));
        let mut responder = EchoResponder::default();

        let mut awaiting_time = filled_state();
        awaiting_time.pending.time = None;

        let failed = dialogue
            .handle_turn("09:00", &alice(), awaiting_time, &mut responder)
            .await;
        assert_eq!(failed.kind, TurnKind::BookingFailed);

        dialogue.store().recover();
        let retried = dialogue
            .handle_turn("please try again", &alice(), failed.state, &mut responder)
            .await;

        assert_eq!(retried.reply, BOOKED_REPLY);
        assert!(retried.state.is_idle());
        assert_eq!(dialogue.store().rows().len(), 1);
        assert!(responder.seen.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_forwards_to_responder() {
        let dialogue = BookingDialogue::new(MemoryStore::default());
        let mut responder = EchoResponder::default();

        let outcome = dialogue
            .handle_turn(
                "What are the clinic opening hours?",
                &alice(),
                ConversationState::default(),
                &mut responder,
            )
            .await;

        assert_eq!(outcome.reply, "echo: What are the clinic opening hours?");
        assert_eq!(outcome.kind, TurnKind::Fallback);
        assert!(outcome.state.is_idle());
        assert_eq!(responder.seen, vec!["What are the clinic opening hours?"]);
    }

    #[tokio::test]
    async fn test_fallback_survives_responder_failure() {
        let dialogue = BookingDialogue::new(MemoryStore::default());

        let outcome = dialogue
            .handle_turn(
                "hello",
                &alice(),
                ConversationState::default(),
                &mut DownResponder,
            )
            .await;

        assert_eq!(outcome.reply, RESPONDER_UNAVAILABLE_REPLY);
        assert!(outcome.state.is_idle());
    }
}
