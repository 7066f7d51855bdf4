use std::time::Instant;

use crate::parser::parse_wind_payload;
use crate::schema::{Reading, WindSample};
use crate::stats::Summary;
use crate::transport::TransportEvent;

/// Lifecycle of one collection run.
///
/// ```text
/// Disconnected → Connecting → Subscribed → Collecting → Finalized
///                     ↑                         │
///                     └──── connection lost ────┘
/// ```
///
/// `Finalized` is terminal: every later event is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Subscribed,
    Collecting,
    Finalized,
}

/// What the runner has to do after an event was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Nothing to do.
    Idle,

    /// Subscribe to the topic. `first` is false on reconnects.
    Subscribe { topic: String, first: bool },

    /// A reading was appended; `count` readings are now held.
    Accepted { count: usize, sample: WindSample },

    /// Payload did not parse; carries the decoded text.
    Rejected(String),

    /// Broker dropped an established connection.
    ConnectionLost(u8),

    /// Broker refused the connection.
    Fatal(u8),
}

/// State owned by the collector for one run.
///
/// The session is driven by exactly one consumer, so it is
/// mutated in place without locking. It never touches the
/// network or the filesystem; the runner does that in response
/// to the returned `Step`.
#[derive(Debug)]
pub struct Session {
    topic: String,
    target: usize,
    readings: Vec<Reading>,
    started_at: Option<Instant>,
    state: SessionState,
}

impl Session {
    pub fn new(topic: impl Into<String>, target: usize) -> Self {
        Self {
            topic: topic.into(),
            target,
            readings: Vec::with_capacity(target),
            started_at: None,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn target_reached(&self) -> bool {
        self.readings.len() >= self.target
    }

    pub fn start_connecting(&mut self) {
        if self.state == SessionState::Disconnected {
            self.state = SessionState::Connecting;
        }
    }

    /// Applies one transport event.
    pub fn handle(&mut self, event: TransportEvent) -> Step {
        if self.state == SessionState::Finalized {
            return Step::Idle;
        }

        match event {
            TransportEvent::Connected(0) => {
                // Reconnects keep the first start time
                let first = self.started_at.is_none();
                if first {
                    self.started_at = Some(Instant::now());
                }
                self.state = SessionState::Subscribed;

                Step::Subscribe {
                    topic: self.topic.clone(),
                    first,
                }
            }

            TransportEvent::Connected(code) => {
                self.state = SessionState::Disconnected;
                Step::Fatal(code)
            }

            TransportEvent::Message { topic, payload } => self.on_message(&topic, &payload),

            TransportEvent::Disconnected(0) => Step::Idle,

            TransportEvent::Disconnected(code) => {
                self.state = SessionState::Connecting;
                Step::ConnectionLost(code)
            }
        }
    }

    fn on_message(&mut self, topic: &str, payload: &[u8]) -> Step {
        if self.target_reached() {
            return Step::Idle;
        }

        let text = String::from_utf8_lossy(payload);
        let text = text.trim();

        let Some(sample) = parse_wind_payload(text) else {
            return Step::Rejected(text.to_string());
        };

        self.readings.push(Reading::capture(topic, sample));
        self.state = SessionState::Collecting;

        Step::Accepted {
            count: self.readings.len(),
            sample,
        }
    }

    /// Enters the terminal state and computes the summary.
    ///
    /// Duration runs from the first successful connection; it is
    /// zero when no connection was ever made.
    pub fn finalize(&mut self) -> Summary {
        self.state = SessionState::Finalized;

        let duration = self
            .started_at
            .map(|t| t.elapsed())
            .unwrap_or_default();

        Summary::from_readings(&self.readings, duration)
    }
}
