use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FulfillmentRequest, FulfillmentResponse, Notification, Outcome};
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TesterPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TesterError {
    #[error("invalid submission: {}", .0.join(", "))]
    Invalid(Vec<String>),
}

/// A submission handed out by [`ManualTester::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: u64,
    pub request: FulfillmentRequest,
}

/// What happened when a response came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The response belonged to the newest submission and was applied.
    Applied(Option<Notification>),
    /// A newer submission was issued meanwhile; the response was dropped.
    Stale,
}

/// State of the manual fulfillment tester card.
///
/// Overlapping submissions are allowed. Only the newest issued ticket may
/// change the phase or raise a notification, so the toast always describes
/// the order number that was submitted last, whatever order the responses
/// arrive in.
#[derive(Debug, Clone, Default)]
pub struct ManualTester {
    input: String,
    phase: TesterPhase,
    issued: u64,
    in_flight: usize,
}

impl ManualTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn phase(&self) -> TesterPhase {
        self.phase
    }

    pub fn can_submit(&self) -> bool {
        validation::can_submit(&self.input)
    }

    pub fn is_loading(&self) -> bool {
        self.phase == TesterPhase::Submitting
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a submission for the current input.
    pub fn begin(&mut self, shop: &str) -> Result<Submission, TesterError> {
        validation::validate(&self.input, shop).map_err(TesterError::Invalid)?;

        self.issued += 1;
        self.in_flight += 1;
        self.phase = TesterPhase::Submitting;

        Ok(Submission {
            ticket: self.issued,
            request: FulfillmentRequest::new(self.input.clone(), shop),
        })
    }

    pub fn complete(&mut self, ticket: u64, response: &FulfillmentResponse) -> Completion {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket != self.issued {
            tracing::debug!(ticket, latest = self.issued, "dropping stale fulfillment response");
            return Completion::Stale;
        }

        let outcome = response.outcome();
        self.phase = match outcome {
            Outcome::Fulfilled => TesterPhase::Succeeded,
            Outcome::Rejected(_) => TesterPhase::Failed,
            Outcome::Unrecognized => TesterPhase::Idle,
        };
        Completion::Applied(outcome.notification())
    }

    /// The request for `ticket` never produced a response.
    pub fn abandon(&mut self, ticket: u64) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if ticket == self.issued {
            self.phase = TesterPhase::Idle;
        }
    }
}
