use serde::{Deserialize, Serialize};

pub const FULFILLED_MESSAGE: &str = "Order Fulfilled Successfully!";
pub const COPIED_MESSAGE: &str = "Copied to clipboard";

/// Body of `POST /api/updateAdaptDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    #[serde(rename = "invoiceNumber")]
    pub invoice_number: String,
    pub shop: String,
}

impl FulfillmentRequest {
    pub fn new(invoice_number: impl Into<String>, shop: impl Into<String>) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            shop: shop.into(),
        }
    }
}

/// What the backend answered. Both fields are optional; any other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FulfillmentResponse {
    pub fn success() -> Self {
        Self {
            status: Some("success".to_string()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: None,
            error: Some(message.into()),
        }
    }

    /// `status == "success"` wins over `error`; an empty error counts as absent.
    pub fn outcome(&self) -> Outcome {
        if self.status.as_deref() == Some("success") {
            return Outcome::Fulfilled;
        }
        match self.error.as_deref() {
            Some(message) if !message.is_empty() => Outcome::Rejected(message.to_string()),
            _ => Outcome::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Fulfilled,
    Rejected(String),
    Unrecognized,
}

impl Outcome {
    pub fn notification(&self) -> Option<Notification> {
        match self {
            Outcome::Fulfilled => Some(Notification::info(FULFILLED_MESSAGE)),
            Outcome::Rejected(message) => Some(Notification::error(message.clone())),
            Outcome::Unrecognized => None,
        }
    }
}

/// A transient toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub is_error: bool,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}
