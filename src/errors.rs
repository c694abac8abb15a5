//! errors.rs
//!
//! Translation of payment failures into fixed, safe, user-facing copy.
//!
//! Two layers of failure reach the orchestrator: a [`ProcessorFailure`]
//! carried inside a well-formed gateway response (the processor declined or
//! rejected the charge), and a [`GatewayError`] when the call itself broke
//! (network, malformed response, widget rejection). Both funnel through the
//! translation functions here; raw categories, codes, and transport detail
//! never reach the UI.

use serde::Deserialize;
use thiserror::Error;

/// Raw failure detail attached to a processor response. Opaque to the UI:
/// only ever displayed after translation through [`user_message`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProcessorFailure {
    /// Coarse processor category, e.g. `card_declined`.
    #[serde(default)]
    pub category: Option<String>,
    /// Free-form internal detail. Logged, never displayed.
    #[serde(default)]
    pub detail: Option<String>,
}

/// Transport-level failure while talking to the widget, the price lookup, or
/// the payment service.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment service unreachable: {0}")]
    Network(String),
    #[error("payment service returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("secure-field widget rejected the request: {0}")]
    Widget(String),
}

pub const DECLINED_MESSAGE: &str = "Your card was declined. Please try a different card.";
pub const EXPIRED_MESSAGE: &str = "Your card has expired. Please use a different card.";
pub const BAD_CVC_MESSAGE: &str = "The security code you entered is incorrect.";
pub const PROCESSING_MESSAGE: &str = "We couldn't process your payment. Please try again.";
pub const NETWORK_MESSAGE: &str =
    "We couldn't reach the payment service. Please check your connection and try again.";
pub const FALLBACK_MESSAGE: &str =
    "Something went wrong while processing your payment. Please try again.";

/// Map a processor failure to its fixed user-facing sentence. Unknown or
/// absent categories fall back to the generic message.
pub fn user_message(failure: Option<&ProcessorFailure>) -> &'static str {
    match failure.and_then(|f| f.category.as_deref()) {
        Some("card_declined" | "generic_decline" | "insufficient_funds") => DECLINED_MESSAGE,
        Some("expired_card") => EXPIRED_MESSAGE,
        Some("incorrect_cvc" | "invalid_cvc") => BAD_CVC_MESSAGE,
        Some("processing_error") => PROCESSING_MESSAGE,
        Some("network_error") => NETWORK_MESSAGE,
        _ => FALLBACK_MESSAGE,
    }
}

/// Map a transport failure to a user-facing sentence.
pub fn gateway_message(error: &GatewayError) -> &'static str {
    match error {
        GatewayError::Network(_) => NETWORK_MESSAGE,
        GatewayError::MalformedResponse(_) | GatewayError::Widget(_) => FALLBACK_MESSAGE,
    }
}
