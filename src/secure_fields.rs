//! secure_fields.rs
//!
//! Tracks the state of the three secure card fields (number, expiry, CVC)
//! from the opaque change events the external widget emits.
//!
//! The crate never sees card digits. Each change event only carries the
//! field kind, a completeness flag, and an optional display-safe message
//! produced by the widget itself. The tracker folds those events into a
//! per-field `{touched, error}` pair; the last event for a kind always wins.

use crate::validation::ValidationErrors;

/// The three inputs rendered and tokenized by the external widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecureFieldKind {
    CardNumber,
    CardExpiry,
    CardCvc,
}

impl SecureFieldKind {
    pub const ALL: [SecureFieldKind; 3] = [
        SecureFieldKind::CardNumber,
        SecureFieldKind::CardExpiry,
        SecureFieldKind::CardCvc,
    ];

    /// The widget's element type string for this kind.
    pub fn element_type(self) -> &'static str {
        match self {
            SecureFieldKind::CardNumber => "cardNumber",
            SecureFieldKind::CardExpiry => "cardExpiry",
            SecureFieldKind::CardCvc => "cardCvc",
        }
    }

    /// Label shown next to the field.
    pub fn label(self) -> &'static str {
        match self {
            SecureFieldKind::CardNumber => "Card number",
            SecureFieldKind::CardExpiry => "Expiry date",
            SecureFieldKind::CardCvc => "CVC",
        }
    }

    /// Default error for a touched-but-incomplete field when the widget did
    /// not supply its own message.
    pub fn required_message(self) -> &'static str {
        match self {
            SecureFieldKind::CardNumber => "Card number is required.",
            SecureFieldKind::CardExpiry => "Expiry date is required.",
            SecureFieldKind::CardCvc => "CVC is required.",
        }
    }
}

/// One change event from the widget for a single field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecureFieldChange {
    pub kind: SecureFieldKind,
    pub complete: bool,
    /// The widget's own message. Format-level only, safe to display verbatim.
    pub error: Option<String>,
}

/// Tracked state for one secure field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecureFieldState {
    /// Whether the widget has ever reported a change for this field.
    pub touched: bool,
    /// Current inline error, if any. `None` means nothing is displayed.
    pub error: Option<String>,
}

/// State of all three secure fields, created untouched at form mount.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecureFieldSet {
    card_number: SecureFieldState,
    card_expiry: SecureFieldState,
    card_cvc: SecureFieldState,
}

impl SecureFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: SecureFieldKind) -> &SecureFieldState {
        match kind {
            SecureFieldKind::CardNumber => &self.card_number,
            SecureFieldKind::CardExpiry => &self.card_expiry,
            SecureFieldKind::CardCvc => &self.card_cvc,
        }
    }

    fn get_mut(&mut self, kind: SecureFieldKind) -> &mut SecureFieldState {
        match kind {
            SecureFieldKind::CardNumber => &mut self.card_number,
            SecureFieldKind::CardExpiry => &mut self.card_expiry,
            SecureFieldKind::CardCvc => &mut self.card_cvc,
        }
    }

    /// Fold one widget change event into the set and return the new state of
    /// the affected field.
    ///
    /// Receiving an event marks the field touched before the error is
    /// derived, so delivering the same event twice leaves the same state as
    /// delivering it once. Untouched fields never show a synthesized error
    /// because nothing is stored for a field until its first event arrives.
    pub fn apply(&mut self, change: &SecureFieldChange) -> &SecureFieldState {
        let state = self.get_mut(change.kind);
        state.touched = true;
        state.error = if change.complete {
            None
        } else if let Some(message) = &change.error {
            Some(message.clone())
        } else {
            Some(change.kind.required_message().to_string())
        };
        self.get(change.kind)
    }

    /// Current inline error for a field, if any.
    pub fn error(&self, kind: SecureFieldKind) -> Option<&str> {
        self.get(kind).error.as_deref()
    }

    /// Whether every field has reported at least one change.
    pub fn all_touched(&self) -> bool {
        SecureFieldKind::ALL.iter().all(|kind| self.get(*kind).touched)
    }

    /// Whether any field currently carries an error.
    pub fn has_errors(&self) -> bool {
        SecureFieldKind::ALL
            .iter()
            .any(|kind| self.get(*kind).error.is_some())
    }

    /// Whether the set satisfies the consent preconditions together with an
    /// empty validation map: all fields touched and error-free.
    pub fn ready(&self, validation: &ValidationErrors) -> bool {
        validation.is_empty() && self.all_touched() && !self.has_errors()
    }
}

/// Narrow capability interface over the external widget.
///
/// The checkout form only ever needs to enable or disable the secure fields;
/// everything else (rendering, tokenization) stays inside the widget. Tests
/// substitute a recording double.
pub trait SecureFieldWidget {
    fn set_disabled(&self, kind: SecureFieldKind, disabled: bool);
}
