//! consent.rs
//!
//! The consent gate: a single derived boolean deciding whether submission
//! may happen, plus the field-lock side effect that accompanies it.
//!
//! Consent is never stored from the raw checkbox. Every toggle and every
//! field event re-derives it from the current validation map and secure-field
//! state, so checking the box while any precondition fails leaves consent
//! revoked rather than pending. The lock command returned on a flip is the
//! only writer of the fields' enabled/disabled state.

use crate::secure_fields::{SecureFieldKind, SecureFieldSet, SecureFieldWidget};
use crate::validation::ValidationErrors;

/// Derived consent. `granted == true` implies the validation map was empty
/// and all secure fields were touched and error-free at derivation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsentState {
    granted: bool,
}

impl ConsentState {
    pub fn granted(self) -> bool {
        self.granted
    }
}

/// Instruction to the render layer and widget when consent flips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockCommand {
    /// Consent was granted: freeze the plain inputs and the widget fields.
    Lock,
    /// Consent was revoked: make everything editable again.
    Unlock,
}

/// Result of one gate evaluation: the new state, and a lock command iff the
/// granted flag flipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsentTransition {
    pub state: ConsentState,
    pub lock: Option<LockCommand>,
}

/// Re-derive consent from explicit user intent and the current form state.
pub fn evaluate(
    current: ConsentState,
    user_intent: bool,
    validation: &ValidationErrors,
    fields: &SecureFieldSet,
) -> ConsentTransition {
    let granted = user_intent && fields.ready(validation);
    let lock = match (current.granted, granted) {
        (false, true) => Some(LockCommand::Lock),
        (true, false) => Some(LockCommand::Unlock),
        _ => None,
    };
    ConsentTransition {
        state: ConsentState { granted },
        lock,
    }
}

/// Apply a lock command to every secure field through the widget's narrow
/// capability interface. The plain text inputs take their disabled flag from
/// [`ConsentState::granted`] directly at render time.
pub fn apply_lock(widget: &impl SecureFieldWidget, command: LockCommand) {
    let disabled = matches!(command, LockCommand::Lock);
    for kind in SecureFieldKind::ALL {
        widget.set_disabled(kind, disabled);
    }
}
