//! session.rs
//!
//! The form session: one reducer holding every piece of checkout state, with
//! a single transition per UI event.
//!
//! Validation and consent are re-derived inside the same transition that
//! changed an input or folded a widget event, so gating is atomic with
//! respect to each event: a render can never observe an input snapshot whose
//! validation has not been folded into the consent decision yet.

use std::rc::Rc;

use yew::Reducible;

use crate::consent::{evaluate, ConsentState, LockCommand};
use crate::secure_fields::{SecureFieldChange, SecureFieldSet};
use crate::submission::{SubmissionDriver, SubmissionState};
use crate::validation::{validate, FormField, FormInputs, ValidationErrors};

/// Events feeding the session reducer.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutAction {
    /// A plain-text field changed.
    InputChanged(FormField, String),
    /// The secure-field widget reported a change.
    SecureFieldChanged(SecureFieldChange),
    /// The consent checkbox was toggled; carries the raw checked flag,
    /// which is only honored after re-validation.
    ConsentToggled(bool),
    /// The price lookup resolved to an amount in minor units.
    PriceResolved(i64),
    /// A submission attempt is starting.
    SubmissionBegan,
    /// A submission attempt concluded.
    SubmissionFinished(SubmissionState),
}

/// Complete state of one checkout form session. Ephemeral: created at mount,
/// dropped with the page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CheckoutSession {
    pub inputs: FormInputs,
    pub input_errors: ValidationErrors,
    pub fields: SecureFieldSet,
    pub consent: ConsentState,
    /// The most recent lock directive from the consent gate. The render
    /// layer applies it to the widget; `None` until consent first flips.
    pub lock: Option<LockCommand>,
    /// Resolved by the price lookup; `None` blocks submission.
    pub amount_minor_units: Option<i64>,
    pub submission: SubmissionDriver,
}

impl CheckoutSession {
    /// Whether the submit trigger should be live: consent granted, price
    /// resolved, no attempt in flight or already succeeded.
    pub fn can_submit(&self) -> bool {
        self.amount_minor_units.is_some() && self.submission.can_begin(self.consent)
    }

    /// Whether the plain inputs and widget fields are currently frozen.
    pub fn locked(&self) -> bool {
        self.consent.granted()
    }

    fn revalidate(&mut self, user_intent: bool) {
        self.input_errors = validate(&self.inputs);
        let transition = evaluate(self.consent, user_intent, &self.input_errors, &self.fields);
        self.consent = transition.state;
        if transition.lock.is_some() {
            self.lock = transition.lock;
        }
    }
}

impl Reducible for CheckoutSession {
    type Action = CheckoutAction;

    fn reduce(self: Rc<Self>, action: CheckoutAction) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            CheckoutAction::InputChanged(field, value) => {
                // The fields are disabled while consent is granted; drop any
                // event that slips through the disabled state anyway.
                if !next.locked() {
                    next.inputs.set(field, value);
                    next.revalidate(next.consent.granted());
                }
            }
            CheckoutAction::SecureFieldChanged(change) => {
                next.fields.apply(&change);
                next.revalidate(next.consent.granted());
            }
            CheckoutAction::ConsentToggled(checked) => {
                next.revalidate(checked);
            }
            CheckoutAction::PriceResolved(amount) => {
                next.amount_minor_units = Some(amount);
            }
            CheckoutAction::SubmissionBegan => {
                next.submission.try_begin(next.consent);
            }
            CheckoutAction::SubmissionFinished(outcome) => {
                next.submission.finish(outcome);
            }
        }
        Rc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secure_fields::SecureFieldKind;

    fn dispatch(session: Rc<CheckoutSession>, action: CheckoutAction) -> Rc<CheckoutSession> {
        session.reduce(action)
    }

    fn fill_inputs(mut session: Rc<CheckoutSession>) -> Rc<CheckoutSession> {
        for (field, value) in [
            (FormField::CardHolderName, "Jane Doe"),
            (FormField::ZipCode, "90210"),
            (FormField::StateCode, "CA"),
        ] {
            session = dispatch(
                session,
                CheckoutAction::InputChanged(field, value.to_string()),
            );
        }
        session
    }

    fn complete(kind: SecureFieldKind) -> CheckoutAction {
        CheckoutAction::SecureFieldChanged(SecureFieldChange {
            kind,
            complete: true,
            error: None,
        })
    }

    #[test]
    fn test_consent_granted_only_when_everything_is_ready() {
        let mut session = fill_inputs(Rc::new(CheckoutSession::default()));
        for kind in SecureFieldKind::ALL {
            session = dispatch(session, complete(kind));
        }
        session = dispatch(session, CheckoutAction::ConsentToggled(true));
        assert!(session.consent.granted());
        assert_eq!(session.lock, Some(LockCommand::Lock));
    }

    #[test]
    fn test_consent_never_granted_with_untouched_fields_in_any_order() {
        // Every ordering of two of the three completion events plus the
        // toggle: consent must stay revoked because one field is untouched.
        let pairs = [
            (SecureFieldKind::CardNumber, SecureFieldKind::CardExpiry),
            (SecureFieldKind::CardNumber, SecureFieldKind::CardCvc),
            (SecureFieldKind::CardExpiry, SecureFieldKind::CardCvc),
        ];
        for (first, second) in pairs {
            for toggle_position in 0..3 {
                let mut session = fill_inputs(Rc::new(CheckoutSession::default()));
                let mut events = vec![complete(first), complete(second)];
                events.insert(toggle_position, CheckoutAction::ConsentToggled(true));
                for event in events {
                    session = dispatch(session, event);
                }
                assert!(
                    !session.consent.granted(),
                    "granted with {first:?}/{second:?}, toggle at {toggle_position}"
                );
            }
        }
    }

    #[test]
    fn test_toggle_before_fields_does_not_latch_intent() {
        let mut session = fill_inputs(Rc::new(CheckoutSession::default()));
        session = dispatch(session, CheckoutAction::ConsentToggled(true));
        assert!(!session.consent.granted());

        // Completing the fields afterwards must not resurrect the rejected
        // toggle; the user has to check the box again.
        for kind in SecureFieldKind::ALL {
            session = dispatch(session, complete(kind));
        }
        assert!(!session.consent.granted());

        session = dispatch(session, CheckoutAction::ConsentToggled(true));
        assert!(session.consent.granted());
    }

    #[test]
    fn test_late_widget_error_revokes_consent() {
        let mut session = fill_inputs(Rc::new(CheckoutSession::default()));
        for kind in SecureFieldKind::ALL {
            session = dispatch(session, complete(kind));
        }
        session = dispatch(session, CheckoutAction::ConsentToggled(true));
        assert!(session.locked());

        session = dispatch(
            session,
            CheckoutAction::SecureFieldChanged(SecureFieldChange {
                kind: SecureFieldKind::CardCvc,
                complete: false,
                error: Some("Your card's security code is incomplete.".into()),
            }),
        );
        assert!(!session.consent.granted());
        assert!(!session.locked());
        assert_eq!(session.lock, Some(LockCommand::Unlock));
    }

    #[test]
    fn test_unchecking_revokes_consent() {
        let mut session = fill_inputs(Rc::new(CheckoutSession::default()));
        for kind in SecureFieldKind::ALL {
            session = dispatch(session, complete(kind));
        }
        session = dispatch(session, CheckoutAction::ConsentToggled(true));
        assert!(session.consent.granted());

        session = dispatch(session, CheckoutAction::ConsentToggled(false));
        assert!(!session.consent.granted());
    }

    #[test]
    fn test_input_events_are_dropped_while_locked() {
        let mut session = fill_inputs(Rc::new(CheckoutSession::default()));
        for kind in SecureFieldKind::ALL {
            session = dispatch(session, complete(kind));
        }
        session = dispatch(session, CheckoutAction::ConsentToggled(true));

        session = dispatch(
            session,
            CheckoutAction::InputChanged(FormField::ZipCode, "tampered".into()),
        );
        assert_eq!(session.inputs.zip_code, "90210");
        assert!(session.consent.granted());
    }

    #[test]
    fn test_submission_blocked_until_price_resolves() {
        let mut session = fill_inputs(Rc::new(CheckoutSession::default()));
        for kind in SecureFieldKind::ALL {
            session = dispatch(session, complete(kind));
        }
        session = dispatch(session, CheckoutAction::ConsentToggled(true));
        assert!(session.consent.granted());
        assert!(!session.can_submit());

        session = dispatch(session, CheckoutAction::PriceResolved(1999));
        assert!(session.can_submit());
    }

    #[test]
    fn test_submission_lifecycle_through_the_reducer() {
        let mut session = fill_inputs(Rc::new(CheckoutSession::default()));
        for kind in SecureFieldKind::ALL {
            session = dispatch(session, complete(kind));
        }
        session = dispatch(session, CheckoutAction::PriceResolved(1999));
        session = dispatch(session, CheckoutAction::ConsentToggled(true));

        session = dispatch(session, CheckoutAction::SubmissionBegan);
        assert_eq!(*session.submission.state(), SubmissionState::Submitting);
        assert!(!session.can_submit());

        session = dispatch(
            session,
            CheckoutAction::SubmissionFinished(SubmissionState::Failed("declined".into())),
        );
        assert!(!session.submission.in_flight());
        assert!(session.can_submit(), "retry allowed while fields stay locked");
        assert!(session.locked());

        session = dispatch(session, CheckoutAction::SubmissionBegan);
        session = dispatch(
            session,
            CheckoutAction::SubmissionFinished(SubmissionState::Succeeded),
        );
        assert!(!session.can_submit(), "a settled attempt is terminal");
    }

    #[test]
    fn test_begin_without_consent_is_ignored() {
        let session = dispatch(
            Rc::new(CheckoutSession::default()),
            CheckoutAction::SubmissionBegan,
        );
        assert_eq!(*session.submission.state(), SubmissionState::Idle);
    }
}
