//! submission.rs
//!
//! The submission orchestrator: an async workflow that defensively
//! re-validates the form, delegates the charge to the payment service, and
//! folds every outcome into a small state machine.
//!
//! State machine: `Idle --submit--> Submitting --> Succeeded | Failed`, with
//! retry allowed from `Failed` and `Succeeded` terminal for the attempt.
//! Exactly one submission may be in flight per form session; the in-flight
//! guard is released on every exit path so the form can never be left stuck
//! in `Submitting`.

use async_trait::async_trait;

use crate::consent::ConsentState;
use crate::errors::{gateway_message, user_message, GatewayError, ProcessorFailure};
use crate::validation::{validate, FormInputs};

/// Shown when the defensive re-validation finds errors that the UI gate
/// should already have caught.
pub const REVALIDATION_MESSAGE: &str = "Please correct the highlighted fields and try again.";

/// Lifecycle of a submission attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    /// Holds the translated, display-safe failure message.
    Failed(String),
}

/// Everything about the order that does not come from the form: which
/// service is being bought, who is paying, and the already-resolved amount.
///
/// `user_id` is an ambient session value in the embedding app; it is passed
/// in explicitly so the orchestrator stays pure with respect to its inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderContext {
    pub service_id: String,
    pub user_id: String,
    /// Minor currency units, resolved once by the price lookup.
    pub amount_minor_units: i64,
}

/// Outbound charge request handed to the payment service. Card data never
/// appears here; the gateway implementation holds the opaque widget handles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRequest {
    pub service_id: String,
    pub user_id: String,
    pub amount_minor_units: i64,
    pub card_holder_name: String,
    pub zip_code: String,
    pub state_code: String,
}

impl PaymentRequest {
    pub fn new(inputs: &FormInputs, order: &OrderContext) -> Self {
        Self {
            service_id: order.service_id.clone(),
            user_id: order.user_id.clone(),
            amount_minor_units: order.amount_minor_units,
            card_holder_name: inputs.card_holder_name.clone(),
            zip_code: inputs.zip_code.clone(),
            state_code: inputs.state_code.clone(),
        }
    }
}

/// Inbound result from the payment service.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct PaymentResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<ProcessorFailure>,
}

/// The external payment service, abstracted so the orchestrator can be
/// driven against a deterministic stub. Futures are `?Send`: everything runs
/// on the browser's single thread.
#[async_trait(?Send)]
pub trait PaymentGateway {
    async fn submit_payment(&self, request: &PaymentRequest)
        -> Result<PaymentResponse, GatewayError>;
}

/// Steps of one attempt after the preconditions passed: re-validate, call
/// the gateway, translate the outcome. Callers normally go through
/// [`SubmissionDriver::submit`], or through the
/// [`SubmissionDriver::try_begin`] / [`SubmissionDriver::finish`] split when
/// a UI needs to observe the `Submitting` state across the await point.
pub async fn run_attempt<G: PaymentGateway>(
    gateway: &G,
    inputs: &FormInputs,
    order: &OrderContext,
) -> SubmissionState {
    if !validate(inputs).is_empty() {
        return SubmissionState::Failed(REVALIDATION_MESSAGE.to_string());
    }

    let request = PaymentRequest::new(inputs, order);
    match gateway.submit_payment(&request).await {
        Ok(response) if response.success => SubmissionState::Succeeded,
        Ok(response) => {
            SubmissionState::Failed(user_message(response.error.as_ref()).to_string())
        }
        Err(error) => {
            log::error!("payment submission failed: {error}");
            SubmissionState::Failed(gateway_message(&error).to_string())
        }
    }
}

/// Owns the submission state machine and the exclusive in-flight guard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmissionDriver {
    state: SubmissionState,
    in_flight: bool,
}

impl SubmissionDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether a new attempt may start: consent granted, nothing in flight,
    /// and the attempt not already concluded successfully.
    pub fn can_begin(&self, consent: ConsentState) -> bool {
        consent.granted()
            && !self.in_flight
            && !matches!(self.state, SubmissionState::Succeeded)
    }

    /// Enter `Submitting`, clearing any prior failure message. Returns
    /// `false` (leaving state untouched) when the preconditions fail; the UI
    /// trigger should already be disabled in that case, this is the
    /// defensive re-check.
    pub fn try_begin(&mut self, consent: ConsentState) -> bool {
        if !self.can_begin(consent) {
            return false;
        }
        self.in_flight = true;
        self.state = SubmissionState::Submitting;
        true
    }

    /// Record the outcome of the attempt and release the in-flight guard.
    pub fn finish(&mut self, outcome: SubmissionState) -> &SubmissionState {
        self.in_flight = false;
        self.state = outcome;
        &self.state
    }

    /// One full submission: precondition check, attempt, outcome. A call
    /// with unmet preconditions is a no-op that leaves the state unchanged
    /// and never touches the gateway.
    pub async fn submit<G: PaymentGateway>(
        &mut self,
        gateway: &G,
        consent: ConsentState,
        inputs: &FormInputs,
        order: &OrderContext,
    ) -> &SubmissionState {
        if !self.try_begin(consent) {
            return &self.state;
        }
        let outcome = run_attempt(gateway, inputs, order).await;
        self.finish(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::evaluate;
    use crate::errors::{DECLINED_MESSAGE, NETWORK_MESSAGE};
    use crate::secure_fields::{SecureFieldChange, SecureFieldKind, SecureFieldSet};
    use crate::validation::validate;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};

    struct StubGateway {
        result: RefCell<Vec<Result<PaymentResponse, GatewayError>>>,
        calls: Cell<usize>,
    }

    impl StubGateway {
        fn returning(result: Result<PaymentResponse, GatewayError>) -> Self {
            Self {
                result: RefCell::new(vec![result]),
                calls: Cell::new(0),
            }
        }

        fn with_sequence(results: Vec<Result<PaymentResponse, GatewayError>>) -> Self {
            let mut results = results;
            results.reverse();
            Self {
                result: RefCell::new(results),
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl PaymentGateway for StubGateway {
        async fn submit_payment(
            &self,
            _request: &PaymentRequest,
        ) -> Result<PaymentResponse, GatewayError> {
            self.calls.set(self.calls.get() + 1);
            self.result
                .borrow_mut()
                .pop()
                .expect("stub gateway exhausted")
        }
    }

    fn valid_inputs() -> FormInputs {
        FormInputs {
            card_holder_name: "Jane Doe".into(),
            zip_code: "90210".into(),
            state_code: "CA".into(),
        }
    }

    fn order() -> OrderContext {
        OrderContext {
            service_id: "svc_123".into(),
            user_id: "user_456".into(),
            amount_minor_units: 1999,
        }
    }

    fn granted_consent() -> ConsentState {
        let inputs = valid_inputs();
        let errors = validate(&inputs);
        let mut fields = SecureFieldSet::new();
        for kind in SecureFieldKind::ALL {
            fields.apply(&SecureFieldChange {
                kind,
                complete: true,
                error: None,
            });
        }
        let consent = evaluate(ConsentState::default(), true, &errors, &fields).state;
        assert!(consent.granted());
        consent
    }

    #[test]
    fn test_successful_submission_reaches_succeeded() {
        let gateway = StubGateway::returning(Ok(PaymentResponse {
            success: true,
            error: None,
        }));
        let mut driver = SubmissionDriver::new();

        let state = block_on(driver.submit(&gateway, granted_consent(), &valid_inputs(), &order()));
        assert_eq!(*state, SubmissionState::Succeeded);
        assert!(!driver.in_flight());
        assert_eq!(gateway.calls.get(), 1);
    }

    #[test]
    fn test_declined_payment_surfaces_translated_message_only() {
        let gateway = StubGateway::returning(Ok(PaymentResponse {
            success: false,
            error: Some(ProcessorFailure {
                category: Some("card_declined".into()),
                detail: Some("do not honor".into()),
            }),
        }));
        let mut driver = SubmissionDriver::new();

        block_on(driver.submit(&gateway, granted_consent(), &valid_inputs(), &order()));
        match driver.state() {
            SubmissionState::Failed(message) => {
                assert_eq!(message, DECLINED_MESSAGE);
                assert!(!message.contains("card_declined"));
                assert!(!message.contains("do not honor"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!driver.in_flight());
    }

    #[test]
    fn test_transport_failure_clears_in_flight_and_translates() {
        let gateway =
            StubGateway::returning(Err(GatewayError::Network("connection refused".into())));
        let mut driver = SubmissionDriver::new();

        block_on(driver.submit(&gateway, granted_consent(), &valid_inputs(), &order()));
        assert_eq!(
            *driver.state(),
            SubmissionState::Failed(NETWORK_MESSAGE.to_string())
        );
        assert!(!driver.in_flight());
    }

    #[test]
    fn test_submission_without_consent_is_a_no_op() {
        let gateway = StubGateway::returning(Ok(PaymentResponse {
            success: true,
            error: None,
        }));
        let mut driver = SubmissionDriver::new();

        block_on(driver.submit(&gateway, ConsentState::default(), &valid_inputs(), &order()));
        assert_eq!(*driver.state(), SubmissionState::Idle);
        assert_eq!(gateway.calls.get(), 0);
    }

    #[test]
    fn test_stale_inputs_fail_revalidation_without_reaching_gateway() {
        let gateway = StubGateway::returning(Ok(PaymentResponse {
            success: true,
            error: None,
        }));
        let mut driver = SubmissionDriver::new();
        let mut inputs = valid_inputs();
        inputs.zip_code = "not-a-zip".into();

        // Consent was derived from an older, valid snapshot.
        block_on(driver.submit(&gateway, granted_consent(), &inputs, &order()));
        assert_eq!(
            *driver.state(),
            SubmissionState::Failed(REVALIDATION_MESSAGE.to_string())
        );
        assert_eq!(gateway.calls.get(), 0);
        assert!(!driver.in_flight());
    }

    #[test]
    fn test_retry_is_allowed_from_failed() {
        let gateway = StubGateway::with_sequence(vec![
            Ok(PaymentResponse {
                success: false,
                error: Some(ProcessorFailure {
                    category: Some("card_declined".into()),
                    detail: None,
                }),
            }),
            Ok(PaymentResponse {
                success: true,
                error: None,
            }),
        ]);
        let mut driver = SubmissionDriver::new();
        let consent = granted_consent();

        block_on(driver.submit(&gateway, consent, &valid_inputs(), &order()));
        assert!(matches!(driver.state(), SubmissionState::Failed(_)));

        block_on(driver.submit(&gateway, consent, &valid_inputs(), &order()));
        assert_eq!(*driver.state(), SubmissionState::Succeeded);
        assert_eq!(gateway.calls.get(), 2);
    }

    #[test]
    fn test_succeeded_is_terminal() {
        let gateway = StubGateway::returning(Ok(PaymentResponse {
            success: true,
            error: None,
        }));
        let mut driver = SubmissionDriver::new();
        let consent = granted_consent();

        block_on(driver.submit(&gateway, consent, &valid_inputs(), &order()));
        assert_eq!(*driver.state(), SubmissionState::Succeeded);

        // A second submit for the same attempt never reaches the gateway.
        block_on(driver.submit(&gateway, consent, &valid_inputs(), &order()));
        assert_eq!(*driver.state(), SubmissionState::Succeeded);
        assert_eq!(gateway.calls.get(), 1);
    }

    #[test]
    fn test_in_flight_guard_is_exclusive() {
        let mut driver = SubmissionDriver::new();
        let consent = granted_consent();

        assert!(driver.try_begin(consent));
        assert!(driver.in_flight());
        assert_eq!(*driver.state(), SubmissionState::Submitting);

        // Second begin while in flight is refused.
        assert!(!driver.try_begin(consent));

        driver.finish(SubmissionState::Failed("nope".into()));
        assert!(!driver.in_flight());
        assert!(driver.try_begin(consent));
    }

    #[test]
    fn test_begin_clears_prior_failure_message() {
        let mut driver = SubmissionDriver::new();
        let consent = granted_consent();
        driver.try_begin(consent);
        driver.finish(SubmissionState::Failed("first failure".into()));

        assert!(driver.try_begin(consent));
        assert_eq!(*driver.state(), SubmissionState::Submitting);
    }
}
