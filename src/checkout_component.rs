//! A drop-in Yew checkout form for card payments.
//!
//! This component renders the cardholder/ZIP/state inputs, mounts the three
//! secure card fields from the external widget, fetches the price of the
//! service being bought, and gates submission behind an explicit consent
//! checkbox. All decisions are delegated to the core state machine: the
//! validation engine, the secure-field tracker, the consent gate, and the
//! submission orchestrator. The component itself is glue: markup, event
//! wiring, and the imperative lock/unlock calls into the widget.

use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::bindings::new_stripe;
use crate::client::{SecureFieldOptions, SecureFieldSelectors, StripeGateway, StripeSecureFields};
use crate::components::{Button, StateSelect, TextInput};
use crate::consent::{apply_lock, LockCommand};
use crate::errors::FALLBACK_MESSAGE;
use crate::interop::use_stripejs;
use crate::pricing::{fetch_service_details, to_minor_units};
use crate::secure_fields::{SecureFieldKind, SecureFieldSet};
use crate::session::{CheckoutAction, CheckoutSession};
use crate::submission::{run_attempt, OrderContext, SubmissionState};
use crate::validation::{FormField, ValidationErrors};

/// Properties for the [`CardCheckout`] component.
///
/// # Fields
///
/// * `publishable_key` – The widget's publishable key (`pk_…`).
/// * `service_id` – The service being paid for; drives the price lookup.
/// * `user_id` – Session-scoped user identifier, injected by the embedding
///   app (read it from your session storage and pass it in).
/// * `api_base_url` – Backend base URL for the price lookup and the charge.
/// * `secure_field_options` – Optional styling for the card elements.
/// * `on_success` – Invoked with the charged amount in minor units.
/// * `on_error` – Invoked with the display-safe failure message.
/// * `button_label` – Override the pay button text.
/// * `children` – Extra nodes (service description etc.) rendered above the
///   form.
#[derive(Properties, PartialEq, Clone)]
pub struct CardCheckoutProps {
    pub publishable_key: String,
    pub service_id: String,
    pub user_id: String,
    pub api_base_url: String,
    #[prop_or_default]
    pub secure_field_options: Option<SecureFieldOptions>,
    #[prop_or_default]
    pub on_success: Callback<i64>,
    #[prop_or_default]
    pub on_error: Callback<String>,
    #[prop_or_default]
    pub button_label: Option<String>,
    #[prop_or_default]
    pub children: Children,
}

/// Yew function component rendering a complete card checkout form.
///
/// The component will:
/// 1. Load the widget script once per page and mount the card number,
///    expiry, and CVC elements.
/// 2. Fetch the service price and resolve it to minor units exactly once; a
///    failed lookup is logged and keeps the pay button disabled.
/// 3. Validate the plain inputs on every keystroke and track widget change
///    events per field.
/// 4. Re-derive consent on every toggle and event; granting consent freezes
///    all inputs, revoking it (explicitly or because a late error arrived)
///    unfreezes them.
/// 5. Submit through the payment gateway with an exclusive in-flight guard,
///    translating every failure into a fixed safe sentence.
///
/// # Example
///
/// ```rust,ignore
/// use yew::prelude::*;
/// use yew_card_checkout::CardCheckout;
///
/// #[function_component(App)]
/// fn app() -> Html {
///     let on_success = Callback::from(|amount: i64| {
///         log::info!("charged {amount} minor units");
///     });
///     html! {
///         <CardCheckout
///             publishable_key="pk_test_123"
///             service_id="svc_9"
///             user_id="user_42"
///             api_base_url="https://api.example.com"
///             on_success={on_success}
///         >
///             <p>{ "Annual consultation – $25.00" }</p>
///         </CardCheckout>
///     }
/// }
/// ```
#[function_component(CardCheckout)]
pub fn card_checkout(props: &CardCheckoutProps) -> Html {
    let stripe_ready = use_stripejs();
    let session = use_reducer(CheckoutSession::default);
    let gateway = use_mut_ref(|| None::<Rc<StripeGateway>>);

    // Mount the secure fields once the widget script is ready.
    {
        let session = session.clone();
        let gateway = gateway.clone();
        let pk = props.publishable_key.clone();
        let api_base_url = props.api_base_url.clone();
        let options = props.secure_field_options.clone();
        let on_error = props.on_error.clone();
        use_effect_with(stripe_ready, move |ready| {
            if *ready && gateway.borrow().is_none() {
                let stripe = new_stripe(&pk);
                match StripeSecureFields::mount(
                    &stripe,
                    &SecureFieldSelectors::default(),
                    options.as_ref(),
                ) {
                    Ok(fields) => {
                        for kind in SecureFieldKind::ALL {
                            let session = session.clone();
                            fields.on_change(
                                kind,
                                Callback::from(move |change| {
                                    session.dispatch(CheckoutAction::SecureFieldChanged(change));
                                }),
                            );
                        }
                        *gateway.borrow_mut() =
                            Some(Rc::new(StripeGateway::new(stripe, fields, api_base_url)));
                    }
                    Err(error) => {
                        log::error!("failed to mount secure fields: {error}");
                        on_error.emit(FALLBACK_MESSAGE.to_string());
                    }
                }
            }
            || ()
        });
    }

    // Resolve the price once at mount. A failure is logged and leaves the
    // amount unresolved, which keeps submission blocked.
    {
        let session = session.clone();
        let api_base_url = props.api_base_url.clone();
        let service_id = props.service_id.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match fetch_service_details(&api_base_url, &service_id).await {
                    Ok(details) => match to_minor_units(details.price) {
                        Some(amount) => {
                            session.dispatch(CheckoutAction::PriceResolved(amount));
                        }
                        None => log::error!("service {service_id} price out of range"),
                    },
                    Err(error) => {
                        log::error!("price lookup for service {service_id} failed: {error}");
                    }
                }
            });
            || ()
        });
    }

    // The consent gate is the only writer of the fields' disabled state; its
    // lock directives are applied to the widget here, and the plain inputs
    // read the granted flag in the markup below.
    {
        let gateway = gateway.clone();
        use_effect_with(session.lock, move |lock: &Option<LockCommand>| {
            if let (Some(gateway), Some(command)) = (gateway.borrow().as_ref(), *lock) {
                apply_lock(gateway.fields(), command);
            }
            || ()
        });
    }

    let on_consent = {
        let session = session.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            session.dispatch(CheckoutAction::ConsentToggled(input.checked()));
        })
    };

    let on_submit = {
        let session = session.clone();
        let gateway = gateway.clone();
        let service_id = props.service_id.clone();
        let user_id = props.user_id.clone();
        let on_success = props.on_success.clone();
        let on_error = props.on_error.clone();
        Callback::from(move |_: MouseEvent| {
            if !session.can_submit() {
                return;
            }
            let Some(gateway) = gateway.borrow().clone() else {
                return;
            };
            let Some(amount_minor_units) = session.amount_minor_units else {
                return;
            };
            let order = OrderContext {
                service_id: service_id.clone(),
                user_id: user_id.clone(),
                amount_minor_units,
            };
            let inputs = session.inputs.clone();
            let session = session.clone();
            let on_success = on_success.clone();
            let on_error = on_error.clone();
            session.dispatch(CheckoutAction::SubmissionBegan);
            spawn_local(async move {
                let outcome = run_attempt(&*gateway, &inputs, &order).await;
                match &outcome {
                    SubmissionState::Succeeded => on_success.emit(order.amount_minor_units),
                    SubmissionState::Failed(message) => on_error.emit(message.clone()),
                    _ => {}
                }
                session.dispatch(CheckoutAction::SubmissionFinished(outcome));
            });
        })
    };

    let locked = session.locked();
    let submitting = session.submission.in_flight();
    let pay_label = if submitting {
        "Processing…".to_string()
    } else if let Some(label) = &props.button_label {
        label.clone()
    } else if let Some(amount) = session.amount_minor_units {
        format!("Pay ${}.{:02}", amount / 100, amount % 100)
    } else {
        "Pay".to_string()
    };

    html! {
        <div class="w-full max-w-lg mx-auto">
            { for props.children.iter() }
            <div class="bg-white p-5 rounded-md shadow-sm">
                <div class="mb-6">
                    <label for="card-holder-name" class="block mb-2 text-sm text-gray-600">
                        { "Name on Card" }
                    </label>
                    <TextInput
                        id={Some("card-holder-name".to_string())}
                        value={session.inputs.card_holder_name.clone()}
                        placeholder="John Doe"
                        disabled={locked}
                        oninput={input_callback(&session, FormField::CardHolderName)}
                    />
                    { field_error(&session.input_errors, FormField::CardHolderName) }
                </div>

                <div class="mb-6">
                    <label class="block mb-2 text-sm text-gray-600">
                        { SecureFieldKind::CardNumber.label() }
                    </label>
                    <div id="card-number-element" class="p-3 border border-gray-300 rounded-md" />
                    { secure_field_error(&session.fields, SecureFieldKind::CardNumber) }
                </div>

                <div class="flex mb-6 -mx-2">
                    <div class="w-1/2 px-2">
                        <label class="block mb-2 text-sm text-gray-600">
                            { SecureFieldKind::CardExpiry.label() }
                        </label>
                        <div id="card-expiry-element" class="p-3 border border-gray-300 rounded-md" />
                        { secure_field_error(&session.fields, SecureFieldKind::CardExpiry) }
                    </div>
                    <div class="w-1/2 px-2">
                        <label class="block mb-2 text-sm text-gray-600">
                            { SecureFieldKind::CardCvc.label() }
                        </label>
                        <div id="card-cvc-element" class="p-3 border border-gray-300 rounded-md" />
                        { secure_field_error(&session.fields, SecureFieldKind::CardCvc) }
                    </div>
                </div>

                <div class="flex mb-6 -mx-2">
                    <div class="w-2/3 px-2">
                        <label for="postal-code" class="block mb-2 text-sm text-gray-600">
                            { "ZIP / Postal Code" }
                        </label>
                        <TextInput
                            id={Some("postal-code".to_string())}
                            value={session.inputs.zip_code.clone()}
                            disabled={locked}
                            oninput={input_callback(&session, FormField::ZipCode)}
                        />
                        { field_error(&session.input_errors, FormField::ZipCode) }
                    </div>
                    <div class="w-1/3 px-2">
                        <label for="state" class="block mb-2 text-sm text-gray-600">
                            { "State" }
                        </label>
                        <StateSelect
                            id={Some("state".to_string())}
                            value={session.inputs.state_code.clone()}
                            disabled={locked}
                            onchange={input_callback(&session, FormField::StateCode)}
                        />
                        { field_error(&session.input_errors, FormField::StateCode) }
                    </div>
                </div>

                <div class="flex items-center mb-6">
                    <input
                        type="checkbox"
                        id="terms"
                        checked={session.consent.granted()}
                        onchange={on_consent}
                        class="form-checkbox"
                    />
                    <label for="terms" class="ml-2 text-sm text-gray-600">
                        { "I agree to the terms and conditions" }
                    </label>
                </div>

                <Button
                    label={pay_label}
                    disabled={!stripe_ready || !session.can_submit()}
                    onclick={on_submit}
                />

                {
                    match session.submission.state() {
                        SubmissionState::Failed(message) => html! {
                            <p class="text-red-500 text-sm mt-3" aria-live="polite">{ message }</p>
                        },
                        SubmissionState::Succeeded => html! {
                            <p class="text-green-600 text-sm mt-3">{ "Payment succeeded. Thank you!" }</p>
                        },
                        _ => Html::default(),
                    }
                }
            </div>
        </div>
    }
}

fn input_callback(
    session: &UseReducerHandle<CheckoutSession>,
    field: FormField,
) -> Callback<String> {
    let session = session.clone();
    Callback::from(move |value: String| {
        session.dispatch(CheckoutAction::InputChanged(field, value));
    })
}

fn field_error(errors: &ValidationErrors, field: FormField) -> Html {
    match errors.get(&field) {
        Some(message) => html! { <p class="text-red-500 text-xs italic">{ message }</p> },
        None => Html::default(),
    }
}

fn secure_field_error(fields: &SecureFieldSet, kind: SecureFieldKind) -> Html {
    match fields.error(kind) {
        Some(message) => html! { <p class="text-red-500 text-xs italic">{ message }</p> },
        None => Html::default(),
    }
}
