//! client.rs
//!
//! High-level Rust API over the Stripe.js card elements and the payment
//! backend, for Yew checkout forms.
//!
//! This module provides:
//! - `SecureFieldSelectors` / `SecureFieldOptions` to configure where and how
//!   the three card elements are mounted.
//! - `StripeSecureFields`: the mounted number/expiry/CVC elements. Implements
//!   the narrow [`SecureFieldWidget`] capability (enable/disable) and
//!   forwards widget change events as typed [`SecureFieldChange`] values.
//! - `StripeGateway`: the production [`PaymentGateway`]. Tokenizes the card
//!   through the widget (the crate never sees digits), then posts the charge
//!   to the backend and parses the processor's verdict.
//!
//! Everything here is the JS-facing edge; the state machine that consumes
//! these types lives in the pure core modules and is tested against doubles.

use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Object, Reflect};
use yew::Callback;

use async_trait::async_trait;
use gloo_net::http::Request;
use gloo_utils::format::JsValueSerdeExt;

use crate::bindings::{JsCardElement, JsElements, JsStripe};
use crate::errors::{GatewayError, ProcessorFailure};
use crate::secure_fields::{SecureFieldChange, SecureFieldKind, SecureFieldWidget};
use crate::submission::{PaymentGateway, PaymentRequest, PaymentResponse};

/// CSS selectors the three card elements are mounted into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecureFieldSelectors {
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvc: String,
}

impl Default for SecureFieldSelectors {
    fn default() -> Self {
        Self {
            card_number: "#card-number-element".into(),
            card_expiry: "#card-expiry-element".into(),
            card_cvc: "#card-cvc-element".into(),
        }
    }
}

impl SecureFieldSelectors {
    fn get(&self, kind: SecureFieldKind) -> &str {
        match kind {
            SecureFieldKind::CardNumber => &self.card_number,
            SecureFieldKind::CardExpiry => &self.card_expiry,
            SecureFieldKind::CardCvc => &self.card_cvc,
        }
    }
}

/// Optional customization passed through to `elements.create(...)`.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct SecureFieldOptions {
    /// Widget styling, forwarded verbatim (e.g. fonts, colors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
}

/// Shape of a widget change event, as delivered by Stripe.js.
#[derive(Deserialize)]
struct RawChangeEvent {
    #[serde(default)]
    complete: bool,
    #[serde(default)]
    error: Option<RawChangeError>,
}

#[derive(Deserialize)]
struct RawChangeError {
    message: String,
}

/// Error object attached to a rejected `createPaymentMethod` call.
#[derive(Deserialize)]
struct RawWidgetError {
    #[serde(default)]
    code: Option<String>,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// The three mounted card elements.
///
/// Handles are opaque: they surface change events and act as tokens at
/// submission time, nothing else crosses the boundary.
#[derive(Clone, Debug)]
pub struct StripeSecureFields {
    elements: JsElements,
    card_number: JsCardElement,
    card_expiry: JsCardElement,
    card_cvc: JsCardElement,
}

impl StripeSecureFields {
    /// Create the three card elements and mount them into the DOM.
    ///
    /// # Arguments
    ///
    /// * `stripe` – handle from [`crate::bindings::new_stripe`].
    /// * `selectors` – where each element mounts.
    /// * `options` – optional widget styling, applied to all three.
    pub fn mount(
        stripe: &JsStripe,
        selectors: &SecureFieldSelectors,
        options: Option<&SecureFieldOptions>,
    ) -> Result<Self, GatewayError> {
        let elements = stripe
            .elements(JsValue::UNDEFINED)
            .map_err(js_widget_error)?;

        let opts_js = match options {
            Some(opts) => {
                to_value(opts).map_err(|err| GatewayError::Widget(err.to_string()))?
            }
            None => JsValue::UNDEFINED,
        };

        let create_and_mount = |kind: SecureFieldKind| -> Result<JsCardElement, GatewayError> {
            let element = elements
                .create_element(kind.element_type(), opts_js.clone())
                .map_err(js_widget_error)?;
            element.mount(selectors.get(kind)).map_err(js_widget_error)?;
            Ok(element)
        };

        let card_number = create_and_mount(SecureFieldKind::CardNumber)?;
        let card_expiry = create_and_mount(SecureFieldKind::CardExpiry)?;
        let card_cvc = create_and_mount(SecureFieldKind::CardCvc)?;

        Ok(Self {
            elements,
            card_number,
            card_expiry,
            card_cvc,
        })
    }

    fn handle(&self, kind: SecureFieldKind) -> &JsCardElement {
        match kind {
            SecureFieldKind::CardNumber => &self.card_number,
            SecureFieldKind::CardExpiry => &self.card_expiry,
            SecureFieldKind::CardCvc => &self.card_cvc,
        }
    }

    /// Subscribe to a field's change events as typed [`SecureFieldChange`]
    /// values. Unparseable events are logged and dropped.
    pub fn on_change(&self, kind: SecureFieldKind, callback: Callback<SecureFieldChange>) {
        let handler = Closure::<dyn Fn(JsValue)>::new(move |event: JsValue| {
            match from_value::<RawChangeEvent>(event) {
                Ok(raw) => callback.emit(SecureFieldChange {
                    kind,
                    complete: raw.complete,
                    error: raw.error.map(|e| e.message),
                }),
                Err(err) => log::warn!("dropping unparseable {kind:?} change event: {err}"),
            }
        });
        self.handle(kind).on("change", handler.as_ref().unchecked_ref());
        // The element owns the subscription for the life of the page.
        handler.forget();
    }

    /// Tear the elements down so a fresh form can be mounted in their place.
    pub fn unmount(&self) -> Result<(), GatewayError> {
        for kind in SecureFieldKind::ALL {
            self.handle(kind).unmount().map_err(js_widget_error)?;
        }
        Ok(())
    }

    /// The underlying Elements factory, for embedders that need to create
    /// additional widget elements alongside the card fields.
    pub fn elements(&self) -> &JsElements {
        &self.elements
    }
}

impl SecureFieldWidget for StripeSecureFields {
    fn set_disabled(&self, kind: SecureFieldKind, disabled: bool) {
        let opts = Object::new();
        Reflect::set(
            &opts,
            &JsValue::from_str("disabled"),
            &JsValue::from_bool(disabled),
        )
        .unwrap();
        if let Err(error) = self.handle(kind).update(opts.into()) {
            log::warn!("failed to toggle {kind:?} element: {error:?}");
        }
    }
}

/// Billing details sent alongside the card token.
#[derive(Serialize)]
struct BillingDetails<'a> {
    name: &'a str,
    address: BillingAddress<'a>,
}

#[derive(Serialize)]
struct BillingAddress<'a> {
    postal_code: &'a str,
    state: &'a str,
}

/// JSON body of the charge call to the backend.
#[derive(Serialize)]
struct ChargeRequest<'a> {
    user_id: &'a str,
    payment_method: &'a str,
    amount_minor_units: i64,
    card_holder_name: &'a str,
    zip_code: &'a str,
    state_code: &'a str,
}

/// Production payment gateway: Stripe.js tokenization plus the backend
/// charge endpoint.
#[derive(Clone, Debug)]
pub struct StripeGateway {
    stripe: JsStripe,
    fields: StripeSecureFields,
    api_base_url: String,
}

impl StripeGateway {
    pub fn new(
        stripe: JsStripe,
        fields: StripeSecureFields,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            stripe,
            fields,
            api_base_url: api_base_url.into(),
        }
    }

    pub fn fields(&self) -> &StripeSecureFields {
        &self.fields
    }

    /// Exchange the card elements for an opaque payment-method token.
    ///
    /// A widget-side rejection (invalid number, expired card caught at
    /// tokenization) comes back as `Ok(Err(failure))`: a processor verdict,
    /// not a transport error.
    async fn tokenize(
        &self,
        request: &PaymentRequest,
    ) -> Result<Result<String, ProcessorFailure>, GatewayError> {
        let opts = Object::new();
        Reflect::set(&opts, &JsValue::from_str("type"), &JsValue::from_str("card")).unwrap();
        Reflect::set(
            &opts,
            &JsValue::from_str("card"),
            self.fields.handle(SecureFieldKind::CardNumber).as_ref(),
        )
        .unwrap();
        let billing = to_value(&BillingDetails {
            name: &request.card_holder_name,
            address: BillingAddress {
                postal_code: &request.zip_code,
                state: &request.state_code,
            },
        })
        .map_err(|err| GatewayError::Widget(err.to_string()))?;
        Reflect::set(&opts, &JsValue::from_str("billing_details"), &billing).unwrap();

        let promise = self
            .stripe
            .create_payment_method(opts.into())
            .map_err(js_widget_error)?;
        let result = JsFuture::from(promise).await.map_err(js_widget_error)?;

        let error = Reflect::get(&result, &JsValue::from_str("error")).unwrap_or(JsValue::UNDEFINED);
        if !error.is_undefined() && !error.is_null() {
            let raw: RawWidgetError = error
                .into_serde()
                .map_err(|err| GatewayError::MalformedResponse(err.to_string()))?;
            return Ok(Err(ProcessorFailure {
                category: raw.code.or(raw.error_type),
                detail: raw.message,
            }));
        }

        let id = Reflect::get(&result, &JsValue::from_str("paymentMethod"))
            .ok()
            .and_then(|pm| Reflect::get(&pm, &JsValue::from_str("id")).ok())
            .and_then(|id| id.as_string())
            .ok_or_else(|| {
                GatewayError::MalformedResponse("tokenization returned no payment method".into())
            })?;
        Ok(Ok(id))
    }
}

#[async_trait(?Send)]
impl PaymentGateway for StripeGateway {
    async fn submit_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentResponse, GatewayError> {
        // 1) Tokenize through the widget; card data never crosses here.
        let payment_method = match self.tokenize(request).await? {
            Ok(id) => id,
            Err(failure) => {
                return Ok(PaymentResponse {
                    success: false,
                    error: Some(failure),
                })
            }
        };

        // 2) Charge through the backend.
        let url = format!(
            "{}/services/{}/payments",
            self.api_base_url, request.service_id
        );
        let response = Request::post(&url)
            .json(&ChargeRequest {
                user_id: &request.user_id,
                payment_method: &payment_method,
                amount_minor_units: request.amount_minor_units,
                card_holder_name: &request.card_holder_name,
                zip_code: &request.zip_code,
                state_code: &request.state_code,
            })
            .map_err(|err| GatewayError::Network(err.to_string()))?
            .send()
            .await
            .map_err(|err| GatewayError::Network(err.to_string()))?;

        if response.status() >= 500 {
            return Err(GatewayError::Network(format!(
                "service error {}",
                response.status()
            )));
        }
        if !response.ok() {
            return Err(GatewayError::MalformedResponse(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        // 3) The processor's verdict, translated later for display.
        response
            .json::<PaymentResponse>()
            .await
            .map_err(|err| GatewayError::MalformedResponse(err.to_string()))
    }
}

/// Convert a caught `JsValue` into a widget-side `GatewayError`.
fn js_widget_error(value: JsValue) -> GatewayError {
    GatewayError::Widget(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}
