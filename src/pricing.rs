//! pricing.rs
//!
//! Price lookup for the service being paid for, and the one place where a
//! decimal price becomes an integer amount of minor currency units.
//!
//! The charge amount is trusted verbatim from this lookup. It is converted
//! exactly once with decimal arithmetic; nothing downstream ever recomputes
//! it from user input, and no binary floating point touches the money path.

use gloo_net::http::Request;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::GatewayError;

/// Details returned by the price lookup service.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ServiceDetails {
    /// Price in decimal currency units, e.g. `19.99`.
    pub price: Decimal,
}

/// Convert a decimal price in major units to an integer count of minor units
/// (cents), rounding to the nearest unit. `None` on overflow.
pub fn to_minor_units(price: Decimal) -> Option<i64> {
    price.checked_mul(Decimal::ONE_HUNDRED)?.round().to_i64()
}

/// Fetch the details of a service from the backend.
///
/// `GET {api_base_url}/services/{service_id}` returning
/// `{ "price": "19.99" }`.
pub async fn fetch_service_details(
    api_base_url: &str,
    service_id: &str,
) -> Result<ServiceDetails, GatewayError> {
    let url = format!("{api_base_url}/services/{service_id}");
    let response = Request::get(&url)
        .send()
        .await
        .map_err(|err| GatewayError::Network(err.to_string()))?;
    if !response.ok() {
        return Err(GatewayError::MalformedResponse(format!(
            "unexpected status {}",
            response.status()
        )));
    }
    response
        .json::<ServiceDetails>()
        .await
        .map_err(|err| GatewayError::MalformedResponse(err.to_string()))
}
