use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::session::gate;
use crate::session::resolver::SessionState;
use crate::state::AppState;

/// Subscriptions top out well below this; anything above it is a client bug.
const MAX_CHARGE_DOLLARS: f64 = 10_000.0;

#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Dollar amount as the subscription page displays it.
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

/// POST /create-payment-intent
///
/// Gateway failures surface with the provider's message so the payment form
/// can show it and stay editable for a manual retry.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    Json(req): Json<CreatePaymentIntentRequest>,
) -> Result<Json<CreatePaymentIntentResponse>, AppError> {
    gate::require_user(&session)?;

    let cents = to_minor_units(req.amount).map_err(|msg| AppError::Validation(msg.to_string()))?;
    let intent = state
        .payments
        .create_intent(cents)
        .await
        .map_err(|e| AppError::Payment(e.to_string()))?;

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Converts a dollar amount to integer cents, rejecting anything that is not
/// a sane positive charge.
fn to_minor_units(amount: f64) -> Result<i64, &'static str> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err("amount must be a positive number");
    }
    if amount > MAX_CHARGE_DOLLARS {
        return Err("amount exceeds the maximum charge");
    }
    Ok((amount * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_dollars_convert_to_cents() {
        assert_eq!(to_minor_units(20.0), Ok(2000));
    }

    #[test]
    fn test_fractional_dollars_round_to_nearest_cent() {
        assert_eq!(to_minor_units(9.99), Ok(999));
        assert_eq!(to_minor_units(4.5), Ok(450));
    }

    #[test]
    fn test_zero_and_negative_amounts_are_rejected() {
        assert!(to_minor_units(0.0).is_err());
        assert!(to_minor_units(-5.0).is_err());
    }

    #[test]
    fn test_non_finite_amounts_are_rejected() {
        assert!(to_minor_units(f64::NAN).is_err());
        assert!(to_minor_units(f64::INFINITY).is_err());
    }

    #[test]
    fn test_excessive_amounts_are_rejected() {
        assert!(to_minor_units(10_000.01).is_err());
    }
}
