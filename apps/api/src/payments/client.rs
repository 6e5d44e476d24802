/// Payment gateway client — the single point of entry for all gateway calls.
///
/// The gateway tokenizes card details on the client side; this service only
/// ever creates payment intents and hands the resulting client secret back.
/// Creating an intent is not idempotent, so failures are surfaced immediately
/// and never retried here — the user retries manually from the payment form.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Serialize)]
struct CreateIntentRequest {
    /// Amount in the currency's minor unit (cents).
    amount: i64,
    currency: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Confirmed client-side by the payment SDK.
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct GatewayError {
    error: GatewayErrorBody,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    api_url: String,
    secret_key: String,
}

impl PaymentClient {
    pub fn new(api_url: String, secret_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_url,
            secret_key,
        }
    }

    /// Creates a payment intent for `amount_cents` and returns it with the
    /// client secret the caller confirms against.
    pub async fn create_intent(&self, amount_cents: i64) -> Result<PaymentIntent, PaymentError> {
        let request_body = CreateIntentRequest {
            amount: amount_cents,
            currency: "usd",
        };

        let response = self
            .client
            .post(format!("{}/payment_intents", self.api_url))
            .bearer_auth(&self.secret_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: extract_gateway_message(&body),
            });
        }

        let intent: PaymentIntent = response.json().await?;
        debug!("payment intent {} created for {amount_cents} cents", intent.id);
        Ok(intent)
    }
}

/// Pulls the provider-supplied message out of a gateway error body, falling
/// back to the raw body when it is not the expected JSON shape.
fn extract_gateway_message(body: &str) -> String {
    serde_json::from_str::<GatewayError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_gateway_message_from_json_body() {
        let body = r#"{"error": {"message": "Your card was declined."}}"#;
        assert_eq!(extract_gateway_message(body), "Your card was declined.");
    }

    #[test]
    fn test_extract_gateway_message_falls_back_to_raw_body() {
        assert_eq!(extract_gateway_message("upstream timeout"), "upstream timeout");
    }

    #[test]
    fn test_payment_intent_deserializes() {
        let json = r#"{"id": "pi_123", "client_secret": "pi_123_secret_abc"}"#;
        let intent: PaymentIntent = serde_json::from_str(json).unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret, "pi_123_secret_abc");
    }
}
