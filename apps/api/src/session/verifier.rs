use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an identity-provider bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Provider-assigned subject id.
    pub sub: String,
    pub email: String,
    /// Display name, if the provider profile has one.
    pub name: Option<String>,
    /// Expiry as a unix timestamp. Checked during verification.
    pub exp: i64,
}

/// Verifies a bearer token issued by the external identity provider.
///
/// The provider itself (sign-in, sign-out, profile updates) stays external;
/// this is the only point where its tokens are trusted. Carried in `AppState`
/// as `Arc<dyn IdentityVerifier>` so a remote verifier (e.g. token
/// introspection) can be swapped in without touching the resolver.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Returns the claims for a valid, unexpired token; `None` otherwise.
    async fn verify(&self, token: &str) -> Option<IdentityClaims>;
}

/// HS256 shared-secret verifier.
pub struct HsVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl HsVerifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

#[async_trait]
impl IdentityVerifier for HsVerifier {
    async fn verify(&self, token: &str) -> Option<IdentityClaims> {
        decode::<IdentityClaims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";

    fn make_token(email: &str, exp: i64, secret: &[u8]) -> String {
        let claims = IdentityClaims {
            sub: "subject-1".to_string(),
            email: email.to_string(),
            name: Some("Test Reader".to_string()),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn test_valid_token_yields_claims() {
        let verifier = HsVerifier::new(SECRET);
        let token = make_token("reader@example.com", future_exp(), SECRET);
        let claims = verifier.verify(&token).await.unwrap();
        assert_eq!(claims.email, "reader@example.com");
        assert_eq!(claims.sub, "subject-1");
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let verifier = HsVerifier::new(SECRET);
        let token = make_token("reader@example.com", 1_000_000, SECRET);
        assert!(verifier.verify(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let verifier = HsVerifier::new(SECRET);
        let token = make_token("reader@example.com", future_exp(), b"other-secret");
        assert!(verifier.verify(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let verifier = HsVerifier::new(SECRET);
        assert!(verifier.verify("not-a-jwt").await.is_none());
    }
}
