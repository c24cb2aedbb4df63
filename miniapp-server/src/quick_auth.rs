//! Verification of Farcaster Quick Auth session tokens.
//!
//! A token is a compact JWS signed with Ed25519 by the Quick Auth service.
//! Its public keys are published as a JWKS document under
//! `<origin>/.well-known/jwks.json`; the key set is fetched lazily and cached
//! for [`KEY_SET_MAX_AGE`]. A token naming a key id the cache does not know
//! forces one refresh, at most once per [`KEY_SET_COOLDOWN`].

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ed25519_dalek::{Signature, VerifyingKey};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

pub const DEFAULT_ORIGIN: &str = "https://auth.farcaster.xyz";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuickAuthClaims {
    pub fid: u64,
    pub issuer: String,
    pub audience: String,
    pub expires_at: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("no signing key with id {0:?}")]
    UnknownKey(Option<String>),
    #[error("key set unavailable: {0}")]
    KeySet(String),
    #[error("key set transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl VerifyError {
    /// Whether the caller presented a bad token, as opposed to the
    /// verification machinery failing.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, VerifyError::InvalidToken(_) | VerifyError::UnknownKey(_))
    }
}

#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    async fn verify(&self, token: &str, domain: &str) -> Result<QuickAuthClaims, VerifyError>;
}

#[derive(Clone, Debug, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub crv: Option<String>,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub kid: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct KeySet {
    pub keys: Vec<Jwk>,
}

impl KeySet {
    fn verifying_keys(&self, kid: Option<&str>) -> Vec<VerifyingKey> {
        self.keys
            .iter()
            .filter(|k| k.kty == "OKP" && k.crv.as_deref() == Some("Ed25519"))
            .filter(|k| kid.is_none() || k.kid.as_deref() == kid)
            .filter_map(|k| {
                let raw = URL_SAFE_NO_PAD.decode(k.x.as_deref()?).ok()?;
                let bytes: [u8; 32] = raw.try_into().ok()?;
                VerifyingKey::from_bytes(&bytes).ok()
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct Header {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

#[derive(Deserialize)]
struct RawClaims {
    iss: String,
    sub: serde_json::Value,
    aud: serde_json::Value,
    exp: u64,
}

fn invalid(reason: impl Into<String>) -> VerifyError {
    VerifyError::InvalidToken(reason.into())
}

fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> Result<T, VerifyError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| invalid(format!("{what} is not base64url: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| invalid(format!("{what} is not valid JSON: {e}")))
}

fn subject_fid(sub: &serde_json::Value) -> Option<u64> {
    match sub {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .filter(|fid| *fid > 0)
}

fn audience_matches(aud: &serde_json::Value, domain: &str) -> bool {
    match aud {
        serde_json::Value::String(s) => s == domain,
        serde_json::Value::Array(items) => items.iter().any(|v| v.as_str() == Some(domain)),
        _ => false,
    }
}

/// Checks signature, issuer, audience and expiry of `token` at time `now`
/// (seconds since the epoch).
pub fn verify_token(
    token: &str,
    domain: &str,
    issuer: &str,
    keys: &KeySet,
    now: u64,
) -> Result<QuickAuthClaims, VerifyError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("token is not a compact JWS"));
    };

    let header: Header = decode_segment(header_b64, "header")?;
    if header.alg != "EdDSA" {
        return Err(invalid(format!("unsupported algorithm {}", header.alg)));
    }

    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| invalid(format!("signature is not base64url: {e}")))?;
    let signature =
        Signature::from_slice(&signature_bytes).map_err(|e| invalid(format!("bad signature: {e}")))?;

    let candidates = keys.verifying_keys(header.kid.as_deref());
    if candidates.is_empty() {
        return Err(VerifyError::UnknownKey(header.kid));
    }
    let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
    if !candidates
        .iter()
        .any(|key| key.verify_strict(signing_input.as_bytes(), &signature).is_ok())
    {
        return Err(invalid("signature verification failed"));
    }

    let claims: RawClaims = decode_segment(payload_b64, "payload")?;
    if claims.iss != issuer {
        return Err(invalid(format!("unexpected issuer {}", claims.iss)));
    }
    if !audience_matches(&claims.aud, domain) {
        return Err(invalid(format!("token not issued for {domain}")));
    }
    if claims.exp <= now {
        return Err(invalid("token expired"));
    }
    let fid = subject_fid(&claims.sub).ok_or_else(|| invalid("subject is not a fid"))?;

    Ok(QuickAuthClaims {
        fid,
        issuer: claims.iss,
        audience: domain.to_string(),
        expires_at: claims.exp,
    })
}

/// How long a fetched key set is trusted before it is fetched again.
pub const KEY_SET_MAX_AGE: Duration = Duration::from_secs(10 * 60);
/// Minimum spacing between refreshes forced by an unknown key id.
pub const KEY_SET_COOLDOWN: Duration = Duration::from_secs(30);

struct CachedKeys {
    keys: Arc<KeySet>,
    fetched_at: Instant,
}

pub struct QuickAuthClient {
    http: reqwest::Client,
    origin: String,
    max_age: Duration,
    cooldown: Duration,
    cache: RwLock<Option<CachedKeys>>,
}

impl QuickAuthClient {
    pub fn new(http: reqwest::Client, origin: &str) -> Self {
        Self::with_cache_policy(http, origin, KEY_SET_MAX_AGE, KEY_SET_COOLDOWN)
    }

    pub fn with_cache_policy(
        http: reqwest::Client,
        origin: &str,
        max_age: Duration,
        cooldown: Duration,
    ) -> Self {
        Self {
            http,
            origin: origin.trim_end_matches('/').to_string(),
            max_age,
            cooldown,
            cache: RwLock::new(None),
        }
    }

    /// Cached key set while it is younger than `max_age`, else a fresh one.
    async fn key_set(&self) -> Result<Arc<KeySet>, VerifyError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at.elapsed() < self.max_age {
                return Ok(cached.keys.clone());
            }
        }
        self.fetch().await
    }

    /// Forced refresh for an unknown key id; `None` while in the cooldown.
    async fn refresh(&self) -> Result<Option<Arc<KeySet>>, VerifyError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at.elapsed() < self.cooldown {
                return Ok(None);
            }
        }
        self.fetch().await.map(Some)
    }

    async fn fetch(&self) -> Result<Arc<KeySet>, VerifyError> {
        let url = format!("{}/.well-known/jwks.json", self.origin);
        debug!(%url, "fetching quick auth key set");
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(VerifyError::KeySet(format!("HTTP status {}", resp.status())));
        }
        let keys = Arc::new(resp.json::<KeySet>().await?);
        *self.cache.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }
}

#[async_trait]
impl TokenVerifier for QuickAuthClient {
    async fn verify(&self, token: &str, domain: &str) -> Result<QuickAuthClaims, VerifyError> {
        let now = unix_now();
        let keys = self.key_set().await?;
        match verify_token(token, domain, &self.origin, &keys, now) {
            Err(VerifyError::UnknownKey(kid)) => match self.refresh().await? {
                Some(keys) => verify_token(token, domain, &self.origin, &keys, now),
                None => {
                    debug!(?kid, "unknown key id within refresh cooldown");
                    Err(VerifyError::UnknownKey(kid))
                }
            },
            other => other,
        }
    }
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    duration.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    const DOMAIN: &str = "miniapp.example.com";

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn key_set_json(key: &SigningKey, kid: &str) -> serde_json::Value {
        serde_json::json!({
            "keys": [{
                "kty": "OKP",
                "crv": "Ed25519",
                "x": URL_SAFE_NO_PAD.encode(key.verifying_key().to_bytes()),
                "kid": kid,
            }]
        })
    }

    fn sign(key: &SigningKey, kid: &str, claims: serde_json::Value) -> String {
        let header = serde_json::json!({ "alg": "EdDSA", "typ": "JWT", "kid": kid });
        let input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        );
        let signature = key.sign(input.as_bytes());
        format!("{input}.{}", URL_SAFE_NO_PAD.encode(signature.to_bytes()))
    }

    fn claims(fid: u64, exp: u64) -> serde_json::Value {
        serde_json::json!({
            "iss": DEFAULT_ORIGIN,
            "sub": fid,
            "aud": DOMAIN,
            "iat": 1_000,
            "exp": exp,
        })
    }

    fn keys(key: &SigningKey) -> KeySet {
        serde_json::from_value(key_set_json(key, "k1")).expect("key set")
    }

    #[test]
    fn accepts_valid_token() {
        let key = signing_key();
        let token = sign(&key, "k1", claims(1234, 2_000));
        let verified = verify_token(&token, DOMAIN, DEFAULT_ORIGIN, &keys(&key), 1_500).expect("valid");
        assert_eq!(verified.fid, 1234);
        assert_eq!(verified.expires_at, 2_000);
    }

    #[test]
    fn rejects_expired_or_foreign_tokens() {
        let key = signing_key();
        let set = keys(&key);

        let expired = sign(&key, "k1", claims(1, 1_000));
        let err = verify_token(&expired, DOMAIN, DEFAULT_ORIGIN, &set, 1_500).expect_err("expired");
        assert!(err.is_invalid_token());

        let token = sign(&key, "k1", claims(1, 2_000));
        let err = verify_token(&token, "other.example.com", DEFAULT_ORIGIN, &set, 1_500)
            .expect_err("wrong audience");
        assert!(err.is_invalid_token());

        let err = verify_token(&token, DOMAIN, "https://evil.example", &set, 1_500)
            .expect_err("wrong issuer");
        assert!(err.is_invalid_token());
    }

    #[test]
    fn rejects_tampered_signature() {
        let key = signing_key();
        let token = sign(&key, "k1", claims(1, 2_000));
        let forged_payload = URL_SAFE_NO_PAD.encode(claims(999, 2_000).to_string());
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_payload;
        let forged = parts.join(".");

        let err = verify_token(&forged, DOMAIN, DEFAULT_ORIGIN, &keys(&key), 1_500).expect_err("forged");
        assert!(matches!(err, VerifyError::InvalidToken(_)));
    }

    #[test]
    fn unknown_key_id_is_reported() {
        let key = signing_key();
        let token = sign(&key, "rotated", claims(1, 2_000));
        let err = verify_token(&token, DOMAIN, DEFAULT_ORIGIN, &keys(&key), 1_500).expect_err("unknown kid");
        assert!(matches!(err, VerifyError::UnknownKey(Some(ref kid)) if kid == "rotated"));
    }

    #[test]
    fn garbage_is_invalid() {
        let set = keys(&signing_key());
        for token in ["", "abc", "a.b", "a.b.c.d", "not-base64!.x.y"] {
            let err = verify_token(token, DOMAIN, DEFAULT_ORIGIN, &set, 0).expect_err(token);
            assert!(err.is_invalid_token(), "{token}");
        }
    }

    #[test]
    fn string_subject_is_accepted() {
        assert_eq!(subject_fid(&serde_json::json!("42")), Some(42));
        assert_eq!(subject_fid(&serde_json::json!(0)), None);
        assert_eq!(subject_fid(&serde_json::json!("alice")), None);
    }
}
