//! CSRF token bridge.
//!
//! Inertia clients (axios under the hood) read the `XSRF-TOKEN` cookie and echo
//! it in the `X-XSRF-TOKEN` header on every request. This module issues that
//! cookie and turns the echoed header back into a token the server can check.
//!
//! # Token Format
//!
//! ```text
//! cookie value = base64url( hex(HMAC-SHA256(secret, payload)) || payload )
//! payload      = JSON ["<param name>", "<raw token>"]
//! masked token = base64url( mask || (raw XOR mask) )
//! ```
//!
//! The mask is fresh random bytes on every call, so a masked token never
//! repeats on the wire while still unmasking to the same raw token.
//!
//! Malformed input (bad base64, bad signature, wrong shape, wrong parameter
//! name) is never an error: it simply means "no token".

use crate::error::{InertiaError, Result};
use crate::protocol::constants::CSRF_FAILURE_MESSAGE;
use crate::server::config::CsrfConfig;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use http::{header, HeaderMap, HeaderName, HeaderValue};
use rand::RngCore;
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Length of the hex-encoded HMAC prefix.
const SIGNATURE_HEX_LEN: usize = 64;

/// A freshly issued token.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    /// The raw token.
    pub raw: String,
    /// Signed cookie value; what the client will echo back.
    pub signed: String,
    /// Complete `Set-Cookie` header value.
    pub set_cookie: HeaderValue,
}

/// Signs, issues and verifies CSRF tokens.
#[derive(Clone)]
pub struct CsrfBridge {
    secret: Vec<u8>,
    param: String,
    header: HeaderName,
    cookie: String,
}

impl std::fmt::Debug for CsrfBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfBridge")
            .field("param", &self.param)
            .field("header", &self.header)
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}

impl CsrfBridge {
    /// Build a bridge from configuration.
    ///
    /// # Errors
    ///
    /// An empty secret or an invalid header/cookie name is a configuration
    /// error, reported here rather than on first use.
    pub fn new(config: &CsrfConfig) -> Result<Self> {
        if config.secret.is_empty() {
            return Err(InertiaError::Config("CSRF secret must not be empty".into()));
        }
        let header = HeaderName::from_bytes(config.header.as_bytes()).map_err(|_| {
            InertiaError::Config(format!("invalid CSRF header name '{}'", config.header))
        })?;
        if config.cookie.is_empty()
            || config
                .cookie
                .contains(|c: char| matches!(c, ';' | '=' | ' ' | ','))
        {
            return Err(InertiaError::Config(format!(
                "invalid CSRF cookie name '{}'",
                config.cookie
            )));
        }
        Ok(Self {
            secret: config.secret.as_bytes().to_vec(),
            param: config.param.clone(),
            header,
            cookie: config.cookie.clone(),
        })
    }

    /// Header the client sends the token in.
    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.header
    }

    /// Issue a new raw token and its signed cookie.
    pub fn issue(&self) -> Result<IssuedToken> {
        let raw = Uuid::new_v4().simple().to_string();
        let payload = serde_json::to_vec(&(self.param.as_str(), raw.as_str()))?;
        let signed = self.sign(&payload);
        let set_cookie = HeaderValue::try_from(format!(
            "{}={}; Path=/; SameSite=Lax",
            self.cookie, signed
        ))
        .map_err(|e| InertiaError::Config(format!("invalid CSRF cookie: {e}")))?;
        Ok(IssuedToken {
            raw,
            signed,
            set_cookie,
        })
    }

    /// Read the token header and return its masked token.
    ///
    /// Returns `None` when the header is absent or anything about it is wrong.
    #[must_use]
    pub fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get(&self.header)?.to_str().ok()?;
        let raw = self.open(value)?;
        Some(mask_token(&raw))
    }

    /// Raw token carried by the request's CSRF cookie.
    #[must_use]
    pub fn cookie_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie)
            .and_then(|(_, value)| self.open(value))
    }

    /// Check a state-changing request.
    ///
    /// The header must carry a valid signed token, and it must match the token
    /// in the cookie the server issued.
    ///
    /// # Errors
    ///
    /// [`InertiaError::BadRequest`] on any failure.
    pub fn verify(&self, headers: &HeaderMap) -> Result<()> {
        let rejected = || InertiaError::BadRequest(CSRF_FAILURE_MESSAGE.to_string());

        let masked = self.extract_token(headers).ok_or_else(rejected)?;
        let from_header = unmask_token(&masked).ok_or_else(rejected)?;
        let from_cookie = self.cookie_token(headers).ok_or_else(rejected)?;

        if from_header != from_cookie {
            return Err(rejected());
        }
        Ok(())
    }

    fn sign(&self, payload: &[u8]) -> String {
        let signature = hex::encode(self.mac().chain_update(payload).finalize().into_bytes());
        let mut data = signature.into_bytes();
        data.extend_from_slice(payload);
        URL_SAFE_NO_PAD.encode(data)
    }

    /// Verify a signed value and return the raw token inside it.
    fn open(&self, signed: &str) -> Option<String> {
        let data = URL_SAFE_NO_PAD.decode(signed.trim()).ok()?;
        if data.len() < SIGNATURE_HEX_LEN {
            return None;
        }
        let (signature, payload) = data.split_at(SIGNATURE_HEX_LEN);
        let signature = hex::decode(signature).ok()?;
        self.mac()
            .chain_update(payload)
            .verify_slice(&signature)
            .ok()?;

        let (param, raw): (String, String) = serde_json::from_slice(payload).ok()?;
        (param == self.param).then_some(raw)
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"))
    }
}

/// Mask a raw token with fresh random bytes.
#[must_use]
pub fn mask_token(raw: &str) -> String {
    let raw = raw.as_bytes();
    let mut mask = vec![0u8; raw.len()];
    rand::thread_rng().fill_bytes(&mut mask);

    let mut out = mask.clone();
    out.extend(raw.iter().zip(&mask).map(|(b, m)| b ^ m));
    URL_SAFE_NO_PAD.encode(out)
}

/// Recover the raw token from a masked one.
#[must_use]
pub fn unmask_token(masked: &str) -> Option<String> {
    let data = URL_SAFE_NO_PAD.decode(masked).ok()?;
    if data.is_empty() || data.len() % 2 != 0 {
        return None;
    }
    let (mask, xored) = data.split_at(data.len() / 2);
    let raw: Vec<u8> = xored.iter().zip(mask).map(|(b, m)| b ^ m).collect();
    String::from_utf8(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge() -> CsrfBridge {
        CsrfBridge::new(&CsrfConfig::new("test-secret")).unwrap()
    }

    fn headers_with(bridge: &CsrfBridge, header_value: &str, cookie: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            bridge.header_name().clone(),
            HeaderValue::from_str(header_value).unwrap(),
        );
        if let Some(cookie) = cookie {
            headers.insert(
                header::COOKIE,
                HeaderValue::from_str(&format!("theme=dark; XSRF-TOKEN={cookie}")).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            CsrfBridge::new(&CsrfConfig::default()),
            Err(InertiaError::Config(_))
        ));
    }

    #[test]
    fn test_extract_issued_token() {
        let bridge = bridge();
        let issued = bridge.issue().unwrap();
        let headers = headers_with(&bridge, &issued.signed, None);

        let masked = bridge.extract_token(&headers).unwrap();
        assert_ne!(masked, issued.raw);
        assert_eq!(unmask_token(&masked).unwrap(), issued.raw);
    }

    #[test]
    fn test_masks_differ_per_call() {
        let a = mask_token("token");
        let b = mask_token("token");
        assert_ne!(a, b);
        assert_eq!(unmask_token(&a), unmask_token(&b));
    }

    #[test]
    fn test_tampered_token_is_absent() {
        let bridge = bridge();
        let issued = bridge.issue().unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(&issued.signed).unwrap();
        let last = bytes.len() - 3;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);

        assert!(bridge
            .extract_token(&headers_with(&bridge, &tampered, None))
            .is_none());
    }

    #[test]
    fn test_garbage_is_absent() {
        let bridge = bridge();
        assert!(bridge
            .extract_token(&headers_with(&bridge, "not-a-token", None))
            .is_none());
        assert!(bridge.extract_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_wrong_secret_is_absent() {
        let issued = bridge().issue().unwrap();
        let other = CsrfBridge::new(&CsrfConfig::new("other-secret")).unwrap();
        assert!(other
            .extract_token(&headers_with(&other, &issued.signed, None))
            .is_none());
    }

    #[test]
    fn test_param_name_mismatch_is_absent() {
        let mut config = CsrfConfig::new("test-secret");
        config.param = "OTHER".into();
        let foreign = CsrfBridge::new(&config).unwrap().issue().unwrap();

        let bridge = bridge();
        assert!(bridge
            .extract_token(&headers_with(&bridge, &foreign.signed, None))
            .is_none());
    }

    #[test]
    fn test_wrong_shape_is_absent() {
        let bridge = bridge();
        let signed = bridge.sign(br#"["XSRF-TOKEN"]"#);
        assert!(bridge
            .extract_token(&headers_with(&bridge, &signed, None))
            .is_none());
    }

    #[test]
    fn test_verify_header_matches_cookie() {
        let bridge = bridge();
        let issued = bridge.issue().unwrap();
        let headers = headers_with(&bridge, &issued.signed, Some(&issued.signed));
        assert!(bridge.verify(&headers).is_ok());
    }

    #[test]
    fn test_verify_rejects_mismatch() {
        let bridge = bridge();
        let a = bridge.issue().unwrap();
        let b = bridge.issue().unwrap();
        let headers = headers_with(&bridge, &a.signed, Some(&b.signed));
        assert!(matches!(
            bridge.verify(&headers),
            Err(InertiaError::BadRequest(_))
        ));
    }

    #[test]
    fn test_verify_rejects_missing() {
        let bridge = bridge();
        assert!(matches!(
            bridge.verify(&HeaderMap::new()),
            Err(InertiaError::BadRequest(_))
        ));
    }

    #[test]
    fn test_set_cookie_is_script_readable() {
        let issued = bridge().issue().unwrap();
        let cookie = issued.set_cookie.to_str().unwrap();
        assert!(cookie.starts_with("XSRF-TOKEN="));
        assert!(!cookie.contains("HttpOnly"));
    }
}
