use chrono::Utc;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::WebhookConfig;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Which shared secret a webhook was signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Deposit,
    Payout,
}

/// Authenticates payment-provider webhooks: HMAC-SHA256 over
/// `"{timestamp}.{payload}"`, hex encoded, plus a freshness window.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret_deposit: String,
    secret_payout: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(config: &WebhookConfig) -> Self {
        Self {
            secret_deposit: config.secret_deposit.clone(),
            secret_payout: config.secret_payout.clone(),
            tolerance_secs: config.tolerance_secs,
        }
    }

    fn secret(&self, kind: CallbackKind) -> &str {
        match kind {
            CallbackKind::Deposit => &self.secret_deposit,
            CallbackKind::Payout => &self.secret_payout,
        }
    }

    pub fn verify(&self, kind: CallbackKind, payload: &[u8], signature: &str, timestamp: &str) -> bool {
        self.verify_at(kind, payload, signature, timestamp, Utc::now().timestamp())
    }

    /// Same as [`verify`](Self::verify) with an explicit "now" in Unix seconds.
    ///
    /// A timestamp that is not an integer skips the freshness check instead of
    /// failing it; the signature still has to match.
    pub fn verify_at(
        &self,
        kind: CallbackKind,
        payload: &[u8],
        signature: &str,
        timestamp: &str,
        now: i64,
    ) -> bool {
        match timestamp.parse::<i64>() {
            Ok(sent_at) => {
                let skew = now.abs_diff(sent_at);
                if skew > self.tolerance_secs.unsigned_abs() {
                    tracing::warn!(
                        now,
                        webhook_timestamp = sent_at,
                        tolerance_secs = self.tolerance_secs,
                        "Webhook timestamp outside tolerance window"
                    );
                    return false;
                }
            }
            Err(_) => {
                tracing::warn!(
                    timestamp,
                    "Could not parse webhook timestamp as a number, skipping tolerance check"
                );
            }
        }

        let supplied = signature.strip_prefix(SIGNATURE_PREFIX).unwrap_or(signature);
        let Ok(supplied) = hex::decode(supplied) else {
            return false;
        };

        let Ok(mac) = signing_mac(self.secret(kind), timestamp, payload) else {
            return false;
        };

        // verify_slice compares in constant time
        mac.verify_slice(&supplied).is_ok()
    }
}

fn signing_mac(secret: &str, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex-encoded HMAC-SHA256 of `"{timestamp}.{payload}"`.
pub fn compute_signature(
    secret: &str,
    timestamp: &str,
    payload: &[u8],
) -> Result<String, InvalidLength> {
    let mac = signing_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_771_480_800;
    const PAYLOAD: &[u8] = br#"{"type":"deposit","transaction_id":"tx-1","amount":150000}"#;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(&WebhookConfig {
            secret_deposit: "deposit-secret".to_string(),
            secret_payout: "payout-secret".to_string(),
            tolerance_secs: 300,
        })
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = compute_signature("deposit-secret", "1771480800", PAYLOAD).unwrap();
        let b = compute_signature("deposit-secret", "1771480800", PAYLOAD).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_valid_signature_accepted() {
        let ts = NOW.to_string();
        let sig = compute_signature("deposit-secret", &ts, PAYLOAD).unwrap();
        assert!(verifier().verify_at(CallbackKind::Deposit, PAYLOAD, &sig, &ts, NOW));
    }

    #[test]
    fn test_prefixed_signature_accepted() {
        let ts = NOW.to_string();
        let sig = format!("sha256={}", compute_signature("deposit-secret", &ts, PAYLOAD).unwrap());
        assert!(verifier().verify_at(CallbackKind::Deposit, PAYLOAD, &sig, &ts, NOW));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let ts = NOW.to_string();
        let sig = compute_signature("deposit-secret", &ts, PAYLOAD).unwrap();

        let mut tampered = PAYLOAD.to_vec();
        let last = tampered.len() - 2;
        tampered[last] ^= 0x01;

        assert_ne!(sig, compute_signature("deposit-secret", &ts, &tampered).unwrap());
        assert!(!verifier().verify_at(CallbackKind::Deposit, &tampered, &sig, &ts, NOW));
    }

    #[test]
    fn test_secret_selected_by_kind() {
        let ts = NOW.to_string();
        let payout_sig = compute_signature("payout-secret", &ts, PAYLOAD).unwrap();

        assert!(verifier().verify_at(CallbackKind::Payout, PAYLOAD, &payout_sig, &ts, NOW));
        assert!(!verifier().verify_at(CallbackKind::Deposit, PAYLOAD, &payout_sig, &ts, NOW));
    }

    #[test]
    fn test_tolerance_boundary() {
        let v = verifier();

        let edge = (NOW - 300).to_string();
        let sig = compute_signature("deposit-secret", &edge, PAYLOAD).unwrap();
        assert!(v.verify_at(CallbackKind::Deposit, PAYLOAD, &sig, &edge, NOW));

        let stale = (NOW - 301).to_string();
        let sig = compute_signature("deposit-secret", &stale, PAYLOAD).unwrap();
        assert!(!v.verify_at(CallbackKind::Deposit, PAYLOAD, &sig, &stale, NOW));

        let future = (NOW + 301).to_string();
        let sig = compute_signature("deposit-secret", &future, PAYLOAD).unwrap();
        assert!(!v.verify_at(CallbackKind::Deposit, PAYLOAD, &sig, &future, NOW));
    }

    #[test]
    fn test_non_numeric_timestamp_skips_freshness_check() {
        let ts = "2026-02-19T08:00:00Z";
        let sig = compute_signature("deposit-secret", ts, PAYLOAD).unwrap();
        assert!(verifier().verify_at(CallbackKind::Deposit, PAYLOAD, &sig, ts, NOW));

        // still bound to the signature
        assert!(!verifier().verify_at(CallbackKind::Deposit, PAYLOAD, "deadbeef", ts, NOW));
    }

    #[test]
    fn test_last_character_mismatch_rejected() {
        let ts = NOW.to_string();
        let mut sig = compute_signature("deposit-secret", &ts, PAYLOAD).unwrap();
        let last = sig.pop().unwrap();
        sig.push(if last == '0' { '1' } else { '0' });

        assert!(!verifier().verify_at(CallbackKind::Deposit, PAYLOAD, &sig, &ts, NOW));
    }

    #[test]
    fn test_garbage_signature_rejected() {
        let ts = NOW.to_string();
        assert!(!verifier().verify_at(CallbackKind::Deposit, PAYLOAD, "not-hex", &ts, NOW));
        assert!(!verifier().verify_at(CallbackKind::Deposit, PAYLOAD, "", &ts, NOW));
    }
}
