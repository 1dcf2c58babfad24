use chrono::Utc;
use hmac::{Hmac, Mac};
use kasir_core::config::WebhookConfig;
use kasir_core::services::signature::{compute_signature, CallbackKind, WebhookVerifier};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SECRET: &str = "whsec_deposit_test";
const PAYLOAD: &str = r#"{"type":"deposit","transaction_id":"TS-123","amount":250000,"status":"completed"}"#;

fn verifier(tolerance_secs: i64) -> WebhookVerifier {
    WebhookVerifier::new(&WebhookConfig {
        secret_deposit: SECRET.to_string(),
        secret_payout: "whsec_payout_test".to_string(),
        tolerance_secs,
    })
}

#[test]
fn test_signature_matches_reference_hmac() {
    let timestamp = "1771480800";

    let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(format!("{}.{}", timestamp, PAYLOAD).as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    assert_eq!(
        compute_signature(SECRET, timestamp, PAYLOAD.as_bytes()).unwrap(),
        expected
    );
}

#[test]
fn test_fresh_signed_webhook_verifies() {
    let timestamp = Utc::now().timestamp().to_string();
    let signature = compute_signature(SECRET, &timestamp, PAYLOAD.as_bytes()).unwrap();

    assert!(verifier(300).verify(
        CallbackKind::Deposit,
        PAYLOAD.as_bytes(),
        &signature,
        &timestamp
    ));
}

#[test]
fn test_replayed_webhook_rejected() {
    let timestamp = (Utc::now().timestamp() - 3600).to_string();
    let signature = compute_signature(SECRET, &timestamp, PAYLOAD.as_bytes()).unwrap();

    assert!(!verifier(300).verify(
        CallbackKind::Deposit,
        PAYLOAD.as_bytes(),
        &signature,
        &timestamp
    ));
}

#[test]
fn test_tolerance_is_inclusive() {
    let now = 1_771_480_800;
    let v = verifier(60);

    for (offset, accepted) in [(-60, true), (60, true), (-61, false), (61, false)] {
        let timestamp = (now + offset).to_string();
        let signature = compute_signature(SECRET, &timestamp, PAYLOAD.as_bytes()).unwrap();
        assert_eq!(
            v.verify_at(CallbackKind::Deposit, PAYLOAD.as_bytes(), &signature, &timestamp, now),
            accepted,
            "offset {}",
            offset
        );
    }
}

#[test]
fn test_signature_bound_to_timestamp() {
    let now = 1_771_480_800;
    let signed_at = now.to_string();
    let signature = compute_signature(SECRET, &signed_at, PAYLOAD.as_bytes()).unwrap();

    // same body, signature replayed under a different timestamp header
    let shifted = (now + 1).to_string();
    assert!(!verifier(300).verify_at(
        CallbackKind::Deposit,
        PAYLOAD.as_bytes(),
        &signature,
        &shifted,
        now
    ));
}

#[test]
fn test_every_single_byte_flip_rejected() {
    let now = 1_771_480_800;
    let timestamp = now.to_string();
    let signature = compute_signature(SECRET, &timestamp, PAYLOAD.as_bytes()).unwrap();
    let v = verifier(300);

    for i in 0..PAYLOAD.len() {
        let mut tampered = PAYLOAD.as_bytes().to_vec();
        tampered[i] ^= 0x20;
        assert!(
            !v.verify_at(CallbackKind::Deposit, &tampered, &signature, &timestamp, now),
            "flip at byte {} was accepted",
            i
        );
    }
}
