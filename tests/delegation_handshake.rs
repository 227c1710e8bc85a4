// tests/delegation_handshake.rs
// Gas payer co-signing against fixed keys and a fixed delegated body.
mod common;

use common::*;
use thor_sponsor::crypto;
use thor_sponsor::delegation::{delegation_digest, sign_delegation, verify_delegation};
use thor_sponsor::hexutil;
use thor_sponsor::{DelegationHandler, DelegationRequest, LocalDelegator, SponsorError};

const DELEGATED_RAW: &str =
    "0xeb2784aabbccdd20d8d794aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa8080808252088083bc614ec101";
const DIGEST_FOR_SENDER: &str = "e177136ceaa7654530453f8c7c7d79a3d73d84e6c2aa85bd59e76ed128f89a6d";
const DELEGATOR_SIGNATURE: &str = "0x8164465a30c0c80314bd87f2cc7e58f8b0dc7a6ea30692f29860fedb7e47916a4746e62fd5c37989437c2edc620f36cbf3cd96e8e7bf3282c3f297750e94fdf400";

fn request(origin: &str) -> DelegationRequest {
    DelegationRequest {
        raw: DELEGATED_RAW.to_string(),
        origin: origin.to_string(),
    }
}

#[test]
fn delegator_signature_is_deterministic() {
    let response = sign_delegation(&request(SENDER), &delegator()).expect("sign");
    assert_eq!(response.signature, DELEGATOR_SIGNATURE);
}

#[test]
fn digest_matches_fixture() {
    let raw = hexutil::decode_prefixed(DELEGATED_RAW).unwrap();
    let digest = delegation_digest(&raw, &addr(SENDER));
    assert_eq!(hex::encode(digest), DIGEST_FOR_SENDER);
}

#[test]
fn signature_recovers_to_delegator() {
    let response = sign_delegation(&request(SENDER), &delegator()).unwrap();
    let raw = hexutil::decode_prefixed(DELEGATED_RAW).unwrap();
    let digest = delegation_digest(&raw, &addr(SENDER));
    let sig = hexutil::decode_prefixed(&response.signature).unwrap();

    assert_eq!(sig.len(), 65);
    assert!(sig[64] <= 1);
    assert_eq!(crypto::recover_address(&digest, &sig).unwrap(), addr(DELEGATOR));
}

#[test]
fn verify_accepts_matching_and_rejects_other_origin() {
    let key = delegator();
    let response = sign_delegation(&request(SENDER), &key).unwrap();

    assert!(verify_delegation(&request(SENDER), &response, key.public_key()).unwrap());
    assert!(!verify_delegation(&request(RECIPIENT), &response, key.public_key()).unwrap());
    assert!(!verify_delegation(&request(SENDER), &response, sender().public_key()).unwrap());
}

#[test]
fn origin_casing_does_not_change_signature() {
    let lower = sign_delegation(&request(SENDER), &delegator()).unwrap();
    let upper = sign_delegation(&request("0xD55100EEDB61F1E553A38C33A234CE07952C43F2"), &delegator()).unwrap();
    assert_eq!(lower, upper);
}

#[test]
fn malformed_requests_are_rejected() {
    let key = delegator();

    let empty = DelegationRequest { raw: "0x".into(), origin: SENDER.into() };
    assert!(matches!(sign_delegation(&empty, &key), Err(SponsorError::EmptyTransaction)));

    let short_origin = request("0xd55100eedb61f1e553a38c33a234ce07952c43");
    assert!(matches!(sign_delegation(&short_origin, &key), Err(SponsorError::AddressLength(19))));

    let bad_hex = DelegationRequest { raw: "0xzz".into(), origin: SENDER.into() };
    assert!(matches!(sign_delegation(&bad_hex, &key), Err(SponsorError::MalformedHex(_))));
}

#[test]
fn local_delegator_and_closure_handlers_agree() {
    let local = LocalDelegator::new(delegator());
    assert_eq!(local.address(), addr(DELEGATOR));

    let key = delegator();
    let closure = move |req: &DelegationRequest| sign_delegation(req, &key);

    let handlers: [&dyn DelegationHandler; 2] = [&local, &closure];
    for handler in handlers {
        let response = handler.delegate(&request(SENDER)).unwrap();
        assert_eq!(response.signature, DELEGATOR_SIGNATURE);
    }
}

#[test]
fn wire_format_uses_vip191_field_names() {
    let json = serde_json::to_value(request(SENDER)).unwrap();
    assert_eq!(json["raw"], DELEGATED_RAW);
    assert_eq!(json["origin"], SENDER);

    let response: thor_sponsor::DelegationResponse =
        serde_json::from_str(&format!(r#"{{"signature":"{}"}}"#, DELEGATOR_SIGNATURE)).unwrap();
    assert_eq!(response.signature, DELEGATOR_SIGNATURE);
}
