use gunsync_types::{
    is_encrypted_record, is_valid_oip_record, DiscoveredRecord, PROTOCOL_VERSION,
};
use serde_json::{json, Value};

fn valid_record() -> Value {
    json!({
        "oip": {
            "ver": PROTOCOL_VERSION,
            "recordType": "post",
            "creator": {
                "publicKey": "k",
                "didAddress": "did:arweave:x",
            },
        },
        "data": {
            "basic": { "name": "T" },
        },
    })
}

fn encrypted_record() -> Value {
    json!({
        "meta": { "encrypted": true, "owner": "k" },
        "data": {
            "encrypted": "Y2lwaGVydGV4dA==",
            "iv": "aXZpdml2aXZpdml2",
            "tag": "dGFndGFndGFndGFndA==",
        },
    })
}

// ── is_valid_oip_record ──────────────────────────────────────────

#[test]
fn valid_record_accepted() {
    assert!(is_valid_oip_record(&valid_record()));
}

#[test]
fn missing_oip_block_rejected() {
    assert!(!is_valid_oip_record(&json!({ "data": { "basic": {} } })));
}

#[test]
fn wrong_protocol_version_rejected() {
    let mut record = valid_record();
    record["oip"]["ver"] = json!("0.7.0");
    assert!(!is_valid_oip_record(&record));
}

#[test]
fn missing_record_type_rejected() {
    let mut record = valid_record();
    record["oip"].as_object_mut().unwrap().remove("recordType");
    assert!(!is_valid_oip_record(&record));
}

#[test]
fn empty_record_type_rejected() {
    let mut record = valid_record();
    record["oip"]["recordType"] = json!("");
    assert!(!is_valid_oip_record(&record));
}

#[test]
fn missing_public_key_rejected() {
    let mut record = valid_record();
    record["oip"]["creator"]
        .as_object_mut()
        .unwrap()
        .remove("publicKey");
    assert!(!is_valid_oip_record(&record));
}

#[test]
fn missing_did_address_rejected() {
    let mut record = valid_record();
    record["oip"]["creator"]
        .as_object_mut()
        .unwrap()
        .remove("didAddress");
    assert!(!is_valid_oip_record(&record));
}

#[test]
fn empty_creator_fields_rejected() {
    let mut record = valid_record();
    record["oip"]["creator"]["publicKey"] = json!("");
    assert!(!is_valid_oip_record(&record));
}

#[test]
fn non_string_version_rejected() {
    let mut record = valid_record();
    record["oip"]["ver"] = json!(0.8);
    assert!(!is_valid_oip_record(&record));
}

#[test]
fn validator_is_total_over_odd_shapes() {
    for odd in [
        json!(null),
        json!(42),
        json!("record"),
        json!([1, 2, 3]),
        json!({ "oip": null }),
        json!({ "oip": "not an object" }),
        json!({ "oip": { "ver": PROTOCOL_VERSION, "creator": [] } }),
    ] {
        assert!(!is_valid_oip_record(&odd));
    }
}

// ── is_encrypted_record ──────────────────────────────────────────

#[test]
fn encrypted_envelope_detected() {
    assert!(is_encrypted_record(&encrypted_record()));
}

#[test]
fn absent_meta_means_public() {
    assert!(!is_encrypted_record(&valid_record()));
}

#[test]
fn encrypted_false_means_public() {
    let mut record = encrypted_record();
    record["meta"]["encrypted"] = json!(false);
    assert!(!is_encrypted_record(&record));
}

#[test]
fn missing_opaque_field_rejected() {
    for field in ["encrypted", "iv", "tag"] {
        let mut record = encrypted_record();
        record["data"].as_object_mut().unwrap().remove(field);
        assert!(!is_encrypted_record(&record), "missing {field}");
    }
}

#[test]
fn non_string_opaque_field_rejected() {
    let mut record = encrypted_record();
    record["data"]["iv"] = json!(12);
    assert!(!is_encrypted_record(&record));
}

#[test]
fn encrypted_flag_must_be_boolean_true() {
    let mut record = encrypted_record();
    record["meta"]["encrypted"] = json!("true");
    assert!(!is_encrypted_record(&record));
}

#[test]
fn shapes_are_mutually_exclusive() {
    let public = valid_record();
    let private = encrypted_record();
    assert!(is_valid_oip_record(&public) && !is_encrypted_record(&public));
    assert!(is_encrypted_record(&private) && !is_valid_oip_record(&private));
}

// ── DiscoveredRecord ─────────────────────────────────────────────

#[test]
fn discovered_record_sniffs_encryption() {
    let public = DiscoveredRecord::new("s1", valid_record(), None);
    assert!(!public.was_encrypted);
    assert_eq!(public.soul, "s1");

    let private = DiscoveredRecord::new("s2", encrypted_record(), Some("n1".to_string()));
    assert!(private.was_encrypted);
    assert_eq!(private.source_node.as_deref(), Some("n1"));
}
