use gunsync_engine::convert_gun_record_for_index;
use gunsync_types::Did;
use pretty_assertions::assert_eq;
use serde_json::json;

fn did() -> Did {
    Did::from_soul("s1")
}

#[test]
fn stamps_did_and_storage() {
    let record = json!({
        "oip": { "ver": "0.8.0", "recordType": "post" },
        "data": { "basic": { "name": "T" } },
    });
    let doc = convert_gun_record_for_index(&record, &did());
    assert_eq!(doc["oip"]["did"], json!("did:gun:s1"));
    assert_eq!(doc["oip"]["storage"], json!("gun"));
    // Original fields survive.
    assert_eq!(doc["oip"]["recordType"], json!("post"));
    assert_eq!(doc["data"]["basic"]["name"], json!("T"));
}

#[test]
fn adds_oip_block_when_absent() {
    // Decrypted private payloads may carry no oip block at all.
    let record = json!({ "data": { "post": { "bodyText": "x" } } });
    let doc = convert_gun_record_for_index(&record, &did());
    assert_eq!(doc["oip"]["did"], json!("did:gun:s1"));
    assert_eq!(doc["oip"]["storage"], json!("gun"));
}

#[test]
fn inflates_json_encoded_arrays() {
    let record = json!({
        "data": { "post": { "tags": r#"["a","b"]"#, "title": "t" } },
    });
    let doc = convert_gun_record_for_index(&record, &did());
    assert_eq!(doc["data"]["post"]["tags"], json!(["a", "b"]));
    assert_eq!(doc["data"]["post"]["title"], json!("t"));
}

#[test]
fn transform_is_idempotent() {
    let record = json!({
        "data": {
            "post": { "tags": r#"["a","b"]"#, "counts": "[1,2,3]" },
            "image": { "urls": ["x", "y"] },
        },
    });
    let once = convert_gun_record_for_index(&record, &did());
    let twice = convert_gun_record_for_index(&once, &did());
    assert_eq!(once, twice);
    assert_eq!(once["data"]["post"]["tags"], json!(["a", "b"]));
    assert_eq!(once["data"]["image"]["urls"], json!(["x", "y"]));
}

#[test]
fn leaves_non_array_strings_alone() {
    let record = json!({
        "data": { "post": {
            "bodyText": "just text",
            "bracketish": "[not json",
            "object": "{\"a\":1}",
        } },
    });
    let doc = convert_gun_record_for_index(&record, &did());
    assert_eq!(doc["data"]["post"]["bodyText"], json!("just text"));
    assert_eq!(doc["data"]["post"]["bracketish"], json!("[not json"));
    assert_eq!(doc["data"]["post"]["object"], json!("{\"a\":1}"));
}

#[test]
fn tolerates_non_object_sections() {
    let record = json!({ "data": { "basic": "scalar", "post": 7 } });
    let doc = convert_gun_record_for_index(&record, &did());
    assert_eq!(doc["data"]["basic"], json!("scalar"));
    assert_eq!(doc["data"]["post"], json!(7));
}

#[test]
fn replaces_non_object_oip_value() {
    let record = json!({ "oip": "corrupt", "data": {} });
    let doc = convert_gun_record_for_index(&record, &did());
    assert_eq!(doc["oip"]["did"], json!("did:gun:s1"));
}

#[test]
fn input_record_is_not_mutated() {
    let record = json!({ "data": { "post": { "tags": r#"["a"]"# } } });
    let before = record.clone();
    let _ = convert_gun_record_for_index(&record, &did());
    assert_eq!(record, before);
}
