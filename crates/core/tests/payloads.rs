use serde_json::{json, Value};
use whitebox_core::{decode, encode, AdmissionResponse, Fault, ReconcileState, ResourceKey};

fn round_trip(v: Value) -> Value {
    let state: ReconcileState = decode(v.to_string().as_bytes()).unwrap();
    serde_json::from_slice(&encode(&state).unwrap()).unwrap()
}

#[test]
fn unknown_object_fields_survive_a_round_trip() {
    let input = json!({
        "object": {
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": "cm", "namespace": "ns", "labels": { "a": "b" } },
            "data": { "k": "v" }
        },
        "dependents": {}
    });
    let out = round_trip(input.clone());
    assert_eq!(out["object"], input["object"]);
}

#[test]
fn references_and_requeue_hints_are_carried() {
    let input = json!({
        "object": { "metadata": { "name": "p" } },
        "dependents": { "deployment.v1.apps": [] },
        "references": { "secret.v1": [{ "apiVersion": "v1", "kind": "Secret", "metadata": { "name": "s" } }] },
        "requeue": true,
        "requeueAfter": 30
    });
    let state: ReconcileState = decode(input.to_string().as_bytes()).unwrap();
    assert!(state.requeue);
    assert_eq!(state.requeue_after, Some(30));
    assert_eq!(state.references.get(&ResourceKey::parse("secret.v1").unwrap()).len(), 1);
    assert_eq!(round_trip(input.clone()), input);
}

#[test]
fn hand_written_responses_are_checked() {
    let patch_without_type: AdmissionResponse =
        serde_json::from_value(json!({ "allowed": true, "patch": "W10=" })).unwrap();
    assert!(matches!(patch_without_type.check(), Err(Fault::InvalidField { .. })));

    let silent_denial: AdmissionResponse = serde_json::from_value(json!({ "allowed": false })).unwrap();
    assert!(silent_denial.check().is_err());

    let ok: AdmissionResponse = serde_json::from_value(json!({ "allowed": true, "status": { "reason": "" } })).unwrap();
    ok.check().unwrap();
}

#[test]
fn events_with_unknown_type_do_not_decode() {
    let input = json!({
        "object": { "metadata": { "name": "p" } },
        "events": [{ "type": "Info", "reason": "r", "message": "m" }]
    });
    let r: Result<ReconcileState, Fault> = decode(input.to_string().as_bytes());
    assert!(matches!(r, Err(Fault::Decode(_))));
}
