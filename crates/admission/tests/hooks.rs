#![forbid(unsafe_code)]

use serde::Deserialize;
use serde_json::json;
use whitebox_admission::{mutate, validate, Defaults, FieldRule, Mutator, Rules, Validator};
use whitebox_core::{decode, AdmissionRequest, Fault, Mutation, Object, Verdict};

#[derive(Debug, Default, Deserialize)]
struct GreeterSpec {
    greeting: Option<String>,
}

struct Greeter;

impl Validator for Greeter {
    fn validate(&self, object: &Object) -> Result<Verdict, Fault> {
        let spec = object.spec_as::<GreeterSpec>()?.unwrap_or_default();
        Ok(Rules::new()
            .rule("'spec.greeting' must be specified", |s: &GreeterSpec| s.greeting.is_some())
            .rule("'spec.greeting' is empty", |s: &GreeterSpec| s.greeting.as_deref() != Some(""))
            .evaluate(&spec))
    }
}

impl Mutator for Greeter {
    fn mutate(&self, object: &Object) -> Result<Mutation, Fault> {
        Defaults::new()
            .field(FieldRule::at(&["spec", "greeting"]).or_insert(json!("hello")).replace_if(|v| v == "", json!("hello")))
            .evaluate(object)
    }
}

fn request(v: serde_json::Value) -> AdmissionRequest { decode(v.to_string().as_bytes()).unwrap() }

#[test]
fn validate_wraps_verdict_into_response() {
    let ok = validate(&Greeter, &request(json!({ "object": { "spec": { "greeting": "hi" } } }))).unwrap();
    assert!(ok.allowed);
    assert_eq!(ok.reason(), Some(""));

    let denied = validate(&Greeter, &request(json!({ "object": { "spec": { "greeting": "" } } }))).unwrap();
    assert!(!denied.allowed);
    assert_eq!(denied.reason(), Some("'spec.greeting' is empty"));
    denied.check().unwrap();
}

#[test]
fn validate_faults_on_untyped_spec() {
    let err = validate(&Greeter, &request(json!({ "object": { "spec": { "greeting": 7 } } }))).unwrap_err();
    assert!(matches!(err, Fault::InvalidField { .. }), "err={}", err);
}

#[test]
fn mutate_reaches_fixed_point_in_one_step() {
    let req = request(json!({ "object": { "metadata": { "name": "g" }, "spec": { "greeting": "" } } }));
    let res = mutate(&Greeter, &req).unwrap();
    res.check().unwrap();
    let set = res.decoded_patch().unwrap().expect("patch");

    let mut doc = req.object.to_value().unwrap();
    set.apply(&mut doc).unwrap();
    let again = mutate(&Greeter, &AdmissionRequest { object: Object::from_value(doc).unwrap() }).unwrap();
    assert!(again.patch.is_none() && again.patch_type.is_none());
    assert!(again.allowed);
}

#[test]
fn missing_object_key_does_not_decode() {
    let r: Result<AdmissionRequest, Fault> = decode(br#"{"request":{}}"#);
    assert!(matches!(r, Err(Fault::Decode(_))));
}
