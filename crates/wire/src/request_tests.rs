use super::*;

#[test]
fn submit_dataset_round_trips_through_json() {
    let request = Request::SubmitDataset {
        context: CallContext::new(1),
        bytes: vec![1, 2, 3],
    };
    let json = serde_json::to_string(&request).expect("serializes");
    let parsed: Request = serde_json::from_str(&json).expect("deserializes");
    assert_eq!(parsed, request);
}

#[test]
fn fetch_result_without_context_defaults_to_anonymous() {
    let json = r#"{"op":"FetchResult","context":{}}"#;
    let parsed: Request = serde_json::from_str(json).expect("deserializes");
    assert_eq!(
        parsed,
        Request::FetchResult {
            context: CallContext::anonymous()
        }
    );
}
