//! Plain view actions against a scripted backend.

mod common;

use common::ScriptedTransport;
use serde_json::json;
use smo_comm::{Action, Communicator, FetchOutcome, ModelShaping};

#[tokio::test]
async fn definitions_arrive_once_and_values_follow() {
    let transport = ScriptedTransport::new();
    transport.reply_data(json!({
        "definitions": {"fields": ["a", "b"]},
        "values": {"a": 1, "b": 2},
        "actions": ["compute"]
    }));
    transport.reply_data(json!({
        "definitions": {"fields": ["other"]},
        "values": {"a": 10, "b": 20}
    }));

    let mut comm = Communicator::new(transport.clone());
    let outcome = comm.fetch_data(Action::named("init"), json!({})).await;
    assert_eq!(outcome, FetchOutcome::Received);
    assert!(comm.status().data_received);
    assert_eq!(comm.data().definitions, Some(json!({"fields": ["a", "b"]})));

    let outcome = comm.fetch_data(Action::named("compute"), json!({"a": 10})).await;
    assert_eq!(outcome, FetchOutcome::Received);
    assert_eq!(comm.values(), Some(&json!({"a": 10, "b": 20})));
    // Layout from the first answer is kept.
    assert_eq!(comm.data().definitions, Some(json!({"fields": ["a", "b"]})));
    assert_eq!(comm.data().actions, Some(json!(["compute"])));
}

#[tokio::test]
async fn server_and_transport_failures_set_different_flags() {
    let transport = ScriptedTransport::new();
    transport.reply_server_error("bad input");
    transport.reply_transport_error();
    transport.reply_data(json!({"values": {}}));

    let mut comm = Communicator::new(transport.clone());

    assert_eq!(
        comm.fetch_data(Action::named("compute"), json!({})).await,
        FetchOutcome::ServerFailed
    );
    let status = comm.status().clone();
    assert!(status.server_error && !status.comm_error);
    assert!(!status.loading);
    assert!(!status.data_received);
    assert_eq!(status.error_msg, "bad input");

    assert_eq!(
        comm.fetch_data(Action::named("compute"), json!({})).await,
        FetchOutcome::CommFailed
    );
    let status = comm.status().clone();
    assert!(status.comm_error && !status.server_error);
    assert_eq!(status.stack_trace, None);

    // A later success clears both flags.
    assert_eq!(
        comm.fetch_data(Action::named("compute"), json!({})).await,
        FetchOutcome::Received
    );
    let status = comm.status();
    assert!(!status.comm_error && !status.server_error);
    assert!(status.error_msg.is_empty());
}

#[tokio::test]
async fn shaping_adds_model_and_view_names() {
    let transport = ScriptedTransport::new();
    transport.reply_data(json!({}));

    let mut comm =
        Communicator::new(transport.clone()).with_shaping(ModelShaping::new("Pipe", "main"));
    comm.fetch_data(Action::named("init"), json!({"n": 3})).await;

    let wire = serde_json::to_value(&transport.requests()[0]).unwrap();
    assert_eq!(
        wire,
        json!({
            "action": "init",
            "data": {"modelName": "Pipe", "viewName": "main", "parameters": {"n": 3}}
        })
    );
}

#[tokio::test]
async fn save_uses_current_values_and_returns_the_record() {
    let transport = ScriptedTransport::new();
    transport.reply_data(json!({"values": {"length": 2.0}}));
    transport.reply_data(json!({"model": "Pipe", "view": "main", "id": 42}));

    let mut comm = Communicator::new(transport.clone());
    comm.fetch_data(Action::named("init"), json!({})).await;
    let saved = comm.save_user_input(Action::named("save"), None).await;

    assert_eq!(saved.message, "Input data saved.");
    let record = saved.record.expect("record");
    assert_eq!(record.id, "42");
    assert_eq!(record.query_string(), "?model=Pipe&view=main&id=42");
    assert_eq!(transport.requests()[1].data.parameters, json!({"length": 2.0}));
}

#[tokio::test]
async fn failed_save_reports_a_message_and_leaves_flags_alone() {
    let transport = ScriptedTransport::new();
    transport.reply_transport_error();

    let comm = Communicator::new(transport.clone());
    let saved = comm
        .save_user_input(Action::named("save"), Some(json!({"x": 1})))
        .await;

    assert_eq!(saved.record, None);
    assert_eq!(saved.message, "Failed to save input data");
    assert!(!comm.status().comm_error);
}
