//! Websocket session tests against an in-process Gremlin Server stand-in.

#![allow(clippy::unwrap_used)]

use futures_util::{SinkExt, StreamExt};
use gremview_client::protocol::MIME_TYPE;
use gremview_client::{Backend, GremlinBackend};
use gremview_core::{Endpoint, Error};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// How the stand-in answers the first request it receives.
enum Script {
    /// Send each response body in order, stamping in the request id.
    Respond(Vec<Value>),
    /// Read the request and hang up without answering.
    HangUp,
}

/// Start a one-connection server and return its endpoint plus the
/// request body it received.
async fn serve_once(script: Script) -> (Endpoint, tokio::task::JoinHandle<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();

        let frame = loop {
            match ws.next().await.unwrap().unwrap() {
                Message::Binary(data) => break data.to_vec(),
                _ => continue,
            }
        };
        let mime_len = frame[0] as usize;
        assert_eq!(&frame[1..=mime_len], MIME_TYPE.as_bytes());
        let request: Value = serde_json::from_slice(&frame[1 + mime_len..]).unwrap();
        let request_id = request["requestId"]["@value"].clone();

        match script {
            Script::Respond(bodies) => {
                for mut body in bodies {
                    body["requestId"] = request_id.clone();
                    ws.send(Message::text(body.to_string())).await.unwrap();
                }
                // Keep the socket open until the client closes it.
                while let Some(Ok(msg)) = ws.next().await {
                    if msg.is_close() {
                        break;
                    }
                }
            }
            Script::HangUp => {
                drop(ws);
            }
        }
        request
    });

    (Endpoint::new("127.0.0.1", port), handle)
}

fn frame(code: u16, data: Value) -> Value {
    json!({"status": {"code": code, "message": ""}, "result": {"data": data, "meta": {}}})
}

#[tokio::test]
async fn test_partial_frames_are_accumulated_and_decoded() {
    let (endpoint, server) = serve_once(Script::Respond(vec![
        frame(
            206,
            json!({"@type": "g:List", "@value": [
                {"@type": "g:Vertex", "@value": {"id": {"@type": "g:Int64", "@value": 1}, "label": "person"}}
            ]}),
        ),
        frame(
            200,
            json!({"@type": "g:List", "@value": [
                {"@type": "g:Vertex", "@value": {"id": {"@type": "g:Int64", "@value": 2}, "label": "person"}}
            ]}),
        ),
    ]))
    .await;

    let backend = GremlinBackend::new();
    let mut session = backend.open(&endpoint).await.unwrap();
    let items = session.submit("g.V().hasLabel('person')").await.unwrap();
    session.close().await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], json!(1));
    assert_eq!(items[1]["label"], json!("person"));

    let request = server.await.unwrap();
    assert_eq!(request["op"], "eval");
    assert_eq!(request["args"]["gremlin"], "g.V().hasLabel('person')");
}

#[tokio::test]
async fn test_no_content_is_empty_result() {
    let (endpoint, _server) = serve_once(Script::Respond(vec![frame(204, Value::Null)])).await;

    let mut session = GremlinBackend::new().open(&endpoint).await.unwrap();
    let items = session.submit("g.V().drop()").await.unwrap();
    session.close().await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_script_error_is_execution_error() {
    let (endpoint, _server) = serve_once(Script::Respond(vec![json!({
        "status": {"code": 597, "message": "No such property: nope for class: Object"},
        "result": {"data": null, "meta": {}}
    })]))
    .await;

    let mut session = GremlinBackend::new().open(&endpoint).await.unwrap();
    let err = session.submit("nope").await.unwrap_err();
    session.close().await.unwrap();

    let Error::Execution { code, message } = err else {
        unreachable!("expected execution error");
    };
    assert_eq!(code, Some(597));
    assert!(message.contains("No such property"));
}

#[tokio::test]
async fn test_server_hang_up_is_connection_error() {
    let (endpoint, _server) = serve_once(Script::HangUp).await;

    let mut session = GremlinBackend::new().open(&endpoint).await.unwrap();
    let err = session.submit("g.V()").await.unwrap_err();
    assert!(matches!(err, Error::Connection { .. }), "got {err:?}");

    // A lost session refuses further work.
    let err = session.submit("g.V()").await.unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let backend = GremlinBackend::new().with_connect_timeout(Duration::from_secs(2));
    let err = backend
        .open(&Endpoint::new("127.0.0.1", port))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::Connection { .. }));
}
