//! Shared test fixtures: a scripted in-memory transport standing in for
//! the workstation, plus builders for common wire responses.
#![allow(dead_code)]

use async_trait::async_trait;
use ptb_bridge::error::BridgeError;
use ptb_bridge::ptsl::client::PtslClient;
use ptb_bridge::ptsl::schema::StaticSchemaSource;
use ptb_bridge::ptsl::transport::{
    Dialer, ResponseHeader, Transport, WireRequest, WireResponse,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted exchange outcome
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(WireResponse),
    /// Simulate a mid-exchange channel failure
    Fail(String),
}

/// Dialer whose transports replay a scripted response sequence and record
/// every request they see.
#[derive(Clone, Default)]
pub struct MockDialer {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<WireRequest>>>,
    exchanges: Arc<AtomicUsize>,
}

impl MockDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, step: Scripted) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn push_response(&self, response: WireResponse) {
        self.push(Scripted::Respond(response));
    }

    /// Number of exchanges that actually hit the transport
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    /// Every request sent, in order
    pub fn requests(&self) -> Vec<WireRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dialer for MockDialer {
    async fn dial(&self, _address: &str) -> Result<Box<dyn Transport>, BridgeError> {
        Ok(Box::new(MockTransport {
            script: Arc::clone(&self.script),
            requests: Arc::clone(&self.requests),
            exchanges: Arc::clone(&self.exchanges),
        }))
    }
}

#[derive(Debug)]
struct MockTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<WireRequest>>>,
    exchanges: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn exchange(&mut self, request: &WireRequest) -> Result<WireResponse, BridgeError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(BridgeError::Transport(message)),
            None => panic!("mock transport script exhausted"),
        }
    }
}

pub fn success_response(body: Value) -> WireResponse {
    WireResponse {
        header: ResponseHeader {
            status: "Succeeded".to_string(),
        },
        response_body_json: Some(body.to_string()),
        response_error_json: None,
    }
}

pub fn empty_success_response() -> WireResponse {
    WireResponse {
        header: ResponseHeader {
            status: "Succeeded".to_string(),
        },
        response_body_json: None,
        response_error_json: None,
    }
}

pub fn failed_response(messages: &[&str]) -> WireResponse {
    let errors: Vec<Value> = messages
        .iter()
        .map(|m| serde_json::json!({ "command_error_message": m }))
        .collect();
    WireResponse {
        header: ResponseHeader {
            status: "Failed".to_string(),
        },
        response_body_json: None,
        response_error_json: Some(serde_json::json!({ "errors": errors }).to_string()),
    }
}

pub fn register_response(session_id: &str) -> WireResponse {
    success_response(serde_json::json!({ "session_id": session_id }))
}

pub fn new_client(dialer: MockDialer) -> PtslClient {
    PtslClient::new(
        Box::new(StaticSchemaSource::new("PTSL")),
        Box::new(dialer),
        "mock:0",
    )
}

/// Connected and registered client backed by the given dialer.
pub async fn ready_client(dialer: MockDialer) -> PtslClient {
    // Registration runs first, so its response must sit ahead of any
    // responses the test scripted before constructing the client.
    dialer
        .script
        .lock()
        .unwrap()
        .push_front(Scripted::Respond(register_response("test-session")));
    let mut client = new_client(dialer);
    client.connect().await.unwrap();
    client
        .register_connection("test-app", "test-co")
        .await
        .unwrap();
    client
}
