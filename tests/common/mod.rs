#![allow(dead_code)]

use async_trait::async_trait;
use bibox_connector::core::errors::ExchangeError;
use bibox_connector::core::journal::JournalEntry;
use bibox_connector::core::kernel::{Clock, RestClient};
use bibox_connector::exchanges::bibox::{BiboxBuilder, BiboxConnector, ProtocolVariant};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub endpoint: String,
    pub form: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The single command of the `cmds` batch
    pub fn command(&self) -> Value {
        let cmds: Value = serde_json::from_str(self.field("cmds").unwrap()).unwrap();
        assert_eq!(cmds.as_array().unwrap().len(), 1, "batch of one");
        cmds[0].clone()
    }
}

enum Canned {
    Body(Vec<u8>),
    Status(u16, String),
}

#[derive(Default)]
struct Recorder {
    responses: VecDeque<Canned>,
    calls: Vec<RecordedCall>,
}

/// `RestClient` double: records every call and replays canned responses in order
#[derive(Clone, Default)]
pub struct RecordingRest {
    inner: Arc<Mutex<Recorder>>,
}

impl RecordingRest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, body: Value) -> &Self {
        self.respond_raw(body.to_string().as_bytes())
    }

    pub fn respond_raw(&self, body: &[u8]) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .responses
            .push_back(Canned::Body(body.to_vec()));
        self
    }

    pub fn respond_status(&self, status: u16, body: &str) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .responses
            .push_back(Canned::Status(status, body.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    fn record(&self, call: RecordedCall) -> Result<Vec<u8>, ExchangeError> {
        let mut recorder = self.inner.lock().unwrap();
        recorder.calls.push(call);
        match recorder.responses.pop_front() {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(status, body)) => Err(ExchangeError::HttpStatus { status, body }),
            None => Err(ExchangeError::NetworkError("no canned response".to_string())),
        }
    }
}

#[async_trait]
impl RestClient for RecordingRest {
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExchangeError> {
        self.record(RecordedCall {
            method: "POST",
            endpoint: endpoint.to_string(),
            form: form
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect(),
        })
    }

    async fn get(&self, endpoint: &str) -> Result<Vec<u8>, ExchangeError> {
        self.record(RecordedCall {
            method: "GET",
            endpoint: endpoint.to_string(),
            form: Vec::new(),
        })
    }
}

/// Clock whose `sleep` advances time instantly
#[derive(Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn elapsed(&self) -> Duration {
        *self.now.lock().unwrap()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }
}

pub struct Harness {
    pub connector: BiboxConnector<RecordingRest>,
    pub rest: RecordingRest,
    pub clock: Arc<ManualClock>,
    pub journal: mpsc::UnboundedReceiver<JournalEntry>,
}

impl Harness {
    pub fn new(variant: ProtocolVariant) -> Self {
        let rest = RecordingRest::new();
        let clock = Arc::new(ManualClock::default());
        let (sink, journal) = mpsc::unbounded_channel();

        let connector = BiboxBuilder::new()
            .with_credentials("test_api_key".to_string(), "test_secret_key".to_string())
            .with_variant(variant)
            .with_clock(clock.clone())
            .with_journal_sink(sink)
            .build_with_client(rest.clone());

        Self {
            connector,
            rest,
            clock,
            journal,
        }
    }

    pub fn journal_entries(&mut self) -> Vec<JournalEntry> {
        let mut entries = Vec::new();
        while let Ok(entry) = self.journal.try_recv() {
            entries.push(entry);
        }
        entries
    }
}

/// Batched reply wrapping `payload` as `result[0].result`
pub fn batched(cmd: &str, payload: Value) -> Value {
    serde_json::json!({"result": [{"result": payload, "cmd": cmd}]})
}
