//! In-process collaborators for unit tests

use crate::llm::{CompletionRequest, LlmError, TextGenerator};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

type Reply = Result<String, LlmError>;

/// Text generator that answers from per-model scripts.
///
/// Each model has a queue of replies; the last reply repeats once the queue
/// is drained. Unscripted models fail with `Connection`.
#[derive(Default)]
pub struct ScriptedGenerator {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful reply for `model`
    pub fn reply(self, model: &str, text: &str) -> Self {
        self.push(model, Ok(text.to_string()))
    }

    /// Append a failing reply for `model`
    pub fn fail(self, model: &str, err: LlmError) -> Self {
        self.push(model, Err(err))
    }

    /// Delay every reply for `model`
    pub fn delay(mut self, model: &str, delay: Duration) -> Self {
        self.delays.insert(model.to_string(), delay);
        self
    }

    fn push(self, model: &str, reply: Reply) -> Self {
        self.scripts
            .lock()
            .entry(model.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Number of calls made for `model`
    pub fn calls_for(&self, model: &str) -> usize {
        self.calls.lock().iter().filter(|r| r.model == model).count()
    }

    /// Total number of calls
    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Every request received, in arrival order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.calls.lock().clone()
    }

    fn next_reply(&self, model: &str) -> Reply {
        let mut scripts = self.scripts.lock();
        match scripts.get_mut(model) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Err(LlmError::EmptyResponse)),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or(Err(LlmError::EmptyResponse)),
            None => Err(LlmError::Connection(format!("no script for {}", model))),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let model = request.model.clone();
        self.calls.lock().push(request);
        if let Some(delay) = self.delays.get(&model) {
            tokio::time::sleep(*delay).await;
        }
        self.next_reply(&model)
    }
}

/// HTTP endpoint that reads requests and never answers.
///
/// Returns the base URL and a handle that completes once the client closes
/// its side of the connection.
pub async fn silent_http_server() -> (String, tokio::task::JoinHandle<()>) {
    use tokio::io::AsyncReadExt;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let closed = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
        }
    });
    (url, closed)
}
