use futures_util::StreamExt;
use memchr::memchr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{ChatMessage, ChatRequest, ChatResponse, CompletionResponse};
use crate::core::error::ChatError;
use crate::core::message::Role;
use crate::utils::url::{construct_api_url, CHAT_COMPLETIONS_PATH};

/// Event produced by a response channel, tagged on the wire with its stream id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Error(ChatError),
    End,
}

pub type StreamSender = mpsc::UnboundedSender<(StreamMessage, u64)>;
pub type StreamReceiver = mpsc::UnboundedReceiver<(StreamMessage, u64)>;

/// Everything a channel needs to run one exchange.
#[derive(Debug, Clone)]
pub struct ChannelRequest {
    pub stream_id: u64,
    /// Preamble plus flattened history, oldest first.
    pub history: Vec<ChatMessage>,
    /// The message being submitted.
    pub prompt: String,
    pub cancel_token: CancellationToken,
}

impl ChannelRequest {
    pub fn into_messages(self) -> Vec<ChatMessage> {
        let mut messages = self.history;
        messages.push(ChatMessage::new(Role::User.as_str(), self.prompt));
        messages
    }
}

/// Source of assistant replies.
///
/// `open` must return immediately; the exchange runs elsewhere and reports
/// zero or more `Chunk`s followed by exactly one `End`, optionally preceded
/// by an `Error`, all tagged with the request's stream id.
pub trait ResponseChannel: Send + Sync {
    fn open(&self, request: ChannelRequest);
}

#[derive(Clone)]
pub struct ChannelSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub stream: bool,
}

/// Response channel backed by an OpenAI-compatible HTTP endpoint.
#[derive(Clone)]
pub struct HttpChannel {
    client: reqwest::Client,
    settings: ChannelSettings,
    tx: StreamSender,
}

impl HttpChannel {
    pub fn new(client: reqwest::Client, settings: ChannelSettings, tx: StreamSender) -> Self {
        Self {
            client,
            settings,
            tx,
        }
    }
}

impl ResponseChannel for HttpChannel {
    fn open(&self, request: ChannelRequest) {
        let client = self.client.clone();
        let settings = self.settings.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let stream_id = request.stream_id;
            let cancel_token = request.cancel_token.clone();
            let body = ChatRequest {
                model: settings.model.clone(),
                messages: request.into_messages(),
                stream: settings.stream,
            };
            debug!(stream_id, model = %body.model, messages = body.messages.len(), "sending chat request");

            let emitter = Emitter { tx, stream_id };
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "chat request cancelled");
                }
                _ = run_exchange(&client, &settings, &body, &emitter, &cancel_token) => {}
            }
        });
    }
}

struct Emitter {
    tx: StreamSender,
    stream_id: u64,
}

impl Emitter {
    fn chunk(&self, content: String) {
        let _ = self.tx.send((StreamMessage::Chunk(content), self.stream_id));
    }

    fn fail(&self, error: ChatError) {
        warn!(stream_id = self.stream_id, %error, "chat request failed");
        let _ = self.tx.send((StreamMessage::Error(error), self.stream_id));
        self.end();
    }

    fn end(&self) {
        let _ = self.tx.send((StreamMessage::End, self.stream_id));
    }
}

async fn run_exchange(
    client: &reqwest::Client,
    settings: &ChannelSettings,
    body: &ChatRequest,
    emitter: &Emitter,
    cancel_token: &CancellationToken,
) {
    let chat_url = construct_api_url(&settings.base_url, CHAT_COMPLETIONS_PATH);
    let response = client
        .post(chat_url)
        .header("Content-Type", "application/json")
        .bearer_auth(&settings.api_key)
        .json(body)
        .send()
        .await;

    let response = match response {
        Ok(response) => response,
        Err(e) => return emitter.fail(transport_error(&e)),
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        return emitter.fail(ChatError::RequestFailed(format_api_error(
            status.as_u16(),
            &error_text,
        )));
    }

    if !body.stream {
        return match response.text().await {
            Ok(text) => match parse_completion(&text) {
                Ok(content) => {
                    emitter.chunk(content);
                    emitter.end();
                }
                Err(error) => emitter.fail(error),
            },
            Err(e) => emitter.fail(transport_error(&e)),
        };
    }

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        if cancel_token.is_cancelled() {
            return;
        }

        let chunk_bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => return emitter.fail(transport_error(&e)),
        };
        buffer.extend_from_slice(&chunk_bytes);

        while let Some(newline_pos) = memchr(b'\n', &buffer) {
            let outcome = match std::str::from_utf8(&buffer[..newline_pos]) {
                Ok(line) => process_sse_line(line.trim(), emitter),
                Err(e) => {
                    warn!(stream_id = emitter.stream_id, "invalid UTF-8 in stream: {e}");
                    LineOutcome::Continue
                }
            };
            buffer.drain(..=newline_pos);
            if outcome == LineOutcome::Finished {
                return;
            }
        }
    }

    // Connection closed without a [DONE] marker; the last line may lack its newline.
    if !buffer.is_empty() {
        if let Ok(line) = std::str::from_utf8(&buffer) {
            if process_sse_line(line.trim(), emitter) == LineOutcome::Finished {
                return;
            }
        }
    }
    emitter.end();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOutcome {
    Continue,
    Finished,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn process_sse_line(line: &str, emitter: &Emitter) -> LineOutcome {
    extract_data_payload(line)
        .map(|payload| handle_data_payload(payload, emitter))
        .unwrap_or(LineOutcome::Continue)
}

fn handle_data_payload(payload: &str, emitter: &Emitter) -> LineOutcome {
    if payload == "[DONE]" {
        emitter.end();
        return LineOutcome::Finished;
    }
    if payload.trim().is_empty() {
        return LineOutcome::Continue;
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => {
            if let Some(content) = response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
            {
                if !content.is_empty() {
                    emitter.chunk(content);
                }
            }
            LineOutcome::Continue
        }
        Err(parse_error) => {
            let error = match serde_json::from_str::<serde_json::Value>(payload) {
                Ok(value) => match extract_error_summary(&value) {
                    Some(summary) => ChatError::RequestFailed(summary),
                    None => ChatError::malformed(format!("unexpected stream payload: {payload}")),
                },
                Err(_) => ChatError::malformed(format!("invalid stream payload: {parse_error}")),
            };
            emitter.fail(error);
            LineOutcome::Finished
        }
    }
}

fn parse_completion(text: &str) -> Result<String, ChatError> {
    let response: CompletionResponse = serde_json::from_str(text)
        .map_err(|e| ChatError::malformed(format!("invalid completion body: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ChatError::malformed("completion contained no message"))
}

fn transport_error(error: &reqwest::Error) -> ChatError {
    if error.is_timeout() {
        ChatError::request_failed("timeout")
    } else {
        ChatError::request_failed(error.to_string())
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| value.get("error").and_then(|v| v.as_str()))
        .or_else(|| value.get("message").and_then(|v| v.as_str()))?;

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn format_api_error(status: u16, error_text: &str) -> String {
    let trimmed = error_text.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            return format!("HTTP {status}: {summary}");
        }
    }
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {trimmed}")
    }
}

/// Channel that replays canned events instead of calling a service.
#[cfg(test)]
pub struct ScriptedChannel {
    tx: StreamSender,
    script: Vec<StreamMessage>,
    opened: std::sync::Mutex<Vec<ChannelRequest>>,
}

#[cfg(test)]
impl ScriptedChannel {
    pub fn new(tx: StreamSender, script: Vec<StreamMessage>) -> Self {
        Self {
            tx,
            script,
            opened: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.lock().expect("lock").len()
    }

    pub fn last_request(&self) -> Option<ChannelRequest> {
        self.opened.lock().expect("lock").last().cloned()
    }
}

#[cfg(test)]
impl ResponseChannel for ScriptedChannel {
    fn open(&self, request: ChannelRequest) {
        for message in &self.script {
            let _ = self.tx.send((message.clone(), request.stream_id));
        }
        self.opened.lock().expect("lock").push(request);
    }
}
