// Workflow engine - the seam between the Kai client and Temporal
// TemporalHttpEngine talks to the Temporal HTTP API (api/v1)

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::KaiTemporalClientOptions;
use crate::error::{ExecutionOutcome, WorkflowError};

const CLOSE_EVENT_FILTER: &str = "HISTORY_EVENT_FILTER_TYPE_CLOSE_EVENT";

/// Everything needed to start one workflow execution
#[derive(Debug, Clone, PartialEq)]
pub struct StartWorkflowRequest {
    pub workflow_type: String,
    pub workflow_id: String,
    pub task_queue: String,
    pub args: Vec<Value>,
    pub execution_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowExecution {
    pub workflow_id: String,
    pub run_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    async fn start(&self, request: StartWorkflowRequest) -> Result<WorkflowExecution, WorkflowError>;

    /// Wait for the execution to close and return its decoded result
    async fn result(&self, execution: WorkflowExecution) -> Result<Value, WorkflowError>;

    async fn signal(&self, workflow_id: &str, signal_name: &str, args: Vec<Value>) -> Result<(), WorkflowError>;

    async fn terminate(&self, workflow_id: &str, reason: &str) -> Result<(), WorkflowError>;
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct NamedRef<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartWorkflowBody<'a> {
    workflow_id: &'a str,
    workflow_type: NamedRef<'a>,
    task_queue: NamedRef<'a>,
    input: &'a [Value],
    workflow_execution_timeout: String,
    request_id: String,
    identity: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartWorkflowResponse {
    run_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignalBody<'a> {
    input: &'a [Value],
    identity: &'a str,
    request_id: String,
}

#[derive(Debug, Serialize)]
struct TerminateBody<'a> {
    reason: &'a str,
    identity: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    #[serde(default)]
    history: Option<History>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct History {
    #[serde(default)]
    events: Vec<Value>,
}

/// How an execution closed, when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum CloseEvent {
    Completed(Value),
    /// The run continued as a new run; follow it
    ContinuedAsNew(String),
}

// ============================================================================
// Temporal HTTP API engine
// ============================================================================

pub struct TemporalHttpEngine {
    client: Client,
    base_url: String,
    namespace: String,
    api_key: Option<String>,
    metadata: HashMap<String, String>,
    identity: String,
}

impl TemporalHttpEngine {
    /// Connect by describing the configured namespace. Any failure is a
    /// `WorkflowError::Connection`.
    pub async fn connect(options: &KaiTemporalClientOptions) -> Result<Self, WorkflowError> {
        let scheme = if options.tls { "https" } else { "http" };
        let engine = Self {
            client: Client::new(),
            base_url: format!("{}://{}", scheme, options.address.trim_end_matches('/')),
            namespace: options.namespace.clone(),
            api_key: options.api_key.clone(),
            metadata: options.metadata.clone(),
            identity: format!("{}@kai-sdk", std::process::id()),
        };

        let connection_error = |message: String| WorkflowError::Connection {
            address: options.address.clone(),
            message,
        };

        let url = format!("{}/api/v1/namespaces/{}", engine.base_url, urlencoding::encode(&engine.namespace));
        let response = engine
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(connection_error(format!("namespace lookup returned {}: {}", status, body)));
        }

        tracing::info!(
            "Connected to workflow engine at {} (namespace {})",
            options.address,
            options.namespace
        );
        Ok(engine)
    }

    fn workflow_url(&self, workflow_id: &str) -> String {
        format!(
            "{}/api/v1/namespaces/{}/workflows/{}",
            self.base_url,
            urlencoding::encode(&self.namespace),
            urlencoding::encode(workflow_id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        for (name, value) in &self.metadata {
            req = req.header(name.as_str(), value.as_str());
        }
        req
    }

    async fn check(response: Response) -> Result<Response, WorkflowError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        tracing::error!("Workflow engine returned {}: {}", status, message);
        Err(WorkflowError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl WorkflowEngine for TemporalHttpEngine {
    async fn start(&self, request: StartWorkflowRequest) -> Result<WorkflowExecution, WorkflowError> {
        let body = StartWorkflowBody {
            workflow_id: &request.workflow_id,
            workflow_type: NamedRef {
                name: &request.workflow_type,
            },
            task_queue: NamedRef {
                name: &request.task_queue,
            },
            input: &request.args,
            workflow_execution_timeout: format_duration(request.execution_timeout),
            request_id: uuid::Uuid::new_v4().to_string(),
            identity: &self.identity,
        };

        let response = self
            .request(Method::POST, &self.workflow_url(&request.workflow_id))
            .json(&body)
            .send()
            .await?;
        let started: StartWorkflowResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| WorkflowError::Decode(e.to_string()))?;

        tracing::info!(
            "Started workflow {} ({}) run {}",
            request.workflow_id,
            request.workflow_type,
            started.run_id
        );
        Ok(WorkflowExecution {
            workflow_id: request.workflow_id,
            run_id: started.run_id,
        })
    }

    async fn result(&self, execution: WorkflowExecution) -> Result<Value, WorkflowError> {
        let url = format!("{}/history", self.workflow_url(&execution.workflow_id));
        let mut run_id = execution.run_id;
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("execution.runId", run_id.clone()),
                ("waitNewEvent", "true".to_string()),
                ("historyEventFilterType", CLOSE_EVENT_FILTER.to_string()),
            ];
            if let Some(token) = &page_token {
                params.push(("nextPageToken", token.clone()));
            }

            let response = self.request(Method::GET, &url).query(&params).send().await?;
            let page: HistoryResponse = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| WorkflowError::Decode(e.to_string()))?;

            let close_event = page.history.and_then(|h| h.events.into_iter().last());
            if let Some(event) = close_event {
                match interpret_close_event(&execution.workflow_id, &event)? {
                    CloseEvent::Completed(value) => return Ok(value),
                    CloseEvent::ContinuedAsNew(next_run) => {
                        tracing::debug!("Workflow {} continued as new run {}", execution.workflow_id, next_run);
                        run_id = next_run;
                        page_token = None;
                        continue;
                    }
                }
            }

            // long poll expired without a close event
            page_token = page.next_page_token.filter(|t| !t.is_empty());
        }
    }

    async fn signal(&self, workflow_id: &str, signal_name: &str, args: Vec<Value>) -> Result<(), WorkflowError> {
        let url = format!("{}/signal/{}", self.workflow_url(workflow_id), urlencoding::encode(signal_name));
        let body = SignalBody {
            input: &args,
            identity: &self.identity,
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        let response = self.request(Method::POST, &url).json(&body).send().await?;
        Self::check(response).await?;

        tracing::info!("Sent signal {} to workflow {}", signal_name, workflow_id);
        Ok(())
    }

    async fn terminate(&self, workflow_id: &str, reason: &str) -> Result<(), WorkflowError> {
        let url = format!("{}/terminate", self.workflow_url(workflow_id));
        let body = TerminateBody {
            reason,
            identity: &self.identity,
        };

        let response = self.request(Method::POST, &url).json(&body).send().await?;
        Self::check(response).await?;

        tracing::info!("Terminated workflow {}: {}", workflow_id, reason);
        Ok(())
    }
}

/// Protobuf JSON duration, e.g. `120s`
fn format_duration(duration: Duration) -> String {
    format!("{}s", duration.as_secs())
}

/// Map a history close event to the execution's outcome
pub fn interpret_close_event(workflow_id: &str, event: &Value) -> Result<CloseEvent, WorkflowError> {
    let execution_error = |outcome: ExecutionOutcome, message: String| WorkflowError::Execution {
        workflow_id: workflow_id.to_string(),
        outcome,
        message,
    };
    let text = |attrs: &Value, pointer: &str, fallback: &str| -> String {
        attrs
            .pointer(pointer)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    };

    if let Some(attrs) = event.get("workflowExecutionCompletedEventAttributes") {
        return decode_payload(attrs.get("result")).map(CloseEvent::Completed);
    }
    if let Some(attrs) = event.get("workflowExecutionFailedEventAttributes") {
        return Err(execution_error(
            ExecutionOutcome::Failed,
            text(attrs, "/failure/message", "workflow execution failed"),
        ));
    }
    if event.get("workflowExecutionTimedOutEventAttributes").is_some() {
        return Err(execution_error(
            ExecutionOutcome::TimedOut,
            "workflow execution timed out".to_string(),
        ));
    }
    if let Some(attrs) = event.get("workflowExecutionTerminatedEventAttributes") {
        return Err(execution_error(
            ExecutionOutcome::Terminated,
            text(attrs, "/reason", "workflow execution terminated"),
        ));
    }
    if event.get("workflowExecutionCanceledEventAttributes").is_some() {
        return Err(execution_error(
            ExecutionOutcome::Canceled,
            "workflow execution canceled".to_string(),
        ));
    }
    if let Some(attrs) = event.get("workflowExecutionContinuedAsNewEventAttributes") {
        return match attrs.get("newExecutionRunId").and_then(Value::as_str) {
            Some(run_id) => Ok(CloseEvent::ContinuedAsNew(run_id.to_string())),
            None => Err(WorkflowError::Decode(format!(
                "continue-as-new event for {} has no new run id",
                workflow_id
            ))),
        };
    }

    Err(WorkflowError::Decode(format!(
        "unexpected close event for {}: {}",
        workflow_id,
        event.get("eventType").unwrap_or(&Value::Null)
    )))
}

/// Decode a result in any of the shapes the HTTP API returns: shorthand JSON,
/// a `{payloads: [..]}` list, or a single encoded `{metadata, data}` payload
pub fn decode_payload(value: Option<&Value>) -> Result<Value, WorkflowError> {
    let Some(value) = value else {
        return Ok(Value::Null);
    };

    match value {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => decode_payload(items.first()),
        Value::Object(map) => {
            if let Some(payloads) = map.get("payloads") {
                return decode_payload(Some(payloads));
            }
            match (map.get("metadata"), map.get("data")) {
                (Some(metadata), data) if map.len() <= 2 && metadata.is_object() => {
                    decode_encoded(metadata, data)
                }
                _ => Ok(value.clone()),
            }
        }
        other => Ok(other.clone()),
    }
}

fn decode_encoded(metadata: &Value, data: Option<&Value>) -> Result<Value, WorkflowError> {
    let b64 = base64::engine::general_purpose::STANDARD;

    let encoding = metadata
        .get("encoding")
        .and_then(Value::as_str)
        .and_then(|e| b64.decode(e).ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    if encoding.as_deref() == Some("binary/null") {
        return Ok(Value::Null);
    }

    let Some(data) = data.and_then(Value::as_str) else {
        return Ok(Value::Null);
    };
    let bytes = b64
        .decode(data)
        .map_err(|e| WorkflowError::Decode(format!("payload is not base64: {}", e)))?;
    serde_json::from_slice(&bytes).map_err(|e| WorkflowError::Decode(format!("payload is not JSON: {}", e)))
}
