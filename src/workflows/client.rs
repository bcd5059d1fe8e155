// Kai workflow client - lazily connected facade over a WorkflowEngine

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::engine::{StartWorkflowRequest, TemporalHttpEngine, WorkflowEngine};
use super::registry::WorkflowRegistry;
use crate::error::WorkflowError;
use crate::models::{WorkflowResult, WorkflowStartOptions};

pub const DEFAULT_TEMPORAL_ADDRESS: &str = "localhost:7243";
pub const DEFAULT_TEMPORAL_NAMESPACE: &str = "default";

/// Connection settings for the workflow engine
#[derive(Debug, Clone, PartialEq)]
pub struct KaiTemporalClientOptions {
    /// `host:port` of the engine's HTTP API
    pub address: String,
    pub namespace: String,
    pub tls: bool,
    pub api_key: Option<String>,
    /// Extra headers sent with every request
    pub metadata: HashMap<String, String>,
}

impl Default for KaiTemporalClientOptions {
    fn default() -> Self {
        Self {
            address: DEFAULT_TEMPORAL_ADDRESS.to_string(),
            namespace: DEFAULT_TEMPORAL_NAMESPACE.to_string(),
            tls: false,
            api_key: None,
            metadata: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

type EngineInit = Shared<BoxFuture<'static, Result<Arc<dyn WorkflowEngine>, WorkflowError>>>;

struct Inner {
    init: EngineInit,
    started: AtomicBool,
}

/// Cheap to clone; all clones share one connection.
///
/// The connection is made once, on first use, and every caller awaits the
/// same attempt. A failed attempt is final: each later call returns a clone
/// of the same error.
#[derive(Clone)]
pub struct KaiTemporalClient {
    inner: Arc<Inner>,
}

impl KaiTemporalClient {
    pub fn new(options: KaiTemporalClientOptions) -> Self {
        Self::from_connect(async move {
            let engine = TemporalHttpEngine::connect(&options).await?;
            Ok(Arc::new(engine) as Arc<dyn WorkflowEngine>)
        })
    }

    /// Build a client around a custom connect step
    pub fn from_connect<F>(connect: F) -> Self
    where
        F: Future<Output = Result<Arc<dyn WorkflowEngine>, WorkflowError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                init: connect.boxed().shared(),
                started: AtomicBool::new(false),
            }),
        }
    }

    pub fn with_engine(engine: Arc<dyn WorkflowEngine>) -> Self {
        Self::from_connect(async move { Ok(engine) })
    }

    pub fn state(&self) -> ClientState {
        match self.inner.init.peek() {
            Some(Ok(_)) => ClientState::Ready,
            Some(Err(_)) => ClientState::Failed,
            None if self.inner.started.load(Ordering::SeqCst) => ClientState::Initializing,
            None => ClientState::Uninitialized,
        }
    }

    /// Wait until the connection is up
    pub async fn ready(&self) -> Result<(), WorkflowError> {
        self.engine().await.map(|_| ())
    }

    async fn engine(&self) -> Result<Arc<dyn WorkflowEngine>, WorkflowError> {
        if !self.inner.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Initializing workflow client");
        }
        self.inner.init.clone().await
    }

    /// Typed access to the registered Kai workflows
    pub fn workflows(&self) -> WorkflowRegistry {
        WorkflowRegistry::new(self.clone())
    }

    /// Start one execution and wait for its result
    pub async fn start_workflow<T: DeserializeOwned>(
        &self,
        workflow_type: &str,
        task_queue: &str,
        args: Vec<Value>,
        options: WorkflowStartOptions,
    ) -> Result<WorkflowResult<T>, WorkflowError> {
        let engine = self.engine().await?;
        let workflow_id = options
            .workflow_id
            .unwrap_or_else(|| format!("{}-{}", workflow_type, Utc::now().timestamp_millis()));

        let execution = engine
            .start(StartWorkflowRequest {
                workflow_type: workflow_type.to_string(),
                workflow_id: workflow_id.clone(),
                task_queue: task_queue.to_string(),
                args,
                execution_timeout: options.workflow_execution_timeout,
            })
            .await?;
        let run_id = execution.run_id.clone();

        let value = match engine.result(execution).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Workflow {} did not complete: {}", workflow_id, e);
                return Err(e);
            }
        };

        let result = serde_json::from_value(value)
            .map_err(|e| WorkflowError::Decode(format!("{} result: {}", workflow_type, e)))?;

        Ok(WorkflowResult {
            workflow_id,
            run_id,
            result,
        })
    }

    pub async fn signal_workflow(
        &self,
        workflow_id: &str,
        signal_name: &str,
        args: Vec<Value>,
    ) -> Result<(), WorkflowError> {
        self.engine().await?.signal(workflow_id, signal_name, args).await
    }

    pub async fn terminate_workflow(&self, workflow_id: &str, reason: &str) -> Result<(), WorkflowError> {
        self.engine().await?.terminate(workflow_id, reason).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthUser, GetMeetingByIdParams, OpenAIToolCall, OpenAIToolCallParams, KAI_TASK_QUEUE};
    use crate::workflows::engine::{MockWorkflowEngine, WorkflowExecution};
    use serde_json::json;
    use std::time::Duration;

    fn ask_params() -> OpenAIToolCallParams {
        OpenAIToolCallParams {
            user: AuthUser::new("u1"),
            tool_call_message: OpenAIToolCall {
                message: "What's on today?".into(),
                context_id: "chat-1".into(),
            },
        }
    }

    fn answering_engine(answer: Value) -> MockWorkflowEngine {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_start().returning(|request| {
            Ok(WorkflowExecution {
                workflow_id: request.workflow_id,
                run_id: "run-1".into(),
            })
        });
        engine.expect_result().returning(move |_| Ok(answer.clone()));
        engine
    }

    #[tokio::test]
    async fn test_calls_wait_for_initialization() {
        let (open_gate, gate) = tokio::sync::oneshot::channel::<()>();
        let engine: Arc<dyn WorkflowEngine> = Arc::new(answering_engine(json!({"text": "Two meetings"})));

        let client = KaiTemporalClient::from_connect(async move {
            gate.await
                .map_err(|_| WorkflowError::Transport("gate dropped".into()))?;
            Ok(engine)
        });
        assert_eq!(client.state(), ClientState::Uninitialized);

        let pending = tokio::spawn({
            let client = client.clone();
            async move { client.workflows().ask_kai(None, ask_params()).await }
        });

        for _ in 0..10 {
            if client.state() == ClientState::Initializing {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(client.state(), ClientState::Initializing);
        assert!(!pending.is_finished());

        open_gate.send(()).unwrap();
        let result = pending.await.unwrap().unwrap();

        assert_eq!(result.result.text, "Two meetings");
        assert_eq!(result.run_id, "run-1");
        assert!(result.workflow_id.starts_with("askKaiWorkflow-"));
        assert_eq!(client.state(), ClientState::Ready);
    }

    #[tokio::test]
    async fn test_failed_initialization_is_shared_by_every_caller() {
        let client = KaiTemporalClient::from_connect(async {
            Err(WorkflowError::Connection {
                address: "localhost:7243".into(),
                message: "connection refused".into(),
            })
        });

        let registry = client.workflows();
        let (first, second) = tokio::join!(
            registry.ask_kai(None, ask_params()),
            client.terminate_workflow("wf-1", "cleanup"),
        );

        assert!(matches!(first, Err(WorkflowError::Connection { .. })));
        assert!(matches!(second, Err(WorkflowError::Connection { .. })));
        assert_eq!(client.state(), ClientState::Failed);

        let later = client.ready().await.unwrap_err();
        assert!(later.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_typed_workflow_request() {
        let mut engine = MockWorkflowEngine::new();
        engine
            .expect_start()
            .withf(|request| {
                request.workflow_type == "getMeetingByIdWorkflow"
                    && request.task_queue == KAI_TASK_QUEUE
                    && request.execution_timeout == Duration::from_secs(60)
                    && request.workflow_id == "fetch-m1"
                    && request.args == vec![json!({"id": "u1"}), json!("m1")]
            })
            .times(1)
            .returning(|request| {
                Ok(WorkflowExecution {
                    workflow_id: request.workflow_id,
                    run_id: "run-9".into(),
                })
            });
        engine.expect_result().times(1).returning(|_| Ok(Value::Null));

        let client = KaiTemporalClient::with_engine(Arc::new(engine));
        let result = client
            .workflows()
            .get_meeting_by_id(
                Some("fetch-m1".into()),
                GetMeetingByIdParams {
                    user: AuthUser::new("u1"),
                    meeting_id: "m1".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(result.workflow_id, "fetch-m1");
        assert!(result.result.is_none());
    }

    #[tokio::test]
    async fn test_execution_failure_and_bad_result_shape() {
        let mut engine = MockWorkflowEngine::new();
        engine.expect_start().returning(|request| {
            Ok(WorkflowExecution {
                workflow_id: request.workflow_id,
                run_id: "run-1".into(),
            })
        });
        let mut calls = 0;
        engine.expect_result().returning(move |execution| {
            calls += 1;
            if calls == 1 {
                Err(WorkflowError::Execution {
                    workflow_id: execution.workflow_id,
                    outcome: crate::error::ExecutionOutcome::Failed,
                    message: "boom".into(),
                })
            } else {
                Ok(json!({"unexpected": true}))
            }
        });

        let client = KaiTemporalClient::with_engine(Arc::new(engine));
        let failed = client.workflows().ask_kai(None, ask_params()).await;
        assert!(matches!(failed, Err(WorkflowError::Execution { .. })));

        let undecodable = client.workflows().ask_kai(None, ask_params()).await;
        assert!(matches!(undecodable, Err(WorkflowError::Decode(_))));
    }

    #[tokio::test]
    async fn test_signal_goes_to_engine() {
        let mut engine = MockWorkflowEngine::new();
        engine
            .expect_signal()
            .withf(|id, name, args| id == "wf-1" && name == "pause" && args.is_empty())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let client = KaiTemporalClient::with_engine(Arc::new(engine));
        client.signal_workflow("wf-1", "pause", vec![]).await.unwrap();
    }

    #[test]
    fn test_default_options() {
        let options = KaiTemporalClientOptions::default();
        assert_eq!(options.address, "localhost:7243");
        assert_eq!(options.namespace, "default");
        assert!(!options.tls);
    }
}
