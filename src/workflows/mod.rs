// Workflows - the Kai workflow client and its typed registry

pub mod client;
pub mod engine;
pub mod registry;

pub use client::{ClientState, KaiTemporalClient, KaiTemporalClientOptions};
pub use engine::{StartWorkflowRequest, TemporalHttpEngine, WorkflowEngine, WorkflowExecution};
pub use registry::{KaiWorkflow, WorkflowRegistry};
