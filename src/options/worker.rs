use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Background worker options for offloaded precomputation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Worker", inline)]
#[serde(default)]
pub struct WorkerOptions {
    /// Extract molecular surfaces on a background thread instead of inline.
    #[schemars(title = "Use Worker")]
    pub use_worker: bool,
    /// Name given to the worker thread.
    #[schemars(skip)]
    pub thread_name: String,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            use_worker: true,
            thread_name: "surface-worker".to_owned(),
        }
    }
}
