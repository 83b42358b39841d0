//! Scripted provider — replays queued responses in order and records every
//! request it receives. Used to drive the research flow without network access.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::llm::{ModelResponse, ProviderError, ResponseRequest};

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<ModelResponse>,
    requests: Vec<ResponseRequest>,
}

/// Clones share the same script, so a test can keep a handle while the
/// researcher owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedProvider {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = ModelResponse>,
    {
        Self {
            script: Arc::new(Mutex::new(Script {
                replies: replies.into_iter().collect(),
                requests: Vec::new(),
            })),
        }
    }

    /// Queue another reply behind the existing ones.
    pub fn push(&self, reply: ModelResponse) {
        if let Ok(mut script) = self.script.lock() {
            script.replies.push_back(reply);
        }
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ResponseRequest> {
        self.script.lock().map(|s| s.requests.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.replies.len()).unwrap_or(0)
    }

    pub async fn respond(&self, request: &ResponseRequest) -> Result<ModelResponse, ProviderError> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| ProviderError::Request("scripted provider lock poisoned".into()))?;
        script.requests.push(request.clone());
        let n = script.requests.len();
        script.replies.pop_front().ok_or(ProviderError::Exhausted(n))
    }
}
