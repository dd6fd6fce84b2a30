//! Test doubles for the model and data layer.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pipeline::{PipelineSummaryProvider, StageTotal};

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, ToolChoice,
};

/// Returns fixed totals and counts how often it was asked.
pub struct StaticProvider {
    totals: Vec<StageTotal>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(totals: Vec<StageTotal>) -> Self {
        Self {
            totals,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineSummaryProvider for StaticProvider {
    async fn stage_totals(&self) -> pipeline::Result<Vec<StageTotal>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.totals.clone())
    }
}

/// Always fails, as a broken data layer would.
pub struct FailingProvider;

#[async_trait]
impl PipelineSummaryProvider for FailingProvider {
    async fn stage_totals(&self) -> pipeline::Result<Vec<StageTotal>> {
        Err(pipeline::Error::InvalidValue("stage column unreadable".into()))
    }
}

/// What a [`ScriptedBackend`] saw on one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub tool_choice: ToolChoice,
}

type Step = Box<dyn Fn(&ModelRequest<'_>) -> Result<ModelResponse, ModelError> + Send + Sync>;

/// Replies with one scripted step per call, in order.
///
/// Running out of steps is reported as an API error.
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a step computed from the request.
    pub fn then<F>(self, step: F) -> Self
    where
        F: Fn(&ModelRequest<'_>) -> Result<ModelResponse, ModelError> + Send + Sync + 'static,
    {
        self.steps.lock().unwrap().push_back(Box::new(step));
        self
    }

    pub fn then_text(self, text: &'static str) -> Self {
        self.then(move |_| Ok(ModelResponse::text(text)))
    }

    pub fn then_error(self) -> Self {
        self.then(|_| Err(ModelError::Network("connection reset".into())))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: request.system.to_string(),
            messages: request.messages.to_vec(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            tool_choice: request.tool_choice,
        });

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(step) => step(&request),
            None => Err(ModelError::Api("script exhausted".into())),
        }
    }
}
