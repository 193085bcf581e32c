//! Test utilities for driving the engine against scripted responses.

use crate::{EngineApi, EngineResult, ForkchoiceUpdated, PayloadAttributes, PayloadStatus};
use alloy_rpc_types_engine::{ExecutionPayloadV1, ForkchoiceState, PayloadId};
use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// Shared state behind a [TestEngine].
#[derive(Debug, Default)]
struct TestEngineInner {
    hang: bool,
    forkchoice_responses: Mutex<VecDeque<EngineResult<ForkchoiceUpdated>>>,
    payload_responses: Mutex<VecDeque<EngineResult<ExecutionPayloadV1>>>,
    commit_responses: Mutex<VecDeque<EngineResult<PayloadStatus>>>,
    forkchoice_calls: Mutex<Vec<(ForkchoiceState, Option<PayloadAttributes>)>>,
    payload_calls: Mutex<Vec<PayloadId>>,
    commit_calls: Mutex<Vec<ExecutionPayloadV1>>,
}

/// An [EngineApi] backed by scripted responses, recording every call.
///
/// Clones share state, so a test can keep one handle for scripting and
/// assertions while the driver owns another.
#[derive(Debug, Default, Clone)]
pub struct TestEngine {
    inner: Arc<TestEngineInner>,
}

impl TestEngine {
    /// An engine whose calls never resolve.
    pub fn hanging() -> Self {
        Self { inner: Arc::new(TestEngineInner { hang: true, ..Default::default() }) }
    }

    /// Scripts the next forkchoice response.
    pub fn insert_forkchoice(&self, response: EngineResult<ForkchoiceUpdated>) {
        self.inner.forkchoice_responses.lock().unwrap().push_back(response);
    }

    /// Scripts the next payload fetch response.
    pub fn insert_payload(&self, response: EngineResult<ExecutionPayloadV1>) {
        self.inner.payload_responses.lock().unwrap().push_back(response);
    }

    /// Scripts the next commit response.
    pub fn insert_commit(&self, response: EngineResult<PayloadStatus>) {
        self.inner.commit_responses.lock().unwrap().push_back(response);
    }

    /// The recorded forkchoice calls, in order.
    pub fn forkchoice_calls(&self) -> Vec<(ForkchoiceState, Option<PayloadAttributes>)> {
        self.inner.forkchoice_calls.lock().unwrap().clone()
    }

    /// The recorded payload fetches, in order.
    pub fn payload_calls(&self) -> Vec<PayloadId> {
        self.inner.payload_calls.lock().unwrap().clone()
    }

    /// The recorded commits, in order.
    pub fn commit_calls(&self) -> Vec<ExecutionPayloadV1> {
        self.inner.commit_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EngineApi for TestEngine {
    async fn forkchoice_updated(
        &self,
        state: ForkchoiceState,
        attributes: Option<PayloadAttributes>,
    ) -> EngineResult<ForkchoiceUpdated> {
        self.inner.forkchoice_calls.lock().unwrap().push((state, attributes));
        if self.inner.hang {
            std::future::pending::<()>().await;
        }
        self.inner
            .forkchoice_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted forkchoice response")
    }

    async fn get_payload(&self, payload_id: PayloadId) -> EngineResult<ExecutionPayloadV1> {
        self.inner.payload_calls.lock().unwrap().push(payload_id);
        if self.inner.hang {
            std::future::pending::<()>().await;
        }
        self.inner
            .payload_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted payload response")
    }

    async fn new_payload(&self, payload: ExecutionPayloadV1) -> EngineResult<PayloadStatus> {
        self.inner.commit_calls.lock().unwrap().push(payload);
        if self.inner.hang {
            std::future::pending::<()>().await;
        }
        self.inner
            .commit_responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted commit response")
    }
}
