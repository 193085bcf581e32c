#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/op-rs/hilo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod types;
pub use types::{ForkchoiceUpdated, PayloadAttributes, PayloadStatus, PayloadStatusCode};

mod errors;
pub use errors::{EngineError, EngineResult};

mod api;
pub use api::EngineApi;

mod client;
pub use client::EngineClient;

mod driver;
pub use driver::{DriverState, EngineDriver, DEFAULT_CALL_TIMEOUT};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use alloy_rpc_types_engine::{ExecutionPayloadV1, ForkchoiceState, JwtSecret, PayloadId};
