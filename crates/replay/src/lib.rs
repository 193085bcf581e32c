#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/op-rs/hilo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::{ReplayConfig, DEFAULT_POLL_INTERVAL};

mod errors;
pub use errors::{ReplayError, ReplayResult};

mod report;
pub use report::ReplayReport;

mod core;
pub use core::ReplayOrchestrator;

mod service;
pub use service::ReplayService;
