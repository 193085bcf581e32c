#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/op-rs/hilo/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod traits;
pub use traits::{LegacyChainProvider, TargetChainProvider};

mod alloy_providers;
pub use alloy_providers::{AlloyLegacyChainProvider, AlloyTargetChainProvider};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
