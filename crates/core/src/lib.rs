//! Fixed-asset identity and lifecycle engine.
//!
//! Pure domain logic (codes, sequences, depreciation, bulk groups, audit
//! diffs) plus the [`lifecycle::AssetLifecycle`] orchestrator, which runs
//! every mutation through the persistence traits in [`store`].

pub mod asset;
pub mod audit;
pub mod bulk;
pub mod clock;
pub mod code;
pub mod depreciation;
pub mod diff;
pub mod error;
pub mod lifecycle;
pub mod procurement;
pub mod sequence;
pub mod status;
pub mod store;
pub mod types;
