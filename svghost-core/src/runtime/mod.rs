//! Wasmtime-backed runtime glue for svghost-core.
//!
//! Responsibilities:
//! - Create a Wasmtime `Engine`/`Store` whose data is the [`HostState`](crate::state::HostState).
//! - Define host imports under module `"env"` matching the guest ABI.
//! - Instantiate a compiled `wasmtime::Module` and capture the guest's exports.

pub mod imports;
pub mod runtime;

pub use runtime::{HostRuntime, Instantiated};
