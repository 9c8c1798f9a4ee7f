//! Host-side state stored inside the wasmtime `Store`.
//!
//! Host imports reach it through `Caller::data_mut`, and the [`Host`](crate::host::Host)
//! through `Store::data_mut`. There is no process-wide state: two hosts in one process are
//! fully independent.

use crate::abi::GuestExports;
use crate::clock::Clock;
use crate::event_loop::Registry;
use crate::frontend::Frontend;

pub struct HostState<F: Frontend> {
    pub frontend: F,
    pub clock: Clock,
    pub registry: Registry,

    /// Guest exports, populated after instantiation and before the entry point runs.
    pub exports: Option<GuestExports>,
}

impl<F: Frontend> HostState<F> {
    pub fn new(frontend: F) -> Self {
        Self {
            frontend,
            clock: Clock::start(),
            registry: Registry::new(),
            exports: None,
        }
    }
}
