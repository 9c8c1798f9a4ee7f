//! svghost-core: a host shim that runs a WASM guest rendering into a single SVG path.
//!
//! The guest imports console output, timing, math intrinsics, an SVG path setter and a small
//! event-loop API from module `"env"`; the host calls it back through one exported
//! `event_loop_cb` for every display refresh, pointer move and key press it subscribed to.
//!
//! Required guest exports:
//! - `memory`, `alloc`, `dealloc`
//! - `event_loop_cb(id, kind, a0, a1, a2)`
//! - `main()`
//!
//! The ABI surface is defined in `crate::abi` and mirrored by `svghost-sdk`.

pub mod abi;
pub mod clock;
pub mod config;
pub mod event_loop;
pub mod frontend;
pub mod host;
pub mod loader;
pub mod runtime;
pub mod state;
pub mod strings;

pub use config::HostConfig;
pub use event_loop::{GuestEvent, InputEvent, KeyboardEvent, SessionId};
pub use frontend::{Frontend, Headless};
pub use host::Host;
