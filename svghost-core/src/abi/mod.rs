//! svghost-core ABI module
//!
//! This module defines the contract between:
//! - **Host**: `svghost-core`
//! - **Guest**: the loaded WASM module (renders into an SVG path, reacts to events)
//!
//! ## Imports (guest -> host)
//! Imported from module `"env"`.
//!
//! ### Console
//! - `puts(ptr: i32, len: i32)`: log a UTF-8 string from guest memory
//! - `alert(value: f64)`: modal notification
//!
//! ### Time
//! - `performance_time_origin`: immutable `f64` global, ms since the UNIX epoch at host start
//! - `performance_now() -> f64`: ms elapsed since the time origin
//!
//! ### Event loop
//! - `event_loop_new() -> i32`: open a session, returns its id (0 when ids are exhausted)
//! - `event_loop_raf(id: i32) -> i32`: request one animation frame; 0 for unknown ids
//! - `event_loop_shutdown(id: i32) -> i32`: close a session; 0 for unknown ids
//!
//! ### SVG
//! - `svg_set_path(ptr: i32, len: i32)`: set the `d` attribute of the `path` element
//!
//! ### Math
//! - `sqrt(x: f64) -> f64`, `sin(x: f64) -> f64`, `cos(x: f64) -> f64`
//!
//! ## Exports (host -> guest) required
//! - `memory`
//! - `alloc(size: i32) -> i32`
//! - `dealloc(ptr: i32, size: i32)`
//! - `event_loop_cb(id: i32, kind: i32, a0: i32, a1: i32, a2: i32)`
//! - `main()`, called exactly once after instantiation (`my_main` is accepted as a fallback)

use wasmtime::{AsContextMut, Instance, Memory, TypedFunc};

/// Import module name used by the guest.
pub const IMPORT_MODULE: &str = "env";

/// Guest export names.
pub mod guest_exports {
    pub const MEMORY: &str = "memory";
    pub const ALLOC: &str = "alloc";
    pub const DEALLOC: &str = "dealloc";
    pub const EVENT_LOOP_CB: &str = "event_loop_cb";
    /// Entry point, called once after instantiation.
    pub const MAIN: &str = "main";
    /// Older guests export their entry point under this name.
    pub const LEGACY_MAIN: &str = "my_main";
}

/// Host import names provided to the guest.
///
/// These are the string names under module [`IMPORT_MODULE`].
pub mod host_imports {
    // Console
    pub const PUTS: &str = "puts";
    pub const ALERT: &str = "alert";

    // Time
    pub const PERFORMANCE_TIME_ORIGIN: &str = "performance_time_origin";
    pub const PERFORMANCE_NOW: &str = "performance_now";

    // Event loop
    pub const EVENT_LOOP_NEW: &str = "event_loop_new";
    pub const EVENT_LOOP_RAF: &str = "event_loop_raf";
    pub const EVENT_LOOP_SHUTDOWN: &str = "event_loop_shutdown";

    // SVG
    pub const SVG_SET_PATH: &str = "svg_set_path";

    // Math
    pub const SQRT: &str = "sqrt";
    pub const SIN: &str = "sin";
    pub const COS: &str = "cos";
}

/// Event kind tags passed as the second argument of `event_loop_cb`.
///
/// Keep these stable; they are part of the ABI.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EventKind {
    Destroyed = 0,
    AnimationFrame = 1,
    MouseMove = 2,
    KeyDown = 3,
    KeyUp = 4,
}

/// Modifier bit flags carried in the third payload word of key events.
pub mod modifiers {
    pub const SHIFT: u32 = 1 << 0;
    pub const CONTROL: u32 = 1 << 1;
    pub const ALT: u32 = 1 << 2;
}

/// Character payload for keys whose value is not a single printable character.
pub const NO_CHAR: u32 = 0xFFFF_FFFF;

/// Errors raised while resolving the guest's exports.
#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("guest does not export `{0}`")]
    MissingExport(&'static str),
    #[error("guest export `{name}` has the wrong type: {reason}")]
    BadSignature { name: String, reason: String },
    #[error("guest exports neither `main` nor `my_main`")]
    MissingEntryPoint,
}

/// The values the host keeps from the guest after instantiation.
///
/// Everything here is a cheap handle into the store; copies are fine.
#[derive(Clone)]
pub struct GuestExports {
    pub memory: Memory,
    pub alloc: TypedFunc<u32, u32>,
    pub dealloc: TypedFunc<(u32, u32), ()>,
    pub event_loop_cb: TypedFunc<(u32, u32, u32, u32, u32), ()>,
}

impl GuestExports {
    /// Resolve the required exports from an instance.
    pub fn resolve(instance: &Instance, mut store: impl AsContextMut) -> Result<Self, AbiError> {
        let memory = instance
            .get_memory(&mut store, guest_exports::MEMORY)
            .ok_or(AbiError::MissingExport(guest_exports::MEMORY))?;

        Ok(Self {
            memory,
            alloc: typed(instance, &mut store, guest_exports::ALLOC)?,
            dealloc: typed(instance, &mut store, guest_exports::DEALLOC)?,
            event_loop_cb: typed(instance, &mut store, guest_exports::EVENT_LOOP_CB)?,
        })
    }
}

/// Resolve the entry point, preferring `main` over the legacy `my_main`.
pub fn resolve_entry_point(
    instance: &Instance,
    mut store: impl AsContextMut,
    preferred: &str,
) -> Result<TypedFunc<(), ()>, AbiError> {
    for name in [preferred, guest_exports::MAIN, guest_exports::LEGACY_MAIN] {
        if instance.get_func(&mut store, name).is_some() {
            return instance
                .get_typed_func::<(), ()>(&mut store, name)
                .map_err(|e| AbiError::BadSignature {
                    name: name.to_string(),
                    reason: e.to_string(),
                });
        }
    }
    Err(AbiError::MissingEntryPoint)
}

fn typed<P, R>(
    instance: &Instance,
    mut store: impl AsContextMut,
    name: &'static str,
) -> Result<TypedFunc<P, R>, AbiError>
where
    P: wasmtime::WasmParams,
    R: wasmtime::WasmResults,
{
    if instance.get_func(&mut store, name).is_none() {
        return Err(AbiError::MissingExport(name));
    }
    instance
        .get_typed_func::<P, R>(&mut store, name)
        .map_err(|e| AbiError::BadSignature {
            name: name.to_string(),
            reason: e.to_string(),
        })
}
