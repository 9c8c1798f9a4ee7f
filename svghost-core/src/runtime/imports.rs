//! Host import definitions for the Wasmtime runtime.
//!
//! Every import lives under module `"env"`. Apart from the event-loop trio, each one is a
//! stateless pass-through to the clock, the frontend or `f64` math.

use crate::{
    abi::{IMPORT_MODULE, guest_exports, host_imports},
    frontend::Frontend,
    state::HostState,
    strings,
};

use anyhow::Context;
use wasmtime::{Caller, Extern, Global, GlobalType, Linker, Memory, Mutability, Store, Val, ValType};

/// Define all host imports expected by guests under module `"env"`.
///
/// Must be called before instantiating the module.
pub fn define_imports<F: Frontend>(
    linker: &mut Linker<HostState<F>>,
    store: &mut Store<HostState<F>>,
) -> Result<(), anyhow::Error> {
    // --- Console ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::PUTS,
        |mut caller: Caller<'_, HostState<F>>, ptr: u32, len: u32| -> anyhow::Result<()> {
            let memory = guest_memory(&mut caller)?;
            let text = strings::read_string(&caller, &memory, ptr, len)?;
            caller.data_mut().frontend.log(&text);
            Ok(())
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::ALERT,
        |mut caller: Caller<'_, HostState<F>>, value: f64| {
            caller.data_mut().frontend.alert(value);
        },
    )?;

    // --- Time ---
    // `performance.timeOrigin` is a plain number, so it is a constant global, not a function.
    let origin = store.data().clock.time_origin();
    let origin = Global::new(
        &mut *store,
        GlobalType::new(ValType::F64, Mutability::Const),
        Val::F64(origin.to_bits()),
    )?;
    linker.define(&*store, IMPORT_MODULE, host_imports::PERFORMANCE_TIME_ORIGIN, origin)?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::PERFORMANCE_NOW,
        |caller: Caller<'_, HostState<F>>| -> f64 { caller.data().clock.now() },
    )?;

    // --- Event loop ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::EVENT_LOOP_NEW,
        |mut caller: Caller<'_, HostState<F>>| -> u32 {
            caller.data_mut().registry.open().unwrap_or(0)
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::EVENT_LOOP_RAF,
        |mut caller: Caller<'_, HostState<F>>, id: u32| -> u32 {
            caller.data_mut().registry.request_frame(id) as u32
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::EVENT_LOOP_SHUTDOWN,
        |mut caller: Caller<'_, HostState<F>>, id: u32| -> u32 {
            caller.data_mut().registry.shutdown(id) as u32
        },
    )?;

    // --- SVG ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SVG_SET_PATH,
        |mut caller: Caller<'_, HostState<F>>, ptr: u32, len: u32| -> anyhow::Result<()> {
            let memory = guest_memory(&mut caller)?;
            let data = strings::read_string(&caller, &memory, ptr, len)?;
            caller.data_mut().frontend.set_path_data(&data);
            Ok(())
        },
    )?;

    // --- Math ---
    linker.func_wrap(IMPORT_MODULE, host_imports::SQRT, |x: f64| -> f64 { x.sqrt() })?;
    linker.func_wrap(IMPORT_MODULE, host_imports::SIN, |x: f64| -> f64 { x.sin() })?;
    linker.func_wrap(IMPORT_MODULE, host_imports::COS, |x: f64| -> f64 { x.cos() })?;

    Ok(())
}

/// The guest's memory: the captured export once bootstrap has run, else looked up by name
/// (imports called from a `start` function run before exports are captured).
fn guest_memory<F: Frontend>(caller: &mut Caller<'_, HostState<F>>) -> anyhow::Result<Memory> {
    if let Some(exports) = &caller.data().exports {
        return Ok(exports.memory);
    }
    caller
        .get_export(guest_exports::MEMORY)
        .and_then(Extern::into_memory)
        .context("guest does not export `memory`")
}
