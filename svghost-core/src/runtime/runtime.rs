use crate::abi::{self, GuestExports};
use crate::frontend::Frontend;
use crate::state::HostState;

use wasmtime::{Instance, Linker, Module, Store, TypedFunc};

/// Host-side runtime container.
pub struct HostRuntime<F: Frontend> {
    pub engine: wasmtime::Engine,
    pub store: Store<HostState<F>>,
    pub linker: Linker<HostState<F>>,
}

/// What instantiation hands back to the host.
pub struct Instantiated {
    pub instance: Instance,
    pub exports: GuestExports,
    pub entry_point: TypedFunc<(), ()>,
}

impl<F: Frontend> HostRuntime<F> {
    /// Create a new Wasmtime runtime.
    ///
    /// The guests this host runs are plain `wasm32-unknown-unknown` cdylibs, so only the
    /// baseline proposals every toolchain emits are switched on explicitly.
    pub fn new(frontend: F) -> Result<Self, anyhow::Error> {
        let mut cfg = wasmtime::Config::new();
        cfg.wasm_multi_value(true);
        cfg.wasm_bulk_memory(true);
        cfg.wasm_reference_types(true);
        cfg.wasm_simd(true);

        let engine = wasmtime::Engine::new(&cfg)?;
        let store = Store::new(&engine, HostState::new(frontend));
        let linker = Linker::new(&engine);

        Ok(Self {
            engine,
            store,
            linker,
        })
    }

    /// Define all host imports expected by guests under module `"env"`.
    ///
    /// Must be called before `instantiate`.
    pub fn define_imports(&mut self) -> Result<(), anyhow::Error> {
        super::imports::define_imports(&mut self.linker, &mut self.store)
    }

    /// Instantiate a module, capture its exports into the host state and resolve the entry
    /// point named `entry` (falling back to `main`/`my_main`).
    pub fn instantiate(
        &mut self,
        module: &Module,
        entry: &str,
    ) -> Result<Instantiated, anyhow::Error> {
        let instance = self.linker.instantiate(&mut self.store, module)?;

        let exports = GuestExports::resolve(&instance, &mut self.store)?;
        let entry_point = abi::resolve_entry_point(&instance, &mut self.store, entry)?;
        self.store.data_mut().exports = Some(exports.clone());

        Ok(Instantiated {
            instance,
            exports,
            entry_point,
        })
    }
}
