//! The host: bootstraps a guest and plays the role of the window's event queue.
//!
//! Embedders feed it window events ([`Host::dispatch_input`]), display refreshes
//! ([`Host::animation_frame`]) and free ticks ([`Host::run_tasks`]). [`Host::run`] is the
//! headless driver the `svghost` binary uses.
//!
//! Every call runs to completion before returning. A guest callback may open, arm or shut
//! down sessions re-entrantly; liveness is re-checked before each delivery, so a session
//! closed halfway through a batch gets nothing more from that batch.

use anyhow::Context;
use wasmtime::Instance;

use crate::abi::GuestExports;
use crate::config::HostConfig;
use crate::event_loop::{GuestEvent, InputEvent, Registry, SessionId, Task};
use crate::frontend::Frontend;
use crate::loader;
use crate::runtime::{HostRuntime, Instantiated};
use crate::strings::{self, StringDescriptor};

pub struct Host<F: Frontend> {
    config: HostConfig,
    runtime: HostRuntime<F>,
    instance: Instance,
    exports: GuestExports,
    frames: u64,
}

impl<F: Frontend> Host<F> {
    /// Fetch the guest from `config.module_path`, instantiate it and call its entry point.
    pub fn bootstrap(config: HostConfig, frontend: F) -> anyhow::Result<Self> {
        let bytes = loader::fetch(&config.module_path)?;
        tracing::info!(path = %config.module_path.display(), len = bytes.len(), "fetched guest");
        Self::from_bytes(config, &bytes, frontend)
    }

    /// Same as [`Host::bootstrap`] with the payload already in memory.
    pub fn from_bytes(config: HostConfig, bytes: &[u8], frontend: F) -> anyhow::Result<Self> {
        let mut runtime = HostRuntime::new(frontend)?;
        let module = loader::compile_module(&runtime.engine, bytes)?;
        runtime.define_imports()?;

        let Instantiated {
            instance,
            exports,
            entry_point,
        } = runtime.instantiate(&module, &config.entry_point)?;

        tracing::info!(entry = %config.entry_point, "guest instantiated, calling entry point");
        entry_point
            .call(&mut runtime.store, ())
            .context("guest entry point trapped")?;

        Ok(Self {
            config,
            runtime,
            instance,
            exports,
            frames: 0,
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn frontend(&self) -> &F {
        &self.runtime.store.data().frontend
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.runtime.store.data_mut().frontend
    }

    pub fn registry(&self) -> &Registry {
        &self.runtime.store.data().registry
    }

    /// Animation frames fired so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// No live session and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.registry().is_idle()
    }

    /// Transient view of guest memory.
    pub fn guest_memory(&self) -> &[u8] {
        self.exports.memory.data(&self.runtime.store)
    }

    /// Copy `text` into a fresh guest allocation.
    pub fn write_string(&mut self, text: &str) -> anyhow::Result<StringDescriptor> {
        strings::write_string(&mut self.runtime.store, &self.exports, text)
    }

    pub fn read_string(&self, descriptor: StringDescriptor) -> anyhow::Result<String> {
        strings::read_string(
            &self.runtime.store,
            &self.exports.memory,
            descriptor.ptr,
            descriptor.len,
        )
    }

    pub fn free_string(&mut self, descriptor: StringDescriptor) -> anyhow::Result<()> {
        strings::free_string(&mut self.runtime.store, &self.exports, descriptor)
    }

    /// Route a window event to every live session listening for it, in subscription order.
    ///
    /// Returns how many sessions were notified.
    pub fn dispatch_input(&mut self, input: &InputEvent) -> anyhow::Result<usize> {
        let event = GuestEvent::from_input(input);
        let targets = self.registry().subscribers(input.listener());
        self.deliver_to_live(targets, event)
    }

    /// Display refresh: notify every session with an armed frame request.
    ///
    /// Requests made from inside these callbacks wait for the next refresh. If a callback
    /// traps, the requests not yet delivered stay armed.
    pub fn animation_frame(&mut self) -> anyhow::Result<usize> {
        let boundary = self.registry().frame_boundary();
        self.frames += 1;
        let mut delivered = 0;
        while let Some(id) = self.registry_mut().pop_frame_request(boundary) {
            self.deliver(id, GuestEvent::AnimationFrame)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Free tick: run the tasks queued so far. Tasks queued by these callbacks wait for
    /// the next tick. If a callback traps, the remaining tasks stay queued.
    pub fn run_tasks(&mut self) -> anyhow::Result<usize> {
        let due = self.registry().queued_tasks();
        for ran in 0..due {
            let Some(task) = self.registry_mut().pop_task() else {
                return Ok(ran);
            };
            match task {
                Task::Destroyed(id) => self.deliver(id, GuestEvent::Destroyed)?,
            }
        }
        Ok(due)
    }

    /// Headless driver: refresh every `frame_interval` while anything is pending.
    ///
    /// Returns once no frame is armed and no task is queued, or after `max_frames`.
    /// Returns the number of frames fired.
    pub fn run(&mut self) -> anyhow::Result<u64> {
        self.run_tasks()?;
        while self.registry().has_pending_work() {
            if self.config.max_frames.is_some_and(|max| self.frames >= max) {
                tracing::info!(frames = self.frames, "frame limit reached");
                break;
            }
            std::thread::sleep(self.config.frame_interval);
            self.animation_frame()?;
            self.run_tasks()?;
        }
        if !self.registry().is_empty() && !self.registry().has_pending_work() {
            tracing::info!(
                sessions = self.registry().len(),
                "no frames requested, leaving sessions open"
            );
        }
        Ok(self.frames)
    }

    fn registry_mut(&mut self) -> &mut Registry {
        &mut self.runtime.store.data_mut().registry
    }

    fn deliver_to_live(
        &mut self,
        targets: Vec<SessionId>,
        event: GuestEvent,
    ) -> anyhow::Result<usize> {
        let mut delivered = 0;
        for id in targets {
            if !self.registry().is_live(id) {
                continue;
            }
            self.deliver(id, event)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    /// The single call site of `event_loop_cb`.
    fn deliver(&mut self, id: SessionId, event: GuestEvent) -> anyhow::Result<()> {
        let (kind, a0, a1, a2) = event.encode();
        tracing::trace!(id, ?event, "event_loop_cb");
        self.exports
            .event_loop_cb
            .call(&mut self.runtime.store, (id, kind, a0, a1, a2))
            .with_context(|| format!("event_loop_cb trapped on {event:?} for session {id}"))
    }
}
