//! Host configuration.
//!
//! There is no CLI or environment surface: the binary always runs [`HostConfig::default`].
//! Embedders and tests build their own.

use std::path::PathBuf;
use std::time::Duration;

use crate::abi::guest_exports;

/// Where release builds of the guest land.
pub const DEFAULT_MODULE_PATH: &str = "target/wasm32-unknown-unknown/release/svg_spinner.wasm";

/// One display refresh at 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Clone, Debug)]
pub struct HostConfig {
    /// Guest payload, `.wasm` or `.wat`.
    pub module_path: PathBuf,
    /// Export called once after instantiation.
    pub entry_point: String,
    /// Pause between animation frames in [`Host::run`](crate::host::Host::run).
    pub frame_interval: Duration,
    /// Stop [`Host::run`](crate::host::Host::run) after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            module_path: PathBuf::from(DEFAULT_MODULE_PATH),
            entry_point: guest_exports::MAIN.to_string(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            max_frames: None,
        }
    }
}
