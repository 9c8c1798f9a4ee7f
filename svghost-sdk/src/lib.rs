#![cfg_attr(not(feature = "std"), no_std)]

//! svghost-sdk (handwritten)
//!
//! This crate is used by **guest** WASM apps that run inside `svghost`.
//!
//! ABI model:
//! - The guest renders by handing the host a complete SVG path string each frame.
//! - The guest opens one or more event loops and receives display refreshes, pointer moves
//!   and key presses through the exported `event_loop_cb`.
//! - The guest exports `main`, which the host calls once after instantiation.
//!
//! With the default `exports` feature this crate also provides the `alloc`, `dealloc` and
//! `event_loop_cb` exports the host requires; the app only writes `main`.

extern crate alloc;

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Event kind tags, as passed to `event_loop_cb`.
pub mod kind {
    pub const DESTROYED: u32 = 0;
    pub const ANIMATION_FRAME: u32 = 1;
    pub const MOUSE_MOVE: u32 = 2;
    pub const KEY_DOWN: u32 = 3;
    pub const KEY_UP: u32 = 4;
}

/// Modifier bits of key events.
pub mod modifiers {
    pub const SHIFT: u32 = 1 << 0;
    pub const CONTROL: u32 = 1 << 1;
    pub const ALT: u32 = 1 << 2;
}

/// Character word of key events whose key is not a single character.
pub const NO_CHAR: u32 = 0xFFFF_FFFF;

/// One key press or release.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Key {
    /// Platform key code.
    pub code: u32,
    pub chr: Option<char>,
    pub flags: u32,
}

impl Key {
    pub fn shift(&self) -> bool {
        self.flags & modifiers::SHIFT != 0
    }

    pub fn ctrl(&self) -> bool {
        self.flags & modifiers::CONTROL != 0
    }

    pub fn alt(&self) -> bool {
        self.flags & modifiers::ALT != 0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// Last event of a loop, delivered after `shutdown`.
    Destroyed,
    AnimationFrame,
    MouseMove { x: i32, y: i32 },
    KeyDown(Key),
    KeyUp(Key),
}

impl Event {
    /// Decode the arguments of `event_loop_cb`. Unknown kinds yield `None`.
    pub fn decode(kind: u32, p0: u32, p1: u32, p2: u32) -> Option<Event> {
        let key = || Key {
            code: p0,
            chr: if p1 == NO_CHAR { None } else { char::from_u32(p1) },
            flags: p2,
        };
        match kind {
            kind::DESTROYED => Some(Event::Destroyed),
            kind::ANIMATION_FRAME => Some(Event::AnimationFrame),
            kind::MOUSE_MOVE => Some(Event::MouseMove {
                x: p0 as i32,
                y: p1 as i32,
            }),
            kind::KEY_DOWN => Some(Event::KeyDown(key())),
            kind::KEY_UP => Some(Event::KeyUp(key())),
            _ => None,
        }
    }
}

/// Low-level raw ABI imports.
#[cfg(target_arch = "wasm32")]
pub mod sys {
    #[link(wasm_import_module = "env")]
    unsafe extern "C" {
        // Console
        pub fn puts(ptr: *const u8, len: usize);
        pub fn alert(value: f64);

        // Time
        pub fn performance_now() -> f64;

        // Event loop
        pub fn event_loop_new() -> u32;
        pub fn event_loop_raf(id: u32) -> u32;
        pub fn event_loop_shutdown(id: u32) -> u32;

        // SVG
        pub fn svg_set_path(ptr: *const u8, len: usize);

        // Math
        pub fn sqrt(x: f64) -> f64;
        pub fn sin(x: f64) -> f64;
        pub fn cos(x: f64) -> f64;
    }
}

/// Native stand-ins so the SDK and its dependents build and unit-test off-target.
/// Calling any of them is a bug: the imports only exist inside the host.
#[cfg(not(target_arch = "wasm32"))]
#[allow(clippy::missing_safety_doc)]
pub mod sys {
    const NOT_HOSTED: &str = "svghost imports are only available inside the svghost host";

    pub unsafe fn puts(_ptr: *const u8, _len: usize) {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn alert(_value: f64) {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn performance_now() -> f64 {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn event_loop_new() -> u32 {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn event_loop_raf(_id: u32) -> u32 {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn event_loop_shutdown(_id: u32) -> u32 {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn svg_set_path(_ptr: *const u8, _len: usize) {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn sqrt(_x: f64) -> f64 {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn sin(_x: f64) -> f64 {
        unimplemented!("{NOT_HOSTED}")
    }
    pub unsafe fn cos(_x: f64) -> f64 {
        unimplemented!("{NOT_HOSTED}")
    }
}

/// Console API.
pub mod console {
    use super::sys;

    /// Log a message to the host console.
    pub fn puts(message: &str) {
        unsafe { sys::puts(message.as_ptr(), message.len()) }
    }

    /// Show a modal notification carrying `value`.
    pub fn alert(value: f64) {
        unsafe { sys::alert(value) }
    }
}

/// SVG API.
pub mod svg {
    use super::sys;

    /// Replace the geometry (`d` attribute) of the host's path element.
    pub fn set_path(data: &str) {
        unsafe { sys::svg_set_path(data.as_ptr(), data.len()) }
    }
}

/// Host math intrinsics; usable from `no_std` guests, where `f64::sqrt` and friends are
/// unavailable.
pub mod math {
    use super::sys;

    pub fn sqrt(x: f64) -> f64 {
        unsafe { sys::sqrt(x) }
    }

    pub fn sin(x: f64) -> f64 {
        unsafe { sys::sin(x) }
    }

    pub fn cos(x: f64) -> f64 {
        unsafe { sys::cos(x) }
    }
}

/// Monotonic time over the host's `performance_now`.
pub mod time {
    use super::sys;
    pub use core::time::Duration;

    #[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
    pub struct Instant {
        ms: f64,
    }

    impl Instant {
        pub fn now() -> Instant {
            Instant {
                ms: unsafe { sys::performance_now() },
            }
        }

        pub fn duration_since(&self, earlier: Instant) -> Duration {
            millis_to_duration(self.ms - earlier.ms)
        }

        pub fn elapsed(&self) -> Duration {
            Instant::now().duration_since(*self)
        }
    }

    /// Negative spans clamp to zero.
    pub(crate) fn millis_to_duration(ms: f64) -> Duration {
        if ms > 0.0 {
            Duration::from_secs_f64(ms / 1e3)
        } else {
            Duration::ZERO
        }
    }
}

#[cfg(feature = "std")]
pub mod event_loop;

/// Guest allocator exports used by the host to hand strings into guest memory.
#[cfg(feature = "exports")]
pub mod exports {
    use alloc::vec::Vec;

    #[unsafe(no_mangle)]
    pub extern "C" fn alloc(size: usize) -> *mut u8 {
        let mut buf = Vec::<u8>::with_capacity(size);
        let ptr = buf.as_mut_ptr();
        core::mem::forget(buf);
        ptr
    }

    /// # Safety
    /// `ptr` and `size` must come from a previous `alloc(size)`.
    #[unsafe(no_mangle)]
    pub unsafe extern "C" fn dealloc(ptr: *mut u8, size: usize) {
        drop(unsafe { Vec::from_raw_parts(ptr, 0, size) });
    }

    #[cfg(feature = "std")]
    #[unsafe(no_mangle)]
    pub extern "C" fn event_loop_cb(id: u32, kind: u32, p0: u32, p1: u32, p2: u32) {
        crate::event_loop::dispatch(id, kind, p0, p1, p2);
    }
}

/// Convenience prelude for guest apps.
pub mod prelude {
    pub use crate::console;
    #[cfg(feature = "std")]
    pub use crate::event_loop::EventLoop;
    pub use crate::math;
    pub use crate::svg;
    pub use crate::time::{Duration, Instant};
    pub use crate::{Event, Key};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mouse_move() {
        assert_eq!(
            Event::decode(kind::MOUSE_MOVE, 120, 45, 0),
            Some(Event::MouseMove { x: 120, y: 45 })
        );
        assert_eq!(
            Event::decode(kind::MOUSE_MOVE, -3i32 as u32, 7, 0),
            Some(Event::MouseMove { x: -3, y: 7 })
        );
    }

    #[test]
    fn decodes_keys() {
        let Some(Event::KeyDown(key)) = Event::decode(kind::KEY_DOWN, 65, 97, 0) else {
            panic!("expected key down");
        };
        assert_eq!(key.chr, Some('a'));
        assert!(!key.shift() && !key.ctrl() && !key.alt());

        let Some(Event::KeyUp(key)) = Event::decode(kind::KEY_UP, 9, NO_CHAR, modifiers::SHIFT)
        else {
            panic!("expected key up");
        };
        assert_eq!(key.code, 9);
        assert_eq!(key.chr, None);
        assert!(key.shift());
    }

    #[test]
    fn surrogate_char_words_decode_to_none() {
        let Some(Event::KeyDown(key)) = Event::decode(kind::KEY_DOWN, 0, 0xD800, 0) else {
            panic!("expected key down");
        };
        assert_eq!(key.chr, None);
    }

    #[test]
    fn lifecycle_and_unknown_kinds() {
        assert_eq!(Event::decode(kind::DESTROYED, 0, 0, 0), Some(Event::Destroyed));
        assert_eq!(
            Event::decode(kind::ANIMATION_FRAME, 0, 0, 0),
            Some(Event::AnimationFrame)
        );
        assert_eq!(Event::decode(99, 0, 0, 0), None);
    }

    #[test]
    fn millis_convert_to_durations() {
        assert_eq!(time::millis_to_duration(1500.0), time::Duration::from_millis(1500));
        assert_eq!(time::millis_to_duration(-2.0), time::Duration::ZERO);
    }

    #[cfg(feature = "exports")]
    #[test]
    fn alloc_dealloc_round_trip() {
        let ptr = exports::alloc(16);
        assert!(!ptr.is_null());
        unsafe {
            ptr.write_bytes(0xAB, 16);
            exports::dealloc(ptr, 16);
        }
    }
}
