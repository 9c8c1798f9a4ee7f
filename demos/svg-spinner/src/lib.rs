// Minimal svghost guest: a polygon spinning around the pointer.
//
// Build with `cargo build -p svg_spinner --target wasm32-unknown-unknown --release` and point
// `svghost` at the resulting `svg_spinner.wasm`.
//
// Escape (or the frame limit) shuts the loop down; the host then delivers `Destroyed` once.

use std::f64::consts::TAU;
use std::fmt::Write;

use svghost_sdk::prelude::*;

const SIDES: u32 = 5;
const RADIUS: f64 = 80.0;
/// Radians per frame, doubled while Shift is held.
const SPIN: f64 = 0.05;
const FRAME_LIMIT: u32 = 600;
const KEY_ESCAPE: u32 = 27;

struct Spinner {
    center: (f64, f64),
    angle: f64,
    fast: bool,
    frames: u32,
    started: Instant,
    path: String,
}

impl Spinner {
    fn new() -> Self {
        Self {
            center: (160.0, 120.0),
            angle: 0.0,
            fast: false,
            frames: 0,
            started: Instant::now(),
            path: String::new(),
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        self.angle = (self.angle + if self.fast { 2.0 * SPIN } else { SPIN }) % TAU;
    }

    fn render(&mut self) {
        self.path.clear();
        let (cx, cy) = self.center;
        for i in 0..SIDES {
            let a = self.angle + TAU * f64::from(i) / f64::from(SIDES);
            let c = if i == 0 { 'M' } else { 'L' };
            write!(
                self.path,
                "{c}{:.2} {:.2} ",
                cx + RADIUS * math::cos(a),
                cy + RADIUS * math::sin(a)
            )
            .ok();
        }
        self.path.push('Z');
        svg::set_path(&self.path);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn my_main() {
    let mut spinner = Spinner::new();

    let opened = EventLoop::new(move |event, event_loop| match event {
        Event::AnimationFrame => {
            spinner.tick();
            spinner.render();
            if spinner.frames % 120 == 0 {
                console::puts(&format!(
                    "frame {} after {:.1}s",
                    spinner.frames,
                    spinner.started.elapsed().as_secs_f64()
                ));
            }
            if spinner.frames >= FRAME_LIMIT {
                event_loop.shutdown();
            } else {
                event_loop.request_animation_frame();
            }
        }
        Event::MouseMove { x, y } => {
            spinner.center = (f64::from(x), f64::from(y));
        }
        Event::KeyDown(key) if key.code == KEY_ESCAPE => {
            event_loop.shutdown();
        }
        Event::KeyDown(key) | Event::KeyUp(key) => {
            spinner.fast = key.shift();
        }
        Event::Destroyed => {
            console::puts("spinner stopped");
            console::alert(f64::from(spinner.frames));
        }
    });

    match opened {
        Some(mut event_loop) => {
            console::puts("event loop started");
            event_loop.request_animation_frame();
        }
        None => console::puts("no event loop available"),
    }
}
