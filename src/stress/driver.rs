use std::thread;
use std::time::{Duration, Instant};

use log::{info, trace};
use rand::Rng;

use super::pool;
use super::window::WindowRecord;
use super::StressError;
use crate::config::Config;
use crate::server::{ServerEvent, WindowServer, WorkArea, KEY_ESCAPE, KEY_Q};

/// The stress session: owns the server connection, the random source and
/// every window record. Single threaded; the quit flag is checked once per
/// frame, so at most one frame runs after a quit signal.
pub struct Stress<S: WindowServer, R: Rng> {
    server: S,
    rng: R,
    config: Config,
    area: WorkArea,
    windows: Vec<WindowRecord>,
    quit: bool,
}

impl<S: WindowServer, R: Rng> Stress<S, R> {
    pub fn new(mut server: S, mut rng: R, config: Config) -> Result<Self, StressError> {
        let area = server.work_area();
        info!(
            "work area {}x{} at ({}, {})",
            area.width, area.height, area.x, area.y
        );
        let windows = pool::create_pool(&mut server, &mut rng, &config, &area);
        if windows.is_empty() {
            // without a single window there is no surface left to receive
            // the quit key, so refuse to start
            return Err(StressError::NoWindows);
        }
        Ok(Stress {
            server,
            rng,
            config,
            area,
            windows,
            quit: false,
        })
    }

    pub fn run(&mut self) {
        let period = Duration::from_secs_f64(1.0 / self.config.target_fps);
        info!(
            "driving {} windows at {} fps",
            self.windows.len(),
            self.config.target_fps
        );
        while !self.quit {
            let start = Instant::now();
            self.frame();
            let delay = pacing_delay(start.elapsed(), period);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
        self.shutdown();
    }

    /// One full iteration: drain events, jitter every window, render.
    fn frame(&mut self) {
        for event in self.server.poll_events() {
            match event {
                ServerEvent::KeyPress(KEY_ESCAPE | KEY_Q) => {
                    info!("quit key pressed");
                    self.quit = true;
                }
                ServerEvent::KeyPress(key) => {
                    trace!("ignoring keysym {:#x}", key);
                }
                ServerEvent::CloseRequested(window) => {
                    info!("window {} asked to close, ending session", window);
                    self.quit = true;
                }
            }
        }
        for win in self.windows.iter_mut() {
            if self.server.should_close(win.id) {
                // one closing window ends the whole session and the rest
                // of this pass is skipped
                self.quit = true;
                break;
            }

            let dw = self
                .rng
                .random_range(-self.config.jitter_size..=self.config.jitter_size);
            let dh = self
                .rng
                .random_range(-self.config.jitter_size..=self.config.jitter_size);
            let dx = self
                .rng
                .random_range(-self.config.jitter_pos..=self.config.jitter_pos);
            let dy = self
                .rng
                .random_range(-self.config.jitter_pos..=self.config.jitter_pos);

            let new_width = jitter_side(win.width, dw, self.config.min_size, self.config.max_size);
            let new_height = jitter_side(win.height, dh, self.config.min_size, self.config.max_size);
            // the position clamp uses the new size, so a grown window is
            // pushed back inside the work area in the same frame
            let new_x = jitter_axis(win.x, dx, new_width, self.area.x, self.area.width);
            let new_y = jitter_axis(win.y, dy, new_height, self.area.y, self.area.height);

            if new_width != win.width || new_height != win.height {
                self.server.resize_window(win.id, new_width, new_height);
            }
            if new_x != win.x || new_y != win.y {
                self.server.move_window(win.id, new_x, new_y);
            }
            win.width = new_width;
            win.height = new_height;
            win.x = new_x;
            win.y = new_y;

            self.server
                .fill_window(win.id, win.width, win.height, win.color);
            self.server.present(win.id);
        }
    }

    fn shutdown(&mut self) {
        info!("destroying {} windows", self.windows.len());
        for win in self.windows.drain(..) {
            self.server.destroy_window(win.id);
        }
    }
}

/// Apply a size delta and keep the result inside [min, max].
fn jitter_side(side: u32, delta: i32, min: u32, max: u32) -> u32 {
    (side as i32 + delta).clamp(min as i32, max as i32) as u32
}

/// Apply a position delta and keep a span of `extent` inside the work area
/// along one axis starting at `origin` with the given `room`.
fn jitter_axis(pos: i32, delta: i32, extent: u32, origin: i32, room: u32) -> i32 {
    let hi = origin + (room as i32 - extent as i32).max(0);
    (pos + delta).clamp(origin, hi)
}

/// Time left in the frame period. Zero when the frame ran long, never
/// negative; each frame is paced from its own elapsed time alone.
fn pacing_delay(elapsed: Duration, period: Duration) -> Duration {
    period.saturating_sub(elapsed)
}
