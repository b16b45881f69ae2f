use std::ffi::NulError;

use thiserror::Error;

pub type WindowId = u64;
pub type Keysym = u64;

// X keysyms for the two quit keys, kept as plain constants so the
// simulation core never has to import xlib.
pub const KEY_ESCAPE: Keysym = 0xff1b;
pub const KEY_Q: Keysym = 0x71;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    NulString(#[from] NulError),
    #[error("server refused to create the window")]
    CreateFailed,
}

/// Input delivered by the server during a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    KeyPress(Keysym),
    CloseRequested(WindowId),
}

/// Usable display rectangle, excluding docks and bars when the window
/// manager reports them.
#[derive(Debug, Clone, Copy)]
pub struct WorkArea {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// A solid fill color, channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Pack into a 24-bit truecolor pixel value.
    pub fn to_pixel(self) -> u64 {
        let quant = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u64;
        (quant(self.r) << 16) | (quant(self.g) << 8) | quant(self.b)
    }
}

/// The windowing system as seen by the stress core.
///
/// `X11Adapter` is the production implementation. Only window creation can
/// fail; every per-frame call is fire-and-forget, which matches the async
/// X protocol.
pub trait WindowServer {
    fn work_area(&mut self) -> WorkArea;
    fn create_window(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        title: &str,
        color: Color,
    ) -> Result<WindowId, ServerError>;
    fn move_window(&mut self, window: WindowId, x: i32, y: i32);
    fn resize_window(&mut self, window: WindowId, width: u32, height: u32);
    /// Drain and return all pending events.
    fn poll_events(&mut self) -> Vec<ServerEvent>;
    fn should_close(&self, window: WindowId) -> bool;
    fn fill_window(&mut self, window: WindowId, width: u32, height: u32, color: Color);
    fn present(&mut self, window: WindowId);
    fn destroy_window(&mut self, window: WindowId);
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashSet;

    use super::*;

    /// Call-recording server for the core tests.
    pub struct MockServer {
        pub area: WorkArea,
        pub created: Vec<WindowId>,
        pub destroyed: Vec<WindowId>,
        pub moves: usize,
        pub resizes: usize,
        pub fills: Vec<(WindowId, u32, u32, Color)>,
        pub presents: usize,
        /// Succeed this many creations, then fail the rest.
        pub fail_after: Option<usize>,
        /// One batch of events per poll, oldest first.
        pub events: Vec<Vec<ServerEvent>>,
        pub closing: HashSet<WindowId>,
        next_id: WindowId,
    }

    impl MockServer {
        pub fn new(area: WorkArea) -> Self {
            MockServer {
                area,
                created: Vec::new(),
                destroyed: Vec::new(),
                moves: 0,
                resizes: 0,
                fills: Vec::new(),
                presents: 0,
                fail_after: None,
                events: Vec::new(),
                closing: HashSet::new(),
                next_id: 0,
            }
        }

        pub fn push_events(&mut self, batch: Vec<ServerEvent>) {
            self.events.push(batch);
        }
    }

    impl WindowServer for MockServer {
        fn work_area(&mut self) -> WorkArea {
            self.area
        }

        fn create_window(
            &mut self,
            _x: i32,
            _y: i32,
            _width: u32,
            _height: u32,
            _title: &str,
            _color: Color,
        ) -> Result<WindowId, ServerError> {
            if self.fail_after.map_or(false, |n| self.created.len() >= n) {
                return Err(ServerError::CreateFailed);
            }
            self.next_id += 1;
            self.created.push(self.next_id);
            Ok(self.next_id)
        }

        fn move_window(&mut self, _window: WindowId, _x: i32, _y: i32) {
            self.moves += 1;
        }

        fn resize_window(&mut self, _window: WindowId, _width: u32, _height: u32) {
            self.resizes += 1;
        }

        fn poll_events(&mut self) -> Vec<ServerEvent> {
            if self.events.is_empty() {
                Vec::new()
            } else {
                self.events.remove(0)
            }
        }

        fn should_close(&self, window: WindowId) -> bool {
            self.closing.contains(&window)
        }

        fn fill_window(&mut self, window: WindowId, width: u32, height: u32, color: Color) {
            self.fills.push((window, width, height, color));
        }

        fn present(&mut self, _window: WindowId) {
            self.presents += 1;
        }

        fn destroy_window(&mut self, window: WindowId) {
            self.destroyed.push(window);
        }
    }
}

#[cfg(test)]
mod color_tests {
    use super::Color;

    #[test]
    fn test_to_pixel_pure_channels() {
        assert_eq!(Color { r: 1.0, g: 0.0, b: 0.0 }.to_pixel(), 0xff0000);
        assert_eq!(Color { r: 0.0, g: 1.0, b: 0.0 }.to_pixel(), 0x00ff00);
        assert_eq!(Color { r: 0.0, g: 0.0, b: 1.0 }.to_pixel(), 0x0000ff);
    }

    #[test]
    fn test_to_pixel_rounds_midtones() {
        let grey = Color { r: 0.5, g: 0.5, b: 0.5 };
        assert_eq!(grey.to_pixel(), 0x808080);
    }

    #[test]
    fn test_to_pixel_clamps_out_of_range() {
        let c = Color { r: 1.5, g: -0.2, b: 0.0 };
        assert_eq!(c.to_pixel(), 0xff0000);
    }
}
