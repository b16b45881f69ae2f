use crate::server::{Color, WindowId};

/// In-memory state for one live window. Geometry is rewritten every frame;
/// the color is assigned at creation and never changes afterwards.
#[derive(Debug, Clone, Copy)]
pub struct WindowRecord {
    pub id: WindowId,
    pub color: Color,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
