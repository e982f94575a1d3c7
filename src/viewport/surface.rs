// Host surfaces
//
// A host surface is whatever the visualizer renders into: it reports its
// size, accepts presented frames, and owns the input listeners the
// viewport attaches at mount. TerminalSurface is the ratatui/crossterm
// host; tests use a recording double.

use crate::camera::ViewportSize;
use crate::render::DrawList;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use ratatui::layout::Rect;
use std::io;

/// Viewport pixels per terminal cell, vertically, for one horizontal pixel
///
/// Terminal cells are roughly twice as tall as they are wide.
pub const CELL_ASPECT: f32 = 2.0;

pub trait HostSurface {
    /// Current drawable size in viewport pixels
    fn size(&self) -> ViewportSize;

    /// Attach renderer output at the given size
    fn attach_output(&mut self, size: ViewportSize);

    /// Resize renderer output after a debounced resize
    fn resize_output(&mut self, size: ViewportSize);

    /// Hand over a finished frame
    fn present(&mut self, frame: DrawList);

    /// Remove renderer output from the host
    fn detach_output(&mut self);

    /// Start delivering pointer and resize input
    fn attach_listeners(&mut self);

    /// Stop delivering input
    fn detach_listeners(&mut self);
}

/// Map panel of a terminal UI
#[derive(Debug, Default)]
pub struct TerminalSurface {
    area: Rect,
    output_size: Option<ViewportSize>,
    frame: Option<DrawList>,
    /// Toggle terminal mouse reporting along with the listeners
    capture_mouse: bool,
    listening: bool,
}

impl TerminalSurface {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            capture_mouse: true,
            ..Default::default()
        }
    }

    /// A surface that never writes terminal control sequences
    #[cfg(test)]
    pub fn headless(area: Rect) -> Self {
        Self {
            area,
            ..Default::default()
        }
    }

    /// Record the panel's new cell area; picked up by the next recompute
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Latest presented frame, if output is attached
    pub fn frame(&self) -> Option<&DrawList> {
        self.frame.as_ref()
    }

    #[cfg(test)]
    pub fn output_size(&self) -> Option<ViewportSize> {
        self.output_size
    }

    #[cfg(test)]
    pub fn is_attached(&self) -> bool {
        self.output_size.is_some()
    }

    #[cfg(test)]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Convert a terminal cell to viewport pixels (cell center)
    ///
    /// None when the cell lies outside the panel.
    pub fn to_viewport(&self, column: u16, row: u16) -> Option<(f32, f32)> {
        let inside = column >= self.area.x
            && column < self.area.x.saturating_add(self.area.width)
            && row >= self.area.y
            && row < self.area.y.saturating_add(self.area.height);
        if !inside {
            return None;
        }
        let x = (column - self.area.x) as f32 + 0.5;
        let y = ((row - self.area.y) as f32 + 0.5) * CELL_ASPECT;
        Some((x, y))
    }

    /// Like `to_viewport`, but cells outside the panel snap to its edge
    ///
    /// Used for drag moves and releases, which keep tracking after the
    /// pointer leaves the panel.
    pub fn to_viewport_clamped(&self, column: u16, row: u16) -> (f32, f32) {
        let last_column = self.area.x.saturating_add(self.area.width.saturating_sub(1));
        let last_row = self.area.y.saturating_add(self.area.height.saturating_sub(1));
        let column = column.clamp(self.area.x, last_column.max(self.area.x));
        let row = row.clamp(self.area.y, last_row.max(self.area.y));
        let x = (column - self.area.x) as f32 + 0.5;
        let y = ((row - self.area.y) as f32 + 0.5) * CELL_ASPECT;
        (x, y)
    }
}

/// Pixel size of a cell area
pub fn cells_to_viewport(area: Rect) -> ViewportSize {
    ViewportSize::new(area.width as f32, area.height as f32 * CELL_ASPECT)
}

impl HostSurface for TerminalSurface {
    fn size(&self) -> ViewportSize {
        cells_to_viewport(self.area)
    }

    fn attach_output(&mut self, size: ViewportSize) {
        self.output_size = Some(size);
    }

    fn resize_output(&mut self, size: ViewportSize) {
        if self.output_size.is_some() {
            self.output_size = Some(size);
        }
    }

    fn present(&mut self, frame: DrawList) {
        if self.output_size.is_some() {
            self.frame = Some(frame);
        }
    }

    fn detach_output(&mut self) {
        self.output_size = None;
        self.frame = None;
    }

    fn attach_listeners(&mut self) {
        if self.listening {
            return;
        }
        if self.capture_mouse {
            if let Err(e) = execute!(io::stdout(), EnableMouseCapture) {
                tracing::warn!(error = %e, "Failed to enable mouse capture");
            }
        }
        self.listening = true;
    }

    fn detach_listeners(&mut self) {
        if !self.listening {
            return;
        }
        // Considered released either way so a failed write is not retried
        self.listening = false;
        if self.capture_mouse {
            if let Err(e) = execute!(io::stdout(), DisableMouseCapture) {
                tracing::warn!(error = %e, "Failed to disable mouse capture");
            }
        }
    }
}
