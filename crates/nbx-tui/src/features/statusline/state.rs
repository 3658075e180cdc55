//! Status line state types.

/// What the main status line shows instead of the key hints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusMessage<'a> {
    /// A failed action (e.g. an unknown dataset).
    Diagnostic(&'a str),
    /// Tooltip of the focused or hovered target.
    Tooltip(&'a str),
}

/// Immutable snapshot read by the renderer each frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusLine {
    pub fps: f32,
    pub animating: usize,
    pub cells: usize,
}

/// Mutable accumulator fed once per rendered frame.
#[derive(Debug)]
pub struct StatusLineAccumulator {
    fps_ema: f32,
    animating: usize,
    cells: usize,
}

impl Default for StatusLineAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLineAccumulator {
    pub fn new() -> Self {
        Self {
            fps_ema: 60.0,
            animating: 0,
            cells: 0,
        }
    }

    /// Update with the interval since the previous frame (ms).
    pub fn on_frame(&mut self, frame_ms: u16) {
        let fps = if frame_ms > 0 {
            1000.0 / f32::from(frame_ms)
        } else {
            self.fps_ema
        };
        self.fps_ema += 0.1 * (fps - self.fps_ema);
    }

    /// Records notebook counters shown next to the FPS.
    pub fn on_notebook(&mut self, cells: usize, animating: usize) {
        self.cells = cells;
        self.animating = animating;
    }

    pub fn snapshot(&self) -> StatusLine {
        StatusLine {
            fps: (self.fps_ema * 10.0).round() / 10.0,
            animating: self.animating,
            cells: self.cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_tracking() {
        let mut acc = StatusLineAccumulator::new();
        acc.on_frame(16);
        acc.on_frame(16);
        acc.on_frame(16);
        assert!(acc.snapshot().fps > 50.0);
    }

    #[test]
    fn test_slow_frames_pull_fps_down() {
        let mut acc = StatusLineAccumulator::new();
        for _ in 0..50 {
            acc.on_frame(100);
        }
        assert!(acc.snapshot().fps < 15.0);
    }

    #[test]
    fn test_notebook_counters() {
        let mut acc = StatusLineAccumulator::new();
        acc.on_notebook(4, 1);
        let snap = acc.snapshot();
        assert_eq!((snap.cells, snap.animating), (4, 1));
    }
}
