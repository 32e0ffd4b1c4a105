//! Shared fakes for core tests.

use super::scroller::{Measurement, Viewport};

/// In-memory viewport with directly poke-able geometry.
pub(crate) struct FakeViewport {
    pub top: usize,
    pub content: usize,
    pub view: usize,
}

impl FakeViewport {
    pub(crate) fn new(content: usize, view: usize) -> Self {
        Self {
            top: 0,
            content,
            view,
        }
    }

    pub(crate) fn measurement(&self) -> Measurement {
        Measurement {
            scroll_top: self.top,
            content_height: self.content,
            viewport_height: self.view,
        }
    }

    pub(crate) fn max_top(&self) -> usize {
        self.content.saturating_sub(self.view)
    }
}

impl Viewport for FakeViewport {
    fn scroll_top(&self) -> usize {
        self.top
    }

    fn content_height(&self) -> usize {
        self.content
    }

    fn viewport_height(&self) -> usize {
        self.view
    }

    fn set_scroll_top(&mut self, top: usize) {
        self.top = top.min(self.max_top());
    }
}
