//! Custom Ratatui widget that renders the transcript as wrapped rows and
//! measures the viewport geometry the scroll core depends on.
//!
//! Rendering is the measurement step: the widget recounts the wrapped
//! content height against the current pane width on every draw and writes
//! it into the [`FeedViewport`], which the host then feeds to the scroller
//! as a settled [`Measurement`].

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::scroller::{Measurement, Viewport};
use crate::core::transcript::Transcript;

use super::theme::Theme;

// ───────────────────────────────────────── viewport ──────────

/// Persistent scroll state of the feed pane.  Owned by the rendering
/// layer; the core holds no reference and sees it only through the
/// [`Viewport`] trait during ticks.
#[derive(Debug, Default)]
pub struct FeedViewport {
    scroll_top: usize,
    content_height: usize,
    viewport_height: usize,
}

impl FeedViewport {
    /// Post-layout snapshot for the scroller.
    pub fn measurement(&self) -> Measurement {
        Measurement {
            scroll_top: self.scroll_top,
            content_height: self.content_height,
            viewport_height: self.viewport_height,
        }
    }

    /// Relative scroll, clamped to the usable range.
    pub fn scroll_by(&mut self, delta: isize) {
        let top = self.scroll_top as isize + delta;
        self.set_scroll_top(top.max(0) as usize);
    }

    /// Rows per page jump.
    pub fn page(&self) -> usize {
        self.viewport_height.saturating_sub(1).max(1)
    }

    /// Jump to the first row.
    pub fn scroll_to_top(&mut self) {
        self.scroll_top = 0;
    }

    /// Called by the widget after each draw with the freshly counted
    /// wrapped height and pane height.
    fn set_extents(&mut self, content: usize, viewport: usize) {
        self.content_height = content;
        self.viewport_height = viewport;
        let max = self.max_scroll_top();
        if self.scroll_top > max {
            self.scroll_top = max;
        }
    }
}

impl Viewport for FeedViewport {
    fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    fn content_height(&self) -> usize {
        self.content_height
    }

    fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    fn set_scroll_top(&mut self, top: usize) {
        self.scroll_top = top.min(self.max_scroll_top());
    }
}

// ───────────────────────────────────────── widget ────────────

/// The feed widget itself — created fresh each frame.
pub struct FeedWidget<'a> {
    transcript: &'a Transcript,
    block: Option<Block<'a>>,
}

impl<'a> FeedWidget<'a> {
    pub fn new(transcript: &'a Transcript) -> Self {
        Self {
            transcript,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl StatefulWidget for FeedWidget<'_> {
    type State = FeedViewport;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        // Resolve the inner area (inside the optional block border).
        let inner = if let Some(ref block) = self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.width < 4 || inner.height == 0 {
            state.set_extents(0, inner.height as usize);
            return;
        }

        if self.transcript.is_empty() {
            state.set_extents(0, inner.height as usize);
            let waiting = Line::from(Span::styled("waiting for feed…", Theme::stamp_style()));
            buf.set_line(inner.x, inner.y, &waiting, inner.width);
            return;
        }

        let lines = build_lines(self.transcript, inner.width as usize);
        state.set_extents(lines.len(), inner.height as usize);

        let visible = lines
            .iter()
            .skip(state.scroll_top)
            .take(inner.height as usize);
        for (i, line) in visible.enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

/// Flatten the transcript into display rows wrapped at `width`.
fn build_lines(transcript: &Transcript, width: usize) -> Vec<Line<'static>> {
    let mut out = Vec::new();
    for msg in transcript.iter() {
        let stamp = format!("{} ", msg.timestamp.format("%H:%M:%S"));
        let author = if msg.author.is_empty() {
            String::new()
        } else {
            format!("{}: ", msg.author)
        };
        let stamp_len = stamp.chars().count();
        let indent = " ".repeat(stamp_len);

        let first_width = width.saturating_sub(stamp_len + author.chars().count());
        let rest_width = width.saturating_sub(stamp_len);
        let chunks = wrap_body(&msg.body, first_width, rest_width);

        for (i, chunk) in chunks.into_iter().enumerate() {
            if i == 0 {
                let mut spans = vec![Span::styled(stamp.clone(), Theme::stamp_style())];
                if !author.is_empty() {
                    spans.push(Span::styled(author.clone(), Theme::author_style()));
                }
                spans.push(Span::raw(chunk));
                out.push(Line::from(spans));
            } else {
                out.push(Line::from(vec![Span::raw(indent.clone()), Span::raw(chunk)]));
            }
        }
    }
    out
}

/// Greedy word wrap.  The first row may be narrower than the rest (it
/// shares space with the stamp and author prefix); words longer than a
/// row are hard-split.
fn wrap_body(body: &str, first_width: usize, rest_width: usize) -> Vec<String> {
    let first_width = first_width.max(1);
    let rest_width = rest_width.max(1);

    let mut out: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut len = 0usize;
    let mut width = first_width;

    for word in body.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        loop {
            let wlen = chars.len();
            if len == 0 {
                if wlen <= width {
                    line.extend(chars.iter());
                    len = wlen;
                    break;
                }
                let rest = chars.split_off(width);
                out.push(chars.into_iter().collect());
                width = rest_width;
                chars = rest;
            } else if len + 1 + wlen <= width {
                line.push(' ');
                line.extend(chars.iter());
                len += 1 + wlen;
                break;
            } else {
                out.push(std::mem::take(&mut line));
                len = 0;
                width = rest_width;
            }
        }
    }

    if !line.is_empty() || out.is_empty() {
        out.push(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::Message;

    #[test]
    fn wrap_keeps_short_text_on_one_row() {
        assert_eq!(wrap_body("hello world", 20, 20), vec!["hello world"]);
    }

    #[test]
    fn wrap_breaks_at_word_boundaries() {
        assert_eq!(
            wrap_body("the quick brown fox", 9, 9),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn wrap_first_row_may_be_narrower() {
        assert_eq!(
            wrap_body("aa bb cc dd", 5, 11),
            vec!["aa bb", "cc dd"]
        );
    }

    #[test]
    fn wrap_hard_splits_long_words() {
        assert_eq!(
            wrap_body("abcdefghij", 4, 4),
            vec!["abcd", "efgh", "ij"]
        );
    }

    #[test]
    fn wrap_empty_body_still_occupies_a_row() {
        assert_eq!(wrap_body("", 10, 10), vec![""]);
    }

    #[test]
    fn viewport_clamps_to_usable_range() {
        let mut vp = FeedViewport::default();
        vp.set_extents(100, 20);
        vp.set_scroll_top(500);
        assert_eq!(vp.scroll_top(), 80);
        vp.scroll_by(-200);
        assert_eq!(vp.scroll_top(), 0);
    }

    #[test]
    fn shrinking_content_pulls_the_viewport_back() {
        let mut vp = FeedViewport::default();
        vp.set_extents(100, 20);
        vp.set_scroll_top(80);
        vp.set_extents(50, 20);
        assert_eq!(vp.scroll_top(), 30);
    }

    #[test]
    fn build_lines_counts_wrapped_rows() {
        let mut tr = Transcript::new(10);
        tr.add(Message::new("alice", "a b c d e f g h i j k l m n o p"), true);
        // 9-char stamp prefix + "alice: " leaves little room at width 20.
        let lines = build_lines(&tr, 20);
        assert!(lines.len() > 1);
    }
}
