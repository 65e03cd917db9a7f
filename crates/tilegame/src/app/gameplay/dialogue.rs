use std::collections::VecDeque;

use tilecore::{Canvas, DrawCall, PixelRect, Rgba};

const BOX_BACKGROUND: Rgba = Rgba::rgb(18, 18, 24);
const BOX_BORDER: Rgba = Rgba::rgb(200, 200, 190);
const BOX_HEIGHT_RATIO: i32 = 4;
const BOX_MARGIN_PX: i32 = 16;
const BORDER_PX: i32 = 2;
const CHARS_PER_TICK: usize = 1;

/// Queue of dialogue lines with a typewriter reveal of the current one.
#[derive(Debug, Default)]
pub(crate) struct DialogueBox {
    queue: VecDeque<String>,
    current: Option<String>,
    revealed: usize,
    bounds: PixelRect,
}

impl DialogueBox {
    /// Appends lines; returns true if the box has something to show.
    pub(crate) fn enqueue<I, S>(&mut self, lines: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queue.extend(lines.into_iter().map(Into::into));
        if self.current.is_none() {
            self.next_line();
        }
        self.is_active()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub(crate) fn pending_lines(&self) -> usize {
        self.queue.len() + usize::from(self.current.is_some())
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.current = None;
        self.revealed = 0;
    }

    pub(crate) fn update_progress(&mut self) {
        if let Some(line) = self.current.as_ref() {
            let total = line.chars().count();
            self.revealed = (self.revealed + CHARS_PER_TICK).min(total);
        }
    }

    /// Completes the current line, or moves on if it is already complete.
    /// Returns false once the queue is exhausted.
    pub(crate) fn advance(&mut self) -> bool {
        let Some(line) = self.current.as_ref() else {
            return false;
        };
        let total = line.chars().count();
        if self.revealed < total {
            self.revealed = total;
            return true;
        }
        self.next_line();
        self.is_active()
    }

    pub(crate) fn visible_text(&self) -> &str {
        let Some(line) = self.current.as_deref() else {
            return "";
        };
        match line.char_indices().nth(self.revealed) {
            Some((end, _)) => &line[..end],
            None => line,
        }
    }

    pub(crate) fn on_window_change(&mut self, window_size: (u32, u32)) {
        let (width, height) = (window_size.0 as i32, window_size.1 as i32);
        let box_height = height / BOX_HEIGHT_RATIO;
        self.bounds = PixelRect::new(
            BOX_MARGIN_PX,
            height - box_height - BOX_MARGIN_PX,
            (width - BOX_MARGIN_PX * 2).max(0),
            box_height,
        );
    }

    pub(crate) fn render(&self, canvas: &mut dyn Canvas) {
        if !self.is_active() || self.bounds.is_empty() {
            return;
        }
        canvas.draw(DrawCall::Panel {
            rect: self.bounds,
            color: BOX_BORDER,
        });
        canvas.draw(DrawCall::Panel {
            rect: self.bounds.inflated(-BORDER_PX),
            color: BOX_BACKGROUND,
        });
        canvas.draw(DrawCall::Caption {
            text: self.visible_text().to_string(),
            rect: self.bounds.inflated(-BOX_MARGIN_PX),
        });
    }

    fn next_line(&mut self) {
        self.current = self.queue.pop_front();
        self.revealed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typewriter_reveals_one_char_per_tick() {
        let mut dialogue = DialogueBox::default();
        assert!(dialogue.enqueue(["héllo"]));
        assert_eq!(dialogue.visible_text(), "");
        dialogue.update_progress();
        dialogue.update_progress();
        assert_eq!(dialogue.visible_text(), "hé");
    }

    #[test]
    fn advance_completes_then_moves_on_then_closes() {
        let mut dialogue = DialogueBox::default();
        dialogue.enqueue(["first", "second"]);

        assert!(dialogue.advance());
        assert_eq!(dialogue.visible_text(), "first");
        assert!(dialogue.advance());
        assert_eq!(dialogue.pending_lines(), 1);
        assert!(dialogue.advance());
        assert!(!dialogue.advance());
        assert!(!dialogue.is_active());
    }

    #[test]
    fn empty_enqueue_stays_inactive() {
        let mut dialogue = DialogueBox::default();
        assert!(!dialogue.enqueue(Vec::<String>::new()));
    }
}
