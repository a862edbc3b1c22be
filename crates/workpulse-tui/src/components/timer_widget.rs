use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use workpulse_core::Timer;

const WIDTH: u16 = 24;
const HEIGHT: u16 = 5;

/// Screen corner the floating timer is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    TopRight,
    BottomRight,
    BottomLeft,
    TopLeft,
}

impl Anchor {
    /// Clockwise.
    pub fn next(self) -> Self {
        match self {
            Anchor::TopRight => Anchor::BottomRight,
            Anchor::BottomRight => Anchor::BottomLeft,
            Anchor::BottomLeft => Anchor::TopLeft,
            Anchor::TopLeft => Anchor::TopRight,
        }
    }
}

#[derive(Debug, Default)]
pub struct TimerWidget {
    anchor: Anchor,
}

impl TimerWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn cycle_anchor(&mut self) {
        self.anchor = self.anchor.next();
    }

    /// Where the widget lands inside `area`, shrunk to fit small terminals.
    pub fn area(&self, area: Rect) -> Rect {
        let width = WIDTH.min(area.width);
        let height = HEIGHT.min(area.height);
        let right = area.x + area.width - width;
        let bottom = area.y + area.height - height;
        let (x, y) = match self.anchor {
            Anchor::TopRight => (right, area.y),
            Anchor::BottomRight => (right, bottom),
            Anchor::BottomLeft => (area.x, bottom),
            Anchor::TopLeft => (area.x, area.y),
        };
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, timer: &Timer) {
        let popup = self.area(area);
        frame.render_widget(Clear, popup);

        let phase = if timer.on_break() { "Break" } else { "Focus" };
        let (state, state_style) = if timer.is_running() {
            ("running", Style::default().fg(Color::Green))
        } else {
            ("paused", Style::default().fg(Color::DarkGray))
        };
        let border = if timer.on_break() {
            Color::Green
        } else {
            Color::Magenta
        };

        let block = Block::default()
            .title(format!(" {} · {phase} ", timer.mode().display_name()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let lines = vec![
            Line::from(Span::styled(timer.display(), Style::default().bold())),
            Line::from(Span::styled(state, state_style)),
            Line::from(Span::styled(
                "s start/pause · x close",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let body = Paragraph::new(lines).alignment(Alignment::Center).block(block);
        frame.render_widget(body, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect {
        Rect::new(0, 0, 100, 30)
    }

    #[test]
    fn anchors_cycle_through_all_corners() {
        let mut widget = TimerWidget::new();
        let mut seen = vec![widget.anchor()];
        for _ in 0..3 {
            widget.cycle_anchor();
            seen.push(widget.anchor());
        }
        widget.cycle_anchor();
        assert_eq!(widget.anchor(), Anchor::TopRight);
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn area_hugs_the_anchor_corner() {
        let mut widget = TimerWidget::new();
        assert_eq!(widget.area(screen()), Rect::new(76, 0, 24, 5));
        widget.cycle_anchor();
        assert_eq!(widget.area(screen()), Rect::new(76, 25, 24, 5));
        widget.cycle_anchor();
        assert_eq!(widget.area(screen()), Rect::new(0, 25, 24, 5));
        widget.cycle_anchor();
        assert_eq!(widget.area(screen()), Rect::new(0, 0, 24, 5));
    }

    #[test]
    fn area_shrinks_on_tiny_terminals() {
        let widget = TimerWidget::new();
        let tiny = Rect::new(2, 3, 10, 2);
        let rect = widget.area(tiny);
        assert_eq!(rect, Rect::new(2, 3, 10, 2));
    }
}
