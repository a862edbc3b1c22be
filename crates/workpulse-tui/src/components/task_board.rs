use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use workpulse_core::{Board, Card, Column, TagColor};

/// Cursor state over a [`Board`]. The board itself lives in the controller,
/// so every method takes it by reference.
pub struct TaskBoard {
    active_column: usize,
    selected: [usize; 4],
}

/// A card currently held by the keyboard drag.
#[derive(Debug, Clone, Copy)]
pub struct Carry<'a> {
    pub card_id: &'a str,
    pub target: Column,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBoard {
    pub fn new() -> Self {
        Self {
            active_column: 0,
            selected: [0; 4],
        }
    }

    pub fn active_column(&self) -> Column {
        Column::ALL[self.active_column]
    }

    /// Returns the currently highlighted card, if any.
    pub fn selected_card<'b>(&self, board: &'b Board) -> Option<&'b Card> {
        board
            .cards(self.active_column())
            .get(self.selected[self.active_column])
    }

    /// Move the cursor onto `card_id`. Returns `false` (cursor unchanged) if
    /// the card is not on the board.
    pub fn select_card_by_id(&mut self, board: &Board, card_id: &str) -> bool {
        match board.position(card_id) {
            Some((column, index)) => {
                self.active_column = column.index();
                self.selected[column.index()] = index;
                true
            }
            None => false,
        }
    }

    /// Keep every column's cursor inside its card list after a reload.
    pub fn clamp(&mut self, board: &Board) {
        for column in Column::ALL {
            let len = board.cards(column).len();
            let sel = &mut self.selected[column.index()];
            *sel = (*sel).min(len.saturating_sub(1));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, board: &Board) {
        let len = board.cards(self.active_column()).len();
        let sel = &mut self.selected[self.active_column];
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                self.active_column = self.active_column.saturating_sub(1);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.active_column + 1 < Column::ALL.len() {
                    self.active_column += 1;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if *sel + 1 < len {
                    *sel += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                *sel = sel.saturating_sub(1);
            }
            KeyCode::Char('g') => *sel = 0,
            KeyCode::Char('G') => *sel = len.saturating_sub(1),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, board: &Board, carry: Option<Carry<'_>>) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        for (column, chunk) in Column::ALL.into_iter().zip(chunks.iter()) {
            self.render_column(frame, board, column, *chunk, carry);
        }
    }

    fn render_column(
        &self,
        frame: &mut Frame,
        board: &Board,
        column: Column,
        area: Rect,
        carry: Option<Carry<'_>>,
    ) {
        let cards = board.cards(column);
        let is_target = carry.is_some_and(|c| c.target == column);
        let is_active = column.index() == self.active_column;

        let (marker, border_style) = if is_target {
            ("▶ ", Style::default().fg(Color::Yellow).bold())
        } else if is_active && carry.is_none() {
            ("", Style::default().fg(Color::Cyan))
        } else {
            ("", Style::default().fg(Color::DarkGray))
        };
        let title = format!(" {marker}{} ({}) ", column.display_name(), cards.len());

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let items: Vec<ListItem> = cards
            .iter()
            .map(|card| {
                let held = carry.is_some_and(|c| c.card_id == card.id);
                card_item(card, held)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if is_active && carry.is_none() && !cards.is_empty() {
            state.select(Some(self.selected[column.index()]));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn card_item(card: &Card, held: bool) -> ListItem<'_> {
    let tag = Span::styled("● ", tag_style(card.tag));
    let title = if held {
        Span::styled(
            format!("» {}", card.title),
            Style::default().fg(Color::Yellow).italic(),
        )
    } else {
        Span::raw(card.title.as_str())
    };
    let (done, total) = card.checklist;
    let meta = Line::from(Span::styled(
        format!(
            "  ☑ {done}/{total}  ✎ {}  ⎘ {}  ☺ {}",
            card.comment_count,
            card.file_count,
            card.avatars.len()
        ),
        Style::default().fg(Color::DarkGray),
    ));
    ListItem::new(vec![Line::from(vec![tag, title]), meta])
}

fn tag_style(tag: TagColor) -> Style {
    match tag {
        TagColor::Green => Style::default().fg(Color::Green),
        TagColor::Yellow => Style::default().fg(Color::Yellow),
        TagColor::Red => Style::default().fg(Color::Red).bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use workpulse_core::Task;

    fn task(id: &str, status: &str) -> Task {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": format!("Task {id}"),
            "status": status,
        }))
        .unwrap()
    }

    fn make_board() -> Board {
        Board::from_tasks(vec![
            task("t1", "todo"),
            task("t2", "overdued"),
            task("d1", "doing"),
            task("c1", "reviewing"),
            task("c2", "completed"),
            task("c3", "feedbacked"),
            task("r1", "rejected"),
        ])
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn select_card_in_middle_column() {
        let board = make_board();
        let mut cursor = TaskBoard::new();
        assert!(cursor.select_card_by_id(&board, "c2"));
        assert_eq!(cursor.active_column(), Column::Completed);
        assert_eq!(cursor.selected_card(&board).unwrap().id, "c2");
    }

    #[test]
    fn select_missing_card_keeps_cursor() {
        let board = make_board();
        let mut cursor = TaskBoard::new();
        cursor.select_card_by_id(&board, "r1");
        assert!(!cursor.select_card_by_id(&board, "nope"));
        assert_eq!(cursor.active_column(), Column::Rejected);
        assert_eq!(cursor.selected_card(&board).unwrap().id, "r1");
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let board = make_board();
        let mut cursor = TaskBoard::new();
        cursor.handle_key(key(KeyCode::Char('h')), &board);
        assert_eq!(cursor.active_column(), Column::Todo);
        cursor.handle_key(key(KeyCode::Char('j')), &board);
        cursor.handle_key(key(KeyCode::Char('j')), &board);
        assert_eq!(cursor.selected_card(&board).unwrap().id, "t2");
        for _ in 0..10 {
            cursor.handle_key(key(KeyCode::Char('l')), &board);
        }
        assert_eq!(cursor.active_column(), Column::Rejected);
    }

    #[test]
    fn clamp_after_cards_leave() {
        let board = make_board();
        let mut cursor = TaskBoard::new();
        cursor.select_card_by_id(&board, "c3");
        let smaller = Board::from_tasks(vec![task("c1", "completed")]);
        cursor.clamp(&smaller);
        assert_eq!(cursor.selected_card(&smaller).unwrap().id, "c1");
        cursor.clamp(&Board::default());
        assert!(cursor.selected_card(&Board::default()).is_none());
    }

    #[test]
    fn renders_column_titles_with_counts() {
        use ratatui::backend::TestBackend;

        let board = make_board();
        let cursor = TaskBoard::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
        terminal
            .draw(|frame| cursor.render(frame, frame.area(), &board, None))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("To Do (2)"));
        assert!(text.contains("Completed (3)"));
        assert!(text.contains("Rejected (1)"));
    }
}
