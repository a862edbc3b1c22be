use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tracing::{info, warn};
use workpulse_core::board::Card;
use workpulse_core::task::{CreateTask, RejectTask, ReviewTask};
use workpulse_core::{Board, Column, Priority, TickOutcome, Timer, TimerMode};
use workpulse_service::{BlockingHttpService, DragOutcome, HttpService, KanbanController, LoadState};

use crate::components::task_board::{Carry, TaskBoard};
use crate::components::timer_widget::{Anchor, TimerWidget};

const TICK: Duration = Duration::from_secs(1);

/// What the app is currently doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Normal board navigation
    Normal,
    /// The task list could not be loaded; only retry is offered.
    ErrorPane { message: String },
    /// A card is picked up and being carried across columns.
    Carrying {
        card_id: String,
        origin: Column,
        target: Column,
    },
    /// Blocking notice after a refused move. Must be dismissed.
    Alert { message: String },
    /// Viewing one task, with a cursor over its active checklist items
    TaskDetail { task_id: String, cursor: usize },
    /// Typing a quality score for a review
    ReviewScore { task_id: String, input: String },
    /// Typing a rejection reason
    RejectReason { task_id: String, input: String },
    /// Typing a new task name
    NewTask { input: String },
}

pub struct App {
    service: BlockingHttpService,
    kanban: KanbanController<HttpService>,
    board: TaskBoard,
    mode: Mode,
    timer: Timer,
    timer_widget: TimerWidget,
    /// Start of the current tick period. `None` whenever the timer is stopped.
    tick_clock: Option<Instant>,
    status_message: Option<String>,
}

impl App {
    /// Build the app and load the board. A failed load is not fatal: the app
    /// starts on the error pane.
    pub fn new(service: BlockingHttpService, timer_mode: TimerMode) -> Self {
        let kanban = KanbanController::new(service.shared());
        let mut app = Self {
            service,
            kanban,
            board: TaskBoard::new(),
            mode: Mode::Normal,
            timer: Timer::new(timer_mode),
            timer_widget: TimerWidget::new(),
            tick_clock: None,
            status_message: None,
        };
        app.refresh();
        app
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn board(&self) -> &Board {
        self.kanban.board()
    }

    pub fn load_state(&self) -> &LoadState {
        self.kanban.load_state()
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_anchor(&self) -> Anchor {
        self.timer_widget.anchor()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.board.selected_card(self.kanban.board())
    }

    /// Move the board cursor onto a card. Returns `false` if it is not on the board.
    pub fn select_card(&mut self, card_id: &str) -> bool {
        self.board.select_card_by_id(self.kanban.board(), card_id)
    }

    /// Reload the board from the server, keeping the cursor on the same card.
    pub fn refresh(&mut self) {
        let selected_id = self.selected_card().map(|c| c.id.clone());
        match self.service.block_on(self.kanban.fetch_tasks()) {
            Ok(()) => {
                self.board.clamp(self.kanban.board());
                if let Some(id) = selected_id {
                    self.select_card(&id);
                }
                if matches!(self.mode, Mode::ErrorPane { .. }) {
                    self.mode = Mode::Normal;
                }
            }
            Err(e) => {
                self.board.clamp(self.kanban.board());
                self.mode = Mode::ErrorPane {
                    message: e.to_string(),
                };
            }
        }
    }

    /// Modes in which `q` is typed or swallowed rather than quitting.
    pub fn is_input_mode(&self) -> bool {
        matches!(
            self.mode,
            Mode::NewTask { .. }
                | Mode::ReviewScore { .. }
                | Mode::RejectReason { .. }
                | Mode::Alert { .. }
        )
    }

    // -- Timer scheduling --

    /// How long the event loop may block before the next timer tick is due.
    /// `None` when the timer is stopped; the tick clock is cleared then.
    pub fn poll_timeout(&mut self) -> Option<Duration> {
        if !self.timer.is_running() {
            self.tick_clock = None;
            return None;
        }
        let started = *self.tick_clock.get_or_insert_with(Instant::now);
        Some(TICK.saturating_sub(started.elapsed()))
    }

    /// One elapsed tick period. Missed periods are not made up.
    pub fn tick(&mut self) {
        if !self.timer.is_running() {
            self.tick_clock = None;
            return;
        }
        self.tick_clock = Some(Instant::now());
        if self.timer.tick() == TickOutcome::Expired {
            self.tick_clock = None;
            let msg = if self.timer.on_break() {
                "Focus session complete. Time for a break"
            } else {
                "Break over. Back to focus"
            };
            info!("timer expired ({})", self.timer.mode().as_str());
            self.status_message = Some(msg.into());
        }
    }

    // -- Key handling --

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match &self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::ErrorPane { .. } => {
                if key.code == KeyCode::Char('r') {
                    self.refresh();
                }
            }
            Mode::Carrying {
                card_id,
                origin,
                target,
            } => self.handle_carrying(key, card_id.clone(), *origin, *target),
            Mode::Alert { .. } => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.mode = Mode::Normal;
                }
            }
            Mode::TaskDetail { task_id, cursor } => {
                self.handle_task_detail(key, task_id.clone(), *cursor)
            }
            Mode::ReviewScore { task_id, input } => {
                self.handle_review_score(key, task_id.clone(), input.clone())
            }
            Mode::RejectReason { task_id, input } => {
                self.handle_reject_reason(key, task_id.clone(), input.clone())
            }
            Mode::NewTask { input } => self.handle_new_task(key, input.clone()),
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => {
                if let Some(card) = self.selected_card() {
                    let card_id = card.id.clone();
                    let origin = self.board.active_column();
                    if self.kanban.is_in_flight(&card_id) {
                        self.status_message = Some("That card is still saving".into());
                    } else {
                        self.mode = Mode::Carrying {
                            card_id,
                            origin,
                            target: origin,
                        };
                    }
                }
            }
            KeyCode::Enter => {
                if let Some(card) = self.selected_card() {
                    self.mode = Mode::TaskDetail {
                        task_id: card.id.clone(),
                        cursor: 0,
                    };
                }
            }
            KeyCode::Char('n') => {
                self.mode = Mode::NewTask {
                    input: String::new(),
                };
            }
            KeyCode::Char('r') => {
                self.refresh();
                if matches!(self.mode, Mode::Normal) {
                    self.status_message = Some("Board reloaded".into());
                }
            }
            KeyCode::Char('t') => {
                if self.timer.is_visible() {
                    self.timer.close();
                } else {
                    self.timer.show();
                }
            }
            KeyCode::Char('s') if self.timer.is_visible() => self.timer.toggle(),
            KeyCode::Char('m') if self.timer.is_visible() => {
                let next = self.timer.mode().next();
                self.timer.set_mode(next);
                self.status_message = Some(format!("Timer mode: {next}"));
            }
            KeyCode::Char('0') if self.timer.is_visible() => self.timer.reset(),
            KeyCode::Char('a') if self.timer.is_visible() => self.timer_widget.cycle_anchor(),
            KeyCode::Char('x') if self.timer.is_visible() => self.timer.close(),
            _ => self.board.handle_key(key, self.kanban.board()),
        }
    }

    fn handle_carrying(&mut self, key: KeyEvent, card_id: String, origin: Column, target: Column) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                let idx = target.index().saturating_sub(1);
                self.mode = Mode::Carrying {
                    card_id,
                    origin,
                    target: Column::ALL[idx],
                };
            }
            KeyCode::Char('l') | KeyCode::Right => {
                let idx = (target.index() + 1).min(Column::ALL.len() - 1);
                self.mode = Mode::Carrying {
                    card_id,
                    origin,
                    target: Column::ALL[idx],
                };
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.drop_card(&card_id, Some(target)),
            // Dropped outside any column.
            KeyCode::Esc => self.drop_card(&card_id, None),
            _ => {}
        }
    }

    fn drop_card(&mut self, card_id: &str, target: Option<Column>) {
        let outcome = self
            .service
            .block_on(self.kanban.on_drag_end(card_id, target));
        match outcome {
            DragOutcome::NoOp => self.mode = Mode::Normal,
            DragOutcome::Moved(column) => {
                self.select_card(card_id);
                self.status_message = Some(format!("Moved to {column}"));
                self.mode = Mode::Normal;
            }
            DragOutcome::RolledBack { alert } => {
                self.select_card(card_id);
                self.mode = Mode::Alert { message: alert };
            }
        }
    }

    fn detail_card(&self, task_id: &str) -> Option<&Card> {
        self.kanban.board().card(task_id)
    }

    fn handle_task_detail(&mut self, key: KeyEvent, task_id: String, cursor: usize) {
        let Some(card) = self.detail_card(&task_id) else {
            self.mode = Mode::Normal;
            return;
        };
        let items: Vec<(String, bool)> = card
            .task
            .active_checklist()
            .map(|c| (c.id.clone(), c.is_completed))
            .collect();

        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Char('j') | KeyCode::Down => {
                if cursor + 1 < items.len() {
                    self.mode = Mode::TaskDetail {
                        task_id,
                        cursor: cursor + 1,
                    };
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.mode = Mode::TaskDetail {
                    task_id,
                    cursor: cursor.saturating_sub(1),
                };
            }
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some((item_id, done)) = items.get(cursor) {
                    match self
                        .service
                        .set_checklist_item_completed(&task_id, item_id, !done)
                    {
                        Ok(task) => self.kanban.apply_task(task),
                        Err(e) => self.status_message = Some(format!("Error: {e}")),
                    }
                }
            }
            KeyCode::Char('v') => {
                self.mode = Mode::ReviewScore {
                    task_id,
                    input: String::new(),
                };
            }
            KeyCode::Char('x') => {
                self.mode = Mode::RejectReason {
                    task_id,
                    input: String::new(),
                };
            }
            _ => {}
        }
    }

    fn back_to_detail(&mut self, task_id: String) {
        self.board.select_card_by_id(self.kanban.board(), &task_id);
        self.mode = Mode::TaskDetail { task_id, cursor: 0 };
    }

    fn handle_review_score(&mut self, key: KeyEvent, task_id: String, mut input: String) {
        match key.code {
            KeyCode::Esc => self.back_to_detail(task_id),
            KeyCode::Enter => {
                let owner = self
                    .detail_card(&task_id)
                    .and_then(|c| c.task.owner_id().map(String::from));
                let Some(task_owner_id) = owner else {
                    self.status_message = Some("Error: task has no owner to credit".into());
                    return;
                };
                let Ok(quality_score) = input.trim().parse::<u8>() else {
                    self.status_message = Some("Error: score must be a number from 1 to 10".into());
                    return;
                };
                let review = ReviewTask {
                    task_id: task_id.clone(),
                    task_owner_id,
                    quality_score,
                    notes: String::new(),
                };
                match self.service.review_task(&review) {
                    Ok(task) => {
                        info!("reviewed {task_id} with score {quality_score}");
                        self.kanban.apply_task(task);
                        self.status_message = Some("Review submitted".into());
                        self.back_to_detail(task_id);
                    }
                    Err(e) => {
                        warn!("review of {task_id} failed: {e}");
                        self.status_message = Some(format!("Error: {e}"));
                    }
                }
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::ReviewScore { task_id, input };
            }
            KeyCode::Char(c) if c.is_ascii_digit() && input.len() < 2 => {
                input.push(c);
                self.mode = Mode::ReviewScore { task_id, input };
            }
            _ => {}
        }
    }

    fn handle_reject_reason(&mut self, key: KeyEvent, task_id: String, mut input: String) {
        match key.code {
            KeyCode::Esc => self.back_to_detail(task_id),
            KeyCode::Enter => {
                let reject = RejectTask {
                    task_id: task_id.clone(),
                    reason: input.trim().to_string(),
                    notes: String::new(),
                };
                match self.service.reject_task(&reject) {
                    Ok(task) => {
                        info!("rejected {task_id}");
                        self.kanban.apply_task(task);
                        self.status_message = Some("Task rejected".into());
                        self.back_to_detail(task_id);
                    }
                    Err(e) => {
                        warn!("rejection of {task_id} failed: {e}");
                        self.status_message = Some(format!("Error: {e}"));
                    }
                }
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::RejectReason { task_id, input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::RejectReason { task_id, input };
            }
            _ => {}
        }
    }

    fn handle_new_task(&mut self, key: KeyEvent, mut input: String) {
        match key.code {
            KeyCode::Enter => {
                let create = CreateTask {
                    name: input.clone(),
                    description: String::new(),
                    start_date: Some(Utc::now()),
                    due_date: None,
                    priority: Priority::Medium,
                    assignee_ids: Vec::new(),
                };
                match self.service.create_task(&create) {
                    Ok(task) => {
                        self.mode = Mode::Normal;
                        self.refresh();
                        self.select_card(&task.id);
                        self.status_message = Some("Task created".into());
                    }
                    // Stay in the input so the name can be fixed.
                    Err(e) => self.status_message = Some(format!("Error: {e}")),
                }
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::NewTask { input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::NewTask { input };
            }
            _ => {}
        }
    }

    // -- Rendering --

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        match &self.mode {
            Mode::ErrorPane { message } => self.render_error_pane(frame, message, layout[1]),
            Mode::Carrying {
                card_id, target, ..
            } => self.board.render(
                frame,
                layout[1],
                self.kanban.board(),
                Some(Carry {
                    card_id,
                    target: *target,
                }),
            ),
            _ => self
                .board
                .render(frame, layout[1], self.kanban.board(), None),
        }
        self.render_status_bar(frame, layout[2]);

        if self.timer.is_visible() {
            self.timer_widget.render(frame, layout[1], &self.timer);
        }

        // Overlays
        match &self.mode {
            Mode::Normal | Mode::ErrorPane { .. } | Mode::Carrying { .. } => {}
            Mode::Alert { message } => self.render_alert(frame, message, area),
            Mode::TaskDetail { task_id, cursor } => {
                if let Some(card) = self.detail_card(task_id) {
                    self.render_task_detail(frame, card, *cursor, area)
                }
            }
            Mode::ReviewScore { input, .. } => {
                self.render_input_bar(frame, "Quality score (1-10): ", input, area)
            }
            Mode::RejectReason { input, .. } => {
                self.render_input_bar(frame, "Rejection reason: ", input, area)
            }
            Mode::NewTask { input } => self.render_input_bar(frame, "New task: ", input, area),
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" workpulse ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(
                format!("{} tasks", self.kanban.board().len()),
                Style::default().fg(Color::Yellow),
            ),
        ];
        if !self.timer.is_visible() && self.timer.is_running() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("⏱ {}", self.timer.display()),
                Style::default().fg(Color::Magenta),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let color = if msg.starts_with("Error") {
                Color::Red
            } else {
                Color::Green
            };
            let line = Line::from(Span::styled(format!(" {msg}"), Style::default().fg(color)));
            frame.render_widget(line, area);
            return;
        }

        let hints: Vec<(&str, &str)> = match &self.mode {
            Mode::Normal if self.timer.is_visible() => vec![
                ("q", "quit"),
                ("space", "pick up"),
                ("s", "start/pause"),
                ("m", "mode"),
                ("0", "reset"),
                ("a", "move timer"),
                ("x", "close timer"),
            ],
            Mode::Normal => vec![
                ("q", "quit"),
                ("h/l", "cols"),
                ("j/k", "cards"),
                ("space", "pick up"),
                ("enter", "open"),
                ("n", "new"),
                ("r", "reload"),
                ("t", "timer"),
            ],
            Mode::ErrorPane { .. } => vec![("r", "try again"), ("q", "quit")],
            Mode::Carrying { .. } => vec![("h/l", "choose column"), ("enter", "drop"), ("esc", "cancel")],
            Mode::Alert { .. } => vec![("enter", "dismiss")],
            Mode::TaskDetail { .. } => vec![
                ("j/k", "checklist"),
                ("space", "toggle"),
                ("v", "review"),
                ("x", "reject"),
                ("esc", "back"),
            ],
            Mode::ReviewScore { .. } | Mode::RejectReason { .. } | Mode::NewTask { .. } => {
                vec![("enter", "submit"), ("esc", "cancel")]
            }
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                [
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_error_pane(&self, frame: &mut Frame, message: &str, area: Rect) {
        let block = Block::default()
            .title(" Could not load tasks ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Red))),
            Line::from(""),
            Line::from(vec![
                Span::raw("Press "),
                Span::styled("r", Style::default().fg(Color::Yellow).bold()),
                Span::raw(" to try again"),
            ]),
        ];
        let body = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(body, area);
    }

    fn render_alert(&self, frame: &mut Frame, message: &str, area: Rect) {
        let popup = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(" Move failed ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red).bold());
        let lines = vec![
            Line::from(message),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to dismiss",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let body = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
        frame.render_widget(body, popup);
    }

    fn render_input_bar(&self, frame: &mut Frame, label: &str, input: &str, area: Rect) {
        let input_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(3),
            width: area.width,
            height: 3.min(area.height),
        };
        frame.render_widget(Clear, input_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(label);
        let paragraph = Paragraph::new(input).block(block);
        frame.render_widget(paragraph, input_area);
    }

    fn render_task_detail(&self, frame: &mut Frame, card: &Card, cursor: usize, area: Rect) {
        let popup = centered_rect(60, 70, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Task Detail ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let task = &card.task;
        let fmt_date = |d: Option<chrono::DateTime<Utc>>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".into())
        };
        let assignees: Vec<&str> = task.assignees.iter().map(|u| u.name.as_str()).collect();

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Name: ", Style::default().bold()),
                Span::raw(task.name.as_str()),
            ]),
            Line::from(vec![
                Span::styled("Status: ", Style::default().bold()),
                Span::raw(task.status.display_name()),
                Span::styled("  Priority: ", Style::default().bold()),
                Span::raw(task.priority.display_name()),
            ]),
            Line::from(vec![
                Span::styled("Dates: ", Style::default().bold()),
                Span::raw(format!(
                    "{} → {}",
                    fmt_date(task.start_date),
                    fmt_date(task.due_date)
                )),
            ]),
            Line::from(vec![
                Span::styled("Assignees: ", Style::default().bold()),
                Span::raw(if assignees.is_empty() {
                    "(none)".to_string()
                } else {
                    assignees.join(", ")
                }),
            ]),
        ];
        if !task.description.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(task.description.as_str()));
        }

        let (done, total) = card.checklist;
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Checklist {done}/{total}"),
            Style::default().bold(),
        )));
        for (i, item) in task.active_checklist().enumerate() {
            let mark = if item.is_completed { "[x]" } else { "[ ]" };
            let style = if i == cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("  {mark} {}", item.title),
                style,
            )));
        }

        let contents: Vec<_> = task.active_contents().collect();
        if !contents.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Comments ({})", contents.len()),
                Style::default().bold(),
            )));
            for c in contents {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}: ", c.user.name), Style::default().fg(Color::Yellow)),
                    Span::raw(c.content.as_str()),
                ]));
            }
        }
        lines.push(Line::from(Span::styled(
            format!("Files: {}", task.file_count),
            Style::default().fg(Color::DarkGray),
        )));

        let body = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(body, inner);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
