//! The assistant bar along the bottom of the dashboard. It is cosmetic: the
//! replies are canned text built from the mock data, and nothing it does
//! blocks or changes the books.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::fmt::{money, percent_change};
use crate::models::{FinancialPeriod, TransactionStatus};
use crate::store::TransactionStore;
use crate::tui::{wrap_text, FOOTER_STYLE, HEADER_STYLE};

pub const COLLAPSED_HEIGHT: u16 = 3;
pub const MIN_EXPANDED_HEIGHT: u16 = 6;
pub const MAX_EXPANDED_HEIGHT: u16 = 20;
const DEFAULT_EXPANDED_HEIGHT: u16 = 10;
/// Share of the remaining distance covered per tick.
const EASING: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Collapsed,
    Focused,
    Expanded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

pub struct ChatBar {
    state: ChatState,
    input: String,
    messages: Vec<ChatMessage>,
    expanded_height: u16,
    height: f64,
}

impl Default for ChatBar {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatBar {
    pub fn new() -> Self {
        Self {
            state: ChatState::Collapsed,
            input: String::new(),
            messages: Vec::new(),
            expanded_height: DEFAULT_EXPANDED_HEIGHT,
            height: COLLAPSED_HEIGHT as f64,
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_active(&self) -> bool {
        self.state != ChatState::Collapsed
    }

    pub fn focus(&mut self) {
        if self.state == ChatState::Collapsed {
            self.state = if self.messages.is_empty() {
                ChatState::Focused
            } else {
                ChatState::Expanded
            };
        }
    }

    /// Collapse. Typed input and history are kept for the next focus.
    pub fn blur(&mut self) {
        self.state = ChatState::Collapsed;
    }

    pub fn push_char(&mut self, c: char) {
        self.focus();
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Send the typed text and append a canned reply. Blank input does nothing.
    pub fn submit(&mut self, store: &TransactionStore, monthly: &[FinancialPeriod]) -> bool {
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return false;
        }
        let reply = canned_reply(&query, store, monthly);
        self.messages.push(ChatMessage { role: Role::User, text: query });
        self.messages.push(ChatMessage { role: Role::Assistant, text: reply });
        self.input.clear();
        self.state = ChatState::Expanded;
        true
    }

    /// Grow or shrink the expanded panel, clamped to its bounds.
    pub fn resize(&mut self, delta: i32) {
        let h = self.expanded_height as i32 + delta;
        self.expanded_height =
            h.clamp(MIN_EXPANDED_HEIGHT as i32, MAX_EXPANDED_HEIGHT as i32) as u16;
    }

    pub fn target_height(&self) -> u16 {
        match self.state {
            ChatState::Collapsed | ChatState::Focused => COLLAPSED_HEIGHT,
            ChatState::Expanded => self.expanded_height,
        }
    }

    /// Ease the drawn height toward the target.
    pub fn tick(&mut self) {
        let target = self.target_height() as f64;
        let diff = target - self.height;
        if diff.abs() < 0.5 {
            self.height = target;
        } else {
            self.height += diff * EASING;
        }
    }

    pub fn display_height(&self) -> u16 {
        (self.height.round() as u16).clamp(COLLAPSED_HEIGHT, MAX_EXPANDED_HEIGHT)
    }

    /// Keys while the bar is active. Returns false for keys it ignores.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        store: &TransactionStore,
        monthly: &[FinancialPeriod],
    ) -> bool {
        match key.code {
            KeyCode::Esc => self.blur(),
            KeyCode::Enter => {
                self.submit(store, monthly);
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::PageUp => self.resize(2),
            KeyCode::PageDown => self.resize(-2),
            KeyCode::Char(c) => self.push_char(c),
            _ => return false,
        }
        true
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let border_color = if self.is_active() { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .title(" Ask bips ")
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let width = inner.width.saturating_sub(2) as usize;
        let history_rows = inner.height.saturating_sub(1) as usize;
        let mut lines: Vec<Line> = Vec::new();
        if history_rows > 0 {
            for msg in &self.messages {
                let (prefix, style) = match msg.role {
                    Role::User => ("you: ", HEADER_STYLE),
                    Role::Assistant => ("bips: ", Style::default()),
                };
                let (wrapped, _) = wrap_text(&format!("{prefix}{}", msg.text), width);
                for l in wrapped.lines() {
                    lines.push(Line::from(Span::styled(format!(" {l}"), style)));
                }
            }
            let skip = lines.len().saturating_sub(history_rows);
            lines.drain(..skip);
            while lines.len() < history_rows {
                lines.insert(0, Line::from(""));
            }
        }

        let input_line = match self.state {
            ChatState::Collapsed if self.input.is_empty() => Line::from(Span::styled(
                " Tab to ask about revenue, costs, cash...",
                FOOTER_STYLE,
            )),
            ChatState::Collapsed => {
                Line::from(Span::styled(format!(" > {}", self.input), FOOTER_STYLE))
            }
            _ => Line::from(vec![
                Span::raw(format!(" > {}", self.input)),
                Span::styled("▏", Style::default().fg(Color::Cyan)),
            ]),
        };
        lines.push(input_line);
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Keyword-matched answer built from the mock data.
pub fn canned_reply(query: &str, store: &TransactionStore, monthly: &[FinancialPeriod]) -> String {
    let q = query.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| q.contains(w));
    let latest = monthly.last();

    if has(&["loss", "worst", "bad month"]) {
        return match monthly.iter().find(|p| p.is_loss()) {
            Some(p) => format!(
                "{} was the rough one: costs of {} against revenue of {}, a net loss of {}.",
                p.label,
                money(p.costs),
                money(p.revenue),
                money(p.net_income.abs())
            ),
            None => "No loss-making months in this window.".to_string(),
        };
    }
    if has(&["revenue", "income", "sales", "earn"]) {
        return match (latest, monthly.len()) {
            (Some(cur), n) if n >= 2 => {
                let prev = &monthly[n - 2];
                let change = if prev.revenue == 0.0 {
                    String::new()
                } else {
                    let pct = (cur.revenue - prev.revenue) / prev.revenue * 100.0;
                    format!(" ({} vs {})", percent_change(pct), prev.label)
                };
                format!("Revenue for {} is {}{change}.", cur.label, money(cur.revenue))
            }
            (Some(cur), _) => format!("Revenue for {} is {}.", cur.label, money(cur.revenue)),
            (None, _) => "I don't have any revenue figures yet.".to_string(),
        };
    }
    if has(&["cash", "balance", "bank"]) {
        return match latest {
            Some(cur) => format!(
                "Cash on hand at the end of {} is {}.",
                cur.label,
                money(cur.cash_on_hand)
            ),
            None => "I don't have a cash figure yet.".to_string(),
        };
    }
    if has(&["cost", "expense", "spend", "spent"]) {
        let top = crate::cards::top_categories(store, 1);
        return match (latest, top.first()) {
            (Some(cur), Some((name, total))) => format!(
                "Costs for {} are {}. Your biggest spend lately is {name} at {}.",
                cur.label,
                money(cur.costs),
                money(*total)
            ),
            (Some(cur), None) => format!("Costs for {} are {}.", cur.label, money(cur.costs)),
            _ => "I don't have any cost figures yet.".to_string(),
        };
    }
    if has(&["uncategor", "categor"]) {
        let n = store
            .transactions()
            .iter()
            .filter(|t| !t.is_deleted && t.category_id.is_none())
            .count();
        return format!(
            "{n} transaction(s) are uncategorized. Press b to browse and c to assign a category."
        );
    }
    if has(&["pending"]) {
        let n = store
            .transactions()
            .iter()
            .filter(|t| !t.is_deleted && t.status == TransactionStatus::Pending)
            .count();
        return format!("{n} transaction(s) are still pending.");
    }
    "I can tell you about revenue, costs, cash, losses, and uncategorized or pending transactions."
        .to_string()
}
