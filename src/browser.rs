use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::catalog::UNCATEGORIZED_ID;
use crate::fmt::money;
use crate::models::{Category, TransactionStatus};
use crate::sorting::SortField;
use crate::store::TransactionStore;
use crate::tui::{self, FOOTER_STYLE, HEADER_STYLE, HIDDEN_STYLE, MARKED_STYLE, SELECTED_STYLE};

const PICKER_ROWS: usize = 9;
const NORMAL_KEYS: &str = concat!(
    "space:mark  V:range  a:all  c:category  D:delete  h:hide  n:notes  /:search  ",
    "s:status  A:account  u:uncat  r:reset  1-4:sort  q:quit",
);

enum BrowseMode {
    Normal,
    Search(String),
    PickCategory { query: String, selection: usize },
    ConfirmDelete,
    EditNotes { id: String, input: String },
}

pub enum BrowseAction {
    Continue,
    Close,
}

/// Scrolling table over the store's view. Holds only cursor and input state;
/// every data change goes through the [`TransactionStore`] passed in.
pub struct TransactionBrowser {
    cursor: usize,
    visible_count: usize,
    mode: BrowseMode,
    status_message: Option<String>,
    table_state: TableState,
}

impl Default for TransactionBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBrowser {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            visible_count: 20,
            mode: BrowseMode::Normal,
            status_message: None,
            table_state: TableState::default(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn clamp_cursor(&mut self, store: &TransactionStore) {
        self.cursor = self.cursor.min(store.view_len().saturating_sub(1));
    }

    fn move_cursor(&mut self, store: &TransactionStore, delta: isize) {
        let last = store.view_len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// Draw the browser into the given frame. Callable from an external event loop.
    pub fn draw_frame(&mut self, frame: &mut Frame, store: &TransactionStore) {
        let area = frame.area();
        let narrow = area.width < 110;

        let panel_height: u16 = match &self.mode {
            BrowseMode::PickCategory { .. } => {
                1 + self.category_matches(store).len().clamp(1, PICKER_ROWS) as u16
            }
            BrowseMode::EditNotes { .. } | BrowseMode::ConfirmDelete => 1,
            _ => 0,
        };

        let [title_area, table_area, panel_area, status_area, keys_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(panel_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let filters = store.filter().describe();
        let title = if filters.is_empty() {
            "Transactions".to_string()
        } else {
            format!("Transactions ({filters})")
        };
        frame.render_widget(Paragraph::new(title).style(HEADER_STYLE), title_area);

        let catalog = store.catalog();
        let selection = store.selection();
        let sort = store.sort();
        let header_label = |field: SortField| {
            if sort.field == field {
                format!("{} {}", field.label(), sort.direction.arrow())
            } else {
                field.label().to_string()
            }
        };

        let rows: Vec<Row> = store
            .view()
            .into_iter()
            .map(|t| {
                let marked = selection.contains(&t.id);
                let marker = Cell::from(if marked { "●" } else { "○" }).style(if marked {
                    MARKED_STYLE
                } else {
                    FOOTER_STYLE
                });
                let category = catalog.lookup_category(t.category_id.as_deref());
                let merchant = if t.notes.is_empty() {
                    t.merchant.clone()
                } else {
                    format!("{} ✎", t.merchant)
                };
                let amount = if t.is_hidden {
                    Cell::from(Span::styled(money(t.amount), HIDDEN_STYLE))
                } else {
                    Cell::from(tui::money_span(t.amount))
                };
                let status = match t.status {
                    TransactionStatus::Pending => Cell::from(Span::styled(
                        "pending",
                        Style::default().fg(Color::Yellow),
                    )),
                    TransactionStatus::Posted => Cell::from(""),
                };

                let mut cells = vec![
                    marker,
                    Cell::from(t.date.format("%Y-%m-%d").to_string()),
                    Cell::from(merchant),
                    Cell::from(category.name.clone()),
                ];
                if !narrow {
                    cells.push(Cell::from(catalog.account_name(&t.account_id).to_string()));
                    cells.push(status);
                }
                cells.push(amount);

                let row = Row::new(cells);
                if t.is_hidden {
                    row.style(HIDDEN_STYLE)
                } else {
                    row
                }
            })
            .collect();

        let mut widths = vec![
            Constraint::Length(2),
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Length(24),
        ];
        let mut headers = vec![
            String::new(),
            header_label(SortField::Date),
            header_label(SortField::Merchant),
            header_label(SortField::Category),
        ];
        if !narrow {
            widths.push(Constraint::Length(20));
            widths.push(Constraint::Length(8));
            headers.push("Account".to_string());
            headers.push("Status".to_string());
        }
        widths.push(Constraint::Length(12));
        headers.push(header_label(SortField::Amount));

        self.visible_count = (table_area.height.saturating_sub(2) as usize).max(1);
        self.clamp_cursor(store);
        self.table_state
            .select(if store.view_len() == 0 { None } else { Some(self.cursor) });

        let table = Table::new(rows, widths)
            .header(Row::new(headers).style(HEADER_STYLE).bottom_margin(1))
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);
        frame.render_stateful_widget(table, table_area, &mut self.table_state);

        if panel_height > 0 {
            let lines: Vec<Line> = match &self.mode {
                BrowseMode::PickCategory { query, selection: sel } => {
                    let matches = self.category_matches(store);
                    let mut lines = vec![Line::from(format!(
                        "  Category for {} row(s): {query}\u{2588}",
                        store.selection().len()
                    ))];
                    if matches.is_empty() {
                        lines.push(Line::from(Span::styled("    (no matches)", FOOTER_STYLE)));
                    }
                    for (i, cat) in matches.iter().enumerate() {
                        let marker = if i == *sel { ">" } else { " " };
                        lines.push(Line::from(format!("  {marker} {} {}", cat.emoji, cat.name)));
                    }
                    lines
                }
                BrowseMode::ConfirmDelete => vec![Line::from(Span::styled(
                    format!("  Delete {} selected transaction(s)? (y/n)", store.selection().len()),
                    Style::default().fg(Color::Red),
                ))],
                BrowseMode::EditNotes { input, .. } => {
                    vec![Line::from(format!("  Notes: {input}\u{2588}"))]
                }
                _ => vec![],
            };
            frame.render_widget(Paragraph::new(lines), panel_area);
        }

        let totals = store.totals();
        let mut status = format!(
            "Row {} of {} | Selected {} | In {} Out {} Net {}",
            if store.view_len() == 0 { 0 } else { self.cursor + 1 },
            store.view_len(),
            store.selection().len(),
            money(totals.income),
            money(totals.expenses.abs()),
            money(totals.net),
        );
        if let Some(ref msg) = self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), status_area);

        let keys_widget = match &self.mode {
            BrowseMode::Normal => Paragraph::new(NORMAL_KEYS).style(FOOTER_STYLE),
            BrowseMode::Search(input) => Paragraph::new(format!("Search: {input}\u{2588}")),
            BrowseMode::PickCategory { .. } => {
                Paragraph::new("Type to filter, Enter=apply, Esc=cancel").style(FOOTER_STYLE)
            }
            BrowseMode::ConfirmDelete => {
                Paragraph::new("y=delete, any other key=cancel").style(FOOTER_STYLE)
            }
            BrowseMode::EditNotes { .. } => {
                Paragraph::new("Enter=save, Esc=cancel").style(FOOTER_STYLE)
            }
        };
        frame.render_widget(keys_widget, keys_area);
    }

    /// Handle a key event against `store`.
    pub fn handle_key_event(
        &mut self,
        key: KeyEvent,
        store: &mut TransactionStore,
    ) -> BrowseAction {
        self.status_message = None;

        match &self.mode {
            BrowseMode::Normal => return self.handle_normal_key(key, store),
            BrowseMode::Search(_) => self.handle_search_key(key.code, store),
            BrowseMode::PickCategory { .. } => self.handle_pick_category_key(key.code, store),
            BrowseMode::ConfirmDelete => {
                self.mode = BrowseMode::Normal;
                if key.code == KeyCode::Char('y') {
                    let n = store.bulk_delete();
                    self.status_message = Some(format!("Deleted {n} transaction(s)"));
                    self.clamp_cursor(store);
                } else {
                    self.status_message = Some("Delete cancelled".to_string());
                }
            }
            BrowseMode::EditNotes { .. } => self.handle_notes_key(key.code, store),
        }
        BrowseAction::Continue
    }

    fn handle_normal_key(&mut self, key: KeyEvent, store: &mut TransactionStore) -> BrowseAction {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') => return BrowseAction::Close,
            KeyCode::Esc => {
                if store.selection().is_empty() {
                    return BrowseAction::Close;
                }
                store.clear_selection();
            }
            KeyCode::Down | KeyCode::Up if shift => {
                if store.view_len() == 0 {
                    return BrowseAction::Continue;
                }
                if store.selection().last_index().is_none() {
                    store.toggle_selection(self.cursor, false);
                }
                let delta = if key.code == KeyCode::Down { 1 } else { -1 };
                self.move_cursor(store, delta);
                store.toggle_selection(self.cursor, true);
            }
            KeyCode::Down => self.move_cursor(store, 1),
            KeyCode::Up => self.move_cursor(store, -1),
            KeyCode::PageDown => self.move_cursor(store, self.visible_count as isize),
            KeyCode::PageUp => self.move_cursor(store, -(self.visible_count as isize)),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = store.view_len().saturating_sub(1),
            KeyCode::Char(' ') => {
                if store.view_len() > 0 {
                    store.toggle_selection(self.cursor, shift);
                }
            }
            KeyCode::Char('V') => {
                if store.view_len() > 0 {
                    store.toggle_selection(self.cursor, true);
                }
            }
            KeyCode::Char('a') => {
                if store.all_selected() {
                    store.clear_selection();
                } else {
                    store.select_all();
                }
            }
            KeyCode::Char('c') => {
                if store.selection().is_empty() {
                    self.status_message = Some("Mark rows with space first".to_string());
                } else {
                    self.mode = BrowseMode::PickCategory {
                        query: String::new(),
                        selection: 0,
                    };
                }
            }
            KeyCode::Char('D') => {
                if store.selection().is_empty() {
                    self.status_message = Some("Mark rows with space first".to_string());
                } else {
                    self.mode = BrowseMode::ConfirmDelete;
                }
            }
            KeyCode::Char('h') => {
                if let Some(id) = store.view_row(self.cursor).map(|t| t.id.clone()) {
                    if let Some(hidden) = store.toggle_hidden(&id) {
                        let label = if hidden { "hidden" } else { "unhidden" };
                        self.status_message = Some(format!("{id} {label}"));
                    }
                }
            }
            KeyCode::Char('n') => {
                if let Some(t) = store.view_row(self.cursor) {
                    self.mode = BrowseMode::EditNotes {
                        id: t.id.clone(),
                        input: t.notes.clone(),
                    };
                }
            }
            KeyCode::Char('/') => {
                self.mode = BrowseMode::Search(store.filter().search.clone());
            }
            KeyCode::Char('s') => {
                let next = match store.filter().statuses.iter().next() {
                    None => Some(TransactionStatus::Posted),
                    Some(TransactionStatus::Posted) => Some(TransactionStatus::Pending),
                    Some(TransactionStatus::Pending) => None,
                };
                store.update_filter(|f| f.statuses = next.into_iter().collect());
                self.cursor = 0;
            }
            KeyCode::Char('A') => {
                let ids: Vec<String> = store
                    .catalog()
                    .accounts()
                    .iter()
                    .map(|a| a.id.clone())
                    .collect();
                let current = store.filter().accounts.iter().next().cloned();
                let next = match current {
                    None => ids.first().cloned(),
                    Some(cur) => ids
                        .iter()
                        .position(|id| *id == cur)
                        .and_then(|i| ids.get(i + 1))
                        .cloned(),
                };
                store.update_filter(|f| f.accounts = next.into_iter().collect());
                self.cursor = 0;
            }
            KeyCode::Char('u') => {
                let only_uncategorized = store.filter().categories.len() == 1
                    && store.filter().categories.contains(UNCATEGORIZED_ID);
                store.update_filter(|f| {
                    f.categories.clear();
                    if !only_uncategorized {
                        f.categories.insert(UNCATEGORIZED_ID.to_string());
                    }
                });
                self.cursor = 0;
            }
            KeyCode::Char('r') => {
                store.reset_filters();
                self.cursor = 0;
                self.status_message = Some("Filters cleared".to_string());
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as usize) - ('1' as usize);
                store.sort_by(SortField::ALL[idx]);
                self.cursor = 0;
            }
            _ => {}
        }
        BrowseAction::Continue
    }

    fn handle_search_key(&mut self, code: KeyCode, store: &mut TransactionStore) {
        let BrowseMode::Search(input) = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Enter => self.mode = BrowseMode::Normal,
            KeyCode::Esc => {
                self.mode = BrowseMode::Normal;
                store.update_filter(|f| f.search.clear());
            }
            KeyCode::Backspace => {
                input.pop();
                let search = input.clone();
                store.update_filter(|f| f.search = search);
            }
            KeyCode::Char(c) => {
                input.push(c);
                let search = input.clone();
                store.update_filter(|f| f.search = search);
            }
            _ => {}
        }
        self.cursor = 0;
    }

    /// Pickable categories whose name contains the typed query.
    fn category_matches<'a>(&self, store: &'a TransactionStore) -> Vec<&'a Category> {
        let query = match &self.mode {
            BrowseMode::PickCategory { query, .. } => query.to_lowercase(),
            _ => return vec![],
        };
        store
            .catalog()
            .pickable_categories()
            .into_iter()
            .filter(|c| query.is_empty() || c.name.to_lowercase().contains(&query))
            .take(PICKER_ROWS)
            .collect()
    }

    fn handle_pick_category_key(&mut self, code: KeyCode, store: &mut TransactionStore) {
        match code {
            KeyCode::Char(c) => {
                if let BrowseMode::PickCategory { query, selection } = &mut self.mode {
                    query.push(c);
                    *selection = 0;
                }
            }
            KeyCode::Backspace => {
                if let BrowseMode::PickCategory { query, selection } = &mut self.mode {
                    query.pop();
                    *selection = 0;
                }
            }
            KeyCode::Up => {
                if let BrowseMode::PickCategory { selection, .. } = &mut self.mode {
                    *selection = selection.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                // Count first; the matches borrow the store, not the mode
                let count = self.category_matches(store).len();
                if let BrowseMode::PickCategory { selection, .. } = &mut self.mode {
                    if *selection + 1 < count {
                        *selection += 1;
                    }
                }
            }
            KeyCode::Enter => {
                let sel = match &self.mode {
                    BrowseMode::PickCategory { selection, .. } => *selection,
                    _ => 0,
                };
                let picked = self
                    .category_matches(store)
                    .get(sel)
                    .map(|c| (c.id.clone(), c.name.clone()));
                if let Some((id, name)) = picked {
                    let n = store.bulk_set_category(&id);
                    self.status_message = Some(format!("Set {n} transaction(s) to {name}"));
                    self.mode = BrowseMode::Normal;
                    self.clamp_cursor(store);
                }
            }
            KeyCode::Esc => self.mode = BrowseMode::Normal,
            _ => {}
        }
    }

    fn handle_notes_key(&mut self, code: KeyCode, store: &mut TransactionStore) {
        let BrowseMode::EditNotes { id, input } = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                if store.set_notes(id, input.trim()) {
                    self.status_message = Some(format!("Saved notes on {id}"));
                }
                self.mode = BrowseMode::Normal;
            }
            KeyCode::Esc => self.mode = BrowseMode::Normal,
            _ => {}
        }
    }
}
