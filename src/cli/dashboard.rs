use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tracing::{info, warn};

use crate::browser::{BrowseAction, TransactionBrowser};
use crate::cards::{CardContext, CardKind, DashboardVariant};
use crate::chat_bar::ChatBar;
use crate::error::Result;
use crate::fmt::{money, percent_change};
use crate::mock::periods::{generate_periods, period_to_date, PeriodComparison, DEFAULT_MONTHS};
use crate::models::{FinancialPeriod, Granularity};
use crate::settings::{save_settings, Settings};
use crate::store::TransactionStore;
use crate::tui::{run_app, App, FOOTER_STYLE, HEADER_STYLE};

const TICK_RATE: Duration = Duration::from_millis(60);
/// Ticks between two cards appearing during the intro.
const REVEAL_EVERY: u8 = 3;
const STAT_ROW_HEIGHT: u16 = 5;

/// Lives for one process run. The intro plays only while `has_animated` is false.
#[derive(Debug, Default)]
pub struct SessionState {
    pub has_animated: bool,
}

enum DashboardScreen {
    Home,
    Browse(TransactionBrowser),
}

/// Stagger-reveal of the current variant's cards.
struct Intro {
    revealed: usize,
    countdown: u8,
}

pub struct Dashboard {
    screen: DashboardScreen,
    store: TransactionStore,
    monthly: Vec<FinancialPeriod>,
    comparison: Option<PeriodComparison>,
    chat: ChatBar,
    settings: Settings,
    persist_settings: bool,
    intro: Option<Intro>,
    today: NaiveDate,
    status_message: Option<String>,
}

impl Dashboard {
    pub fn new(
        store: TransactionStore,
        today: NaiveDate,
        settings: Settings,
        session: &mut SessionState,
    ) -> Self {
        let monthly = generate_periods(Granularity::Monthly, today, DEFAULT_MONTHS);
        let comparison = period_to_date(&monthly, today);
        let intro = if session.has_animated {
            None
        } else {
            session.has_animated = true;
            Some(Intro {
                revealed: 0,
                countdown: REVEAL_EVERY,
            })
        };
        Self {
            screen: DashboardScreen::Home,
            store,
            monthly,
            comparison,
            chat: ChatBar::new(),
            settings,
            persist_settings: false,
            intro,
            today,
            status_message: None,
        }
    }

    /// Write variant changes back to the settings file.
    pub fn persist_settings(mut self, persist: bool) -> Self {
        self.persist_settings = persist;
        self
    }

    pub fn variant(&self) -> DashboardVariant {
        self.settings.dashboard_variant
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    fn revealed(&self) -> usize {
        match &self.intro {
            Some(intro) => intro.revealed,
            None => usize::MAX,
        }
    }

    fn cycle_variant(&mut self) {
        let next = self.settings.dashboard_variant.next();
        self.settings.dashboard_variant = next;
        info!(variant = %next, "dashboard variant changed");
        if self.persist_settings {
            if let Err(e) = save_settings(&self.settings) {
                warn!(error = %e, "could not save settings");
                self.status_message = Some(format!("Could not save settings: {e}"));
                return;
            }
        }
        self.status_message = Some(format!("Layout: {next}"));
    }

    fn draw_home(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);
        let cards = self.variant().cards();
        let has_stats = cards.iter().any(|c| c.is_stat());

        let [header_area, sep, stats_area, panels_area, chat_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(if has_stats { STAT_ROW_HEIGHT } else { 0 }),
            Constraint::Fill(1),
            Constraint::Length(self.chat.display_height()),
            Constraint::Length(1),
        ])
        .areas(area);

        let mut header = vec![Span::styled(
            format!(" bips · {} · {}", self.variant(), self.today.format("%B %-d, %Y")),
            HEADER_STYLE,
        )];
        if let Some(cmp) = &self.comparison {
            if let Some(pct) = cmp.revenue_change_pct() {
                header.push(Span::styled(
                    format!(
                        "   {} month to date {} ({} vs {})",
                        cmp.current_label,
                        money(cmp.revenue),
                        percent_change(pct),
                        cmp.previous_label
                    ),
                    FOOTER_STYLE,
                ));
            }
        }
        frame.render_widget(Paragraph::new(Line::from(header)), header_area);

        let sep_line = "━".repeat(area.width as usize);
        frame.render_widget(Paragraph::new(sep_line.as_str()).style(border_style), sep);

        let ctx = CardContext {
            store: &self.store,
            monthly: &self.monthly,
            comparison: self.comparison.as_ref(),
        };
        let revealed = self.revealed();
        let (stats, panels): (Vec<(usize, CardKind)>, Vec<(usize, CardKind)>) =
            cards.iter().copied().enumerate().partition(|(_, c)| c.is_stat());
        render_card_row(frame, stats_area, &stats, revealed, &ctx);
        render_card_row(frame, panels_area, &panels, revealed, &ctx);

        self.chat.render(frame, chat_area);

        let hints = match &self.status_message {
            Some(msg) => {
                Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow))
            }
            None => {
                Paragraph::new(" b/Enter=browse  v=layout  Tab=ask  q=quit").style(FOOTER_STYLE)
            }
        };
        frame.render_widget(hints, hints_area);
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> bool {
        self.status_message = None;
        if self.intro.take().is_some() {
            // Any key finishes the intro.
            return false;
        }
        if self.chat.is_active() {
            self.chat.handle_key(key, &self.store, &self.monthly);
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.chat.focus(),
            KeyCode::Char('v') => self.cycle_variant(),
            KeyCode::Char('b') | KeyCode::Enter => {
                self.screen = DashboardScreen::Browse(TransactionBrowser::new());
            }
            _ => {}
        }
        false
    }
}

fn render_card_row(
    frame: &mut Frame,
    area: Rect,
    cards: &[(usize, CardKind)],
    revealed: usize,
    ctx: &CardContext,
) {
    if cards.is_empty() || area.height == 0 {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, cards.len() as u32); cards.len()];
    let areas = Layout::horizontal(constraints).split(area);
    for ((order, card), card_area) in cards.iter().zip(areas.iter()) {
        if *order < revealed {
            card.render(frame, *card_area, ctx);
        } else {
            card.render_placeholder(frame, *card_area);
        }
    }
}

impl App for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        if let DashboardScreen::Browse(ref mut browser) = self.screen {
            browser.draw_frame(frame, &self.store);
            return;
        }
        self.draw_home(frame);
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match &mut self.screen {
            DashboardScreen::Home => self.handle_home_key(key),
            DashboardScreen::Browse(browser) => {
                if let BrowseAction::Close = browser.handle_key_event(key, &mut self.store) {
                    self.screen = DashboardScreen::Home;
                }
                false
            }
        }
    }

    fn tick(&mut self) {
        self.chat.tick();
        let total = self.variant().cards().len();
        if let Some(intro) = &mut self.intro {
            intro.countdown = intro.countdown.saturating_sub(1);
            if intro.countdown == 0 {
                intro.revealed += 1;
                intro.countdown = REVEAL_EVERY;
            }
            if intro.revealed >= total {
                self.intro = None;
            }
        }
    }
}

pub fn run(mut dashboard: Dashboard) -> Result<()> {
    info!(
        transactions = dashboard.store().transactions().len(),
        variant = %dashboard.variant(),
        "starting dashboard"
    );
    run_app(&mut dashboard, TICK_RATE)
}
