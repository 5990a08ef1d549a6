use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::Frame;

use crate::error::Result;
use crate::fmt::money;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_POS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_NEG_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Rows the user has hidden stay visible but recede.
pub const HIDDEN_STYLE: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::ITALIC);

pub const MARKED_STYLE: Style = Style::new().fg(Color::Cyan);

/// Format an amount as a colored Span (green for income, red for expense).
/// Shows the absolute value; color carries the sign.
pub fn money_span(amount: f64) -> Span<'static> {
    let style = if amount < 0.0 {
        AMOUNT_NEG_STYLE
    } else {
        AMOUNT_POS_STYLE
    };
    Span::styled(money(amount.abs()), style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

/// A full-screen view driven by [`run_app`].
pub trait App {
    fn draw(&mut self, frame: &mut Frame);
    /// Returns true when the app wants to exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool;
    /// Called roughly every tick when no key arrived.
    fn tick(&mut self) {}
}

/// Run an interactive ratatui app. Sets up the terminal, event loop, and
/// panic hook, then restores the terminal on exit. Ctrl-C always quits.
pub fn run_app(app: &mut dyn App, tick_rate: Duration) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();
    let mut last_tick = Instant::now();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        match event::poll(timeout) {
            Err(e) => break Err(e.into()),
            Ok(false) => {}
            Ok(true) => match event::read() {
                Err(e) => break Err(e.into()),
                Ok(Event::Key(key)) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        break Ok(());
                    }
                    if app.handle_key(key) {
                        break Ok(());
                    }
                }
                Ok(_) => {}
            },
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_span_uses_sign_for_color() {
        let neg = money_span(-12.5);
        assert_eq!(neg.content, "$12.50");
        assert_eq!(neg.style, AMOUNT_NEG_STYLE);
        let pos = money_span(3.0);
        assert_eq!(pos.style, AMOUNT_POS_STYLE);
    }

    #[test]
    fn test_wrap_text_counts_lines() {
        let (wrapped, lines) = wrap_text("one two three four", 9);
        assert_eq!(lines, 3);
        assert_eq!(wrapped, "one two\nthree\nfour");
        assert!(wrapped.contains('\n'));
        assert_eq!(wrap_text("abc", 0).1, 1);
    }
}
