use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use tracing::info;

use super::{FilterArgs, RunContext, SortArgs};
use crate::browser::{BrowseAction, TransactionBrowser};
use crate::error::Result;
use crate::store::TransactionStore;
use crate::tui::{run_app, App};

/// The browser on its own: closing it ends the program.
struct BrowseApp {
    store: TransactionStore,
    browser: TransactionBrowser,
}

impl App for BrowseApp {
    fn draw(&mut self, frame: &mut Frame) {
        self.browser.draw_frame(frame, &self.store);
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        matches!(
            self.browser.handle_key_event(key, &mut self.store),
            BrowseAction::Close
        )
    }
}

pub fn run(ctx: &RunContext, filters: &FilterArgs, sort: &SortArgs) -> Result<()> {
    let store = ctx.filtered_store(filters, sort)?;
    if store.view_len() == 0 {
        println!("No transactions match.");
        return Ok(());
    }
    info!(rows = store.view_len(), "starting browser");
    let mut app = BrowseApp {
        store,
        browser: TransactionBrowser::new(),
    };
    run_app(&mut app, Duration::from_millis(250))
}
