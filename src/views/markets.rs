use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::api::types::Market;
use crate::api::ApiClient;
use crate::polling::{Fetcher, Subscription, ViewError, ViewState};
use crate::ui::pagination::Paginator;

pub const ERROR_MESSAGE: &str = "Failed to load markets";

/// Market list with client-side paging and a row cursor within the current page.
pub struct MarketsView {
    subscription: Subscription<Vec<Market>>,
    pub pager: Paginator,
    selected: usize,
}

impl MarketsView {
    pub fn mount(client: Arc<ApiClient>, interval: Duration, rows_per_page: usize) -> Self {
        let fetcher: Fetcher<Vec<Market>> = Arc::new(move || {
            let client = client.clone();
            async move { Ok::<_, ViewError>(client.markets().await?) }.boxed()
        });
        Self::with_fetcher(fetcher, interval, rows_per_page)
    }

    pub fn with_fetcher(fetcher: Fetcher<Vec<Market>>, interval: Duration, rows_per_page: usize) -> Self {
        let mut subscription = Subscription::new("markets", interval, ERROR_MESSAGE, fetcher);
        subscription.start();
        Self {
            subscription,
            pager: Paginator::new(rows_per_page),
            selected: 0,
        }
    }

    pub fn state(&self) -> ViewState<Vec<Market>> {
        self.subscription.state().clone()
    }

    fn len(&self) -> usize {
        self.subscription.state().data().map_or(0, Vec::len)
    }

    /// Only a fresh list moves the pager; Loading and Error leave it alone.
    pub fn sync(&mut self) {
        let Some(len) = self.subscription.state().data().map(Vec::len) else {
            return;
        };
        self.pager.clamp(len);
        let rows = self.pager.range(len).len();
        if rows == 0 {
            self.selected = 0;
        } else if self.selected >= rows {
            self.selected = rows - 1;
        }
    }

    pub fn selected_row(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        let rows = self.pager.range(self.len()).len();
        if self.selected + 1 < rows {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn next_page(&mut self) {
        let len = self.len();
        self.pager.next_page(len);
        self.selected = 0;
    }

    pub fn prev_page(&mut self) {
        self.pager.prev_page();
        self.selected = 0;
    }

    pub fn cycle_rows_per_page(&mut self) {
        self.pager.cycle_rows_per_page();
        self.selected = 0;
    }

    /// Id of the highlighted market, for navigating to its detail screen.
    pub fn selected_market_id(&self) -> Option<String> {
        let state = self.subscription.state();
        let markets = state.data()?;
        self.pager
            .slice(markets)
            .get(self.selected)
            .map(|m| m.id.clone())
    }
}
