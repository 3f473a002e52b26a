use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::api::types::MarketSnapshot;
use crate::api::ApiClient;
use crate::polling::{Fetcher, Subscription, ViewError, ViewState};

pub const ERROR_MESSAGE: &str = "Failed to load market data";

pub struct MarketDetailView {
    subscription: Subscription<MarketSnapshot>,
}

impl MarketDetailView {
    /// Without a market id the view fails immediately and never touches the network.
    pub fn mount(client: Arc<ApiClient>, market_id: Option<String>, interval: Duration) -> Self {
        let subscription = match market_id.filter(|id| !id.is_empty()) {
            Some(id) => {
                let fetcher: Fetcher<MarketSnapshot> = Arc::new(move || {
                    let client = client.clone();
                    let id = id.clone();
                    async move {
                        let (market, events) = futures::try_join!(
                            client.market_details(&id),
                            client.market_events(&id)
                        )?;
                        Ok::<_, ViewError>(MarketSnapshot { market, events })
                    }
                    .boxed()
                });
                let mut subscription =
                    Subscription::new("market_detail", interval, ERROR_MESSAGE, fetcher);
                subscription.start();
                subscription
            }
            None => Subscription::failed("market_detail", ViewError::MissingParameter("Market ID")),
        };

        Self { subscription }
    }

    pub fn state(&self) -> ViewState<MarketSnapshot> {
        self.subscription.state().clone()
    }
}
