use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::api::types::HealthStatus;
use crate::api::ApiClient;
use crate::polling::{Fetcher, Subscription, ViewError, ViewState};

/// Backend liveness shown in the header. Lives for the whole session.
pub struct HealthView {
    subscription: Subscription<HealthStatus>,
}

impl HealthView {
    pub fn mount(client: Arc<ApiClient>, interval: Duration) -> Self {
        let fetcher: Fetcher<HealthStatus> = Arc::new(move || {
            let client = client.clone();
            async move { Ok::<_, ViewError>(client.health().await?) }.boxed()
        });
        let mut subscription = Subscription::new("health", interval, "Unreachable", fetcher);
        subscription.start();
        Self { subscription }
    }

    pub fn state(&self) -> ViewState<HealthStatus> {
        self.subscription.state().clone()
    }
}
