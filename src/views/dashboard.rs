use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;

use crate::api::types::DashboardStats;
use crate::api::ApiClient;
use crate::polling::{Fetcher, Subscription, ViewError, ViewState};

pub const ERROR_MESSAGE: &str = "Failed to load dashboard stats";

pub struct DashboardView {
    subscription: Subscription<DashboardStats>,
}

impl DashboardView {
    pub fn mount(client: Arc<ApiClient>, interval: Duration) -> Self {
        let fetcher: Fetcher<DashboardStats> = Arc::new(move || {
            let client = client.clone();
            async move { Ok::<_, ViewError>(client.stats().await?) }.boxed()
        });
        let mut subscription = Subscription::new("dashboard", interval, ERROR_MESSAGE, fetcher);
        subscription.start();
        Self { subscription }
    }

    pub fn state(&self) -> ViewState<DashboardStats> {
        self.subscription.state().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_backend, test_auth};

    #[tokio::test]
    async fn test_mount_loads_stats() {
        let backend = spawn_backend().await;
        let (auth, _, _) = test_auth();
        let client = Arc::new(ApiClient::new(&backend.base_url, auth, None).unwrap());

        let view = DashboardView::mount(client, Duration::from_secs(30));
        let mut rx = view.subscription.subscribe();
        let state = tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| matches!(s, ViewState::Ready(_) | ViewState::Error(_))),
        )
        .await
        .unwrap()
        .unwrap()
        .clone();

        let stats = state.data().unwrap();
        assert_eq!(stats.total_markets, 50);
        assert_eq!(stats.active_markets, 12);
    }

    #[tokio::test]
    async fn test_unauthorized_shows_error_message() {
        let backend = spawn_backend().await;
        backend
            .state
            .reject_all
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let (auth, _, redirects) = test_auth();
        let client = Arc::new(ApiClient::new(&backend.base_url, auth, None).unwrap());

        let view = DashboardView::mount(client, Duration::from_secs(30));
        let mut rx = view.subscription.subscribe();
        tokio::time::timeout(
            Duration::from_secs(5),
            rx.wait_for(|s| matches!(s, ViewState::Error(_))),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(view.state().error(), Some(ERROR_MESSAGE));
        assert_eq!(redirects.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
