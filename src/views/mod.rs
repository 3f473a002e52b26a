//! Screen data sources. Mounting a view starts its subscription; dropping it stops polling.

pub mod dashboard;
pub mod health;
pub mod market_detail;
pub mod markets;

pub use dashboard::DashboardView;
pub use health::HealthView;
pub use market_detail::MarketDetailView;
pub use markets::MarketsView;
