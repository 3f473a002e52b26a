use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_markets: u64,
    pub active_markets: u64,
    pub total_volume: f64,
    pub total_trades: u64,
}

impl DashboardStats {
    /// `activeMarkets <= totalMarkets` is promised by the backend, not checked by us.
    pub fn is_consistent(&self) -> bool {
        self.active_markets <= self.total_markets
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketStatus {
    Active,
    Resolved,
    Cancelled,
    Other(String),
}

impl MarketStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "active" => MarketStatus::Active,
            "resolved" => MarketStatus::Resolved,
            "cancelled" => MarketStatus::Cancelled,
            _ => MarketStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MarketStatus::Active => "active",
            MarketStatus::Resolved => "resolved",
            MarketStatus::Cancelled => "cancelled",
            MarketStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MarketStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MarketStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(MarketStatus::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub id: String,
    pub title: String,
    pub volume: f64,
    pub status: MarketStatus,
    #[serde(default)]
    pub resolution: Option<String>,
    pub end_date: String,
}

impl Market {
    pub fn resolution_label(&self) -> &str {
        match self.resolution.as_deref() {
            Some(resolution) if !resolution.is_empty() => resolution,
            _ => "Pending",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MarketsResponse {
    #[serde(default)]
    pub markets: Option<Vec<Market>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDetails {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub current_price: f64,
    pub volume24h: f64,
    pub trades24h: u64,
    pub open_interest: f64,
    pub resolution_date: String,
    pub status: MarketStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub price: f64,
    pub amount: f64,
    pub timestamp: String,
}

/// Market detail screen data; both halves come from the same poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub market: MarketDetails,
    pub events: Vec<MarketEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    Degraded,
}

impl HealthStatus {
    pub fn from_body(body: &serde_json::Value) -> Self {
        match body.get("status").and_then(|s| s.as_str()) {
            Some(status) if status.eq_ignore_ascii_case("ok") => HealthStatus::Ok,
            _ => HealthStatus::Degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stats_camel_case() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "totalMarkets": 50,
            "activeMarkets": 12,
            "totalVolume": 1000000,
            "totalTrades": 3400
        }))
        .unwrap();

        assert_eq!(stats.total_markets, 50);
        assert_eq!(stats.active_markets, 12);
        assert_eq!(stats.total_volume, 1_000_000.0);
        assert_eq!(stats.total_trades, 3400);
        assert!(stats.is_consistent());
    }

    #[test]
    fn test_stats_fixture_contract() {
        // Backend contract: active never exceeds total.
        let fixtures = [
            json!({"totalMarkets": 50, "activeMarkets": 12, "totalVolume": 1000000, "totalTrades": 3400}),
            json!({"totalMarkets": 0, "activeMarkets": 0, "totalVolume": 0, "totalTrades": 0}),
            json!({"totalMarkets": 7, "activeMarkets": 7, "totalVolume": 12.5, "totalTrades": 1}),
        ];
        for fixture in fixtures {
            let stats: DashboardStats = serde_json::from_value(fixture).unwrap();
            assert!(stats.active_markets <= stats.total_markets);
        }
    }

    #[test]
    fn test_market_status_parsing() {
        assert_eq!(MarketStatus::parse("ACTIVE"), MarketStatus::Active);
        assert_eq!(MarketStatus::parse("Resolved"), MarketStatus::Resolved);
        assert_eq!(MarketStatus::parse("cancelled"), MarketStatus::Cancelled);
        assert_eq!(
            MarketStatus::parse("paused"),
            MarketStatus::Other("paused".to_string())
        );
        assert_eq!(MarketStatus::parse("paused").to_string(), "paused");
    }

    #[test]
    fn test_market_resolution_label() {
        let market: Market = serde_json::from_value(json!({
            "id": "m1",
            "title": "Will it rain?",
            "volume": 10.0,
            "status": "active",
            "resolution": null,
            "endDate": "2024-06-30T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(market.resolution_label(), "Pending");

        let resolved = Market {
            resolution: Some("YES".to_string()),
            ..market
        };
        assert_eq!(resolved.resolution_label(), "YES");
    }

    #[test]
    fn test_event_type_field() {
        let event: MarketEvent = serde_json::from_value(json!({
            "id": "e1",
            "type": "trade",
            "price": 0.65,
            "amount": 100,
            "timestamp": "2024-01-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(event.event_type, "trade");
        assert_eq!(event.amount, 100.0);
    }

    #[test]
    fn test_health_from_body() {
        assert_eq!(HealthStatus::from_body(&json!({"status": "ok"})), HealthStatus::Ok);
        assert_eq!(HealthStatus::from_body(&json!({"status": "down"})), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_body(&json!([])), HealthStatus::Degraded);
    }
}
