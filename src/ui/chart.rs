use crate::api::types::MarketEvent;

pub struct PriceSeries {
    pub yes: Vec<(f64, f64)>,
    pub no: Vec<(f64, f64)>,
}

/// Yes price per event in feed order, with the complementary No price.
pub fn price_series(events: &[MarketEvent]) -> PriceSeries {
    let yes: Vec<(f64, f64)> = events
        .iter()
        .enumerate()
        .map(|(i, e)| (i as f64, e.price.clamp(0.0, 1.0)))
        .collect();
    let no = yes.iter().map(|&(x, y)| (x, 1.0 - y)).collect();
    PriceSeries { yes, no }
}
