//! Basket valuation.
//!
//! A basket is a set of close series held at fixed weights. Each component
//! is normalized by its first close, so the valuation starts at exactly the
//! initial investment and moves with the weighted average of the
//! components' growth.

use crate::domain::error::SigbenchError;
use crate::domain::series::TimeSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct BasketComponent {
    pub ticker: String,
    pub closes: TimeSeries,
}

/// Value of the weighted basket over time.
///
/// Components must already be aligned on the same dates. An empty basket,
/// an empty component, or a non-positive first close is a data problem and
/// comes back as an error.
pub fn weighted_valuation(
    components: &[BasketComponent],
    weights: &[f64],
    initial_investment: f64,
) -> Result<TimeSeries, SigbenchError> {
    assert_eq!(
        components.len(),
        weights.len(),
        "weights must cover the components"
    );

    if components.is_empty() {
        return Err(SigbenchError::UniverseEmpty);
    }
    for component in components {
        if component.closes.is_empty() {
            return Err(SigbenchError::NoData {
                ticker: component.ticker.clone(),
            });
        }
        if component.closes.value(0) <= 0.0 {
            return Err(SigbenchError::UnusableSeries {
                ticker: component.ticker.clone(),
                reason: format!(
                    "first close {} is not positive",
                    component.closes.value(0)
                ),
            });
        }
    }

    let first = &components[0].closes;
    for component in &components[1..] {
        assert_eq!(
            component.closes.len(),
            first.len(),
            "basket components must cover the same dates"
        );
        for i in 0..first.len() {
            assert_eq!(
                component.closes.date(i),
                first.date(i),
                "basket components must cover the same dates"
            );
        }
    }

    let dates: Vec<_> = first.dates().collect();
    let values: Vec<f64> = (0..first.len())
        .map(|i| {
            let weighted: f64 = components
                .iter()
                .zip(weights)
                .map(|(c, w)| w * c.closes.value(i) / c.closes.value(0))
                .sum();
            initial_investment * weighted
        })
        .collect();

    Ok(TimeSeries::from_parts(&dates, &values))
}
