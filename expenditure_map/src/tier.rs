use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::config::Amount;

/// The shade of a municipality on the map.
///
/// `Tier0` is used both for municipalities without spending and for the ones
/// missing from the expenditure data.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize)]
pub enum ColorTier {
    Tier0,
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Tier5,
    Tier6,
    Tier7,
}

// Lower bounds (exclusive) of the scale, from the darkest tier down.
const THRESHOLDS: [(f64, ColorTier); 7] = [
    (0.8, ColorTier::Tier7),
    (0.6, ColorTier::Tier6),
    (0.4, ColorTier::Tier5),
    (0.2, ColorTier::Tier4),
    (0.1, ColorTier::Tier3),
    (0.05, ColorTier::Tier2),
    (0.0, ColorTier::Tier1),
];

impl ColorTier {
    /// The tier for a value already divided by the maximum.
    pub fn from_scale(scale: f64) -> ColorTier {
        THRESHOLDS
            .iter()
            .find(|(threshold, _)| scale > *threshold)
            .map(|(_, tier)| *tier)
            .unwrap_or(ColorTier::Tier0)
    }

    /// The fill color, from white to dark red.
    pub fn fill_color(&self) -> &'static str {
        match self {
            ColorTier::Tier0 => "#FFFFFF",
            ColorTier::Tier1 => "#FFEDA0",
            ColorTier::Tier2 => "#FEB24C",
            ColorTier::Tier3 => "#FD8D3C",
            ColorTier::Tier4 => "#FC4E2A",
            ColorTier::Tier5 => "#E31A1C",
            ColorTier::Tier6 => "#BD0026",
            ColorTier::Tier7 => "#800026",
        }
    }
}

/// Computes the tier of a value, relative to the largest value on the map.
///
/// A missing or zero maximum puts everything in `Tier0`.
///
/// ```
/// use expenditure_map::{tier, Amount, ColorTier};
/// use rust_decimal::Decimal;
///
/// let reais = |x: i64| Amount::new(Decimal::from(x));
/// let max = Some(reais(300));
/// assert_eq!(tier(reais(100), max), ColorTier::Tier4);
/// assert_eq!(tier(reais(300), max), ColorTier::Tier7);
/// assert_eq!(tier(reais(5), None), ColorTier::Tier0);
/// ```
pub fn tier(value: Amount, max: Option<Amount>) -> ColorTier {
    match max {
        Some(m) if !m.is_zero() => {
            let scale = (value.value() / m.value()).to_f64().unwrap_or(0.0);
            ColorTier::from_scale(scale)
        }
        _ => ColorTier::Tier0,
    }
}
