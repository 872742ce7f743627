// ********* Input data structures ***********

use std::fmt::Display;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JSValue;

use crate::tier::ColorTier;

/// The identifier of a municipality.
///
/// It is shared between the expenditure datasets and the geometry features.
/// Two identifiers are the same municipality only if they are exactly equal:
/// no trimming, no case folding.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Serialize)]
pub struct MunicipalityId(pub String);

impl MunicipalityId {
    pub fn new(id: impl Into<String>) -> MunicipalityId {
        MunicipalityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for MunicipalityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A monetary amount, in reais.
///
/// Amounts are decimal so that sums of reais and cents are exact. Readers only
/// build non-negative amounts. The negative zero is folded into zero.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Ord, PartialOrd, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Amount {
        if value.is_zero() {
            Amount::ZERO
        } else {
            Amount(value)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// For the places where an approximation is enough: ratios and chart axes.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount::new(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

/// The total expenditure of a municipality.
///
/// The ranking and listing sources are keyed by name; they may carry the
/// municipality id as well.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct MunicipalityExpenditure {
    pub municipality_id: Option<MunicipalityId>,
    pub municipality_name: String,
    pub total_expenditure: Amount,
}

/// The total expenditure of a party.
///
/// In a collection, the position encodes the rank: the producer sorts them by
/// decreasing expenditure and they are never sorted again here.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PartyExpenditure {
    pub party_code: String,
    pub total_expenditure: Amount,
}

/// The expenditure of a municipality, as used for the map.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct HeatMapValue {
    pub municipality_id: MunicipalityId,
    pub total_expenditure: Amount,
}

/// A polygon of the map. The geometry itself is never inspected.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct GeometryFeature {
    pub feature_id: MunicipalityId,
    pub display_name: String,
    pub geometry: JSValue,
}

/// Campaign expenditure against turnout, for one municipality.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct CorrelationPoint {
    pub municipality_name: String,
    pub total_expenditure: Amount,
    /// Percentage, between 0 and 100.
    pub turnout_rate: f64,
}

// ******** Output data structures *********

/// One feature of the map, joined with its expenditure.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct JoinedGeoValue {
    pub feature_id: MunicipalityId,
    pub display_name: String,
    /// Zero when the feature has no expenditure record.
    pub expenditure_value: Amount,
    pub color_tier: ColorTier,
}

/// The result of joining the map with the expenditures.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Choropleth {
    /// Exactly one entry per geometry feature, in the order of the features.
    pub values: Vec<JoinedGeoValue>,
    /// None when there are no features.
    pub max_expenditure: Option<Amount>,
}

/// The label used when no party has been reported.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub total_expenditure_all: Amount,
    pub municipality_count: usize,
    pub top_party_code_or_na: String,
}
