mod config;
pub mod index;
pub mod manual;
mod tier;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::config::*;
pub use crate::index::{IndexedRow, RowIndex};
pub use crate::tier::{tier, ColorTier};

/// Sums the expenditures by municipality.
///
/// Several records for the same municipality are added together.
pub fn expenditure_by_municipality(values: &[HeatMapValue]) -> HashMap<MunicipalityId, Amount> {
    let mut res: HashMap<MunicipalityId, Amount> = HashMap::new();
    for v in values.iter() {
        match res.get_mut(&v.municipality_id) {
            Some(total) => {
                warn!(
                    "expenditure_by_municipality: duplicate record for {}, adding it up",
                    v.municipality_id
                );
                *total += v.total_expenditure;
            }
            None => {
                res.insert(v.municipality_id.clone(), v.total_expenditure);
            }
        }
    }
    res
}

/// The largest joined value, or None if nothing was joined.
pub fn max_expenditure(values: &[JoinedGeoValue]) -> Option<Amount> {
    values
        .iter()
        .map(|v| v.expenditure_value)
        .max()
}

/// Joins every feature of the map with its expenditure, and computes its tier.
///
/// Every feature gets exactly one value, in the same order. Features without
/// expenditure get zero. Expenditures without a feature are ignored.
///
/// ```
/// use expenditure_map::*;
/// use rust_decimal::Decimal;
/// use serde_json::Value;
///
/// let reais = |x: i64| Amount::new(Decimal::from(x));
/// let values = vec![
///     HeatMapValue { municipality_id: MunicipalityId::new("A"), total_expenditure: reais(100) },
///     HeatMapValue { municipality_id: MunicipalityId::new("B"), total_expenditure: reais(300) },
/// ];
/// let features: Vec<GeometryFeature> = ["A", "B", "C"]
///     .iter()
///     .map(|id| GeometryFeature {
///         feature_id: MunicipalityId::new(*id),
///         display_name: id.to_string(),
///         geometry: Value::Null,
///     })
///     .collect();
///
/// let map = join_geometry(&values, &features);
/// let tiers: Vec<ColorTier> = map.values.iter().map(|v| v.color_tier).collect();
/// assert_eq!(tiers, vec![ColorTier::Tier4, ColorTier::Tier7, ColorTier::Tier0]);
/// assert_eq!(map.max_expenditure, Some(reais(300)));
/// ```
pub fn join_geometry(values: &[HeatMapValue], features: &[GeometryFeature]) -> Choropleth {
    let by_id = expenditure_by_municipality(values);
    let mut unmatched: usize = 0;
    let mut joined: Vec<JoinedGeoValue> = features
        .iter()
        .map(|f| {
            let expenditure_value = match by_id.get(&f.feature_id) {
                Some(x) => *x,
                None => {
                    unmatched += 1;
                    Amount::ZERO
                }
            };
            JoinedGeoValue {
                feature_id: f.feature_id.clone(),
                display_name: f.display_name.clone(),
                expenditure_value,
                color_tier: ColorTier::Tier0,
            }
        })
        .collect();

    let max = max_expenditure(&joined);
    for v in joined.iter_mut() {
        v.color_tier = tier(v.expenditure_value, max);
    }

    info!(
        "join_geometry: {} features, {} without expenditure, {} expenditure keys, max {:?}",
        joined.len(),
        unmatched,
        by_id.len(),
        max
    );
    debug!("join_geometry: {:?}", joined);
    Choropleth {
        values: joined,
        max_expenditure: max,
    }
}

/// Computes the headline figures.
///
/// `municipalities` is the full listing, `parties` is sorted by the producer
/// with the biggest spender first.
pub fn kpi_summary(
    municipalities: &[MunicipalityExpenditure],
    parties: &[PartyExpenditure],
) -> KpiSummary {
    let total_expenditure_all: Amount = municipalities.iter().map(|m| m.total_expenditure).sum();
    let top_party_code_or_na = parties
        .first()
        .map(|p| p.party_code.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    KpiSummary {
        total_expenditure_all,
        municipality_count: municipalities.len(),
        top_party_code_or_na,
    }
}
