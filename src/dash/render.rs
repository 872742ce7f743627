// The structures handed to the charts, the map and the table.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::json;

use expenditure_map::{
    join_geometry, kpi_summary, Amount, ColorTier, CorrelationPoint, MunicipalityId, RowIndex,
};

use crate::dash::config_reader::MapSettings;
use crate::dash::normalizer::Datasets;
use crate::dash::*;

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct KpiPanel {
    pub total_expenditure: Amount,
    pub total_expenditure_text: String,
    pub municipality_count: usize,
    pub top_party: String,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub values: Vec<Amount>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub tooltip: Vec<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ScatterChart {
    pub points: Vec<ScatterPoint>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct MapFeature {
    pub feature_id: MunicipalityId,
    pub display_name: String,
    pub expenditure_value: Amount,
    pub color_tier: ColorTier,
    pub fill_color: String,
    pub popup_title: String,
    pub popup_text: String,
    pub geometry: JSValue,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ChoroplethLayer {
    pub center: [f64; 2],
    pub zoom: u8,
    pub max_expenditure: Option<Amount>,
    pub features: Vec<MapFeature>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct TableRow {
    pub municipality_name: String,
    pub total_expenditure: Amount,
    pub total_expenditure_text: String,
    pub visible: bool,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DataTable {
    pub query: String,
    pub visible_count: usize,
    pub rows: Vec<TableRow>,
}

/// Everything needed to draw the dashboard.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Dashboard {
    pub kpis: KpiPanel,
    pub city_ranking: BarChart,
    pub correlation: Option<ScatterChart>,
    pub choropleth: ChoroplethLayer,
    pub table: DataTable,
}

/// Formats an amount in reais, the Brazilian way: `R$ 1.234,56`.
pub fn format_brl(value: Decimal) -> String {
    let cents = (value.abs() * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
        .unwrap_or(0);
    let units = (cents / 100).to_string();
    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (idx, c) in units.chars().enumerate() {
        if idx > 0 && (units.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if value.is_sign_negative() && cents > 0 { "-" } else { "" };
    format!("{}R$\u{a0}{},{:02}", sign, grouped, cents % 100)
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

fn scatter_chart(points: &[CorrelationPoint]) -> ScatterChart {
    ScatterChart {
        points: points
            .iter()
            .map(|p| ScatterPoint {
                x: p.total_expenditure.to_f64(),
                y: p.turnout_rate,
                label: p.municipality_name.clone(),
                tooltip: vec![
                    p.municipality_name.clone(),
                    format!("Gasto: {}", format_brl(p.total_expenditure.value())),
                    format!("Comparecimento: {}", format_percent(p.turnout_rate)),
                ],
            })
            .collect(),
    }
}

fn choropleth_layer(datasets: &Datasets, map: &MapSettings) -> ChoroplethLayer {
    let joined = join_geometry(&datasets.heat_map, &datasets.geometry);
    // join_geometry keeps the order of the features.
    let features = joined
        .values
        .into_iter()
        .zip(datasets.geometry.iter())
        .map(|(v, f)| MapFeature {
            fill_color: v.color_tier.fill_color().to_string(),
            popup_title: v.display_name.clone(),
            popup_text: format!("Gasto Total: {}", format_brl(v.expenditure_value.value())),
            feature_id: v.feature_id,
            display_name: v.display_name,
            expenditure_value: v.expenditure_value,
            color_tier: v.color_tier,
            geometry: f.geometry.clone(),
        })
        .collect();
    ChoroplethLayer {
        center: map.center,
        zoom: map.zoom,
        max_expenditure: joined.max_expenditure,
        features,
    }
}

fn data_table(index: &RowIndex, query: &str) -> DataTable {
    let rows: Vec<TableRow> = index
        .rows()
        .iter()
        .zip(index.visibility(query))
        .map(|(r, visible)| TableRow {
            municipality_name: r.municipality_name.clone(),
            total_expenditure: r.total_expenditure,
            total_expenditure_text: format_brl(r.total_expenditure.value()),
            visible,
        })
        .collect();
    DataTable {
        query: query.to_string(),
        visible_count: rows.iter().filter(|r| r.visible).count(),
        rows,
    }
}

/// Assembles the dashboard out of validated datasets.
///
/// Without a ranking source, the ranking chart shows the first
/// `ranking_size` rows of the table.
pub fn build_dashboard(
    datasets: &Datasets,
    map: &MapSettings,
    ranking_size: usize,
    query: &str,
) -> Dashboard {
    let kpis = kpi_summary(&datasets.all_cities, &datasets.parties);
    let index = RowIndex::build(&datasets.all_cities);

    let city_ranking = match &datasets.city_ranking {
        Some(cities) => BarChart {
            labels: cities.iter().map(|c| c.municipality_name.clone()).collect(),
            values: cities.iter().map(|c| c.total_expenditure).collect(),
        },
        None => {
            let top = index.top(ranking_size);
            debug!("build_dashboard: ranking from the {} first rows", top.len());
            BarChart {
                labels: top.iter().map(|r| r.municipality_name.clone()).collect(),
                values: top.iter().map(|r| r.total_expenditure).collect(),
            }
        }
    };

    let dashboard = Dashboard {
        kpis: KpiPanel {
            total_expenditure: kpis.total_expenditure_all,
            total_expenditure_text: format_brl(kpis.total_expenditure_all.value()),
            municipality_count: kpis.municipality_count,
            top_party: kpis.top_party_code_or_na,
        },
        city_ranking,
        correlation: datasets.correlation.as_deref().map(scatter_chart),
        choropleth: choropleth_layer(datasets, map),
        table: data_table(&index, query),
    };
    info!(
        "build_dashboard: {} table rows ({} visible), {} map features",
        dashboard.table.rows.len(),
        dashboard.table.visible_count,
        dashboard.choropleth.features.len()
    );
    dashboard
}

/// What is shown instead of the dashboard when it cannot be built.
pub fn error_notice(e: &DashError) -> JSValue {
    json!({ "error": e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use expenditure_map::{GeometryFeature, HeatMapValue, MunicipalityExpenditure, PartyExpenditure};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn amount(x: f64) -> Amount {
        Amount::new(d(&x.to_string()))
    }

    fn m(name: &str, total: f64) -> MunicipalityExpenditure {
        MunicipalityExpenditure {
            municipality_id: None,
            municipality_name: name.to_string(),
            total_expenditure: amount(total),
        }
    }

    fn datasets() -> Datasets {
        Datasets {
            city_ranking: None,
            all_cities: vec![m("Canoas", 200.0), m("Porto Alegre", 1000.0), m("Pelotas", 300.0)],
            parties: vec![PartyExpenditure {
                party_code: "PL".to_string(),
                total_expenditure: amount(700.0),
            }],
            heat_map: vec![HeatMapValue {
                municipality_id: MunicipalityId::new("4314902"),
                total_expenditure: amount(1000.0),
            }],
            correlation: Some(vec![CorrelationPoint {
                municipality_name: "Pelotas".to_string(),
                total_expenditure: amount(1234.5),
                turnout_rate: 80.123,
            }]),
            geometry: vec![
                GeometryFeature {
                    feature_id: MunicipalityId::new("4314902"),
                    display_name: "Porto Alegre".to_string(),
                    geometry: json!({"type": "Polygon"}),
                },
                GeometryFeature {
                    feature_id: MunicipalityId::new("4300034"),
                    display_name: "Aceguá".to_string(),
                    geometry: JSValue::Null,
                },
            ],
        }
    }

    #[test]
    fn currency() {
        assert_eq!(format_brl(Decimal::ZERO), "R$\u{a0}0,00");
        assert_eq!(format_brl(d("1234.5")), "R$\u{a0}1.234,50");
        assert_eq!(format_brl(d("999.999")), "R$\u{a0}1.000,00");
        assert_eq!(format_brl(d("0.125")), "R$\u{a0}0,13");
        assert_eq!(format_brl(d("1234567.891")), "R$\u{a0}1.234.567,89");
        assert_eq!(format_brl(d("-12.3")), "-R$\u{a0}12,30");
    }

    #[test]
    fn percent() {
        assert_eq!(format_percent(80.123), "80.12%");
        assert_eq!(format_percent(0.0), "0.00%");
    }

    #[test]
    fn dashboard() {
        let d = build_dashboard(&datasets(), &MapSettings::default(), 2, "po");
        assert_eq!(d.kpis.total_expenditure, amount(1500.0));
        assert_eq!(d.kpis.total_expenditure_text, "R$\u{a0}1.500,00");
        assert_eq!(d.kpis.municipality_count, 3);
        assert_eq!(d.kpis.top_party, "PL");

        assert_eq!(d.city_ranking.labels, vec!["Porto Alegre", "Pelotas"]);

        let names: Vec<&str> = d.table.rows.iter().map(|r| r.municipality_name.as_str()).collect();
        assert_eq!(names, vec!["Porto Alegre", "Pelotas", "Canoas"]);
        let visible: Vec<bool> = d.table.rows.iter().map(|r| r.visible).collect();
        assert_eq!(visible, vec![true, false, false]);
        assert_eq!(d.table.visible_count, 1);

        let f = &d.choropleth.features;
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].fill_color, "#800026");
        assert_eq!(f[0].popup_text, "Gasto Total: R$\u{a0}1.000,00");
        assert_eq!(f[0].geometry, json!({"type": "Polygon"}));
        assert_eq!(f[1].color_tier, ColorTier::Tier0);
        assert_eq!(f[1].fill_color, "#FFFFFF");
        assert_eq!(d.choropleth.zoom, 7);

        let scatter = d.correlation.unwrap();
        assert_eq!(
            scatter.points[0].tooltip,
            vec![
                "Pelotas".to_string(),
                "Gasto: R$\u{a0}1.234,50".to_string(),
                "Comparecimento: 80.12%".to_string()
            ]
        );
    }

    #[test]
    fn ranking_source_is_used_as_is() {
        let mut ds = datasets();
        ds.city_ranking = Some(vec![m("Canoas", 1.0), m("Bagé", 2.0)]);
        let d = build_dashboard(&ds, &MapSettings::default(), 15, "");
        assert_eq!(d.city_ranking.labels, vec!["Canoas", "Bagé"]);
        assert_eq!(d.table.visible_count, 3);
    }

    #[test]
    fn empty_datasets() {
        let d = build_dashboard(&Datasets::default(), &MapSettings::default(), 15, "");
        assert_eq!(d.kpis.total_expenditure, Amount::ZERO);
        assert_eq!(d.kpis.municipality_count, 0);
        assert_eq!(d.kpis.top_party, "N/A");
        assert!(d.city_ranking.labels.is_empty());
        assert!(d.choropleth.features.is_empty());
        assert_eq!(d.choropleth.max_expenditure, None);
        assert!(d.correlation.is_none());
    }
}
