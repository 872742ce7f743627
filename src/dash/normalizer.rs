// Validation of the retrieved documents into typed records.

use expenditure_map::{
    CorrelationPoint, GeometryFeature, HeatMapValue, MunicipalityExpenditure, PartyExpenditure,
};

use crate::dash::io_common::{as_rows, kind_of, RowReader};
use crate::dash::*;

const NAME: &[&str] = &["nome_municipio", "municipality_name"];
const ID: &[&str] = &["id_municipio", "municipality_id"];
const TOTAL: &[&str] = &["valor_despesa", "total_expenditure"];
const PARTY: &[&str] = &["sigla_partido", "party_code"];
const SPEND: &[&str] = &["gasto_total", "total_expenditure"];
const TURNOUT: &[&str] = &["taxa_comparecimento", "turnout_rate"];

/// All the datasets of a dashboard, validated.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Datasets {
    pub city_ranking: Option<Vec<MunicipalityExpenditure>>,
    pub all_cities: Vec<MunicipalityExpenditure>,
    pub parties: Vec<PartyExpenditure>,
    pub heat_map: Vec<HeatMapValue>,
    pub correlation: Option<Vec<CorrelationPoint>>,
    pub geometry: Vec<GeometryFeature>,
}

pub fn read_municipalities(
    kind: SourceKind,
    js: &JSValue,
) -> DashResult<Vec<MunicipalityExpenditure>> {
    let source_name = kind.name();
    let mut res: Vec<MunicipalityExpenditure> = Vec::new();
    for (lineno, obj) in as_rows(source_name, js)?.into_iter().enumerate() {
        let r = RowReader::new(source_name, lineno, obj);
        res.push(MunicipalityExpenditure {
            municipality_id: r.optional_id(ID)?,
            municipality_name: r.string(NAME)?,
            total_expenditure: r.amount(TOTAL)?,
        });
    }
    Ok(res)
}

pub fn read_parties(js: &JSValue) -> DashResult<Vec<PartyExpenditure>> {
    let source_name = SourceKind::PartyRanking.name();
    let mut res: Vec<PartyExpenditure> = Vec::new();
    for (lineno, obj) in as_rows(source_name, js)?.into_iter().enumerate() {
        let r = RowReader::new(source_name, lineno, obj);
        res.push(PartyExpenditure {
            party_code: r.string(PARTY)?,
            total_expenditure: r.amount(TOTAL)?,
        });
    }
    Ok(res)
}

pub fn read_heat_map(js: &JSValue) -> DashResult<Vec<HeatMapValue>> {
    let source_name = SourceKind::HeatMap.name();
    let mut res: Vec<HeatMapValue> = Vec::new();
    for (lineno, obj) in as_rows(source_name, js)?.into_iter().enumerate() {
        let r = RowReader::new(source_name, lineno, obj);
        res.push(HeatMapValue {
            municipality_id: r.id(ID)?,
            total_expenditure: r.amount(TOTAL)?,
        });
    }
    Ok(res)
}

pub fn read_correlation(js: &JSValue) -> DashResult<Vec<CorrelationPoint>> {
    let source_name = SourceKind::Correlation.name();
    let mut res: Vec<CorrelationPoint> = Vec::new();
    for (lineno, obj) in as_rows(source_name, js)?.into_iter().enumerate() {
        let r = RowReader::new(source_name, lineno, obj);
        let turnout_rate = r.number(TURNOUT)?;
        ensure!(
            (0.0..=100.0).contains(&turnout_rate),
            MalformedDatasetSnafu {
                source_name,
                reason: format!("row {}: turnout {} is not a percentage", lineno, turnout_rate),
            }
        );
        res.push(CorrelationPoint {
            municipality_name: r.string(NAME)?,
            total_expenditure: r.amount(SPEND)?,
            turnout_rate,
        });
    }
    Ok(res)
}

/// Reads the features of a GeoJSON feature collection.
pub fn read_geometry(js: &JSValue) -> DashResult<Vec<GeometryFeature>> {
    let source_name = SourceKind::Geometry.name();
    let fail = |reason: String| {
        MalformedDatasetSnafu {
            source_name,
            reason,
        }
        .fail()
    };

    let collection = match js.as_object() {
        Some(obj) => obj,
        None => return fail(format!("expected a feature collection, got {}", kind_of(js))),
    };
    match collection.get("type") {
        None => {}
        Some(JSValue::String(s)) if s == "FeatureCollection" => {}
        Some(t) => return fail(format!("expected a FeatureCollection, got type {}", t)),
    }
    let features = match collection.get("features") {
        Some(fs) => as_rows(source_name, fs)?,
        None => return fail("missing field features".to_string()),
    };

    let mut res: Vec<GeometryFeature> = Vec::with_capacity(features.len());
    for (lineno, feature) in features.into_iter().enumerate() {
        let properties = match feature.get("properties").and_then(|p| p.as_object()) {
            Some(p) => p,
            None => return fail(format!("row {}: missing field properties", lineno)),
        };
        let r = RowReader::new(source_name, lineno, properties);
        res.push(GeometryFeature {
            feature_id: r.id(&["id"])?,
            display_name: r.string(&["name"])?,
            geometry: feature.get("geometry").cloned().unwrap_or(JSValue::Null),
        });
    }
    Ok(res)
}

/// Validates all the retrieved documents.
///
/// The first invalid document stops everything.
pub fn normalize_all(payloads: Vec<(SourceKind, JSValue)>) -> DashResult<Datasets> {
    let mut city_ranking = None;
    let mut all_cities = None;
    let mut parties = None;
    let mut heat_map = None;
    let mut correlation = None;
    let mut geometry = None;

    for (kind, js) in payloads.iter() {
        match kind {
            SourceKind::CityRanking => city_ranking = Some(read_municipalities(*kind, js)?),
            SourceKind::AllCities => all_cities = Some(read_municipalities(*kind, js)?),
            SourceKind::PartyRanking => parties = Some(read_parties(js)?),
            SourceKind::HeatMap => heat_map = Some(read_heat_map(js)?),
            SourceKind::Correlation => correlation = Some(read_correlation(js)?),
            SourceKind::Geometry => geometry = Some(read_geometry(js)?),
        }
        debug!("normalize_all: {} is valid", kind.name());
    }

    let res = Datasets {
        city_ranking,
        all_cities: required(SourceKind::AllCities, all_cities)?,
        parties: required(SourceKind::PartyRanking, parties)?,
        heat_map: required(SourceKind::HeatMap, heat_map)?,
        correlation,
        geometry: required(SourceKind::Geometry, geometry)?,
    };
    info!(
        "normalize_all: {} municipalities, {} parties, {} map values, {} features",
        res.all_cities.len(),
        res.parties.len(),
        res.heat_map.len(),
        res.geometry.len()
    );
    Ok(res)
}

fn required<T>(kind: SourceKind, x: Option<T>) -> DashResult<T> {
    match x {
        Some(x) => Ok(x),
        None => whatever!("the source {} is required", kind.name()),
    }
}
