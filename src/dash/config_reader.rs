use crate::dash::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the producer API listens when it runs locally.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// The producer API routes, relative to the base URL.
pub const CITY_RANKING_ROUTE: &str = "/api/ranking-cidades";
pub const ALL_CITIES_ROUTE: &str = "/api/todas-cidades";
pub const PARTY_RANKING_ROUTE: &str = "/api/ranking-partidos";
pub const HEAT_MAP_ROUTE: &str = "/api/mapa-calor";
pub const CORRELATION_ROUTE: &str = "/api/correlacao-gasto-votacao";
/// The municipalities of Rio Grande do Sul.
pub const GEOMETRY_URL: &str =
    "https://raw.githubusercontent.com/tbrugz/geodata-br/master/geojson/geojs-43-mun.json";

pub const DEFAULT_RANKING_SIZE: usize = 15;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SourceKind {
    CityRanking,
    AllCities,
    PartyRanking,
    HeatMap,
    Correlation,
    Geometry,
}

impl SourceKind {
    /// The name used in the configuration file and in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::CityRanking => "cityRanking",
            SourceKind::AllCities => "allCities",
            SourceKind::PartyRanking => "partyRanking",
            SourceKind::HeatMap => "heatMap",
            SourceKind::Correlation => "correlation",
            SourceKind::Geometry => "geometry",
        }
    }
}

/// The addresses of the sources.
///
/// The optional sources can be turned off with `null`.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    #[serde(rename = "cityRanking")]
    pub city_ranking: Option<String>,
    #[serde(rename = "allCities")]
    pub all_cities: String,
    #[serde(rename = "partyRanking")]
    pub party_ranking: String,
    #[serde(rename = "heatMap")]
    pub heat_map: String,
    pub correlation: Option<String>,
    pub geometry: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            city_ranking: Some(CITY_RANKING_ROUTE.to_string()),
            all_cities: ALL_CITIES_ROUTE.to_string(),
            party_ranking: PARTY_RANKING_ROUTE.to_string(),
            heat_map: HEAT_MAP_ROUTE.to_string(),
            correlation: Some(CORRELATION_ROUTE.to_string()),
            geometry: GEOMETRY_URL.to_string(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Latitude and longitude.
    pub center: [f64; 2],
    pub zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        MapSettings {
            center: [-29.5, -53.0],
            zoom: 7,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    pub sources: SourceSettings,
    pub map: MapSettings,
    #[serde(rename = "rankingSize")]
    pub ranking_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            sources: SourceSettings::default(),
            map: MapSettings::default(),
            ranking_size: DEFAULT_RANKING_SIZE,
        }
    }
}

/// A source to retrieve, with its resolved address.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceRequest {
    pub kind: SourceKind,
    pub address: String,
}

pub fn read_config(path: &str) -> DashResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

fn is_url(address: &str) -> bool {
    address.starts_with("http://") || address.starts_with("https://")
}

/// Turns an address of the configuration into something the retriever understands.
///
/// Rooted addresses are routes of the producer API and need a base URL.
/// Files are written plainly or with `file://`, relative to `root`.
pub fn resolve_address(address: &str, base_url: Option<&str>, root: &Path) -> DashResult<String> {
    if is_url(address) {
        return Ok(address.to_string());
    }
    if let Some(p) = address.strip_prefix("file://") {
        return Ok(root.join(p).display().to_string());
    }
    if address.starts_with('/') {
        return match base_url {
            Some(base) => Ok(format!("{}{}", base.trim_end_matches('/'), address)),
            None => whatever!(
                "the address {} is an API route but no baseUrl is configured",
                address
            ),
        };
    }
    Ok(root.join(address).display().to_string())
}

/// The sources to retrieve, in a fixed order.
pub fn resolve_sources(config: &DashboardConfig, root: &Path) -> DashResult<Vec<SourceRequest>> {
    let s = &config.sources;
    let entries: Vec<(SourceKind, Option<&String>)> = vec![
        (SourceKind::CityRanking, s.city_ranking.as_ref()),
        (SourceKind::AllCities, Some(&s.all_cities)),
        (SourceKind::PartyRanking, Some(&s.party_ranking)),
        (SourceKind::HeatMap, Some(&s.heat_map)),
        (SourceKind::Correlation, s.correlation.as_ref()),
        (SourceKind::Geometry, Some(&s.geometry)),
    ];
    let base_url = config.base_url.as_deref();
    let mut res: Vec<SourceRequest> = Vec::with_capacity(entries.len());
    for (kind, address) in entries {
        if let Some(a) = address {
            let address = resolve_address(a, base_url, root)?;
            info!("Source {}: {}", kind.name(), address);
            res.push(SourceRequest { kind, address });
        }
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.ranking_size, 15);
        assert_eq!(config.map.center, [-29.5, -53.0]);
    }

    #[test]
    fn optional_sources_can_be_turned_off() {
        let config: DashboardConfig = serde_json::from_str(
            r#"{"baseUrl": "http://localhost:5000/", "sources": {"cityRanking": null, "correlation": null}}"#,
        )
        .unwrap();
        let reqs = resolve_sources(&config, Path::new(".")).unwrap();
        let kinds: Vec<SourceKind> = reqs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SourceKind::AllCities,
                SourceKind::PartyRanking,
                SourceKind::HeatMap,
                SourceKind::Geometry
            ]
        );
        assert_eq!(reqs[0].address, "http://localhost:5000/api/todas-cidades");
        assert_eq!(reqs[3].address, GEOMETRY_URL);
    }

    #[test]
    fn all_sources() {
        let reqs = resolve_sources(&DashboardConfig::default(), Path::new("/data")).unwrap();
        assert_eq!(reqs.len(), 6);
        assert_eq!(reqs[0].kind, SourceKind::CityRanking);
        assert_eq!(reqs[0].address, "http://localhost:5000/api/ranking-cidades");
        assert_eq!(reqs[4].kind, SourceKind::Correlation);
        assert_eq!(reqs[5].address, GEOMETRY_URL);
    }

    #[test]
    fn api_routes_need_a_base_url() {
        let config: DashboardConfig = serde_json::from_str(r#"{"baseUrl": null}"#).unwrap();
        let err = resolve_sources(&config, Path::new(".")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "the address /api/ranking-cidades is an API route but no baseUrl is configured"
        );

        let config: DashboardConfig = serde_json::from_str(
            r#"{"baseUrl": null, "sources": {"cityRanking": null, "allCities": "todas.json",
                "partyRanking": "partidos.json", "heatMap": "file:///srv/mapa.json",
                "correlation": null, "geometry": "rs.json"}}"#,
        )
        .unwrap();
        let reqs = resolve_sources(&config, Path::new("/data")).unwrap();
        let addresses: Vec<&str> = reqs.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec!["/data/todas.json", "/data/partidos.json", "/srv/mapa.json", "/data/rs.json"]
        );
    }

    #[test]
    fn addresses() {
        let root = PathBuf::from("/data/rs2024");
        assert_eq!(
            resolve_address("https://example.org/a.json", Some("http://x"), &root).unwrap(),
            "https://example.org/a.json"
        );
        assert_eq!(
            resolve_address("/api/mapa-calor", Some("http://x/"), &root).unwrap(),
            "http://x/api/mapa-calor"
        );
        assert_eq!(
            resolve_address("mapa.json", Some("http://x"), &root).unwrap(),
            "/data/rs2024/mapa.json"
        );
        assert_eq!(
            resolve_address("file://mapa.json", None, &root).unwrap(),
            "/data/rs2024/mapa.json"
        );
        assert_eq!(
            resolve_address("file:///tmp/mapa.json", None, &root).unwrap(),
            "/tmp/mapa.json"
        );
        assert!(resolve_address("/tmp/mapa.json", None, &root).is_err());
    }
}
