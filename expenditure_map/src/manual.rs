/*!

This is the long-form manual for `expenditure_map` and the `dashboard` program.

## Sources

The dashboard is assembled from six JSON documents. Four of them are required.

### `allCities` (required)

The complete listing of municipalities with their campaign expenditure. It is used
for the headline figures and for the searchable table.

```json
[{"nome_municipio": "Porto Alegre", "valor_despesa": 18234567.12}]
```

An `id_municipio` key may be present as well.

### `partyRanking` (required)

The parties, biggest spender first. Only the first entry is used, as the top
party. The order is trusted: it is never sorted again.

```json
[{"sigla_partido": "PL", "valor_despesa": 9876543.21}]
```

### `heatMap` (required)

The expenditure keyed by municipality id, joined with the map.

```json
[{"id_municipio": "4314902", "valor_despesa": 18234567.12}]
```

### `geometry` (required)

A GeoJSON `FeatureCollection`. Each feature must have `properties.id` and
`properties.name`. The ids must use the same codes as `heatMap`.

### `cityRanking` (optional)

The municipalities shown on the ranking chart, in the same shape as `allCities`.
When it is not configured, the chart shows the first rows of the table.

### `correlation` (optional)

Expenditure against turnout, for the scatter chart.

```json
[{"nome_municipio": "Porto Alegre", "gasto_total": 18234567.12, "taxa_comparecimento": 78.3}]
```

All the keys also accept an English name: `municipality_name`, `total_expenditure`,
`municipality_id`, `party_code`, `turnout_rate`. Numbers may be written as JSON
strings. Negative expenditures, turnouts outside of 0 to 100, and missing or
non-numeric values reject the whole document: no row is ever dropped.

## The map

Each municipality is shaded according to its expenditure divided by the largest
expenditure on the map:

| scale       | tier    | color     |
|-------------|---------|-----------|
| > 0.8       | `Tier7` | `#800026` |
| > 0.6       | `Tier6` | `#BD0026` |
| > 0.4       | `Tier5` | `#E31A1C` |
| > 0.2       | `Tier4` | `#FC4E2A` |
| > 0.1       | `Tier3` | `#FD8D3C` |
| > 0.05      | `Tier2` | `#FEB24C` |
| > 0         | `Tier1` | `#FFEDA0` |
| 0           | `Tier0` | `#FFFFFF` |

A municipality missing from `heatMap` is shown in `Tier0`, like a municipality that
did not spend anything. The two cases cannot be told apart on the map.

## The table

The table lists all the municipalities, by decreasing expenditure. Municipalities
with the same expenditure keep the order of `allCities`. A query shows the rows
whose name contains it, ignoring case.

*/
