//! A sorted and searchable view over the municipalities.

use log::debug;
use serde::Serialize;

use crate::config::{Amount, MunicipalityExpenditure};

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct IndexedRow {
    pub municipality_name: String,
    pub total_expenditure: Amount,
    #[serde(skip)]
    folded_name: String,
}

impl IndexedRow {
    fn matches(&self, folded_query: &str) -> bool {
        self.folded_name.contains(folded_query)
    }
}

/// The rows of the municipality table, by decreasing expenditure.
///
/// Rows with the same expenditure keep the order of the input.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RowIndex {
    rows: Vec<IndexedRow>,
}

fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

impl RowIndex {
    pub fn build(records: &[MunicipalityExpenditure]) -> RowIndex {
        let mut rows: Vec<IndexedRow> = records
            .iter()
            .map(|r| IndexedRow {
                municipality_name: r.municipality_name.clone(),
                total_expenditure: r.total_expenditure,
                folded_name: fold_case(&r.municipality_name),
            })
            .collect();
        // sort_by is stable.
        rows.sort_by(|a, b| b.total_expenditure.cmp(&a.total_expenditure));
        debug!("RowIndex::build: {} rows", rows.len());
        RowIndex { rows }
    }

    pub fn rows(&self) -> &[IndexedRow] {
        &self.rows
    }

    /// For each row, in order, whether it is shown for this query.
    ///
    /// The empty query shows everything.
    pub fn visibility(&self, query: &str) -> Vec<bool> {
        let folded_query = fold_case(query);
        self.rows.iter().map(|r| r.matches(&folded_query)).collect()
    }

    /// The visible rows for this query, in sorted order.
    pub fn filter<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a IndexedRow> + 'a {
        let folded_query = fold_case(query);
        self.rows.iter().filter(move |r| r.matches(&folded_query))
    }

    /// The first `n` rows.
    pub fn top(&self, n: usize) -> &[IndexedRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}
