//! Descriptive statistics for report tables.
//!
//! The legacy tool showed a `describe()` panel over whichever table was
//! selected: per column, how many values, how many missing, and for
//! numeric columns the usual min/max/mean/median. Same here, computed
//! over the rendered table so it works for every dataset uniformly.

use serde::Serialize;

use crate::reports::Table;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Non-empty values.
    pub count: usize,
    /// Empty (NULL) values.
    pub missing: usize,
    pub distinct: usize,
    /// Present only when every non-empty value parses as a number.
    pub numeric: Option<NumericSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// Summarize every column of a table.
pub fn summarize(table: &Table) -> Vec<ColumnSummary> {
    (0..table.columns.len())
        .map(|i| {
            let values: Vec<&str> = table
                .rows
                .iter()
                .map(|row| row[i].as_str())
                .collect();
            summarize_column(&table.columns[i], &values)
        })
        .collect()
}

fn summarize_column(name: &str, values: &[&str]) -> ColumnSummary {
    let present: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    let missing = values.len() - present.len();

    let mut distinct: Vec<&str> = present.clone();
    distinct.sort_unstable();
    distinct.dedup();

    let numeric = numeric_summary(&present);

    ColumnSummary {
        column: name.to_string(),
        count: present.len(),
        missing,
        distinct: distinct.len(),
        numeric,
    }
}

fn numeric_summary(present: &[&str]) -> Option<NumericSummary> {
    if present.is_empty() {
        return None;
    }
    let mut numbers = Vec::with_capacity(present.len());
    for v in present {
        let n = v.parse::<f64>().ok()?;
        if !n.is_finite() {
            return None;
        }
        numbers.push(n);
    }
    numbers.sort_by(f64::total_cmp);

    let min = numbers[0];
    let max = numbers[numbers.len() - 1];
    let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
    let mid = numbers.len() / 2;
    let median = if numbers.len() % 2 == 0 {
        (numbers[mid - 1] + numbers[mid]) / 2.0
    } else {
        numbers[mid]
    };

    Some(NumericSummary { min, max, mean, median })
}
