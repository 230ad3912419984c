//! Разведочный анализ: размер, пропуски, describe()

use std::fmt;

use serde::Serialize;

use crate::types::{Column, CustomerRecord, Dataset, ALL_COLUMNS};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: Column,
    pub count: usize,
    pub mean: f64,
    /// Выборочное (ddof = 1); NaN при count < 2
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Строка краткой сводки: колонка, число непустых значений, тип
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub non_null: usize,
    pub dtype: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub info: Vec<ColumnInfo>,
    pub null_counts: Vec<(&'static str, usize)>,
    pub stats: Vec<ColumnStats>,
}

pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    let (rows, columns) = dataset.shape();

    let null_counts: Vec<(&'static str, usize)> = ALL_COLUMNS
        .iter()
        .map(|&name| {
            let nulls = dataset
                .records()
                .iter()
                .filter(|r| is_null(r, name))
                .count();
            (name, nulls)
        })
        .collect();

    let info = null_counts
        .iter()
        .map(|&(name, nulls)| ColumnInfo {
            name,
            non_null: rows - nulls,
            dtype: if is_numeric(name) { "float64" } else { "object" },
        })
        .collect();

    let stats = Column::NUMERIC
        .iter()
        .filter_map(|&column| {
            let values: Vec<f64> = dataset.column(column).into_iter().flatten().collect();
            describe(column, values)
        })
        .collect();

    DatasetSummary {
        rows,
        columns,
        info,
        null_counts,
        stats,
    }
}

fn is_numeric(name: &str) -> bool {
    Column::NUMERIC.iter().any(|c| c.name() == name)
}

fn is_null(record: &CustomerRecord, name: &str) -> bool {
    match name {
        "Customer Name" => record.customer_name.is_empty(),
        "Customer e-mail" => record.customer_email.is_empty(),
        "Country" => record.country.is_empty(),
        _ => Column::NUMERIC
            .iter()
            .find(|c| c.name() == name)
            .map_or(false, |c| c.value(record).is_none()),
    }
}

fn describe(column: Column, mut values: Vec<f64>) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count < 2 {
        f64::NAN
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    };

    Some(ColumnStats {
        column,
        count,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Линейная интерполяция по отсортированным значениям
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of rows: {}", self.rows)?;
        writeln!(f, "Number of columns: {}", self.columns)?;

        writeln!(f, "\nConcise summary:")?;
        writeln!(f, "RangeIndex: {} entries, 0 to {}", self.rows, self.rows.saturating_sub(1))?;
        writeln!(f, "{:>3}  {:<22}{:<16}{}", "#", "Column", "Non-Null Count", "Dtype")?;
        for (i, c) in self.info.iter().enumerate() {
            writeln!(f, "{:>3}  {:<22}{:<16}{}", i, c.name, format!("{} non-null", c.non_null), c.dtype)?;
        }

        writeln!(f, "\nNull values:")?;
        for (name, nulls) in &self.null_counts {
            writeln!(f, "{:<22}{:>6}", name, nulls)?;
        }

        writeln!(f, "\nOverall statistics:")?;
        write!(f, "{:<8}", "")?;
        for s in &self.stats {
            write!(f, "{:>22}", s.column.name())?;
        }
        writeln!(f)?;

        let rows: [(&str, fn(&ColumnStats) -> f64); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.q25),
            ("50%", |s| s.median),
            ("75%", |s| s.q75),
            ("max", |s| s.max),
        ];
        for (label, get) in rows {
            write!(f, "{:<8}", label)?;
            for s in &self.stats {
                write!(f, "{:>22.6}", get(s))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Печатает строки в табличном виде (head / tail)
pub fn format_records(records: &[CustomerRecord]) -> String {
    let mut out = ALL_COLUMNS.join(" | ");
    for r in records {
        let cell = |v: Option<f64>| v.map_or_else(|| "NaN".to_string(), |v| v.to_string());
        out.push('\n');
        out.push_str(&format!(
            "{} | {} | {} | {} | {} | {} | {} | {} | {}",
            r.customer_name,
            r.customer_email,
            r.country,
            cell(r.gender),
            cell(r.age),
            cell(r.annual_salary),
            cell(r.credit_card_debt),
            cell(r.net_worth),
            cell(r.car_purchase_amount),
        ));
    }
    out
}
