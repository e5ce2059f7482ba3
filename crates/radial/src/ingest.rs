//! CSV ingestion for monthly precipitation series.
//!
//! Rows are `year,month,pr`. Columns are located by header name; a header
//! without those names falls back to the first three columns in that order.
//! Rows that fail to parse are discarded and counted, never coerced.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{Month, SeriesDataset};
use crate::error::IngestError;

const YEAR_COLUMN: &str = "year";
const MONTH_COLUMN: &str = "month";
const PRECIPITATION_COLUMN: &str = "pr";

/// Where the three fields live in each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    pub year: usize,
    pub month: usize,
    pub pr: usize,
    pub positional: bool,
}

impl ColumnLayout {
    pub const POSITIONAL: Self = Self {
        year: 0,
        month: 1,
        pr: 2,
        positional: true,
    };

    pub fn resolve(header: &StringRecord) -> Result<Self, IngestError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|column| column.trim().eq_ignore_ascii_case(name))
        };

        match (find(YEAR_COLUMN), find(MONTH_COLUMN), find(PRECIPITATION_COLUMN)) {
            (Some(year), Some(month), Some(pr)) => Ok(Self {
                year,
                month,
                pr,
                positional: false,
            }),
            _ if header.len() >= 3 => {
                warn!(
                    header = ?header.iter().collect::<Vec<_>>(),
                    "CSV header lacks year/month/pr names, reading columns by position"
                );
                Ok(Self::POSITIONAL)
            }
            _ => Err(IngestError::MissingColumns {
                found: header.len(),
            }),
        }
    }

    fn read_row(&self, row: &StringRecord) -> Option<(i32, Month, f64)> {
        let year = row.get(self.year)?.trim().parse::<i32>().ok()?;
        let month = row.get(self.month)?.trim().parse::<u8>().ok()?;
        let month = Month::from_number(month)?;
        let value = row.get(self.pr)?.trim().parse::<f64>().ok()?;
        value.is_finite().then_some((year, month, value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub accepted: usize,
    pub discarded: usize,
    pub layout: ColumnLayout,
}

pub fn parse_csv(text: &str) -> Result<(SeriesDataset, ParseReport), IngestError> {
    read_csv(text.as_bytes())
}

pub fn read_csv<R: Read>(reader: R) -> Result<(SeriesDataset, ParseReport), IngestError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let layout = ColumnLayout::resolve(csv_reader.headers()?)?;
    let mut dataset = SeriesDataset::new();
    let mut accepted = 0;
    let mut discarded = 0;

    for (line, record) in csv_reader.records().enumerate() {
        let row = match record {
            Ok(row) => row,
            Err(error) if error.is_io_error() => return Err(error.into()),
            Err(error) => {
                debug!(line = line + 2, %error, "discarding unreadable CSV row");
                discarded += 1;
                continue;
            }
        };

        if let Some((year, month, value)) = layout.read_row(&row) {
            dataset.insert(year, month, value);
            accepted += 1;
        } else {
            debug!(line = line + 2, row = ?row.iter().collect::<Vec<_>>(), "discarding invalid CSV row");
            discarded += 1;
        }
    }

    Ok((
        dataset,
        ParseReport {
            accepted,
            discarded,
            layout,
        },
    ))
}

pub fn read_csv_file(path: &Path) -> Result<(SeriesDataset, ParseReport), IngestError> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::Read {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(std::io::BufReader::new(file))
}

/// Normalised view over every series of one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    datasets: Vec<SeriesDataset>,
    global_max: f64,
    years: Vec<i32>,
}

impl ChartData {
    /// Datasets keep configuration order; that order is also draw order.
    pub fn from_datasets(datasets: Vec<SeriesDataset>) -> Self {
        let global_max = datasets
            .iter()
            .filter_map(SeriesDataset::max_value)
            .fold(0.0_f64, f64::max);

        let years = datasets
            .iter()
            .flat_map(SeriesDataset::years)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            datasets,
            global_max,
            years,
        }
    }

    pub fn datasets(&self) -> &[SeriesDataset] {
        &self.datasets
    }

    /// Radial normalisation denominator; zero when nothing parsed.
    pub const fn global_max(&self) -> f64 {
        self.global_max
    }

    /// Sorted, duplicate-free union of all series years.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_csv, ChartData, ColumnLayout};
    use crate::domain::Month;
    use crate::error::IngestError;

    const HISTORIC: &str = "\
year,month,pr
2000,1,0.004
2000,2,0.006
2000,7,0.012
2001,7,0.011
";

    #[test]
    fn parses_named_columns_in_any_order() {
        let text = "pr,month,year\n0.5,3,1999\n0.25,4,1999\n";
        let (dataset, report) = parse_csv(text).unwrap();

        assert!(!report.layout.positional);
        assert_eq!(report.accepted, 2);
        assert_eq!(dataset.year(1999).unwrap().get(Month::March), Some(0.5));
        assert_eq!(dataset.year(1999).unwrap().get(Month::April), Some(0.25));
    }

    #[test]
    fn unnamed_header_falls_back_to_positions() {
        let text = "y,m,precip,extra\n2010,6,1.5,x\n";
        let (dataset, report) = parse_csv(text).unwrap();

        assert_eq!(report.layout, ColumnLayout::POSITIONAL);
        assert_eq!(dataset.year(2010).unwrap().get(Month::June), Some(1.5));
    }

    #[test]
    fn narrow_header_is_rejected() {
        let error = parse_csv("year,pr\n2000,1.0\n").unwrap_err();
        assert!(matches!(error, IngestError::MissingColumns { found: 2 }));
    }

    #[test]
    fn invalid_rows_are_discarded_not_coerced() {
        let text = "\
year,month,pr
2000,1,0.5
abc,2,0.5
2000,x,0.5
2000,3,NaN
2000,13,0.5
2000,0,0.5
2000,4,
2000,5,inf
2000,6
2000,7,0.75
";
        let (dataset, report) = parse_csv(text).unwrap();

        assert_eq!(report.accepted, 2);
        assert_eq!(report.discarded, 8);
        let record = dataset.year(2000).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get(Month::July), Some(0.75));
    }

    #[test]
    fn blank_lines_and_crlf_are_tolerated() {
        let text = "year,month,pr\r\n2000,1,1.0\r\n\r\n2000,2,2.0\r\n";
        let (dataset, report) = parse_csv(text).unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.discarded, 0);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn parsing_is_idempotent() {
        let (first, first_report) = parse_csv(HISTORIC).unwrap();
        let (second, second_report) = parse_csv(HISTORIC).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_report, second_report);
    }

    #[test]
    fn global_max_spans_all_series() {
        let (historic, _) = parse_csv(HISTORIC).unwrap();
        let (future, _) = parse_csv("year,month,pr\n2050,8,0.02\n").unwrap();
        let data = ChartData::from_datasets(vec![historic, future]);

        assert!((data.global_max() - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn year_index_is_sorted_union_without_duplicates() {
        let (a, _) = parse_csv("year,month,pr\n2002,1,1\n2000,1,1\n2001,1,1\n").unwrap();
        let (b, _) = parse_csv("year,month,pr\n2001,2,1\n2003,1,1\n").unwrap();
        let data = ChartData::from_datasets(vec![a, b]);

        assert_eq!(data.years(), &[2000, 2001, 2002, 2003]);
        assert_eq!(data.first_year(), Some(2000));
        assert_eq!(data.last_year(), Some(2003));
    }

    #[test]
    fn no_valid_rows_leaves_zero_max_and_empty_index() {
        let (dataset, report) = parse_csv("year,month,pr\nfoo,bar,baz\n").unwrap();
        let data = ChartData::from_datasets(vec![dataset]);

        assert_eq!(report.discarded, 1);
        assert_eq!(data.global_max(), 0.0);
        assert!(data.is_empty());
    }
}
