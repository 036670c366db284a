//! Date parsing, typed temporal ranges and year-valued columns.

use arrow::array::{Array, ArrayRef, Date32Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::temporal_conversions::date32_to_datetime;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyzers::errors::{AnalyzerError, AnalyzerResult};
use crate::profile::{TemporalRange, TemporalSource, YearRange};

/// Datetime formats, tried before the date-only formats.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Date-only formats in priority order.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y", "%d/%m/%Y"];

/// Inclusive bounds for integer year columns.
const YEAR_MIN: i64 = 1000;
const YEAR_MAX: i64 = 2999;

static YEAR_NAME: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)(year|jahr)").expect("valid year regex")
});

/// All supported formats in the order they are tried.
pub fn formats() -> impl Iterator<Item = &'static str> {
    DATETIME_FORMATS.into_iter().chain(DATE_FORMATS)
}

/// Parses `value` under the first matching format.
pub fn parse_date(value: &str) -> Option<(NaiveDate, &'static str)> {
    let value = value.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some((dt.date(), format));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some((date, format));
        }
    }
    None
}

fn range_of(
    dates: impl IntoIterator<Item = NaiveDate>,
    source: TemporalSource,
) -> Option<TemporalRange> {
    let mut count = 0;
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for date in dates {
        count += 1;
        bounds = Some(match bounds {
            None => (date, date),
            Some((lo, hi)) => (lo.min(date), hi.max(date)),
        });
    }
    let (min, max) = bounds?;
    Some(TemporalRange {
        source,
        values_parsed: count,
        min_year: min.year(),
        max_year: max.year(),
        min_date: Some(min.format("%Y-%m-%d").to_string()),
        max_date: Some(max.format("%Y-%m-%d").to_string()),
    })
}

/// Range of a string column when at least `min_ratio` of its values parse.
///
/// The reported format is the one that parsed the most values, ties going to
/// the earlier format.
pub fn detect_string_dates(values: &[String], min_ratio: f64) -> Option<TemporalRange> {
    if values.is_empty() {
        return None;
    }

    let mut per_format = [0usize; DATETIME_FORMATS.len() + DATE_FORMATS.len()];
    let mut dates = Vec::with_capacity(values.len());
    for value in values {
        if let Some((date, format)) = parse_date(value) {
            if let Some(idx) = formats().position(|f| f == format) {
                per_format[idx] += 1;
            }
            dates.push(date);
        }
    }

    if (dates.len() as f64 / values.len() as f64) < min_ratio {
        return None;
    }

    let mut best = 0;
    for (idx, count) in per_format.iter().enumerate() {
        if *count > per_format[best] {
            best = idx;
        }
    }
    let format = formats().nth(best)?.to_string();
    range_of(dates, TemporalSource::Parsed { format })
}

/// Range of a typed date or timestamp column.
pub fn typed_range(array: &ArrayRef) -> AnalyzerResult<Option<TemporalRange>> {
    let days = cast(array, &DataType::Date32)?;
    let days = days
        .as_any()
        .downcast_ref::<Date32Array>()
        .ok_or_else(|| AnalyzerError::invalid_data("cast to Date32 produced another array type"))?;

    let dates = days
        .iter()
        .flatten()
        .filter_map(|d| date32_to_datetime(d).map(|dt| dt.date()));
    Ok(range_of(dates, TemporalSource::Typed))
}

/// Range of an integer column that holds calendar years.
///
/// The column name must mention a year and every value must lie in
/// `1000..=2999`.
pub fn detect_year_column(name: &str, values: &[f64]) -> Option<TemporalRange> {
    if values.is_empty() || !YEAR_NAME.is_match(name) {
        return None;
    }

    let mut years = Vec::with_capacity(values.len());
    for &value in values {
        if value.fract() != 0.0 {
            return None;
        }
        let year = value as i64;
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return None;
        }
        years.push(year as i32);
    }

    let min_year = years.iter().copied().min()?;
    let max_year = years.iter().copied().max()?;
    Some(TemporalRange {
        source: TemporalSource::YearColumn,
        values_parsed: years.len(),
        min_year,
        max_year,
        min_date: None,
        max_date: None,
    })
}

/// Dataset coverage: min and max year across all temporal column ranges.
pub fn coverage<'a>(ranges: impl IntoIterator<Item = &'a TemporalRange>) -> Option<YearRange> {
    ranges
        .into_iter()
        .map(|r| YearRange {
            min_year: r.min_year,
            max_year: r.max_year,
        })
        .reduce(YearRange::union)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::TimestampSecondArray;
    use std::sync::Arc;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(
            parse_date("2024-03-01T10:20:30").map(|(_, f)| f),
            Some("%Y-%m-%dT%H:%M:%S%.f")
        );
        assert_eq!(
            parse_date("2024-03-01 10:20:30.5").map(|(_, f)| f),
            Some("%Y-%m-%d %H:%M:%S%.f")
        );
        assert_eq!(parse_date("2024-03-01").map(|(_, f)| f), Some("%Y-%m-%d"));
        assert_eq!(parse_date("01.03.2024").map(|(_, f)| f), Some("%d.%m.%Y"));
        // Ambiguous day/month resolves to US order first
        let (date, format) = parse_date("03/04/2024").unwrap();
        assert_eq!(format, "%m/%d/%Y");
        assert_eq!(date.month(), 3);
        // Only valid as day-first
        assert_eq!(parse_date("25/12/2024").map(|(_, f)| f), Some("%d/%m/%Y"));
        assert!(parse_date("not a date").is_none());
    }

    #[test]
    fn test_string_dates_above_ratio() {
        let mut values = strings(&["2020-01-05", "2021-06-30", "2019-12-31"]);
        values.extend(std::iter::repeat_n("2020-02-02".to_string(), 7));
        let range = detect_string_dates(&values, 0.9).unwrap();
        assert_eq!(range.min_year, 2019);
        assert_eq!(range.max_year, 2021);
        assert_eq!(range.min_date.as_deref(), Some("2019-12-31"));
        assert_eq!(
            range.source,
            TemporalSource::Parsed {
                format: "%Y-%m-%d".to_string()
            }
        );
    }

    #[test]
    fn test_string_dates_below_ratio() {
        let values = strings(&["2020-01-05", "hello", "world"]);
        assert!(detect_string_dates(&values, 0.9).is_none());
    }

    #[test]
    fn test_typed_timestamp_range() {
        // 2001-09-09 and 2033-05-18
        let array: ArrayRef = Arc::new(TimestampSecondArray::from(vec![
            Some(1_000_000_000),
            None,
            Some(2_000_000_000),
        ]));
        let range = typed_range(&array).unwrap().unwrap();
        assert_eq!(range.min_year, 2001);
        assert_eq!(range.max_year, 2033);
        assert_eq!(range.values_parsed, 2);
        assert_eq!(range.source, TemporalSource::Typed);
    }

    #[test]
    fn test_year_column() {
        let range = detect_year_column("Publication Year", &[1999.0, 2005.0, 2024.0]).unwrap();
        assert_eq!(range.min_year, 1999);
        assert_eq!(range.max_year, 2024);
        assert!(range.min_date.is_none());

        assert!(detect_year_column("count", &[1999.0]).is_none());
        assert!(detect_year_column("year", &[1999.0, 12.0]).is_none());
        assert!(detect_year_column("jahr", &[1999.5]).is_none());
    }

    #[test]
    fn test_coverage_union() {
        let a = detect_year_column("year", &[2001.0, 2003.0]).unwrap();
        let b = detect_year_column("year", &[1995.0, 2002.0]).unwrap();
        assert_eq!(
            coverage([&a, &b]),
            Some(YearRange {
                min_year: 1995,
                max_year: 2003
            })
        );
        assert_eq!(coverage(std::iter::empty()), None);
    }
}
