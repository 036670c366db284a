//! Cross-dataset summary.
//!
//! [`MasterSummary::build`] is a pure function of the profiles it is given.
//! Profiles are put into dataset-id order first, so the summary does not
//! depend on the order datasets finished in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::analyzers::values::{mean, nearest_rank, pct, sort_floats};
use crate::config::ProfileConfig;
use crate::profile::{ColumnKind, DatasetProfile, ProfileStatus, YearRange};
use crate::table::DeclaredType;
use crate::warnings::QualityWarning;

/// Minimum non-null values for a text column to count as high-cardinality.
const HIGH_CARD_MIN_NON_NULL: usize = 200;
/// Maximum null percentage for a high-cardinality text column.
const HIGH_CARD_MAX_NULL_PCT: f64 = 50.0;
/// Minimum unique ratio for a high-cardinality text column.
const HIGH_CARD_MIN_UNIQUE_RATIO: f64 = 0.5;

/// Minimum non-null values for a high-uniqueness (likely identifier) column.
const HIGH_UNIQ_MIN_NON_NULL: usize = 50;
/// Maximum null percentage for a high-uniqueness column.
const HIGH_UNIQ_MAX_NULL_PCT: f64 = 30.0;
/// Minimum unique ratio for a high-uniqueness column.
const HIGH_UNIQ_MIN_RATIO: f64 = 0.98;
/// High-uniqueness columns listed per inventory entry.
const HIGH_UNIQ_LIMIT: usize = 8;

/// Null percentage from which a column counts as mostly missing.
const HIGH_MISSING_MIN_PCT: f64 = 80.0;
/// Mostly-missing columns kept in the summary.
const HIGH_MISSING_LIMIT: usize = 500;

/// Dataset counts and table sizes across the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunTotals {
    pub datasets_attempted: usize,
    pub profiled: usize,
    pub empty: usize,
    pub failed: usize,
    pub total_rows: usize,
    pub total_columns: usize,
}

/// One line of the dataset inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryEntry {
    pub id: String,
    pub dataset_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    pub source_path: String,
    pub status: ProfileStatus,
    pub rows: usize,
    pub columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_cell_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_row_pct: Option<f64>,
    pub sampled: bool,
    pub warnings: usize,
    /// Columns that look like identifiers, in column order.
    pub high_uniqueness_columns: Vec<String>,
}

impl InventoryEntry {
    fn from_profile(profile: &DatasetProfile) -> Self {
        let identity = &profile.identity;
        let overview = profile.overview.as_ref();
        Self {
            id: identity.id.clone(),
            dataset_name: identity.dataset_name.clone(),
            sheet_name: identity.sheet_name.clone(),
            source_path: identity.source_path.display().to_string(),
            status: profile.status.clone(),
            rows: overview.map_or(0, |o| o.rows),
            columns: overview.map_or(profile.columns.len(), |o| o.columns),
            missing_cell_pct: overview.map(|o| o.missing_cell_pct),
            duplicate_row_pct: overview.and_then(|o| o.duplicate_row_pct),
            sampled: profile.sampling.sampled,
            warnings: profile.warnings.len(),
            high_uniqueness_columns: high_uniqueness_columns(profile),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ProfileStatus::Failed { .. })
    }
}

/// Share of all columns with one declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DtypeShare {
    pub dtype: DeclaredType,
    pub count: usize,
    pub pct: f64,
}

/// Average, median and nearest-rank p90 of a per-dataset percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PctDistribution {
    pub datasets: usize,
    pub avg: f64,
    pub median: f64,
    pub p90: f64,
}

impl PctDistribution {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        sort_floats(&mut values);
        let avg = mean(&values)?;
        let p90 = nearest_rank(&values, 0.9)?;
        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
        Some(Self {
            datasets: values.len(),
            avg,
            median,
            p90,
        })
    }
}

/// Year span of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetCoverage {
    pub dataset_id: String,
    pub dataset_name: String,
    pub min_year: i32,
    pub max_year: i32,
}

/// Year spans per dataset and over the whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemporalCoverage {
    pub datasets: Vec<DatasetCoverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<YearRange>,
}

/// A warning together with the dataset it was raised on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributedWarning {
    pub dataset_id: String,
    pub dataset_name: String,
    #[serde(flatten)]
    pub warning: QualityWarning,
}

/// A column with missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingnessHotspot {
    pub dataset_id: String,
    pub dataset_name: String,
    pub column: String,
    pub null_count: usize,
    pub null_pct: f64,
}

/// A column whose non-null values are all identical.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantColumn {
    pub dataset_id: String,
    pub dataset_name: String,
    pub column: String,
    pub dtype: DeclaredType,
}

/// A text column with many distinct values relative to its size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighCardinalityColumn {
    pub dataset_id: String,
    pub dataset_name: String,
    pub column: String,
    pub non_null: usize,
    pub unique_count: usize,
    pub unique_ratio: f64,
    pub null_pct: f64,
}

/// Summary over every dataset of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterSummary {
    pub totals: RunTotals,
    /// Rows descending, then dataset id.
    pub inventory: Vec<InventoryEntry>,
    /// Count descending, then type name.
    pub dtype_composition: Vec<DtypeShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_cell_pct: Option<PctDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_row_pct: Option<PctDistribution>,
    pub temporal_coverage: TemporalCoverage,
    pub warnings: Vec<AttributedWarning>,
    /// Null percentage descending, capped by `hotspot_limit`.
    pub missingness_hotspots: Vec<MissingnessHotspot>,
    /// Columns at least 80% missing, in hotspot order.
    pub high_missing_columns: Vec<MissingnessHotspot>,
    pub constant_columns: Vec<ConstantColumn>,
    pub high_cardinality_text: Vec<HighCardinalityColumn>,
}

impl MasterSummary {
    /// Builds the summary. Identical profile sets give identical summaries.
    ///
    /// # Example
    ///
    /// ```rust
    /// use term_describe::aggregate::MasterSummary;
    /// use term_describe::config::ProfileConfig;
    /// use term_describe::identity::DatasetIdentity;
    /// use term_describe::profile::DatasetProfile;
    ///
    /// let failed = DatasetProfile::failed(DatasetIdentity::new("/data/x.csv", None), "bad file");
    /// let summary = MasterSummary::build(&[failed], &ProfileConfig::default());
    /// assert_eq!(summary.totals.failed, 1);
    /// assert!(summary.inventory[0].is_failed());
    /// ```
    pub fn build(profiles: &[DatasetProfile], config: &ProfileConfig) -> Self {
        let mut ordered: Vec<&DatasetProfile> = profiles.iter().collect();
        ordered.sort_by(|a, b| by_identity(a, b));
        let missing = missing_columns(&ordered);

        let summary = Self {
            totals: totals(&ordered),
            inventory: inventory(&ordered),
            dtype_composition: dtype_composition(&ordered),
            missing_cell_pct: PctDistribution::from_values(
                profiled(&ordered)
                    .filter_map(|p| p.overview.as_ref().map(|o| o.missing_cell_pct))
                    .collect(),
            ),
            duplicate_row_pct: PctDistribution::from_values(
                profiled(&ordered)
                    .filter_map(|p| p.overview.as_ref().and_then(|o| o.duplicate_row_pct))
                    .collect(),
            ),
            temporal_coverage: temporal_coverage(&ordered),
            warnings: attributed_warnings(&ordered),
            missingness_hotspots: missing.iter().take(config.hotspot_limit).cloned().collect(),
            high_missing_columns: missing
                .iter()
                .filter(|spot| spot.null_pct >= HIGH_MISSING_MIN_PCT)
                .take(HIGH_MISSING_LIMIT)
                .cloned()
                .collect(),
            constant_columns: constant_columns(&ordered),
            high_cardinality_text: high_cardinality_text(&ordered),
        };

        debug!(
            datasets = summary.totals.datasets_attempted,
            hotspots = summary.missingness_hotspots.len(),
            warnings = summary.warnings.len(),
            "Built master summary"
        );
        summary
    }
}

fn by_identity(a: &DatasetProfile, b: &DatasetProfile) -> Ordering {
    a.identity
        .id
        .cmp(&b.identity.id)
        .then_with(|| a.identity.source_path.cmp(&b.identity.source_path))
        .then_with(|| a.identity.sheet_name.cmp(&b.identity.sheet_name))
}

fn profiled<'a>(
    profiles: &'a [&'a DatasetProfile],
) -> impl Iterator<Item = &'a DatasetProfile> + 'a {
    profiles
        .iter()
        .copied()
        .filter(|p| p.status == ProfileStatus::Profiled)
}

fn totals(profiles: &[&DatasetProfile]) -> RunTotals {
    let mut totals = RunTotals {
        datasets_attempted: profiles.len(),
        ..RunTotals::default()
    };
    for profile in profiles {
        match profile.status {
            ProfileStatus::Profiled => totals.profiled += 1,
            ProfileStatus::Empty => totals.empty += 1,
            ProfileStatus::Failed { .. } => totals.failed += 1,
        }
        if let Some(overview) = &profile.overview {
            totals.total_rows += overview.rows;
            totals.total_columns += overview.columns;
        }
    }
    totals
}

fn inventory(profiles: &[&DatasetProfile]) -> Vec<InventoryEntry> {
    let mut entries: Vec<InventoryEntry> = profiles
        .iter()
        .map(|p| InventoryEntry::from_profile(p))
        .collect();
    entries.sort_by(|a, b| b.rows.cmp(&a.rows).then_with(|| a.id.cmp(&b.id)));
    entries
}

fn dtype_composition(profiles: &[&DatasetProfile]) -> Vec<DtypeShare> {
    let mut counts: BTreeMap<&'static str, (DeclaredType, usize)> = BTreeMap::new();
    for column in profiles.iter().flat_map(|p| &p.columns) {
        counts
            .entry(column.dtype.as_str())
            .or_insert((column.dtype, 0))
            .1 += 1;
    }
    let total: usize = counts.values().map(|(_, n)| n).sum();

    let mut shares: Vec<DtypeShare> = counts
        .into_values()
        .map(|(dtype, count)| DtypeShare {
            dtype,
            count,
            pct: pct(count, total),
        })
        .collect();
    shares.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.dtype.as_str().cmp(b.dtype.as_str()))
    });
    shares
}

fn temporal_coverage(profiles: &[&DatasetProfile]) -> TemporalCoverage {
    let datasets: Vec<DatasetCoverage> = profiles
        .iter()
        .filter_map(|p| {
            p.temporal_coverage.map(|range| DatasetCoverage {
                dataset_id: p.identity.id.clone(),
                dataset_name: p.identity.dataset_name.clone(),
                min_year: range.min_year,
                max_year: range.max_year,
            })
        })
        .collect();
    let global = profiles
        .iter()
        .filter_map(|p| p.temporal_coverage)
        .reduce(YearRange::union);
    TemporalCoverage { datasets, global }
}

fn attributed_warnings(profiles: &[&DatasetProfile]) -> Vec<AttributedWarning> {
    profiles
        .iter()
        .flat_map(|p| {
            p.warnings.iter().map(move |w| AttributedWarning {
                dataset_id: p.identity.id.clone(),
                dataset_name: p.identity.dataset_name.clone(),
                warning: w.clone(),
            })
        })
        .collect()
}

/// Every column with missing values, null percentage descending.
fn missing_columns(profiles: &[&DatasetProfile]) -> Vec<MissingnessHotspot> {
    let mut spots: Vec<MissingnessHotspot> = profiles
        .iter()
        .flat_map(|p| {
            p.columns
                .iter()
                .filter(|c| c.null_pct > 0.0)
                .map(move |c| MissingnessHotspot {
                    dataset_id: p.identity.id.clone(),
                    dataset_name: p.identity.dataset_name.clone(),
                    column: c.name.clone(),
                    null_count: c.null_count,
                    null_pct: c.null_pct,
                })
        })
        .collect();
    spots.sort_by(|a, b| {
        b.null_pct
            .total_cmp(&a.null_pct)
            .then_with(|| a.dataset_id.cmp(&b.dataset_id))
            .then_with(|| a.column.cmp(&b.column))
    });
    spots
}

fn high_uniqueness_columns(profile: &DatasetProfile) -> Vec<String> {
    profile
        .columns
        .iter()
        .filter(|c| c.non_null >= HIGH_UNIQ_MIN_NON_NULL && c.null_pct <= HIGH_UNIQ_MAX_NULL_PCT)
        .filter(|c| c.unique_ratio().is_some_and(|r| r >= HIGH_UNIQ_MIN_RATIO))
        .map(|c| c.name.clone())
        .take(HIGH_UNIQ_LIMIT)
        .collect()
}

fn constant_columns(profiles: &[&DatasetProfile]) -> Vec<ConstantColumn> {
    profiles
        .iter()
        .flat_map(|p| {
            p.columns
                .iter()
                .filter(|c| c.unique_count == Some(1))
                .map(move |c| ConstantColumn {
                    dataset_id: p.identity.id.clone(),
                    dataset_name: p.identity.dataset_name.clone(),
                    column: c.name.clone(),
                    dtype: c.dtype,
                })
        })
        .collect()
}

fn high_cardinality_text(profiles: &[&DatasetProfile]) -> Vec<HighCardinalityColumn> {
    let mut columns: Vec<HighCardinalityColumn> = profiles
        .iter()
        .flat_map(|p| {
            p.columns
                .iter()
                .filter(|c| {
                    c.dtype == DeclaredType::String
                        && matches!(c.kind, ColumnKind::Categorical | ColumnKind::Text)
                        && c.non_null >= HIGH_CARD_MIN_NON_NULL
                        && c.null_pct <= HIGH_CARD_MAX_NULL_PCT
                })
                .filter_map(move |c| {
                    let unique_count = c.unique_count?;
                    let unique_ratio = c.unique_ratio()?;
                    (unique_ratio >= HIGH_CARD_MIN_UNIQUE_RATIO).then(|| HighCardinalityColumn {
                        dataset_id: p.identity.id.clone(),
                        dataset_name: p.identity.dataset_name.clone(),
                        column: c.name.clone(),
                        non_null: c.non_null,
                        unique_count,
                        unique_ratio,
                        null_pct: c.null_pct,
                    })
                })
        })
        .collect();
    columns.sort_by(|a, b| {
        b.unique_ratio
            .total_cmp(&a.unique_ratio)
            .then_with(|| a.dataset_id.cmp(&b.dataset_id))
            .then_with(|| a.column.cmp(&b.column))
    });
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ProfileAssembler;
    use crate::identity::DatasetIdentity;
    use crate::table::Table;
    use arrow::array::{ArrayRef, Int64Array, StringArray};
    use std::sync::Arc;

    fn profile_of(name: &str, columns: Vec<(&str, ArrayRef)>) -> DatasetProfile {
        let table =
            Table::from_columns(DatasetIdentity::new(format!("/data/{name}.csv"), None), columns)
                .unwrap();
        ProfileAssembler::new(ProfileConfig::default())
            .unwrap()
            .profile(&table)
    }

    fn sample_profiles() -> Vec<DatasetProfile> {
        vec![
            profile_of(
                "small",
                vec![
                    ("id", Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef),
                    (
                        "tag",
                        Arc::new(StringArray::from(vec![Some("x"), None, Some("x")])) as ArrayRef,
                    ),
                ],
            ),
            profile_of(
                "big",
                vec![(
                    "n",
                    Arc::new(Int64Array::from_iter((0..10).map(|i| (i % 4 != 0).then_some(i))))
                        as ArrayRef,
                )],
            ),
            DatasetProfile::failed(DatasetIdentity::new("/data/broken.csv", None), "bad bytes"),
        ]
    }

    #[test]
    fn test_totals_and_inventory() {
        let summary = MasterSummary::build(&sample_profiles(), &ProfileConfig::default());

        assert_eq!(summary.totals.datasets_attempted, 3);
        assert_eq!(summary.totals.profiled, 2);
        assert_eq!(summary.totals.failed, 1);
        assert_eq!(summary.totals.total_rows, 13);
        assert_eq!(summary.totals.total_columns, 3);

        let names: Vec<_> = summary
            .inventory
            .iter()
            .map(|e| e.dataset_name.as_str())
            .collect();
        assert_eq!(names, vec!["big", "small", "broken"]);
        assert!(summary.inventory[2].is_failed());
    }

    #[test]
    fn test_dtype_composition_order() {
        let summary = MasterSummary::build(&sample_profiles(), &ProfileConfig::default());
        let dtypes: Vec<_> = summary
            .dtype_composition
            .iter()
            .map(|s| (s.dtype, s.count))
            .collect();
        assert_eq!(
            dtypes,
            vec![(DeclaredType::Integer, 2), (DeclaredType::String, 1)]
        );
    }

    #[test]
    fn test_hotspots_sorted_and_capped() {
        let profiles = sample_profiles();
        let summary = MasterSummary::build(&profiles, &ProfileConfig::default());
        let spots: Vec<_> = summary
            .missingness_hotspots
            .iter()
            .map(|h| h.column.as_str())
            .collect();
        assert_eq!(spots, vec!["tag", "n"]);

        let config = ProfileConfig::builder().hotspot_limit(1).build().unwrap();
        assert_eq!(MasterSummary::build(&profiles, &config).missingness_hotspots.len(), 1);
    }

    #[test]
    fn test_missingness_distribution_over_profiled_only() {
        let summary = MasterSummary::build(&sample_profiles(), &ProfileConfig::default());
        let dist = summary.missing_cell_pct.unwrap();
        assert_eq!(dist.datasets, 2);
        assert!(dist.p90 >= dist.median);
    }

    #[test]
    fn test_constant_columns() {
        let summary = MasterSummary::build(&sample_profiles(), &ProfileConfig::default());
        assert_eq!(summary.constant_columns.len(), 1);
        assert_eq!(summary.constant_columns[0].column, "tag");
    }

    #[test]
    fn test_order_independent() {
        let profiles = sample_profiles();
        let mut reversed = profiles.clone();
        reversed.reverse();
        let config = ProfileConfig::default();

        let a = serde_json::to_string(&MasterSummary::build(&profiles, &config)).unwrap();
        let b = serde_json::to_string(&MasterSummary::build(&reversed, &config)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_high_uniqueness_columns_per_dataset() {
        let ids: ArrayRef = Arc::new(Int64Array::from_iter_values(0..60));
        let codes: ArrayRef = Arc::new(StringArray::from_iter_values(
            (0..60).map(|i| format!("code-{}", i % 3)),
        ));
        let few: ArrayRef = Arc::new(Int64Array::from_iter_values(0..10));
        let profiles = vec![
            profile_of("registry", vec![("id", ids), ("code", codes)]),
            profile_of("tiny", vec![("id", few)]),
        ];
        let summary = MasterSummary::build(&profiles, &ProfileConfig::default());

        let entry = |name: &str| {
            summary
                .inventory
                .iter()
                .find(|e| e.dataset_name == name)
                .unwrap()
                .high_uniqueness_columns
                .clone()
        };
        assert_eq!(entry("registry"), vec!["id".to_string()]);
        assert!(entry("tiny").is_empty());
    }

    #[test]
    fn test_high_missing_columns() {
        let mostly_null: ArrayRef = Arc::new(Int64Array::from_iter(
            (0..10).map(|i| (i == 0).then_some(i)),
        ));
        let half_null: ArrayRef = Arc::new(Int64Array::from_iter(
            (0..10).map(|i| (i % 2 == 0).then_some(i)),
        ));
        let profiles = vec![profile_of(
            "sparse",
            vec![("mostly_null", mostly_null), ("half_null", half_null)],
        )];
        let summary = MasterSummary::build(&profiles, &ProfileConfig::default());

        let columns: Vec<_> = summary
            .high_missing_columns
            .iter()
            .map(|c| (c.column.as_str(), c.null_pct))
            .collect();
        assert_eq!(columns, vec![("mostly_null", 90.0)]);
        assert_eq!(summary.missingness_hotspots.len(), 2);

        let config = ProfileConfig::builder().hotspot_limit(1).build().unwrap();
        let capped = MasterSummary::build(&profiles, &config);
        assert_eq!(capped.missingness_hotspots.len(), 1);
        assert_eq!(capped.high_missing_columns.len(), 1);
    }

    #[test]
    fn test_pct_distribution() {
        let dist = PctDistribution::from_values(vec![40.0, 10.0, 20.0, 30.0]).unwrap();
        assert_eq!(dist.avg, 25.0);
        assert_eq!(dist.median, 25.0);
        assert_eq!(dist.p90, 40.0);
        assert!(PctDistribution::from_values(Vec::new()).is_none());
    }

    #[test]
    fn test_empty_input() {
        let summary = MasterSummary::build(&[], &ProfileConfig::default());
        assert_eq!(summary.totals, RunTotals::default());
        assert!(summary.inventory.is_empty());
        assert!(summary.temporal_coverage.global.is_none());
    }
}
