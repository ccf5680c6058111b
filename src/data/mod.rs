/// Data layer: core types, loading, cleaning, filtering and aggregates.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RawTable (schema inferred)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean   │  rename, dedup, dates, billing, stay, categories → Table
///   └──────────┘
///        │   (memoized per source by `cache::Loader`)
///        ▼
///   ┌──────────┐
///   │  filter  │  set-membership on three columns → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats   │  metrics, describe, histograms, group means, counts
///   └──────────┘
/// ```

pub mod cache;
pub mod clean;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
