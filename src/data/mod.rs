/// Data layer: core types, loading, filtering and statistics.
///
/// Architecture:
/// ```text
///   LME_*.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  detect date/price columns, parse day-first → PriceTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ PriceTable  │  Vec<PriceRecord> sorted by date, passthrough columns
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date range ∧ month ∧ year → new PriceTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  count / mean / min / max
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
