//! Merging of primary and secondary provider history.

use crate::types::Series;

/// Merge two optional series into one gap-free series.
///
/// Empty series count as absent. With both present the result is the union by
/// timestamp, sorted ascending, with the primary bar kept on collision.
pub fn reconcile(primary: Option<Series>, secondary: Option<Series>) -> Option<Series> {
    let primary = primary.filter(|s| !s.is_empty());
    let secondary = secondary.filter(|s| !s.is_empty());

    match (primary, secondary) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only),
        (Some(primary), Some(secondary)) => {
            let mut bars = primary.into_bars();
            bars.extend(secondary.into_bars());
            Some(Series::from_bars(bars))
        }
    }
}

/// Whether the secondary provider should be asked for this timeframe. Only
/// valid bars count toward the lookback.
pub fn needs_secondary(primary: Option<&Series>, min_lookback: usize) -> bool {
    primary.map_or(true, |s| s.bars().iter().filter(|b| b.is_valid()).count() < min_lookback)
}
