use crate::config::PIECE_LENGTH_THRESHOLDS;

/// Table-based piece-size selection, kept for CLI parity with the
/// tracker-oriented heuristics some tools historically produced. The
/// default auto-selection used by the driver is
/// [`crate::models::FileStorage::auto_piece_size`] instead; this one is
/// reachable via `--piece-size-algorithm mktorrent-compatible`.
pub fn calculate_piece_length_mktorrent_compatible(total_size: u64) -> u32 {
    for (max_size, power) in PIECE_LENGTH_THRESHOLDS.iter() {
        if total_size <= *max_size {
            return *power;
        }
    }
    23
}
