//! Typing speed estimation from input event timestamps

const NANOS_PER_MINUTE: u64 = 60_000_000_000;

/// Estimates a characters-per-minute style speed from event times in nanoseconds
///
/// Deltas are taken between consecutive events walking back from the newest
/// entry, stopping before the delta into the second event. Their sum is
/// averaged over the total number of timestamps, not the number of deltas,
/// which keeps results comparable with earlier clients of this metric.
/// Returns 0 when there is nothing to measure or the average interval is zero.
pub fn estimate(timestamps_ns: &[u64]) -> u64 {
    let count = timestamps_ns.len() as u64;
    if count == 0 {
        return 0;
    }

    let total = (2..timestamps_ns.len())
        .rev()
        .map(|i| timestamps_ns[i].saturating_sub(timestamps_ns[i - 1]))
        .fold(0u64, |acc, delta| acc.saturating_add(delta));

    let average_interval = total / count;
    if average_interval == 0 {
        return 0;
    }

    NANOS_PER_MINUTE / average_interval
}
