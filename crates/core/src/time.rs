use crate::error::{Result, TempolensError};

const MICROS_PER_MILLI: u64 = 1_000;
const MICROS_PER_SEC: u64 = 1_000_000;

/// Parses an OTLP `*UnixNano` field. The value stays integral end to end.
pub fn parse_unix_nanos(input: &str) -> Result<i64> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|e| TempolensError::Parse(format!("invalid nanosecond timestamp {input:?}: {e}")))
}

pub fn nanos_to_micros(nanos: i64) -> i64 {
    nanos / 1_000
}

/// Renders a microsecond duration as `μs`, `ms` or `s` with two truncated decimals.
///
/// Negative input keeps its sign and uses the thresholds of its magnitude.
pub fn format_duration(micros: i64) -> String {
    let sign = if micros < 0 { "-" } else { "" };
    let magnitude = micros.unsigned_abs();

    if magnitude < MICROS_PER_MILLI {
        format!("{sign}{magnitude}.00μs")
    } else if magnitude < MICROS_PER_SEC {
        let whole = magnitude / MICROS_PER_MILLI;
        let hundredths = (magnitude % MICROS_PER_MILLI) / 10;
        format!("{sign}{whole}.{hundredths:02}ms")
    } else {
        let whole = magnitude / MICROS_PER_SEC;
        let hundredths = (magnitude % MICROS_PER_SEC) / 10_000;
        format!("{sign}{whole}.{hundredths:02}s")
    }
}
