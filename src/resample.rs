use crate::{Error, Result};

/// Mean absolute difference between consecutive timestamps
pub fn average_interval(timestamps: &[i64]) -> Result<f64> {
    if timestamps.len() < 2 {
        return Err(Error::InsufficientSamples {
            needed: 2,
            found: timestamps.len(),
        });
    }

    let sum: f64 = timestamps
        .windows(2)
        .map(|pair| (pair[1] as f64 - pair[0] as f64).abs())
        .sum();

    Ok(sum / (timestamps.len() - 1) as f64)
}

/// Value of `series` at `timestamp`, linearly interpolated between its neighbours.
///
/// `series` must be sorted by timestamp. Queries outside the series clamp to the
/// first or last value.
pub fn interpolate(series: &[(i64, f64)], timestamp: i64) -> Result<f64> {
    if series.is_empty() {
        return Err(Error::InsufficientSamples {
            needed: 1,
            found: 0,
        });
    }

    // index of the first sample at or after the query
    let after = series.partition_point(|&(time, _)| time < timestamp);

    if let Some(&(time, value)) = series.get(after) {
        if time == timestamp {
            return Ok(value);
        }
    }

    let (prev_time, prev_value) = series[after.saturating_sub(1)];
    let (next_time, next_value) = series[after.min(series.len() - 1)];

    if prev_time == next_time {
        return Ok(prev_value);
    }

    let fraction = (timestamp as f64 - prev_time as f64) / (next_time as f64 - prev_time as f64);

    Ok(prev_value + (next_value - prev_value) * fraction)
}
