//! Performance-counter sample helpers.
//!
//! The platform's performance manager returns counter series as
//! comma-separated values; averaging over the returned window is the
//! caller's responsibility.

use crate::error::{TelemetryError, TelemetryResult};

/// Parse a comma-separated counter series into samples.
///
/// Empty fields are skipped, so `"12,,14"` and a trailing comma are
/// tolerated; a field that is not a number is an error.
pub fn parse_csv(raw: &str) -> TelemetryResult<Vec<f64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| TelemetryError::MalformedSamples {
                    raw: raw.to_string(),
                })
        })
        .collect()
}

/// Average a sample series.
///
/// An empty series averages to zero: a host with no recorded usage samples
/// is treated as idle rather than failing the whole aggregation.
pub fn average(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        assert_eq!(parse_csv("100,200,300").unwrap(), vec![100.0, 200.0, 300.0]);
        assert_eq!(parse_csv("4250").unwrap(), vec![4250.0]);
    }

    #[test]
    fn test_parse_csv_skips_empty_fields() {
        assert_eq!(parse_csv("100,,300,").unwrap(), vec![100.0, 300.0]);
        assert!(parse_csv("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_csv_rejects_garbage() {
        assert!(matches!(
            parse_csv("100,abc"),
            Err(TelemetryError::MalformedSamples { .. })
        ));
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(average(&[5000.0]), 5000.0);
    }

    #[test]
    fn test_average_of_empty_series_is_zero() {
        assert_eq!(average(&[]), 0.0);
    }
}
