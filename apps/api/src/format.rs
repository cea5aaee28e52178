//! Small leaf helpers: human-readable byte sizes and record identifiers.

use uuid::Uuid;

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const STEP: u64 = 1024;

/// Formats a byte count as `"<value> <unit>"` using base 1024.
///
/// The value is rounded to two decimals with trailing zeros dropped, so
/// `1536` becomes `"1.5 KB"` and `1024` becomes `"1 KB"`. A value that
/// rounds up to 1024 moves to the next unit (`1_048_575` is `"1 MB"`).
/// Anything past the gigabyte range stays in GB.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes;
    while scaled >= STEP && unit < UNITS.len() - 1 {
        scaled /= STEP;
        unit += 1;
    }

    let mut rounded = scaled_to(bytes, unit);
    if rounded >= STEP as f64 && unit < UNITS.len() - 1 {
        unit += 1;
        rounded = scaled_to(bytes, unit);
    }

    format!("{} {}", rounded, UNITS[unit])
}

fn scaled_to(bytes: u64, unit: usize) -> f64 {
    let value = bytes as f64 / (STEP as f64).powi(unit as i32);
    (value * 100.0).round() / 100.0
}

/// Source of record identifiers. Injected so callers can substitute a
/// deterministic or counting generator.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Uuid;
}

/// Random v4 UUIDs (122 random bits).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_zero_is_literal_bytes() {
        assert_eq!(format_size(0), "0 Bytes");
    }

    #[test]
    fn test_small_counts_stay_in_bytes() {
        assert_eq!(format_size(1), "1 Bytes");
        assert_eq!(format_size(1023), "1023 Bytes");
    }

    #[test]
    fn test_unit_boundaries() {
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
        assert_eq!(format_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_size(20 * 1024 * 1024), "20 MB");
        assert_eq!(format_size(1024 * 1024 * 1024), "1 GB");
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        // 1234 / 1024 = 1.205078125
        assert_eq!(format_size(1234), "1.21 KB");
    }

    #[test]
    fn test_rounding_up_promotes_unit() {
        assert_eq!(format_size(1023), "1023 Bytes");
        assert_eq!(format_size(1_048_575), "1 MB");
        assert_eq!(format_size(1_073_741_823), "1 GB");
        assert_eq!(format_size(1_048_064), "1023.5 KB");
    }

    #[test]
    fn test_top_unit_is_unbounded() {
        assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn test_magnitude_below_next_unit() {
        for bytes in [
            1_u64,
            999,
            4096,
            70_000,
            1_048_575,
            3_000_000,
            900_000_000,
            1_073_741_823,
            5_000_000_000,
        ] {
            let formatted = format_size(bytes);
            let (value, unit) = formatted.split_once(' ').unwrap();
            let value: f64 = value.parse().unwrap();
            assert!(UNITS.contains(&unit), "unexpected unit in {formatted}");
            if unit != "GB" {
                assert!((0.0..1024.0).contains(&value), "{formatted} out of range");
            }
        }
    }

    #[test]
    fn test_uuid_generator_yields_distinct_ids() {
        let generator = UuidGenerator;
        let ids: HashSet<Uuid> = (0..5000).map(|_| generator.generate()).collect();
        assert_eq!(ids.len(), 5000);
    }
}
