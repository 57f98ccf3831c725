//! Conversion of raw sensor encodings into physical units

use super::{RawRecord, Reading};

/// Raw temperatures below this are probe-fault sentinels
pub const RAW_TEMP_MIN: i64 = -32000;

/// Raw temperatures above this are probe-fault sentinels
pub const RAW_TEMP_MAX: i64 = 2300;

/// Converts a raw temperature (tenths of °C) to °F
///
/// Fault sentinels outside `RAW_TEMP_MIN..=RAW_TEMP_MAX` are zeroed first, so
/// they read as 32°F.
pub fn raw_temp_to_fahrenheit(raw: i64) -> f64 {
    let raw = if raw < RAW_TEMP_MIN || raw > RAW_TEMP_MAX {
        0
    } else {
        raw
    };
    let celsius = raw as f64 / 10.0;
    celsius * 1.8 + 32.0
}

/// Converts a raw duty cycle to a fraction. Not clamped.
pub fn raw_duty_to_fraction(raw: i64) -> f64 {
    raw as f64 / 100.0
}

/// Converts a raw series into readings, leaving the input untouched
pub fn transform(records: &[RawRecord]) -> Vec<Reading> {
    records
        .iter()
        .map(|r| Reading {
            time: r.time,
            set_temp: raw_temp_to_fahrenheit(r.set_temp),
            pit_temp: raw_temp_to_fahrenheit(r.pit_temp),
            meat_temp: raw_temp_to_fahrenheit(r.meat_temp1),
            duty_cycle: raw_duty_to_fraction(r.duty_cycle),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: i64, set: i64, pit: i64, meat: i64, duty: i64) -> RawRecord {
        RawRecord {
            time,
            set_temp: set,
            pit_temp: pit,
            meat_temp1: meat,
            duty_cycle: duty,
        }
    }

    #[test]
    fn test_in_range_values_follow_formula() {
        for v in [-32000, -400, -1, 0, 1, 222, 1071, 2299, 2300] {
            let expected = (v as f64 / 10.0) * 1.8 + 32.0;
            assert_eq!(raw_temp_to_fahrenheit(v), expected, "raw {}", v);
        }
    }

    #[test]
    fn test_known_conversions() {
        assert!((raw_temp_to_fahrenheit(0) - 32.0).abs() < 1e-9);
        assert!((raw_temp_to_fahrenheit(1000) - 212.0).abs() < 1e-9);
        assert!((raw_temp_to_fahrenheit(-400) - (-40.0)).abs() < 1e-9);
    }

    #[test]
    fn test_fault_sentinels_read_as_freezing() {
        for v in [-32768, -32001, 2301, 9999, i64::MAX, i64::MIN] {
            assert_eq!(raw_temp_to_fahrenheit(v), 32.0, "raw {}", v);
        }
    }

    #[test]
    fn test_duty_cycle_is_scaled_without_clamping() {
        for v in [-500, 0, 50, 100, 3500, 10000, 25000] {
            assert_eq!(raw_duty_to_fraction(v), v as f64 / 100.0, "raw {}", v);
        }
    }

    #[test]
    fn test_transform_converts_every_channel() {
        let raw = vec![record(1721390000, 1071, 1065, 222, 3500)];

        let readings = transform(&raw);

        assert_eq!(readings.len(), 1);
        let r = readings[0];
        assert_eq!(r.time, 1721390000);
        assert_eq!(r.set_temp, raw_temp_to_fahrenheit(1071));
        assert_eq!(r.pit_temp, raw_temp_to_fahrenheit(1065));
        assert_eq!(r.meat_temp, raw_temp_to_fahrenheit(222));
        assert_eq!(r.duty_cycle, 35.0);
    }

    #[test]
    fn test_transform_clamps_disconnected_probe() {
        let raw = vec![record(0, 1071, 1065, -32768, 0)];
        let readings = transform(&raw);
        assert_eq!(readings[0].meat_temp, 32.0);
    }

    #[test]
    fn test_transform_preserves_order_and_input() {
        let raw = vec![
            record(10, 1000, 1000, 100, 0),
            record(20, 1000, 1010, 110, 10),
            record(30, 1000, 1020, 120, 20),
        ];
        let copy = raw.clone();

        let readings = transform(&raw);

        assert_eq!(raw, copy, "Input series must not be mutated");
        let times: Vec<i64> = readings.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![10, 20, 30]);
    }

    #[test]
    fn test_transform_empty_series() {
        assert!(transform(&[]).is_empty());
    }
}
