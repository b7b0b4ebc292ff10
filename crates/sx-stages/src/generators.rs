//! Input generators: functions of logical time that drive a simulation's
//! input wire.

use std::f64::consts::TAU;
use std::sync::Arc;

use sx_core::Real;

use crate::common::BitClock;
use crate::error::{StageError, StageResult};

/// Parse a string of `0`/`1` characters into bits.
pub fn parse_bitstream(bitstream: &str) -> StageResult<Vec<bool>> {
    if bitstream.is_empty() {
        return Err(StageError::Bitstream {
            what: "bitstream is empty".to_string(),
        });
    }
    bitstream
        .chars()
        .enumerate()
        .map(|(i, c)| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(StageError::Bitstream {
                what: format!("unexpected character {other:?} at position {i}"),
            }),
        })
        .collect()
}

/// Repeating bit pattern at `baud_rate`, emitting `levels.0` for 0 and
/// `levels.1` for 1. Negative times read as the low level.
pub fn digital_signal(
    bitstream: &str,
    baud_rate: Real,
    levels: (Real, Real),
) -> StageResult<impl Fn(Real) -> Real + Send + Sync + Clone + 'static> {
    let bits: Arc<[bool]> = parse_bitstream(bitstream)?.into();
    let clock = BitClock::from_rate(baud_rate, "baud_rate")?;
    let (low, high) = levels;

    Ok(move |time: Real| {
        if time < 0.0 {
            return low;
        }
        let index = clock.index(time).rem_euclid(bits.len() as i64) as usize;
        if bits[index] { high } else { low }
    })
}

/// `amplitude * sin(2π f t + phase)`.
pub fn sine_wave(
    frequency: Real,
    amplitude: Real,
    phase: Real,
) -> impl Fn(Real) -> Real + Send + Sync + Clone + 'static {
    move |time: Real| amplitude * (TAU * frequency * time + phase).sin()
}

/// Always zero.
pub fn silence() -> impl Fn(Real) -> Real + Send + Sync + Clone + 'static {
    |_time: Real| 0.0
}

/// Always `value`.
pub fn constant(value: Real) -> impl Fn(Real) -> Real + Send + Sync + Clone + 'static {
    move |_time: Real| value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitstream_parsing() {
        assert_eq!(parse_bitstream("101").unwrap(), vec![true, false, true]);
        assert!(parse_bitstream("").is_err());
        let err = parse_bitstream("10x1").unwrap_err();
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn digital_signal_repeats_pattern() {
        let signal = digital_signal("0110", 5.0, (0.0, 1.0)).unwrap();
        let samples: Vec<Real> = [0.1, 0.3, 0.5, 0.7, 0.9, 1.1]
            .into_iter()
            .map(&signal)
            .collect();
        assert_eq!(samples, vec![0.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(signal(-0.5), 0.0);
    }

    #[test]
    fn digital_signal_custom_levels() {
        let signal = digital_signal("10", 1.0, (-2.0, 3.0)).unwrap();
        assert_eq!(signal(0.5), 3.0);
        assert_eq!(signal(1.5), -2.0);
    }

    #[test]
    fn digital_signal_rejects_bad_rate() {
        assert!(digital_signal("10", 0.0, (0.0, 1.0)).is_err());
    }

    #[test]
    fn sine_and_constants() {
        let sine = sine_wave(1.0, 2.0, 0.0);
        assert!(sine(0.0).abs() < 1e-12);
        assert!((sine(0.25) - 2.0).abs() < 1e-12);
        assert_eq!(silence()(12.0), 0.0);
        assert_eq!(constant(1.0)(3.0), 1.0);
    }
}
