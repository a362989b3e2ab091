use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::Serialize;

use crate::config::SeriesParams;
use crate::error::SynthError;

// ─── Numeric types ───────────────────────────────────────────────

/// How a generated value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericType {
    /// Scientific notation, `tail` mantissa digits.
    Exp,
    /// Fixed point, `tail` digits after the decimal point.
    Float,
    /// Base-10 integer.
    Int,
}

impl NumericType {
    pub const ALL: [NumericType; 3] = [NumericType::Exp, NumericType::Float, NumericType::Int];

    pub fn as_str(self) -> &'static str {
        match self {
            NumericType::Exp => "exp",
            NumericType::Float => "float",
            NumericType::Int => "int",
        }
    }

    /// Prefix of this type's configuration parameters.
    pub fn env_prefix(self) -> &'static str {
        match self {
            NumericType::Exp => "EXP",
            NumericType::Float => "FLOAT",
            NumericType::Int => "INT",
        }
    }

    /// Label used on the `/rand/all` page.
    pub fn label(self) -> &'static str {
        match self {
            NumericType::Exp => "ExpMetric",
            NumericType::Float => "FloatMetric",
            NumericType::Int => "IntMetric",
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericType {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SynthError::UnknownType(s.to_owned()))
    }
}

// ─── Algorithms ──────────────────────────────────────────────────

/// Progression rule used to fill a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Up,
    Down,
    Random,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Up, Algorithm::Down, Algorithm::Random];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Up => "up",
            Algorithm::Down => "down",
            Algorithm::Random => "random",
        }
    }

    pub fn parse_for(numeric: NumericType, s: &str) -> Result<Self, SynthError> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| SynthError::UnknownAlgorithm {
                numeric_type: numeric.to_string(),
                algorithm: s.to_owned(),
            })
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Formatting ──────────────────────────────────────────────────

/// Increment between neighbouring positions. Never zero so up/down
/// buffers stay strictly monotonic.
pub fn step(tail: u64) -> i64 {
    i64::try_from(tail.max(1)).unwrap_or(i64::MAX)
}

/// Render `value` in the style of `numeric` with `tail` digits.
pub fn render(numeric: NumericType, value: f64, tail: u64) -> String {
    let precision = tail as usize;
    match numeric {
        NumericType::Exp => format!("{value:.precision$e}"),
        NumericType::Float => format!("{value:.precision$}"),
        NumericType::Int => format!("{}", value.trunc() as i64),
    }
}

/// Value at `position` of a monotonic progression.
///
/// `up` yields `L - (L - step*i)`, `down` yields `L - step*i`. Integers are
/// rendered as-is; float and exp are scaled by `modifier` first.
/// `Algorithm::Random` has no position and is routed to [`random`].
pub fn progression<R: Rng + ?Sized>(
    numeric: NumericType,
    algorithm: Algorithm,
    position: usize,
    params: &SeriesParams,
    rng: &mut R,
) -> String {
    let limit = i64::try_from(params.limit).unwrap_or(i64::MAX);
    let offset = step(params.tail).saturating_mul(i64::try_from(position).unwrap_or(i64::MAX));

    let raw = match algorithm {
        Algorithm::Up => limit.saturating_sub(limit.saturating_sub(offset)),
        Algorithm::Down => limit.saturating_sub(offset),
        Algorithm::Random => return random(numeric, params, rng),
    };

    match numeric {
        NumericType::Int => raw.to_string(),
        _ => render(numeric, raw as f64 * params.modifier, params.tail),
    }
}

/// One draw of `modifier * uniform[0, limit) * uniform[0, 1)`.
pub fn random<R: Rng + ?Sized>(numeric: NumericType, params: &SeriesParams, rng: &mut R) -> String {
    let seed = rng.gen::<f64>() * params.limit as f64;
    let draw = params.modifier * seed * rng.gen::<f64>();
    render(numeric, draw, params.tail)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn params(limit: u64, tail: u64, modifier: f64) -> SeriesParams {
        SeriesParams { size: 10, limit, tail, modifier }
    }

    #[test]
    fn names_round_trip() {
        for t in NumericType::ALL {
            assert_eq!(t.as_str().parse::<NumericType>().unwrap(), t);
        }
        assert_eq!(
            "bogus".parse::<NumericType>(),
            Err(SynthError::UnknownType("bogus".into()))
        );
        assert!(matches!(
            Algorithm::parse_for(NumericType::Exp, "u"),
            Err(SynthError::UnknownAlgorithm { .. })
        ));
    }

    #[test]
    fn int_progressions() {
        let mut rng = StdRng::seed_from_u64(42);
        let p = params(10, 1, 1.1);
        let up: Vec<_> = (0..4)
            .map(|i| progression(NumericType::Int, Algorithm::Up, i, &p, &mut rng))
            .collect();
        let down: Vec<_> = (0..4)
            .map(|i| progression(NumericType::Int, Algorithm::Down, i, &p, &mut rng))
            .collect();
        assert_eq!(up, ["0", "1", "2", "3"]);
        assert_eq!(down, ["10", "9", "8", "7"]);
    }

    #[test]
    fn float_uses_tail_precision_and_modifier() {
        let mut rng = StdRng::seed_from_u64(42);
        let p = params(10, 2, 1.5);
        assert_eq!(progression(NumericType::Float, Algorithm::Up, 3, &p, &mut rng), "9.00");
        assert_eq!(progression(NumericType::Float, Algorithm::Down, 1, &p, &mut rng), "12.00");
    }

    #[test]
    fn exp_uses_tail_mantissa_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        let p = params(10, 8, 10_000.0);
        let v = progression(NumericType::Exp, Algorithm::Down, 0, &p, &mut rng);
        let (mantissa, _) = v.split_once('e').unwrap();
        let (_, digits) = mantissa.split_once('.').unwrap();
        assert_eq!(digits.len(), 8);
        assert_eq!(v.parse::<f64>().unwrap(), 100_000.0);
    }

    #[test]
    fn zero_tail_still_steps() {
        assert_eq!(step(0), 1);
        assert_eq!(render(NumericType::Float, 2.0, 0), "2");
    }

    #[test]
    fn random_draws_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = params(1_000, 4, 1_000.0);
        for numeric in NumericType::ALL {
            for _ in 0..500 {
                let v: f64 = random(numeric, &p, &mut rng).parse().unwrap();
                assert!(v.is_finite());
                assert!((0.0..=1_000.0 * 1_000.0).contains(&v), "{numeric} drew {v}");
            }
        }
    }

    #[test]
    fn random_with_zero_limit_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random(NumericType::Int, &params(0, 1, 5.0), &mut rng), "0");
    }
}
