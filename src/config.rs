//! Runtime configuration.
//!
//! Every tunable is a named parameter looked up through a [`ConfigSource`].
//! Production binds it to the process environment ([`EnvConfig`]); tests use
//! [`MapConfig`] so they never touch real environment variables.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::warn;

use crate::error::{Result, SynthError};
use crate::series::{format, NumericType};

// ─── Defaults ────────────────────────────────────────────────────

pub const DEFAULT_SIZE: u64 = 10;
pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_TAIL: u64 = 1;
pub const DEFAULT_MOD: f64 = 10_000.0;

pub const DEFAULT_RAND_SIZE: u64 = 10;
pub const DEFAULT_RAND_LIMIT: u64 = 10_000;
pub const DEFAULT_RAND_TAIL: u64 = 1;
pub const DEFAULT_RAND_MOD: f64 = 10_000.0;

/// Upper bound for `TAIL`: digits after the point / mantissa digits.
pub const MAX_TAIL: u64 = 64;

/// Upper bound for `SIZE`; every value of a buffer is rendered up front.
pub const MAX_SIZE: u64 = 65_536;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8899";
const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
const DEFAULT_STREAM_INTERVAL_MS: u64 = 500;

/// Prefix of the parameters that drive the per-tick randomized snapshots.
pub const RAND_PREFIX: &str = "RAND";

// ─── ConfigSource ────────────────────────────────────────────────

/// Name → value lookup with default-on-error semantics.
pub trait ConfigSource: Send + Sync {
    /// Raw value, `None` when unset or empty.
    fn get_string(&self, name: &str) -> Option<String>;

    /// Overwrite a parameter. Later reads observe the new value.
    fn set(&self, name: &str, value: &str);

    /// Non-negative integer, or `default` when unset or unparseable.
    fn get_int(&self, name: &str, default: u64) -> u64 {
        let Some(raw) = self.get_string(name) else {
            return default;
        };
        match parse_int(name, &raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, default, "invalid configuration value, using default");
                default
            }
        }
    }

    /// Finite non-negative float, or `default` when unset or unparseable.
    fn get_float(&self, name: &str, default: f64) -> f64 {
        let Some(raw) = self.get_string(name) else {
            return default;
        };
        match parse_float(name, &raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, default, "invalid configuration value, using default");
                default
            }
        }
    }
}

pub fn parse_int(name: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| SynthError::ConfigParse {
        name: name.to_owned(),
        value: raw.to_owned(),
    })
}

pub fn parse_float(name: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(SynthError::ConfigParse {
            name: name.to_owned(),
            value: raw.to_owned(),
        }),
    }
}

/// Process environment, with runtime writes kept in an in-process overlay.
#[derive(Debug, Default)]
pub struct EnvConfig {
    overrides: RwLock<HashMap<String, String>>,
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigSource for EnvConfig {
    fn get_string(&self, name: &str) -> Option<String> {
        if let Some(v) = self.overrides.read().get(name) {
            return Some(v.clone());
        }
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn set(&self, name: &str, value: &str) {
        self.overrides
            .write()
            .insert(name.to_owned(), value.to_owned());
    }
}

/// Plain in-memory source.
#[derive(Debug, Default)]
pub struct MapConfig {
    values: RwLock<HashMap<String, String>>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

impl ConfigSource for MapConfig {
    fn get_string(&self, name: &str) -> Option<String> {
        self.values
            .read()
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn set(&self, name: &str, value: &str) {
        self.values.write().insert(name.to_owned(), value.to_owned());
    }
}

// ─── Series parameters ───────────────────────────────────────────

/// The four knobs that shape one generated buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesParams {
    /// Buffer length, always ≥ 1.
    pub size: usize,
    /// Value ceiling / seed bound.
    pub limit: u64,
    /// Decimal precision (float), mantissa digits (exp), and step source.
    pub tail: u64,
    /// Multiplicative scale applied to float and exp values.
    pub modifier: f64,
}

impl SeriesParams {
    /// Parameters for one numeric type (`INT_SIZE`, `INT_LIMIT`, ...).
    pub fn for_type(source: &dyn ConfigSource, numeric: NumericType) -> Self {
        Self::load(
            source,
            numeric.env_prefix(),
            Self {
                size: DEFAULT_SIZE as usize,
                limit: DEFAULT_LIMIT,
                tail: DEFAULT_TAIL,
                modifier: DEFAULT_MOD,
            },
        )
    }

    /// Parameters shared by all randomized snapshots (`RAND_*`).
    pub fn for_random(source: &dyn ConfigSource) -> Self {
        Self::load(
            source,
            RAND_PREFIX,
            Self {
                size: DEFAULT_RAND_SIZE as usize,
                limit: DEFAULT_RAND_LIMIT,
                tail: DEFAULT_RAND_TAIL,
                modifier: DEFAULT_RAND_MOD,
            },
        )
    }

    fn load(source: &dyn ConfigSource, prefix: &str, defaults: Self) -> Self {
        let size_name = format!("{prefix}_{}", Field::Size);
        let mut size = source.get_int(&size_name, defaults.size as u64);
        if size == 0 || size > MAX_SIZE {
            warn!(name = %size_name, size, max = MAX_SIZE, "size out of range, using default");
            size = defaults.size as u64;
        }

        let tail_name = format!("{prefix}_{}", Field::Tail);
        let mut tail = source.get_int(&tail_name, defaults.tail);
        if tail > MAX_TAIL {
            warn!(name = %tail_name, tail, max = MAX_TAIL, "tail too large, using default");
            tail = defaults.tail;
        }

        let mut params = Self {
            size: usize::try_from(size).unwrap_or(defaults.size),
            limit: source.get_int(&format!("{prefix}_{}", Field::Limit), defaults.limit),
            tail,
            modifier: source.get_float(&format!("{prefix}_{}", Field::Mod), defaults.modifier),
        };
        if !params.is_bounded() {
            warn!(
                prefix,
                limit = params.limit,
                modifier = params.modifier,
                "scaled values overflow, using default modifier"
            );
            params.modifier = defaults.modifier;
        }
        params
    }

    /// Largest magnitude any generated value can reach is finite.
    ///
    /// `down` spans `[limit - step*(size-1), limit]`, `up` spans
    /// `[0, step*(size-1)]`, random draws stay below `limit`; all scaled by
    /// `modifier`.
    pub fn is_bounded(&self) -> bool {
        let step = format::step(self.tail) as f64;
        let span = self.limit as f64 + step * self.size as f64;
        (span * self.modifier).is_finite()
    }

    /// Copy of `self` with one field replaced by a validated raw value.
    pub fn with_field(mut self, field: Field, raw: &str) -> Result<Self> {
        let invalid = || SynthError::InvalidParameter(format!("{field}: '{raw}' is out of range"));
        match field {
            Field::Size => {
                let size = parse_int("SIZE", raw).map_err(|_| invalid())?;
                if size == 0 || size > MAX_SIZE {
                    return Err(invalid());
                }
                self.size = usize::try_from(size).map_err(|_| invalid())?;
            }
            Field::Limit => self.limit = parse_int("LIMIT", raw).map_err(|_| invalid())?,
            Field::Tail => {
                let tail = parse_int("TAIL", raw).map_err(|_| invalid())?;
                if tail > MAX_TAIL {
                    return Err(invalid());
                }
                self.tail = tail;
            }
            Field::Mod => self.modifier = parse_float("MOD", raw).map_err(|_| invalid())?,
        }
        if !self.is_bounded() {
            return Err(invalid());
        }
        Ok(self)
    }
}

// ─── Parameter names ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Size,
    Limit,
    Tail,
    Mod,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Size, Field::Limit, Field::Tail, Field::Mod];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Size => "SIZE",
            Field::Limit => "LIMIT",
            Field::Tail => "TAIL",
            Field::Mod => "MOD",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a parameter configures: one numeric type, or the random snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamTarget {
    Type(NumericType),
    Random,
}

/// A resettable parameter such as `INT_SIZE` or `RAND_MOD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamName {
    pub target: ParamTarget,
    pub field: Field,
}

impl FromStr for ParamName {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SynthError::InvalidParameter(format!("unknown parameter '{s}'"));
        let (prefix, field) = s.split_once('_').ok_or_else(invalid)?;

        let field = Field::ALL
            .into_iter()
            .find(|f| f.as_str() == field)
            .ok_or_else(invalid)?;
        let target = if prefix == RAND_PREFIX {
            ParamTarget::Random
        } else {
            NumericType::ALL
                .into_iter()
                .find(|t| t.env_prefix() == prefix)
                .map(ParamTarget::Type)
                .ok_or_else(invalid)?
        };

        Ok(Self { target, field })
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.target {
            ParamTarget::Type(t) => t.env_prefix(),
            ParamTarget::Random => RAND_PREFIX,
        };
        write!(f, "{prefix}_{}", self.field)
    }
}

// ─── Server settings ─────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Period of the engine loop.
    pub tick_interval: Duration,
    /// Push period of the snapshot SSE stream.
    pub stream_interval: Duration,
}

impl ServerConfig {
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let listen_addr = source
            .get_string("LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());

        Self {
            listen_addr,
            tick_interval: millis(source, "TICK_INTERVAL_MS", DEFAULT_TICK_INTERVAL_MS),
            stream_interval: millis(source, "STREAM_INTERVAL_MS", DEFAULT_STREAM_INTERVAL_MS),
        }
    }
}

fn millis(source: &dyn ConfigSource, name: &str, default: u64) -> Duration {
    match source.get_int(name, default) {
        0 => {
            warn!(name, "interval must be positive, using default");
            Duration::from_millis(default)
        }
        ms => Duration::from_millis(ms),
    }
}
