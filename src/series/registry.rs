use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::buffer::{RegisterSnapshot, ShiftRegister};
use super::factory;
use super::format::{Algorithm, NumericType};
use crate::config::{ConfigSource, ParamName, ParamTarget, SeriesParams};
use crate::error::{Result, SynthError};

// ─── MetricType ──────────────────────────────────────────────────

/// Everything served for one numeric type: a register per algorithm and
/// the randomized snapshot that is regenerated on every tick.
pub struct MetricType {
    name: NumericType,
    registers: BTreeMap<Algorithm, Arc<ShiftRegister>>,
    random: RwLock<Vec<String>>,
    /// Serializes resets so one never interleaves with another on this type.
    reset_lock: Mutex<()>,
}

impl MetricType {
    pub fn name(&self) -> NumericType {
        self.name
    }

    pub fn register(&self, algorithm: Algorithm) -> Option<Arc<ShiftRegister>> {
        self.registers.get(&algorithm).cloned()
    }

    /// Registers in algorithm order.
    pub fn registers(&self) -> impl Iterator<Item = &Arc<ShiftRegister>> {
        self.registers.values()
    }

    pub fn random_snapshot(&self) -> Vec<String> {
        self.random.read().clone()
    }

    /// First element of the randomized snapshot.
    pub fn random_value(&self) -> String {
        self.random.read().first().cloned().unwrap_or_default()
    }

    fn refresh_random(&self, params: &SeriesParams) -> Result<()> {
        let fresh = factory::random_snapshot(self.name, params)?;
        *self.random.write() = fresh;
        Ok(())
    }

    fn snapshot(&self) -> TypeSnapshot {
        TypeSnapshot {
            name: self.name,
            registers: self.registers.values().map(|r| r.snapshot()).collect(),
            random: self.random_snapshot(),
        }
    }
}

// ─── Snapshot / outcome types ────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct TypeSnapshot {
    pub name: NumericType,
    pub registers: Vec<RegisterSnapshot>,
    pub random: Vec<String>,
}

/// Whole-registry view shipped by `/api/snapshot`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub ticks: u64,
    pub types: Vec<TypeSnapshot>,
}

/// One buffer rebuilt by a reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub param: String,
    pub value: String,
    /// `Metric_{type}_{algorithm}` for registers, `Rand_{type}` for snapshots.
    pub series: String,
    pub len: usize,
}

impl fmt::Display for ResetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}={} ({} values)",
            self.series, self.param, self.value, self.len
        )
    }
}

// ─── Registry ────────────────────────────────────────────────────

/// Fixed set of metric types built at startup. Entries are never added or
/// removed afterwards; only their contents change.
pub struct Registry {
    types: BTreeMap<NumericType, MetricType>,
    config: Arc<dyn ConfigSource>,
    /// Serializes `RAND_*` resets.
    random_lock: Mutex<()>,
    ticks: AtomicU64,
}

impl Registry {
    /// Build every (type, algorithm) register and every randomized snapshot
    /// up front.
    pub fn initialize(
        numeric_types: &[NumericType],
        algorithms: &[Algorithm],
        config: Arc<dyn ConfigSource>,
    ) -> Result<Self> {
        let random_params = SeriesParams::for_random(config.as_ref());
        let mut types = BTreeMap::new();

        for &numeric in numeric_types {
            let params = SeriesParams::for_type(config.as_ref(), numeric);
            info!(
                numeric_type = %numeric,
                size = params.size,
                limit = params.limit,
                tail = params.tail,
                modifier = params.modifier,
                "building series"
            );

            let mut registers = BTreeMap::new();
            for &algorithm in algorithms {
                let register = factory::build(numeric, algorithm, &params)?;
                registers.insert(algorithm, Arc::new(register));
            }

            let random = factory::random_snapshot(numeric, &random_params)?;
            types.insert(
                numeric,
                MetricType {
                    name: numeric,
                    registers,
                    random: RwLock::new(random),
                    reset_lock: Mutex::new(()),
                },
            );
        }

        Ok(Self {
            types,
            config,
            random_lock: Mutex::new(()),
            ticks: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &Arc<dyn ConfigSource> {
        &self.config
    }

    /// Metric types in stable order.
    pub fn types(&self) -> impl Iterator<Item = &MetricType> {
        self.types.values()
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Regenerate every randomized snapshot and advance every register by
    /// one step. A type whose snapshot cannot be rebuilt keeps its previous
    /// values; the others proceed.
    pub fn tick(&self) {
        let random_params = SeriesParams::for_random(self.config.as_ref());

        for mt in self.types.values() {
            if let Err(e) = mt.refresh_random(&random_params) {
                warn!(numeric_type = %mt.name, error = %e, "keeping previous random snapshot");
            }
            for register in mt.registers.values() {
                register.advance();
            }
        }

        let n = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(tick = n, "series advanced");
    }

    pub fn lookup_type(&self, numeric: NumericType) -> Result<&MetricType> {
        self.types
            .get(&numeric)
            .ok_or_else(|| SynthError::NotFound(format!("numeric type '{numeric}'")))
    }

    pub fn lookup(&self, numeric: NumericType, algorithm: Algorithm) -> Result<Arc<ShiftRegister>> {
        self.lookup_type(numeric)?
            .register(algorithm)
            .ok_or_else(|| SynthError::NotFound(format!("series '{numeric}/{algorithm}'")))
    }

    /// Lookup by the raw names used in request paths.
    pub fn resolve(&self, type_name: &str, algorithm: &str) -> Result<Arc<ShiftRegister>> {
        let numeric: NumericType = type_name.parse()?;
        let mt = self
            .types
            .get(&numeric)
            .ok_or_else(|| SynthError::UnknownType(type_name.to_owned()))?;
        let algo = Algorithm::parse_for(numeric, algorithm)?;
        mt.register(algo).ok_or_else(|| SynthError::UnknownAlgorithm {
            numeric_type: type_name.to_owned(),
            algorithm: algorithm.to_owned(),
        })
    }

    /// Rewrite one parameter and rebuild every buffer it shapes.
    ///
    /// The name and value are validated and all new values generated before
    /// anything is written, so a rejected reset leaves no trace.
    pub fn reset(&self, name: &str, value: &str) -> Result<Vec<ResetOutcome>> {
        let param: ParamName = name.parse()?;

        let outcomes = match param.target {
            ParamTarget::Type(numeric) => self.reset_type(param, numeric, value)?,
            ParamTarget::Random => self.reset_random(param, value)?,
        };

        info!(param = %param, value, rebuilt = outcomes.len(), "parameter reset");
        Ok(outcomes)
    }

    fn reset_type(&self, param: ParamName, numeric: NumericType, value: &str) -> Result<Vec<ResetOutcome>> {
        let mt = self
            .types
            .get(&numeric)
            .ok_or_else(|| SynthError::InvalidParameter(format!("numeric type '{numeric}' is not served")))?;
        let _guard = mt.reset_lock.lock();

        let params = SeriesParams::for_type(self.config.as_ref(), numeric).with_field(param.field, value)?;
        let mut rng = rand::thread_rng();
        let rebuilt: Vec<(Arc<ShiftRegister>, Vec<String>)> = mt
            .registers
            .values()
            .map(|r| (Arc::clone(r), factory::generate(numeric, r.algorithm(), &params, &mut rng)))
            .collect();

        self.config.set(&param.to_string(), value);

        let mut outcomes = Vec::with_capacity(rebuilt.len());
        for (register, values) in rebuilt {
            let len = values.len();
            register.replace_values(values)?;
            outcomes.push(ResetOutcome {
                param: param.to_string(),
                value: value.to_owned(),
                series: format!("Metric_{}_{}", numeric, register.algorithm()),
                len,
            });
        }
        Ok(outcomes)
    }

    fn reset_random(&self, param: ParamName, value: &str) -> Result<Vec<ResetOutcome>> {
        let _guard = self.random_lock.lock();

        let params = SeriesParams::for_random(self.config.as_ref()).with_field(param.field, value)?;
        let mut fresh = Vec::with_capacity(self.types.len());
        for mt in self.types.values() {
            fresh.push((mt, factory::random_snapshot(mt.name, &params)?));
        }

        self.config.set(&param.to_string(), value);

        Ok(fresh
            .into_iter()
            .map(|(mt, values)| {
                let len = values.len();
                *mt.random.write() = values;
                ResetOutcome {
                    param: param.to_string(),
                    value: value.to_owned(),
                    series: format!("Rand_{}", mt.name),
                    len,
                }
            })
            .collect())
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            ticks: self.tick_count(),
            types: self.types.values().map(MetricType::snapshot).collect(),
        }
    }
}
