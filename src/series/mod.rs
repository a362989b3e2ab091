pub mod buffer;
pub mod factory;
pub mod format;
pub mod registry;

pub use buffer::{RegisterSnapshot, ShiftRegister};
pub use format::{Algorithm, NumericType};
pub use registry::{MetricType, Registry, RegistrySnapshot, ResetOutcome};
