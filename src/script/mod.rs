//! Interpreter-facing half of the bridge.
//!
//! The embedded interpreter is reached only through the [`ScriptVm`] trait. Command closures
//! write intents into the shared [`CommandBridge`](crate::uav_control::CommandBridge), and
//! telemetry publishers read snapshots out of it into script tables.

pub mod closures;
mod error;
pub mod publishers;
mod schema;
mod value;
mod vm;
#[cfg(test)]
mod tests;

pub use error::{ClosureError, VmError};
pub use schema::{TableBuilder, TelemetryRecord};
pub use value::{ScriptValue, Table, ValueKind};
pub use vm::{HeapVm, NativeClosure, ScriptVm};
