use super::value::ValueKind;
use std::fmt::{Display, Formatter};

/// Faults raised by the interpreter itself. These are not recoverable by the bridge
/// and are handed back to the interpreter's fault path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    OutOfMemory { requested: usize, available: usize },
    UnknownSymbol(String),
    DuplicateSymbol(String),
}

impl Display for VmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VmError::OutOfMemory { requested, available } => write!(
                f,
                "out of memory: requested {requested} heap cells, {available} available"
            ),
            VmError::UnknownSymbol(name) => write!(f, "unknown symbol '{name}'"),
            VmError::DuplicateSymbol(name) => write!(f, "symbol '{name}' is already registered"),
        }
    }
}

impl std::error::Error for VmError {}

/// Errors a native closure reports to the script. Argument errors are raised before any
/// state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosureError {
    ArgCount { closure: &'static str, expected: usize, got: usize },
    ArgType { closure: &'static str, index: usize, expected: ValueKind, got: ValueKind },
    /// A float argument was NaN or infinite.
    NotFinite { closure: &'static str, index: usize },
    Vm(VmError),
}

impl Display for ClosureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClosureError::ArgCount { closure, expected, got } => write!(
                f,
                "{closure}: wrong number of parameters (expected {expected}, got {got})"
            ),
            ClosureError::ArgType { closure, index, expected, got } => write!(
                f,
                "{closure}: type error at argument {index} (expected {expected}, got {got})"
            ),
            ClosureError::NotFinite { closure, index } => {
                write!(f, "{closure}: argument {index} must be a finite number")
            }
            ClosureError::Vm(err) => write!(f, "interpreter fault: {err}"),
        }
    }
}

impl std::error::Error for ClosureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClosureError::Vm(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VmError> for ClosureError {
    fn from(value: VmError) -> Self { ClosureError::Vm(value) }
}
