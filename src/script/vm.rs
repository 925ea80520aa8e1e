use super::error::{ClosureError, VmError};
use super::value::ScriptValue;
use std::collections::HashMap;
use std::sync::Arc;

/// A native function callable from script code.
pub type NativeClosure = Arc<dyn Fn(&mut dyn ScriptVm) -> Result<(), ClosureError> + Send + Sync>;

/// The operations the bridge needs from an embedded interpreter.
pub trait ScriptVm {
    /// Number of arguments in the current call frame.
    fn arg_count(&self) -> usize;

    /// Argument `idx` of the current call frame, counting from `1`.
    fn arg(&self, idx: usize) -> Option<&ScriptValue>;

    /// Stores `value` under the global `name`, replacing any previous value.
    ///
    /// # Errors
    /// - [`VmError::OutOfMemory`] if the heap cannot hold the value.
    fn store_global(&mut self, name: &str, value: ScriptValue) -> Result<(), VmError>;

    /// Makes `closure` callable from scripts under the global `name`.
    ///
    /// # Errors
    /// - [`VmError::DuplicateSymbol`] if `name` already refers to a native closure.
    fn register_native(&mut self, name: &str, closure: NativeClosure) -> Result<(), VmError>;
}

/// Minimal in-memory interpreter heap: a global namespace, a native registry and a
/// single call frame. An optional cell limit makes allocation faults observable.
#[derive(Default)]
pub struct HeapVm {
    globals: HashMap<String, ScriptValue>,
    natives: HashMap<String, NativeClosure>,
    frame: Vec<ScriptValue>,
    heap_limit: Option<usize>,
}

impl HeapVm {
    pub fn new() -> Self { Self::default() }

    pub fn with_heap_limit(limit: usize) -> Self {
        Self { heap_limit: Some(limit), ..Self::default() }
    }

    pub fn global(&self, name: &str) -> Option<&ScriptValue> { self.globals.get(name) }

    /// Total heap cells held by globals.
    pub fn heap_used(&self) -> usize { self.globals.values().map(ScriptValue::cells).sum() }

    pub fn natives(&self) -> impl Iterator<Item = &str> { self.natives.keys().map(String::as_str) }

    /// Invokes the native closure registered as `name` with `args` as its call frame.
    ///
    /// # Errors
    /// - [`ClosureError::Vm`] with [`VmError::UnknownSymbol`] if nothing is registered as `name`.
    /// - Whatever the closure itself reports.
    pub fn call(&mut self, name: &str, args: Vec<ScriptValue>) -> Result<(), ClosureError> {
        let closure = self
            .natives
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| VmError::UnknownSymbol(name.to_string()))?;
        let outer_frame = std::mem::replace(&mut self.frame, args);
        let res = closure(self);
        self.frame = outer_frame;
        res
    }
}

impl ScriptVm for HeapVm {
    fn arg_count(&self) -> usize { self.frame.len() }

    fn arg(&self, idx: usize) -> Option<&ScriptValue> {
        idx.checked_sub(1).and_then(|i| self.frame.get(i))
    }

    fn store_global(&mut self, name: &str, value: ScriptValue) -> Result<(), VmError> {
        if let Some(limit) = self.heap_limit {
            let replaced = self.globals.get(name).map_or(0, ScriptValue::cells);
            let used = self.heap_used() - replaced;
            let requested = value.cells();
            let available = limit.saturating_sub(used);
            if requested > available {
                return Err(VmError::OutOfMemory { requested, available });
            }
        }
        self.globals.insert(name.to_string(), value);
        Ok(())
    }

    fn register_native(&mut self, name: &str, closure: NativeClosure) -> Result<(), VmError> {
        if self.natives.contains_key(name) {
            return Err(VmError::DuplicateSymbol(name.to_string()));
        }
        self.store_global(name, ScriptValue::Closure(name.to_string()))?;
        self.natives.insert(name.to_string(), closure);
        Ok(())
    }
}
