//! Native closures scripts use to command the vehicle.
//!
//! Every closure checks its arguments first and only then touches the [`CommandBridge`];
//! a rejected call leaves the state exactly as it was. None of them return a value to the
//! script: the outcome of a command only shows up later in the published telemetry.

use super::error::{ClosureError, VmError};
use super::value::ValueKind;
use super::vm::{NativeClosure, ScriptVm};
use crate::uav_control::CommandBridge;
use crate::{cmd, info, warn};
use std::sync::Arc;

pub const TAKEOFF: &str = "uav_takeoff";
pub const LAND: &str = "uav_land";
pub const GO_HOME: &str = "uav_gohome";
pub const ARM: &str = "uav_arm";
pub const DISARM: &str = "uav_disarm";
pub const GOTO_VECTOR: &str = "uav_moveto";
pub const GOTO_ABSOLUTE: &str = "uav_goto";
pub const PRINT: &str = "print";

type ClosureFn = fn(&CommandBridge, &mut dyn ScriptVm) -> Result<(), ClosureError>;

const CLOSURES: [(&str, ClosureFn); 8] = [
    (TAKEOFF, takeoff),
    (LAND, land),
    (GO_HOME, go_home),
    (ARM, arm),
    (DISARM, disarm),
    (GOTO_VECTOR, goto_vector),
    (GOTO_ABSOLUTE, goto_absolute),
    (PRINT, print),
];

/// Registers all command closures in the interpreter's global namespace.
///
/// # Errors
/// - [`VmError`] if a name is already taken or the heap is exhausted.
pub fn register_closures(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), VmError> {
    for (name, f) in CLOSURES {
        vm.register_native(name, native(bridge, f))?;
    }
    info!("Registered {} native closures", CLOSURES.len());
    Ok(())
}

fn native(bridge: &CommandBridge, f: ClosureFn) -> NativeClosure {
    let bridge = bridge.clone();
    Arc::new(move |vm: &mut dyn ScriptVm| f(&bridge, vm).inspect_err(|e| warn!("{e}")))
}

fn expect_arg_count(
    vm: &dyn ScriptVm,
    closure: &'static str,
    expected: usize,
) -> Result<(), ClosureError> {
    let got = vm.arg_count();
    if got == expected { Ok(()) } else { Err(ClosureError::ArgCount { closure, expected, got }) }
}

/// Reads argument `index` as a finite float.
fn float_arg(vm: &dyn ScriptVm, closure: &'static str, index: usize) -> Result<f64, ClosureError> {
    let arg = vm.arg(index);
    let value = arg.and_then(|v| v.as_float()).ok_or(ClosureError::ArgType {
        closure,
        index,
        expected: ValueKind::Float,
        got: arg.map_or(ValueKind::Nil, |v| v.kind()),
    })?;
    if value.is_finite() { Ok(value) } else { Err(ClosureError::NotFinite { closure, index }) }
}

/// `uav_takeoff(altitude)`
pub fn takeoff(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), ClosureError> {
    expect_arg_count(vm, TAKEOFF, 1)?;
    let altitude = float_arg(vm, TAKEOFF, 1)?;
    bridge.takeoff(altitude);
    cmd!("Script requested take off to {altitude:.2} m");
    Ok(())
}

/// `uav_land()`
pub fn land(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), ClosureError> {
    expect_arg_count(vm, LAND, 0)?;
    bridge.land();
    cmd!("Script requested land");
    Ok(())
}

/// `uav_gohome()`
pub fn go_home(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), ClosureError> {
    expect_arg_count(vm, GO_HOME, 0)?;
    bridge.go_home();
    cmd!("Script requested go home");
    Ok(())
}

/// `uav_arm()`
pub fn arm(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), ClosureError> {
    expect_arg_count(vm, ARM, 0)?;
    bridge.arm();
    cmd!("Script requested arm");
    Ok(())
}

/// `uav_disarm()`
pub fn disarm(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), ClosureError> {
    expect_arg_count(vm, DISARM, 0)?;
    bridge.disarm();
    cmd!("Script requested disarm");
    Ok(())
}

/// `uav_moveto(dx, dy)`: waypoint `dx`/`dy` meters from the current position.
pub fn goto_vector(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), ClosureError> {
    expect_arg_count(vm, GOTO_VECTOR, 2)?;
    let dx = float_arg(vm, GOTO_VECTOR, 1)?;
    let dy = float_arg(vm, GOTO_VECTOR, 2)?;
    let goal = bridge.goto_vector(dx, dy);
    cmd!("Script requested go to vector ({dx:.7}, {dy:.7}): {goal}");
    Ok(())
}

/// `uav_goto()`: waypoint at the destination last set by the remote control.
pub fn goto_absolute(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), ClosureError> {
    expect_arg_count(vm, GOTO_ABSOLUTE, 0)?;
    let goal = bridge.goto_absolute();
    cmd!("Script requested go to: {goal}");
    Ok(())
}

/// `print(...)`: logs every argument.
pub fn print(_: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), ClosureError> {
    let line = (1..=vm.arg_count())
        .filter_map(|i| vm.arg(i))
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    info!("SCRIPT - {line}");
    Ok(())
}
