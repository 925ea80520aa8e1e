//! Telemetry publishers, run by the interpreter loop once per tick.
//!
//! Each publisher builds a fresh table from the current [`CommandBridge`] state and stores
//! it at its well-known global. Nothing is validated here; an interpreter allocation fault
//! is returned to the caller untouched.

use super::error::VmError;
use super::schema::TelemetryRecord;
use super::vm::ScriptVm;
use crate::uav_control::CommandBridge;
use crate::event;

fn publish<R: TelemetryRecord>(vm: &mut dyn ScriptVm, record: &R) -> Result<(), VmError> {
    vm.store_global(R::GLOBAL, record.to_table().into())
}

/// Publishes `battery = {voltage, current, capacity}`.
///
/// # Errors
/// - Interpreter allocation faults.
pub fn update_battery(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), VmError> {
    publish(vm, &bridge.battery())
}

/// Publishes `position = {latitude, longitude, altitude}` from the current position.
///
/// # Errors
/// - Interpreter allocation faults.
pub fn update_current_pos(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), VmError> {
    publish(vm, &bridge.current_position())
}

/// Publishes `obstacle = {bottom, front, right, back, left}`.
///
/// # Errors
/// - Interpreter allocation faults.
pub fn update_obstacle(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), VmError> {
    publish(vm, &bridge.obstacles())
}

/// Publishes `flight = {rc_cmd, status, rc_goto = {latitude, longitude, altitude}}`.
///
/// The remote-control command is consumed: the next report shows `0` unless a new one
/// arrives in between. The command is consumed even if storing the table fails.
///
/// `rc_goto` is only reachable as `flight.rc_goto`; there is no separate `rc_goto` global.
/// Scripts written against bridges that publish it at the top level must read it through
/// `flight` instead.
///
/// # Errors
/// - Interpreter allocation faults.
pub fn update_flight_status(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), VmError> {
    let report = bridge.take_flight_report();
    if report.rc_cmd != 0 {
        event!("Remote control command {} handed to script", report.rc_cmd);
    }
    publish(vm, &report)
}

/// Runs every publisher in tick order: battery, position, obstacle, flight.
///
/// # Errors
/// - The first interpreter allocation fault; later publishers are skipped.
pub fn publish_all(bridge: &CommandBridge, vm: &mut dyn ScriptVm) -> Result<(), VmError> {
    update_battery(bridge, vm)?;
    update_current_pos(bridge, vm)?;
    update_obstacle(bridge, vm)?;
    update_flight_status(bridge, vm)
}
