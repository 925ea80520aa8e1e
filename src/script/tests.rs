use super::closures::{self, register_closures};
use super::publishers::{self, publish_all};
use super::{
    ClosureError, HeapVm, ScriptValue, ScriptVm, Table, TableBuilder, TelemetryRecord, ValueKind,
    VmError,
};
use crate::uav_control::{
    Battery, CommandBridge, CommandCode, FlightReport, ObstacleRanges, PendingMarker, Position,
};

fn init_vm() -> (CommandBridge, HeapVm) {
    let bridge = CommandBridge::new();
    let mut vm = HeapVm::new();
    register_closures(&bridge, &mut vm).unwrap();
    (bridge, vm)
}

fn global_table<'a>(vm: &'a HeapVm, name: &str) -> &'a Table {
    vm.global(name).and_then(ScriptValue::as_table).unwrap()
}

fn float_field(table: &Table, key: &str) -> f64 {
    table.get(key).and_then(ScriptValue::as_float).unwrap()
}

fn int_field(table: &Table, key: &str) -> i64 {
    table.get(key).and_then(ScriptValue::as_int).unwrap()
}

#[test]
fn test_all_closures_registered() {
    let (_, vm) = init_vm();
    let mut names: Vec<&str> = vm.natives().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "print", "uav_arm", "uav_disarm", "uav_gohome", "uav_goto", "uav_land", "uav_moveto",
            "uav_takeoff"
        ]
    );
    assert_eq!(vm.global(closures::ARM), Some(&ScriptValue::Closure("uav_arm".to_string())));
}

#[test]
fn test_duplicate_registration_rejected() {
    let (bridge, mut vm) = init_vm();
    assert_eq!(
        register_closures(&bridge, &mut vm),
        Err(VmError::DuplicateSymbol(closures::TAKEOFF.to_string()))
    );
}

#[test]
fn test_unknown_closure() {
    let (_, mut vm) = init_vm();
    assert_eq!(
        vm.call("uav_flip", vec![]),
        Err(ClosureError::Vm(VmError::UnknownSymbol("uav_flip".to_string())))
    );
}

#[test]
fn test_takeoff_then_moveto_through_vm() {
    let (bridge, mut vm) = init_vm();
    bridge.set_current_pos(45.564_489, -73.562_537, 0.0);
    vm.call(closures::TAKEOFF, vec![10.0.into()]).unwrap();
    assert_eq!(bridge.get_cmd(), Some(CommandCode::NavTakeoff));
    assert_eq!(bridge.snapshot().pending(), Some(PendingMarker::Flight));

    vm.call(closures::GOTO_VECTOR, vec![3.0.into(), 4.0.into()]).unwrap();
    let state = bridge.snapshot();
    assert!((state.desired_height() - 10.0).abs() < f64::EPSILON);
    assert_eq!(state.primary_cmd(), Some(CommandCode::NavWaypoint));
    assert_eq!(state.pending(), Some(PendingMarker::Goto));
    assert!((state.goal_position().altitude - 10.0).abs() < f64::EPSILON);
    assert!(state.goal_position().latitude > 45.564_489);
}

#[test]
fn test_takeoff_rejects_bad_arguments() {
    let (bridge, mut vm) = init_vm();
    assert_eq!(
        vm.call(closures::TAKEOFF, vec![]),
        Err(ClosureError::ArgCount { closure: closures::TAKEOFF, expected: 1, got: 0 })
    );
    assert_eq!(
        vm.call(closures::TAKEOFF, vec![10.into()]),
        Err(ClosureError::ArgType {
            closure: closures::TAKEOFF,
            index: 1,
            expected: ValueKind::Float,
            got: ValueKind::Int,
        })
    );
    let state = bridge.snapshot();
    assert_eq!(state.primary_cmd(), None);
    assert_eq!(state.pending(), None);
    assert!(state.desired_height().abs() < f64::EPSILON);
}

#[test]
fn test_non_finite_arguments_rejected() {
    let (bridge, mut vm) = init_vm();
    bridge.set_current_pos(45.564_489, -73.562_537, 0.0);
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert_eq!(
            vm.call(closures::TAKEOFF, vec![bad.into()]),
            Err(ClosureError::NotFinite { closure: closures::TAKEOFF, index: 1 })
        );
        assert_eq!(
            vm.call(closures::GOTO_VECTOR, vec![1.0.into(), bad.into()]),
            Err(ClosureError::NotFinite { closure: closures::GOTO_VECTOR, index: 2 })
        );
    }
    assert_eq!(bridge.bzz_cmd(), None);
    assert!(bridge.desired_height().abs() < f64::EPSILON);

    // a later goto still gets a real altitude
    vm.call(closures::TAKEOFF, vec![12.0.into()]).unwrap();
    vm.call(closures::GOTO_VECTOR, vec![10.0.into(), 0.0.into()]).unwrap();
    let goal = bridge.get_goto();
    assert!((goal.altitude - 12.0).abs() < f64::EPSILON);
    assert!(goal.latitude.is_finite() && goal.longitude.is_finite());
}

#[test]
fn test_moveto_rejects_bad_arguments() {
    let (bridge, mut vm) = init_vm();
    let err = vm.call(closures::GOTO_VECTOR, vec![1.0.into(), "north".into()]).unwrap_err();
    assert_eq!(
        err,
        ClosureError::ArgType {
            closure: closures::GOTO_VECTOR,
            index: 2,
            expected: ValueKind::Float,
            got: ValueKind::Str,
        }
    );
    assert!(err.to_string().contains("expected float, got string"));
    assert!(vm.call(closures::GOTO_VECTOR, vec![1.0.into()]).is_err());
    assert_eq!(bridge.bzz_cmd(), None);
    assert_eq!(bridge.get_goto(), Position::default());
}

#[test]
fn test_zero_argument_closures_reject_arguments() {
    let (bridge, mut vm) = init_vm();
    for name in [closures::LAND, closures::GO_HOME, closures::ARM, closures::DISARM, closures::GOTO_ABSOLUTE] {
        assert!(matches!(
            vm.call(name, vec![1.0.into()]),
            Err(ClosureError::ArgCount { expected: 0, got: 1, .. })
        ));
    }
    assert_eq!(bridge.bzz_cmd(), None);
}

#[test]
fn test_command_table() {
    let (bridge, mut vm) = init_vm();
    let cases = [
        (closures::LAND, CommandCode::NavLand, 1),
        (closures::GO_HOME, CommandCode::NavReturnToLaunch, 1),
        (closures::GOTO_ABSOLUTE, CommandCode::NavWaypoint, 2),
        (closures::ARM, CommandCode::ComponentArm, 3),
        (closures::DISARM, CommandCode::ComponentDisarm, 4),
    ];
    for (name, code, marker) in cases {
        vm.call(name, vec![]).unwrap();
        assert_eq!(bridge.get_cmd(), Some(code), "{name}");
        assert_eq!(PendingMarker::raw_or_idle(bridge.bzz_cmd()), marker, "{name}");
        assert_eq!(bridge.bzz_cmd(), None);
    }
}

#[test]
fn test_arm_disarm_keeps_only_last() {
    let (bridge, mut vm) = init_vm();
    vm.call(closures::ARM, vec![]).unwrap();
    vm.call(closures::DISARM, vec![]).unwrap();
    assert_eq!(bridge.get_cmd().map(CommandCode::raw), Some(CommandCode::ComponentArm.raw() + 1));
    assert_eq!(bridge.bzz_cmd(), Some(PendingMarker::Disarm));
    assert_eq!(bridge.bzz_cmd(), None);
}

#[test]
fn test_goto_absolute_through_vm() {
    let (bridge, mut vm) = init_vm();
    vm.call(closures::TAKEOFF, vec![20.0.into()]).unwrap();
    bridge.rc_set_goto(Position::new(45.565, -73.563, 0.0));
    vm.call(closures::GOTO_ABSOLUTE, vec![]).unwrap();
    assert_eq!(bridge.get_goto(), Position::new(45.565, -73.563, 20.0));
}

#[test]
fn test_print_accepts_anything() {
    let (_, mut vm) = init_vm();
    let table = TableBuilder::new().field("a", 1).build();
    let args = vec![ScriptValue::Nil, 3.into(), 2.5.into(), "hello".into(), table.into()];
    assert!(vm.call(closures::PRINT, args).is_ok());
}

#[test]
#[allow(clippy::float_cmp)]
fn test_battery_publisher() {
    let (bridge, mut vm) = init_vm();
    bridge.set_battery(11.1, 2.0, 87.5);
    publishers::update_battery(&bridge, &mut vm).unwrap();
    let battery = global_table(&vm, "battery");
    assert_eq!(battery.keys().collect::<Vec<_>>(), vec!["voltage", "current", "capacity"]);
    assert_eq!(float_field(battery, "voltage"), 11.1);
    assert_eq!(float_field(battery, "current"), 2.0);
    assert_eq!(float_field(battery, "capacity"), 87.5);
}

#[test]
#[allow(clippy::float_cmp)]
fn test_position_and_obstacle_publishers() {
    let (bridge, mut vm) = init_vm();
    bridge.set_current_pos(45.5, -73.5, 12.0);
    bridge.set_obstacle_dist([0.2, 1.0, 2.0, 3.0, 4.0]);
    publishers::update_current_pos(&bridge, &mut vm).unwrap();
    publishers::update_obstacle(&bridge, &mut vm).unwrap();

    let position = global_table(&vm, "position");
    assert!((float_field(position, "latitude") - 45.5).abs() < f64::EPSILON);
    assert!((float_field(position, "longitude") + 73.5).abs() < f64::EPSILON);
    assert!((float_field(position, "altitude") - 12.0).abs() < f64::EPSILON);

    let obstacle = global_table(&vm, "obstacle");
    let ranges: Vec<f64> = ["bottom", "front", "right", "back", "left"]
        .iter()
        .map(|k| float_field(obstacle, k))
        .collect();
    assert_eq!(ranges, vec![0.2, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_flight_publisher_consumes_rc_cmd() {
    let (bridge, mut vm) = init_vm();
    bridge.flight_status_update(4);
    bridge.rc_set_goto(Position::new(45.0, -73.0, 5.0));
    bridge.rc_call(5);

    publishers::update_flight_status(&bridge, &mut vm).unwrap();
    let flight = global_table(&vm, "flight");
    assert_eq!(int_field(flight, "rc_cmd"), 5);
    assert_eq!(int_field(flight, "status"), 4);
    let rc_goto = flight.get("rc_goto").and_then(ScriptValue::as_table).unwrap();
    assert!((float_field(rc_goto, "latitude") - 45.0).abs() < f64::EPSILON);
    assert!((float_field(rc_goto, "altitude") - 5.0).abs() < f64::EPSILON);
    assert!(vm.global("rc_goto").is_none());

    publishers::update_flight_status(&bridge, &mut vm).unwrap();
    assert_eq!(int_field(global_table(&vm, "flight"), "rc_cmd"), 0);
}

#[test]
fn test_publishers_overwrite_previous_table() {
    let (bridge, mut vm) = init_vm();
    bridge.set_battery(12.0, 1.0, 90.0);
    publish_all(&bridge, &mut vm).unwrap();
    let used = vm.heap_used();
    bridge.set_battery(11.0, 1.5, 70.0);
    publish_all(&bridge, &mut vm).unwrap();
    assert_eq!(vm.heap_used(), used);
    assert!((float_field(global_table(&vm, "battery"), "capacity") - 70.0).abs() < f64::EPSILON);
}

#[test]
fn test_allocation_fault_is_propagated() {
    let bridge = CommandBridge::new();
    let mut vm = HeapVm::with_heap_limit(10);
    // battery needs 7 cells, position another 7
    assert!(publishers::update_battery(&bridge, &mut vm).is_ok());
    assert_eq!(
        publish_all(&bridge, &mut vm),
        Err(VmError::OutOfMemory { requested: 7, available: 3 })
    );
    assert!(vm.global("position").is_none());
}

#[test]
fn test_registration_fails_on_full_heap() {
    let bridge = CommandBridge::new();
    let mut vm = HeapVm::with_heap_limit(3);
    assert!(matches!(
        register_closures(&bridge, &mut vm),
        Err(VmError::OutOfMemory { requested: 1, available: 0 })
    ));
}

#[test]
fn test_record_fields_match_tables() {
    fn keys<R: TelemetryRecord>(record: &R) -> Vec<String> {
        record.to_table().keys().map(str::to_string).collect()
    }
    fn fields<R: TelemetryRecord>() -> Vec<String> {
        R::FIELDS.iter().map(|s| (*s).to_string()).collect()
    }
    assert_eq!(keys(&Battery::default()), fields::<Battery>());
    assert_eq!(keys(&Position::default()), fields::<Position>());
    assert_eq!(keys(&ObstacleRanges::default()), fields::<ObstacleRanges>());
    assert_eq!(keys(&FlightReport::default()), fields::<FlightReport>());
}

#[test]
fn test_table_put_overwrites_in_place() {
    let mut table = TableBuilder::new().field("a", 1).field("b", 2).build();
    table.put("a", 3.into());
    assert_eq!(table.len(), 2);
    assert_eq!(table.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(table.get("a"), Some(&ScriptValue::Int(3)));
    assert_eq!(ScriptValue::from(table).cells(), 5);
    assert_eq!(ScriptValue::from(Table::new()).to_string(), "[empty table]");
}

#[test]
fn test_args_are_one_based() {
    let (_, mut vm) = init_vm();
    vm.call(closures::PRINT, vec![]).unwrap();
    assert_eq!(vm.arg_count(), 0);
    assert_eq!(vm.arg(0), None);
}
