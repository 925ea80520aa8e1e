#![allow(dead_code, clippy::similar_names)]
mod config;
mod dispatch;
mod logger;
mod mission;
mod script;
mod uav_control;

use crate::config::BridgeConfig;
use crate::dispatch::{FlightDispatcher, SimulatedVehicle};
use crate::mission::{DemoMission, MissionStage};
use crate::script::{closures::register_closures, publishers::publish_all, HeapVm};
use crate::uav_control::{geodesy, CommandBridge, CommandCode};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Offset of the destination the simulated remote-control operator sends, in meters.
const RC_OFFSET: (f64, f64) = (-20.0, 15.0);

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let config = BridgeConfig::from_env();
    info!("Starting bridge with {config:?}");
    let bridge = CommandBridge::new();

    let vehicle = Arc::new(Mutex::new(SimulatedVehicle::new(bridge.clone(), config.home())));
    vehicle.lock().await.publish_telemetry();

    let dispatcher = FlightDispatcher::new(bridge.clone(), Arc::clone(&vehicle));
    let dispatch_interval = config.dispatch_interval();
    tokio::spawn(async move {
        dispatcher.run(dispatch_interval).await;
    });

    let vehicle_clone = Arc::clone(&vehicle);
    let telemetry_interval = config.telemetry_interval();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(telemetry_interval);
        loop {
            ticker.tick().await;
            vehicle_clone.lock().await.step(telemetry_interval.as_secs_f64());
        }
    });

    let mut vm = config.heap_limit().map_or_else(HeapVm::new, HeapVm::with_heap_limit);
    if let Err(e) = register_closures(&bridge, &mut vm) {
        fatal!("Could not register native closures: {e}");
    }

    let mut mission = DemoMission::new();
    let mut rc_sent = false;
    let mut ticker = tokio::time::interval(config.script_tick());
    loop {
        ticker.tick().await;
        if let Err(e) = publish_all(&bridge, &mut vm) {
            fatal!("Telemetry publishing failed: {e}");
        }
        match mission.tick(&mut vm) {
            Ok(MissionStage::AwaitRc) if !rc_sent => {
                let (dx, dy) = RC_OFFSET;
                let (range, bearing) = geodesy::range_bearing(dx, dy);
                let dest = geodesy::gps_from_rb(bridge.current_position(), 0.0, range, bearing);
                log!("Remote control operator sends go to {dest}");
                bridge.rc_set_goto(dest);
                bridge.rc_call(i32::from(CommandCode::NavWaypoint.raw()));
                rc_sent = true;
            }
            Ok(MissionStage::Done) => break,
            Ok(_) => (),
            Err(e) => error!("Mission step failed in stage {}: {e}", mission.stage()),
        }
    }
    let state = bridge.snapshot();
    info!(
        "Mission complete, battery at {:.1}%, landed at {}",
        state.battery().capacity,
        state.current_position()
    );
}
