use super::{
    command_code::{CommandCode, PendingMarker},
    geodesy,
    one_shot::OneShot,
    telemetry::{Battery, FlightReport, FlightStatus, ObstacleRanges, Position},
};
use crate::{event, warn};
use std::sync::{Arc, Mutex, MutexGuard};

/// Everything the bridge knows about the vehicle and the last requested command.
///
/// All numeric fields start at zero, which readers treat as "not yet known".
#[derive(Debug, Clone, Default)]
pub struct CommandState {
    /// Target of the last script or absolute goto request.
    goal_position: Position,
    /// Target last requested through the remote-control side channel.
    rc_goal_position: Position,
    current_position: Position,
    battery: Battery,
    obstacles: ObstacleRanges,
    status: FlightStatus,
    /// Altitude of the last takeoff, applied to every goto destination.
    desired_height: f64,
    /// Last primary command code. Reading it does not consume it.
    primary_cmd: Option<CommandCode>,
    pending: OneShot<PendingMarker>,
    rc_cmd: OneShot<i32>,
}

impl CommandState {
    pub fn goal_position(&self) -> Position { self.goal_position }
    pub fn rc_goal_position(&self) -> Position { self.rc_goal_position }
    pub fn current_position(&self) -> Position { self.current_position }
    pub fn battery(&self) -> Battery { self.battery }
    pub fn obstacles(&self) -> ObstacleRanges { self.obstacles }
    pub fn status(&self) -> FlightStatus { self.status }
    pub fn desired_height(&self) -> f64 { self.desired_height }
    pub fn primary_cmd(&self) -> Option<CommandCode> { self.primary_cmd }
    pub fn pending(&self) -> Option<PendingMarker> { self.pending.peek() }

    fn issue(&mut self, code: CommandCode, marker: PendingMarker) {
        self.primary_cmd = Some(code);
        self.pending.set(marker);
    }
}

/// Shared handle to the [`CommandState`].
///
/// The script side (closures and publishers) and the dispatcher side (accessors) each
/// hold a clone. Every operation takes the lock exactly once, so compound
/// read-and-clear operations never interleave with a writer.
#[derive(Debug, Clone, Default)]
pub struct CommandBridge {
    state: Arc<Mutex<CommandState>>,
}

impl CommandBridge {
    pub fn new() -> Self { Self::default() }

    /// Acquires the state lock.
    ///
    /// # Panics
    /// - If the Mutex is poisoned.
    fn lock_state(&self) -> MutexGuard<'_, CommandState> {
        self.state.lock().expect("[FATAL] Mutex poisoned: Failed to acquire command state lock")
    }

    /// Returns a consistent copy of the whole state.
    pub fn snapshot(&self) -> CommandState { self.lock_state().clone() }

    // ----- script side -----

    /// Requests a takeoff to `altitude` and remembers it as the desired height.
    pub fn takeoff(&self, altitude: f64) {
        let mut state = self.lock_state();
        state.desired_height = altitude;
        state.goal_position.altitude = altitude;
        state.issue(CommandCode::NavTakeoff, PendingMarker::Flight);
    }

    pub fn land(&self) { self.lock_state().issue(CommandCode::NavLand, PendingMarker::Flight); }

    pub fn go_home(&self) {
        self.lock_state().issue(CommandCode::NavReturnToLaunch, PendingMarker::Flight);
    }

    pub fn arm(&self) { self.lock_state().issue(CommandCode::ComponentArm, PendingMarker::Arm); }

    pub fn disarm(&self) {
        self.lock_state().issue(CommandCode::ComponentDisarm, PendingMarker::Disarm);
    }

    /// Requests a waypoint `dx`/`dy` meters away from the current position.
    ///
    /// # Returns
    /// - The new goal position.
    pub fn goto_vector(&self, dx: f64, dy: f64) -> Position {
        let (range, bearing) = geodesy::range_bearing(dx, dy);
        let mut state = self.lock_state();
        let goal = geodesy::gps_from_rb(state.current_position, state.desired_height, range, bearing);
        state.goal_position = goal;
        state.issue(CommandCode::NavWaypoint, PendingMarker::Goto);
        goal
    }

    /// Requests a waypoint at the last remote-control destination.
    ///
    /// The remote-control destination's altitude is overwritten with the desired height
    /// before it is copied into the goal.
    ///
    /// # Returns
    /// - The new goal position.
    pub fn goto_absolute(&self) -> Position {
        let mut state = self.lock_state();
        let height = state.desired_height;
        state.rc_goal_position.altitude = height;
        state.goal_position = state.rc_goal_position;
        state.issue(CommandCode::NavWaypoint, PendingMarker::Goto);
        state.goal_position
    }

    /// Builds the flight report and consumes the pending remote-control command in one step.
    pub fn take_flight_report(&self) -> FlightReport {
        let mut state = self.lock_state();
        FlightReport {
            rc_cmd: state.rc_cmd.take().unwrap_or(0),
            status: state.status,
            rc_goto: state.rc_goal_position,
        }
    }

    pub fn battery(&self) -> Battery { self.lock_state().battery }

    pub fn current_position(&self) -> Position { self.lock_state().current_position }

    pub fn obstacles(&self) -> ObstacleRanges { self.lock_state().obstacles }

    pub fn desired_height(&self) -> f64 { self.lock_state().desired_height }

    // ----- dispatcher side -----

    /// Returns the current goal without consuming anything.
    pub fn get_goto(&self) -> Position { self.lock_state().goal_position }

    /// Returns the last primary command code without consuming it.
    pub fn get_cmd(&self) -> Option<CommandCode> { self.lock_state().primary_cmd }

    /// Returns the pending command marker and resets it to idle.
    pub fn bzz_cmd(&self) -> Option<PendingMarker> {
        let marker = self.lock_state().pending.take();
        if let Some(m) = marker {
            event!("Dispatcher consumed pending marker {m}");
        }
        marker
    }

    /// Consumes the pending marker together with the command code and goal it was issued with.
    ///
    /// Unlike calling [`CommandBridge::bzz_cmd`], [`CommandBridge::get_cmd`] and
    /// [`CommandBridge::get_goto`] in turn, a script command issued concurrently can never
    /// mix into the returned triple; it stays pending for the next call.
    ///
    /// # Returns
    /// - `None` if no marker is pending.
    pub fn take_command(&self) -> Option<(PendingMarker, CommandCode, Position)> {
        let mut state = self.lock_state();
        let marker = state.pending.take()?;
        let Some(code) = state.primary_cmd else {
            warn!("Pending marker {marker} without a primary command, dropping it");
            return None;
        };
        event!("Dispatcher took {code} with marker {marker}");
        Some((marker, code, state.goal_position))
    }

    pub fn set_goto(&self, pos: Position) { self.lock_state().goal_position = pos; }

    pub fn rc_set_goto(&self, pos: Position) { self.lock_state().rc_goal_position = pos; }

    /// Records a remote-control command code; `0` means "no command".
    pub fn rc_call(&self, rc_cmd: i32) {
        let mut state = self.lock_state();
        if rc_cmd == 0 {
            state.rc_cmd.clear();
        } else {
            state.rc_cmd.set(rc_cmd);
        }
    }

    pub fn set_obstacle_dist(&self, dist: [f64; ObstacleRanges::SENSOR_COUNT]) {
        self.lock_state().obstacles = ObstacleRanges::from_array(dist);
    }

    pub fn set_battery(&self, voltage: f64, current: f64, remaining: f64) {
        self.lock_state().battery = Battery::new(voltage, current, remaining);
    }

    pub fn set_current_pos(&self, latitude: f64, longitude: f64, altitude: f64) {
        self.lock_state().current_position = Position::new(latitude, longitude, altitude);
    }

    pub fn flight_status_update(&self, status: u8) { self.lock_state().status = FlightStatus(status); }
}
