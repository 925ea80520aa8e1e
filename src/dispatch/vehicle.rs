use crate::uav_control::{geodesy, CommandBridge, CommandCode, ObstacleRanges, Position};
use std::fmt::{Display, Formatter};

/// Receiver of the commands the dispatcher pulls out of the bridge.
pub trait Vehicle: Send {
    /// Forwards one command with its destination to the flight stack.
    ///
    /// # Errors
    /// - [`VehicleError`] if the flight stack refuses the command.
    fn execute(&mut self, cmd: CommandCode, goal: Position) -> Result<(), VehicleError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleError {
    NotArmed(CommandCode),
    NotInAir(CommandCode),
    InAir(CommandCode),
}

impl Display for VehicleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleError::NotArmed(cmd) => write!(f, "{cmd} rejected: vehicle is not armed"),
            VehicleError::NotInAir(cmd) => write!(f, "{cmd} rejected: vehicle is on the ground"),
            VehicleError::InAir(cmd) => write!(f, "{cmd} rejected: vehicle is airborne"),
        }
    }
}

impl std::error::Error for VehicleError {}

/// `MAV_LANDED_STATE` values reported as the flight status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandedState {
    OnGround = 1,
    InAir = 2,
    Takeoff = 3,
    Landing = 4,
}

/// Point-mass vehicle used when no flight stack is attached.
///
/// Flies straight lines at constant speed, drains its battery while armed and pushes its
/// telemetry back into the bridge after every step.
#[derive(Debug)]
pub struct SimulatedVehicle {
    bridge: CommandBridge,
    home: Position,
    pos: Position,
    target: Option<Position>,
    armed: bool,
    landed_state: LandedState,
    land_on_arrival: bool,
    capacity: f64,
}

impl SimulatedVehicle {
    /// Horizontal cruise speed in m/s.
    const CRUISE_SPEED: f64 = 5.0;
    /// Vertical speed in m/s.
    const CLIMB_RATE: f64 = 2.0;
    /// Battery drain in percent per second while armed.
    const DRAIN_RATE: f64 = 0.05;
    const FULL_VOLTAGE: f64 = 12.6;
    const EMPTY_VOLTAGE: f64 = 10.5;
    /// Range reported by side sensors when nothing is in sight.
    const CLEAR_RANGE: f64 = 10.0;
    const ARRIVAL_TOL: f64 = 0.05;

    pub fn new(bridge: CommandBridge, home: Position) -> Self {
        Self {
            bridge,
            home,
            pos: home,
            target: None,
            armed: false,
            landed_state: LandedState::OnGround,
            land_on_arrival: false,
            capacity: 100.0,
        }
    }

    pub fn position(&self) -> Position { self.pos }
    pub fn is_armed(&self) -> bool { self.armed }
    pub fn landed_state(&self) -> LandedState { self.landed_state }

    fn in_air(&self) -> bool { self.landed_state != LandedState::OnGround }

    /// Advances the simulation by `dt` seconds and publishes the new telemetry.
    pub fn step(&mut self, dt: f64) {
        if let Some(target) = self.target {
            self.move_towards(target, dt);
        }
        if self.armed {
            self.capacity = (self.capacity - Self::DRAIN_RATE * dt).max(0.0);
        }
        self.publish_telemetry();
    }

    fn move_towards(&mut self, target: Position, dt: f64) {
        let horizontal = geodesy::great_circle_distance(self.pos, target);
        let max_h = Self::CRUISE_SPEED * dt;
        let frac = if horizontal > max_h { max_h / horizontal } else { 1.0 };
        self.pos.latitude += (target.latitude - self.pos.latitude) * frac;
        self.pos.longitude += (target.longitude - self.pos.longitude) * frac;

        let max_v = Self::CLIMB_RATE * dt;
        let dz = (target.altitude - self.pos.altitude).clamp(-max_v, max_v);
        self.pos.altitude += dz;

        let arrived = frac >= 1.0 && (target.altitude - self.pos.altitude).abs() < Self::ARRIVAL_TOL;
        if !arrived {
            return;
        }
        self.target = None;
        match self.landed_state {
            LandedState::Takeoff => self.landed_state = LandedState::InAir,
            LandedState::Landing => {
                self.pos.altitude = 0.0;
                self.landed_state = LandedState::OnGround;
            }
            LandedState::InAir if self.land_on_arrival => {
                self.land_on_arrival = false;
                self.begin_landing();
            }
            _ => {}
        }
    }

    fn begin_landing(&mut self) {
        self.target = Some(self.pos.with_altitude(0.0));
        self.landed_state = LandedState::Landing;
    }

    pub fn publish_telemetry(&self) {
        let voltage = Self::EMPTY_VOLTAGE
            + (Self::FULL_VOLTAGE - Self::EMPTY_VOLTAGE) * self.capacity / 100.0;
        let current = match (self.armed, self.in_air()) {
            (_, true) => 14.0,
            (true, false) => 1.2,
            (false, false) => 0.3,
        };
        self.bridge.set_current_pos(self.pos.latitude, self.pos.longitude, self.pos.altitude);
        self.bridge.set_battery(voltage, current, self.capacity);
        self.bridge.set_obstacle_dist(ObstacleRanges {
            bottom: self.pos.altitude,
            front: Self::CLEAR_RANGE,
            right: Self::CLEAR_RANGE,
            back: Self::CLEAR_RANGE,
            left: Self::CLEAR_RANGE,
        }.to_array());
        self.bridge.flight_status_update(self.landed_state as u8);
    }
}

impl Vehicle for SimulatedVehicle {
    fn execute(&mut self, cmd: CommandCode, goal: Position) -> Result<(), VehicleError> {
        match cmd {
            CommandCode::ComponentArm => self.armed = true,
            CommandCode::ComponentDisarm => {
                if self.in_air() {
                    return Err(VehicleError::InAir(cmd));
                }
                self.armed = false;
            }
            CommandCode::NavTakeoff => {
                if !self.armed {
                    return Err(VehicleError::NotArmed(cmd));
                }
                self.target = Some(self.pos.with_altitude(goal.altitude));
                self.landed_state = LandedState::Takeoff;
            }
            CommandCode::NavWaypoint => {
                if !self.in_air() {
                    return Err(VehicleError::NotInAir(cmd));
                }
                self.target = Some(goal);
                self.landed_state = LandedState::InAir;
            }
            CommandCode::NavLand => {
                if !self.in_air() {
                    return Err(VehicleError::NotInAir(cmd));
                }
                self.begin_landing();
            }
            CommandCode::NavReturnToLaunch => {
                if !self.in_air() {
                    return Err(VehicleError::NotInAir(cmd));
                }
                self.target = Some(self.home.with_altitude(self.pos.altitude));
                self.landed_state = LandedState::InAir;
                self.land_on_arrival = true;
            }
        }
        Ok(())
    }
}
