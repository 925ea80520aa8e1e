use std::fmt::{Display, Formatter};

/// WGS84 position in degrees, altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Position {
    pub const fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self { latitude, longitude, altitude }
    }

    pub fn with_altitude(self, altitude: f64) -> Self { Self { altitude, ..self } }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Latitude: {:.7}, Longitude: {:.7}, Altitude: {:.7}",
            self.latitude, self.longitude, self.altitude
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Battery {
    pub voltage: f64,
    pub current: f64,
    /// Remaining capacity as reported by the flight stack.
    pub capacity: f64,
}

impl Battery {
    pub const fn new(voltage: f64, current: f64, capacity: f64) -> Self {
        Self { voltage, current, capacity }
    }
}

/// Proximity ranges in meters. Field order matches the sensor buffer:
/// bottom, front, right, back, left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObstacleRanges {
    pub bottom: f64,
    pub front: f64,
    pub right: f64,
    pub back: f64,
    pub left: f64,
}

impl ObstacleRanges {
    pub const SENSOR_COUNT: usize = 5;

    pub fn from_array(dist: [f64; Self::SENSOR_COUNT]) -> Self {
        Self {
            bottom: dist[0],
            front: dist[1],
            right: dist[2],
            back: dist[3],
            left: dist[4],
        }
    }

    pub fn to_array(self) -> [f64; Self::SENSOR_COUNT] {
        [self.bottom, self.front, self.right, self.back, self.left]
    }
}

/// Opaque status byte of the flight stack, stored and forwarded as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlightStatus(pub u8);

/// What the script sees of the flight stack and the remote-control channel on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightReport {
    /// Remote-control command code, `0` when none was issued since the last report.
    pub rc_cmd: i32,
    pub status: FlightStatus,
    pub rc_goto: Position,
}
