//! Vehicle-facing half of the bridge: the shared command state, the command tables
//! exchanged with the dispatcher and the geodesy used to turn offsets into waypoints.

mod command_code;
mod command_state;
pub(crate) mod geodesy;
mod one_shot;
mod telemetry;

pub use command_code::{CommandCode, PendingMarker};
pub use command_state::{CommandBridge, CommandState};
pub use one_shot::OneShot;
pub use telemetry::{Battery, FlightReport, FlightStatus, ObstacleRanges, Position};
