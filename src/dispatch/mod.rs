//! Dispatcher side of the bridge: pulls pending commands and feeds a vehicle, which in turn
//! pushes its telemetry back through the bridge accessors.

mod dispatcher;
mod vehicle;

pub use dispatcher::{DispatchedCommand, FlightDispatcher};
pub use vehicle::{LandedState, SimulatedVehicle, Vehicle, VehicleError};
