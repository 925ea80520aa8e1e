use super::vehicle::Vehicle;
use crate::uav_control::{geodesy, CommandBridge, CommandCode, PendingMarker, Position};
use crate::{cmd, error, event};
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// A command pulled from the bridge in one poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchedCommand {
    pub marker: PendingMarker,
    pub code: CommandCode,
    pub goal: Position,
}

/// Polls the bridge for new commands at its own cadence and forwards them to a [`Vehicle`].
///
/// Commands issued faster than the poll interval overwrite each other; only the latest
/// one reaches the vehicle. Failures are logged and never retried.
pub struct FlightDispatcher<V: Vehicle> {
    bridge: CommandBridge,
    vehicle: Arc<Mutex<V>>,
}

impl<V: Vehicle> FlightDispatcher<V> {
    pub fn new(bridge: CommandBridge, vehicle: Arc<Mutex<V>>) -> Self { Self { bridge, vehicle } }

    /// Consumes the pending command, if any, and hands it to the vehicle.
    ///
    /// # Returns
    /// - The command that was dispatched, or `None` if nothing was pending.
    pub async fn poll(&self) -> Option<DispatchedCommand> {
        let (marker, code, goal) = self.bridge.take_command()?;
        let distance = geodesy::great_circle_distance(self.bridge.current_position(), goal);
        cmd!(
            "Dispatching {code} ({}) marker {}, goal {goal} ({distance:.1} m away)",
            code.raw(),
            marker.raw()
        );
        if let Err(e) = self.vehicle.lock().await.execute(code, goal) {
            error!("{e}");
        }
        Some(DispatchedCommand { marker, code, goal })
    }

    /// Runs [`FlightDispatcher::poll`] forever, once per `interval`.
    pub async fn run(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Some(dispatched) = self.poll().await {
                event!("Dispatched {dispatched:?}");
            }
        }
    }
}
