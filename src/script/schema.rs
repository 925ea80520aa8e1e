use super::value::{ScriptValue, Table};
use crate::uav_control::{Battery, FlightReport, ObstacleRanges, Position};

/// Builds a [`Table`] field by field in schema order.
#[derive(Debug, Default)]
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn field(mut self, name: &str, value: impl Into<ScriptValue>) -> Self {
        self.table.put(name, value.into());
        self
    }

    pub fn build(self) -> Table { self.table }
}

/// A telemetry message exposed to scripts as a table stored at a fixed global name.
pub trait TelemetryRecord {
    /// The global the table is stored under.
    const GLOBAL: &'static str;
    /// Field names in the order they are written.
    const FIELDS: &'static [&'static str];

    fn to_table(&self) -> Table;
}

impl TelemetryRecord for Battery {
    const GLOBAL: &'static str = "battery";
    const FIELDS: &'static [&'static str] = &["voltage", "current", "capacity"];

    fn to_table(&self) -> Table {
        TableBuilder::new()
            .field(Self::FIELDS[0], self.voltage)
            .field(Self::FIELDS[1], self.current)
            .field(Self::FIELDS[2], self.capacity)
            .build()
    }
}

impl TelemetryRecord for Position {
    const GLOBAL: &'static str = "position";
    const FIELDS: &'static [&'static str] = &["latitude", "longitude", "altitude"];

    fn to_table(&self) -> Table {
        TableBuilder::new()
            .field(Self::FIELDS[0], self.latitude)
            .field(Self::FIELDS[1], self.longitude)
            .field(Self::FIELDS[2], self.altitude)
            .build()
    }
}

impl TelemetryRecord for ObstacleRanges {
    const GLOBAL: &'static str = "obstacle";
    const FIELDS: &'static [&'static str] = &["bottom", "front", "right", "back", "left"];

    fn to_table(&self) -> Table {
        Self::FIELDS
            .iter()
            .zip(self.to_array())
            .fold(TableBuilder::new(), |b, (name, dist)| b.field(name, dist))
            .build()
    }
}

impl TelemetryRecord for FlightReport {
    const GLOBAL: &'static str = "flight";
    const FIELDS: &'static [&'static str] = &["rc_cmd", "status", "rc_goto"];

    fn to_table(&self) -> Table {
        TableBuilder::new()
            .field(Self::FIELDS[0], self.rc_cmd)
            .field(Self::FIELDS[1], i64::from(self.status.0))
            .field(Self::FIELDS[2], self.rc_goto.to_table())
            .build()
    }
}
