use strum_macros::{Display, EnumIter};

/// Flight-stack command identifiers, numbered as the MAVLink `MAV_CMD` enumeration.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter)]
pub enum CommandCode {
    #[strum(serialize = "NAV_WAYPOINT")]
    NavWaypoint,
    #[strum(serialize = "NAV_RETURN_TO_LAUNCH")]
    NavReturnToLaunch,
    #[strum(serialize = "NAV_LAND")]
    NavLand,
    #[strum(serialize = "NAV_TAKEOFF")]
    NavTakeoff,
    #[strum(serialize = "CMD_COMPONENT_ARM_DISARM")]
    ComponentArm,
    /// Not a distinct MAVLink command: the dispatcher reads `ARM_DISARM + 1` as "disarm".
    #[strum(serialize = "CMD_COMPONENT_ARM_DISARM+1")]
    ComponentDisarm,
}

impl CommandCode {
    const ARM_DISARM: u16 = 400;

    pub fn raw(self) -> u16 {
        match self {
            CommandCode::NavWaypoint => 16,
            CommandCode::NavReturnToLaunch => 20,
            CommandCode::NavLand => 21,
            CommandCode::NavTakeoff => 22,
            CommandCode::ComponentArm => Self::ARM_DISARM,
            CommandCode::ComponentDisarm => Self::ARM_DISARM + 1,
        }
    }
}

impl TryFrom<u16> for CommandCode {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            16 => Ok(CommandCode::NavWaypoint),
            20 => Ok(CommandCode::NavReturnToLaunch),
            21 => Ok(CommandCode::NavLand),
            22 => Ok(CommandCode::NavTakeoff),
            400 => Ok(CommandCode::ComponentArm),
            401 => Ok(CommandCode::ComponentDisarm),
            other => Err(other),
        }
    }
}

/// One-shot signal telling the dispatcher which kind of command is waiting.
///
/// Takeoff, land and go-home share [`PendingMarker::Flight`] since none of them
/// needs a horizontal destination. On the raw wire the idle state is `0`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Display, EnumIter)]
pub enum PendingMarker {
    Flight,
    Goto,
    Arm,
    Disarm,
}

impl PendingMarker {
    pub const IDLE_RAW: i32 = 0;

    pub fn raw(self) -> i32 {
        match self {
            PendingMarker::Flight => 1,
            PendingMarker::Goto => 2,
            PendingMarker::Arm => 3,
            PendingMarker::Disarm => 4,
        }
    }

    /// Encodes an optional marker the way the dispatcher wire expects it.
    pub fn raw_or_idle(marker: Option<PendingMarker>) -> i32 {
        marker.map_or(Self::IDLE_RAW, PendingMarker::raw)
    }
}
