use crate::dispatch::LandedState;
use crate::script::{closures, ClosureError, HeapVm, ScriptValue};
use crate::uav_control::{geodesy, CommandCode, Position};
use crate::{info, warn};
use strum_macros::Display;

/// Stages of the built-in demonstration mission.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum MissionStage {
    Arm,
    TakeOff,
    Climbing,
    Surveying,
    AwaitRc,
    FollowingRc,
    Returning,
    Disarm,
    Done,
}

/// A fixed flight plan that stands in for a swarm script: it only talks to the bridge
/// through the registered closures and only observes the vehicle through the published
/// telemetry globals.
#[derive(Debug)]
pub struct DemoMission {
    stage: MissionStage,
    survey_origin: Position,
}

impl DemoMission {
    pub const TAKEOFF_ALT: f64 = 10.0;
    pub const SURVEY_LEG: (f64, f64) = (30.0, 40.0);
    const ARRIVAL_TOL: f64 = 0.5;

    pub fn new() -> Self { Self { stage: MissionStage::Arm, survey_origin: Position::default() } }

    pub fn stage(&self) -> MissionStage { self.stage }

    /// Runs one script tick against freshly published telemetry.
    ///
    /// # Errors
    /// - [`ClosureError`] if a closure rejected the call; the stage is not advanced.
    pub fn tick(&mut self, vm: &mut HeapVm) -> Result<MissionStage, ClosureError> {
        let pos = read_position(vm, "position");
        let status = read_field(vm, "flight", "status").and_then(|v| v.as_int()).unwrap_or(0);
        let next = match self.stage {
            MissionStage::Arm => {
                vm.call(closures::ARM, vec![])?;
                Some(MissionStage::TakeOff)
            }
            MissionStage::TakeOff => {
                vm.call(closures::TAKEOFF, vec![Self::TAKEOFF_ALT.into()])?;
                Some(MissionStage::Climbing)
            }
            MissionStage::Climbing if status == LandedState::InAir as i64 => {
                self.survey_origin = pos;
                let (dx, dy) = Self::SURVEY_LEG;
                vm.call(closures::GOTO_VECTOR, vec![dx.into(), dy.into()])?;
                Some(MissionStage::Surveying)
            }
            MissionStage::Surveying => {
                let (dx, dy) = Self::SURVEY_LEG;
                let travelled = geodesy::great_circle_distance(self.survey_origin, pos);
                (travelled > dx.hypot(dy) - Self::ARRIVAL_TOL).then_some(MissionStage::AwaitRc)
            }
            MissionStage::AwaitRc => {
                let rc_cmd = read_field(vm, "flight", "rc_cmd").and_then(ScriptValue::as_int).unwrap_or(0);
                match decode_rc_cmd(rc_cmd) {
                    None => None,
                    Some(CommandCode::NavWaypoint) => {
                        vm.call(closures::PRINT, vec!["Remote control requested go to".into(), rc_cmd.into()])?;
                        vm.call(closures::GOTO_ABSOLUTE, vec![])?;
                        Some(MissionStage::FollowingRc)
                    }
                    Some(CommandCode::NavReturnToLaunch) => {
                        vm.call(closures::PRINT, vec!["Remote control requested go home".into(), rc_cmd.into()])?;
                        vm.call(closures::GO_HOME, vec![])?;
                        Some(MissionStage::Returning)
                    }
                    Some(code) => {
                        warn!("Ignoring remote control command {code} while surveying");
                        None
                    }
                }
            }
            MissionStage::FollowingRc => {
                let rc_goto = read_position(vm, "flight.rc_goto");
                if geodesy::great_circle_distance(pos, rc_goto) < Self::ARRIVAL_TOL {
                    vm.call(closures::GO_HOME, vec![])?;
                    Some(MissionStage::Returning)
                } else {
                    None
                }
            }
            MissionStage::Returning if status == LandedState::OnGround as i64 => Some(MissionStage::Disarm),
            MissionStage::Disarm => {
                vm.call(closures::DISARM, vec![])?;
                Some(MissionStage::Done)
            }
            _ => None,
        };
        if let Some(stage) = next {
            info!("Mission stage {} -> {stage}", self.stage);
            self.stage = stage;
        }
        Ok(self.stage)
    }
}

impl Default for DemoMission {
    fn default() -> Self { Self::new() }
}

/// Maps the raw `rc_cmd` field to a command; `0` and unknown codes map to `None`.
fn decode_rc_cmd(rc_cmd: i64) -> Option<CommandCode> {
    if rc_cmd == 0 {
        return None;
    }
    let code = u16::try_from(rc_cmd).ok().and_then(|raw| CommandCode::try_from(raw).ok());
    if code.is_none() {
        warn!("Unknown remote control command {rc_cmd}");
    }
    code
}

/// Looks up `key` in the table at `path`, where `path` is a global name optionally followed
/// by `.`-separated nested table names.
fn read_field<'a>(vm: &'a HeapVm, path: &str, key: &str) -> Option<&'a ScriptValue> {
    let mut parts = path.split('.');
    let mut table = vm.global(parts.next()?)?.as_table()?;
    for part in parts {
        table = table.get(part)?.as_table()?;
    }
    table.get(key)
}

/// Reads a `{latitude, longitude, altitude}` table; missing fields read as zero.
fn read_position(vm: &HeapVm, path: &str) -> Position {
    let coord = |key| read_field(vm, path, key).and_then(ScriptValue::as_float).unwrap_or(0.0);
    Position::new(coord("latitude"), coord("longitude"), coord("altitude"))
}
