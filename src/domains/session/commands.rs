use serde::Serialize;
use serde_json::json;

use crate::common::CommandError;

/// Messages the joystick may push on the command channel.
///
/// Keywords travel as bare UTF-8 strings; velocity batches as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum JoystickCommand {
    /// Metadata for the current episode was consumed.
    Ready,
    /// Ask the simulator to send its world state.
    Sense,
    Velocity(VelocityBatch),
}

/// Paired linear (`v_cmds`) and angular (`w_cmds`) velocity commands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VelocityBatch {
    v_cmds: Vec<f64>,
    w_cmds: Vec<f64>,
}

impl VelocityBatch {
    pub fn new(v_cmds: Vec<f64>, w_cmds: Vec<f64>) -> Result<Self, CommandError> {
        if v_cmds.len() != w_cmds.len() {
            return Err(CommandError::MismatchedBatch {
                v_len: v_cmds.len(),
                w_len: w_cmds.len(),
            });
        }
        Ok(Self { v_cmds, w_cmds })
    }

    pub fn len(&self) -> usize {
        self.v_cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.v_cmds.is_empty()
    }
}

impl JoystickCommand {
    pub const READY: &'static str = "ready";
    pub const SENSE: &'static str = "sense";

    pub fn encode(&self) -> Vec<u8> {
        match self {
            JoystickCommand::Ready => Self::READY.as_bytes().to_vec(),
            JoystickCommand::Sense => Self::SENSE.as_bytes().to_vec(),
            JoystickCommand::Velocity(batch) => json!({
                "v_cmds": batch.v_cmds,
                "w_cmds": batch.w_cmds,
            })
            .to_string()
            .into_bytes(),
        }
    }
}
