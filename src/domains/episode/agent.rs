use serde::Serialize;
use serde_json::Value;

use super::geometry::Pose;
use super::schema;
use crate::common::{DecodeError, DecodeResult};

/// Snapshot of one pedestrian as reported by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentState {
    pub name: String,
    pub current_config: Pose,
    pub start_config: Option<Pose>,
    pub goal_config: Option<Pose>,
    pub radius: Option<f64>,
    pub color: Option<String>,
    /// The full source document, for consumers that need fields not modelled here.
    pub extra: Value,
}

/// Port for turning one named entry of the `pedestrians` mapping into an [`AgentState`].
pub trait AgentDecoder: Send + Sync {
    fn decode(&self, name: &str, document: &Value) -> DecodeResult<AgentState>;
}

/// Decodes the simulator's JSON agent representation.
#[derive(Debug, Default, Clone)]
pub struct JsonAgentDecoder;

impl JsonAgentDecoder {
    fn decode_inner(&self, name: &str, document: &Value) -> DecodeResult<AgentState> {
        let obj = schema::object(document, name)?;
        let current = schema::vec3(schema::field(obj, name, "current_config")?, "current_config")?;

        let optional_pose = |key: &str| -> DecodeResult<Option<Pose>> {
            match obj.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(v) => Ok(Some(Pose::from(schema::vec3(v, key)?))),
            }
        };

        let radius = match obj.get("radius") {
            None | Some(Value::Null) => None,
            Some(v) => Some(schema::number(v, "radius")?),
        };
        let color = match obj.get("color") {
            None | Some(Value::Null) => None,
            Some(v) => Some(schema::string(v, "color")?),
        };

        Ok(AgentState {
            name: name.to_string(),
            current_config: Pose::from(current),
            start_config: optional_pose("start_config")?,
            goal_config: optional_pose("goal_config")?,
            radius,
            color,
            extra: document.clone(),
        })
    }
}

impl AgentDecoder for JsonAgentDecoder {
    fn decode(&self, name: &str, document: &Value) -> DecodeResult<AgentState> {
        self.decode_inner(name, document)
            .map_err(|e| DecodeError::AgentDecode {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}
