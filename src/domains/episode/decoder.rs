use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::agent::{AgentDecoder, AgentState, JsonAgentDecoder};
use super::environment::Environment;
use super::episode::Episode;
use super::geometry::{GridError, Point3D, Pose, TraversabilityGrid};
use super::schema;
use crate::common::{DecodeError, DecodeResult};

/// Metres per grid cell used when the configuration does not override it.
pub const DEFAULT_GRID_SCALE: f64 = 0.05;

/// Key under `robots` that identifies the single controllable robot.
pub const ROBOT_AGENT_KEY: &str = "robot_agent";

/// Turns one metadata message into an [`Episode`].
#[derive(Clone)]
pub struct EpisodeDecoder {
    grid_scale: f64,
    robot_key: String,
    agent_decoder: Arc<dyn AgentDecoder>,
}

impl Default for EpisodeDecoder {
    fn default() -> Self {
        Self {
            grid_scale: DEFAULT_GRID_SCALE,
            robot_key: ROBOT_AGENT_KEY.to_string(),
            agent_decoder: Arc::new(JsonAgentDecoder),
        }
    }
}

impl EpisodeDecoder {
    pub fn new(grid_scale: f64, robot_key: impl Into<String>) -> DecodeResult<Self> {
        if !(grid_scale.is_finite() && grid_scale > 0.0) {
            return Err(DecodeError::InvalidScale(grid_scale));
        }
        Ok(Self {
            grid_scale,
            robot_key: robot_key.into(),
            ..Self::default()
        })
    }

    pub fn with_agent_decoder(mut self, agent_decoder: Arc<dyn AgentDecoder>) -> Self {
        self.agent_decoder = agent_decoder;
        self
    }

    pub fn grid_scale(&self) -> f64 {
        self.grid_scale
    }

    /// Decode raw message bytes.
    ///
    /// Repeated keys under `robots` or `pedestrians` are rejected here, since
    /// they are no longer visible once the document is a [`Value`].
    pub fn decode(&self, payload: &[u8]) -> DecodeResult<Episode> {
        let document: Value = serde_json::from_slice(payload)?;
        if document.is_object() {
            check_unique_entities(&schema::EntityKeys::from_slice(payload)?)?;
        }
        self.decode_value(&document)
    }

    pub fn decode_value(&self, document: &Value) -> DecodeResult<Episode> {
        let root = schema::object(document, "$")?;

        let title = schema::string(schema::field(root, "", "episode_name")?, "episode_name")?;

        let env_doc = schema::object(schema::field(root, "", "environment")?, "environment")?;
        let grid_path = "environment.map_traversible";
        let rows = schema::int_rows(schema::field(env_doc, "environment", "map_traversible")?, grid_path)?;
        let building_grid = TraversabilityGrid::from_rows(rows).map_err(|e| grid_error(grid_path, e))?;
        let room_center = schema::vec3(
            schema::field(env_doc, "environment", "room_center")?,
            "environment.room_center",
        )?;

        if let Some(sent) = env_doc.get("map_scale").and_then(schema::lenient_number) {
            if (sent - self.grid_scale).abs() > f64::EPSILON {
                warn!(
                    "Episode '{}' reports map_scale {} but configured grid scale {} is used",
                    title, sent, self.grid_scale
                );
            }
        }

        let environment = Environment::new(
            self.grid_scale,
            Point3D::from(room_center),
            building_grid,
            TraversabilityGrid::empty(),
        )?;

        let agents = self.decode_pedestrians(root)?;

        let max_time_s = schema::number(schema::field(root, "", "episode_max_time")?, "episode_max_time")?;
        let sim_t = match root.get("sim_t") {
            None | Some(Value::Null) => 0.0,
            Some(v) => schema::number(v, "sim_t")?,
        };

        let (robot_start, robot_goal) = self.decode_robot(root)?;

        debug!(
            "Decoded episode '{}': {} agents, grid {:?}",
            title,
            agents.len(),
            environment.building_grid().shape()
        );

        Ok(Episode::new(
            title,
            environment,
            agents,
            max_time_s,
            sim_t,
            robot_start,
            robot_goal,
        ))
    }

    fn decode_pedestrians(
        &self,
        root: &serde_json::Map<String, Value>,
    ) -> DecodeResult<BTreeMap<String, AgentState>> {
        let peds = schema::object(schema::field(root, "", "pedestrians")?, "pedestrians")?;
        peds.iter()
            .map(|(name, doc)| {
                self.agent_decoder
                    .decode(name, doc)
                    .map(|agent| (name.clone(), agent))
            })
            .collect()
    }

    fn decode_robot(&self, root: &serde_json::Map<String, Value>) -> DecodeResult<(Pose, Pose)> {
        let robots = schema::object(schema::field(root, "", "robots")?, "robots")?;
        if robots.len() > 1 {
            return Err(DecodeError::MultipleRobots { count: robots.len() });
        }
        let robot_doc = robots.get(&self.robot_key).ok_or_else(|| DecodeError::MissingRobot {
            key: self.robot_key.clone(),
        })?;

        let base = schema::join("robots", &self.robot_key);
        let robot = schema::object(robot_doc, &base)?;
        let start = schema::vec3(
            schema::field(robot, &base, "start_config")?,
            &schema::join(&base, "start_config"),
        )?;
        let goal = schema::vec3(
            schema::field(robot, &base, "goal_config")?,
            &schema::join(&base, "goal_config"),
        )?;
        Ok((Pose::from(start), Pose::from(goal)))
    }
}

fn check_unique_entities(keys: &schema::EntityKeys) -> DecodeResult<()> {
    if keys.robots.first_duplicate().is_some() {
        return Err(DecodeError::MultipleRobots {
            count: keys.robots.len(),
        });
    }
    if let Some(name) = keys.pedestrians.first_duplicate() {
        return Err(DecodeError::DuplicateAgent {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn grid_error(path: &str, e: GridError) -> DecodeError {
    match e {
        GridError::Ragged { row, expected, actual } => DecodeError::RaggedGrid {
            path: path.to_string(),
            row,
            expected,
            actual,
        },
        GridError::InvalidCell { row, col, value } => DecodeError::InvalidCell {
            path: path.to_string(),
            row,
            col,
            value,
        },
    }
}
