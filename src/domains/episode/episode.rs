use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::agent::AgentState;
use super::environment::Environment;
use super::geometry::Pose;

/// One scenario definition. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Episode {
    title: String,
    environment: Environment,
    agents: BTreeMap<String, AgentState>,
    max_time_s: f64,
    sim_t: f64,
    robot_start: Pose,
    robot_goal: Pose,
}

impl Episode {
    pub fn new(
        title: String,
        environment: Environment,
        agents: BTreeMap<String, AgentState>,
        max_time_s: f64,
        sim_t: f64,
        robot_start: Pose,
        robot_goal: Pose,
    ) -> Self {
        Self {
            title,
            environment,
            agents,
            max_time_s,
            sim_t,
            robot_start,
            robot_goal,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn agents(&self) -> &BTreeMap<String, AgentState> {
        &self.agents
    }

    pub fn time_budget(&self) -> f64 {
        self.max_time_s
    }

    /// Simulator clock when the metadata was emitted.
    pub fn sim_t(&self) -> f64 {
        self.sim_t
    }

    pub fn robot_start(&self) -> Pose {
        self.robot_start
    }

    pub fn robot_goal(&self) -> Pose {
        self.robot_goal
    }
}

impl fmt::Display for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Episode: {}", self.title)?;
        writeln!(f, "Max time: {}", self.max_time_s)?;
        writeln!(f, "Robot start: {}", self.robot_start)?;
        write!(f, "Robot goal: {}", self.robot_goal)
    }
}
