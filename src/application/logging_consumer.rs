use async_trait::async_trait;

use crate::domains::episode::Episode;
use crate::domains::logger::DynLogger;
use crate::domains::session::EpisodeConsumer;

/// Stand-in for the planning loop: reports each episode and does nothing else.
pub struct LoggingConsumer {
    logger: DynLogger,
}

impl LoggingConsumer {
    pub fn new(logger: DynLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl EpisodeConsumer for LoggingConsumer {
    async fn on_episode(&mut self, episode: &Episode) {
        for line in episode.to_string().lines() {
            self.logger.info(line);
        }
        self.logger.info(&format!(
            "{} pedestrians, {}x{} building grid at {} m/cell",
            episode.agents().len(),
            episode.environment().building_grid().rows(),
            episode.environment().building_grid().cols(),
            episode.environment().scale()
        ));
    }
}
