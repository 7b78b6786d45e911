use crate::adapters::ConnectionManager;
use crate::common::{SessionError, SessionResult};
use crate::config::{Config, DecodeFailurePolicy};
use crate::domains::episode::{EpisodeCatalog, EpisodeDecoder};
use crate::domains::logger::DynLogger;
use crate::domains::session::{
    EpisodeConsumer, JoystickCommand, SessionState, SessionStateMachine, SimulatorLink,
};

/// An episode whose metadata could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEpisode {
    pub title: String,
    pub reason: String,
}

/// Outcome of a completed session.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub catalog: EpisodeCatalog,
    pub delivered: Vec<String>,
    pub skipped: Vec<SkippedEpisode>,
}

/// Drives one session: catalog, then per-episode metadata, decode, ack, hand-off.
pub struct SessionDriver<L: SimulatorLink> {
    link: L,
    decoder: EpisodeDecoder,
    consumer: Box<dyn EpisodeConsumer>,
    logger: DynLogger,
    policy: DecodeFailurePolicy,
    machine: SessionStateMachine,
}

impl SessionDriver<ConnectionManager> {
    /// Establish both channels from `config` and build a driver over them.
    ///
    /// Any failure here is fatal: it is logged and returned, and no driver
    /// exists to clean up beyond the sockets already dropped.
    pub async fn connect(
        config: &Config,
        consumer: Box<dyn EpisodeConsumer>,
        logger: DynLogger,
    ) -> SessionResult<Self> {
        let decoder = EpisodeDecoder::new(config.decoder.grid_scale, config.decoder.robot_key.clone())?;

        logger.info(&format!(
            "Initiating joystick at {}:{}",
            config.connection.host, config.connection.send_port
        ));
        let link = match ConnectionManager::establish(&config.connection, &config.receiver).await {
            Ok(link) => link,
            Err(e) => {
                logger.error(&format!("Failed to establish simulator channels: {}", e));
                return Err(e.into());
            }
        };

        Ok(Self::new(link, decoder, consumer, logger, config.session.on_decode_failure))
    }
}

impl<L: SimulatorLink> SessionDriver<L> {
    /// Wrap an already-established link.
    pub fn new(
        link: L,
        decoder: EpisodeDecoder,
        consumer: Box<dyn EpisodeConsumer>,
        logger: DynLogger,
        policy: DecodeFailurePolicy,
    ) -> Self {
        Self {
            link,
            decoder,
            consumer,
            logger,
            policy,
            machine: SessionStateMachine::established(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// Run the session to completion. Both channels are released on every exit
    /// path.
    pub async fn run(&mut self) -> SessionResult<SessionReport> {
        let result = self.drive().await;
        self.link.close().await;

        match result {
            Ok(report) => {
                self.machine.advance(SessionState::Closed)?;
                self.logger.info(&format!(
                    "Session complete: {} delivered, {} skipped",
                    report.delivered.len(),
                    report.skipped.len()
                ));
                Ok(report)
            }
            Err(e) => {
                self.machine.abort();
                self.logger.error(&format!("Session aborted: {}", e));
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> SessionResult<SessionReport> {
        let catalog = self.receive_catalog().await?;
        let mut report = SessionReport {
            catalog: catalog.clone(),
            ..SessionReport::default()
        };

        for expected in catalog.iter() {
            let payload = self.link.receive_once().await?;
            self.machine.advance(SessionState::MetadataReceived)?;
            self.logger
                .debug(&format!("Received {} bytes of metadata for '{}'", payload.len(), expected));

            let episode = match self.decoder.decode(&payload) {
                Ok(episode) => episode,
                Err(e) => {
                    self.logger
                        .error(&format!("Failed to decode metadata for '{}': {}", expected, e));
                    match self.policy {
                        DecodeFailurePolicy::Skip => {
                            report.skipped.push(SkippedEpisode {
                                title: expected.to_string(),
                                reason: e.to_string(),
                            });
                            continue;
                        }
                        DecodeFailurePolicy::Abort => return Err(SessionError::Decode(e)),
                    }
                }
            };
            self.machine.advance(SessionState::Decoded)?;

            if episode.title() != expected {
                self.logger.warn(&format!(
                    "Catalog expected '{}' but simulator sent '{}'",
                    expected,
                    episode.title()
                ));
            }

            let sent = self.link.send(&JoystickCommand::Ready.encode()).await?;
            self.machine.advance(SessionState::Acknowledged)?;
            self.logger
                .debug(&format!("Acknowledged '{}' ({} bytes)", episode.title(), sent));

            self.consumer.on_episode(&episode).await;
            report.delivered.push(episode.title().to_string());
        }

        Ok(report)
    }

    async fn receive_catalog(&mut self) -> SessionResult<EpisodeCatalog> {
        let payload = self.link.receive_once().await?;
        let catalog = EpisodeCatalog::parse(&payload)?;
        self.machine.advance(SessionState::CatalogReceived)?;
        self.logger.info(&format!(
            "Received catalog of {} episodes: {:?}",
            catalog.len(),
            catalog.titles()
        ));
        Ok(catalog)
    }
}
