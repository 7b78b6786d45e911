use async_trait::async_trait;

use crate::common::ChannelResult;
use crate::domains::episode::Episode;

/// Port the session driver uses to talk to the simulator.
///
/// Each `send` is one complete command message and each `receive_once` one
/// complete data message; how message boundaries are realized on the wire is
/// up to the adapter.
#[async_trait]
pub trait SimulatorLink: Send {
    /// Push one command, returning the number of bytes written.
    async fn send(&mut self, payload: &[u8]) -> ChannelResult<usize>;

    /// Block until the simulator delivers one data message.
    async fn receive_once(&mut self) -> ChannelResult<Vec<u8>>;

    /// Release the channels. Must be safe to call more than once.
    async fn close(&mut self);
}

/// Downstream consumer of decoded episodes (the control/planning loop).
#[async_trait]
pub trait EpisodeConsumer: Send {
    /// Invoked once per decoded episode, in catalog order.
    async fn on_episode(&mut self, episode: &Episode);
}
