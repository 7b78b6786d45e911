use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use joystick_client::adapters::outbound::init_noop_logger;
use joystick_client::adapters::ConnectionManager;
use joystick_client::config::{ConnectionConfig, DecodeFailurePolicy, ReceiverConfig};
use joystick_client::domains::episode::{Episode, EpisodeDecoder, Pose};
use joystick_client::domains::session::{EpisodeConsumer, SessionState};
use joystick_client::SessionDriver;

struct Collect(Arc<Mutex<Vec<Episode>>>);

#[async_trait]
impl EpisodeConsumer for Collect {
    async fn on_episode(&mut self, episode: &Episode) {
        self.0.lock().unwrap().push(episode.clone());
    }
}

fn free_port() -> u16 {
    let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    holder.local_addr().unwrap().port()
}

fn metadata(title: &str, goal: [f64; 3]) -> Vec<u8> {
    json!({
        "episode_name": title,
        "environment": {
            "map_traversible": [[1, 1, 0], [1, 1, 1]],
            "room_center": [0.5, 0.5, 0.0]
        },
        "episode_max_time": 30.0,
        "sim_t": 0.0,
        "pedestrians": {
            "prerec_agent_0": {"current_config": [1.0, 1.0, 0.0], "radius": 0.2}
        },
        "robots": {
            "robot_agent": {"start_config": [0.0, 0.0, 0.0], "goal_config": goal}
        }
    })
    .to_string()
    .into_bytes()
}

/// Simulator side of the data channel: one connection per message.
async fn push(addr: SocketAddr, message: &[u8]) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(message).await.unwrap();
    stream.shutdown().await.unwrap();
}

async fn read_command(listener: &TcpListener) -> Vec<u8> {
    let (mut conn, _) = listener.accept().await.unwrap();
    let mut buf = Vec::new();
    conn.read_to_end(&mut buf).await.unwrap();
    buf
}

fn client_config(sim: &TcpListener, recv_port: u16) -> ConnectionConfig {
    ConnectionConfig {
        send_port: sim.local_addr().unwrap().port(),
        recv_port: Some(recv_port),
        ..ConnectionConfig::default()
    }
}

#[tokio::test]
async fn test_full_session_over_loopback() {
    let sim = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let recv_port = free_port();
    let connection = client_config(&sim, recv_port);
    let data_addr: SocketAddr = format!("127.0.0.1:{}", recv_port).parse().unwrap();

    let simulator = tokio::spawn(async move {
        // probe from the joystick, then our own handshake connection back
        assert!(read_command(&sim).await.is_empty());
        drop(TcpStream::connect(data_addr).await.unwrap());

        push(data_addr, b"ep1\nep2").await;
        let mut acks = Vec::new();
        push(data_addr, &metadata("ep1", [5.0, 5.0, 1.57])).await;
        acks.push(read_command(&sim).await);
        push(data_addr, &metadata("ep2", [2.0, 1.0, 0.0])).await;
        acks.push(read_command(&sim).await);
        acks
    });

    let link = ConnectionManager::establish(&connection, &ReceiverConfig::default())
        .await
        .unwrap();
    let episodes = Arc::new(Mutex::new(Vec::new()));
    let mut driver = SessionDriver::new(
        link,
        EpisodeDecoder::default(),
        Box::new(Collect(episodes.clone())),
        init_noop_logger(),
        DecodeFailurePolicy::Skip,
    );

    let report = driver.run().await.unwrap();
    let acks = simulator.await.unwrap();

    assert_eq!(report.catalog.titles(), vec!["ep1", "ep2"]);
    assert_eq!(report.delivered, vec!["ep1", "ep2"]);
    assert_eq!(acks, vec![b"ready".to_vec(), b"ready".to_vec()]);
    assert_eq!(driver.state(), SessionState::Closed);

    let episodes = episodes.lock().unwrap();
    let first = &episodes[0];
    assert_eq!(first.title(), "ep1");
    assert_eq!(first.robot_start(), Pose::new(0.0, 0.0, 0.0));
    assert_eq!(first.robot_goal(), Pose::new(5.0, 5.0, 1.57));
    assert_eq!(first.time_budget(), 30.0);
    assert_eq!(first.agents().len(), 1);
    assert_eq!(first.environment().building_grid().shape(), (2, 3));
    assert!(!first.environment().is_traversable(0.12, 0.01));
    assert_eq!(episodes[1].robot_goal(), Pose::new(2.0, 1.0, 0.0));
}

#[tokio::test]
async fn test_undecodable_episode_is_never_acknowledged() {
    let sim = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let recv_port = free_port();
    let connection = ConnectionConfig {
        handshake_accept: false,
        ..client_config(&sim, recv_port)
    };
    let data_addr: SocketAddr = format!("127.0.0.1:{}", recv_port).parse().unwrap();

    let simulator = tokio::spawn(async move {
        assert!(read_command(&sim).await.is_empty());
        push(data_addr, b"broken\nok").await;
        push(data_addr, b"{\"episode_name\": \"broken\"}").await;
        push(data_addr, &metadata("ok", [1.0, 1.0, 0.0])).await;
        let ack = read_command(&sim).await;

        // nothing else may arrive on the command channel
        let extra = tokio::time::timeout(Duration::from_millis(100), sim.accept()).await;
        (ack, extra.is_err())
    });

    let link = ConnectionManager::establish(&connection, &ReceiverConfig::default())
        .await
        .unwrap();
    let mut driver = SessionDriver::new(
        link,
        EpisodeDecoder::default(),
        Box::new(Collect(Arc::new(Mutex::new(Vec::new())))),
        init_noop_logger(),
        DecodeFailurePolicy::Skip,
    );

    let report = driver.run().await.unwrap();
    let (ack, quiet) = simulator.await.unwrap();

    assert_eq!(ack, b"ready");
    assert!(quiet);
    assert_eq!(report.delivered, vec!["ok"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].title, "broken");
}

#[tokio::test]
async fn test_handshake_never_arrives() {
    let sim = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let connection = client_config(&sim, free_port());
    let receiver = ReceiverConfig {
        accept_timeout_ms: Some(50),
        ..ReceiverConfig::default()
    };

    let result = ConnectionManager::establish(&connection, &receiver).await;
    assert!(result.is_err());
}
