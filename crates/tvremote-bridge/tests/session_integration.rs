//! Control-channel integration tests: a real TCP client talking to a real
//! `ControlServer` backed by the recording injection backend.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::Mutex,
};
use tvremote_bridge::{
    infrastructure::{network::ControlServer, uinput::MockInjectionBackend},
    BridgeRegistry,
};
use tvremote_core::{
    decode_message, encode_message,
    protocol::{
        decode_header,
        messages::{KeyMessage, OpenBridgeMessage, PointerDownMessage, HEADER_SIZE},
    },
    AxisCalibration, BridgeMessage, DeviceProfile, RawEvent,
};
use uuid::Uuid;

struct Harness {
    addr: SocketAddr,
    backend: Arc<MockInjectionBackend>,
    registry: Arc<Mutex<BridgeRegistry>>,
    running: Arc<AtomicBool>,
}

impl Harness {
    async fn start() -> Self {
        let backend = Arc::new(MockInjectionBackend::new());
        let registry = Arc::new(Mutex::new(BridgeRegistry::new(backend.clone())));
        let server = ControlServer::bind("127.0.0.1:0".parse().unwrap(), registry.clone(), 4096)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        tokio::spawn(server.serve(Arc::clone(&running)));
        Self {
            addr,
            backend,
            registry,
            running,
        }
    }

    /// Polls until `check` holds or two seconds pass.
    async fn wait_for(&self, check: impl Fn(&MockInjectionBackend) -> bool) -> bool {
        for _ in 0..200 {
            if check(self.backend.as_ref()) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

async fn send(stream: &mut TcpStream, msg: &BridgeMessage) {
    let bytes = encode_message(msg, 0, 0).unwrap();
    stream.write_all(&bytes).await.unwrap();
}

async fn recv(stream: &mut TcpStream) -> BridgeMessage {
    let mut header = [0u8; HEADER_SIZE];
    stream.read_exact(&mut header).await.unwrap();
    let len = decode_header(&header).unwrap().payload_length as usize;
    let mut frame = header.to_vec();
    frame.resize(HEADER_SIZE + len, 0);
    stream.read_exact(&mut frame[HEADER_SIZE..]).await.unwrap();
    decode_message(&frame).unwrap().0
}

fn touchpad(token: Uuid) -> BridgeMessage {
    BridgeMessage::OpenBridge(OpenBridgeMessage {
        token,
        name: "Phone".into(),
        unique_id: String::new(),
        width: 1080,
        height: 1920,
        max_contacts: 2,
        profile: DeviceProfile::Touchpad,
    })
}

#[tokio::test]
async fn test_open_then_input_reaches_the_device() {
    // Arrange
    let h = Harness::start().await;
    let mut stream = TcpStream::connect(h.addr).await.unwrap();
    let token = Uuid::new_v4();

    // Act
    send(&mut stream, &touchpad(token)).await;
    let reply = recv(&mut stream).await;
    send(
        &mut stream,
        &BridgeMessage::PointerDown(PointerDownMessage {
            token,
            pointer_id: 4,
            x: 10,
            y: 20,
        }),
    )
    .await;
    send(&mut stream, &BridgeMessage::PointerSync { token }).await;

    // Assert
    assert_eq!(reply, BridgeMessage::BridgeOpened { token });
    assert!(h.wait_for(|b| b.events(0).len() == 5).await);
    assert_eq!(h.backend.events(0).last(), Some(&RawEvent::sync()));
}

#[tokio::test]
async fn test_invalid_open_is_answered_with_failure() {
    let h = Harness::start().await;
    let mut stream = TcpStream::connect(h.addr).await.unwrap();
    let token = Uuid::new_v4();
    let bad = BridgeMessage::OpenBridge(OpenBridgeMessage {
        token,
        name: "Pad".into(),
        unique_id: String::new(),
        width: 0,
        height: 0,
        max_contacts: 0,
        profile: DeviceProfile::PointerHybrid {
            calibration: Some(AxisCalibration {
                min: 10,
                max: -10,
                fuzz: 0,
                flat: 0,
            }),
        },
    });

    send(&mut stream, &bad).await;

    match recv(&mut stream).await {
        BridgeMessage::BridgeOpenFailed(f) => assert_eq!(f.token, token),
        other => panic!("expected BridgeOpenFailed, got {other:?}"),
    }
    assert_eq!(h.backend.device_count(), 0);
}

#[tokio::test]
async fn test_disconnect_clears_and_closes_owned_bridges() {
    // Arrange: open a bridge and leave a key held down.
    let h = Harness::start().await;
    let mut stream = TcpStream::connect(h.addr).await.unwrap();
    let token = Uuid::new_v4();
    send(&mut stream, &touchpad(token)).await;
    recv(&mut stream).await;
    send(
        &mut stream,
        &BridgeMessage::Key(KeyMessage {
            token,
            key_code: 19,
            down: true,
        }),
    )
    .await;
    assert!(h.wait_for(|b| !b.events(0).is_empty()).await);

    // Act
    drop(stream);

    // Assert
    assert!(h.wait_for(|b| b.destroy_calls(0) == 1).await);
    let events = h.backend.events(0);
    assert!(events.contains(&RawEvent::key(103, false)));
    assert_eq!(events.last(), Some(&RawEvent::sync()));
    assert!(h.registry.lock().await.is_empty());
}

#[tokio::test]
async fn test_bridges_of_other_sessions_survive_a_disconnect() {
    let h = Harness::start().await;
    let mut a = TcpStream::connect(h.addr).await.unwrap();
    let mut b = TcpStream::connect(h.addr).await.unwrap();
    let token_a = Uuid::new_v4();
    let token_b = Uuid::new_v4();
    send(&mut a, &touchpad(token_a)).await;
    recv(&mut a).await;
    send(&mut b, &touchpad(token_b)).await;
    recv(&mut b).await;

    drop(a);

    assert!(h.wait_for(|b| b.live_devices() == 1).await);
    let registry = h.registry.lock().await;
    assert!(!registry.is_open(token_a));
    assert!(registry.is_open(token_b));
}

#[tokio::test]
async fn test_undecodable_payload_does_not_end_the_session() {
    // Arrange
    let h = Harness::start().await;
    let mut stream = TcpStream::connect(h.addr).await.unwrap();
    let mut garbage = encode_message(&BridgeMessage::Ping(1), 0, 0).unwrap();
    garbage[1] = 0x41; // Key header over an 8-byte payload: too short for a Key
    stream.write_all(&garbage).await.unwrap();

    // Act
    send(&mut stream, &BridgeMessage::Ping(2)).await;

    // Assert
    assert_eq!(recv(&mut stream).await, BridgeMessage::Pong(2));
}

#[tokio::test]
async fn test_reopen_from_another_session_does_not_take_ownership() {
    // Arrange: session A creates the bridge, session B re-opens the same token.
    let h = Harness::start().await;
    let mut a = TcpStream::connect(h.addr).await.unwrap();
    let mut b = TcpStream::connect(h.addr).await.unwrap();
    let token = Uuid::new_v4();
    send(&mut a, &touchpad(token)).await;
    assert_eq!(recv(&mut a).await, BridgeMessage::BridgeOpened { token });
    send(&mut b, &touchpad(token)).await;
    assert_eq!(recv(&mut b).await, BridgeMessage::BridgeOpened { token });

    // Act
    drop(b);
    send(&mut a, &BridgeMessage::Ping(7)).await;
    assert_eq!(recv(&mut a).await, BridgeMessage::Pong(7));

    // Assert: B's disconnect left A's device alone.
    assert_eq!(h.backend.device_count(), 1);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(h.backend.destroy_calls(0), 0);
    assert!(h.registry.lock().await.is_open(token));

    // A's own disconnect still releases it.
    drop(a);
    assert!(h.wait_for(|b| b.destroy_calls(0) == 1).await);
}
