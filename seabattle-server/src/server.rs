//! WebSocket listener and the event loop driving the session engine.
//!
//! One thread accepts connections. Each connection gets a thread that owns its socket:
//! it forwards inbound text frames to the event loop and writes whatever the event loop
//! queues in its outbox. The event loop owns the [`GameSessionEngine`] and runs one
//! command at a time, so the engine never sees concurrent access.
use std::{
    collections::HashMap,
    io,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
        Arc,
    },
    thread,
    time::Duration,
};

use seabattle::{ConnectionId, ErrorKind, GameSessionEngine, NotificationSink, ServerEvent};
use tracing::{debug, info, warn};
use tungstenite::{Error as WsError, Message, WebSocket};

/// How long a connection thread blocks on its socket before checking its outbox.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Settings for a running server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Fixed seed for the engine's randomness. Drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            seed: None,
        }
    }
}

/// Events funneled from socket threads into the event loop.
enum InternalEvent {
    Connected {
        conn: ConnectionId,
        outbox: Sender<String>,
    },
    Message {
        conn: ConnectionId,
        text: String,
    },
    Disconnected {
        conn: ConnectionId,
    },
}

/// Routes engine events to the outboxes of open connections.
#[derive(Debug, Default)]
struct ChannelSink {
    outboxes: HashMap<ConnectionId, Sender<String>>,
}

impl ChannelSink {
    fn encode(event: &ServerEvent) -> Option<String> {
        match event.to_json() {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(event = event.kind(), error = %err, "failed to encode event");
                None
            }
        }
    }
}

impl NotificationSink for ChannelSink {
    fn send_to(&mut self, conn: ConnectionId, event: &ServerEvent) {
        if let (Some(outbox), Some(text)) = (self.outboxes.get(&conn), Self::encode(event)) {
            // A closed outbox means the connection is going away; its Disconnected
            // event is already on the way.
            let _ = outbox.send(text);
        }
    }

    fn broadcast(&mut self, event: &ServerEvent) {
        if let Some(text) = Self::encode(event) {
            for outbox in self.outboxes.values() {
                let _ = outbox.send(text.clone());
            }
        }
    }
}

/// Handle to a running server.
pub struct ServerHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Block until the event loop exits.
    pub fn join(mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }

    /// Signal the server to stop and wait for the event loop to exit.
    pub fn stop(self) {
        self.keep_running.store(false, Ordering::SeqCst);
        self.join();
    }
}

/// Bind the listener and start serving on background threads. Returns the handle and
/// the bound address, which differs from the configured one when port 0 is used.
pub fn start_server(config: ServerConfig) -> io::Result<(ServerHandle, SocketAddr)> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))?;
    let addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;
    let keep_running = Arc::new(AtomicBool::new(true));

    let engine = match config.seed {
        Some(seed) => GameSessionEngine::seeded(seed),
        None => GameSessionEngine::from_entropy(),
    };
    let (tx, rx) = mpsc::channel();

    let accept_running = keep_running.clone();
    thread::spawn(move || accept_loop(listener, tx, accept_running));

    let loop_running = keep_running.clone();
    let thread = thread::spawn(move || event_loop(engine, rx, loop_running));

    Ok((
        ServerHandle {
            keep_running,
            thread: Some(thread),
        },
        addr,
    ))
}

/// Accept connections until the server stops, handing each to its own thread.
fn accept_loop(listener: TcpListener, tx: Sender<InternalEvent>, keep_running: Arc<AtomicBool>) {
    let mut next_id = 1;
    while keep_running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                let conn = ConnectionId(next_id);
                next_id += 1;
                debug!(%conn, %peer, "accepted connection");
                let tx = tx.clone();
                thread::spawn(move || serve_connection(conn, stream, tx));
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(err) => {
                warn!(error = %err, "accept failed, listener shutting down");
                break;
            }
        }
    }
}

/// Run the WebSocket handshake, then pump frames both ways until either side closes.
fn serve_connection(conn: ConnectionId, stream: TcpStream, tx: Sender<InternalEvent>) {
    if let Err(err) = stream.set_nonblocking(false) {
        warn!(%conn, error = %err, "failed to configure socket");
        return;
    }
    let mut ws = match tungstenite::accept(stream) {
        Ok(ws) => ws,
        Err(err) => {
            debug!(%conn, error = %err, "handshake failed");
            return;
        }
    };
    if let Err(err) = ws.get_ref().set_read_timeout(Some(POLL_INTERVAL)) {
        warn!(%conn, error = %err, "failed to configure socket");
        return;
    }

    let (outbox, inbox) = mpsc::channel();
    if tx.send(InternalEvent::Connected { conn, outbox }).is_err() {
        return;
    }
    info!(%conn, "client connected");
    pump(conn, &mut ws, &inbox, &tx);
    let _ = ws.close(None);
    let _ = tx.send(InternalEvent::Disconnected { conn });
    info!(%conn, "client disconnected");
}

/// Exchange frames until the client closes or the event loop drops the outbox.
fn pump(
    conn: ConnectionId,
    ws: &mut WebSocket<TcpStream>,
    inbox: &Receiver<String>,
    tx: &Sender<InternalEvent>,
) {
    loop {
        loop {
            match inbox.try_recv() {
                Ok(text) => {
                    if let Err(err) = ws.send(Message::Text(text)) {
                        debug!(%conn, error = %err, "write failed");
                        return;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }

        match ws.read() {
            Ok(Message::Text(text)) => {
                if tx.send(InternalEvent::Message { conn, text }).is_err() {
                    return;
                }
            }
            Ok(Message::Close(_)) => return,
            Ok(_) => {}
            Err(WsError::Io(ref e))
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => {}
            Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => return,
            Err(err) => {
                debug!(%conn, error = %err, "read failed");
                return;
            }
        }
    }
}

/// Own the engine and apply socket events to it in arrival order.
fn event_loop(
    mut engine: GameSessionEngine,
    rx: Receiver<InternalEvent>,
    keep_running: Arc<AtomicBool>,
) {
    let mut sink = ChannelSink::default();
    while keep_running.load(Ordering::SeqCst) {
        let event = match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match event {
            InternalEvent::Connected { conn, outbox } => {
                sink.outboxes.insert(conn, outbox);
            }
            InternalEvent::Message { conn, text } => {
                if let Err(err) = engine.handle_message(conn, &text, &mut sink) {
                    if err.kind() == ErrorKind::MalformedMessage {
                        warn!(%conn, error = %err, "malformed message");
                    }
                }
            }
            InternalEvent::Disconnected { conn } => {
                sink.outboxes.remove(&conn);
                engine.disconnect(conn);
            }
        }
    }
    info!("event loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use seabattle::protocol::RegReply;

    #[test]
    fn sink_routes_to_open_outboxes() {
        let mut sink = ChannelSink::default();
        let (tx1, rx1) = mpsc::channel();
        let (tx2, rx2) = mpsc::channel();
        sink.outboxes.insert(ConnectionId(1), tx1);
        sink.outboxes.insert(ConnectionId(2), tx2);

        let reply = ServerEvent::Registered(RegReply {
            name: "ann".into(),
            index: None,
            error: true,
            error_text: "wrong password".into(),
        });
        sink.send_to(ConnectionId(1), &reply);
        sink.send_to(ConnectionId(7), &reply);
        assert!(rx1.try_recv().unwrap().contains("\"type\":\"reg\""));
        assert!(rx2.try_recv().is_err());

        sink.broadcast(&ServerEvent::UpdateWinners(Vec::new()));
        assert!(rx1.try_recv().unwrap().contains("update_winners"));
        assert!(rx2.try_recv().unwrap().contains("update_winners"));
    }

    #[test]
    fn closed_outbox_is_ignored() {
        let mut sink = ChannelSink::default();
        let (tx, rx) = mpsc::channel();
        sink.outboxes.insert(ConnectionId(1), tx);
        drop(rx);
        sink.send_to(ConnectionId(1), &ServerEvent::UpdateRoom(Vec::new()));
        sink.broadcast(&ServerEvent::UpdateWinners(Vec::new()));
    }
}
