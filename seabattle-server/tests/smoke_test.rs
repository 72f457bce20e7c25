//! Plays a short game between two WebSocket clients against a live server.
use std::{net::TcpStream, time::Duration};

use serde_json::{json, Value};
use tungstenite::{stream::MaybeTlsStream, Message, WebSocket};

use seabattle_server::{start_server, ServerConfig};

type Client = WebSocket<MaybeTlsStream<TcpStream>>;

fn connect(addr: std::net::SocketAddr) -> Client {
    let (ws, _) = tungstenite::connect(format!("ws://{}/", addr)).unwrap();
    if let MaybeTlsStream::Plain(stream) = ws.get_ref() {
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
    }
    ws
}

fn send(ws: &mut Client, kind: &str, data: Value) {
    let text = json!({"type": kind, "data": data, "id": 0}).to_string();
    ws.send(Message::Text(text)).unwrap();
}

/// Read messages until one of type `kind` arrives and return its data.
fn expect(ws: &mut Client, kind: &str) -> Value {
    loop {
        match ws.read().unwrap() {
            Message::Text(text) => {
                let value: Value = serde_json::from_str(&text).unwrap();
                if value["type"] == kind {
                    return value["data"].clone();
                }
            }
            _ => continue,
        }
    }
}

#[test]
fn two_clients_play_to_the_end() {
    let config = ServerConfig {
        port: 0,
        seed: Some(7),
        ..ServerConfig::default()
    };
    let (handle, addr) = start_server(config).unwrap();

    let mut ann = connect(addr);
    send(&mut ann, "reg", json!({"name": "ann", "password": "a"}));
    let reg = expect(&mut ann, "reg");
    assert_eq!(reg["error"], false);

    let mut bob = connect(addr);
    send(&mut bob, "reg", json!({"name": "bob", "password": "b"}));
    expect(&mut bob, "reg");

    send(&mut ann, "create_room", json!(""));
    let rooms = expect(&mut bob, "update_room");
    let rooms = if rooms.as_array().map_or(true, |r| r.is_empty()) {
        expect(&mut bob, "update_room")
    } else {
        rooms
    };
    let room = rooms[0]["roomId"].clone();
    send(&mut bob, "add_user_to_room", json!({ "indexRoom": room }));

    let ann_game = expect(&mut ann, "create_game");
    let bob_game = expect(&mut bob, "create_game");
    assert_eq!(ann_game["idGame"], bob_game["idGame"]);
    assert_ne!(ann_game["idPlayer"], bob_game["idPlayer"]);

    let fleet = json!([
        {"position": {"x": 0, "y": 0}, "direction": true, "length": 1, "type": "small"}
    ]);
    for (ws, game) in vec![(&mut ann, &ann_game), (&mut bob, &bob_game)] {
        send(
            ws,
            "add_ships",
            json!({"gameId": game["idGame"], "indexPlayer": game["idPlayer"], "ships": fleet}),
        );
    }
    expect(&mut ann, "start_game");
    let turn = expect(&mut ann, "turn");
    expect(&mut bob, "start_game");
    expect(&mut bob, "turn");

    let (shooter, game) = if turn["currentPlayer"] == ann_game["idPlayer"] {
        (&mut ann, &ann_game)
    } else {
        (&mut bob, &bob_game)
    };
    send(
        shooter,
        "attack",
        json!({"gameId": game["idGame"], "indexPlayer": game["idPlayer"], "x": 0, "y": 0}),
    );
    let strike = expect(shooter, "attack");
    assert_eq!(strike["status"], "killed");
    let finish = expect(shooter, "finish");
    assert_eq!(finish["winPlayer"], game["idPlayer"]);
    let winners = expect(shooter, "update_winners");
    assert_eq!(winners[0]["wins"], 1);

    handle.stop();
}
