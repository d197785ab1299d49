//! Session scenarios driven through `route_cmd`, the same entry point the
//! socket loop uses.

use tokio::sync::mpsc;
use tricktaker_protocol::*;
use uuid::Uuid;

use crate::declaration::declared_total;
use crate::handlers::{self, Connection};
use crate::session::fixtures;
use crate::AppState;

struct TestClient {
    name: String,
    conn: Connection,
    rx: mpsc::UnboundedReceiver<ServerToClient>,
}

impl TestClient {
    fn new(name: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        TestClient {
            name: name.to_string(),
            conn: Connection::new(Uuid::new_v4(), tx),
            rx,
        }
    }

    fn send(&mut self, state: &AppState, cmd: ClientToServer) {
        handlers::route_cmd(cmd, state, &mut self.conn);
    }

    fn drain(&mut self) -> Vec<ServerToClient> {
        fixtures::drain(&mut self.rx)
    }

    fn errors(&mut self) -> Vec<ErrorKind> {
        self.drain()
            .into_iter()
            .filter_map(|m| match m {
                ServerToClient::Error { kind, .. } => Some(kind),
                _ => None,
            })
            .collect()
    }
}

/// Creates a session owned by the first name and seats the rest.
fn lobby(state: &AppState, names: &[&str]) -> (String, Vec<TestClient>) {
    let mut clients: Vec<TestClient> = names.iter().map(|n| TestClient::new(n)).collect();
    let admin = &mut clients[0];
    let player_name = admin.name.clone();
    admin.send(state, ClientToServer::CreateSession { player_name });
    let code = admin
        .drain()
        .into_iter()
        .find_map(|m| match m {
            ServerToClient::SessionCreated { code } => Some(code),
            _ => None,
        })
        .expect("session created");

    for c in clients.iter_mut().skip(1) {
        let player_name = c.name.clone();
        c.send(
            state,
            ClientToServer::JoinSession {
                code: code.clone(),
                player_name,
            },
        );
    }
    for c in clients.iter_mut() {
        c.drain();
    }
    (code, clients)
}

fn client<'a>(clients: &'a mut [TestClient], name: &str) -> &'a mut TestClient {
    clients
        .iter_mut()
        .find(|c| c.name == name)
        .expect("known client")
}

fn current_player(state: &AppState, code: &str) -> String {
    let s = state.store.get(code).unwrap();
    let s = s.lock();
    s.current_player().name.clone()
}

fn phase(state: &AppState, code: &str) -> Phase {
    state.store.get(code).unwrap().lock().phase
}

fn set_ceiling(state: &AppState, code: &str, clients: &mut [TestClient], ceiling: i64) {
    let admin = &mut clients[0];
    let player_name = admin.name.clone();
    admin.send(
        state,
        ClientToServer::SetHandSizeCeiling {
            code: code.to_string(),
            player_name,
            ceiling,
        },
    );
}

fn start(state: &AppState, code: &str, clients: &mut [TestClient]) {
    let admin = &mut clients[0];
    let player_name = admin.name.clone();
    admin.send(
        state,
        ClientToServer::StartSession {
            code: code.to_string(),
            player_name,
        },
    );
}

fn declare(state: &AppState, code: &str, c: &mut TestClient, amount: i64) {
    let player_name = c.name.clone();
    c.send(
        state,
        ClientToServer::Declare {
            code: code.to_string(),
            player_name,
            amount,
        },
    );
}

fn play(state: &AppState, code: &str, c: &mut TestClient, card: Card) {
    let player_name = c.name.clone();
    c.send(
        state,
        ClientToServer::PlayCard {
            code: code.to_string(),
            player_name,
            card,
        },
    );
}

fn continue_play(state: &AppState, code: &str, c: &mut TestClient) {
    let player_name = c.name.clone();
    c.send(
        state,
        ClientToServer::Continue {
            code: code.to_string(),
            player_name,
        },
    );
}

/// Whoever holds the turn plays the first card in their hand.
fn play_current(state: &AppState, code: &str, clients: &mut [TestClient]) -> Card {
    let name = current_player(state, code);
    let card = {
        let s = state.store.get(code).unwrap();
        let s = s.lock();
        s.player(&name).unwrap().hand[0]
    };
    play(state, code, client(clients, &name), card);
    card
}

/// Drives every remaining hand with zero bids where allowed until the game ends.
fn play_to_end(state: &AppState, code: &str, clients: &mut [TestClient]) {
    for _ in 0..10_000 {
        match phase(state, code) {
            Phase::Declaring => {
                let name = current_player(state, code);
                let amount = {
                    let s = state.store.get(code).unwrap();
                    let s = s.lock();
                    if declared_total(&s) == s.current_hand_size() {
                        1
                    } else {
                        0
                    }
                };
                declare(state, code, client(clients, &name), amount);
            }
            Phase::Playing => {
                play_current(state, code, clients);
            }
            Phase::HandComplete => {
                for c in clients.iter_mut() {
                    continue_play(state, code, c);
                }
            }
            Phase::GameOver => return,
            Phase::Lobby => panic!("session fell back to the lobby"),
        }
    }
    panic!("game did not finish");
}

#[test]
fn create_and_join_share_the_roster() {
    let state = AppState::new();
    let mut ann = TestClient::new("Ann");
    ann.send(
        &state,
        ClientToServer::CreateSession {
            player_name: "Ann".into(),
        },
    );
    let msgs = ann.drain();
    let code = match &msgs[0] {
        ServerToClient::SessionCreated { code } => code.clone(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(code.len(), 6);

    let mut bob = TestClient::new("Bob");
    bob.send(
        &state,
        ClientToServer::JoinSession {
            code: code.clone(),
            player_name: "  Bob ".into(),
        },
    );

    let joined = bob.drain();
    assert!(matches!(
        &joined[0],
        ServerToClient::Joined { your_name, players, ceiling: 1, .. }
            if your_name == "Bob" && players.len() == 2
    ));
    let roster = ann
        .drain()
        .into_iter()
        .filter_map(|m| match m {
            ServerToClient::PlayerListUpdated { players } => Some(players),
            _ => None,
        })
        .last()
        .unwrap();
    let names: Vec<_> = roster.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Ann", "Bob"]);
    assert!(roster[0].is_admin);
    assert!(!roster[1].is_admin);
}

#[test]
fn refusals_reach_only_the_sender() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob"]);

    let mut imposter = TestClient::new("Bob");
    imposter.send(
        &state,
        ClientToServer::JoinSession {
            code: code.clone(),
            player_name: "Bob".into(),
        },
    );
    assert_eq!(imposter.errors(), vec![ErrorKind::DuplicateName]);
    assert!(clients[0].drain().is_empty());
    assert!(clients[1].drain().is_empty());

    let mut lost = TestClient::new("Lost");
    lost.send(
        &state,
        ClientToServer::JoinSession {
            code: "zzzzzz".into(),
            player_name: "Lost".into(),
        },
    );
    assert_eq!(lost.errors(), vec![ErrorKind::SessionNotFound]);

    let mut blank = TestClient::new("");
    blank.send(
        &state,
        ClientToServer::JoinSession {
            code: code.clone(),
            player_name: "   ".into(),
        },
    );
    assert_eq!(blank.errors(), vec![ErrorKind::BlankName]);
}

#[test]
fn commands_only_act_for_the_senders_own_seat() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob"]);

    let mut eve = TestClient::new("Eve");
    eve.send(
        &state,
        ClientToServer::DestroySession {
            code: code.clone(),
            player_name: "Ann".into(),
        },
    );
    assert_eq!(eve.errors(), vec![ErrorKind::PlayerNotFound]);
    assert!(state.store.get(&code).is_ok());
    assert!(clients[0].drain().is_empty());

    clients[1].send(
        &state,
        ClientToServer::StartSession {
            code: code.clone(),
            player_name: "Ann".into(),
        },
    );
    assert_eq!(clients[1].errors(), vec![ErrorKind::PlayerNotFound]);
    assert_eq!(phase(&state, &code), Phase::Lobby);

    start(&state, &code, &mut clients);
    for _ in 0..2 {
        let name = current_player(&state, &code);
        declare(&state, &code, client(&mut clients, &name), 0);
    }
    play_current(&state, &code, &mut clients);
    play_current(&state, &code, &mut clients);
    assert_eq!(phase(&state, &code), Phase::HandComplete);
    clients[1].drain();

    // One socket cannot check in for the whole table.
    for player_name in ["Ann", "Bob"] {
        clients[1].send(
            &state,
            ClientToServer::Continue {
                code: code.clone(),
                player_name: player_name.into(),
            },
        );
    }
    assert_eq!(
        clients[1].drain(),
        vec![
            ServerToClient::Error {
                kind: ErrorKind::PlayerNotFound,
                message: "Player not found!".into(),
            },
            ServerToClient::WaitingForOthers { ready: 1, total: 2 },
        ]
    );
    assert_eq!(phase(&state, &code), Phase::HandComplete);
}

#[test]
fn only_the_admin_configures_and_starts() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob"]);

    let bob = &mut clients[1];
    bob.send(
        &state,
        ClientToServer::StartSession {
            code: code.clone(),
            player_name: "Bob".into(),
        },
    );
    assert_eq!(bob.errors(), vec![ErrorKind::NotAdmin]);

    set_ceiling(&state, &code, &mut clients, 4);
    assert_eq!(clients[0].errors(), vec![ErrorKind::InvalidCeiling]);

    set_ceiling(&state, &code, &mut clients, 3);
    for c in clients.iter_mut() {
        assert!(c
            .drain()
            .contains(&ServerToClient::CeilingUpdated { ceiling: 3 }));
    }
}

#[test]
fn lone_admin_cannot_start() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann"]);
    start(&state, &code, &mut clients);
    assert_eq!(clients[0].errors(), vec![ErrorKind::NotEnoughPlayers]);
    assert_eq!(phase(&state, &code), Phase::Lobby);
}

#[test]
fn late_joiners_are_turned_away() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob"]);
    start(&state, &code, &mut clients);

    let mut cid = TestClient::new("Cid");
    cid.send(
        &state,
        ClientToServer::JoinSession {
            code,
            player_name: "Cid".into(),
        },
    );
    assert_eq!(cid.errors(), vec![ErrorKind::GameAlreadyStarted]);
}

#[test]
fn start_deals_private_hands() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob", "Cid"]);
    set_ceiling(&state, &code, &mut clients, 5);
    start(&state, &code, &mut clients);

    let leader = current_player(&state, &code);
    for c in clients.iter_mut() {
        let started = c
            .drain()
            .into_iter()
            .find_map(|m| match m {
                ServerToClient::HandStarted {
                    hand_number,
                    hand_size,
                    leader,
                    your_hand,
                } => Some((hand_number, hand_size, leader, your_hand)),
                _ => None,
            })
            .unwrap();
        assert_eq!(started.0, 1);
        assert_eq!(started.1, 1);
        assert_eq!(started.2, leader);

        let s = state.store.get(&code).unwrap();
        let s = s.lock();
        assert_eq!(started.3, s.player(&c.name).unwrap().hand);
    }
}

#[test]
fn two_player_first_hand_plays_through() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob"]);
    set_ceiling(&state, &code, &mut clients, 3);
    start(&state, &code, &mut clients);
    for c in clients.iter_mut() {
        c.drain();
    }

    let first = current_player(&state, &code);
    let second = if first == "Ann" { "Bob" } else { "Ann" }.to_string();

    // Nobody may play while bids are open.
    let card = {
        let s = state.store.get(&code).unwrap();
        let s = s.lock();
        s.player(&first).unwrap().hand[0]
    };
    play(&state, &code, client(&mut clients, &first), card);
    assert_eq!(
        client(&mut clients, &first).errors(),
        vec![ErrorKind::CannotPlayDuringDeclarations]
    );

    declare(&state, &code, client(&mut clients, &second), 0);
    assert_eq!(
        client(&mut clients, &second).errors(),
        vec![ErrorKind::NotYourTurn]
    );

    declare(&state, &code, client(&mut clients, &first), 0);
    let seen = client(&mut clients, &second).drain();
    assert!(seen.contains(&ServerToClient::DeclarationRecorded {
        player_name: first.clone(),
        amount: 0,
    }));
    assert!(seen.contains(&ServerToClient::NextToDeclare {
        player_name: second.clone(),
    }));

    // A bid of one would make the table total equal the hand size.
    declare(&state, &code, client(&mut clients, &second), 1);
    assert_eq!(
        client(&mut clients, &second).errors(),
        vec![ErrorKind::LastPlayerRestriction]
    );
    declare(&state, &code, client(&mut clients, &second), 0);
    assert!(client(&mut clients, &first)
        .drain()
        .contains(&ServerToClient::DeclarationsComplete {
            leader: first.clone()
        }));
    assert_eq!(phase(&state, &code), Phase::Playing);

    let stranger = Card::new(Rank::Two, Suit::Clubs);
    let holds_stranger = {
        let s = state.store.get(&code).unwrap();
        let s = s.lock();
        s.player(&first).unwrap().hand.contains(&stranger)
    };
    if !holds_stranger {
        play(&state, &code, client(&mut clients, &first), stranger);
        assert_eq!(
            client(&mut clients, &first).errors(),
            vec![ErrorKind::CardNotInHand]
        );
    }

    play_current(&state, &code, &mut clients);
    assert!(matches!(
        client(&mut clients, &first).drain().last(),
        Some(ServerToClient::NextTurn { player_name, hand_number: 1 }) if *player_name == second
    ));
    play_current(&state, &code, &mut clients);

    let finished = clients[0]
        .drain()
        .into_iter()
        .find_map(|m| match m {
            ServerToClient::TrickFinished {
                winner,
                tricks_won,
                trick,
            } => Some((winner, tricks_won, trick)),
            _ => None,
        })
        .unwrap();
    assert_eq!(finished.1, 1);
    assert_eq!(finished.2.len(), 2);
    assert_eq!(phase(&state, &code), Phase::HandComplete);
    for c in clients.iter_mut() {
        c.drain();
    }

    // Waiting on the other player, repeated requests change nothing.
    continue_play(&state, &code, client(&mut clients, &first));
    continue_play(&state, &code, client(&mut clients, &first));
    let waiting: Vec<_> = client(&mut clients, &first).drain();
    assert_eq!(
        waiting,
        vec![
            ServerToClient::WaitingForOthers { ready: 1, total: 2 },
            ServerToClient::WaitingForOthers { ready: 1, total: 2 },
        ]
    );
    continue_play(&state, &code, client(&mut clients, &second));

    let winner = finished.0;
    let loser = if winner == "Ann" { "Bob" } else { "Ann" };
    let reset = clients[0]
        .drain()
        .into_iter()
        .find_map(|m| match m {
            ServerToClient::HandReset {
                hand_number,
                hand_size,
                your_hand,
                scoreboard,
                ..
            } => Some((hand_number, hand_size, your_hand, scoreboard)),
            _ => None,
        })
        .unwrap();
    assert_eq!(reset.0, 2);
    assert_eq!(reset.1, 3);
    assert_eq!(reset.2.len(), 3);
    let score = |name: &str| {
        reset
            .3
            .iter()
            .find(|l| l.player_name == name)
            .map(|l| l.score)
    };
    // Bid zero and took one: a point. Bid zero and took none: the bonus.
    assert_eq!(score(winner.as_str()), Some(1));
    assert_eq!(score(loser), Some(10));
    assert_eq!(phase(&state, &code), Phase::Declaring);
}

#[test]
fn full_game_reaches_game_over() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob", "Cid"]);
    set_ceiling(&state, &code, &mut clients, 3);
    start(&state, &code, &mut clients);
    play_to_end(&state, &code, &mut clients);

    let mut winners = vec![];
    for c in clients.iter_mut() {
        let over = c
            .drain()
            .into_iter()
            .filter_map(|m| match m {
                ServerToClient::GameOver { winner, scoreboard } => Some((winner, scoreboard)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].1.len(), 3);
        winners.push(over[0].0.clone());
    }
    assert!(winners.windows(2).all(|w| w[0] == w[1]));

    let s = state.store.get(&code).unwrap();
    let s = s.lock();
    assert_eq!(s.current_hand_number, 4);
    let best = s.players.iter().map(|p| p.score).max().unwrap();
    assert_eq!(s.player(&winners[0]).unwrap().score, best);

    drop(s);
    play(&state, &code, &mut clients[0], Card::new(Rank::Ace, Suit::Hearts));
    assert_eq!(
        clients[0].errors(),
        vec![ErrorKind::CannotPlayDuringDeclarations]
    );
}

#[test]
fn admin_destroys_session() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob"]);

    clients[1].send(
        &state,
        ClientToServer::DestroySession {
            code: code.clone(),
            player_name: "Bob".into(),
        },
    );
    assert_eq!(clients[1].errors(), vec![ErrorKind::NotAdmin]);

    clients[0].send(
        &state,
        ClientToServer::DestroySession {
            code: code.clone(),
            player_name: "Ann".into(),
        },
    );
    for c in clients.iter_mut() {
        assert!(matches!(
            c.drain().last(),
            Some(ServerToClient::SessionDestroyed { code: gone, .. }) if *gone == code
        ));
    }
    assert!(state.store.is_empty());

    let mut cid = TestClient::new("Cid");
    cid.send(
        &state,
        ClientToServer::JoinSession {
            code,
            player_name: "Cid".into(),
        },
    );
    assert_eq!(cid.errors(), vec![ErrorKind::SessionNotFound]);
}

#[test]
fn lobby_disconnect_hands_admin_over() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob", "Cid"]);

    handlers::disconnect(&state, &clients[0].conn);
    let roster = clients[1]
        .drain()
        .into_iter()
        .find_map(|m| match m {
            ServerToClient::PlayerListUpdated { players } => Some(players),
            _ => None,
        })
        .unwrap();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].name, "Bob");
    assert!(roster[0].is_admin);

    handlers::disconnect(&state, &clients[1].conn);
    handlers::disconnect(&state, &clients[2].conn);
    assert!(state.store.get(&code).is_err());
}

#[test]
fn mid_game_disconnect_aborts() {
    let state = AppState::new();
    let (code, mut clients) = lobby(&state, &["Ann", "Bob"]);
    start(&state, &code, &mut clients);
    clients[0].drain();

    handlers::disconnect(&state, &clients[1].conn);
    assert!(matches!(
        clients[0].drain().last(),
        Some(ServerToClient::SessionDestroyed { .. })
    ));
    assert!(state.store.is_empty());
}

#[test]
fn list_shows_only_open_lobbies() {
    let state = AppState::new();
    let (open, _a) = lobby(&state, &["Ann", "Bob"]);
    let (busy, mut b) = lobby(&state, &["Cid", "Dee"]);
    start(&state, &busy, &mut b);

    let mut browser = TestClient::new("Eve");
    browser.send(&state, ClientToServer::ListSessions);
    let sessions = match browser.drain().pop() {
        Some(ServerToClient::SessionList { sessions }) => sessions,
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(
        sessions,
        vec![SessionInfo {
            code: open,
            admin: "Ann".into(),
            player_count: 2,
            ceiling: 1,
        }]
    );
}

#[tokio::test]
async fn websocket_round_trip() {
    use futures::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    crate::telemetry::init_test_tracing();

    let cfg = crate::config::ServerConfig {
        cors_origin: crate::config::CorsOrigin::Any,
        ..Default::default()
    };
    let app = crate::build_router(AppState::new(), &cfg).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();

    async fn recv(
        ws: &mut tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    ) -> ServerToClient {
        loop {
            match ws.next().await.unwrap().unwrap() {
                Message::Text(t) => return serde_json::from_str(&t).unwrap(),
                _ => continue,
            }
        }
    }

    assert!(matches!(recv(&mut ws).await, ServerToClient::Hello { .. }));

    let create = ClientToServer::CreateSession {
        player_name: "Ann".into(),
    };
    ws.send(Message::Text(serde_json::to_string(&create).unwrap()))
        .await
        .unwrap();
    assert!(matches!(
        recv(&mut ws).await,
        ServerToClient::SessionCreated { code } if code.len() == 6
    ));
    assert!(matches!(
        recv(&mut ws).await,
        ServerToClient::PlayerListUpdated { players } if players.len() == 1
    ));

    ws.send(Message::Text("{not json".into())).await.unwrap();
    assert!(matches!(
        recv(&mut ws).await,
        ServerToClient::Error {
            kind: ErrorKind::MalformedMessage,
            ..
        }
    ));
}
