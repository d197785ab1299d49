use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tricktaker_protocol::{Card, ClientToServer, ServerToClient};

/// A bot that finds a table and plays a whole game on its own.
#[derive(Parser)]
#[command(name = "demo_cli")]
struct Args {
    /// Player name (defaults to one derived from the process id)
    name: Option<String>,
    #[arg(long, default_value = "ws://127.0.0.1:9001/ws")]
    url: String,
    /// Create the session instead of joining one
    #[arg(long)]
    host: bool,
    /// Table size; the host starts once this many players are seated
    #[arg(long, default_value = "3")]
    players: usize,
    /// Host only: hand size ceiling
    #[arg(long, default_value = "5")]
    ceiling: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let player_name = args
        .name
        .clone()
        .unwrap_or_else(|| format!("Bot{}", std::process::id()));

    println!("🤖 Tricktaker demo bot: {}", player_name);
    println!("🔗 Connecting to {}...", args.url);

    let (ws_stream, _) = connect_async(args.url.as_str()).await?;
    println!("✅ [{}] Connected to server!", player_name);

    let (mut write, mut read) = ws_stream.split();
    let mut bot = Bot::new(player_name.clone(), &args);

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Ok(server_msg) = serde_json::from_str::<ServerToClient>(&text) {
                    log_message(&server_msg, &player_name);
                    let responses = bot.react(&server_msg);
                    for response in responses {
                        tokio::time::sleep(tokio::time::Duration::from_millis(300)).await;
                        let response_json = serde_json::to_string(&response)?;
                        write.send(Message::Text(response_json)).await?;
                    }
                    if bot.finished {
                        break;
                    }
                }
            }
            Ok(Message::Close(_)) => {
                println!("🔌 [{}] Connection closed by server", player_name);
                break;
            }
            Err(e) => {
                println!("❌ [{}] WebSocket error: {}", player_name, e);
                break;
            }
            _ => {}
        }
    }

    println!("👋 {} disconnected!", player_name);
    Ok(())
}

struct Bot {
    name: String,
    host: bool,
    seats_wanted: usize,
    ceiling: i64,
    code: Option<String>,
    started: bool,
    hand: Vec<Card>,
    hand_size: u32,
    declared_total: u32,
    my_bid: u32,
    my_tricks: u32,
    finished: bool,
}

impl Bot {
    fn new(name: String, args: &Args) -> Self {
        Bot {
            name,
            host: args.host,
            seats_wanted: args.players,
            ceiling: args.ceiling,
            code: None,
            started: false,
            hand: vec![],
            hand_size: 0,
            declared_total: 0,
            my_bid: 0,
            my_tricks: 0,
            finished: false,
        }
    }

    fn react(&mut self, msg: &ServerToClient) -> Vec<ClientToServer> {
        let player_name = self.name.clone();
        match msg {
            ServerToClient::Hello { .. } if self.host => {
                vec![ClientToServer::CreateSession { player_name }]
            }
            ServerToClient::Hello { .. } => vec![ClientToServer::ListSessions],
            ServerToClient::SessionList { sessions } if self.code.is_none() => {
                match sessions.first() {
                    Some(s) => vec![ClientToServer::JoinSession {
                        code: s.code.clone(),
                        player_name,
                    }],
                    // Host not up yet; ask again.
                    None => vec![ClientToServer::ListSessions],
                }
            }
            ServerToClient::SessionCreated { code } | ServerToClient::Joined { code, .. } => {
                self.code = Some(code.clone());
                vec![]
            }
            ServerToClient::PlayerListUpdated { players }
                if self.host && !self.started && players.len() >= self.seats_wanted =>
            {
                self.started = true;
                let code = self.code.clone().unwrap_or_default();
                vec![
                    ClientToServer::SetHandSizeCeiling {
                        code: code.clone(),
                        player_name: player_name.clone(),
                        ceiling: self.ceiling,
                    },
                    ClientToServer::StartSession { code, player_name },
                ]
            }
            ServerToClient::HandStarted {
                hand_size,
                leader,
                your_hand,
                ..
            }
            | ServerToClient::HandReset {
                hand_size,
                leader,
                your_hand,
                ..
            } => {
                self.hand = your_hand.clone();
                self.hand_size = *hand_size;
                self.declared_total = 0;
                self.my_tricks = 0;
                self.act_if_me(leader, Self::declare)
            }
            ServerToClient::DeclarationRecorded {
                player_name: who,
                amount,
            } => {
                self.declared_total += amount;
                if *who == self.name {
                    self.my_bid = *amount;
                }
                vec![]
            }
            ServerToClient::NextToDeclare { player_name: who } => self.act_if_me(who, Self::declare),
            ServerToClient::DeclarationsComplete { leader } => self.act_if_me(leader, Self::play),
            ServerToClient::NextTurn { player_name: who, .. } => self.act_if_me(who, Self::play),
            ServerToClient::HandUpdated { hand } => {
                self.hand = hand.clone();
                vec![]
            }
            ServerToClient::TrickFinished { winner, .. } => {
                if *winner == self.name {
                    self.my_tricks += 1;
                }
                self.with_code(|code, player_name| ClientToServer::Continue { code, player_name })
            }
            ServerToClient::GameOver { .. } | ServerToClient::SessionDestroyed { .. } => {
                self.finished = true;
                vec![]
            }
            _ => vec![],
        }
    }

    fn act_if_me(&mut self, who: &str, act: fn(&mut Self) -> Vec<ClientToServer>) -> Vec<ClientToServer> {
        if who == self.name {
            act(self)
        } else {
            vec![]
        }
    }

    fn with_code(&self, f: impl FnOnce(String, String) -> ClientToServer) -> Vec<ClientToServer> {
        match &self.code {
            Some(code) => vec![f(code.clone(), self.name.clone())],
            None => vec![],
        }
    }

    /// An even share of the tricks, nudged off the one total the last bidder may not make.
    fn declare(&mut self) -> Vec<ClientToServer> {
        let seats = self.seats_wanted.max(1) as u32;
        let mut amount = self.hand_size / seats;
        if self.declared_total + amount == self.hand_size {
            amount = if amount > 0 { amount - 1 } else { amount + 1 };
        }
        self.with_code(|code, player_name| ClientToServer::Declare {
            code,
            player_name,
            amount: amount as i64,
        })
    }

    /// High card while still short of the bid, low card otherwise.
    fn play(&mut self) -> Vec<ClientToServer> {
        let pick = if self.my_tricks < self.my_bid {
            self.hand.iter().max_by_key(|c| strength(c)).copied()
        } else {
            self.hand.iter().min_by_key(|c| strength(c)).copied()
        };
        let Some(card) = pick else {
            return vec![];
        };
        self.hand.retain(|c| *c != card);
        self.with_code(|code, player_name| ClientToServer::PlayCard {
            code,
            player_name,
            card,
        })
    }
}

fn strength(card: &Card) -> (bool, u8) {
    (card.is_ace_of_hearts(), card.rank.value())
}

fn log_message(msg: &ServerToClient, player_name: &str) {
    match msg {
        ServerToClient::Hello { your_id } => {
            println!("👋 [{}] Welcome! Your ID: {}", player_name, your_id);
        }
        ServerToClient::HandStarted { hand_number, your_hand, .. }
        | ServerToClient::HandReset { hand_number, your_hand, .. } => {
            let cards: Vec<String> = your_hand.iter().map(Card::to_string).collect();
            println!("🎲 [{}] Hand {}: {}", player_name, hand_number, cards.join(" "));
        }
        ServerToClient::DeclarationRecorded { player_name: who, amount } => {
            println!("🗣️  [{}] {} declared {}", player_name, who, amount);
        }
        ServerToClient::TrickFinished { winner, trick, .. } => {
            let shown: Vec<String> = trick
                .iter()
                .map(|p| format!("{} {}", p.player_name, p.card))
                .collect();
            println!("🏆 [{}] {} takes {}", player_name, winner, shown.join(", "));
        }
        ServerToClient::GameOver { winner, scoreboard } => {
            println!("🎉 [{}] GAME OVER! {} wins.", player_name, winner);
            for line in scoreboard {
                println!("   [{}] {}: {}", player_name, line.player_name, line.score);
            }
        }
        ServerToClient::Error { kind, message } => {
            println!("❌ [{}] {:?}: {}", player_name, kind, message);
        }
        ServerToClient::SessionDestroyed { reason, .. } => {
            println!("💥 [{}] Session closed: {}", player_name, reason);
        }
        _ => {}
    }
}
