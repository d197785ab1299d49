use futures_util::{SinkExt, StreamExt};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tricktaker_protocol::{Card, ClientToServer, PublicPlayer, ServerToClient};

const DEFAULT_URL: &str = "ws://127.0.0.1:9001/ws";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🃏 Tricktaker CLI Client");
    println!("========================");

    print!("Enter your name: ");
    io::stdout().flush()?;
    let mut player_name = String::new();
    io::stdin().read_line(&mut player_name)?;
    let player_name = player_name.trim().to_string();

    if player_name.is_empty() {
        println!("❌ Name cannot be empty");
        return Ok(());
    }

    let url = std::env::var("SERVER_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    println!("🔗 Connecting to {}...", url);

    let (ws_stream, _) = connect_async(url.as_str()).await?;
    println!("✅ Connected to server!");

    let (mut write, mut read) = ws_stream.split();

    // The reader learns the session code; the prompt needs it for every command.
    let (code_tx, code_rx) = watch::channel::<Option<String>>(None);

    tokio::spawn({
        let player_name = player_name.clone();
        async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if let Ok(server_msg) = serde_json::from_str::<ServerToClient>(&text) {
                            handle_server_message(server_msg, &player_name, &code_tx);
                        }
                    }
                    Ok(Message::Close(_)) => {
                        println!("🔌 Connection closed by server");
                        break;
                    }
                    Err(e) => {
                        println!("❌ WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    });

    print_help();

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        if line == "help" {
            print_help();
            continue;
        }

        let code = code_rx.borrow().clone();
        match parse_command(line, &player_name, code.as_deref()) {
            Ok(msg) => {
                let json = serde_json::to_string(&msg)?;
                write.send(Message::Text(json)).await?;
            }
            Err(problem) => println!("❓ {}", problem),
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}

fn print_help() {
    println!("\n📋 Commands available:");
    println!("  create          - Open a new session as its admin");
    println!("  join <code>     - Join a session");
    println!("  list            - Show sessions waiting for players");
    println!("  ceiling <n>     - Set the hand size ceiling (admin, odd 1-51)");
    println!("  start           - Deal the first hand (admin)");
    println!("  declare <n>     - Declare how many tricks you will win");
    println!("  play <card>     - Play a card, e.g. 'play 10H' or 'play AS'");
    println!("  continue        - Ready up for the next trick or hand");
    println!("  destroy         - Close the session (admin)");
    println!("  quit            - Exit");
    println!("\nType commands and press Enter:");
}

fn handle_server_message(msg: ServerToClient, player_name: &str, code: &watch::Sender<Option<String>>) {
    match msg {
        ServerToClient::Hello { your_id } => {
            println!("👋 Welcome! Your ID: {}", your_id);
        }
        ServerToClient::SessionCreated { code: new_code } => {
            println!("🏠 Session created. Share this code: {}", new_code);
            let _ = code.send(Some(new_code));
        }
        ServerToClient::Joined {
            code: joined,
            players,
            ceiling,
            ..
        } => {
            println!("🎯 Joined session {} (ceiling {})", joined, ceiling);
            print_players(&players);
            let _ = code.send(Some(joined));
        }
        ServerToClient::PlayerListUpdated { players } => print_players(&players),
        ServerToClient::CeilingUpdated { ceiling } => {
            println!("📏 Hand size ceiling is now {}", ceiling);
        }
        ServerToClient::HandStarted {
            hand_number,
            hand_size,
            leader,
            your_hand,
        } => {
            println!("\n🎲 Hand {} ({} cards). {} declares first.", hand_number, hand_size, leader);
            print_hand(&your_hand);
            prompt_if_me(&leader, player_name, "declare");
        }
        ServerToClient::DeclarationRecorded { player_name: who, amount } => {
            println!("🗣️  {} declared {}", who, amount);
        }
        ServerToClient::NextToDeclare { player_name: who } => {
            prompt_if_me(&who, player_name, "declare");
        }
        ServerToClient::DeclarationsComplete { leader } => {
            println!("✅ Declarations complete. {} leads.", leader);
            prompt_if_me(&leader, player_name, "play");
        }
        ServerToClient::CardPlayed { trick } => {
            let shown: Vec<String> = trick
                .iter()
                .map(|p| format!("{} {}", p.player_name, p.card))
                .collect();
            println!("🂠 Trick: {}", shown.join(", "));
        }
        ServerToClient::NextTurn { player_name: who, .. } => {
            prompt_if_me(&who, player_name, "play");
        }
        ServerToClient::HandUpdated { hand } => print_hand(&hand),
        ServerToClient::TrickFinished {
            winner, tricks_won, ..
        } => {
            println!("🏆 {} takes the trick ({} so far). Type 'continue'.", winner, tricks_won);
        }
        ServerToClient::WaitingForOthers { ready, total } => {
            println!("⏳ Waiting for others ({}/{})", ready, total);
        }
        ServerToClient::HandReset {
            hand_number,
            hand_size,
            leader,
            your_hand,
            scoreboard,
        } => {
            println!("\n📊 Scores:");
            for line in &scoreboard {
                println!("  {}: {}", line.player_name, line.score);
            }
            println!("🎲 Hand {} ({} cards). {} declares first.", hand_number, hand_size, leader);
            print_hand(&your_hand);
            prompt_if_me(&leader, player_name, "declare");
        }
        ServerToClient::GameOver { winner, scoreboard } => {
            println!("\n🎉 GAME OVER! {} wins.", winner);
            for line in &scoreboard {
                println!("  {}: {}", line.player_name, line.score);
            }
        }
        ServerToClient::SessionDestroyed { code: gone, reason } => {
            println!("💥 Session {} closed: {}", gone, reason);
            let _ = code.send(None);
        }
        ServerToClient::SessionList { sessions } => {
            if sessions.is_empty() {
                println!("📭 No open sessions");
            }
            for s in sessions {
                println!(
                    "  {} - admin {}, {} players, ceiling {}",
                    s.code, s.admin, s.player_count, s.ceiling
                );
            }
        }
        ServerToClient::Error { kind, message } => {
            println!("❌ {:?}: {}", kind, message);
        }
    }
}

fn prompt_if_me(who: &str, me: &str, action: &str) {
    if who == me {
        println!("👉 Your turn to {}", action);
    }
}

fn print_hand(hand: &[Card]) {
    let cards: Vec<String> = hand.iter().map(Card::to_string).collect();
    println!("🃏 Your hand: {}", cards.join(" "));
}

fn print_players(players: &[PublicPlayer]) {
    println!("👥 Players ({}):", players.len());
    for p in players {
        let admin = if p.is_admin { " 🎩" } else { "" };
        let declared = p
            .declared
            .map(|d| format!(", declared {}", d))
            .unwrap_or_default();
        println!(
            "  {}{} - score {}, tricks {}{}",
            p.name, admin, p.score, p.tricks_won, declared
        );
    }
}

fn parse_command(
    input: &str,
    player_name: &str,
    code: Option<&str>,
) -> Result<ClientToServer, String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let verb = parts[0].to_lowercase();
    let player_name = player_name.to_string();

    match verb.as_str() {
        "create" => return Ok(ClientToServer::CreateSession { player_name }),
        "list" => return Ok(ClientToServer::ListSessions),
        "join" => {
            let code = parts.get(1).ok_or("usage: join <code>")?;
            return Ok(ClientToServer::JoinSession {
                code: code.to_string(),
                player_name,
            });
        }
        _ => {}
    }

    let code = code
        .ok_or("create or join a session first")?
        .to_string();
    let number = |usage: &str| -> Result<i64, String> {
        parts
            .get(1)
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| usage.to_string())
    };

    match verb.as_str() {
        "ceiling" => Ok(ClientToServer::SetHandSizeCeiling {
            code,
            player_name,
            ceiling: number("usage: ceiling <odd number>")?,
        }),
        "start" => Ok(ClientToServer::StartSession { code, player_name }),
        "declare" => Ok(ClientToServer::Declare {
            code,
            player_name,
            amount: number("usage: declare <tricks>")?,
        }),
        "play" => {
            let raw = parts.get(1).ok_or("usage: play <card>")?;
            let card: Card = raw.parse().map_err(|e| format!("{e}"))?;
            Ok(ClientToServer::PlayCard {
                code,
                player_name,
                card,
            })
        }
        "continue" => Ok(ClientToServer::Continue { code, player_name }),
        "destroy" => Ok(ClientToServer::DestroySession { code, player_name }),
        _ => Err(format!("Unknown command: {input}")),
    }
}
