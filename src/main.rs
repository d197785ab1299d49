use clap::{Parser, Subcommand};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "tricktaker-combined")]
#[command(about = "Tricktaker - server, terminal client and demo table launcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run only the server
    Server {
        /// Port for the server
        #[arg(short, long, default_value = "9001")]
        port: u16,
    },
    /// Run an interactive terminal client
    Client {
        /// Port the server listens on
        #[arg(short, long, default_value = "9001")]
        port: u16,
    },
    /// Run the server plus a table of bots that play a whole game
    Demo {
        /// Number of bots at the table
        #[arg(long, default_value = "3")]
        players: u32,
        /// Hand size ceiling (odd, 1-51)
        #[arg(long, default_value = "5")]
        ceiling: u32,
        /// Port for the server
        #[arg(short, long, default_value = "9001")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server { port } => run_server(port),
        Commands::Client { port } => run_client(port),
        Commands::Demo {
            players,
            ceiling,
            port,
        } => run_demo(players, ceiling, port),
    }
}

fn ws_url(port: u16) -> String {
    format!("ws://127.0.0.1:{port}/ws")
}

fn run_demo(players: u32, ceiling: u32, port: u16) {
    println!("🚀 Starting Tricktaker demo: {players} bots, ceiling {ceiling}, port {port}");

    let server_handle = thread::spawn(move || run_server(port));
    thread::sleep(Duration::from_millis(1500));

    let mut bot_handles = Vec::new();
    for i in 1..=players {
        println!("🤖 Starting bot {i}...");
        let handle = thread::spawn(move || {
            // The host has to exist before anyone can find the session.
            thread::sleep(Duration::from_millis(500 * i as u64));
            run_bot(i, players, ceiling, port);
        });
        bot_handles.push(handle);
    }

    println!("✅ All processes started. Press Ctrl+C to stop.");

    for handle in bot_handles {
        let _ = handle.join();
    }
    let _ = server_handle.join();
}

fn run_server(port: u16) {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-p", "tricktaker-server"])
        .env("PORT", port.to_string());
    run_or_exit(cmd, "Server");
}

fn run_client(port: u16) {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--bin", "cli_client"])
        .env("SERVER_URL", ws_url(port));
    run_or_exit(cmd, "Client");
}

fn run_bot(index: u32, players: u32, ceiling: u32, port: u16) {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--bin", "demo_cli", "--"])
        .arg(format!("Bot{index}"))
        .args(["--url", &ws_url(port)])
        .args(["--players", &players.to_string()]);
    if index == 1 {
        cmd.args(["--host", "--ceiling", &ceiling.to_string()]);
    }
    run_or_exit(cmd, "Bot");
}

fn run_or_exit(mut cmd: Command, what: &str) {
    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();

    match status {
        Ok(exit_status) => {
            if !exit_status.success() {
                eprintln!("❌ {what} exited with error: {exit_status}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start {what}: {e}");
            std::process::exit(1);
        }
    }
}
