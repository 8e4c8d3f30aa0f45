#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use broadside::{
    init_logging, run_client, run_server, ui::ConsoleSink, AiPlayer, CliPlayer, LocalMatch, Player, Rules,
    TargetingModel, TcpTransport,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use std::path::PathBuf;
#[cfg(feature = "std")]
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    /// JSON rules file; the standard fleet is used when omitted.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Ai,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Play against the computer on this machine.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = TargetingModel::FootprintFit)]
        model: TargetingModel,
        /// Let two computer players fight it out.
        #[arg(long)]
        ai_vs_ai: bool,
    },
    /// Host rooms; every two connections share a match.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Join a room on a server.
    Connect {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = TargetingModel::FootprintFit)]
        model: TargetingModel,
        /// Rematches an AI player accepts before declining.
        #[arg(long, default_value_t = 0)]
        rematches: u32,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let rules = match &cli.rules {
        Some(path) => Rules::load(path)?,
        None => Rules::standard(),
    };

    match cli.command {
        Commands::Local { seed, model, ai_vs_ai } => {
            let rng = make_rng(seed);
            let first: Box<dyn Player> = if ai_vs_ai {
                println!("Starting local AI vs AI game...");
                Box::new(AiPlayer::with_model(model))
            } else {
                println!("Starting local game against the computer...");
                Box::new(CliPlayer::with_model(model))
            };
            let second: Box<dyn Player> = Box::new(AiPlayer::with_model(model));
            let mut game = LocalMatch::new(rules, [first, second], ConsoleSink::new(ai_vs_ai), rng)
                .map_err(|e| anyhow::anyhow!("invalid rules: {}", e))?;
            let outcome = game.run();
            if outcome.winners.is_empty() {
                println!("No match was completed.");
            }
        }
        Commands::Serve { bind } => {
            let listener = TcpListener::bind(&bind).await?;
            println!("Serving rooms on {}", bind);
            run_server(listener, rules).await?;
        }
        Commands::Connect {
            connect,
            player,
            seed,
            model,
            rematches,
        } => {
            let mut rng = make_rng(seed);
            println!("Connecting to {}...", connect);
            let mut transport = TcpTransport::connect(connect.as_str()).await?;
            let player: Box<dyn Player> = match player {
                PlayerType::Human => Box::new(CliPlayer::with_model(model)),
                PlayerType::Ai => Box::new(AiPlayer::with_model(model).with_rematches(rematches)),
            };
            let outcome = run_client(&mut transport, player, &mut rng).await?;
            println!(
                "Session {}: won {} of {} match(es){}",
                outcome.session,
                outcome.wins(),
                outcome.winners.len(),
                if outcome.opponent_left { ", opponent left" } else { "" }
            );
        }
    }
    Ok(())
}
