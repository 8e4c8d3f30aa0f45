use broadside::{AiPlayer, LocalMatch, NullSink, Player, Rules, SessionId, TargetingModel};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <seed> [games]", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let games: u64 = match args.get(2) {
        Some(n) => n.parse()?,
        None => 1,
    };

    let rules = Rules::standard();
    let mut wins = [0u64; 2];
    let mut total_rounds = 0u64;

    for game in 0..games {
        let rng = SmallRng::seed_from_u64(seed.wrapping_add(game));
        let players: [Box<dyn Player>; 2] = [
            Box::new(AiPlayer::with_model(TargetingModel::FootprintFit)),
            Box::new(AiPlayer::with_model(TargetingModel::FootprintFit)),
        ];
        let mut local = LocalMatch::new(rules.clone(), players, NullSink, rng)
            .map_err(|e| anyhow::anyhow!("invalid rules: {}", e))?;
        let outcome = local.run();
        match outcome.winners.first() {
            Some(SessionId(1)) => wins[0] += 1,
            Some(_) => wins[1] += 1,
            None => anyhow::bail!("game {} ended without a winner", game),
        }
        total_rounds += u64::from(outcome.rounds);
    }

    let winner = match wins[0].cmp(&wins[1]) {
        std::cmp::Ordering::Greater => Some("player1"),
        std::cmp::Ordering::Less => Some("player2"),
        std::cmp::Ordering::Equal => None,
    };
    let result = json!({
        "games": games,
        "player1": {"wins": wins[0]},
        "player2": {"wins": wins[1]},
        "average_rounds": if games == 0 { 0.0 } else { total_rounds as f64 / games as f64 },
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
