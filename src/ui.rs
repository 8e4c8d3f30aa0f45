#![cfg(feature = "std")]

use std::string::String;

use crate::ai::Density;
use crate::board::PlacementGrid;
use crate::common::{Cell, SessionId};
use crate::config::Rules;
use crate::damage::TypeHealth;
use crate::game::{Match, MatchEvent, Phase};
use crate::local::EventSink;
use crate::view::PlayerView;

fn column_label(x: usize) -> char {
    (b'A' + (x % 26) as u8) as char
}

/// Human-readable coordinate such as `C4`.
pub fn coord_to_string(rules: &Rules, cell: Cell) -> String {
    let (x, y) = rules.coords(cell);
    format!("{}{}", column_label(x as usize), y + 1)
}

/// Parse a coordinate such as `c4` into a cell index on `rules`' board.
pub fn parse_coord(rules: &Rules, input: &str) -> Result<Cell, String> {
    let input = input.trim();
    if input.len() < 2 {
        return Err("Too short - need column letter and row number (e.g., A5)".to_string());
    }
    let mut chars = input.chars();
    let col_ch = chars
        .next()
        .ok_or("No column letter")?
        .to_ascii_uppercase();
    if !col_ch.is_ascii_uppercase() {
        return Err(format!("Invalid column '{}' - must be a letter", col_ch));
    }
    let last_col = column_label(rules.width.saturating_sub(1));
    let col = (col_ch as u8 - b'A') as usize;
    if col >= rules.width {
        return Err(format!("Column '{}' out of bounds - must be A-{}", col_ch, last_col));
    }
    let row_str: String = chars.collect();
    let row: usize = row_str
        .parse()
        .map_err(|_| format!("Invalid row '{}' - must be a number 1-{}", row_str, rules.height))?;
    if row == 0 || row > rules.height {
        return Err(format!("Row {} out of bounds - must be 1-{}", row, rules.height));
    }
    rules
        .index_of(col as i32, row as i32 - 1)
        .ok_or_else(|| format!("{} is not on the board", input))
}

fn print_header(width: usize) {
    print!("    ");
    for x in 0..width {
        print!(" {}", column_label(x));
    }
    println!();
}

fn print_grid<F: Fn(Cell) -> char>(rules: &Rules, glyph: F) {
    print_header(rules.width);
    for y in 0..rules.height {
        print!("  {:2}", y + 1);
        for x in 0..rules.width {
            print!(" {}", glyph(y * rules.width + x));
        }
        println!();
    }
}

/// Own board: ships, incoming hits and misses.
pub fn print_fleet_board(rules: &Rules, fleet: Option<&PlacementGrid>, view: &PlayerView) {
    print_grid(rules, |cell| {
        let ship = fleet.and_then(|g| g.ship_at(cell)).is_some();
        match (view.incoming().is_shot(cell), ship) {
            (true, true) => 'X',
            (true, false) => 'o',
            (false, true) => 'S',
            (false, false) => '.',
        }
    });
    println!("    Legend: S=Ship  X=Hit  o=Miss  .=Water");
}

/// Own shots at the opponent. Only whole-round outcomes are public, so a
/// shot is shown as a certain miss or as part of a round that scored.
pub fn print_target_board(view: &PlayerView) {
    let known_empty = view.known_empty();
    print_grid(view.rules(), |cell| {
        if !view.my_shots().is_shot(cell) {
            '.'
        } else if known_empty[cell] {
            'o'
        } else {
            '?'
        }
    });
    println!("    Legend: o=Miss  ?=Fired in a scoring round  .=Unknown");
}

/// Print the density map as percentages.
pub fn print_density_board(rules: &Rules, density: &[Option<Density>]) {
    println!("\nHit density (%):");
    print!("   ");
    for x in 0..rules.width {
        print!(" {:>4}", column_label(x));
    }
    println!();
    for y in 0..rules.height {
        print!("{:2} ", y + 1);
        for x in 0..rules.width {
            match density.get(y * rules.width + x).copied().flatten() {
                Some(d) => print!(" {:4.0}", d.as_f64() * 100.0),
                None => print!("    -"),
            }
        }
        println!();
    }
}

pub fn print_health(rules: &Rules, label: &str, health: &[TypeHealth]) {
    println!("  {}:", label);
    for h in health {
        let name = rules
            .ships
            .get(h.type_index)
            .map(|s| s.name.as_str())
            .unwrap_or("?");
        let status = if h.is_sunk() { "SUNK" } else { "afloat" };
        println!("    {:<18} {:>2}/{:<2} {}", name, h.intact, h.total, status);
    }
}

/// Full picture for one player.
pub fn print_player_view(view: &PlayerView, fleet: Option<&PlacementGrid>) {
    println!("\nRound {}", view.turn());
    println!("Opponent waters:");
    print_target_board(view);
    print_health(view.rules(), "Opponent fleet", &view.opponent_health_by_type());
    println!("\nYour waters:");
    print_fleet_board(view.rules(), fleet, view);
    print_health(view.rules(), "Your fleet", &view.my_damage().health_by_type());
}

/// One-line description of an event for the match log.
pub fn describe_event(rules: &Rules, event: &MatchEvent) -> String {
    match event {
        MatchEvent::PlayerJoined(s) => format!("player {} joined", s),
        MatchEvent::PlayerLeft(s) => format!("player {} left", s),
        MatchEvent::PhaseChanged(p) => format!("phase -> {:?}", p),
        MatchEvent::PlacementSubmitted(s) => format!("player {} placed their fleet", s),
        MatchEvent::TurnOwnerChanged { owner, turn } => {
            format!("round {}: player {} to fire", turn, owner)
        }
        MatchEvent::ShotRecorded { shooter, cell, .. } => {
            format!("player {} fires at {}", shooter, coord_to_string(rules, *cell))
        }
        MatchEvent::DamageRecorded { target, .. } => format!("player {} takes a hit", target),
        MatchEvent::RematchVoted { session, accept } => format!(
            "player {} {} a rematch",
            session,
            if *accept { "wants" } else { "declines" }
        ),
        MatchEvent::MatchResult { winner } => format!("player {} wins", winner),
    }
}

/// Writes every event to the log and prints a line when a match ends.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &MatchEvent, game: &Match) {
        let line = describe_event(game.rules(), event);
        log::debug!("{}", line);
        if self.verbose {
            println!("{}", line);
        }
        if let MatchEvent::MatchResult { winner } = event {
            let rounds = game.turn();
            println!("Match over after {} round(s): player {} wins", rounds, winner);
            for session in game.sessions().collect::<Vec<SessionId>>() {
                if let Some(health) = game.health(session) {
                    println!("  player {}: {} part(s) intact", session, health);
                }
            }
        } else if matches!(event, MatchEvent::PhaseChanged(Phase::Leave)) {
            println!("Room closed.");
        }
    }
}
