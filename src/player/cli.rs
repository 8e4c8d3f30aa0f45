#![cfg(feature = "std")]

use std::io::{self, BufRead, Write};
use std::string::String;
use std::vec::Vec;

use rand::rngs::SmallRng;

use crate::ai::{self, TargetingModel};
use crate::board::{self, PlacementGrid, MAX_PLACEMENT_ATTEMPTS};
use crate::common::{Cell, PlacementError};
use crate::config::Rules;
use crate::game::{MatchEvent, Phase};
use crate::ship::ShipPool;
use crate::ui;
use crate::view::PlayerView;

use super::Player;

/// Interactive player on stdin/stdout.
pub struct CliPlayer {
    fleet: Option<PlacementGrid>,
    model: TargetingModel,
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl CliPlayer {
    pub fn new() -> Self {
        Self {
            fleet: None,
            model: TargetingModel::default(),
        }
    }

    /// Model used for the suggested volley.
    pub fn with_model(model: TargetingModel) -> Self {
        Self { fleet: None, model }
    }
}

fn prompt(text: &str) -> Option<String> {
    print!("{}", text);
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn print_placement_help(rules: &Rules) {
    println!("\nPlacement:");
    println!("  <CELL>   put the current ship's pivot on CELL (e.g. B3)");
    println!("  ENTER    place the current ship at random");
    println!("  auto     place all remaining ships at random");
    println!(
        "  Columns A-{}, rows 1-{}. Ships may not touch, not even diagonally.\n",
        (b'A' + (rules.width.saturating_sub(1) % 26) as u8) as char,
        rules.height
    );
}

fn place_at_random(
    grid: &mut PlacementGrid,
    rules: &Rules,
    pool: &ShipPool,
    id: u8,
    rng: &mut SmallRng,
) -> bool {
    use rand::seq::SliceRandom;

    let Some(footprint) = pool.footprint(rules, id) else {
        return false;
    };
    let mut pivots: Vec<Cell> = (0..rules.cell_count()).collect();
    pivots.shuffle(rng);
    pivots.into_iter().any(|pivot| grid.try_place(id, footprint, pivot))
}

impl Player for CliPlayer {
    fn place_fleet(&mut self, rng: &mut SmallRng, rules: &Rules) -> Result<PlacementGrid, PlacementError> {
        println!("\n=== FLEET PLACEMENT ===");
        print_placement_help(rules);

        let pool = ShipPool::new(rules);
        let mut grid = PlacementGrid::for_rules(rules);
        let view = PlayerView::new(rules.clone(), crate::common::SessionId(0));
        let ids: Vec<u8> = pool.ids().collect();

        let mut index = 0;
        while index < ids.len() {
            let id = ids[index];
            let (name, size) = pool
                .type_of(id)
                .and_then(|t| rules.ships.get(t))
                .map(|s| (s.name.clone(), s.size()))
                .ok_or(PlacementError::UnknownShip(id))?;

            ui::print_fleet_board(rules, Some(&grid), &view);
            let Some(line) = prompt(&format!(
                "\nShip {}/{}: {} (size {}) > ",
                index + 1,
                ids.len(),
                name,
                size
            )) else {
                // stdin closed: finish the layout automatically
                let grid = board::auto_place_with_retries(rules, rng, MAX_PLACEMENT_ATTEMPTS)?;
                self.fleet = Some(grid.clone());
                return Ok(grid);
            };

            if line.eq_ignore_ascii_case("help") {
                print_placement_help(rules);
                continue;
            }
            if line.eq_ignore_ascii_case("auto") {
                let grid = board::auto_place_with_retries(rules, rng, MAX_PLACEMENT_ATTEMPTS)?;
                self.fleet = Some(grid.clone());
                return Ok(grid);
            }
            if line.is_empty() {
                if place_at_random(&mut grid, rules, &pool, id, rng) {
                    index += 1;
                } else {
                    println!("No room left for the {}. Type 'auto' to start over.", name);
                }
                continue;
            }

            let pivot = match ui::parse_coord(rules, &line) {
                Ok(cell) => cell,
                Err(e) => {
                    println!("Invalid coordinate: {}", e);
                    continue;
                }
            };
            let footprint = pool
                .footprint(rules, id)
                .ok_or(PlacementError::UnknownShip(id))?;
            if grid.try_place(id, footprint, pivot) {
                println!("{} placed at {}", name, ui::coord_to_string(rules, pivot));
                index += 1;
            } else {
                println!("The {} does not fit at {}: off the board or touching another ship.", name, line);
            }
        }

        println!("\nAll ships placed.");
        self.fleet = Some(grid.clone());
        Ok(grid)
    }

    fn select_volley(&mut self, rng: &mut SmallRng, view: &PlayerView) -> Vec<Cell> {
        let rules = view.rules();
        let count = rules.shots_per_turn;
        ui::print_player_view(view, self.fleet.as_ref());

        let unshot = view.unshot_mask();
        let density = ai::calc_density(
            rules,
            &unshot,
            &view.known_empty(),
            &view.opponent_health_by_type(),
            self.model,
        );
        let suggestion = ai::select_shots(rules, &density, &unshot, rng);
        let suggested: Vec<String> = suggestion
            .iter()
            .map(|c| ui::coord_to_string(rules, *c))
            .collect();

        loop {
            let Some(line) = prompt(&format!(
                "\nEnter {} target(s) [suggested: {}] ('map' for hit density): ",
                count,
                suggested.join(" ")
            )) else {
                return suggestion;
            };
            if line.is_empty() {
                return suggestion;
            }
            if line.eq_ignore_ascii_case("map") {
                ui::print_density_board(rules, &density);
                continue;
            }

            let parsed: Result<Vec<Cell>, String> = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(|s| ui::parse_coord(rules, s))
                .collect();
            match parsed {
                Ok(cells) if cells.len() == count => {
                    if let Some(c) = cells.iter().find(|c| view.my_shots().is_shot(**c)) {
                        println!("Note: {} was already fired on; that shot is wasted.", ui::coord_to_string(rules, *c));
                    }
                    return cells;
                }
                Ok(cells) => println!("Need exactly {} target(s), got {}.", count, cells.len()),
                Err(e) => println!("Invalid coordinate: {}", e),
            }
        }
    }

    fn wants_rematch(&mut self, view: &PlayerView) -> bool {
        let verdict = if view.winner() == Some(view.me()) {
            "You won!"
        } else {
            "You lost."
        };
        println!("\n{}", verdict);
        matches!(prompt("Play again? [y/N] "), Some(answer) if answer.eq_ignore_ascii_case("y"))
    }

    fn observe(&mut self, event: &MatchEvent, view: &PlayerView) {
        let me = view.me();
        match event {
            MatchEvent::PhaseChanged(Phase::Waiting) => println!("Waiting for an opponent..."),
            MatchEvent::PhaseChanged(Phase::Battle) => println!("\n=== BATTLE ==="),
            MatchEvent::PhaseChanged(Phase::Leave) => println!("The room has closed."),
            MatchEvent::PlayerLeft(s) if *s != me => println!("Your opponent left the match."),
            MatchEvent::TurnOwnerChanged { owner, turn } if *owner != me => {
                println!("Round {}: opponent is firing...", turn);
            }
            MatchEvent::ShotRecorded { shooter, cell, .. } if *shooter != me => {
                let hit = self
                    .fleet
                    .as_ref()
                    .and_then(|g| g.ship_at(*cell))
                    .is_some();
                println!(
                    "Enemy fires at {}: {}",
                    ui::coord_to_string(view.rules(), *cell),
                    if hit { "HIT" } else { "miss" }
                );
            }
            MatchEvent::DamageRecorded { target, turn, .. } if *target != me => {
                println!("Round {}: your volley scored a hit.", turn);
            }
            _ => {}
        }
    }
}
