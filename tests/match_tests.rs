use broadside::{
    auto_place_with_retries, Cell, Command, Match, MatchEvent, Offset, Phase, Rejection, Rules, SessionId,
    ShipId, ShipType, SnapshotError, MAX_PLACEMENT_ATTEMPTS,
};
use rand::{rngs::SmallRng, SeedableRng};

const A: SessionId = SessionId(1);
const B: SessionId = SessionId(2);

fn fleet(rules: &Rules, seed: u64) -> Vec<Option<ShipId>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    auto_place_with_retries(rules, &mut rng, MAX_PLACEMENT_ATTEMPTS)
        .unwrap()
        .into_cells()
}

fn in_battle(rules: Rules) -> Match {
    let a = fleet(&rules, 1);
    let b = fleet(&rules, 2);
    let mut game = Match::new(rules).unwrap();
    game.try_apply(A, Command::Join).unwrap();
    game.try_apply(B, Command::Join).unwrap();
    game.try_apply(A, Command::SubmitPlacement(a)).unwrap();
    game.try_apply(B, Command::SubmitPlacement(b)).unwrap();
    game
}

/// 3x3 board, one single-cell ship each, two shots per volley.
fn duel_rules() -> Rules {
    Rules {
        width: 3,
        height: 3,
        shots_per_turn: 2,
        ships: vec![ShipType::new("Dot", &[Offset::new(0, 0)], 1, 0)],
    }
}

fn duel(a_ship: Cell, b_ship: Cell) -> Match {
    let mut a = vec![None; 9];
    a[a_ship] = Some(0);
    let mut b = vec![None; 9];
    b[b_ship] = Some(0);
    let mut game = Match::new(duel_rules()).unwrap();
    game.try_apply(A, Command::Join).unwrap();
    game.try_apply(B, Command::Join).unwrap();
    game.try_apply(A, Command::SubmitPlacement(a)).unwrap();
    game.try_apply(B, Command::SubmitPlacement(b)).unwrap();
    game
}

fn empty_cells(game: &Match, owner: SessionId) -> Vec<Cell> {
    let grid = game.placement(owner).unwrap();
    (0..game.rules().cell_count())
        .filter(|c| grid.ship_at(*c).is_none())
        .collect()
}

/// Let whoever owns the turn fire at the lowest unshot cells until someone wins.
fn play_out(game: &mut Match) -> SessionId {
    while game.phase() == Phase::Battle {
        let shooter = game.turn_owner().unwrap();
        let volley: Vec<Cell> = game
            .shot_record(shooter)
            .unwrap()
            .unshot()
            .take(game.rules().shots_per_turn)
            .collect();
        game.try_apply(shooter, Command::SubmitTurn(volley)).unwrap();
    }
    game.winner().unwrap()
}

#[test]
fn both_placements_start_the_battle() {
    let rules = Rules::standard();
    let a = fleet(&rules, 1);
    let b = fleet(&rules, 2);
    let mut game = Match::new(rules).unwrap();

    assert_eq!(game.try_apply(A, Command::Join), Ok(vec![MatchEvent::PlayerJoined(A)]));
    assert_eq!(game.phase(), Phase::Waiting);
    assert_eq!(
        game.try_apply(B, Command::Join),
        Ok(vec![MatchEvent::PlayerJoined(B), MatchEvent::PhaseChanged(Phase::Placing)])
    );
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(a)),
        Ok(vec![MatchEvent::PlacementSubmitted(A)])
    );
    assert_eq!(game.phase(), Phase::Placing);
    assert_eq!(
        game.try_apply(B, Command::SubmitPlacement(b)),
        Ok(vec![
            MatchEvent::PlacementSubmitted(B),
            MatchEvent::PhaseChanged(Phase::Battle),
            MatchEvent::TurnOwnerChanged { owner: A, turn: 1 },
        ])
    );

    assert_eq!(game.phase(), Phase::Battle);
    assert_eq!(game.health(A), Some(19));
    assert_eq!(game.health(B), Some(19));
    assert_eq!(game.turn(), 1);
    assert_eq!(game.turn_owner(), Some(A));
}

#[test]
fn flagship_hit_marks_first_slot() {
    let mut game = in_battle(Rules::standard());
    let flagship_cell = game
        .placement(B)
        .unwrap()
        .cells()
        .iter()
        .position(|c| *c == Some(0))
        .unwrap();
    let water = empty_cells(&game, B);
    let volley = vec![water[0], flagship_cell, water[1]];

    let events = game.try_apply(A, Command::SubmitTurn(volley)).unwrap();
    assert_eq!(
        events,
        vec![
            MatchEvent::ShotRecorded { shooter: A, cell: water[0], turn: 1 },
            MatchEvent::ShotRecorded { shooter: A, cell: flagship_cell, turn: 1 },
            MatchEvent::DamageRecorded { target: B, slot: 0, turn: 1 },
            MatchEvent::ShotRecorded { shooter: A, cell: water[1], turn: 1 },
            MatchEvent::TurnOwnerChanged { owner: B, turn: 1 },
        ]
    );
    assert_eq!(game.damage_track(B).unwrap().slots()[0], Some(1));
    assert_eq!(game.health(B), Some(18));
    assert_eq!(game.health(A), Some(19));

    let flagship = &game.health_by_type(B).unwrap()[0];
    assert_eq!((flagship.intact, flagship.total), (4, 5));
}

#[test]
fn hits_fill_the_type_range_in_order() {
    let mut game = in_battle(Rules::standard());
    let grid = game.placement(B).unwrap().clone();
    let flagship: Vec<Cell> = (0..81).filter(|c| grid.ship_at(*c) == Some(0)).collect();
    let water = empty_cells(&game, A);

    game.try_apply(A, Command::SubmitTurn(vec![flagship[3], flagship[1], flagship[4]]))
        .unwrap();
    game.try_apply(B, Command::SubmitTurn(water[..3].to_vec())).unwrap();

    let slots = game.damage_track(B).unwrap().slots();
    assert_eq!(&slots[0..5], &[Some(1), Some(1), Some(1), None, None]);
}

#[test]
fn turn_counter_advances_per_round() {
    let mut game = in_battle(Rules::standard());
    let water_b = empty_cells(&game, B);
    let water_a = empty_cells(&game, A);

    game.try_apply(A, Command::SubmitTurn(water_b[0..3].to_vec())).unwrap();
    assert_eq!((game.turn(), game.turn_owner()), (1, Some(B)));
    let events = game.try_apply(B, Command::SubmitTurn(water_a[0..3].to_vec())).unwrap();
    assert_eq!(events.last(), Some(&MatchEvent::TurnOwnerChanged { owner: A, turn: 2 }));
    assert_eq!((game.turn(), game.turn_owner()), (2, Some(A)));

    game.try_apply(A, Command::SubmitTurn(water_b[3..6].to_vec())).unwrap();
    assert_eq!(game.turn(), 2);
    assert_eq!(game.shot_record(A).unwrap().turn_at(water_b[3]), Some(2));
}

#[test]
fn zero_crossing_on_the_last_shot_ends_the_match() {
    let mut game = duel(0, 8);
    let events = game.try_apply(A, Command::SubmitTurn(vec![4, 8])).unwrap();
    assert_eq!(
        events,
        vec![
            MatchEvent::ShotRecorded { shooter: A, cell: 4, turn: 1 },
            MatchEvent::ShotRecorded { shooter: A, cell: 8, turn: 1 },
            MatchEvent::DamageRecorded { target: B, slot: 0, turn: 1 },
            MatchEvent::PhaseChanged(Phase::Result),
            MatchEvent::MatchResult { winner: A },
        ]
    );
    assert_eq!(game.phase(), Phase::Result);
    assert_eq!(game.winner(), Some(A));
    assert_eq!(game.turn_owner(), None);
    assert_eq!(game.health(B), Some(0));
}

#[test]
fn volley_finishes_after_an_early_zero_crossing() {
    let mut game = duel(0, 8);
    let events = game.try_apply(A, Command::SubmitTurn(vec![8, 4])).unwrap();
    assert_eq!(events.len(), 5);
    assert_eq!(events[2], MatchEvent::ShotRecorded { shooter: A, cell: 4, turn: 1 });
    assert_eq!(events[4], MatchEvent::MatchResult { winner: A });
    assert!(game.shot_record(A).unwrap().is_shot(4));
    assert_eq!(game.winner(), Some(A));
}

#[test]
fn second_player_can_win() {
    let mut game = duel(0, 8);
    game.try_apply(A, Command::SubmitTurn(vec![1, 2])).unwrap();
    game.try_apply(B, Command::SubmitTurn(vec![3, 0])).unwrap();
    assert_eq!(game.winner(), Some(B));
    assert_eq!(game.phase(), Phase::Result);
}

#[test]
fn repeated_cells_are_no_ops() {
    let mut game = duel(0, 8);
    game.try_apply(A, Command::SubmitTurn(vec![1, 1])).unwrap();
    assert_eq!(game.shot_record(A).unwrap().shot_count(), 1);
    game.try_apply(B, Command::SubmitTurn(vec![5, 6])).unwrap();

    let events = game.try_apply(A, Command::SubmitTurn(vec![1, 2])).unwrap();
    assert_eq!(
        events,
        vec![
            MatchEvent::ShotRecorded { shooter: A, cell: 2, turn: 2 },
            MatchEvent::TurnOwnerChanged { owner: B, turn: 2 },
        ]
    );
    assert_eq!(game.shot_record(A).unwrap().turn_at(1), Some(1));
}

#[test]
fn invalid_commands_leave_the_match_untouched() {
    let mut game = in_battle(Rules::standard());
    let before = game.snapshot();

    assert_eq!(
        game.try_apply(B, Command::SubmitTurn(vec![0, 1, 2])),
        Err(Rejection::NotYourTurn)
    );
    assert_eq!(
        game.try_apply(A, Command::SubmitTurn(vec![0, 1])),
        Err(Rejection::WrongShotCount { expected: 3, actual: 2 })
    );
    assert_eq!(
        game.try_apply(A, Command::SubmitTurn(vec![0, 1, 81])),
        Err(Rejection::CellOutOfRange(81))
    );
    assert_eq!(
        game.try_apply(SessionId(9), Command::SubmitTurn(vec![0, 1, 2])),
        Err(Rejection::UnknownSession)
    );
    assert_eq!(game.try_apply(SessionId(9), Command::Join), Err(Rejection::RoomFull));
    assert_eq!(game.try_apply(A, Command::Join), Err(Rejection::AlreadyJoined));
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(vec![None; 81])),
        Err(Rejection::WrongPhase(Phase::Battle))
    );
    assert_eq!(
        game.try_apply(A, Command::SubmitRematch(true)),
        Err(Rejection::WrongPhase(Phase::Battle))
    );
    assert!(game.apply(B, Command::SubmitTurn(vec![0, 1, 2])).is_empty());

    assert_eq!(game.snapshot(), before);
}

#[test]
fn malformed_placements_are_ignored() {
    let rules = Rules::standard();
    let good = fleet(&rules, 5);
    let mut game = Match::new(rules).unwrap();
    game.try_apply(A, Command::Join).unwrap();
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(good.clone())),
        Err(Rejection::WrongPhase(Phase::Waiting))
    );
    game.try_apply(B, Command::Join).unwrap();

    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(vec![None; 80])),
        Err(Rejection::MalformedPlacement)
    );
    let mut unknown = good.clone();
    let spare = unknown.iter().position(Option::is_none).unwrap();
    unknown[spare] = Some(42);
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(unknown)),
        Err(Rejection::MalformedPlacement)
    );
    let mut missing = good.clone();
    for c in missing.iter_mut() {
        if *c == Some(8) {
            *c = None;
        }
    }
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(missing)),
        Err(Rejection::MalformedPlacement)
    );

    // right cell count per ship, but the flagship bent out of shape
    let mut bent = good.clone();
    let bow = bent.iter().position(|c| *c == Some(0)).unwrap();
    let free = (0..81).find(|&c| good[c].is_none() && c / 9 != bow / 9).unwrap();
    bent[bow] = None;
    bent[free] = Some(0);
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(bent)),
        Err(Rejection::MalformedPlacement)
    );

    game.try_apply(A, Command::SubmitPlacement(good.clone())).unwrap();
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(good)),
        Err(Rejection::AlreadySubmitted)
    );
    assert_eq!(game.phase(), Phase::Placing);
}

#[test]
fn touching_or_scattered_fleets_are_refused() {
    let two_dots = Rules {
        ships: vec![ShipType::new("Dot", &[Offset::new(0, 0)], 2, 0)],
        ..duel_rules()
    };
    let mut game = Match::new(two_dots).unwrap();
    game.try_apply(A, Command::Join).unwrap();
    game.try_apply(B, Command::Join).unwrap();

    let mut side_by_side = vec![None; 9];
    side_by_side[0] = Some(0);
    side_by_side[1] = Some(1);
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(side_by_side)),
        Err(Rejection::MalformedPlacement)
    );
    let mut diagonal = vec![None; 9];
    diagonal[0] = Some(0);
    diagonal[4] = Some(1);
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(diagonal)),
        Err(Rejection::MalformedPlacement)
    );
    let mut corners = vec![None; 9];
    corners[0] = Some(0);
    corners[8] = Some(1);
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(corners)),
        Ok(vec![MatchEvent::PlacementSubmitted(A)])
    );

    let bar = Rules {
        width: 5,
        height: 5,
        shots_per_turn: 1,
        ships: vec![ShipType::new("Bar", &[Offset::new(0, 0), Offset::new(1, 0)], 1, 0)],
    };
    let mut game = Match::new(bar).unwrap();
    game.try_apply(A, Command::Join).unwrap();
    game.try_apply(B, Command::Join).unwrap();
    let mut scattered = vec![None; 25];
    scattered[0] = Some(0);
    scattered[24] = Some(0);
    assert_eq!(
        game.try_apply(A, Command::SubmitPlacement(scattered)),
        Err(Rejection::MalformedPlacement)
    );
    assert_eq!(game.phase(), Phase::Placing);
    assert!(game.placement(A).is_none());
}

#[test]
fn leaving_mid_battle_returns_to_waiting() {
    let mut game = in_battle(Rules::standard());
    let water = empty_cells(&game, B);
    game.try_apply(A, Command::SubmitTurn(water[..3].to_vec())).unwrap();

    let events = game.try_apply(B, Command::Leave).unwrap();
    assert_eq!(
        events,
        vec![MatchEvent::PlayerLeft(B), MatchEvent::PhaseChanged(Phase::Waiting)]
    );
    assert_eq!(game.phase(), Phase::Waiting);
    assert_eq!(game.sessions().collect::<Vec<_>>(), vec![A]);
    assert_eq!(game.turn_owner(), None);
    assert_eq!(game.shot_record(A).unwrap().shot_count(), 0);
    assert_eq!(game.try_apply(B, Command::Leave), Err(Rejection::UnknownSession));

    let c = SessionId(3);
    let events = game.try_apply(c, Command::Join).unwrap();
    assert_eq!(events.last(), Some(&MatchEvent::PhaseChanged(Phase::Placing)));
    // the newcomer takes the free seat
    assert_eq!(game.seat_of(c), Some(1));
}

#[test]
fn both_accepting_starts_a_rematch() {
    let mut game = in_battle(Rules::standard());
    let winner = play_out(&mut game);
    let loser = game.opponent_of(winner).unwrap();
    assert_eq!(game.health(loser), Some(0));

    assert_eq!(
        game.try_apply(winner, Command::SubmitRematch(true)),
        Ok(vec![MatchEvent::RematchVoted { session: winner, accept: true }])
    );
    assert_eq!(game.phase(), Phase::Result);
    let events = game.try_apply(loser, Command::SubmitRematch(true)).unwrap();
    assert_eq!(events.last(), Some(&MatchEvent::PhaseChanged(Phase::Placing)));

    assert_eq!(game.winner(), None);
    assert_eq!(game.health(loser), Some(19));
    assert_eq!(game.placement(winner), None);
    assert_eq!(game.shot_record(winner).unwrap().shot_count(), 0);
}

#[test]
fn declining_closes_the_room() {
    let mut game = in_battle(Rules::standard());
    let winner = play_out(&mut game);
    let events = game.try_apply(winner, Command::SubmitRematch(false)).unwrap();
    assert_eq!(
        events,
        vec![
            MatchEvent::RematchVoted { session: winner, accept: false },
            MatchEvent::PhaseChanged(Phase::Leave),
        ]
    );
    assert_eq!(game.winner(), Some(winner));
    assert_eq!(game.try_apply(SessionId(5), Command::Join), Err(Rejection::Closed));
    assert_eq!(game.try_apply(winner, Command::SubmitRematch(true)), Err(Rejection::Closed));
}

#[test]
fn invalid_rules_are_refused() {
    let mut rules = Rules::standard();
    rules.ships.clear();
    assert!(Match::new(rules).is_err());
}

#[test]
fn snapshot_restores_an_identical_match() {
    let mut game = in_battle(Rules::standard());
    let water = empty_cells(&game, B);
    game.try_apply(A, Command::SubmitTurn(water[..3].to_vec())).unwrap();

    let snapshot = game.snapshot();
    let mut restored = Match::restore(Rules::standard(), snapshot.clone()).unwrap();
    assert_eq!(restored.snapshot(), snapshot);

    let volley = empty_cells(&game, A)[..3].to_vec();
    assert_eq!(
        game.try_apply(B, Command::SubmitTurn(volley.clone())),
        restored.try_apply(B, Command::SubmitTurn(volley))
    );
    assert_eq!(play_out(&mut game), play_out(&mut restored));
}

#[cfg(feature = "std")]
#[test]
fn snapshot_survives_json() {
    let game = in_battle(Rules::standard());
    let snapshot = game.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: broadside::MatchSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn inconsistent_snapshots_are_refused() {
    let game = in_battle(Rules::standard());

    let mut short = game.snapshot();
    short.players[0].shots.pop();
    assert_eq!(
        Match::restore(Rules::standard(), short).err(),
        Some(SnapshotError::Length { expected: 81, actual: 80 })
    );

    let mut lonely = game.snapshot();
    lonely.players.pop();
    assert_eq!(
        Match::restore(Rules::standard(), lonely).err(),
        Some(SnapshotError::Players)
    );

    let mut stranger = game.snapshot();
    let spare = stranger.players[0]
        .placement
        .as_ref()
        .unwrap()
        .iter()
        .position(Option::is_none)
        .unwrap();
    stranger.players[0].placement.as_mut().unwrap()[spare] = Some(200);
    assert_eq!(
        Match::restore(Rules::standard(), stranger).err(),
        Some(SnapshotError::UnknownShip(200))
    );

    let mut ghost_turn = game.snapshot();
    ghost_turn.turn_owner = Some(SessionId(99));
    assert_eq!(
        Match::restore(Rules::standard(), ghost_turn).err(),
        Some(SnapshotError::UnseatedSession(SessionId(99)))
    );

    let mut unplaced = game.snapshot();
    unplaced.players[1].placement = None;
    assert_eq!(
        Match::restore(Rules::standard(), unplaced).err(),
        Some(SnapshotError::InvalidPlacement(B))
    );

    let mut crowded = game.snapshot();
    let cells = crowded.players[0].placement.as_mut().unwrap();
    let patrol = cells.iter().position(|c| *c == Some(8)).unwrap();
    let bow = cells.iter().position(|c| *c == Some(0)).unwrap();
    cells[patrol] = None;
    // the gap around the flagship is always empty
    cells[if bow / 9 < 8 { bow + 9 } else { bow - 9 }] = Some(8);
    assert_eq!(
        Match::restore(Rules::standard(), crowded).err(),
        Some(SnapshotError::InvalidPlacement(A))
    );

    let mut idle = game.snapshot();
    idle.turn_owner = None;
    assert_eq!(Match::restore(Rules::standard(), idle).err(), Some(SnapshotError::PhaseState));

    let mut early_winner = game.snapshot();
    early_winner.winner = Some(A);
    assert_eq!(
        Match::restore(Rules::standard(), early_winner).err(),
        Some(SnapshotError::PhaseState)
    );

    let mut future = game.snapshot();
    future.players[0].shots[0] = Some(5);
    assert_eq!(
        Match::restore(Rules::standard(), future).err(),
        Some(SnapshotError::FutureTurn(5))
    );
}
