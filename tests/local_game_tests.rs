use broadside::{
    AiPlayer, Cell, LocalMatch, MatchEvent, NullSink, Phase, PlacementError, PlacementGrid, Player, PlayerView,
    Rules, SessionId, TargetingModel,
};
use rand::{rngs::SmallRng, SeedableRng};

fn ai_pair(model: TargetingModel, rematches: u32) -> [Box<dyn Player>; 2] {
    [
        Box::new(AiPlayer::with_model(model).with_rematches(rematches)),
        Box::new(AiPlayer::with_model(model).with_rematches(rematches)),
    ]
}

/// Never manages to lay out a fleet.
struct Clumsy;

impl Player for Clumsy {
    fn place_fleet(&mut self, _rng: &mut SmallRng, _rules: &Rules) -> Result<PlacementGrid, PlacementError> {
        Err(PlacementError::Impossible)
    }

    fn select_volley(&mut self, _rng: &mut SmallRng, _view: &PlayerView) -> Vec<Cell> {
        Vec::new()
    }
}

#[test]
fn ai_match_runs_to_completion() {
    let rng = SmallRng::seed_from_u64(42);
    let mut local = LocalMatch::new(
        Rules::standard(),
        ai_pair(TargetingModel::FootprintFit, 0),
        Vec::<MatchEvent>::new(),
        rng,
    )
    .unwrap();
    let outcome = local.run();

    assert_eq!(outcome.phase, Phase::Leave);
    assert_eq!(outcome.winners.len(), 1);
    let winner = outcome.winners[0];
    assert!(local.sessions().contains(&winner));

    let game = local.game();
    let loser = game.opponent_of(winner).unwrap();
    assert_eq!(game.health(loser), Some(0));
    assert!(game.health(winner).unwrap() > 0);
    assert_eq!(outcome.rounds, game.turn());
    assert!(outcome.rounds <= 27);

    let events = local.into_sink();
    assert_eq!(events[0], MatchEvent::PlayerJoined(SessionId(1)));
    assert_eq!(
        events.iter().filter(|e| matches!(e, MatchEvent::MatchResult { .. })).count(),
        1
    );
    assert_eq!(events.last(), Some(&MatchEvent::PhaseChanged(Phase::Leave)));
}

#[test]
fn same_seed_same_match() {
    let run = |seed| {
        let mut local = LocalMatch::new(
            Rules::standard(),
            ai_pair(TargetingModel::FootprintFit, 0),
            Vec::<MatchEvent>::new(),
            SmallRng::seed_from_u64(seed),
        )
        .unwrap();
        local.run();
        local.into_sink()
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn rematch_budget_bounds_the_session() {
    let mut local = LocalMatch::new(
        Rules::standard(),
        ai_pair(TargetingModel::UncheckedCells, 2),
        NullSink,
        SmallRng::seed_from_u64(3),
    )
    .unwrap();
    let outcome = local.run();
    assert_eq!(outcome.winners.len(), 3);
    assert_eq!(outcome.phase, Phase::Leave);
}

#[test]
fn failed_placement_leaves_the_room() {
    let players: [Box<dyn Player>; 2] = [Box::new(AiPlayer::new()), Box::new(Clumsy)];
    let mut local = LocalMatch::new(Rules::standard(), players, Vec::<MatchEvent>::new(), SmallRng::seed_from_u64(1)).unwrap();
    let outcome = local.run();

    assert!(outcome.winners.is_empty());
    assert_eq!(outcome.phase, Phase::Waiting);
    assert!(local
        .sink()
        .contains(&MatchEvent::PlayerLeft(SessionId(2))));
    assert_eq!(local.game().sessions().collect::<Vec<_>>(), vec![SessionId(1)]);
}

#[test]
fn mixed_models_always_produce_a_winner() {
    for seed in 0..8 {
        let players: [Box<dyn Player>; 2] = [
            Box::new(AiPlayer::with_model(TargetingModel::FootprintFit)),
            Box::new(AiPlayer::with_model(TargetingModel::UncheckedCells)),
        ];
        let mut local = LocalMatch::new(Rules::standard(), players, NullSink, SmallRng::seed_from_u64(seed)).unwrap();
        let outcome = local.run();
        assert_eq!(outcome.winners.len(), 1, "seed {}", seed);
        assert_eq!(local.game().winner(), outcome.winners.first().copied());
    }
}
