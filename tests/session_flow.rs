use klondike_rules::canonical_decks::{canonical_unplayable_deck, layout_from_columns};
use klondike_rules::deal_code::deal_from_number;
use klondike_rules::{
    AutoSolver, DealConstraints, FinalResult, GameSession, HintRanker, MoveEngine, MoveOrigin,
    MoveSource, PileRole, ScoreTable, SessionConfig, SessionSnapshot, Suit, TableState,
};

fn config() -> SessionConfig {
    SessionConfig {
        constraints: DealConstraints::unconstrained(),
        ..SessionConfig::default()
    }
}

/// Play one move: the hint when there is one, otherwise a draw.
/// Returns false when nothing could be played.
fn play_one(session: &mut GameSession) -> bool {
    match session.hint() {
        Some(hint) => {
            session
                .engine_mut()
                .apply(hint.mv.kind, MoveOrigin::Manual)
                .unwrap();
            true
        }
        None => session.draw().is_ok(),
    }
}

#[test]
fn snapshot_survives_json() {
    let mut session = GameSession::new(config(), 42);
    for _ in 0..12 {
        play_one(&mut session);
    }

    let snapshot = session.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: SessionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);

    let mut other = GameSession::new(config(), 1);
    other.restore(back).unwrap();
    assert_eq!(other.table(), session.table());
    assert_eq!(other.engine().score(), session.engine().score());
    assert_eq!(other.deal_number(), session.deal_number());
    assert!(!other.engine().can_undo());
}

#[test]
fn tampered_snapshot_is_rejected() {
    let session = GameSession::new(config(), 8);
    let snapshot = session.snapshot();

    // Duplicate a card by hand-editing the stock.
    let mut value = serde_json::to_value(&snapshot).unwrap();
    let stock = value["table"]["stock"]["cards"].as_array_mut().unwrap();
    let first = stock[0].clone();
    stock[1] = first;
    let tampered: SessionSnapshot = serde_json::from_value(value).unwrap();

    let mut other = GameSession::new(config(), 9);
    let before = other.snapshot();
    assert!(other.restore(tampered).is_err());
    assert_eq!(other.snapshot(), before);
}

#[test]
fn undo_walks_back_bit_identical() {
    let mut session = GameSession::new(config(), 2024);
    let mut history = vec![(session.table().clone(), session.engine().score())];
    for _ in 0..40 {
        if play_one(&mut session) {
            history.push((session.table().clone(), session.engine().score()));
        }
    }
    assert_eq!(session.engine().undo_len(), history.len() - 1);

    history.pop();
    while let Some((table, board)) = history.pop() {
        assert!(session.undo());
        assert_eq!(session.table(), &table);
        assert_eq!(session.engine().score(), board);
    }
    assert!(!session.engine().can_undo());
}

#[test]
fn deal_number_reproduces_the_deck() {
    let session = GameSession::new(config(), 77);
    let deck = deal_from_number(session.deal_number()).unwrap();
    assert_eq!(&TableState::deal(&deck), session.table());
}

#[test]
fn solver_stays_within_its_bound() {
    for seed in 0..6 {
        let mut session = GameSession::new(config(), seed);
        let result = session.run_auto_complete();
        let max = session.solver().config().max_iterations;
        assert!(session.solver().iterations() <= max);
        assert!(session.solver().state().is_terminal());
        assert!(session.table().validate().is_ok());
        if result == FinalResult::Finished {
            assert!(session.table().is_won());
        }
    }
}

#[test]
fn unplayable_deal_has_no_hint_and_stalls() {
    let table = TableState::deal(&canonical_unplayable_deck());
    assert!(!HintRanker::new().has_any_move(&table));
    assert!(!AutoSolver::is_ready(&table));

    let mut engine = MoveEngine::new(table, ScoreTable::default());
    let mut solver = AutoSolver::default();
    assert_eq!(solver.run_to_completion(&mut engine, 800), FinalResult::Stalled);
    assert_eq!(engine.table().foundation_count(), 0);
}

#[test]
fn manual_moves_on_a_hand_built_table() {
    let layout = layout_from_columns(["-KD AS", "-QC 2S", "", "", "", "", ""]).unwrap();
    let table = layout.build().unwrap();
    let mut engine = MoveEngine::new(table, ScoreTable::standard());

    let source = MoveSource::top(engine.table(), PileRole::Tableau(0));
    let err = engine.try_move(source, PileRole::Tableau(2)).unwrap_err();
    assert!(err.is_invalid_move());

    let source = MoveSource::top(engine.table(), PileRole::Tableau(0));
    let ace = engine
        .try_move(source, PileRole::Foundation(Suit::Spades))
        .unwrap();
    assert_eq!(ace.revealed.map(|c| c.short_str()), Some("KD".to_string()));

    let source = MoveSource::top(engine.table(), PileRole::Tableau(1));
    engine
        .try_move(source, PileRole::Foundation(Suit::Spades))
        .unwrap();
    assert_eq!(engine.score().moves, 2);
    assert_eq!(engine.table().hidden_count(), 0);
}
