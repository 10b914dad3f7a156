use crate::chess::generate::Destinations;
use crate::chess::{arbiter, Castles, Color, Move, Position, Promotion, Rank, Role, Square};
use crate::game::{GameRecord, Mode, Recorder, Score, ScorePolicy, Status};
use chrono::Utc;
use derive_more::{Display, Error};
use std::fmt::{self, Debug, Formatter};
use tracing::{info, instrument};

/// The reason why a game command was rejected.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum GameError {
    #[display("the game is over and accepts no further commands")]
    GameIsTerminal,

    #[display("the promotion on {_0} must be resolved first")]
    PromotionPending(#[error(not(source))] Square),

    #[display("no promotion is pending")]
    NoPromotionPending,

    #[display("the move `{_0}` is illegal in this position")]
    IllegalMove(#[error(not(source))] Move),

    #[display("it is not the {_0} player's turn")]
    OutOfTurn(#[error(not(source))] Color),

    #[display("a pawn cannot promote to that")]
    InvalidPromotionChoice,

    #[display("there is no earlier position to rewind to")]
    NoHistoryToTakeBack,
}

/// A game of chess between two players.
///
/// The [`Game`] owns everything the rules arbiter is stateless about: the
/// side to move, the castling rights, the en passant target square, the
/// position history, and the running score. Commands either transition the
/// state machine and return the new [`Status`], or leave the game untouched
/// and return a [`GameError`].
pub struct Game {
    mode: Mode,
    history: Vec<Position>,
    moves: Vec<Move>,
    turn: Color,
    castles: Castles,
    en_passant: Option<Square>,
    setup_en_passant: Option<Square>,
    pending: Option<Square>,
    status: Status,
    score: Score,
    recorder: Option<Box<dyn Recorder>>,
    version: u64,
}

impl Game {
    /// A fresh game from the standard starting position.
    pub fn new(mode: Mode) -> Self {
        Game {
            mode,
            history: vec![Position::default()],
            moves: Vec::new(),
            turn: Color::White,
            castles: Castles::all(),
            en_passant: None,
            setup_en_passant: None,
            pending: None,
            status: Status::Ongoing,
            score: Score::default(),
            recorder: None,
            version: 0,
        }
    }

    /// A game continued from an arbitrary setup.
    ///
    /// The position is classified immediately, but no points are awarded
    /// for an outcome that predates the first move.
    pub fn from_setup(
        pos: Position,
        turn: Color,
        castles: Castles,
        en_passant: Option<Square>,
        mode: Mode,
    ) -> Self {
        let status = match arbiter::classify(&pos, turn, castles, en_passant) {
            Some(outcome) => Status::Over(outcome),
            None => Status::Ongoing,
        };

        Game {
            mode,
            history: vec![pos],
            moves: Vec::new(),
            turn,
            castles,
            en_passant,
            setup_en_passant: en_passant,
            pending: None,
            status,
            score: Score::default(),
            recorder: None,
            version: 0,
        }
    }

    /// Attaches a sink that receives a [`GameRecord`] whenever a game ends.
    pub fn with_recorder(mut self, recorder: Box<dyn Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// The current position.
    pub fn position(&self) -> &Position {
        self.history
            .last()
            .expect("the history always contains at least the initial position")
    }

    /// Every position reached so far, oldest first.
    pub fn history(&self) -> &[Position] {
        &self.history
    }

    /// Every move played so far.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// The move log rendered with the moving piece's letter, e.g. `pe2e4`.
    pub fn notation(&self) -> Vec<String> {
        self.moves
            .iter()
            .zip(&self.history)
            .map(|(m, before)| match before.role_on(m.whence()) {
                Some(role) => format!("{role}{m}"),
                None => m.to_string(),
            })
            .collect()
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// The remaining castling rights.
    pub fn castles(&self) -> Castles {
        self.castles
    }

    /// The en passant target square, if the last move was a double push.
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    /// The square of the pawn awaiting its promotion choice, if any.
    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending
    }

    /// A counter that increments on every state transition.
    ///
    /// Callers that schedule work against a snapshot of the game, such as a
    /// delayed computer reply, can compare versions to detect that the game
    /// has moved on and the work is stale.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The legal destinations of the piece on a square.
    ///
    /// Empty unless the game is ongoing and the square holds a piece of the
    /// side to move.
    pub fn legal_destinations(&self, whence: Square) -> Destinations {
        if self.status != Status::Ongoing || self.position().color_on(whence) != Some(self.turn) {
            return Destinations::new();
        }

        arbiter::legal_from(self.position(), whence, self.castles, self.en_passant)
    }

    /// Every legal move for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.status != Status::Ongoing {
            return Vec::new();
        }

        arbiter::legal_moves(self.position(), self.turn, self.castles, self.en_passant)
    }

    /// Plays a move for the side to move.
    ///
    /// A pawn reaching the last rank without a [`Promotion`] specifier parks
    /// there, and the turn does not pass until [`promote`][Self::promote]
    /// resolves the choice.
    #[instrument(level = "debug", skip(self), err)]
    pub fn submit(&mut self, m: Move) -> Result<Status, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameIsTerminal);
        }

        if let Some(sq) = self.pending {
            return Err(GameError::PromotionPending(sq));
        }

        let pos = self.position().clone();

        let Some(piece) = pos.piece_on(m.whence()) else {
            return Err(GameError::IllegalMove(m));
        };

        if piece.color() != self.turn {
            return Err(GameError::OutOfTurn(piece.color()));
        }

        let legal = arbiter::legal_from(&pos, m.whence(), self.castles, self.en_passant);

        if !legal.contains(&m.whither()) {
            return Err(GameError::IllegalMove(m));
        }

        // an extraneous specifier on a move that promotes nothing is dropped
        let m = match piece.role() {
            Role::Pawn if m.whither().rank() == Rank::last(self.turn) => m,
            _ => Move(m.whence(), m.whither(), Promotion::None),
        };

        let parked = piece.role() == Role::Pawn
            && m.whither().rank() == Rank::last(self.turn)
            && m.promotion() == Promotion::None;

        self.castles = arbiter::rights_after(self.castles, m);
        self.en_passant = arbiter::en_passant_after(&pos, m);
        self.history.push(arbiter::perform_move(&pos, m));
        self.moves.push(m);
        self.version += 1;

        if parked {
            self.pending = Some(m.whither());
            self.status = Status::AwaitingPromotion;
        } else {
            self.turn = !self.turn;
            self.conclude();
        }

        Ok(self.status)
    }

    /// Resolves a pending promotion with the chosen piece.
    #[instrument(level = "debug", skip(self), err)]
    pub fn promote(&mut self, choice: Promotion) -> Result<Status, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameIsTerminal);
        }

        let Some(sq) = self.pending else {
            return Err(GameError::NoPromotionPending);
        };

        let Some(role) = choice.role() else {
            return Err(GameError::InvalidPromotionChoice);
        };

        let crowned = arbiter::promote(self.position(), sq, role);

        *self
            .history
            .last_mut()
            .expect("the history always contains at least the initial position") = crowned;

        // reflect the choice in the move log
        if let Some(m) = self.moves.last_mut() {
            *m = Move(m.whence(), m.whither(), choice);
        }

        self.pending = None;
        self.turn = !self.turn;
        self.version += 1;
        self.conclude();

        Ok(self.status)
    }

    /// Rewinds the last half-move.
    ///
    /// The en passant target square is recomputed from the move log, but
    /// castling rights are not restored, taking back a move that forfeited
    /// a right forfeits it for good. Points already awarded for a finished
    /// game stay on the scoreboard even though the outcome is rewound.
    #[instrument(level = "debug", skip(self), err)]
    pub fn take_back(&mut self) -> Result<Status, GameError> {
        if self.history.len() <= 1 {
            return Err(GameError::NoHistoryToTakeBack);
        }

        self.history.pop();
        self.moves.pop();

        // the target is derivable from the move log, unlike the rights
        self.en_passant = match self.moves.last() {
            None => self.setup_en_passant,
            Some(&m) => {
                arbiter::en_passant_after(&self.history[self.history.len() - 2], m)
            }
        };

        // a parked pawn never passed the turn, so there is nothing to toggle
        if self.pending.take().is_none() {
            self.turn = !self.turn;
        }

        self.version += 1;

        self.status = match arbiter::classify(
            self.position(),
            self.turn,
            self.castles,
            self.en_passant,
        ) {
            Some(outcome) => Status::Over(outcome),
            None => Status::Ongoing,
        };

        Ok(self.status)
    }

    /// Starts a new game, optionally carrying the running score over.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self, mode: Mode, scores: ScorePolicy) {
        self.mode = mode;
        self.history = vec![Position::default()];
        self.moves.clear();
        self.turn = Color::White;
        self.castles = Castles::all();
        self.en_passant = None;
        self.setup_en_passant = None;
        self.pending = None;
        self.status = Status::Ongoing;
        self.version += 1;

        if scores == ScorePolicy::Zero {
            self.score = Score::default();
        }
    }

    fn conclude(&mut self) {
        match arbiter::classify(self.position(), self.turn, self.castles, self.en_passant) {
            None => self.status = Status::Ongoing,

            Some(outcome) => {
                self.status = Status::Over(outcome);
                self.score.award(outcome);

                info!(%outcome, score = ?self.score, "game over");

                let record = GameRecord {
                    mode: self.mode,
                    winner: outcome.winner(),
                    white_points: self.score.get(Color::White),
                    black_points: self.score.get(Color::Black),
                    timestamp: Utc::now(),
                };

                if let Some(recorder) = self.recorder.as_mut() {
                    recorder.record(&record);
                }
            }
        }
    }
}

impl Debug for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("mode", &self.mode)
            .field("position", self.position())
            .field("turn", &self.turn)
            .field("castles", &self.castles)
            .field("en_passant", &self.en_passant)
            .field("pending", &self.pending)
            .field("status", &self.status)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::Outcome;
    use crate::game::MockRecorder;
    use proptest::prelude::*;
    use proptest::sample::Selector;
    use test_strategy::proptest;

    /// The arbitrary strategy never attaches a recorder, so clones drop it.
    impl Clone for Game {
        fn clone(&self) -> Self {
            Game {
                mode: self.mode,
                history: self.history.clone(),
                moves: self.moves.clone(),
                turn: self.turn,
                castles: self.castles,
                en_passant: self.en_passant,
                setup_en_passant: self.setup_en_passant,
                pending: self.pending,
                status: self.status,
                score: self.score,
                recorder: None,
                version: self.version,
            }
        }
    }

    impl Arbitrary for Game {
        type Parameters = ();
        type Strategy = BoxedStrategy<Game>;

        /// Games in random reachable states, promotions resolved to queens.
        fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
            (any::<Mode>(), 0..80usize, any::<Selector>())
                .prop_map(|(mode, plies, selector)| {
                    let mut game = Game::new(mode);

                    for _ in 0..plies {
                        if game.status() != Status::Ongoing {
                            break;
                        }

                        let Some(m) = selector.try_select(game.legal_moves()) else {
                            break;
                        };

                        if game.submit(m) == Ok(Status::AwaitingPromotion) {
                            let _ = game.promote(Promotion::Queen);
                        }
                    }

                    game
                })
                .boxed()
        }
    }

    fn fools_mate(game: &mut Game) {
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            game.submit(m.parse().unwrap()).unwrap();
        }
    }

    #[test]
    fn a_fresh_game_starts_from_the_standard_position() {
        let game = Game::new(Mode::PvP);

        assert_eq!(game.position(), &Position::default());
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.status(), Status::Ongoing);
        assert_eq!(game.castles(), Castles::all());
        assert_eq!(game.moves(), &[]);
    }

    #[proptest]
    fn submitting_a_plain_move_passes_the_turn(
        #[filter(#game.status() == Status::Ongoing)] mut game: Game,
        selector: Selector,
    ) {
        let turn = game.turn();
        let m = selector.select(game.legal_moves());

        if game.submit(m)? == Status::AwaitingPromotion {
            assert_eq!(game.turn(), turn);
        } else {
            assert_eq!(game.turn(), !turn);
        }
    }

    #[proptest]
    fn the_king_is_never_left_in_check_after_a_move(
        #[filter(#game.status() == Status::Ongoing)] mut game: Game,
        selector: Selector,
    ) {
        let turn = game.turn();
        let m = selector.select(game.legal_moves());
        game.submit(m)?;

        assert!(!arbiter::in_check(game.position(), turn));
    }

    #[proptest]
    fn a_rejected_submission_leaves_the_game_untouched(
        mut game: Game,
        #[filter(#m.promotion() == Promotion::None && !#game.legal_moves().contains(&#m))] m: Move,
    ) {
        let position = game.position().clone();
        let turn = game.turn();
        let status = game.status();
        let version = game.version();

        assert!(game.submit(m).is_err());

        assert_eq!(game.position(), &position);
        assert_eq!(game.turn(), turn);
        assert_eq!(game.status(), status);
        assert_eq!(game.version(), version);
    }

    #[proptest]
    fn every_transition_bumps_the_version(
        #[filter(#game.status() == Status::Ongoing)] mut game: Game,
        selector: Selector,
    ) {
        let version = game.version();
        let m = selector.select(game.legal_moves());
        game.submit(m)?;

        assert_eq!(game.version(), version + 1);
    }

    #[proptest]
    fn taking_back_a_move_restores_the_previous_position(
        #[filter(#game.status() == Status::Ongoing)] mut game: Game,
        selector: Selector,
    ) {
        let position = game.position().clone();
        let turn = game.turn();
        let plies = game.moves().len();

        let m = selector.select(game.legal_moves());

        if game.submit(m)? != Status::AwaitingPromotion {
            game.take_back()?;

            assert_eq!(game.position(), &position);
            assert_eq!(game.history().last(), Some(&position));
            assert_eq!(game.turn(), turn);
            assert_eq!(game.moves().len(), plies);
        }
    }

    #[proptest]
    fn taking_back_a_move_recomputes_the_en_passant_target(
        #[filter(#game.status() == Status::Ongoing)] mut game: Game,
        selector: Selector,
    ) {
        let ep = game.en_passant_square();
        let m = selector.select(game.legal_moves());

        if game.submit(m)? != Status::AwaitingPromotion {
            game.take_back()?;
            assert_eq!(game.en_passant_square(), ep);
        }
    }

    #[test]
    fn moving_out_of_turn_is_rejected() {
        let mut game = Game::new(Mode::PvP);

        assert_eq!(
            game.submit("e7e5".parse().unwrap()),
            Err(GameError::OutOfTurn(Color::Black))
        );
    }

    #[test]
    fn moving_from_an_empty_square_is_rejected() {
        let mut game = Game::new(Mode::PvP);
        let m = "e4e5".parse().unwrap();

        assert_eq!(game.submit(m), Err(GameError::IllegalMove(m)));
    }

    #[test]
    fn checkmate_ends_the_game_and_awards_the_winner() {
        let mut game = Game::new(Mode::PvP);
        fools_mate(&mut game);

        assert_eq!(game.status(), Status::Over(Outcome::Checkmate(Color::Black)));
        assert_eq!(game.score().get(Color::Black), 3);
        assert_eq!(game.score().get(Color::White), 0);
        assert_eq!(game.legal_moves(), vec![]);

        assert_eq!(
            game.submit("a2a3".parse().unwrap()),
            Err(GameError::GameIsTerminal)
        );
    }

    #[test]
    fn the_recorder_is_notified_exactly_once_per_finished_game() {
        let mut recorder = MockRecorder::new();

        recorder
            .expect_record()
            .withf(|r| r.winner == Some(Color::Black) && r.black_points == 3)
            .once()
            .return_const(());

        let mut game = Game::new(Mode::PvP).with_recorder(Box::new(recorder));
        fools_mate(&mut game);

        assert!(game.status().is_terminal());
    }

    #[test]
    fn a_stalemate_setup_is_terminal_but_awards_no_points() {
        let pos = "k7/P7/1K6/8/8/8/8/8".parse().unwrap();
        let game = Game::from_setup(pos, Color::Black, Castles::none(), None, Mode::PvP);

        assert_eq!(game.status(), Status::Over(Outcome::Stalemate));
        assert_eq!(game.score(), Score::default());
    }

    #[test]
    fn promotion_is_a_two_step_transition() {
        let pos = "4k3/1P6/8/8/8/8/8/4K2R".parse().unwrap();
        let mut game = Game::from_setup(pos, Color::White, Castles::none(), None, Mode::PvP);

        assert_eq!(
            game.submit("b7b8".parse().unwrap()),
            Ok(Status::AwaitingPromotion)
        );

        // the turn has not passed yet
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.pending_promotion(), Some(Square::B8));

        assert_eq!(
            game.submit("h1h2".parse().unwrap()),
            Err(GameError::PromotionPending(Square::B8))
        );

        assert_eq!(
            game.promote(Promotion::None),
            Err(GameError::InvalidPromotionChoice)
        );

        assert_eq!(game.promote(Promotion::Knight), Ok(Status::Ongoing));
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.position().role_on(Square::B8), Some(Role::Knight));
        assert_eq!(game.moves().last().map(Move::promotion), Some(Promotion::Knight));
    }

    #[test]
    fn a_move_with_an_explicit_specifier_promotes_in_one_step() {
        let pos = "4k3/1P6/8/8/8/8/8/4K3".parse().unwrap();
        let mut game = Game::from_setup(pos, Color::White, Castles::none(), None, Mode::PvP);

        game.submit("b7b8q".parse().unwrap()).unwrap();

        assert_eq!(game.position().role_on(Square::B8), Some(Role::Queen));
        assert_eq!(game.pending_promotion(), None);
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn promoting_without_a_parked_pawn_is_rejected() {
        let mut game = Game::new(Mode::PvP);

        assert_eq!(
            game.promote(Promotion::Queen),
            Err(GameError::NoPromotionPending)
        );
    }

    #[test]
    fn taking_back_a_parked_pawn_returns_the_turn_to_the_mover() {
        let pos = "4k3/1P6/8/8/8/8/8/4K3".parse().unwrap();
        let mut game = Game::from_setup(pos, Color::White, Castles::none(), None, Mode::PvP);

        game.submit("b7b8".parse().unwrap()).unwrap();
        game.take_back().unwrap();

        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.status(), Status::Ongoing);
        assert_eq!(game.pending_promotion(), None);
        assert_eq!(game.position().role_on(Square::B7), Some(Role::Pawn));
    }

    #[test]
    fn taking_back_to_the_setup_restores_its_en_passant_target() {
        let pos = "4k3/8/8/3pP3/8/8/8/4K3".parse().unwrap();

        let mut game =
            Game::from_setup(pos, Color::White, Castles::none(), Some(Square::D6), Mode::PvP);

        game.submit("e5e6".parse().unwrap()).unwrap();
        game.take_back().unwrap();

        assert_eq!(game.en_passant_square(), Some(Square::D6));
        assert!(game.legal_destinations(Square::E5).contains(&Square::D6));
    }

    #[test]
    fn an_extraneous_promotion_specifier_is_dropped_from_the_log() {
        let mut game = Game::new(Mode::PvP);
        game.submit("e2e4q".parse().unwrap()).unwrap();

        assert_eq!(game.moves(), ["e2e4".parse::<Move>().unwrap()]);
        assert_eq!(game.notation(), vec!["pe2e4"]);
    }

    #[test]
    fn there_is_nothing_to_take_back_at_the_start() {
        let mut game = Game::new(Mode::PvP);
        assert_eq!(game.take_back(), Err(GameError::NoHistoryToTakeBack));
    }

    #[test]
    fn taking_back_a_checkmate_reopens_the_game_but_keeps_the_points() {
        let mut game = Game::new(Mode::PvP);
        fools_mate(&mut game);

        assert_eq!(game.take_back(), Ok(Status::Ongoing));
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.score().get(Color::Black), 3);
    }

    #[test]
    fn castling_rights_are_not_restored_by_take_back() {
        let mut game = Game::new(Mode::PvP);

        for m in ["e2e4", "e7e5", "e1e2", "a7a6"] {
            game.submit(m.parse().unwrap()).unwrap();
        }

        game.take_back().unwrap();
        game.take_back().unwrap();

        assert!(!game.castles().has_short(Color::White));
        assert!(!game.castles().has_long(Color::White));
        assert!(game.castles().has_short(Color::Black));
    }

    #[test]
    fn reset_starts_over_and_the_score_policy_decides_the_points() {
        let mut game = Game::new(Mode::PvP);
        fools_mate(&mut game);

        game.reset(Mode::PvC, ScorePolicy::Keep);
        assert_eq!(game.status(), Status::Ongoing);
        assert_eq!(game.mode(), Mode::PvC);
        assert_eq!(game.position(), &Position::default());
        assert_eq!(game.score().get(Color::Black), 3);

        game.reset(Mode::PvP, ScorePolicy::Zero);
        assert_eq!(game.score(), Score::default());
    }

    #[test]
    fn the_notation_log_prefixes_each_move_with_its_piece() {
        let mut game = Game::new(Mode::PvP);

        for m in ["e2e4", "g8f6"] {
            game.submit(m.parse().unwrap()).unwrap();
        }

        assert_eq!(game.notation(), vec!["pe2e4", "ng8f6"]);
    }

    #[proptest]
    fn legal_destinations_are_empty_for_the_idle_side(game: Game, sq: Square) {
        if game.position().color_on(sq) != Some(game.turn()) {
            assert_eq!(game.legal_destinations(sq), Destinations::new());
        }
    }
}
