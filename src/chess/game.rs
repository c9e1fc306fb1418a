//! The game engine: turn state machine, legal-move filtering via
//! simulate-and-restore, special-move side effects and terminal-state
//! detection.
//!
//! Control flow: the caller selects a source square
//! ([`Game::intend_move`]), reads back the cached legal destinations,
//! selects one ([`Game::make_move`]), and the engine applies every side
//! effect, records history, queues notifications and advances the turn.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use arrayvec::ArrayVec;
use log::debug;
use strum::IntoEnumIterator;

use crate::chess::board::Board;
use crate::chess::core::{
    Color,
    Coordinate,
    Piece,
    PieceId,
    PieceKind,
    PieceState,
    Pieces,
    Player,
    Promotion,
    BOARD_WIDTH,
};
use crate::chess::events::Event;
use crate::chess::movegen;

/// Most destinations a single piece can have: a queen in the middle of an
/// open board reaches 27 squares.
pub const MAX_PIECE_DESTINATIONS: usize = 27;

/// Destinations of a single piece, stack-allocated.
pub type DestinationList = ArrayVec<Coordinate, MAX_PIECE_DESTINATIONS>;

/// Callback consulted when a pawn reaches the far rank; supplied by the
/// caller (e.g. a promotion-choice dialog) at construction.
pub type PromotionChoice = dyn FnMut(Color) -> Promotion;

/// Half-moves without a capture or a pawn move after which the game is drawn.
const FIFTY_MOVE_LIMIT: u32 = 100;

/// The standard back rank, a-file to h-file.
const BACKRANK_LAYOUT: [PieceKind; BOARD_WIDTH as usize] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Where the turn state machine currently stands. [`GameState::Check`]
/// permits further intend/make cycles (the side to move must respond); the
/// remaining tagged states are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    /// Constructed but not started; [`Game::start`] leaves this state.
    Init,
    /// Waiting for the mover to select a source square.
    IntendingMove,
    /// A source square is selected; waiting for a destination.
    MakingMove,
    /// The mover's king is attacked and the mover must respond.
    Check,
    /// Terminal: the named color delivered mate and wins.
    Checkmate(Color),
    /// Terminal: the mover has no legal moves and is not in check.
    Stalemate,
    /// Terminal: one hundred half-moves without a capture or a pawn move.
    FiftyMoveDraw,
    /// Terminal: the named color resigned.
    Resignation(Color),
}

impl GameState {
    /// Whether the game is over and no further moves are accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Checkmate(_) | Self::Stalemate | Self::FiftyMoveDraw | Self::Resignation(_)
        )
    }
}

/// A rejected player action. Always recoverable: the engine resets the
/// pending selection and the caller re-prompts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The call does not fit the current state (e.g. a move attempt after
    /// the game ended, or a destination before a source).
    #[error("action is not valid in the current game state")]
    WrongState,
    /// The selected source square holds no piece.
    #[error("square {0} holds no piece")]
    EmptySquare(Coordinate),
    /// The selected source square holds an opponent's piece.
    #[error("piece on {0} does not belong to the side to move")]
    ForeignPiece(Coordinate),
    /// The destination is not among the cached legal destinations.
    #[error("{0} is not a legal destination for the selected piece")]
    IllegalDestination(Coordinate),
}

/// Single-slot record of the previous move. One slot suffices because en
/// passant eligibility looks back exactly one ply.
// TODO: Supporting undo or deeper history needs an append-only move log with
// en passant eligibility derived from its tail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LastMove {
    /// The piece that moved.
    pub piece: PieceId,
    /// The square it left.
    pub from: Coordinate,
    /// The square it landed on.
    pub to: Coordinate,
}

/// The rules engine for one game of chess between two players.
///
/// Single-threaded and synchronous: every call runs to completion, and
/// legality checks mutate and then fully restore the live board rather than
/// operating on a copy.
pub struct Game {
    players: [Player; 2],
    pieces: Pieces,
    roster: HashMap<Color, Vec<PieceId>>,
    board: Board,
    state: GameState,
    mover: usize,
    selected: Option<Coordinate>,
    selected_destinations: DestinationList,
    legal_moves: HashMap<PieceId, DestinationList>,
    last_move: Option<LastMove>,
    halfmove_clock: u32,
    promotion_choice: Box<PromotionChoice>,
    events: VecDeque<Event>,
}

impl Game {
    /// Creates an engine in [`GameState::Init`] with an empty board. The
    /// promotion callback is consulted whenever a pawn reaches the far rank.
    #[must_use]
    pub fn new(promotion_choice: impl FnMut(Color) -> Promotion + 'static) -> Self {
        Self {
            players: [Player::new(Color::White), Player::new(Color::Black)],
            pieces: Pieces::new(),
            roster: HashMap::new(),
            board: Board::new(),
            state: GameState::Init,
            mover: 0,
            selected: None,
            selected_destinations: DestinationList::new(),
            legal_moves: HashMap::new(),
            last_move: None,
            halfmove_clock: 0,
            promotion_choice: Box::new(promotion_choice),
            events: VecDeque::new(),
        }
    }

    /// Places the standard starting position, registers every piece in its
    /// owner's roster, makes White the first mover and precomputes its
    /// legal-move map. Calling it again restarts from scratch.
    pub fn start(&mut self) {
        self.pieces = Pieces::new();
        self.roster.clear();
        self.board = Board::new();
        self.mover = 0;
        self.selected = None;
        self.selected_destinations.clear();
        self.legal_moves.clear();
        self.last_move = None;
        self.halfmove_clock = 0;
        self.events.clear();
        for color in Color::iter() {
            for (file, kind) in BACKRANK_LAYOUT.iter().enumerate() {
                let _ = self.place_piece(color, *kind, Coordinate::new(file as u8, color.backrank()));
            }
            for file in 0..BOARD_WIDTH {
                let _ =
                    self.place_piece(color, PieceKind::Pawn, Coordinate::new(file, color.pawn_rank()));
            }
        }
        self.classify();
        debug!("game started");
    }

    /// The current state tag.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Read-only board contents.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Every piece created for this game, active and captured alike.
    #[must_use]
    pub const fn pieces(&self) -> &Pieces {
        &self.pieces
    }

    /// Resolves a piece id to the piece.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id]
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn player_to_move(&self) -> &Player {
        &self.players[self.mover]
    }

    /// The precomputed legal-move map for the side to move. An absent or
    /// empty entry means the piece has no legal destinations.
    #[must_use]
    pub const fn legal_moves(&self) -> &HashMap<PieceId, DestinationList> {
        &self.legal_moves
    }

    /// The currently selected source square, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<Coordinate> {
        self.selected
    }

    /// Cached legal destinations of the currently selected piece.
    #[must_use]
    pub fn selected_destinations(&self) -> &[Coordinate] {
        self.selected_destinations.as_slice()
    }

    /// The single-slot last-move record.
    #[must_use]
    pub const fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    /// Half-moves since the last capture or pawn move.
    #[must_use]
    pub const fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Hands out the queued notifications in emission order.
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }

    /// Whether the given color's king is currently attacked. A color with no
    /// active king reads as "not in check", keeping the query total.
    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => movegen::is_attacked(
                &self.board,
                &self.pieces,
                self.pieces[king].coordinate(),
                color.opponent(),
            ),
            None => false,
        }
    }

    /// Selects the piece on `source` and returns its cached legal
    /// destinations. Valid only in [`GameState::IntendingMove`] and
    /// [`GameState::Check`]; an empty or foreign source resets the selection
    /// and fails without touching the game.
    pub fn intend_move(&mut self, source: Coordinate) -> Result<&[Coordinate], ActionError> {
        if !matches!(self.state, GameState::IntendingMove | GameState::Check) {
            return Err(ActionError::WrongState);
        }
        let Some(id) = self.board.piece_at(source) else {
            self.reset_selection();
            return Err(ActionError::EmptySquare(source));
        };
        if self.pieces[id].color() != self.mover_color() {
            self.reset_selection();
            return Err(ActionError::ForeignPiece(source));
        }
        self.selected = Some(source);
        self.selected_destinations = self.legal_moves.get(&id).cloned().unwrap_or_default();
        self.state = GameState::MakingMove;
        Ok(self.selected_destinations.as_slice())
    }

    /// Clears any pending selection and returns to the turn's base state.
    pub fn cancel_move(&mut self) {
        if matches!(
            self.state,
            GameState::IntendingMove | GameState::MakingMove | GameState::Check
        ) {
            self.reset_selection();
        }
    }

    /// Moves the selected piece to `destination`, applying every side effect
    /// (captures, en passant, castling rook relocation, promotion), then
    /// advances the turn and reclassifies the game state. A destination
    /// outside the cached legal set resets the selection and fails.
    pub fn make_move(&mut self, destination: Coordinate) -> Result<(), ActionError> {
        if self.state != GameState::MakingMove {
            return Err(ActionError::WrongState);
        }
        let Some(source) = self.selected else {
            self.reset_selection();
            return Err(ActionError::WrongState);
        };
        if !self.selected_destinations.contains(&destination) {
            self.reset_selection();
            return Err(ActionError::IllegalDestination(destination));
        }
        let Some(id) = self.board.piece_at(source) else {
            self.reset_selection();
            return Err(ActionError::EmptySquare(source));
        };
        let color = self.pieces[id].color();
        let kind = self.pieces[id].kind();

        // Captures and pawn moves reset the fifty-move clock. En passant is
        // a pawn move, so the diagonal-onto-empty case is already covered.
        if self.board.piece_at(destination).is_some() || kind == PieceKind::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        // Special-move side effects, derived from source, destination and
        // piece kind before the piece relocates.
        if kind == PieceKind::Pawn
            && destination.file() != source.file()
            && self.board.piece_at(destination).is_none()
        {
            self.capture_en_passant(source, destination);
        }
        if kind == PieceKind::King && source.file().abs_diff(destination.file()) == 2 {
            self.castle_rook(color, source, destination);
        }
        if let Some(victim) = self.board.piece_at(destination) {
            self.capture(victim);
        }
        if kind == PieceKind::Pawn && destination.rank() == color.promotion_rank() {
            let choice = (self.promotion_choice)(color);
            self.pieces[id].set_kind(choice.into());
            self.events.push_back(Event::PawnPromoted {
                piece: id,
                into: choice.into(),
            });
        }

        // Relocation.
        self.board.put(source, None);
        self.board.put(destination, Some(id));
        self.pieces[id].set_coordinate(destination);
        self.pieces[id].set_moved();

        self.last_move = Some(LastMove {
            piece: id,
            from: source,
            to: destination,
        });
        self.events.push_back(Event::MoveCompleted {
            piece: id,
            from: source,
            to: destination,
        });
        debug!("{color} played {source}{destination}");

        self.next_turn();
        Ok(())
    }

    /// Concedes the game for `color`. Valid at any non-terminal point.
    pub fn resign(&mut self, color: Color) -> Result<(), ActionError> {
        if self.state.is_terminal() {
            return Err(ActionError::WrongState);
        }
        self.state = GameState::Resignation(color);
        self.events.push_back(Event::Resignation(color));
        debug!("{color} resigned");
        Ok(())
    }

    fn mover_color(&self) -> Color {
        self.players[self.mover].color()
    }

    fn place_piece(&mut self, color: Color, kind: PieceKind, at: Coordinate) -> PieceId {
        let id = self.pieces.insert(Piece::new(color, kind, at));
        self.roster.entry(color).or_default().push(id);
        self.board.put(at, Some(id));
        id
    }

    // The base state of a turn is Check while the mover's king is attacked
    // (the tag next_turn computed) and IntendingMove otherwise.
    fn reset_selection(&mut self) {
        self.selected = None;
        self.selected_destinations.clear();
        self.state = if self.is_in_check(self.mover_color()) {
            GameState::Check
        } else {
            GameState::IntendingMove
        };
    }

    fn capture(&mut self, victim: PieceId) {
        let at = self.pieces[victim].coordinate();
        self.board.put(at, None);
        self.pieces[victim].set_state(PieceState::Captured);
        self.events.push_back(Event::PieceCaptured { piece: victim, at });
    }

    // The captured pawn stands beside the destination, on the capturing
    // pawn's source rank.
    fn capture_en_passant(&mut self, source: Coordinate, destination: Coordinate) {
        let at = Coordinate::new(destination.file(), source.rank());
        if let Some(victim) = self.board.piece_at(at) {
            self.capture(victim);
            self.events.push_back(Event::EnPassantPerformed {
                captured: victim,
                at,
            });
        }
    }

    // A king move of exactly two files relocates the same-rank corner rook
    // next to the king, on its far side.
    fn castle_rook(&mut self, color: Color, source: Coordinate, destination: Coordinate) {
        let kingside = destination.file() > source.file();
        let rook_from = Coordinate::new(
            if kingside { BOARD_WIDTH - 1 } else { 0 },
            source.rank(),
        );
        let rook_to = Coordinate::new(
            if kingside {
                destination.file() - 1
            } else {
                destination.file() + 1
            },
            source.rank(),
        );
        if let Some(rook) = self.board.piece_at(rook_from) {
            self.board.put(rook_from, None);
            self.board.put(rook_to, Some(rook));
            self.pieces[rook].set_coordinate(rook_to);
            self.pieces[rook].set_moved();
            self.events.push_back(Event::CastlingPerformed {
                color,
                rook_from,
                rook_to,
            });
        }
    }

    fn next_turn(&mut self) {
        self.mover = (self.mover + 1) % self.players.len();
        self.selected = None;
        self.selected_destinations.clear();
        self.classify();
    }

    // Recomputes the mover's full legal-move map and derives the state tag
    // from it: checkmate and check when the king is attacked, then the
    // fifty-move draw, then stalemate.
    fn classify(&mut self) {
        self.state = GameState::IntendingMove;
        let color = self.mover_color();
        self.compute_legal_moves(color);
        let total: usize = self.legal_moves.values().map(|destinations| destinations.len()).sum();
        let in_check = self.is_in_check(color);
        if in_check && total == 0 {
            let winner = color.opponent();
            self.state = GameState::Checkmate(winner);
            self.events.push_back(Event::Checkmate { winner });
        } else if in_check {
            self.state = GameState::Check;
            self.events.push_back(Event::Check(color));
        } else if self.halfmove_clock >= FIFTY_MOVE_LIMIT {
            self.state = GameState::FiftyMoveDraw;
            self.events.push_back(Event::FiftyMoveDraw);
        } else if total == 0 {
            self.state = GameState::Stalemate;
            self.events.push_back(Event::Stalemate);
        }
        debug!("{color} to move: {total} legal moves, state {:?}", self.state);
    }

    fn compute_legal_moves(&mut self, color: Color) {
        self.legal_moves.clear();
        let ids = self.roster.get(&color).cloned().unwrap_or_default();
        for id in ids {
            if !self.pieces[id].is_active() {
                continue;
            }
            let pseudo =
                movegen::pseudo_legal_destinations(&self.board, &self.pieces, id, self.last_move);
            let mut legal = DestinationList::new();
            for to in pseudo {
                if self.king_safe_after(id, to) {
                    legal.push(to);
                }
            }
            let _ = self.legal_moves.insert(id, legal);
        }
    }

    fn find_king(&self, color: Color) -> Option<PieceId> {
        self.roster.get(&color)?.iter().copied().find(|&id| {
            let piece = &self.pieces[id];
            piece.kind() == PieceKind::King && piece.is_active()
        })
    }

    // Simulates the candidate move on the live board, tests whether the
    // mover's own king ends up attacked, and unconditionally restores every
    // temporary change. Board and arena are identical before and after the
    // call for accepted and rejected candidates alike.
    fn king_safe_after(&mut self, id: PieceId, to: Coordinate) -> bool {
        let color = self.pieces[id].color();
        let from = self.pieces[id].coordinate();
        let kind = self.pieces[id].kind();

        let victim = self.board.piece_at(to).or_else(|| {
            // A diagonal pawn move onto an empty square captures en passant:
            // the victim stands beside the destination, not on it.
            if kind == PieceKind::Pawn && to.file() != from.file() {
                self.board.piece_at(Coordinate::new(to.file(), from.rank()))
            } else {
                None
            }
        });
        let victim_square = victim.map(|v| self.pieces[v].coordinate());

        let castling_rook = if kind == PieceKind::King && from.file().abs_diff(to.file()) == 2 {
            let kingside = to.file() > from.file();
            let rook_from = Coordinate::new(
                if kingside { BOARD_WIDTH - 1 } else { 0 },
                from.rank(),
            );
            let rook_to = Coordinate::new(
                if kingside { to.file() - 1 } else { to.file() + 1 },
                from.rank(),
            );
            self.board
                .piece_at(rook_from)
                .map(|rook| (rook, rook_from, rook_to))
        } else {
            None
        };

        // Apply the hypothetical move.
        self.board.put(from, None);
        if let (Some(victim), Some(at)) = (victim, victim_square) {
            self.board.put(at, None);
            self.pieces[victim].set_state(PieceState::Captured);
        }
        self.board.put(to, Some(id));
        self.pieces[id].set_coordinate(to);
        if let Some((rook, rook_from, rook_to)) = castling_rook {
            self.board.put(rook_from, None);
            self.board.put(rook_to, Some(rook));
            self.pieces[rook].set_coordinate(rook_to);
        }

        let safe = !self.is_in_check(color);

        // Restore, destination first so a re-seated victim can reclaim it.
        if let Some((rook, rook_from, rook_to)) = castling_rook {
            self.board.put(rook_to, None);
            self.board.put(rook_from, Some(rook));
            self.pieces[rook].set_coordinate(rook_from);
        }
        self.board.put(to, None);
        self.board.put(from, Some(id));
        self.pieces[id].set_coordinate(from);
        if let (Some(victim), Some(at)) = (victim, victim_square) {
            self.pieces[victim].set_state(PieceState::Active);
            self.board.put(at, Some(victim));
        }

        safe
    }
}

impl fmt::Display for Game {
    /// Renders the canonical ASCII diagram: ranks 8 to 1, uppercase White.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..BOARD_WIDTH).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..BOARD_WIDTH {
                match self.board.piece_at(Coordinate::new(file, rank)) {
                    Some(id) => write!(f, "{} ", self.pieces[id])?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{} to move", self.mover_color())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    fn coord(square: &str) -> Coordinate {
        Coordinate::try_from(square).unwrap()
    }

    fn started() -> Game {
        let mut game = Game::new(|_| Promotion::Queen);
        game.start();
        game
    }

    // Builds an arbitrary position and classifies it for the given mover.
    fn custom(placements: &[(Color, PieceKind, &str)], mover: Color) -> Game {
        let mut game = Game::new(|_| Promotion::Queen);
        for &(color, kind, at) in placements {
            let _ = game.place_piece(color, kind, coord(at));
        }
        game.mover = match mover {
            Color::White => 0,
            Color::Black => 1,
        };
        game.classify();
        game
    }

    fn play(game: &mut Game, from: &str, to: &str) {
        let _ = game.intend_move(coord(from)).unwrap();
        game.make_move(coord(to)).unwrap();
    }

    #[test]
    fn start_position_summary() {
        let game = started();
        assert_eq!(game.state(), GameState::IntendingMove);
        assert_eq!(game.player_to_move().color(), Color::White);
        assert_eq!(game.pieces().len(), 32);
        let total: usize = game
            .legal_moves()
            .values()
            .map(|destinations| destinations.len())
            .sum();
        assert_eq!(total, 20);
        assert_eq!(
            game.to_string(),
            "8 r n b q k b n r \n\
             7 p p p p p p p p \n\
             6 . . . . . . . . \n\
             5 . . . . . . . . \n\
             4 . . . . . . . . \n\
             3 . . . . . . . . \n\
             2 P P P P P P P P \n\
             1 R N B Q K B N R \n\
             \u{20} a b c d e f g h\nw to move"
        );
    }

    #[test]
    fn legal_move_queries_leave_the_board_untouched() {
        let mut game = started();
        let board_before = game.board.clone();
        let pieces_before = game.pieces.clone();
        game.compute_legal_moves(Color::White);
        assert_eq!(game.board, board_before);
        assert_eq!(game.pieces, pieces_before);
    }

    #[test]
    fn simulation_restores_pins_captures_and_states() {
        // The knight on e4 is pinned against the king by the rook on e8:
        // every candidate gets simulated and rejected, and the position must
        // come back untouched.
        let mut game = custom(
            &[
                (Color::White, PieceKind::King, "e1"),
                (Color::White, PieceKind::Knight, "e4"),
                (Color::Black, PieceKind::King, "h8"),
                (Color::Black, PieceKind::Rook, "e8"),
                (Color::Black, PieceKind::Pawn, "d5"),
            ],
            Color::White,
        );
        let board_before = game.board.clone();
        let pieces_before = game.pieces.clone();
        game.compute_legal_moves(Color::White);
        assert_eq!(game.board, board_before);
        assert_eq!(game.pieces, pieces_before);

        let knight = game.board.piece_at(coord("e4")).unwrap();
        assert!(game.legal_moves()[&knight].is_empty());
    }

    #[test]
    fn intend_rejects_empty_and_foreign_squares() {
        let mut game = started();
        assert_eq!(
            game.intend_move(coord("e4")).unwrap_err(),
            ActionError::EmptySquare(coord("e4"))
        );
        assert_eq!(game.state(), GameState::IntendingMove);
        assert_eq!(
            game.intend_move(coord("e7")).unwrap_err(),
            ActionError::ForeignPiece(coord("e7"))
        );
        assert_eq!(game.state(), GameState::IntendingMove);
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn intend_is_rejected_while_a_selection_is_pending() {
        let mut game = started();
        let _ = game.intend_move(coord("e2")).unwrap();
        assert_eq!(game.state(), GameState::MakingMove);
        assert_eq!(
            game.intend_move(coord("d2")).unwrap_err(),
            ActionError::WrongState
        );
        game.cancel_move();
        assert_eq!(game.state(), GameState::IntendingMove);
        let _ = game.intend_move(coord("d2")).unwrap();
        assert_eq!(game.selected(), Some(coord("d2")));
    }

    #[test]
    fn make_move_rejects_uncached_destinations() {
        let mut game = started();
        let _ = game.intend_move(coord("e2")).unwrap();
        assert_eq!(
            game.make_move(coord("e5")).unwrap_err(),
            ActionError::IllegalDestination(coord("e5"))
        );
        // Selection was reset; a destination without a source is a state
        // error.
        assert_eq!(game.state(), GameState::IntendingMove);
        assert_eq!(
            game.make_move(coord("e4")).unwrap_err(),
            ActionError::WrongState
        );
    }

    #[test]
    fn moves_update_history_and_flags() {
        let mut game = started();
        let pawn = game.board.piece_at(coord("e2")).unwrap();
        assert!(!game.piece(pawn).has_moved());
        play(&mut game, "e2", "e4");
        assert_eq!(
            game.last_move(),
            Some(LastMove {
                piece: pawn,
                from: coord("e2"),
                to: coord("e4"),
            })
        );
        assert!(game.piece(pawn).has_moved());
        assert_eq!(game.piece(pawn).coordinate(), coord("e4"));
        assert_eq!(game.board.piece_at(coord("e2")), None);
        assert_eq!(game.board.piece_at(coord("e4")), Some(pawn));
        assert_eq!(game.player_to_move().color(), Color::Black);
    }

    #[test]
    fn capture_events_precede_the_move_event() {
        let mut game = started();
        play(&mut game, "e2", "e4");
        play(&mut game, "d7", "d5");
        let _ = game.drain_events().count();

        let pawn = game.board.piece_at(coord("e4")).unwrap();
        let victim = game.board.piece_at(coord("d5")).unwrap();
        play(&mut game, "e4", "d5");
        let events: Vec<Event> = game.drain_events().collect();
        assert_eq!(
            events,
            vec![
                Event::PieceCaptured {
                    piece: victim,
                    at: coord("d5")
                },
                Event::MoveCompleted {
                    piece: pawn,
                    from: coord("e4"),
                    to: coord("d5")
                },
            ]
        );
        assert_eq!(game.piece(victim).state(), PieceState::Captured);
    }

    #[test]
    fn check_state_survives_failed_intents_and_cancels() {
        let mut game = custom(
            &[
                (Color::White, PieceKind::King, "e1"),
                (Color::Black, PieceKind::King, "e8"),
                (Color::Black, PieceKind::Rook, "e5"),
            ],
            Color::White,
        );
        assert_eq!(game.state(), GameState::Check);
        assert!(game.is_in_check(Color::White));

        assert_eq!(
            game.intend_move(coord("a4")).unwrap_err(),
            ActionError::EmptySquare(coord("a4"))
        );
        assert_eq!(game.state(), GameState::Check);

        let _ = game.intend_move(coord("e1")).unwrap();
        assert_eq!(game.state(), GameState::MakingMove);
        game.cancel_move();
        assert_eq!(game.state(), GameState::Check);
    }

    #[test]
    fn cornered_king_is_checkmated() {
        let game = custom(
            &[
                (Color::White, PieceKind::King, "h1"),
                (Color::White, PieceKind::Pawn, "g2"),
                (Color::White, PieceKind::Pawn, "h2"),
                (Color::Black, PieceKind::Queen, "e1"),
                (Color::Black, PieceKind::King, "e8"),
            ],
            Color::White,
        );
        assert!(game.is_in_check(Color::White));
        let total: usize = game
            .legal_moves()
            .values()
            .map(|destinations| destinations.len())
            .sum();
        assert_eq!(total, 0);
        assert_eq!(game.state(), GameState::Checkmate(Color::Black));
    }

    #[test]
    fn cornered_king_without_check_is_stalemated() {
        let mut game = custom(
            &[
                (Color::Black, PieceKind::King, "a8"),
                (Color::White, PieceKind::King, "b6"),
                (Color::White, PieceKind::Queen, "c7"),
            ],
            Color::Black,
        );
        assert!(!game.is_in_check(Color::Black));
        assert_eq!(game.state(), GameState::Stalemate);
        assert!(game.drain_events().any(|event| event == Event::Stalemate));
    }

    #[test]
    fn promotion_rewrites_the_kind_in_place() {
        for promotion in Promotion::iter() {
            let mut game = Game::new(move |_| promotion);
            let _ = game.place_piece(Color::White, PieceKind::King, coord("e1"));
            let _ = game.place_piece(Color::Black, PieceKind::King, coord("e8"));
            let pawn = game.place_piece(Color::White, PieceKind::Pawn, coord("a7"));
            game.classify();

            let destinations = game.intend_move(coord("a7")).unwrap().to_vec();
            assert_eq!(destinations, vec![coord("a8")]);
            game.make_move(coord("a8")).unwrap();

            assert_eq!(game.piece(pawn).kind(), PieceKind::from(promotion));
            assert_eq!(game.piece(pawn).coordinate(), coord("a8"));
            assert!(game.piece(pawn).is_active());
            assert!(game.drain_events().any(|event| event
                == Event::PawnPromoted {
                    piece: pawn,
                    into: PieceKind::from(promotion),
                }));
        }
    }

    #[test]
    fn resignation_ends_the_game_unconditionally() {
        let mut game = started();
        play(&mut game, "e2", "e4");
        game.resign(Color::Black).unwrap();
        assert_eq!(game.state(), GameState::Resignation(Color::Black));
        assert!(game
            .drain_events()
            .any(|event| event == Event::Resignation(Color::Black)));
        assert_eq!(
            game.intend_move(coord("e7")).unwrap_err(),
            ActionError::WrongState
        );
        assert_eq!(game.resign(Color::White).unwrap_err(), ActionError::WrongState);
    }

    #[test]
    fn halfmove_clock_reaches_the_draw_threshold() {
        let mut game = started();
        // Shuffle the knights: no pawn moves, no captures.
        for _ in 0..25 {
            play(&mut game, "g1", "f3");
            play(&mut game, "g8", "f6");
            play(&mut game, "f3", "g1");
            play(&mut game, "f6", "g8");
        }
        assert_eq!(game.halfmove_clock(), 100);
        assert_eq!(game.state(), GameState::FiftyMoveDraw);
        assert!(game.drain_events().any(|event| event == Event::FiftyMoveDraw));
        // The mover still had legal moves and was not in check.
        assert!(!game.is_in_check(Color::White));
    }

    #[test]
    fn restart_resets_everything() {
        let mut game = started();
        play(&mut game, "e2", "e4");
        play(&mut game, "d7", "d5");
        play(&mut game, "e4", "d5");
        game.start();
        assert_eq!(game.pieces().len(), 32);
        assert_eq!(game.halfmove_clock(), 0);
        assert_eq!(game.last_move(), None);
        assert_eq!(game.state(), GameState::IntendingMove);
        assert_eq!(game.player_to_move().color(), Color::White);
        assert_eq!(game.drain_events().count(), 0);
    }
}
