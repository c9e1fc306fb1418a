//! Typed event records emitted by the engine.
//!
//! Delivery is synchronous: every record is queued before the triggering call
//! returns, and the caller drains the queue with
//! [`crate::chess::game::Game::drain_events`] after each engine call. The
//! engine is agnostic to its subscribers (display, CLI or none at all).

use crate::chess::core::{Color, Coordinate, PieceId, PieceKind};

/// Something observable happened inside the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A move was applied: `piece` relocated from `from` to `to`.
    MoveCompleted {
        #[allow(missing_docs)]
        piece: PieceId,
        #[allow(missing_docs)]
        from: Coordinate,
        #[allow(missing_docs)]
        to: Coordinate,
    },
    /// A piece left the board. Fired for ordinary and en passant captures.
    PieceCaptured {
        #[allow(missing_docs)]
        piece: PieceId,
        /// The square the piece actually stood on, which for en passant is
        /// not the capturing pawn's destination.
        at: Coordinate,
    },
    /// The mover castled; the rook relocated alongside the king.
    CastlingPerformed {
        #[allow(missing_docs)]
        color: Color,
        #[allow(missing_docs)]
        rook_from: Coordinate,
        #[allow(missing_docs)]
        rook_to: Coordinate,
    },
    /// A pawn was captured in passing.
    EnPassantPerformed {
        #[allow(missing_docs)]
        captured: PieceId,
        #[allow(missing_docs)]
        at: Coordinate,
    },
    /// A pawn reached the far rank and became `into`.
    PawnPromoted {
        #[allow(missing_docs)]
        piece: PieceId,
        #[allow(missing_docs)]
        into: PieceKind,
    },
    /// The given side's king is attacked and the side must respond.
    Check(Color),
    /// The game ended with a checkmate; `winner` delivered the mate.
    Checkmate {
        #[allow(missing_docs)]
        winner: Color,
    },
    /// The side to move has no legal moves and is not in check.
    Stalemate,
    /// One hundred half-moves passed without a capture or a pawn move.
    FiftyMoveDraw,
    /// The given side resigned.
    Resignation(Color),
}
