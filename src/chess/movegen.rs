//! Pseudo-legal destination generation and attack detection.
//!
//! "Pseudo-legal" follows a piece's raw movement geometry and ignores whether
//! the move would expose the mover's own king; [`crate::chess::game::Game`]
//! filters the output through its simulate-and-restore legality check.
//! Castling is the exception: its full legality (unmoved king and rook, empty
//! span, unattacked start/transit/destination) is established right here,
//! during generation.

use crate::chess::board::Board;
use crate::chess::core::{Color, Coordinate, Piece, PieceId, PieceKind, Pieces, BOARD_WIDTH};
use crate::chess::game::{DestinationList, LastMove};

const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const EVERY_DIRECTION: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Computes every square the piece could move to by raw geometry alone. The
/// caller is responsible for filtering out destinations that leave its own
/// king attacked.
pub(super) fn pseudo_legal_destinations(
    board: &Board,
    pieces: &Pieces,
    id: PieceId,
    last_move: Option<LastMove>,
) -> DestinationList {
    let piece = &pieces[id];
    debug_assert!(piece.is_active());
    let mut destinations = DestinationList::new();
    match piece.kind() {
        PieceKind::Rook => slide(board, pieces, piece, &ORTHOGONAL_DIRECTIONS, &mut destinations),
        PieceKind::Bishop => slide(board, pieces, piece, &DIAGONAL_DIRECTIONS, &mut destinations),
        PieceKind::Queen => slide(board, pieces, piece, &EVERY_DIRECTION, &mut destinations),
        PieceKind::Knight => leap(board, pieces, piece, &KNIGHT_JUMPS, &mut destinations),
        PieceKind::King => {
            leap(board, pieces, piece, &EVERY_DIRECTION, &mut destinations);
            castling_destinations(board, pieces, piece, &mut destinations);
        },
        PieceKind::Pawn => pawn_destinations(board, pieces, piece, last_move, &mut destinations),
    }
    destinations
}

/// Whether any active piece of `by` can pseudo-legally reach `target`. Pawns
/// count via their diagonal-attack geometry only, never forward advances.
pub(super) fn is_attacked(board: &Board, pieces: &Pieces, target: Coordinate, by: Color) -> bool {
    pieces
        .iter()
        .any(|(_, piece)| piece.color() == by && piece.is_active() && attacks(board, piece, target))
}

fn attacks(board: &Board, attacker: &Piece, target: Coordinate) -> bool {
    let from = attacker.coordinate();
    if from == target {
        return false;
    }
    let file_delta = target.file() as i8 - from.file() as i8;
    let rank_delta = target.rank() as i8 - from.rank() as i8;
    match attacker.kind() {
        PieceKind::Pawn => rank_delta == attacker.color().forward() && file_delta.abs() == 1,
        PieceKind::Knight => matches!((file_delta.abs(), rank_delta.abs()), (1, 2) | (2, 1)),
        PieceKind::King => file_delta.abs() <= 1 && rank_delta.abs() <= 1,
        PieceKind::Rook => {
            (file_delta == 0 || rank_delta == 0) && clear_path(board, from, target)
        },
        PieceKind::Bishop => {
            file_delta.abs() == rank_delta.abs() && clear_path(board, from, target)
        },
        PieceKind::Queen => {
            (file_delta == 0 || rank_delta == 0 || file_delta.abs() == rank_delta.abs())
                && clear_path(board, from, target)
        },
    }
}

// Walks from `from` towards `to` (exclusive), expecting the caller to have
// verified rank/file/diagonal alignment. True when no occupant intervenes.
fn clear_path(board: &Board, from: Coordinate, to: Coordinate) -> bool {
    let file_step = (to.file() as i8 - from.file() as i8).signum();
    let rank_step = (to.rank() as i8 - from.rank() as i8).signum();
    let mut at = from;
    loop {
        at = match at.offset(file_step, rank_step) {
            Some(next) => next,
            None => return false,
        };
        if at == to {
            return true;
        }
        if board.piece_at(at).is_some() {
            return false;
        }
    }
}

// For each direction, steps outward until the edge of the board or a blocker;
// an occupied square is included only when it holds an opposing piece, and
// the ray stops there either way.
fn slide(
    board: &Board,
    pieces: &Pieces,
    piece: &Piece,
    directions: &[(i8, i8)],
    destinations: &mut DestinationList,
) {
    for &(file_step, rank_step) in directions {
        let mut at = piece.coordinate();
        while let Some(next) = at.offset(file_step, rank_step) {
            match board.piece_at(next) {
                None => destinations.push(next),
                Some(occupant) => {
                    if pieces[occupant].color() != piece.color() {
                        destinations.push(next);
                    }
                    break;
                },
            }
            at = next;
        }
    }
}

// Fixed offset set: a destination is included when empty or held by an
// opposing piece.
fn leap(
    board: &Board,
    pieces: &Pieces,
    piece: &Piece,
    offsets: &[(i8, i8)],
    destinations: &mut DestinationList,
) {
    for &(file_delta, rank_delta) in offsets {
        let Some(to) = piece.coordinate().offset(file_delta, rank_delta) else {
            continue;
        };
        match board.piece_at(to) {
            None => destinations.push(to),
            Some(occupant) if pieces[occupant].color() != piece.color() => destinations.push(to),
            Some(_) => {},
        }
    }
}

fn pawn_destinations(
    board: &Board,
    pieces: &Pieces,
    piece: &Piece,
    last_move: Option<LastMove>,
    destinations: &mut DestinationList,
) {
    let from = piece.coordinate();
    let forward = piece.color().forward();
    // Single push onto an empty square; double push from the starting rank
    // when both squares ahead are empty.
    if let Some(one) = from.offset(0, forward) {
        if board.piece_at(one).is_none() {
            destinations.push(one);
            if from.rank() == piece.color().pawn_rank() {
                if let Some(two) = one.offset(0, forward) {
                    if board.piece_at(two).is_none() {
                        destinations.push(two);
                    }
                }
            }
        }
    }
    // Diagonal captures.
    for file_delta in [-1, 1] {
        let Some(to) = from.offset(file_delta, forward) else {
            continue;
        };
        if let Some(occupant) = board.piece_at(to) {
            if pieces[occupant].color() != piece.color() {
                destinations.push(to);
            }
        }
    }
    // En passant: the last move was the opponent's two-square pawn advance
    // landing right next to this pawn.
    if let Some(last) = last_move {
        let mover = &pieces[last.piece];
        if mover.color() != piece.color()
            && mover.kind() == PieceKind::Pawn
            && last.from.rank().abs_diff(last.to.rank()) == 2
            && last.to.rank() == from.rank()
            && last.to.file().abs_diff(from.file()) == 1
        {
            let file_delta = last.to.file() as i8 - from.file() as i8;
            if let Some(to) = from.offset(file_delta, forward) {
                if board.piece_at(to).is_none() {
                    destinations.push(to);
                }
            }
        }
    }
}

// The castling rules in full: the king and the corner rook have never moved,
// every square strictly between them is empty, and none of the king's start,
// transit and destination squares is attacked by the opponent. The rook's
// relocation itself happens at move application.
fn castling_destinations(
    board: &Board,
    pieces: &Pieces,
    king: &Piece,
    destinations: &mut DestinationList,
) {
    if king.has_moved() {
        return;
    }
    let from = king.coordinate();
    let opponent = king.color().opponent();
    if is_attacked(board, pieces, from, opponent) {
        return;
    }
    // King-side rook sits on the h-file, queen-side on the a-file.
    for (rook_file, file_step) in [(BOARD_WIDTH - 1, 1i8), (0, -1i8)] {
        let rook_home = Coordinate::new(rook_file, from.rank());
        let rook = match board.piece_at(rook_home) {
            Some(id) => &pieces[id],
            None => continue,
        };
        if rook.color() != king.color() || rook.kind() != PieceKind::Rook || rook.has_moved() {
            continue;
        }
        let (low, high) = if rook_file < from.file() {
            (rook_file + 1, from.file())
        } else {
            (from.file() + 1, rook_file)
        };
        if (low..high).any(|file| board.piece_at(Coordinate::new(file, from.rank())).is_some()) {
            continue;
        }
        let (Some(transit), Some(destination)) =
            (from.offset(file_step, 0), from.offset(2 * file_step, 0))
        else {
            continue;
        };
        if is_attacked(board, pieces, transit, opponent)
            || is_attacked(board, pieces, destination, opponent)
        {
            continue;
        }
        destinations.push(destination);
    }
}
