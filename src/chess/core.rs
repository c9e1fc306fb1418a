//! Chess primitives commonly used within [`crate::chess`]: colors, piece
//! kinds, coordinates and the piece arena.

use std::fmt::{self, Write};
use std::ops;

use anyhow::bail;
use itertools::Itertools;

/// Chessboard dimension: the board is a `BOARD_WIDTH` × `BOARD_WIDTH` grid.
pub const BOARD_WIDTH: u8 = 8;

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank delta of a single pawn push for this color.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// The rank this color's major pieces start on.
    #[must_use]
    pub const fn backrank(self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => BOARD_WIDTH - 1,
        }
    }

    /// The rank this color's pawns start on.
    #[must_use]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Self::White => 1,
            Self::Black => BOARD_WIDTH - 2,
        }
    }

    /// The far rank: a pawn of this color promotes upon reaching it.
    #[must_use]
    pub const fn promotion_rank(self) -> u8 {
        self.opponent().backrank()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(match self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        })
    }
}

/// A pawn can be promoted to a queen, rook, bishop or a knight. The closed
/// set makes illegal promotion targets (king, pawn) unrepresentable in the
/// promotion-choice callback.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumIter)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl From<Promotion> for PieceKind {
    fn from(promotion: Promotion) -> Self {
        match promotion {
            Promotion::Queen => Self::Queen,
            Promotion::Rook => Self::Rook,
            Promotion::Bishop => Self::Bishop,
            Promotion::Knight => Self::Knight,
        }
    }
}

/// Whether a piece is still on the board. Captured pieces stay in the arena
/// for the lifetime of the game but are referenced by no square.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieceState {
    Active,
    Captured,
}

/// A board location: file (column) and rank (row), both zero-based and within
/// `0..BOARD_WIDTH`. `Coordinate` is a plain value with no identity; it is
/// in-range by construction.
///
/// ```
/// use tabiya::chess::core::Coordinate;
///
/// let e4 = Coordinate::try_from("e4").unwrap();
/// assert_eq!((e4.file(), e4.rank()), (4, 3));
/// assert_eq!(e4.to_string(), "e4");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    file: u8,
    rank: u8,
}

impl Coordinate {
    /// Connects file (column) and rank (row) to form a full coordinate.
    ///
    /// # Panics
    ///
    /// Panics when either axis is outside `0..BOARD_WIDTH`: an out-of-range
    /// coordinate is a caller defect, not a recoverable game condition. Use
    /// [`Coordinate::try_from`] for untrusted input.
    #[must_use]
    pub const fn new(file: u8, rank: u8) -> Self {
        assert!(file < BOARD_WIDTH, "file should be within 0..BOARD_WIDTH");
        assert!(rank < BOARD_WIDTH, "rank should be within 0..BOARD_WIDTH");
        Self { file, rank }
    }

    /// Returns file (column) of the coordinate.
    #[must_use]
    pub const fn file(self) -> u8 {
        self.file
    }

    /// Returns rank (row) of the coordinate.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// Steps by the given deltas, returning `None` when the result would
    /// leave the board.
    #[must_use]
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file.checked_add_signed(file_delta)?;
        let rank = self.rank.checked_add_signed(rank_delta)?;
        if file < BOARD_WIDTH && rank < BOARD_WIDTH {
            Some(Self { file, rank })
        } else {
            None
        }
    }
}

impl TryFrom<&str> for Coordinate {
    type Error = anyhow::Error;

    /// Parses a coordinate in algebraic notation: exactly two characters,
    /// file within `'a'..='h'`, rank within `'1'..='8'`.
    fn try_from(square: &str) -> anyhow::Result<Self> {
        let (file, rank) = match square.chars().collect_tuple() {
            Some((file, rank)) => (file, rank),
            None => bail!(
                "coordinate should be two-char, got {square} with {} chars",
                square.chars().count()
            ),
        };
        let file = match file {
            'a'..='h' => file as u8 - b'a',
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        };
        let rank = match rank {
            '1'..='8' => rank as u8 - b'1',
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        };
        Ok(Self { file, rank })
    }
}

impl fmt::Display for Coordinate {
    /// Serializes the coordinate in algebraic notation, the exact inverse of
    /// [`Coordinate::try_from`] over all in-range values.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

/// A specific piece owned by a player for the whole game: its kind changes
/// only on promotion, its coordinate follows it around the board and its
/// state flips to [`PieceState::Captured`] at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
    state: PieceState,
    coordinate: Coordinate,
    has_moved: bool,
}

impl Piece {
    /// Creates an active, not-yet-moved piece at the given coordinate.
    #[must_use]
    pub const fn new(color: Color, kind: PieceKind, coordinate: Coordinate) -> Self {
        Self {
            color,
            kind,
            state: PieceState::Active,
            coordinate,
            has_moved: false,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn state(&self) -> PieceState {
        self.state
    }

    /// The square this piece occupies while active; while captured, the
    /// coordinate it was captured on.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Whether the piece has moved at least once. Gates castling eligibility
    /// and is never cleared by a legality simulation.
    #[must_use]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == PieceState::Active
    }

    pub(crate) fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.coordinate = coordinate;
    }

    // Called exactly once per piece, on promotion. Identity is preserved: the
    // arena slot and id stay the same.
    pub(crate) fn set_kind(&mut self, kind: PieceKind) {
        self.kind = kind;
    }

    pub(crate) fn set_state(&mut self, state: PieceState) {
        self.state = state;
    }

    pub(crate) fn set_moved(&mut self) {
        self.has_moved = true;
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(match (self.color, self.kind) {
            // White player: uppercase symbols.
            (Color::White, PieceKind::King) => 'K',
            (Color::White, PieceKind::Queen) => 'Q',
            (Color::White, PieceKind::Rook) => 'R',
            (Color::White, PieceKind::Bishop) => 'B',
            (Color::White, PieceKind::Knight) => 'N',
            (Color::White, PieceKind::Pawn) => 'P',
            // Black player: lowercase symbols.
            (Color::Black, PieceKind::King) => 'k',
            (Color::Black, PieceKind::Queen) => 'q',
            (Color::Black, PieceKind::Rook) => 'r',
            (Color::Black, PieceKind::Bishop) => 'b',
            (Color::Black, PieceKind::Knight) => 'n',
            (Color::Black, PieceKind::Pawn) => 'p',
        })
    }
}

/// Opaque handle to a piece in the [`Pieces`] arena. The id *is* the piece's
/// identity: promotion rewrites the kind behind the id, capture flips the
/// state behind it, and the id stays valid for the whole game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceId(usize);

/// Append-only arena holding every piece created for the game. Pieces are
/// never removed; captures flip [`PieceState`] instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pieces {
    items: Vec<Piece>,
}

impl Pieces {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a piece to the arena and returns its permanent id.
    pub fn insert(&mut self, piece: Piece) -> PieceId {
        let id = PieceId(self.items.len());
        self.items.push(piece);
        id
    }

    /// Iterates over every piece ever created, active and captured alike.
    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.items.iter().enumerate().map(|(n, piece)| (PieceId(n), piece))
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ops::Index<PieceId> for Pieces {
    type Output = Piece;

    fn index(&self, id: PieceId) -> &Self::Output {
        &self.items[id.0]
    }
}

impl ops::IndexMut<PieceId> for Pieces {
    fn index_mut(&mut self, id: PieceId) -> &mut Self::Output {
        &mut self.items[id.0]
    }
}

/// One of the two participants. A player is identified by color; the pieces
/// it owns are tracked by the engine roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Player {
    color: Color,
}

impl Player {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }
}
