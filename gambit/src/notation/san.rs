//! Resolves a SAN (or long-algebraic) token to the unique legal move it names.

use chess::{Board, ChessMove, File, MoveGen, Piece, Rank, Square};
use regex::Regex;
use std::sync::LazyLock;

static SAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([NBRQK])?([a-h])?([1-8])?([x:])?([a-h])([1-8])(?:=?([NBRQnbrq]))?$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SanError {
    Malformed,
    Illegal,
    Ambiguous(usize),
}

impl SanError {
    pub fn describe(&self, token: &str) -> String {
        match self {
            Self::Malformed => format!("'{token}' is not a recognizable move"),
            Self::Illegal => format!("illegal move '{token}'"),
            Self::Ambiguous(n) => format!("ambiguous move '{token}' matches {n} legal moves"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SanMove {
    Castle { long: bool },
    Normal {
        piece: Piece,
        from_file: Option<usize>,
        from_rank: Option<usize>,
        dest: Square,
        promotion: Option<Piece>,
    },
}

fn piece_from_letter(letter: char) -> Option<Piece> {
    match letter.to_ascii_uppercase() {
        'N' => Some(Piece::Knight),
        'B' => Some(Piece::Bishop),
        'R' => Some(Piece::Rook),
        'Q' => Some(Piece::Queen),
        'K' => Some(Piece::King),
        _ => None,
    }
}

fn file_index(c: char) -> usize {
    (c as u8 - b'a') as usize
}

fn rank_index(c: char) -> usize {
    (c as u8 - b'1') as usize
}

fn parse(token: &str) -> Result<SanMove, SanError> {
    let mut text = token.trim_end_matches(['+', '#']).to_string();
    for suffix in ["e.p.", "ep"] {
        if let Some(stripped) = text.strip_suffix(suffix) {
            text = stripped.trim_end().to_string();
        }
    }

    match text.replace('0', "O").as_str() {
        "O-O" => return Ok(SanMove::Castle { long: false }),
        "O-O-O" => return Ok(SanMove::Castle { long: true }),
        _ => {}
    }

    let text = text.replace('-', "");
    let caps = SAN_RE.captures(&text).ok_or(SanError::Malformed)?;
    let letter = |i: usize| caps.get(i).and_then(|m| m.as_str().chars().next());

    let piece = letter(1)
        .and_then(piece_from_letter)
        .unwrap_or(Piece::Pawn);
    let dest_file = letter(5).map(file_index).ok_or(SanError::Malformed)?;
    let dest_rank = letter(6).map(rank_index).ok_or(SanError::Malformed)?;
    let promotion = match letter(7) {
        Some(c) => Some(piece_from_letter(c).ok_or(SanError::Malformed)?),
        None => None,
    };

    Ok(SanMove::Normal {
        piece,
        from_file: letter(2).map(file_index),
        from_rank: letter(3).map(rank_index),
        dest: Square::make_square(Rank::from_index(dest_rank), File::from_index(dest_file)),
        promotion,
    })
}

pub(crate) fn resolve(board: &Board, token: &str) -> Result<ChessMove, SanError> {
    let san = parse(token)?;

    let candidates: Vec<ChessMove> = MoveGen::new_legal(board)
        .filter(|m| matches(board, m, &san))
        .collect();

    match candidates.as_slice() {
        [] => Err(SanError::Illegal),
        [only] => Ok(*only),
        many => Err(SanError::Ambiguous(many.len())),
    }
}

fn matches(board: &Board, m: &ChessMove, san: &SanMove) -> bool {
    let source = m.get_source();
    let dest = m.get_dest();
    let moved = board.piece_on(source);

    match san {
        SanMove::Castle { long } => {
            let target_file = if *long { File::C } else { File::G };
            moved == Some(Piece::King)
                && source.get_file() == File::E
                && dest.get_file() == target_file
                && source.get_rank() == dest.get_rank()
        }
        SanMove::Normal {
            piece,
            from_file,
            from_rank,
            dest: want,
            promotion,
        } => {
            moved == Some(*piece)
                && dest == *want
                && m.get_promotion() == *promotion
                && from_file.map_or(true, |f| source.get_file().to_index() == f)
                && from_rank.map_or(true, |r| source.get_rank().to_index() == r)
        }
    }
}

/// Whether `m` removes an enemy piece, en passant included.
pub(crate) fn is_capture(board: &Board, m: &ChessMove) -> bool {
    board.piece_on(m.get_dest()).is_some()
        || (board.piece_on(m.get_source()) == Some(Piece::Pawn)
            && m.get_source().get_file() != m.get_dest().get_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn square(name: &str) -> Square {
        let mut chars = name.chars();
        let file = file_index(chars.next().unwrap());
        let rank = rank_index(chars.next().unwrap());
        Square::make_square(Rank::from_index(rank), File::from_index(file))
    }

    #[test]
    fn test_resolves_pawn_and_piece_moves() {
        let board = Board::default();
        let m = resolve(&board, "e4").unwrap();
        assert_eq!(m.get_source(), square("e2"));
        assert_eq!(m.get_dest(), square("e4"));

        let m = resolve(&board, "Nf3").unwrap();
        assert_eq!(m.get_source(), square("g1"));
    }

    #[test]
    fn test_resolves_long_algebraic() {
        let board = Board::default();
        assert_eq!(resolve(&board, "e2e4").unwrap(), resolve(&board, "e4").unwrap());
        assert_eq!(resolve(&board, "Ng1-f3").unwrap(), resolve(&board, "Nf3").unwrap());
    }

    #[test]
    fn test_rejects_illegal_move() {
        let board = Board::default();
        assert_eq!(resolve(&board, "e5"), Err(SanError::Illegal));
        assert_eq!(resolve(&board, "Qh5"), Err(SanError::Illegal));
    }

    #[test]
    fn test_rejects_garbage() {
        let board = Board::default();
        assert_eq!(resolve(&board, "hello"), Err(SanError::Malformed));
    }

    #[test]
    fn test_castling_both_spellings() {
        let board =
            Board::from_str("r3k2r/pppqbppp/2np1n2/4p3/2B1P1b1/2NP1N2/PPPBQPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let short = resolve(&board, "O-O").unwrap();
        assert_eq!(short.get_dest(), square("g1"));
        assert_eq!(resolve(&board, "0-0").unwrap(), short);
        let long = resolve(&board, "O-O-O+").unwrap();
        assert_eq!(long.get_dest(), square("c1"));
    }

    #[test]
    fn test_disambiguation_and_ambiguity() {
        // Knights on b1 and f3 can both reach d2
        let board = Board::from_str("4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1").unwrap();
        assert_eq!(resolve(&board, "Nd2"), Err(SanError::Ambiguous(2)));
        assert_eq!(resolve(&board, "Nbd2").unwrap().get_source(), square("b1"));
        assert_eq!(resolve(&board, "Nfd2").unwrap().get_source(), square("f3"));
    }

    #[test]
    fn test_promotion_requires_piece() {
        let board = Board::from_str("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let m = resolve(&board, "e8=Q").unwrap();
        assert_eq!(m.get_promotion(), Some(Piece::Queen));
        assert_eq!(resolve(&board, "e8N").unwrap().get_promotion(), Some(Piece::Knight));
        assert_eq!(resolve(&board, "e8"), Err(SanError::Illegal));
    }

    #[test]
    fn test_capture_detection_includes_en_passant() {
        let board = Board::from_str("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let m = resolve(&board, "exd6").unwrap();
        assert!(is_capture(&board, &m));
        let quiet = resolve(&board, "e6").unwrap();
        assert!(!is_capture(&board, &quiet));
    }
}
