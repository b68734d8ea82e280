use super::*;

#[test]
fn new_board_has_32_pieces() {
    let board = Board::new();
    assert_eq!(board.occupied().count_ones(), 32);
    assert_eq!(board.occ_white.count_ones(), 16);
    assert_eq!(board.occ_black.count_ones(), 16);
}

#[test]
fn new_board_side_to_move_is_white() {
    let board = Board::new();
    assert_eq!(board.side_to_move, Color::White);
}

#[test]
fn new_board_has_all_castling_rights() {
    let board = Board::new();
    assert!(board.has_kingside_castle(Color::White));
    assert!(board.has_queenside_castle(Color::White));
    assert!(board.has_kingside_castle(Color::Black));
    assert!(board.has_queenside_castle(Color::Black));
}

#[test]
fn piece_at_reports_correct_color_and_type() {
    let board = Board::new();
    assert_eq!(
        board.piece_at(Square::from_index(0)),
        Some((Color::White, Piece::Rook))
    ); // a1
    assert_eq!(
        board.piece_at(Square::from_index(4)),
        Some((Color::White, Piece::King))
    ); // e1
    assert_eq!(
        board.piece_at(Square::from_index(60)),
        Some((Color::Black, Piece::King))
    ); // e8
    assert_eq!(board.piece_at(Square::from_index(27)), None); // d4
}

#[test]
fn king_square_finds_both_kings() {
    let board = Board::new();
    assert_eq!(board.king_square(Color::White).index(), 4);
    assert_eq!(board.king_square(Color::Black).index(), 60);
}

#[test]
fn validate_accepts_starting_position() {
    let board = Board::new();
    assert!(board.validate().is_ok());
}

#[test]
fn validate_rejects_overlapping_pieces() {
    let mut board = Board::new_empty();
    board.set_bb(Color::White, Piece::Pawn, 1);
    board.set_bb(Color::White, Piece::Knight, 1);
    assert!(board.validate().is_err());
}

#[test]
fn zobrist_is_consistent_with_full_recompute() {
    let board = Board::new();
    assert_eq!(board.zobrist, board.compute_zobrist_full());
}

#[test]
fn empty_board_has_no_repetitions() {
    let board = Board::new();
    assert!(!board.is_threefold());
    assert_eq!(board.repetition_count(), 1);
}

#[test]
fn opposite_color_round_trips() {
    assert_eq!(Color::White.opposite(), Color::Black);
    assert_eq!(Color::Black.opposite(), Color::White);
    assert_eq!(!Color::White, Color::Black);
}

#[test]
fn display_renders_as_fen() {
    let board = Board::new();
    assert_eq!(
        board.to_string(),
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    );
}

#[test]
fn from_str_parses_a_custom_fen() {
    let fen = "8/8/8/4k3/8/8/8/4K3 w - - 0 1";
    let board: Board = fen.parse().unwrap();
    assert_eq!(board.occupied().count_ones(), 2);
    assert_eq!(board.king_square(Color::White).index(), 4);
    assert_eq!(board.king_square(Color::Black).index(), 36);
}
