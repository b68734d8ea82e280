//! Small free functions shared by move generation and evaluation.

use crate::bitboard::BitboardExt;

#[inline(always)]
pub fn square_index(rank: usize, file: usize) -> usize {
    rank * 8 + file
}

/// Clears and returns the least significant set bit of `bb`.
#[inline(always)]
pub fn pop_lsb(bb: &mut u64) -> u8 {
    bb.pop_lsb()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_index_matches_rank_major_layout() {
        assert_eq!(square_index(0, 0), 0);
        assert_eq!(square_index(7, 7), 63);
        assert_eq!(square_index(1, 0), 8);
    }
}
