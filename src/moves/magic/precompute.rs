//! Generates magic bitboard tables from scratch: relevant-occupancy masks,
//! blocker subset enumeration, and magic-number search.

use rand::{RngCore, SeedableRng, rngs::StdRng};

use super::attacks::{bishop_attacks_per_square, rook_attacks_per_square};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};

/// Chooses how the magic-number search is seeded.
pub enum MagicTableSeed {
    /// Deterministic: same seed always yields the same magic numbers.
    Fixed(u64),
    /// Seeded from the OS entropy source.
    Random,
}

fn make_rng(seed: MagicTableSeed) -> StdRng {
    match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(s),
        MagicTableSeed::Random => {
            let mut bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut bytes);
            StdRng::from_seed(bytes)
        }
    }
}

/// Squares a rook's ray can land on if every intervening square is occupied,
/// excluding the board edge (the edge square is always the ray's last stop
/// regardless of whether it's occupied, so it never affects the attack set).
fn rook_relevant_mask(square: usize) -> u64 {
    let rank = (square / 8) as i32;
    let file = (square % 8) as i32;
    let mut mask = 0u64;

    for r in (rank + 1)..7 {
        mask |= 1u64 << (r * 8 + file);
    }
    for r in 1..rank {
        mask |= 1u64 << (r * 8 + file);
    }
    for f in (file + 1)..7 {
        mask |= 1u64 << (rank * 8 + f);
    }
    for f in 1..file {
        mask |= 1u64 << (rank * 8 + f);
    }

    mask
}

fn bishop_relevant_mask(square: usize) -> u64 {
    let rank = (square / 8) as i32;
    let file = (square % 8) as i32;
    let mut mask = 0u64;

    let mut r = rank + 1;
    let mut f = file + 1;
    while r < 7 && f < 7 {
        mask |= 1u64 << (r * 8 + f);
        r += 1;
        f += 1;
    }
    r = rank - 1;
    f = file - 1;
    while r > 0 && f > 0 {
        mask |= 1u64 << (r * 8 + f);
        r -= 1;
        f -= 1;
    }
    r = rank + 1;
    f = file - 1;
    while r < 7 && f > 0 {
        mask |= 1u64 << (r * 8 + f);
        r += 1;
        f -= 1;
    }
    r = rank - 1;
    f = file + 1;
    while r > 0 && f < 7 {
        mask |= 1u64 << (r * 8 + f);
        r -= 1;
        f += 1;
    }

    mask
}

/// Enumerates every subset of the set bits in `mask`, including the empty
/// subset, via the standard carry-rippler trick.
fn enumerate_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones().min(20));
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

fn build_entry<R: RngCore>(
    square: usize,
    mask: u64,
    scan: fn(usize, u64) -> u64,
    rng: &mut R,
) -> Result<MagicEntry, String> {
    let shift = 64 - mask.count_ones();
    let blockers = enumerate_subsets(mask);
    let attacks: Vec<u64> = blockers.iter().map(|&b| scan(square, b)).collect();

    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

    let table_size = 1usize << mask.count_ones();
    let mut table = vec![0u64; table_size];
    for (&blocker, &attack) in blockers.iter().zip(attacks.iter()) {
        let index = ((blocker.wrapping_mul(magic)) >> shift) as usize;
        table[index] = attack;
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table: table.into_boxed_slice(),
    })
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = make_rng(seed);

    let mut rook_entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = rook_relevant_mask(square);
        rook_entries.push(build_entry(square, mask, rook_attacks_per_square, &mut rng)?);
    }

    let mut bishop_entries = Vec::with_capacity(64);
    for square in 0..64 {
        let mask = bishop_relevant_mask(square);
        bishop_entries.push(build_entry(
            square,
            mask,
            bishop_attacks_per_square,
            &mut rng,
        )?);
    }

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevant_masks_exclude_board_edge() {
        // a1's rook mask should never include h1 or a8 (edge squares).
        let mask = rook_relevant_mask(0);
        assert_eq!(mask & (1u64 << 7), 0);
        assert_eq!(mask & (1u64 << 56), 0);
    }

    #[test]
    fn subset_enumeration_covers_power_of_two_count() {
        let mask = 0b1011u64;
        let subsets = enumerate_subsets(mask);
        assert_eq!(subsets.len(), 1 << mask.count_ones());
    }

    #[test]
    fn generated_tables_round_trip_corner_square() {
        let tables = generate_magic_tables(MagicTableSeed::Fixed(1)).unwrap();
        let expected = rook_attacks_per_square(0, 0);
        assert_eq!(tables.rook.get_attacks(0, 0), expected);
    }
}
