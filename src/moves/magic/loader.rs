//! Single entry point the rest of the engine uses to obtain magic tables.

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;

#[cfg(feature = "deterministic_magic")]
const FIXED_SEED: u64 = 0x5DEE_CE11_0000_0042;

/// Loads (or generates) the rook/bishop magic tables used for sliding-piece
/// attack lookups. With `load_magic` enabled this reads a prebuilt
/// `magic_tables.bin` from the working directory instead of searching for
/// magic numbers at startup.
pub fn load_magic_tables() -> MagicTables {
    #[cfg(feature = "load_magic")]
    {
        let bytes = std::fs::read("magic_tables.bin")
            .expect("magic_tables.bin not found; export one with generate_magic_tables first");
        bincode::deserialize(&bytes).expect("magic_tables.bin is corrupt")
    }

    #[cfg(not(feature = "load_magic"))]
    {
        let seed = pick_seed();
        generate_magic_tables(seed).expect("magic number search failed")
    }
}

#[cfg(not(feature = "load_magic"))]
fn pick_seed() -> MagicTableSeed {
    #[cfg(feature = "deterministic_magic")]
    {
        MagicTableSeed::Fixed(FIXED_SEED)
    }
    #[cfg(not(feature = "deterministic_magic"))]
    {
        MagicTableSeed::Random
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_tables_answer_a_known_square() {
        let tables = load_magic_tables();
        // d4 with no blockers: full rook cross.
        let attacks = tables.rook.get_attacks(27, 0);
        assert_eq!(attacks.count_ones(), 14);
    }
}
