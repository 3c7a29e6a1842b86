//! Protocol Table: maps a ledger block number to the protocol parameters
//! in effect at that block.

use crate::hash::SHA2_256;

/// Parameters in effect starting at some block number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolParameters {
    /// Maximum number of operations the Rooter may pack into a single
    /// batch file.
    pub max_operations_per_batch: u32,
    /// Multihash code selecting the hash algorithm operations and Merkle
    /// leaves are hashed with.
    pub hash_algorithm_code: u64,
}

/// A sorted table of `(starting_block, parameters)` entries.
#[derive(Debug, Clone)]
pub struct ProtocolTable {
    entries: Vec<(u64, ProtocolParameters)>,
}

impl ProtocolTable {
    /// Builds a table from `entries`, sorting them by starting block.
    ///
    /// # Panics
    ///
    /// Panics if `entries` is empty or none of them start at block 0 — a
    /// lookup below the table's first entry would otherwise have no
    /// defined parameters, which is a construction-time programmer error,
    /// not a runtime condition.
    pub fn new(mut entries: Vec<(u64, ProtocolParameters)>) -> Self {
        assert!(!entries.is_empty(), "ProtocolTable requires at least one entry");
        entries.sort_by_key(|(block, _)| *block);
        assert_eq!(entries[0].0, 0, "ProtocolTable must define parameters starting at block 0");
        Self { entries }
    }

    /// Returns the parameters of the greatest `starting_block <=
    /// block_number`.
    pub fn get_protocol(&self, block_number: u64) -> ProtocolParameters {
        self.entries
            .iter()
            .rev()
            .find(|(start, _)| *start <= block_number)
            .map(|(_, params)| *params)
            .expect("ProtocolTable invariant guarantees a block-0 entry")
    }
}

impl Default for ProtocolTable {
    fn default() -> Self {
        Self::new(vec![(
            0,
            ProtocolParameters {
                max_operations_per_batch: 100,
                hash_algorithm_code: SHA2_256,
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_genesis_parameters_before_any_upgrade() {
        let table = ProtocolTable::default();
        let params = table.get_protocol(0);
        assert_eq!(params.max_operations_per_batch, 100);
    }

    #[test]
    fn returns_parameters_of_greatest_starting_block_leq_query() {
        let table = ProtocolTable::new(vec![
            (
                0,
                ProtocolParameters {
                    max_operations_per_batch: 100,
                    hash_algorithm_code: SHA2_256,
                },
            ),
            (
                1000,
                ProtocolParameters {
                    max_operations_per_batch: 10_000,
                    hash_algorithm_code: SHA2_256,
                },
            ),
        ]);
        assert_eq!(table.get_protocol(999).max_operations_per_batch, 100);
        assert_eq!(table.get_protocol(1000).max_operations_per_batch, 10_000);
        assert_eq!(table.get_protocol(5000).max_operations_per_batch, 10_000);
    }

    #[test]
    fn entries_need_not_be_pre_sorted() {
        let table = ProtocolTable::new(vec![
            (
                1000,
                ProtocolParameters {
                    max_operations_per_batch: 10_000,
                    hash_algorithm_code: SHA2_256,
                },
            ),
            (
                0,
                ProtocolParameters {
                    max_operations_per_batch: 100,
                    hash_algorithm_code: SHA2_256,
                },
            ),
        ]);
        assert_eq!(table.get_protocol(0).max_operations_per_batch, 100);
    }
}
