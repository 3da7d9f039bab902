//! Binary genome archive (serde + bincode).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ArchiveError;
use crate::genetics::ParasiteGenetics;
use crate::genome::{GenomeIdGenerator, GenomeRecord};

/// One persisted genome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedGenome {
    pub hash: i64,
    pub id: u32,
    pub sequence: Vec<i32>,
    pub roots: Vec<u32>,
}

impl From<&GenomeRecord> for ArchivedGenome {
    fn from(record: &GenomeRecord) -> Self {
        Self {
            hash: record.hash_code(),
            id: record.id(),
            sequence: record.sequence().to_vec(),
            roots: record.roots().to_vec(),
        }
    }
}

/// Contents of a genome archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeArchive {
    pub ids: GenomeIdGenerator,
    /// Sorted by genome ID
    pub genomes: Vec<ArchivedGenome>,
}

impl ParasiteGenetics {
    /// Snapshot of the store. Unreferenced genomes are compacted away first.
    pub fn archive(&mut self) -> GenomeArchive {
        self.compact();
        let mut genomes: Vec<ArchivedGenome> = self
            .store()
            .iter()
            .map(|record| ArchivedGenome::from(record.as_ref()))
            .collect();
        genomes.sort_unstable_by_key(|g| g.id);
        GenomeArchive {
            ids: self.store().id_generator(),
            genomes,
        }
    }

    /// Replace the store contents with `archive`. Each restored genome is held
    /// once, by the store. Returns the number of genomes restored.
    ///
    /// # Errors
    /// Returns an error if a genome does not match the configured number of
    /// locations or its content does not hash to its stored hash.
    pub fn restore(&mut self, archive: GenomeArchive) -> Result<usize, ArchiveError> {
        let expected = self.registry().num_base_pairs();
        let mut records = Vec::with_capacity(archive.genomes.len());
        for genome in archive.genomes {
            if genome.sequence.len() != expected
                || !(genome.roots.is_empty() || genome.roots.len() == expected)
            {
                return Err(ArchiveError::LengthMismatch {
                    id: genome.id,
                    found: genome.sequence.len(),
                    expected,
                });
            }
            let record = GenomeRecord::new(
                genome.id,
                genome.sequence,
                genome.roots,
                self.registry().indexes_barcode(),
            );
            if record.hash_code() != genome.hash {
                return Err(ArchiveError::HashMismatch {
                    id: genome.id,
                    stored: genome.hash,
                    computed: record.hash_code(),
                });
            }
            records.push(record);
        }

        let store = self.store_mut();
        store.clear();
        store.set_id_generator(archive.ids);
        for record in records {
            if store.contains(record.hash_code()) {
                warn!(id = record.id(), "archive holds a duplicate genome");
            }
            // the returned handle is dropped so only the store holds the record
            store.insert(record);
        }
        debug!(genomes = store.len(), "restored genome archive");
        Ok(store.len())
    }

    /// Write the store as a bincode archive.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn write_archive<W: Write>(&mut self, writer: W) -> Result<(), ArchiveError> {
        let archive = self.archive();
        bincode::serialize_into(writer, &archive)?;
        Ok(())
    }

    /// Replace the store with the contents of a bincode archive.
    ///
    /// # Errors
    /// Returns an error if reading or decoding fails or the archive does not
    /// fit the configured genome.
    pub fn read_archive<R: Read>(&mut self, reader: R) -> Result<usize, ArchiveError> {
        let archive: GenomeArchive = bincode::deserialize_from(reader)?;
        self.restore(archive)
    }

    /// Write the archive to a file.
    pub fn save_archive(&mut self, path: impl AsRef<Path>) -> Result<(), ArchiveError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_archive(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read an archive from a file.
    pub fn load_archive(&mut self, path: impl AsRef<Path>) -> Result<usize, ArchiveError> {
        let reader = BufReader::new(File::open(path)?);
        self.read_archive(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{GeneticsConfig, VarGeneRandomness};

    fn genetics() -> ParasiteGenetics {
        ParasiteGenetics::new(&GeneticsConfig {
            barcode_locations: vec![100, 200, 300],
            var_gene_randomness: VarGeneRandomness::AllRandom,
            ..GeneticsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_archive_skips_unreferenced_genomes() {
        let mut genetics = genetics();
        let kept = genetics.create_genome("ACG", vec![1, 1, 1]).unwrap();
        genetics.create_genome("TTT", vec![2, 2, 2]).unwrap();

        let archive = genetics.archive();
        assert_eq!(archive.genomes.len(), 1);
        assert_eq!(archive.genomes[0].id, kept.id());
        assert_eq!(archive.ids.peek(), 3);
    }

    #[test]
    fn test_restore_rejects_wrong_length() {
        let mut genetics = genetics();
        let archive = GenomeArchive {
            ids: GenomeIdGenerator::default(),
            genomes: vec![ArchivedGenome {
                hash: 0,
                id: 1,
                sequence: vec![0, 1],
                roots: vec![],
            }],
        };
        assert!(matches!(
            genetics.restore(archive),
            Err(ArchiveError::LengthMismatch {
                id: 1,
                found: 2,
                expected: 3
            })
        ));
    }

    #[test]
    fn test_restore_rejects_bad_hash() {
        let mut genetics = genetics();
        let archive = GenomeArchive {
            ids: GenomeIdGenerator::default(),
            genomes: vec![ArchivedGenome {
                hash: 12345,
                id: 1,
                sequence: vec![0, 1, 2],
                roots: vec![],
            }],
        };
        assert!(matches!(
            genetics.restore(archive),
            Err(ArchiveError::HashMismatch { id: 1, stored: 12345, .. })
        ));
    }

    #[test]
    fn test_restored_records_are_held_once() {
        let mut source = genetics();
        let genome = source.create_genome("GAT", vec![4, 4, 4]).unwrap();
        let mut bytes = Vec::new();
        source.write_archive(&mut bytes).unwrap();

        let mut target = genetics();
        assert_eq!(target.read_archive(bytes.as_slice()).unwrap(), 1);
        let restored = target.genome_by_hash(genome.hash_code()).unwrap();
        // the store plus `restored`
        assert_eq!(restored.holders(), 2);
        drop(restored);
        assert_eq!(target.compact(), 1);
    }
}
