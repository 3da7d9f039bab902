//! Integration tests for saving and restoring the genome store.

use plasmogen_genetics::prelude::*;
use tempfile::tempdir;

fn config() -> GeneticsConfig {
    GeneticsConfig {
        var_gene_randomness: VarGeneRandomness::AllRandom,
        barcode_locations: vec![100_000, 200_000, 700_000, 1_700_000],
        drug_resistant_locations: vec![300_000],
        hrp_locations: vec![2_500_000],
        ..GeneticsConfig::default()
    }
}

#[test]
fn test_archive_roundtrip_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("genomes.bin");

    let mut source = ParasiteGenetics::new(&config()).unwrap();
    let n = source.registry().num_base_pairs();
    let first = source.create_genome("ACGT", vec![5; n]).unwrap();
    let second = source.create_genome("TTGA", vec![9; n]).unwrap();
    source.create_genome("CCCC", vec![1; n]).unwrap();
    source.save_archive(&path).unwrap();

    let mut target = ParasiteGenetics::new(&config()).unwrap();
    assert_eq!(target.load_archive(&path).unwrap(), 2);

    for original in [&first, &second] {
        let restored = target.genome_by_hash(original.hash_code()).unwrap();
        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.barcode_hash_code(), original.barcode_hash_code());
        assert_eq!(
            restored.barcode(target.registry()),
            original.barcode(source.registry())
        );
        assert_eq!(
            restored.drug_resistant_string(target.registry()),
            original.drug_resistant_string(source.registry())
        );
        assert_eq!(
            restored.hrp_string(target.registry()),
            original.hrp_string(source.registry())
        );
        assert_eq!(restored.nucleotide_sequence(), original.nucleotide_sequence());
        assert_eq!(restored.allele_roots(), original.allele_roots());
    }

    // IDs continue after the last one handed out before saving
    let next = target.create_genome("GGGG", vec![2; n]).unwrap();
    assert_eq!(next.id(), 4);
}

#[test]
fn test_archive_from_other_layout_is_rejected() {
    let mut source = ParasiteGenetics::new(&config()).unwrap();
    let n = source.registry().num_base_pairs();
    let _held = source.create_genome("ACGT", vec![5; n]).unwrap();
    let mut bytes = Vec::new();
    source.write_archive(&mut bytes).unwrap();

    let mut target = ParasiteGenetics::new(&GeneticsConfig {
        barcode_locations: vec![100_000, 200_000, 700_000],
        ..config()
    })
    .unwrap();
    assert!(matches!(
        target.read_archive(bytes.as_slice()),
        Err(ArchiveError::LengthMismatch { .. })
    ));
}

#[test]
fn test_truncated_archive_is_an_encoding_error() {
    let mut source = ParasiteGenetics::new(&config()).unwrap();
    let n = source.registry().num_base_pairs();
    let _held = source.create_genome("ACGT", vec![5; n]).unwrap();
    let mut bytes = Vec::new();
    source.write_archive(&mut bytes).unwrap();
    bytes.truncate(bytes.len() / 2);

    let mut target = ParasiteGenetics::new(&config()).unwrap();
    assert!(target.read_archive(bytes.as_slice()).is_err());
}
