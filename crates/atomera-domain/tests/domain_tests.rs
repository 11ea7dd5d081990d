use atomera_domain::{classify, fingerprint_bytes, rank_pockets, sort_hits, validate_fasta, validate_file, Confidence,
                     FastaRules, FileRules, Hit, Pocket, ResidueRef, StageId, Suitability, TargetCategory};

#[test]
fn fasta_length_bounds_are_inclusive() {
    let rules = FastaRules::default();
    assert!(validate_fasta(&format!(">p\n{}", "A".repeat(20)), &rules).is_valid);
    assert!(!validate_fasta(&format!(">p\n{}", "A".repeat(19)), &rules).is_valid);
    assert!(validate_fasta(&format!(">p\n{}", "A".repeat(2500)), &rules).is_valid);
    assert!(!validate_fasta(&format!(">p\n{}", "A".repeat(2501)), &rules).is_valid);
}

#[test]
fn ambiguous_residues_warn_but_invalid_characters_fail() {
    let rules = FastaRules::default();
    let ok = validate_fasta(&format!(">p\n{}X", "A".repeat(30)), &rules);
    assert!(ok.is_valid);
    assert_eq!(ok.ambiguous_residues, vec!['X']);
    assert!(!ok.warnings.is_empty());

    let bad = validate_fasta(&format!(">p\n{}1@", "A".repeat(30)), &rules);
    assert!(!bad.is_valid);
    assert!(bad.errors.iter().any(|e| e == "Invalid characters: 1, @"));
}

#[test]
fn file_rules_accept_structure_formats_only() {
    let rules = FileRules::default();
    assert!(validate_file("model.CIF", 1024, &rules).is_valid);
    let txt = validate_file("notes.txt", 1024, &rules);
    assert!(!txt.is_valid);
    assert!(txt.errors[0].starts_with("Unsupported file format '.txt'"));
    assert!(!validate_file("empty.pdb", 0, &rules).is_valid);
}

#[test]
fn classification_thresholds() {
    assert_eq!(classify(30).category, TargetCategory::Peptide);
    assert_eq!(classify(30).suitability, Suitability::Limited);
    assert_eq!(classify(1501).suitability, Suitability::Unsuitable);
    assert_eq!(serde_json::to_value(classify(300)).unwrap()["type"], "Standard Protein");
}

#[test]
fn pockets_rank_by_score_and_hits_sort_ascending() {
    let p = |id: &str, score: f64| Pocket { id: id.into(),
                                           rank: 0,
                                           score,
                                           volume: 300.0,
                                           residues: vec![ResidueRef::new(10, "A", "SER")] };
    let ranked = rank_pockets(vec![p("a", 0.4), p("b", 0.9), p("c", 0.6)]);
    assert_eq!(ranked.iter().map(|p| (p.id.as_str(), p.rank)).collect::<Vec<_>>(),
               vec![("b", 1), ("c", 2), ("a", 3)]);

    let h = |id: &str, score: f64| Hit { id: id.into(),
                                        name: id.into(),
                                        score,
                                        confidence: Confidence::from_score(score),
                                        pose: None };
    let mut hits = vec![h("x", -6.1), h("y", -10.2), h("z", -8.0)];
    sort_hits(&mut hits);
    assert_eq!(hits.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), vec!["y", "z", "x"]);
    assert_eq!(hits[0].confidence, Confidence::High);
    assert_eq!(hits[1].confidence, Confidence::Medium);
}

#[test]
fn stage_ids_round_trip_through_text() {
    for stage in StageId::ALL {
        assert_eq!(stage.as_str().parse::<StageId>().unwrap(), stage);
    }
    assert_eq!(fingerprint_bytes(b"abc").len(), 64);
}
