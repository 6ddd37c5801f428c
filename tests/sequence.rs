use hydra::Sequence;

#[test]
fn default_is_invalid() {
    let seq = Sequence::default();
    assert_eq!(seq, Sequence::INVALID);
    assert!(seq.is_invalid());
    assert!(!seq.is_valid());
    assert_eq!(seq.value(), -1);
}

#[test]
fn constructed_values_are_valid() {
    for v in [0_i64, 1, 7, i64::MAX] {
        let seq = Sequence::new(v);
        assert!(seq.is_valid());
        assert_eq!(seq.value(), v);
        assert_eq!(seq, Sequence::from(v));
    }
    assert_ne!(Sequence::new(0), Sequence::new(1));
}

#[test]
fn formatting() {
    assert_eq!(Sequence::new(42).to_string(), "#42");
    assert_eq!(Sequence::INVALID.to_string(), "#invalid");
    assert_eq!(format!("{:?}", Sequence::new(3)), "Sequence(3)");
    assert_eq!(format!("{:?}", Sequence::INVALID), "Sequence(INVALID)");
}
