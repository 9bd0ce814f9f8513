use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_environment_uses_defaults() {
    let cfg = StageConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, StageConfig::default());
    assert_eq!(cfg.timing(Stage::Verify), StageTiming::new(5, Duration::from_millis(300)));
}

#[test]
fn overrides_apply_per_stage() {
    let cfg = StageConfig::from_lookup(lookup_from(&[
        ("STAGE_UPLOAD_INCREMENT", "25"),
        ("STAGE_TOKENIZE_TICK_MS", " 50 "),
    ]))
    .unwrap();

    assert_eq!(cfg.upload, StageTiming::new(25, Duration::from_millis(200)));
    assert_eq!(cfg.verify, StageTiming::default_for(Stage::Verify));
    assert_eq!(cfg.tokenize, StageTiming::new(4, Duration::from_millis(50)));
}

#[test]
fn unparsable_values_fall_back_to_defaults() {
    let cfg = StageConfig::from_lookup(lookup_from(&[("STAGE_VERIFY_INCREMENT", "fast")])).unwrap();
    assert_eq!(cfg.verify.increment, 5);
}

#[test]
fn zero_increment_is_rejected() {
    let err = StageConfig::from_lookup(lookup_from(&[("STAGE_UPLOAD_INCREMENT", "0")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidIncrement { var: "STAGE_UPLOAD_INCREMENT".into(), value: 0 });
}

#[test]
fn increment_above_one_hundred_is_rejected() {
    let err = StageConfig::from_lookup(lookup_from(&[("STAGE_VERIFY_INCREMENT", "300")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidIncrement { value: 300, .. }));
}

#[test]
fn zero_tick_is_rejected() {
    let err = StageConfig::from_lookup(lookup_from(&[("STAGE_TOKENIZE_TICK_MS", "0")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidTick { var: "STAGE_TOKENIZE_TICK_MS".into(), value: 0 });
    assert_eq!(err.to_string(), "STAGE_TOKENIZE_TICK_MS must be between 1 and 60000 ms, got 0");
}

#[test]
fn tick_above_one_minute_is_rejected() {
    let cfg = StageConfig::from_lookup(lookup_from(&[("STAGE_VERIFY_TICK_MS", "60000")])).unwrap();
    assert_eq!(cfg.verify.tick, MAX_TICK);

    let err = StageConfig::from_lookup(lookup_from(&[("STAGE_VERIFY_TICK_MS", "60001")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidTick { var: "STAGE_VERIFY_TICK_MS".into(), value: 60_001 });

    let huge = u64::MAX.to_string();
    let err = StageConfig::from_lookup(lookup_from(&[("STAGE_UPLOAD_TICK_MS", huge.as_str())])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTick { value: u64::MAX, .. }));
}
