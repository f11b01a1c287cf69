use super::*;

#[test]
fn state_background_colours() {
    assert_eq!(BuildState::Failed.bg_color(), Color::Red);
    assert_eq!(BuildState::Acknowledged.bg_color(), Color::Indexed(167));
    assert_eq!(BuildState::Passed.bg_color(), Color::Green);
    assert_eq!(BuildState::Unknown.bg_color(), Color::Magenta);
}

#[test]
fn state_foreground_is_always_white() {
    for state in [
        BuildState::Failed,
        BuildState::Acknowledged,
        BuildState::Passed,
        BuildState::Unknown,
    ] {
        assert_eq!(state.fg_color(), Color::White);
    }
}

#[test]
fn state_display() {
    assert_eq!(BuildState::Failed.to_string(), "failed");
    assert_eq!(BuildState::Acknowledged.to_string(), "acknowledged");
    assert_eq!(BuildState::Passed.to_string(), "passed");
    assert_eq!(BuildState::Unknown.to_string(), "unknown");
}

#[test]
fn build_new_defaults() {
    let build = Build::new("Nightly", BuildState::Passed);
    assert_eq!(build.name, "Nightly");
    assert!(!build.building);
    assert!(build.acknowledger.is_empty());
}

#[test]
fn successful_update_has_no_error() {
    let update = BuildUpdate::builds(vec![Build::new("a", BuildState::Failed)]);
    assert!(!update.is_error());
    assert_eq!(update.builds.len(), 1);
}

#[test]
fn failed_update_has_no_builds() {
    let update = BuildUpdate::failed(UpdateError::Parse("bad".to_string()));
    assert!(update.is_error());
    assert!(update.builds.is_empty());
}
