//! Integration Test: Single Writer of the Pet Model
//!
//! **Policy**: Only the behavior controller mutates the pet model. Every
//! other component reads snapshots or publishes events.
//! **Exceptions**: the pet module itself, test code

use std::path::Path;

use architectural_enforcement::{code_part, report, scan};

const MUTATORS: [&str; 7] = [
    ".set_state(",
    ".set_mood(",
    ".set_action(",
    ".take_expired(",
    ".clear_temporary(",
    ".adjust_energy(",
    ".adjust_happiness(",
];

fn is_writer(path: &Path) -> bool {
    path.ends_with("controller.rs") || path.components().any(|c| c.as_os_str() == "pet")
}

fn is_model_write(path: &Path, lines: &[&str], idx: usize) -> bool {
    if is_writer(path) {
        return false;
    }
    let code = code_part(lines[idx]);
    MUTATORS.iter().any(|m| code.contains(m))
}

#[test]
fn test_only_controller_writes_model() {
    let violations = scan(is_model_write);
    report(
        "CRITICAL: Pet model mutated outside the behavior controller!",
        &["✅ REQUIRED: publish an event and let BehaviorController react"],
        &violations,
    );
}

#[test]
fn test_writer_detection() {
    let lines = vec!["    model.set_mood(Mood::Happy);"];
    assert!(is_model_write(Path::new("engine/daemon/src/console.rs"), &lines, 0));
    assert!(!is_model_write(Path::new("engine/core/src/controller.rs"), &lines, 0));
    assert!(!is_model_write(Path::new("engine/core/src/pet/model.rs"), &lines, 0));
}
