use std::process::{Command, Output};

use philosophers::{Status, testing::Line};

fn philo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_philo"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run philo")
}

#[test]
fn test_margin_is_enforced() {
    let output = philo(&["1", "200", "100", "100"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("300"), "{stderr}");
}

#[test]
fn test_single_philosopher_dies() {
    let output = philo(&["1", "300", "100", "100"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().map(|l| Line::parse(l).unwrap()).collect();
    let statuses: Vec<_> = lines.iter().map(|l| l.status).collect();
    assert_eq!(
        statuses,
        vec![
            Some(Status::Thinking),
            Some(Status::TakenFork),
            Some(Status::Died)
        ]
    );
    assert!(lines[2].timestamp >= 300);
    assert!(output.stderr.is_empty());
}

#[test]
fn test_meal_target_exits_successfully() {
    let output = philo(&["3", "400", "50", "50", "2"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let last = stdout.lines().last().unwrap();
    assert!(
        last.ends_with("All philosophers have eaten 2 times"),
        "{last}"
    );
    assert!(!stdout.contains("died"));
}

#[test]
fn test_invalid_arguments_fail() {
    let cases: [&[&str]; 5] = [
        &["5", "800", "200"],
        &["5", "800", "200", "200", "7", "9"],
        &["0", "800", "200", "200"],
        &["5", "800", "abc", "200"],
        &["5", "800", "200", "200", "0"],
    ];
    for args in cases {
        let output = philo(args);
        assert!(!output.status.success(), "accepted {args:?}");
        assert!(output.stdout.is_empty(), "printed for {args:?}");
    }
}
