#![forbid(unsafe_code)]
use chrono::NaiveDate;
use gardes::engine::SearchStats;
use gardes::io::{export_assignment_csv, export_assignment_json, load_assignment_json};
use gardes::report::render_table;
use gardes::{
    Assignment, ReportRenderer, ShiftId, SlotAssignment, SolveStatus, Solved, TextReport,
};
use std::time::Duration;
use tempfile::tempdir;

fn slot(day: usize, shift: &str, nurses: &[&str]) -> SlotAssignment {
    SlotAssignment {
        day,
        shift: ShiftId::new(shift),
        nurses: nurses.iter().map(|n| n.to_string()).collect(),
    }
}

fn sample() -> Assignment {
    Assignment {
        days: 2,
        shifts: vec![ShiftId::new("M"), ShiftId::new("N")],
        nurses: vec!["Alice".into(), "Bob".into()],
        start_date: None,
        slots: vec![
            slot(0, "M", &["Alice"]),
            slot(0, "N", &["Bob"]),
            slot(1, "M", &["Bob"]),
            slot(1, "N", &[]),
        ],
    }
}

fn solved(assignment: Assignment) -> Solved {
    Solved {
        status: SolveStatus::Feasible,
        assignment,
        objective: Some(3),
        stats: SearchStats {
            solutions: 2,
            solver_calls: 3,
            wall_time: Duration::from_millis(1500),
        },
        solutions_seen: Some(2),
    }
}

#[test]
fn table_pivots_days_against_shifts() {
    insta::assert_snapshot!(render_table(&sample()), @r###"
    Day | M     | N
    ----+-------+----
    0   | Alice | Bob
    1   | Bob   | -
    "###);
}

#[test]
fn table_joins_shared_slots_and_shows_dates() {
    let mut a = sample();
    a.start_date = NaiveDate::from_ymd_opt(2025, 3, 10);
    a.slots[3] = slot(1, "N", &["Alice", "Bob"]);

    insta::assert_snapshot!(render_table(&a), @r###"
    Day        | M     | N
    -----------+-------+----------
    2025-03-10 | Alice | Bob
    2025-03-11 | Bob   | Alice+Bob
    "###);
}

#[test]
fn text_report_lists_slots_then_stats() {
    let out = TextReport::default().render(&solved(sample()));
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "Solution (FEASIBLE):");
    assert_eq!(lines[1], "Day 0, Shift M: Alice");
    assert_eq!(lines[4], "Day 1, Shift N: -");
    assert!(out.contains("Assignment table:"));
    assert!(out.contains("Objective = 3"));
    assert!(out.contains("Solutions seen = 2"));
    assert!(out.ends_with("Stats: Solutions = 2, Solver calls = 3, Wall time = 1.500s\n"));
}

#[test]
fn text_report_can_skip_the_table() {
    let out = TextReport { table: false }.render(&solved(sample()));
    assert!(!out.contains("Assignment table:"));
    assert!(out.contains("Day 1, Shift M: Bob"));
}

#[test]
fn json_export_reloads_the_same_planning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("planning.json");

    let mut a = sample();
    a.start_date = NaiveDate::from_ymd_opt(2025, 1, 6);
    export_assignment_json(&path, &a).unwrap();
    assert!(path.exists());

    let back = load_assignment_json(&path).unwrap();
    assert_eq!(back, a);
    assert_eq!(back.workload("Bob"), 2);
}

#[test]
fn json_export_replaces_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("planning.json");

    export_assignment_json(&path, &sample()).unwrap();
    let mut a = sample();
    a.slots[3] = slot(1, "N", &["Alice"]);
    export_assignment_json(&path, &a).unwrap();

    assert_eq!(load_assignment_json(&path).unwrap().slots[3].nurses, vec!["Alice"]);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn csv_export_has_one_row_per_assigned_nurse() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("planning.csv");

    let mut a = sample();
    a.start_date = NaiveDate::from_ymd_opt(2025, 3, 10);
    export_assignment_csv(&path, &a).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "day,date,shift,nurse",
            "0,2025-03-10,M,Alice",
            "0,2025-03-10,N,Bob",
            "1,2025-03-11,M,Bob",
        ]
    );
}
