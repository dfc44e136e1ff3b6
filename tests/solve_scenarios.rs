#![forbid(unsafe_code)]
use gardes::compiler::workload_band;
use gardes::engine::{CpModel, ParamError, SearchParameters, SolutionObserver, SolveResponse};
use gardes::{
    compile, solve, Assignment, Dimension, Engine, EngineError, Error, Rule, RuleKind, ScheduleSpec,
    SearchDriver, ShiftId, SolveError, SolveStatus,
};
use serde_yaml::Value;

fn ward(nurses: usize, days: usize, shifts: &[&str]) -> ScheduleSpec {
    let names = (0..nurses).map(|i| format!("N{i}")).collect();
    ScheduleSpec::new(days, shifts, names)
}

fn covered(spec: ScheduleSpec) -> ScheduleSpec {
    spec.with_rule(Rule::hard(RuleKind::AssignExactlyOne))
}

fn exclusive(spec: ScheduleSpec) -> ScheduleSpec {
    covered(spec).with_rule(Rule::hard(RuleKind::AtMostOne {
        dimension: Dimension::Shift,
    }))
}

fn shifts_on(a: &Assignment, nurse: &str, day: usize) -> usize {
    a.slots
        .iter()
        .filter(|s| s.day == day && s.nurses.iter().any(|n| n == nurse))
        .count()
}

fn count_of(a: &Assignment, nurse: &str, shift: &str) -> usize {
    a.slots
        .iter()
        .filter(|s| s.shift == ShiftId::new(shift) && s.nurses.iter().any(|n| n == nurse))
        .count()
}

#[test]
fn coverage_fills_every_slot_exactly_once() {
    let solved = solve(&covered(ward(3, 2, &["M", "N"]))).unwrap();

    assert_eq!(solved.status, SolveStatus::Optimal);
    assert_eq!(solved.objective, None);
    assert_eq!(solved.assignment.slots.len(), 4);
    assert!(solved.assignment.slots.iter().all(|s| s.nurses.len() == 1));
}

#[test]
fn exclusion_prevents_double_booking() {
    let solved = solve(&exclusive(ward(3, 2, &["M", "N"]))).unwrap();

    let a = &solved.assignment;
    assert!(a.slots.iter().all(|s| s.nurses.len() == 1));
    for nurse in &a.nurses {
        for day in 0..a.days {
            assert!(shifts_on(a, nurse, day) <= 1, "{nurse} double booked on day {day}");
        }
    }
}

#[test]
fn too_few_nurses_is_infeasible() {
    let err = solve(&exclusive(ward(2, 1, &["M", "A", "N"]))).unwrap_err();
    assert!(matches!(
        err,
        Error::Solve(SolveError::NoFeasibleSolution(SolveStatus::Infeasible))
    ));
}

#[test]
fn hard_workload_keeps_everyone_in_band() {
    let spec = exclusive(ward(3, 2, &["M", "N"]))
        .with_rule(Rule::hard(RuleKind::WorkloadBalance { tolerance: 0 }));
    let solved = solve(&spec).unwrap();

    let (lo, hi) = workload_band(2, 2, 3, 0);
    for nurse in &solved.assignment.nurses {
        let load = solved.assignment.workload(nurse) as i64;
        assert!(lo <= load && load <= hi, "{nurse} works {load}");
    }
}

#[test]
fn hard_equalization_splits_nights_evenly() {
    let spec = exclusive(ward(2, 2, &["D", "N"])).with_rule(Rule::hard(
        RuleKind::EqualizedShiftType {
            shift_ids: vec![ShiftId::new("N")],
        },
    ));
    let solved = solve(&spec).unwrap();

    assert_eq!(count_of(&solved.assignment, "N0", "N"), 1);
    assert_eq!(count_of(&solved.assignment, "N1", "N"), 1);
}

#[test]
fn hard_equal_days_rotates_the_single_shift() {
    let spec = covered(ward(3, 3, &["D"])).with_rule(Rule::hard(RuleKind::EqualDaysWorked));
    let solved = solve(&spec).unwrap();

    for nurse in ["N0", "N1", "N2"] {
        assert_eq!(solved.assignment.workload(nurse), 1);
    }
}

fn days_worked(a: &Assignment, nurse: &str) -> usize {
    (0..a.days).filter(|&day| shifts_on(a, nurse, day) > 0).count()
}

#[test]
fn equal_days_counts_distinct_days_not_shifts() {
    // 4 créneaux sur 2 jours pour 3 personnes : un jour travaillé chacune,
    // donc une personne tient les deux gardes d'un même jour.
    let spec = covered(ward(3, 2, &["M", "N"])).with_rule(Rule::hard(RuleKind::EqualDaysWorked));
    let solved = solve(&spec).unwrap();

    let a = &solved.assignment;
    for nurse in &a.nurses {
        assert_eq!(days_worked(a, nurse), 1, "{nurse}");
    }
    let double_booked = a
        .nurses
        .iter()
        .any(|nurse| (0..a.days).any(|day| shifts_on(a, nurse, day) == 2));
    assert!(double_booked);
}

#[test]
fn soft_equal_days_penalizes_a_nurse_working_less_than_the_pivot() {
    // Au plus une garde chacune : deux personnes travaillent, une reste libre.
    // Le coût minimal fait travailler le pivot et laisse une autre personne en dessous.
    let spec = covered(ward(3, 1, &["M", "N"]))
        .with_rule(Rule::hard(RuleKind::WorkloadBalance { tolerance: 0 }))
        .with_rule(Rule::soft(RuleKind::EqualDaysWorked, 3));
    let solved = solve(&spec).unwrap();

    let a = &solved.assignment;
    assert_eq!(solved.status, SolveStatus::Optimal);
    assert_eq!(solved.objective, Some(3));
    assert_eq!(days_worked(a, "N0"), 1);
    assert_eq!(days_worked(a, "N1") + days_worked(a, "N2"), 1);
}

#[test]
fn soft_workload_reaches_zero_penalty_when_balance_is_possible() {
    let spec = covered(ward(2, 2, &["D"]))
        .with_rule(Rule::soft(RuleKind::WorkloadBalance { tolerance: 0 }, 3));
    let solved = solve(&spec).unwrap();

    assert_eq!(solved.status, SolveStatus::Optimal);
    assert_eq!(solved.objective, Some(0));
    assert_eq!(solved.assignment.workload("N0"), 1);
    assert_eq!(solved.assignment.workload("N1"), 1);
}

#[test]
fn soft_equalization_penalizes_both_directions() {
    // Un seul créneau : si le pivot le prend, deux écarts ; sinon un seul.
    let spec = covered(ward(3, 1, &["S"])).with_rule(Rule::soft(
        RuleKind::EqualizedShiftType {
            shift_ids: vec![ShiftId::new("S")],
        },
        4,
    ));
    let solved = solve(&spec).unwrap();

    assert_eq!(solved.status, SolveStatus::Optimal);
    assert_eq!(solved.objective, Some(4));
    assert_eq!(solved.assignment.workload("N0"), 0);
}

#[test]
fn soft_rules_combine_into_one_weighted_sum() {
    let spec = covered(ward(3, 1, &["S"]))
        .with_rule(Rule::soft(
            RuleKind::EqualizedShiftType {
                shift_ids: vec![ShiftId::new("S")],
            },
            2,
        ))
        .with_rule(Rule::soft(RuleKind::EqualDaysWorked, 5));
    let solved = solve(&spec).unwrap();

    // une personne non pivot travaille : 2 * 1 + 5 * 1
    assert_eq!(solved.objective, Some(7));
}

#[test]
fn solution_limit_stops_enumeration() {
    let spec = covered(ward(2, 1, &["M", "N"]))
        .with_parameter("enumerate_all_solutions", Value::Bool(true))
        .with_solution_limit(2);
    let solved = solve(&spec).unwrap();

    assert_eq!(solved.status, SolveStatus::Feasible);
    assert_eq!(solved.solutions_seen, Some(2));
    assert_eq!(solved.stats.solutions, 2);
}

#[test]
fn solution_limit_above_solution_count_sees_them_all() {
    let spec = covered(ward(2, 1, &["M", "N"]))
        .with_parameter("enumerate_all_solutions", Value::Bool(true))
        .with_solution_limit(10);
    let solved = solve(&spec).unwrap();

    assert_eq!(solved.status, SolveStatus::Optimal);
    assert_eq!(solved.solutions_seen, Some(4));
}

#[test]
fn unknown_parameters_pass_through() {
    let spec = covered(ward(2, 1, &["M"]))
        .with_parameter("linearization_level", Value::from(2))
        .with_parameter("max_time_in_seconds", Value::from(5.0));
    assert!(solve(&spec).is_ok());
}

#[test]
fn oversized_time_limit_is_reported() {
    let spec = covered(ward(2, 1, &["M"]))
        .with_parameter("max_time_in_seconds", Value::from(1.0e20));
    assert!(matches!(
        solve(&spec).unwrap_err(),
        Error::Solve(SolveError::InvalidParameter(_))
    ));
}

#[test]
fn mistyped_parameter_is_reported() {
    let spec = covered(ward(2, 1, &["M"]))
        .with_parameter("max_time_in_seconds", Value::String("soon".into()));
    let err = solve(&spec).unwrap_err();
    assert!(matches!(
        err,
        Error::Solve(SolveError::InvalidParameter(ParamError::InvalidValue { ref name, .. }))
            if name == "max_time_in_seconds"
    ));
}

struct GiveUp;

impl Engine for GiveUp {
    fn solve(
        &self,
        _model: &CpModel,
        _params: &SearchParameters,
        _observer: Option<&mut dyn SolutionObserver>,
    ) -> Result<SolveResponse, EngineError> {
        Ok(SolveResponse {
            status: SolveStatus::Unknown,
            solution: None,
            stats: Default::default(),
        })
    }
}

#[test]
fn driver_accepts_another_engine() {
    let spec = covered(ward(2, 1, &["M"]));
    let compiled = compile(&spec).unwrap();
    let err = SearchDriver::with_engine(GiveUp)
        .run(compiled, &spec)
        .unwrap_err();
    assert_eq!(err, SolveError::NoFeasibleSolution(SolveStatus::Unknown));
}

#[test]
fn start_date_flows_into_the_assignment() {
    let yaml = r#"
horizon: { days: 2, shifts: [D], start_date: 2025-12-31 }
resources: { nurses: { list: [Alice] } }
constraints:
  hard:
    - rule: assign_exactly_one
"#;
    let spec = ScheduleSpec::from_yaml_str(yaml).unwrap();
    let solved = solve(&spec).unwrap();
    assert_eq!(
        solved.assignment.date_of(1),
        chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
    );
    assert_eq!(solved.assignment.workload("Alice"), 2);
}
