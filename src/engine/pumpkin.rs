use super::model::{Constraint, CpModel, LinExpr, VarId};
use super::{
    Engine, EngineError, SearchControl, SearchParameters, SearchStats, Solution, SolutionObserver,
    SolveResponse, SolveStatus,
};
use pumpkin_core::constraints::{self, Constraint as _};
use pumpkin_core::results::{ProblemSolution, SatisfactionResult};
use pumpkin_core::termination::{Indefinite, TerminationCondition, TimeBudget};
use pumpkin_core::variables::{DomainId, TransformableVariable};
use pumpkin_core::Solver;
use std::time::{Duration, Instant};

/// Moteur adossé au solveur CP Pumpkin.
///
/// Chaque appel au solveur travaille sur une instance fraîche construite à
/// partir du [`CpModel`]. Avec un objectif, chaque solution ajoute la coupe
/// `objectif <= meilleur - 1` avant l'appel suivant (sat-unsat linéaire). En
/// énumération, chaque solution est exclue par une contrainte de blocage sur
/// les variables 0/1.
#[derive(Debug, Clone, Copy, Default)]
pub struct PumpkinEngine;

impl PumpkinEngine {
    pub fn new() -> Self {
        Self
    }
}

/// `Σ coef * var <= hi`, seule forme postée au solveur.
#[derive(Debug, Clone)]
struct Row {
    terms: Vec<(usize, i32)>,
    hi: i32,
}

/// Modèle réduit aux bornes 32 bits et aux lignes `<=`.
#[derive(Debug)]
struct Lowered {
    bounds: Vec<(i32, i32)>,
    rows: Vec<Row>,
}

enum Outcome {
    Solution(Vec<i64>),
    Exhausted,
    Unknown,
}

impl Engine for PumpkinEngine {
    fn solve(
        &self,
        model: &CpModel,
        params: &SearchParameters,
        mut observer: Option<&mut dyn SolutionObserver>,
    ) -> Result<SolveResponse, EngineError> {
        let started = Instant::now();
        let deadline = params.max_time.and_then(|limit| started.checked_add(limit));
        let lowered = Lowered::from_model(model)?;
        let objective = model.objective();

        #[cfg(feature = "logging")]
        if let Some(workers) = params.num_workers {
            tracing::debug!(workers, "engine runs single-threaded");
        }

        let mut extra: Vec<Row> = Vec::new();
        let mut stats = SearchStats::default();
        let mut best: Option<Solution> = None;

        let status = loop {
            let budget = match deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(left) if !left.is_zero() => Some(left),
                    _ => break timed_out(&best),
                },
                None => None,
            };

            stats.solver_calls += 1;
            let values = match lowered.run(&extra, budget) {
                Outcome::Solution(values) => values,
                Outcome::Exhausted if best.is_some() => break SolveStatus::Optimal,
                Outcome::Exhausted => break SolveStatus::Infeasible,
                Outcome::Unknown => break timed_out(&best),
            };

            stats.solutions += 1;
            let value = objective.map(|obj| obj.eval(&values));
            let solution = Solution::new(values, value);

            #[cfg(feature = "logging")]
            if params.log_search_progress {
                tracing::info!(solutions = stats.solutions, objective = ?value, "solution found");
            }

            let control = match observer.as_mut() {
                Some(observer) => observer.on_solution(&solution),
                None => SearchControl::Continue,
            };

            let next = match (objective, value) {
                (Some(obj), Some(value)) => Some(objective_cut(obj, value)?),
                _ if params.enumerate_all_solutions => lowered.blocking_row(solution.values()),
                _ => None,
            };
            best = Some(solution);

            match next {
                None => break SolveStatus::Optimal,
                Some(_) if control == SearchControl::Stop => break SolveStatus::Feasible,
                Some(row) => extra.push(row),
            }
        };

        stats.wall_time = started.elapsed();
        Ok(SolveResponse {
            status,
            solution: best,
            stats,
        })
    }
}

fn timed_out(best: &Option<Solution>) -> SolveStatus {
    if best.is_some() {
        SolveStatus::Feasible
    } else {
        SolveStatus::Unknown
    }
}

fn narrow(value: i64, what: &'static str) -> Result<i32, EngineError> {
    i32::try_from(value).map_err(|_| EngineError::OutOfRange { what, value })
}

fn row(terms: &[(VarId, i64)], sign: i64, hi: i64) -> Result<Row, EngineError> {
    let terms = terms
        .iter()
        .map(|&(var, coef)| Ok((var.index(), narrow(sign * coef, "coefficient")?)))
        .collect::<Result<Vec<_>, EngineError>>()?;
    Ok(Row {
        terms,
        hi: narrow(hi, "bound")?,
    })
}

fn objective_cut(objective: &LinExpr, value: i64) -> Result<Row, EngineError> {
    row(&objective.normalized(), 1, value - 1 - objective.offset())
}

impl Lowered {
    fn from_model(model: &CpModel) -> Result<Self, EngineError> {
        let bounds = model
            .vars
            .iter()
            .map(|v| Ok((narrow(v.lo, "domain")?, narrow(v.hi, "domain")?)))
            .collect::<Result<Vec<_>, EngineError>>()?;

        let mut rows = Vec::with_capacity(model.constraints.len());
        for constraint in &model.constraints {
            match constraint {
                Constraint::Linear { terms, lo, hi } => {
                    if let Some(hi) = hi {
                        rows.push(row(terms, 1, *hi)?);
                    }
                    if let Some(lo) = lo {
                        rows.push(row(terms, -1, -lo)?);
                    }
                }
                // Sur des variables 0/1 : t >= x_i pour tout i, et t <= Σ x_i.
                Constraint::MaxEquality { target, vars } => {
                    for var in vars {
                        rows.push(row(&[(*var, 1), (*target, -1)], 1, 0)?);
                    }
                    let mut upper = vec![(*target, 1)];
                    upper.extend(vars.iter().map(|var| (*var, -1)));
                    rows.push(row(&upper, 1, 0)?);
                }
            }
        }
        Ok(Self { bounds, rows })
    }

    /// Exclut exactement l'affectation `values` des variables 0/1.
    fn blocking_row(&self, values: &[i64]) -> Option<Row> {
        let mut terms = Vec::new();
        let mut ones = 0;
        for (index, (&bounds, &value)) in self.bounds.iter().zip(values).enumerate() {
            if bounds != (0, 1) {
                continue;
            }
            if value == 1 {
                terms.push((index, 1));
                ones += 1;
            } else {
                terms.push((index, -1));
            }
        }
        if terms.is_empty() {
            return None;
        }
        Some(Row { terms, hi: ones - 1 })
    }

    fn run(&self, extra: &[Row], budget: Option<Duration>) -> Outcome {
        if self.bounds.iter().any(|(lo, hi)| lo > hi) {
            return Outcome::Exhausted;
        }

        let mut solver = Solver::default();
        let tag = solver.new_constraint_tag();
        let vars: Vec<DomainId> = self
            .bounds
            .iter()
            .map(|&(lo, hi)| solver.new_bounded_integer(lo, hi))
            .collect();

        for row in self.rows.iter().chain(extra) {
            if row.terms.is_empty() {
                if row.hi < 0 {
                    return Outcome::Exhausted;
                }
                continue;
            }
            let terms: Vec<_> = row
                .terms
                .iter()
                .map(|&(var, coef)| vars[var].scaled(coef))
                .collect();
            // un échec à la racine signifie une contradiction immédiate
            if constraints::less_than_or_equals(terms, row.hi, tag)
                .post(&mut solver)
                .is_err()
            {
                return Outcome::Exhausted;
            }
        }

        match budget {
            Some(budget) => search(&mut solver, &vars, &mut TimeBudget::starting_now(budget)),
            None => search(&mut solver, &vars, &mut Indefinite),
        }
    }
}

fn search<T: TerminationCondition>(
    solver: &mut Solver,
    vars: &[DomainId],
    termination: &mut T,
) -> Outcome {
    let mut brancher = solver.default_brancher();
    let outcome = match solver.satisfy(&mut brancher, termination) {
        SatisfactionResult::Satisfiable(satisfiable) => {
            let solution = satisfiable.solution();
            Outcome::Solution(
                vars.iter()
                    .map(|&var| i64::from(solution.get_integer_value(var)))
                    .collect(),
            )
        }
        SatisfactionResult::Unsatisfiable(..) => Outcome::Exhausted,
        SatisfactionResult::Unknown(..) => Outcome::Unknown,
    };
    outcome
}
