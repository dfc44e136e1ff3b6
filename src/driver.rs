use crate::compiler::{CompiledModel, Grid};
use crate::engine::{
    Engine, EngineError, ParamError, PumpkinEngine, SearchControl, SearchParameters, SearchStats,
    Solution, SolutionObserver, SolveStatus,
};
use crate::model::{Assignment, SlotAssignment};
use crate::spec::{ScheduleSpec, SolverSettings};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("no feasible solution found (status {0})")]
    NoFeasibleSolution(SolveStatus),
    #[error(transparent)]
    InvalidParameter(#[from] ParamError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Compteur de solutions avec seuil d'arrêt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionLimit {
    limit: u64,
    seen: u64,
}

impl SolutionLimit {
    pub fn new(limit: u64) -> Self {
        Self { limit, seen: 0 }
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl SolutionObserver for SolutionLimit {
    fn on_solution(&mut self, _solution: &Solution) -> SearchControl {
        self.seen += 1;
        if self.seen >= self.limit {
            #[cfg(feature = "logging")]
            tracing::info!(limit = self.limit, "stop search after solution limit");
            return SearchControl::Stop;
        }
        SearchControl::Continue
    }
}

/// Résultat d'une recherche réussie.
#[derive(Debug, Clone)]
pub struct Solved {
    pub status: SolveStatus,
    pub assignment: Assignment,
    pub objective: Option<i64>,
    pub stats: SearchStats,
    /// Solutions vues par le compteur, si `solution_limit` était posé.
    pub solutions_seen: Option<u64>,
}

/// Pilote de recherche : possède le modèle compilé le temps d'une exécution.
#[derive(Debug, Clone, Default)]
pub struct SearchDriver<E = PumpkinEngine> {
    engine: E,
}

impl SearchDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: Engine> SearchDriver<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn run(
        &self,
        compiled: CompiledModel,
        spec: &ScheduleSpec,
    ) -> Result<Solved, SolveError> {
        let CompiledModel {
            mut model,
            grid,
            objective,
        } = compiled;
        objective.install(&mut model);

        let params = apply_parameters(&spec.solver)?;
        let mut limit = spec.solver.solution_limit.map(SolutionLimit::new);
        let observer = limit.as_mut().map(|l| l as &mut dyn SolutionObserver);

        let response = self.engine.solve(&model, &params, observer)?;

        #[cfg(feature = "logging")]
        tracing::info!(
            status = %response.status,
            solutions = response.stats.solutions,
            solver_calls = response.stats.solver_calls,
            "search finished"
        );

        let solution = match (response.status.is_success(), response.solution) {
            (true, Some(solution)) => solution,
            _ => return Err(SolveError::NoFeasibleSolution(response.status)),
        };

        Ok(Solved {
            status: response.status,
            assignment: extract_assignment(&grid, &solution, spec),
            objective: solution.objective(),
            stats: response.stats,
            solutions_seen: limit.map(|l| l.seen()),
        })
    }
}

fn apply_parameters(settings: &SolverSettings) -> Result<SearchParameters, ParamError> {
    let mut params = SearchParameters::new();
    for (name, value) in &settings.parameters {
        params.set(name, value)?;
    }
    Ok(params)
}

fn extract_assignment(grid: &Grid, solution: &Solution, spec: &ScheduleSpec) -> Assignment {
    let mut slots = Vec::with_capacity(grid.days() * grid.shifts().len());
    for d in 0..grid.days() {
        for (s, shift) in grid.shifts().iter().enumerate() {
            let nurses = (0..grid.nurses())
                .filter(|&n| solution.bool_value(grid.var(n, d, s)))
                .map(|n| spec.nurses[n].clone())
                .collect();
            slots.push(SlotAssignment {
                day: d,
                shift: shift.clone(),
                nurses,
            });
        }
    }
    Assignment {
        days: grid.days(),
        shifts: grid.shifts().to_vec(),
        nurses: spec.nurses.clone(),
        start_date: spec.horizon.start_date,
        slots,
    }
}
