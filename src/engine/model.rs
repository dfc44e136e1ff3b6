use std::ops::{Add, Mul, Sub};

/// Index d'une variable dans un [`CpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Variable booléenne (domaine {0, 1}).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolVar(VarId);

impl BoolVar {
    pub fn id(self) -> VarId {
        self.0
    }
}

/// Variable entière bornée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntVar(VarId);

impl IntVar {
    pub fn id(self) -> VarId {
        self.0
    }
}

/// Expression linéaire `constant + Σ coef * var`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinExpr {
    terms: Vec<(VarId, i64)>,
    constant: i64,
}

impl LinExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// Somme de variables (coefficient 1).
    pub fn sum<I, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<LinExpr>,
    {
        vars.into_iter().fold(LinExpr::new(), |acc, v| acc + v)
    }

    pub fn term(mut self, var: VarId, coef: i64) -> Self {
        self.terms.push((var, coef));
        self
    }

    pub fn terms(&self) -> &[(VarId, i64)] {
        &self.terms
    }

    pub fn offset(&self) -> i64 {
        self.constant
    }

    /// Fusionne les doublons et retire les coefficients nuls.
    pub(crate) fn normalized(&self) -> Vec<(VarId, i64)> {
        let mut terms = self.terms.clone();
        terms.sort_by_key(|(v, _)| *v);
        let mut out: Vec<(VarId, i64)> = Vec::with_capacity(terms.len());
        for (var, coef) in terms {
            match out.last_mut() {
                Some((last, acc)) if *last == var => *acc += coef,
                _ => out.push((var, coef)),
            }
        }
        out.retain(|(_, coef)| *coef != 0);
        out
    }

    /// Évalue l'expression sur une affectation complète.
    pub fn eval(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, (v, c)| acc + c * values[v.index()])
    }
}

impl From<BoolVar> for LinExpr {
    fn from(var: BoolVar) -> Self {
        LinExpr::new().term(var.id(), 1)
    }
}

impl From<IntVar> for LinExpr {
    fn from(var: IntVar) -> Self {
        LinExpr::new().term(var.id(), 1)
    }
}

impl From<i64> for LinExpr {
    fn from(value: i64) -> Self {
        LinExpr::constant(value)
    }
}

impl<T: Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: T) -> LinExpr {
        let rhs: LinExpr = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: T) -> LinExpr {
        let rhs: LinExpr = rhs.into();
        self + rhs * -1
    }
}

impl Mul<i64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, k: i64) -> LinExpr {
        for (_, coef) in &mut self.terms {
            *coef *= k;
        }
        self.constant *= k;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct VarDecl {
    pub(crate) name: String,
    pub(crate) lo: i64,
    pub(crate) hi: i64,
}

/// Contrainte postée dans le modèle.
#[derive(Debug, Clone)]
pub(crate) enum Constraint {
    /// `lo <= Σ coef * var <= hi` (borne absente = non bornée).
    Linear {
        terms: Vec<(VarId, i64)>,
        lo: Option<i64>,
        hi: Option<i64>,
    },
    /// `target == max(vars)`.
    MaxEquality { target: VarId, vars: Vec<VarId> },
}

/// Modèle de contraintes : variables bornées, contraintes, objectif unique.
///
/// `minimize` remplace l'objectif courant ; l'accumulation de plusieurs
/// termes se fait en amont (voir `compiler::Objective`).
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    pub(crate) vars: Vec<VarDecl>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Option<LinExpr>,
}

impl CpModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_var(&mut self, name: String, lo: i64, hi: i64) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(VarDecl { name, lo, hi });
        id
    }

    pub fn new_bool_var<S: Into<String>>(&mut self, name: S) -> BoolVar {
        BoolVar(self.push_var(name.into(), 0, 1))
    }

    /// Crée une variable entière de domaine `[lo, hi]`.
    pub fn new_int_var<S: Into<String>>(&mut self, lo: i64, hi: i64, name: S) -> IntVar {
        IntVar(self.push_var(name.into(), lo, hi))
    }

    pub fn add_exactly_one<I: IntoIterator<Item = BoolVar>>(&mut self, lits: I) {
        self.add_linear_range(LinExpr::sum(lits), Some(1), Some(1));
    }

    pub fn add_at_most_one<I: IntoIterator<Item = BoolVar>>(&mut self, lits: I) {
        self.add_linear_range(LinExpr::sum(lits), None, Some(1));
    }

    /// `lo <= expr <= hi`.
    pub fn add_linear_range(&mut self, expr: LinExpr, lo: Option<i64>, hi: Option<i64>) {
        let shift = expr.offset();
        self.constraints.push(Constraint::Linear {
            terms: expr.normalized(),
            lo: lo.map(|l| l - shift),
            hi: hi.map(|h| h - shift),
        });
    }

    pub fn add_le<E: Into<LinExpr>>(&mut self, expr: E, rhs: i64) {
        self.add_linear_range(expr.into(), None, Some(rhs));
    }

    pub fn add_ge<E: Into<LinExpr>>(&mut self, expr: E, rhs: i64) {
        self.add_linear_range(expr.into(), Some(rhs), None);
    }

    /// `left == right`.
    pub fn add_equality<L: Into<LinExpr>, R: Into<LinExpr>>(&mut self, left: L, right: R) {
        let left: LinExpr = left.into();
        self.add_linear_range(left - right, Some(0), Some(0));
    }

    /// `target == max(lits)` ; une liste vide force `target` à 0.
    pub fn add_max_equality<I: IntoIterator<Item = BoolVar>>(&mut self, target: BoolVar, lits: I) {
        let vars: Vec<VarId> = lits.into_iter().map(BoolVar::id).collect();
        if vars.is_empty() {
            self.add_le(target, 0);
            return;
        }
        self.constraints.push(Constraint::MaxEquality {
            target: target.id(),
            vars,
        });
    }

    pub fn minimize<E: Into<LinExpr>>(&mut self, expr: E) {
        self.objective = Some(expr.into());
    }

    pub fn objective(&self) -> Option<&LinExpr> {
        self.objective.as_ref()
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn var_name(&self, var: VarId) -> Option<&str> {
        self.vars.get(var.index()).map(|v| v.name.as_str())
    }

    pub fn bounds(&self, var: VarId) -> Option<(i64, i64)> {
        self.vars.get(var.index()).map(|v| (v.lo, v.hi))
    }
}
