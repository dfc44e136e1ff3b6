use crate::engine::{CpModel, LinExpr};

/// Terme pondéré apporté par une règle souple.
#[derive(Debug, Clone)]
pub struct ObjectiveTerm {
    pub rule: &'static str,
    pub label: String,
    pub weight: i64,
    pub expr: LinExpr,
}

/// Accumulateur de coût : chaque règle souple y ajoute ses termes, le
/// pilote de recherche les somme une seule fois en un objectif unique.
#[derive(Debug, Clone, Default)]
pub struct Objective {
    terms: Vec<ObjectiveTerm>,
}

impl Objective {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: Into<String>>(&mut self, rule: &'static str, label: S, weight: i64, expr: LinExpr) {
        self.terms.push(ObjectiveTerm {
            rule,
            label: label.into(),
            weight,
            expr,
        });
    }

    pub fn terms(&self) -> &[ObjectiveTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// `Σ weight * expr` sur tous les termes.
    pub fn total(&self) -> LinExpr {
        self.terms
            .iter()
            .fold(LinExpr::new(), |acc, t| acc + t.expr.clone() * t.weight)
    }

    /// Pose l'objectif de minimisation ; ne fait rien sans terme
    /// (modèle de pure satisfaction).
    pub fn install(&self, model: &mut CpModel) {
        if self.terms.is_empty() {
            return;
        }
        #[cfg(feature = "logging")]
        tracing::debug!(terms = self.terms.len(), "installing accumulated objective");
        model.minimize(self.total());
    }
}
