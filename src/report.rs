use crate::driver::Solved;
use crate::model::Assignment;
use std::fmt::Write;

/// Permet de customiser le rendu d'un planning résolu (texte, markdown, ...).
pub trait ReportRenderer {
    fn render(&self, solved: &Solved) -> String;
}

/// Rendu texte : une ligne par créneau, tableau croisé jours × gardes,
/// statistiques de recherche.
#[derive(Debug, Clone, Copy)]
pub struct TextReport {
    pub table: bool,
}

impl Default for TextReport {
    fn default() -> Self {
        Self { table: true }
    }
}

impl ReportRenderer for TextReport {
    fn render(&self, solved: &Solved) -> String {
        let a = &solved.assignment;
        let mut out = String::new();

        let _ = writeln!(out, "Solution ({}):", solved.status);
        for slot in &a.slots {
            let _ = writeln!(
                out,
                "{}, Shift {}: {}",
                day_label(a, slot.day),
                slot.shift,
                join_or_dash(&slot.nurses, ", ")
            );
        }

        if self.table {
            let _ = writeln!(out, "\nAssignment table:");
            let _ = writeln!(out, "{}", render_table(a));
        }

        if let Some(objective) = solved.objective {
            let _ = writeln!(out, "\nObjective = {objective}");
        }
        if let Some(seen) = solved.solutions_seen {
            let _ = writeln!(out, "Solutions seen = {seen}");
        }
        let _ = writeln!(
            out,
            "\nStats: Solutions = {}, Solver calls = {}, Wall time = {:.3}s",
            solved.stats.solutions,
            solved.stats.solver_calls,
            solved.stats.wall_time.as_secs_f64()
        );
        out
    }
}

fn day_label(a: &Assignment, day: usize) -> String {
    match a.date_of(day) {
        Some(date) => format!("Day {day} ({date})"),
        None => format!("Day {day}"),
    }
}

fn join_or_dash(nurses: &[String], sep: &str) -> String {
    if nurses.is_empty() {
        "-".to_string()
    } else {
        nurses.join(sep)
    }
}

/// Tableau croisé : une ligne par jour, une colonne par garde.
pub fn render_table(a: &Assignment) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(a.days + 1);
    rows.push(
        std::iter::once("Day".to_string())
            .chain(a.shifts.iter().map(|s| s.to_string()))
            .collect(),
    );
    for day in 0..a.days {
        let label = match a.date_of(day) {
            Some(date) => date.to_string(),
            None => day.to_string(),
        };
        let cells = a.shifts.iter().map(|shift| {
            a.slot(day, shift)
                .map(|slot| join_or_dash(&slot.nurses, "+"))
                .unwrap_or_else(|| "-".to_string())
        });
        rows.push(std::iter::once(label).chain(cells).collect());
    }

    let widths: Vec<usize> = (0..=a.shifts.len())
        .map(|col| {
            rows.iter()
                .map(|r| r[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |row: &[String]| {
        row.iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(line(rows[0].as_slice()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows[1..].iter().map(|r| line(r.as_slice())));
    lines.join("\n")
}
