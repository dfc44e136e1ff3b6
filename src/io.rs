use crate::model::Assignment;
use crate::spec::ScheduleSpec;
use anyhow::Context;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Charge une spécification YAML en précisant le fichier fautif en cas d'erreur.
pub fn load_spec<P: AsRef<Path>>(path: P) -> anyhow::Result<ScheduleSpec> {
    let path = path.as_ref();
    ScheduleSpec::from_yaml_file(path)
        .with_context(|| format!("loading schedule spec {}", path.display()))
}

/// Export CSV: header `day,date,shift,nurse`, une ligne par personne affectée
pub fn export_assignment_csv<P: AsRef<Path>>(path: P, assignment: &Assignment) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["day", "date", "shift", "nurse"])?;
    for slot in &assignment.slots {
        let day = slot.day.to_string();
        let date = assignment
            .date_of(slot.day)
            .map(|d| d.to_string())
            .unwrap_or_default();
        for nurse in &slot.nurses {
            w.write_record([day.as_str(), date.as_str(), slot.shift.as_str(), nurse.as_str()])?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Écrit le planning en JSON via un fichier temporaire renommé en place.
pub fn export_assignment_json<P: AsRef<Path>>(path: P, assignment: &Assignment) -> anyhow::Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, assignment)?;
    tmp.flush()?;
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn load_assignment_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Assignment> {
    let path = path.as_ref();
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}
