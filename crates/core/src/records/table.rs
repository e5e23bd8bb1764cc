use std::path::Path;

use indexmap::IndexMap;

use crate::error::{LineageError, Result};

use super::entity::{Family, Gender, Individual, LifeEvent};
use super::store::RecordStore;

impl RecordStore {
    /// Read a pedigree table from a CSV file.
    ///
    /// Expected columns (header required): `id`, `father`, `mother`, plus the
    /// optional `name`, `sex`, `birth` and `death` (dates, kept as written). Unknown parents are coded as `"0"`, `""`,
    /// or `"NA"`. One family is synthesised per distinct (father, mother)
    /// pair, so full siblings share a family.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, required columns are
    /// missing, or duplicate ids are found.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv_reader(reader)
    }

    /// Same as [`RecordStore::from_csv`] but over in-memory text.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();

        let column = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            column(name)
                .ok_or_else(|| LineageError::Source(format!("CSV missing '{}' column", name)))
        };

        let id_col = require("id")?;
        let father_col = require("father")?;
        let mother_col = require("mother")?;
        let name_col = column("name");
        let sex_col = column("sex");
        let birth_col = column("birth");
        let death_col = column("death");

        let mut store = RecordStore::new();
        let mut families: IndexMap<(Option<String>, Option<String>), Family> = IndexMap::new();

        for result in reader.records() {
            let record = result?;
            let field = |col: usize| record.get(col).unwrap_or("");

            let id = field(id_col);
            if id.is_empty() {
                return Err(LineageError::Source("Row with empty id".to_string()));
            }

            let mut individual = Individual::new(id, name_col.map(field).unwrap_or(""));
            if let Some(col) = sex_col {
                individual.gender = Gender::from_code(field(col));
            }
            if let Some(date) = birth_col.map(field).filter(|d| !d.is_empty()) {
                individual = individual.with_birth(LifeEvent::new(Some(date), None));
            }
            if let Some(date) = death_col.map(field).filter(|d| !d.is_empty()) {
                individual = individual.with_death(LifeEvent::new(Some(date), None));
            }

            let father = parse_parent(field(father_col));
            let mother = parse_parent(field(mother_col));
            if father.is_some() || mother.is_some() {
                let next_id = format!("F{}", families.len() + 1);
                let family = families
                    .entry((father.clone(), mother.clone()))
                    .or_insert_with(|| Family {
                        id: next_id,
                        father,
                        mother,
                        children: Vec::new(),
                        marriage: None,
                    });
                family.children.push(id.to_string());
                individual.child_of.insert(family.id.clone());
            }

            store.insert_individual(individual)?;
        }

        for (_, family) in families {
            store.insert_family(family)?;
        }
        store.reconcile();

        log::info!(
            "Parsed pedigree table: {} individuals, {} families",
            store.n_individuals(),
            store.n_families()
        );
        Ok(store)
    }
}

/// Parse a parent field, returning `None` for unknown parents.
///
/// Unknown parents are coded as `"0"`, `""`, `"NA"`, or `"na"`.
fn parse_parent(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("na") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
