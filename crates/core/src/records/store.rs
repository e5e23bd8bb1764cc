use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{LineageError, Result};

use super::entity::{Family, Individual};

/// Read-only access to parsed genealogical records.
///
/// Implementors supply the two raw lookups; the lineage operations are
/// derived from them. A lookup that cannot be served because the backing
/// source failed should return [`LineageError::Source`], which traversal
/// propagates unchanged.
pub trait RecordSource {
    /// Fetch an individual by identifier, `Ok(None)` if absent.
    fn individual(&self, id: &str) -> Result<Option<&Individual>>;

    /// Fetch a family by identifier, `Ok(None)` if absent.
    fn family(&self, id: &str) -> Result<Option<&Family>>;

    /// Fetch an individual, failing with `UnknownIndividual` if absent.
    fn lookup(&self, id: &str) -> Result<&Individual> {
        self.individual(id)?
            .ok_or_else(|| LineageError::UnknownIndividual(id.to_string()))
    }

    /// Families in which `id` is recorded as a child, in record order.
    ///
    /// References to families missing from the source are skipped.
    fn parent_families(&self, id: &str) -> Result<Vec<&Family>> {
        let individual = self.lookup(id)?;
        let mut families = Vec::with_capacity(individual.child_of.len());
        for family_id in &individual.child_of {
            match self.family(family_id)? {
                Some(family) => families.push(family),
                None => log::warn!(
                    "Individual '{}' references missing family '{}'",
                    id,
                    family_id
                ),
            }
        }
        Ok(families)
    }

    /// Parent identifiers of a family, father first.
    fn parents(&self, family_id: &str) -> Result<Vec<&str>> {
        let family = self
            .family(family_id)?
            .ok_or_else(|| LineageError::UnknownFamily(family_id.to_string()))?;
        Ok(family.parents())
    }
}

/// On-disk formats a [`RecordStore`] can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Gedcom,
    Csv,
    Json,
}

impl RecordFormat {
    /// Guess the format from a file extension (`ged`, `csv`, `json`).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ged" | "gedcom" => Some(RecordFormat::Gedcom),
            "csv" => Some(RecordFormat::Csv),
            "json" => Some(RecordFormat::Json),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ged" | "gedcom" => Some(RecordFormat::Gedcom),
            "csv" => Some(RecordFormat::Csv),
            "json" => Some(RecordFormat::Json),
            _ => None,
        }
    }
}

/// In-memory record store.
///
/// Built once from parsed input and only read afterwards, so a shared
/// reference can serve any number of traversals.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    individuals: IndexMap<String, Individual>,
    families: IndexMap<String, Family>,
}

#[derive(Deserialize)]
struct JsonRecords {
    #[serde(default)]
    individuals: Vec<Individual>,
    #[serde(default)]
    families: Vec<Family>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a file in the given format.
    pub fn load<P: AsRef<Path>>(path: P, format: RecordFormat) -> Result<Self> {
        match format {
            RecordFormat::Gedcom => Self::from_gedcom_file(path),
            RecordFormat::Csv => Self::from_csv(path),
            RecordFormat::Json => Self::from_json_file(path),
        }
    }

    pub fn n_individuals(&self) -> usize {
        self.individuals.len()
    }

    pub fn n_families(&self) -> usize {
        self.families.len()
    }

    /// Individuals in insertion order.
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.values()
    }

    /// Families in insertion order.
    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.values()
    }

    /// Add an individual.
    ///
    /// # Errors
    /// Returns `DuplicateRecord` if the identifier is already present.
    pub fn insert_individual(&mut self, individual: Individual) -> Result<()> {
        if self.individuals.contains_key(&individual.id) {
            return Err(LineageError::DuplicateRecord(individual.id));
        }
        self.individuals.insert(individual.id.clone(), individual);
        Ok(())
    }

    /// Add a family.
    ///
    /// # Errors
    /// Returns `DuplicateRecord` if the identifier is already present.
    pub fn insert_family(&mut self, family: Family) -> Result<()> {
        if self.families.contains_key(&family.id) {
            return Err(LineageError::DuplicateRecord(family.id));
        }
        self.families.insert(family.id.clone(), family);
        Ok(())
    }

    /// Individuals with no resolvable parent anywhere in the store.
    pub fn founders(&self) -> Vec<&str> {
        self.individuals
            .values()
            .filter(|ind| {
                !ind.child_of.iter().any(|fid| {
                    self.families
                        .get(fid)
                        .is_some_and(|fam| fam.parents().iter().any(|p| self.individuals.contains_key(*p)))
                })
            })
            .map(|ind| ind.id.as_str())
            .collect()
    }

    /// Parse a store from a JSON document `{ "individuals": [...], "families": [...] }`.
    ///
    /// # Errors
    /// Returns an error on malformed JSON or duplicate identifiers.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: JsonRecords = serde_json::from_str(json)?;
        let mut store = Self::new();
        for individual in records.individuals {
            store.insert_individual(individual)?;
        }
        for family in records.families {
            store.insert_family(family)?;
        }
        store.reconcile();
        Ok(store)
    }

    /// Read a JSON record file. See [`RecordStore::from_json_str`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Make family membership symmetric.
    ///
    /// Family parent/child lists imply `spouse_of`/`child_of` entries on the
    /// individuals, and a family's marriage event is copied onto spouses
    /// that have none of their own. Dangling ids are left alone.
    pub fn reconcile(&mut self) {
        for family in self.families.values() {
            for parent in family.parents() {
                if let Some(ind) = self.individuals.get_mut(parent) {
                    ind.spouse_of.insert(family.id.clone());
                    if ind.marriage.is_none() {
                        ind.marriage = family.marriage.clone();
                    }
                }
            }
            for child in &family.children {
                if let Some(ind) = self.individuals.get_mut(child) {
                    ind.child_of.insert(family.id.clone());
                }
            }
        }
    }
}

impl RecordSource for RecordStore {
    fn individual(&self, id: &str) -> Result<Option<&Individual>> {
        Ok(self.individuals.get(id))
    }

    fn family(&self, id: &str) -> Result<Option<&Family>> {
        Ok(self.families.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::entity::LifeEvent;

    fn small_store() -> RecordStore {
        let mut store = RecordStore::new();
        store.insert_individual(Individual::new("C", "Child").child_of("F1")).unwrap();
        store.insert_individual(Individual::new("D", "Dad")).unwrap();
        store.insert_individual(Individual::new("M", "Mum")).unwrap();
        let mut fam = Family::new("F1").with_father("D").with_mother("M").with_child("C");
        fam.marriage = Some(LifeEvent::new(Some("1950"), None));
        store.insert_family(fam).unwrap();
        store.reconcile();
        store
    }

    #[test]
    fn test_lookup_unknown_individual() {
        let store = small_store();
        let err = store.lookup("nobody").unwrap_err();
        assert!(matches!(err, LineageError::UnknownIndividual(ref id) if id == "nobody"));
    }

    #[test]
    fn test_parent_families_and_parents() {
        let store = small_store();
        let fams = store.parent_families("C").unwrap();
        assert_eq!(fams.len(), 1);
        assert_eq!(fams[0].id, "F1");
        assert_eq!(store.parents("F1").unwrap(), vec!["D", "M"]);
        assert!(store.parent_families("D").unwrap().is_empty());
    }

    #[test]
    fn test_parents_unknown_family() {
        let store = small_store();
        assert!(matches!(
            store.parents("F9"),
            Err(LineageError::UnknownFamily(_))
        ));
    }

    #[test]
    fn test_missing_family_reference_is_skipped() {
        let mut store = RecordStore::new();
        store.insert_individual(Individual::new("X", "").child_of("F404")).unwrap();
        assert!(store.parent_families("X").unwrap().is_empty());
    }

    #[test]
    fn test_reconcile_fills_memberships_and_marriage() {
        let store = small_store();
        let dad = store.lookup("D").unwrap();
        assert!(dad.spouse_of.contains("F1"));
        assert_eq!(
            dad.marriage.as_ref().and_then(|m| m.date.as_deref()),
            Some("1950")
        );
    }

    #[test]
    fn test_duplicate_individual_rejected() {
        let mut store = RecordStore::new();
        store.insert_individual(Individual::new("A", "")).unwrap();
        let err = store.insert_individual(Individual::new("A", "")).unwrap_err();
        assert!(format!("{}", err).contains("Duplicate"), "Error was: {}", err);
    }

    #[test]
    fn test_founders() {
        let store = small_store();
        assert_eq!(store.founders(), vec!["D", "M"]);
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "individuals": [
                {"id": "C", "name": "Child", "gender": "female"},
                {"id": "D", "name": "Dad", "gender": "male",
                 "birth": {"date": "1920", "place": "Bergen"}}
            ],
            "families": [
                {"id": "F1", "father": "D", "children": ["C"]}
            ]
        }"#;
        let store = RecordStore::from_json_str(json).unwrap();
        assert_eq!(store.n_individuals(), 2);
        assert_eq!(store.n_families(), 1);
        assert_eq!(store.parent_families("C").unwrap()[0].id, "F1");
        assert_eq!(store.parents("F1").unwrap(), vec!["D"]);
        let dad = store.lookup("D").unwrap();
        assert_eq!(dad.birth.as_ref().and_then(|b| b.place.as_deref()), Some("Bergen"));
    }

    #[test]
    fn test_from_json_str_malformed() {
        assert!(matches!(
            RecordStore::from_json_str("{ not json"),
            Err(LineageError::Json(_))
        ));
    }

    #[test]
    fn test_record_format_detection() {
        assert_eq!(RecordFormat::from_path("tree.GED"), Some(RecordFormat::Gedcom));
        assert_eq!(RecordFormat::from_path("ped.csv"), Some(RecordFormat::Csv));
        assert_eq!(RecordFormat::from_path("x.json"), Some(RecordFormat::Json));
        assert_eq!(RecordFormat::from_path("noext"), None);
        assert_eq!(RecordFormat::from_name("gedcom"), Some(RecordFormat::Gedcom));
    }
}
