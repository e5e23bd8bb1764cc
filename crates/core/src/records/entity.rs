use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Recorded sex of an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Parse a sex code such as `M`, `F`, `male` or `female`.
    ///
    /// Anything unrecognised maps to [`Gender::Unknown`].
    pub fn from_code(code: &str) -> Self {
        let trimmed = code.trim();
        if trimmed.eq_ignore_ascii_case("m") || trimmed.eq_ignore_ascii_case("male") {
            Gender::Male
        } else if trimmed.eq_ignore_ascii_case("f") || trimmed.eq_ignore_ascii_case("female") {
            Gender::Female
        } else {
            Gender::Unknown
        }
    }

    /// Single-letter code used in reports.
    pub fn code(self) -> char {
        match self {
            Gender::Male => 'M',
            Gender::Female => 'F',
            Gender::Unknown => 'U',
        }
    }
}

/// A dated, placed life event (birth, marriage, death).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeEvent {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
}

impl LifeEvent {
    pub fn new(date: Option<&str>, place: Option<&str>) -> Self {
        Self {
            date: date.map(str::to_string),
            place: place.map(str::to_string),
        }
    }

    /// Whether neither a date nor a place was recorded.
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.place.is_none()
    }

    /// Human-readable `date, place` rendering; `None` when empty.
    pub fn describe(&self) -> Option<String> {
        match (&self.date, &self.place) {
            (Some(d), Some(p)) => Some(format!("{}, {}", d, p)),
            (Some(d), None) => Some(d.clone()),
            (None, Some(p)) => Some(p.clone()),
            (None, None) => None,
        }
    }
}

/// A person in the record store.
///
/// Family memberships are kept in insertion order so that traversal over
/// parent families is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub birth: Option<LifeEvent>,
    #[serde(default)]
    pub marriage: Option<LifeEvent>,
    #[serde(default)]
    pub death: Option<LifeEvent>,
    /// Families in which this individual is a child.
    #[serde(default)]
    pub child_of: IndexSet<String>,
    /// Families in which this individual is a spouse or parent.
    #[serde(default)]
    pub spouse_of: IndexSet<String>,
}

impl Individual {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            gender: Gender::Unknown,
            birth: None,
            marriage: None,
            death: None,
            child_of: IndexSet::new(),
            spouse_of: IndexSet::new(),
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_birth(mut self, event: LifeEvent) -> Self {
        self.birth = Some(event);
        self
    }

    pub fn with_death(mut self, event: LifeEvent) -> Self {
        self.death = Some(event);
        self
    }

    /// Register this individual as a child of `family_id`.
    pub fn child_of(mut self, family_id: &str) -> Self {
        self.child_of.insert(family_id.to_string());
        self
    }

    /// Display name, falling back to the identifier when no name was recorded.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Which parent position of a family a lineage step went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParentSlot {
    Father,
    Mother,
}

impl ParentSlot {
    pub fn code(self) -> char {
        match self {
            ParentSlot::Father => 'F',
            ParentSlot::Mother => 'M',
        }
    }
}

impl fmt::Display for ParentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A family unit: up to two parents and an ordered list of children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: String,
    #[serde(default)]
    pub father: Option<String>,
    #[serde(default)]
    pub mother: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub marriage: Option<LifeEvent>,
}

impl Family {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            father: None,
            mother: None,
            children: Vec::new(),
            marriage: None,
        }
    }

    pub fn with_father(mut self, id: &str) -> Self {
        self.father = Some(id.to_string());
        self
    }

    pub fn with_mother(mut self, id: &str) -> Self {
        self.mother = Some(id.to_string());
        self
    }

    pub fn with_child(mut self, id: &str) -> Self {
        self.children.push(id.to_string());
        self
    }

    /// Parent identifiers in slot order (father first), 0 to 2 entries.
    pub fn parents(&self) -> Vec<&str> {
        self.parent_slots().map(|(_, id)| id).collect()
    }

    /// Parent identifiers paired with the slot they occupy.
    pub fn parent_slots(&self) -> impl Iterator<Item = (ParentSlot, &str)> + '_ {
        let father = self.father.as_deref().map(|id| (ParentSlot::Father, id));
        let mother = self.mother.as_deref().map(|id| (ParentSlot::Mother, id));
        father.into_iter().chain(mother)
    }
}
