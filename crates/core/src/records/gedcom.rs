//! Line-oriented GEDCOM 5.5 reader.
//!
//! Only the subset needed for lineage work is interpreted: `INDI` records
//! (name, sex, birth/marriage/death, family links) and `FAM` records
//! (husband, wife, children, marriage). Every other tag is skipped.
//! Cross-reference pointers are stored without their `@` delimiters, so
//! `@I1@` becomes `I1`.

use std::path::Path;

use crate::error::{LineageError, Result};

use super::entity::{Family, Gender, Individual, LifeEvent};
use super::store::RecordStore;

/// One parsed GEDCOM line: `level [@xref@] TAG [value]`.
#[derive(Debug, PartialEq)]
struct GedcomLine<'a> {
    level: usize,
    xref: Option<&'a str>,
    tag: &'a str,
    value: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EventKind {
    Birth,
    Marriage,
    Death,
}

enum Pending {
    Individual(Individual),
    Family(Family),
    Skip,
}

impl RecordStore {
    /// Parse GEDCOM text into a record store.
    ///
    /// # Errors
    /// Returns `Gedcom { line, .. }` for a malformed line or a record
    /// without a cross-reference id, and `DuplicateRecord` when two records
    /// share an id.
    pub fn from_gedcom_str(text: &str) -> Result<Self> {
        let mut store = RecordStore::new();
        let mut pending = Pending::Skip;
        let mut event: Option<EventKind> = None;
        let mut prev_level = 0usize;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let raw = if idx == 0 { raw.trim_start_matches('\u{feff}') } else { raw };
            if raw.trim().is_empty() {
                continue;
            }
            let line = parse_line(raw, line_no)?;

            if line.level > prev_level + 1 {
                return Err(LineageError::Gedcom {
                    line: line_no,
                    message: format!(
                        "level jumps from {} to {}",
                        prev_level, line.level
                    ),
                });
            }
            prev_level = line.level;

            if line.level == 0 {
                flush(&mut store, std::mem::replace(&mut pending, Pending::Skip))?;
                event = None;
                pending = match line.tag {
                    "INDI" => Pending::Individual(Individual::new(
                        &require_xref(&line, line_no)?,
                        "",
                    )),
                    "FAM" => Pending::Family(Family::new(&require_xref(&line, line_no)?)),
                    _ => Pending::Skip,
                };
                continue;
            }

            if line.level == 1 {
                event = None;
            }

            match &mut pending {
                Pending::Individual(ind) => apply_individual(ind, &line, &mut event),
                Pending::Family(fam) => apply_family(fam, &line, &mut event),
                Pending::Skip => {}
            }
        }
        flush(&mut store, pending)?;
        store.reconcile();

        log::info!(
            "Parsed GEDCOM: {} individuals, {} families",
            store.n_individuals(),
            store.n_families()
        );
        Ok(store)
    }

    /// Read a GEDCOM file. See [`RecordStore::from_gedcom_str`].
    pub fn from_gedcom_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        Self::from_gedcom_str(&text)
    }
}

fn parse_line(raw: &str, line_no: usize) -> Result<GedcomLine<'_>> {
    let mut rest = raw.trim();
    let (level_str, after) = split_token(rest);
    let level = level_str.parse::<usize>().map_err(|_| LineageError::Gedcom {
        line: line_no,
        message: format!("invalid level '{}'", level_str),
    })?;
    rest = after;

    let mut xref = None;
    if rest.starts_with('@') {
        let (token, after) = split_token(rest);
        xref = Some(strip_pointer(token));
        rest = after;
    }

    let (tag, value) = split_token(rest);
    if tag.is_empty() {
        return Err(LineageError::Gedcom {
            line: line_no,
            message: "missing tag".to_string(),
        });
    }

    Ok(GedcomLine {
        level,
        xref,
        tag,
        value,
    })
}

/// Split off the first whitespace-delimited token.
fn split_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim_start()),
        None => (s, ""),
    }
}

fn strip_pointer(s: &str) -> &str {
    s.trim().trim_matches('@')
}

fn require_xref(line: &GedcomLine<'_>, line_no: usize) -> Result<String> {
    match line.xref {
        Some(x) if !x.is_empty() => Ok(x.to_string()),
        _ => Err(LineageError::Gedcom {
            line: line_no,
            message: format!("{} record without cross-reference id", line.tag),
        }),
    }
}

/// `John /Smith/` -> `John Smith`.
fn clean_name(value: &str) -> String {
    value
        .replace('/', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn apply_event_detail(slot: &mut Option<LifeEvent>, line: &GedcomLine<'_>) {
    let Some(ev) = slot.as_mut() else { return };
    match line.tag {
        "DATE" => ev.date = non_empty(line.value),
        "PLAC" => ev.place = non_empty(line.value),
        _ => {}
    }
}

fn apply_individual(ind: &mut Individual, line: &GedcomLine<'_>, event: &mut Option<EventKind>) {
    if line.level == 1 {
        match line.tag {
            "NAME" if ind.name.is_empty() => ind.name = clean_name(line.value),
            "SEX" => ind.gender = Gender::from_code(line.value),
            "BIRT" => start_event(&mut ind.birth, EventKind::Birth, event),
            "MARR" => start_event(&mut ind.marriage, EventKind::Marriage, event),
            "DEAT" => start_event(&mut ind.death, EventKind::Death, event),
            "FAMC" => {
                ind.child_of.insert(strip_pointer(line.value).to_string());
            }
            "FAMS" => {
                ind.spouse_of.insert(strip_pointer(line.value).to_string());
            }
            _ => {}
        }
    } else if line.level == 2 {
        match *event {
            Some(EventKind::Birth) => apply_event_detail(&mut ind.birth, line),
            Some(EventKind::Marriage) => apply_event_detail(&mut ind.marriage, line),
            Some(EventKind::Death) => apply_event_detail(&mut ind.death, line),
            None => {}
        }
    }
}

fn apply_family(fam: &mut Family, line: &GedcomLine<'_>, event: &mut Option<EventKind>) {
    if line.level == 1 {
        match line.tag {
            "HUSB" => fam.father = non_empty(strip_pointer(line.value)),
            "WIFE" => fam.mother = non_empty(strip_pointer(line.value)),
            "CHIL" => {
                let child = strip_pointer(line.value);
                if !child.is_empty() && !fam.children.iter().any(|c| c == child) {
                    fam.children.push(child.to_string());
                }
            }
            "MARR" => start_event(&mut fam.marriage, EventKind::Marriage, event),
            _ => {}
        }
    } else if line.level == 2 && *event == Some(EventKind::Marriage) {
        apply_event_detail(&mut fam.marriage, line);
    }
}

fn start_event(slot: &mut Option<LifeEvent>, kind: EventKind, event: &mut Option<EventKind>) {
    if slot.is_none() {
        *slot = Some(LifeEvent::default());
        *event = Some(kind);
    }
}

fn flush(store: &mut RecordStore, pending: Pending) -> Result<()> {
    match pending {
        Pending::Individual(ind) => store.insert_individual(ind),
        Pending::Family(fam) => store.insert_family(fam),
        Pending::Skip => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::store::RecordSource;

    const SAMPLE: &str = "\
0 HEAD
1 CHAR UTF-8
0 @I1@ INDI
1 NAME Kari /Nordmann/
1 SEX F
1 BIRT
2 DATE 3 MAR 1950
2 PLAC Oslo
1 FAMC @F1@
0 @I2@ INDI
1 NAME Ola /Nordmann/
1 SEX M
1 DEAT
2 DATE 1999
1 FAMS @F1@
0 @I3@ INDI
1 NAME Anne
1 SEX F
0 @F1@ FAM
1 HUSB @I2@
1 WIFE @I3@
1 CHIL @I1@
1 MARR
2 DATE 1948
2 PLAC Bergen
0 TRLR
";

    #[test]
    fn test_parse_line_with_xref() {
        let line = parse_line("0 @I1@ INDI", 1).unwrap();
        assert_eq!(line.level, 0);
        assert_eq!(line.xref, Some("I1"));
        assert_eq!(line.tag, "INDI");
        assert_eq!(line.value, "");
    }

    #[test]
    fn test_parse_line_with_value() {
        let line = parse_line("1 NAME John  /Smith/", 3).unwrap();
        assert_eq!(line.level, 1);
        assert_eq!(line.xref, None);
        assert_eq!(line.tag, "NAME");
        assert_eq!(line.value, "John  /Smith/");
    }

    #[test]
    fn test_parse_line_bad_level() {
        let err = parse_line("X NAME foo", 7).unwrap_err();
        assert!(matches!(err, LineageError::Gedcom { line: 7, .. }));
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("John /Smith/"), "John Smith");
        assert_eq!(clean_name("/Smith/"), "Smith");
        assert_eq!(clean_name("Anne"), "Anne");
    }

    #[test]
    fn test_sample_individuals() {
        let store = RecordStore::from_gedcom_str(SAMPLE).unwrap();
        assert_eq!(store.n_individuals(), 3);
        assert_eq!(store.n_families(), 1);

        let kari = store.lookup("I1").unwrap();
        assert_eq!(kari.name, "Kari Nordmann");
        assert_eq!(kari.gender, Gender::Female);
        let birth = kari.birth.as_ref().unwrap();
        assert_eq!(birth.date.as_deref(), Some("3 MAR 1950"));
        assert_eq!(birth.place.as_deref(), Some("Oslo"));
        assert!(kari.death.is_none());

        let ola = store.lookup("I2").unwrap();
        assert_eq!(ola.death.as_ref().and_then(|d| d.date.as_deref()), Some("1999"));
    }

    #[test]
    fn test_sample_family_links() {
        let store = RecordStore::from_gedcom_str(SAMPLE).unwrap();
        assert_eq!(store.parents("F1").unwrap(), vec!["I2", "I3"]);

        // WIFE implies FAMS even though I3 never declared it.
        let anne = store.lookup("I3").unwrap();
        assert!(anne.spouse_of.contains("F1"));
        assert_eq!(
            anne.marriage.as_ref().and_then(|m| m.place.as_deref()),
            Some("Bergen")
        );
    }

    #[test]
    fn test_chil_implies_famc() {
        let text = "0 @C@ INDI\n0 @P@ INDI\n0 @F@ FAM\n1 HUSB @P@\n1 CHIL @C@\n";
        let store = RecordStore::from_gedcom_str(text).unwrap();
        let fams = store.parent_families("C").unwrap();
        assert_eq!(fams.len(), 1);
        assert_eq!(fams[0].id, "F");
    }

    #[test]
    fn test_level_jump_rejected() {
        let text = "0 @I1@ INDI\n2 DATE 1900\n";
        let err = RecordStore::from_gedcom_str(text).unwrap_err();
        assert!(matches!(err, LineageError::Gedcom { line: 2, .. }), "Error was: {}", err);
    }

    #[test]
    fn test_indi_without_xref_rejected() {
        let err = RecordStore::from_gedcom_str("0 INDI\n").unwrap_err();
        assert!(format!("{}", err).contains("cross-reference"), "Error was: {}", err);
    }

    #[test]
    fn test_duplicate_xref_rejected() {
        let text = "0 @I1@ INDI\n0 @I1@ INDI\n";
        assert!(matches!(
            RecordStore::from_gedcom_str(text),
            Err(LineageError::DuplicateRecord(_))
        ));
    }

    #[test]
    fn test_bom_and_crlf() {
        let text = "\u{feff}0 HEAD\r\n0 @I1@ INDI\r\n1 NAME Bo /Ek/\r\n";
        let store = RecordStore::from_gedcom_str(text).unwrap();
        assert_eq!(store.lookup("I1").unwrap().name, "Bo Ek");
    }
}
