//! Entity table with name, code point and character indices.
//!
//! The bundled corpus is parsed once per process into [`EntityTable::global`].
//! Every index maps a key to either a single record or a count of records
//! sharing that key; shared keys never resolve to an arbitrary record.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::LazyLock;

use crate::entity::HtmlEntity;
use crate::substitute::EscapeMatcher;

/// Bundled corpus, one `character,&name;,&#xHEX;,&#decimal;` record per line.
const CORPUS: &str = include_str!("../data/entities.txt");

/// Prefix marking a comment line in the corpus.
const COMMENT_PREFIX: &str = "//";

static TABLE: LazyLock<EntityTable> = LazyLock::new(|| EntityTable::load(CORPUS));

/// Result of an index lookup that distinguishes "unknown" from "ambiguous".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// Exactly one record matches.
    Found(&'a HtmlEntity),
    /// No record matches.
    Absent,
    /// The given number of records share the key.
    Ambiguous(usize),
}

impl<'a> Lookup<'a> {
    /// Collapse to the unique record, treating ambiguity as absence.
    #[must_use]
    pub fn found(self) -> Option<&'a HtmlEntity> {
        match self {
            Lookup::Found(entity) => Some(entity),
            Lookup::Absent | Lookup::Ambiguous(_) => None,
        }
    }
}

/// Index slot: a record position, or the number of records sharing a key.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Unique(usize),
    Shared(usize),
}

impl Slot {
    fn share(&mut self) {
        *self = match *self {
            Slot::Unique(_) => Slot::Shared(2),
            Slot::Shared(n) => Slot::Shared(n + 1),
        };
    }
}

/// Immutable set of entity records and their lookup indices.
pub struct EntityTable {
    entities: Vec<HtmlEntity>,
    by_name: HashMap<String, Slot>,
    by_code_point: HashMap<u32, Slot>,
    by_character: HashMap<String, Slot>,
    escapes: EscapeMatcher,
    dropped: usize,
}

impl EntityTable {
    /// The process-wide table built from the bundled corpus.
    ///
    /// Built on first access; concurrent first callers all observe the
    /// same fully built table.
    pub fn global() -> &'static EntityTable {
        &TABLE
    }

    /// Build a table from corpus text.
    ///
    /// Comment lines are skipped and malformed lines are dropped silently.
    /// Records agreeing on both name and code point are kept once, in
    /// first-seen order.
    #[must_use]
    pub fn load(corpus: &str) -> Self {
        let mut seen = HashSet::new();
        let mut entities = Vec::new();
        let mut dropped = 0;

        for line in corpus.lines() {
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }
            match HtmlEntity::from_line(line) {
                Some(entity) => {
                    if seen.insert(entity.clone()) {
                        entities.push(entity);
                    }
                }
                None => dropped += 1,
            }
        }

        let mut by_name = HashMap::with_capacity(entities.len());
        let mut by_code_point = HashMap::with_capacity(entities.len());
        let mut by_character = HashMap::with_capacity(entities.len());
        for (index, entity) in entities.iter().enumerate() {
            insert(&mut by_name, entity.name().to_owned(), index);
            insert(&mut by_code_point, entity.code_point(), index);
            insert(&mut by_character, entity.character().to_owned(), index);
        }

        let unique_names = entities.iter().enumerate().filter_map(|(index, entity)| {
            matches!(by_name.get(entity.name()), Some(Slot::Unique(_))).then_some(index)
        });
        let escapes = EscapeMatcher::build(unique_names, &entities);

        tracing::debug!(
            entities = entities.len(),
            dropped,
            "Loaded entity table"
        );

        Self {
            entities,
            by_name,
            by_code_point,
            by_character,
            escapes,
            dropped,
        }
    }

    /// Number of distinct records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of non-comment corpus lines that failed to parse.
    #[must_use]
    pub fn dropped_lines(&self) -> usize {
        self.dropped
    }

    /// Iterate over all records in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = &HtmlEntity> + '_ {
        self.entities.iter()
    }

    /// Look up a bare name such as `agrave`.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Lookup<'_> {
        self.resolve(self.by_name.get(name))
    }

    /// Look up a Unicode scalar value.
    #[must_use]
    pub fn lookup_code_point(&self, value: u32) -> Lookup<'_> {
        self.resolve(self.by_code_point.get(&value))
    }

    /// Unique record with this name, if any.
    #[must_use]
    pub fn for_name(&self, name: &str) -> Option<&HtmlEntity> {
        self.lookup_name(name).found()
    }

    /// Unique record with this code point, if any.
    #[must_use]
    pub fn for_code_point(&self, value: u32) -> Option<&HtmlEntity> {
        self.lookup_code_point(value).found()
    }

    /// Unique record denoting this literal character, if any.
    #[must_use]
    pub fn for_character(&self, character: &str) -> Option<&HtmlEntity> {
        self.resolve(self.by_character.get(character)).found()
    }

    /// Resolve a decimal reference such as `&#224;`.
    #[must_use]
    pub fn for_decimal(&self, reference: &str) -> Option<&HtmlEntity> {
        let digits = reference.trim_matches(|c| matches!(c, '&' | '#' | ';'));
        let value = digits.parse().ok()?;
        self.for_code_point(value)
    }

    /// Resolve a hexadecimal reference such as `&#xE0;` or `&#x000E0;`.
    #[must_use]
    pub fn for_hex(&self, reference: &str) -> Option<&HtmlEntity> {
        let digits = reference.trim_matches(|c| matches!(c, '&' | '#' | 'x' | 'X' | ';'));
        let value = u32::from_str_radix(digits, 16).ok()?;
        self.for_code_point(value)
    }

    /// Replace every `\name` escape with the literal character it denotes.
    ///
    /// See [`crate::substitute_entities`] for the matching policy.
    #[must_use]
    pub fn substitute(&self, text: &str) -> String {
        self.escapes.replace(text, &self.entities)
    }

    fn resolve(&self, slot: Option<&Slot>) -> Lookup<'_> {
        match slot {
            Some(Slot::Unique(index)) => Lookup::Found(&self.entities[*index]),
            Some(Slot::Shared(count)) => Lookup::Ambiguous(*count),
            None => Lookup::Absent,
        }
    }
}

impl std::fmt::Debug for EntityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityTable")
            .field("entities", &self.entities.len())
            .field("dropped", &self.dropped)
            .finish_non_exhaustive()
    }
}

fn insert<K: Eq + Hash>(index: &mut HashMap<K, Slot>, key: K, position: usize) {
    index
        .entry(key)
        .and_modify(Slot::share)
        .or_insert(Slot::Unique(position));
}
