//! Backslash escape substitution and reference decoding.

use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;

use crate::entity::HtmlEntity;
use crate::table::EntityTable;

/// Regex pattern for hex, decimal and named character references.
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#[xX]([0-9A-Fa-f]{1,6})|#([0-9]{1,7})|([A-Za-z][A-Za-z0-9]*));")
        .expect("invalid reference regex")
});

/// Multi-pattern matcher over every `\name` escape with a unique name.
///
/// Built once with the table, so substitution cost depends on the input
/// length and not on the corpus size.
pub(crate) struct EscapeMatcher {
    automaton: Option<AhoCorasick>,
    /// Record position for each pattern id.
    targets: Vec<usize>,
}

impl EscapeMatcher {
    pub(crate) fn build(indices: impl IntoIterator<Item = usize>, entities: &[HtmlEntity]) -> Self {
        let targets: Vec<usize> = indices.into_iter().collect();
        let patterns = targets.iter().map(|&index| entities[index].escape());

        let automaton = match AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(patterns)
        {
            Ok(automaton) => Some(automaton),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build entity escape matcher");
                None
            }
        };
        tracing::debug!(patterns = targets.len(), "Built entity escape matcher");

        Self { automaton, targets }
    }

    pub(crate) fn replace(&self, text: &str, entities: &[HtmlEntity]) -> String {
        let Some(automaton) = self.automaton.as_ref().filter(|_| text.contains('\\')) else {
            return text.to_owned();
        };

        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for found in automaton.find_iter(text) {
            let entity = &entities[self.targets[found.pattern().as_usize()]];
            result.push_str(&text[last..found.start()]);
            result.push_str(entity.character());
            last = found.end();
        }
        result.push_str(&text[last..]);
        result
    }
}

/// Replace backslash escapes such as `\agrave` with their literal character.
///
/// At each backslash the longest entity name that follows wins, so
/// `\notin` becomes `∉` rather than `¬in`. Matches never overlap: scanning
/// resumes after the replaced span. Names shared by several records are
/// left untouched. Text without a backslash is returned unchanged.
///
/// # Example
///
/// ```
/// use presto_entities::substitute_entities;
///
/// assert_eq!(substitute_entities(r"\Aacute la carte"), "Á la carte");
/// ```
pub fn substitute_entities(text: &str) -> String {
    EntityTable::global().substitute(text)
}

/// Decode `&name;`, `&#dd;` and `&#xhh;` references to literal characters.
///
/// Every reference resolves through the entity table, by name or by code
/// point, and is replaced only when it denotes exactly one record. Anything
/// that does not resolve is preserved verbatim.
pub fn decode_references(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    let table = EntityTable::global();
    REFERENCE_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let entity = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(|value| table.for_code_point(value))
            } else if let Some(decimal) = caps.get(2) {
                decimal
                    .as_str()
                    .parse()
                    .ok()
                    .and_then(|value| table.for_code_point(value))
            } else {
                table.for_name(&caps[3])
            };
            entity.map_or_else(|| caps[0].to_owned(), |entity| entity.character().to_owned())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::table::Lookup;

    #[test]
    fn test_substitute_single_escape() {
        assert_eq!(substitute_entities(r"\Aacute"), "Á");
    }

    #[test]
    fn test_substitute_inside_text() {
        assert_eq!(
            substitute_entities(r"caf\eacute au lait \mdash hot"),
            "café au lait — hot"
        );
    }

    #[test]
    fn test_substitute_longest_match_wins() {
        // "not" and "notin" are both entity names
        assert_eq!(substitute_entities(r"x \notin A"), "x ∉ A");
        assert_eq!(substitute_entities(r"\not A"), "¬ A");
    }

    #[test]
    fn test_substitute_prefix_of_longer_word() {
        // No name continues past "alpha", so the rest stays as text.
        assert_eq!(substitute_entities(r"\alphabet"), "αbet");
    }

    #[test]
    fn test_substitute_unknown_escape_untouched() {
        assert_eq!(substitute_entities(r"\zzz and \"), r"\zzz and \");
    }

    #[test]
    fn test_substitute_adjacent_escapes() {
        assert_eq!(substitute_entities(r"\alpha\beta"), "αβ");
    }

    #[test]
    fn test_substitute_identity_without_backslash() {
        let text = "plain &agrave; text with no escapes";
        assert_eq!(substitute_entities(text), text);
    }

    #[test]
    fn test_substitute_with_custom_table() {
        let table = EntityTable::load("α,&alpha;,&#x3B1;,&#945;\na,&alpha;,&#x61;,&#97;\n");
        // shared names are never substituted
        assert_eq!(table.substitute(r"\alpha"), r"\alpha");
    }

    #[test]
    fn test_decode_named_reference() {
        assert_eq!(decode_references("d&eacute;j&agrave; vu"), "déjà vu");
    }

    #[test]
    fn test_decode_numeric_references() {
        assert_eq!(decode_references("&#224;&#xE0;&#x000e0;"), "ààà");
    }

    #[test]
    fn test_decode_keeps_shared_code_points() {
        // 38 is both &amp; and &AMP;
        assert_eq!(EntityTable::global().lookup_code_point(38), Lookup::Ambiguous(2));
        assert_eq!(decode_references("&#38; &#x26;"), "&#38; &#x26;");
    }

    #[test]
    fn test_decode_keeps_code_points_outside_table() {
        assert_eq!(decode_references("&#x1F600;"), "&#x1F600;");
    }

    #[test]
    fn test_decode_preserves_unknown() {
        assert_eq!(decode_references("&bogus; &#0; &#xD800;"), "&bogus; &#0; &#xD800;");
        assert_eq!(decode_references("AT&T"), "AT&T");
    }
}
