//! A single HTML entity record.

/// An HTML named character reference.
///
/// Records are parsed once from the bundled corpus and never mutated.
/// Equality considers the name and code point only, so two corpus lines
/// that agree on both collapse into one record.
#[derive(Clone, Debug)]
pub struct HtmlEntity {
    character: String,
    name: String,
    code_point: u32,
}

impl HtmlEntity {
    /// Create a record from its parts.
    #[must_use]
    pub fn new(character: impl Into<String>, name: impl Into<String>, code_point: u32) -> Self {
        Self {
            character: character.into(),
            name: name.into(),
            code_point,
        }
    }

    /// Parse one corpus line: `character,&name;,<unused>,&#decimal;`.
    ///
    /// Returns `None` for lines with the wrong field count, a name field
    /// without the closing `;`, or a decimal field that does not parse.
    pub(crate) fn from_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(',').collect();
        let [character, name, _, decimal] = fields.as_slice() else {
            return None;
        };
        if !name.ends_with(';') {
            return None;
        }
        let name = name.trim_matches(|c| c == '&' || c == ';');
        let code_point = decimal
            .strip_prefix("&#")
            .and_then(|d| d.strip_suffix(';'))?
            .parse()
            .ok()?;
        Some(Self::new(*character, name, code_point))
    }

    /// The literal character this entity denotes.
    #[must_use]
    pub fn character(&self) -> &str {
        &self.character
    }

    /// The bare symbolic name, e.g. `agrave`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The Unicode scalar value, e.g. `224`.
    #[must_use]
    pub fn code_point(&self) -> u32 {
        self.code_point
    }

    /// Named reference form: `&agrave;`.
    #[must_use]
    pub fn name_reference(&self) -> String {
        format!("&{};", self.name)
    }

    /// Decimal reference form: `&#224;`.
    #[must_use]
    pub fn decimal_reference(&self) -> String {
        format!("&#{};", self.code_point)
    }

    /// Hexadecimal reference form with uppercase digits: `&#xE0;`.
    #[must_use]
    pub fn hex_reference(&self) -> String {
        format!("&#x{:X};", self.code_point)
    }

    /// Backslash escape form recognized by substitution: `\agrave`.
    #[must_use]
    pub fn escape(&self) -> String {
        format!("\\{}", self.name)
    }
}

impl PartialEq for HtmlEntity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.code_point == other.code_point
    }
}

impl Eq for HtmlEntity {}

impl std::hash::Hash for HtmlEntity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.code_point.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line() {
        let entity = HtmlEntity::from_line("à,&agrave;,&#xE0;,&#224;").unwrap();
        assert_eq!(entity.character(), "à");
        assert_eq!(entity.name(), "agrave");
        assert_eq!(entity.code_point(), 224);
    }

    #[test]
    fn test_from_line_wrong_field_count() {
        assert!(HtmlEntity::from_line(",,&comma;,&#x2C;,&#44;").is_none());
        assert!(HtmlEntity::from_line("à,&agrave;,&#224;").is_none());
        assert!(HtmlEntity::from_line("").is_none());
    }

    #[test]
    fn test_from_line_unterminated_name() {
        assert!(HtmlEntity::from_line("à,&agrave,&#xE0;,&#224;").is_none());
    }

    #[test]
    fn test_from_line_bad_decimal() {
        assert!(HtmlEntity::from_line("à,&agrave;,&#xE0;,&#22x;").is_none());
        assert!(HtmlEntity::from_line("à,&agrave;,&#xE0;,224").is_none());
    }

    #[test]
    fn test_reference_forms() {
        let entity = HtmlEntity::new("à", "agrave", 224);
        assert_eq!(entity.name_reference(), "&agrave;");
        assert_eq!(entity.decimal_reference(), "&#224;");
        assert_eq!(entity.hex_reference(), "&#xE0;");
        assert_eq!(entity.escape(), "\\agrave");
    }

    #[test]
    fn test_equality_ignores_character() {
        let a = HtmlEntity::new("à", "agrave", 224);
        let b = HtmlEntity::new("a\u{300}", "agrave", 224);
        let c = HtmlEntity::new("à", "agrave", 225);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
