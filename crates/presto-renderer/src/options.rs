//! Parse and render option flags.

use std::fmt;

use crate::error::OptionsError;

bitflags::bitflags! {
    /// Bit flags controlling parsing and rendering.
    ///
    /// Flags compose with `|`. Each flag belongs to exactly one [`Phase`];
    /// parsing ignores render flags and rendering ignores parse flags, so a
    /// single value can drive both steps of a conversion.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Options: u32 {
        /// Include a `sourcepos` attribute on block elements.
        const SOURCE_POS = 1 << 1;
        /// Render soft line breaks as hard line breaks.
        const HARD_BREAKS = 1 << 2;
        /// Replace raw HTML with a placeholder comment and drop unsafe
        /// link destinations (`javascript:`, `vbscript:`, `file:`, and
        /// `data:` except PNG, GIF, JPEG and WebP images).
        const SAFE = 1 << 3;
        /// Render soft line breaks as spaces.
        const NO_BREAKS = 1 << 4;
        /// Consolidate adjacent text nodes.
        const NORMALIZE = 1 << 8;
        /// Replace invalid UTF-8 in byte input with U+FFFD instead of failing.
        const VALIDATE_UTF8 = 1 << 9;
        /// Convert straight quotes to curly, `---` to em dashes and `--` to
        /// en dashes.
        const SMART = 1 << 10;
    }
}

/// Step of a conversion an option applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Building the document tree from text.
    Parse,
    /// Serializing a built tree.
    Render,
}

impl Phase {
    /// All flags meaningful in this phase.
    #[must_use]
    pub const fn flags(self) -> Options {
        match self {
            Phase::Parse => Options::NORMALIZE
                .union(Options::VALIDATE_UTF8)
                .union(Options::SMART),
            Phase::Render => Options::SOURCE_POS
                .union(Options::HARD_BREAKS)
                .union(Options::SAFE)
                .union(Options::NO_BREAKS),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Parse => f.write_str("parse"),
            Phase::Render => f.write_str("render"),
        }
    }
}

impl Options {
    /// Look up a flag by its configuration name, e.g. `hardbreaks`.
    #[must_use]
    pub fn from_flag_name(name: &str) -> Option<Self> {
        Some(match name {
            "sourcepos" => Self::SOURCE_POS,
            "hardbreaks" => Self::HARD_BREAKS,
            "safe" => Self::SAFE,
            "nobreaks" => Self::NO_BREAKS,
            "normalize" => Self::NORMALIZE,
            "validate-utf8" => Self::VALIDATE_UTF8,
            "smart" => Self::SMART,
            _ => return None,
        })
    }

    /// Reject flags that have no effect in `phase`.
    ///
    /// Parsing and rendering themselves never call this; they ignore
    /// foreign flags. Use it where a caller states flags per phase.
    pub fn validate(self, phase: Phase) -> Result<(), OptionsError> {
        let foreign = self.difference(phase.flags());
        if foreign.is_empty() {
            Ok(())
        } else {
            Err(OptionsError::WrongPhase {
                flags: foreign,
                phase,
            })
        }
    }

    /// Keep only the flags of `phase`, logging the ones dropped.
    pub(crate) fn applied(self, phase: Phase) -> Self {
        let foreign = self.difference(phase.flags());
        if !foreign.is_empty() {
            tracing::debug!(flags = ?foreign, %phase, "Ignoring options outside phase");
        }
        self.intersection(phase.flags())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert_eq!(Options::default(), Options::empty());
        assert_eq!(Options::default().bits(), 0);
    }

    #[test]
    fn test_flag_values_are_stable() {
        assert_eq!(Options::SOURCE_POS.bits(), 2);
        assert_eq!(Options::HARD_BREAKS.bits(), 4);
        assert_eq!(Options::SAFE.bits(), 8);
        assert_eq!(Options::NO_BREAKS.bits(), 16);
        assert_eq!(Options::NORMALIZE.bits(), 256);
        assert_eq!(Options::VALIDATE_UTF8.bits(), 512);
        assert_eq!(Options::SMART.bits(), 1024);
    }

    #[test]
    fn test_phases_partition_all_flags() {
        let parse = Phase::Parse.flags();
        let render = Phase::Render.flags();
        assert!(parse.intersection(render).is_empty());
        assert_eq!(parse | render, Options::all());
    }

    #[test]
    fn test_compose_and_contains() {
        let options = Options::SMART | Options::SAFE;
        assert!(options.contains(Options::SMART));
        assert!(options.contains(Options::SAFE));
        assert!(!options.contains(Options::HARD_BREAKS));
    }

    #[test]
    fn test_validate_accepts_own_phase() {
        assert!(Options::SMART.validate(Phase::Parse).is_ok());
        assert!((Options::SAFE | Options::SOURCE_POS).validate(Phase::Render).is_ok());
        assert!(Options::empty().validate(Phase::Parse).is_ok());
    }

    #[test]
    fn test_validate_rejects_foreign_flags() {
        let err = (Options::SMART | Options::SAFE)
            .validate(Phase::Parse)
            .unwrap_err();
        let OptionsError::WrongPhase { flags, phase } = err;
        assert_eq!(flags, Options::SAFE);
        assert_eq!(phase, Phase::Parse);
    }

    #[test]
    fn test_applied_drops_foreign_flags() {
        let options = Options::SMART | Options::HARD_BREAKS;
        assert_eq!(options.applied(Phase::Parse), Options::SMART);
        assert_eq!(options.applied(Phase::Render), Options::HARD_BREAKS);
    }

    #[test]
    fn test_from_flag_name() {
        assert_eq!(Options::from_flag_name("smart"), Some(Options::SMART));
        assert_eq!(
            Options::from_flag_name("validate-utf8"),
            Some(Options::VALIDATE_UTF8)
        );
        assert_eq!(Options::from_flag_name("SMART"), None);
    }
}
