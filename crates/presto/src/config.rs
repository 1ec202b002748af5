//! TOML description of a render.
//!
//! ```toml
//! format = "man"
//! width = 72
//! parse = ["smart"]
//! render = ["hardbreaks"]
//! substitute_entities = true
//! ```
//!
//! Every field is optional; an empty document renders HTML with no flags.

use std::borrow::Cow;

use presto_renderer::{Options, OptionsError, Phase, RenderTarget};
use serde::Deserialize;

use crate::Error;

/// Render settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Output format: `html`, `xml`, `man`, `commonmark` or `latex`.
    pub format: String,
    /// Wrap column for the man, CommonMark and LaTeX formats (0 disables wrapping).
    pub width: i32,
    /// Parse flags: `normalize`, `validate-utf8`, `smart`.
    pub parse: Vec<String>,
    /// Render flags: `sourcepos`, `hardbreaks`, `nobreaks`, `safe`.
    pub render: Vec<String>,
    /// Replace backslash entity escapes before parsing.
    pub substitute_entities: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: "html".to_owned(),
            width: 0,
            parse: Vec::new(),
            render: Vec::new(),
            substitute_entities: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// `format` names no known output format.
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
    /// A flag list names no known option.
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    /// A flag is listed under the wrong phase.
    #[error("Configuration error: {0}")]
    Options(#[from] OptionsError),
}

impl RenderConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        tracing::debug!(format = %config.format, width = config.width, "Loaded render config");
        Ok(config)
    }

    /// Combined parse and render flags.
    ///
    /// Each list must only name flags of its own phase.
    pub fn options(&self) -> Result<Options, ConfigError> {
        let parse = flags(&self.parse, Phase::Parse)?;
        let render = flags(&self.render, Phase::Render)?;
        Ok(parse | render)
    }

    /// The render target these settings describe.
    pub fn target(&self) -> Result<RenderTarget, ConfigError> {
        let options = self.options()?;
        let width = self.width;
        Ok(match self.format.as_str() {
            "html" => RenderTarget::html(options),
            "xml" => RenderTarget::xml(options),
            "man" => RenderTarget::man(options, width),
            "commonmark" => RenderTarget::commonmark(options, width),
            "latex" => RenderTarget::latex(options, width),
            other => return Err(ConfigError::UnknownFormat(other.to_owned())),
        })
    }

    /// Render `text` with these settings.
    pub fn render(&self, text: &str) -> Result<String, Error> {
        let target = self.target()?;
        let text = if self.substitute_entities {
            Cow::Owned(presto_entities::substitute_entities(text))
        } else {
            Cow::Borrowed(text)
        };
        crate::render(&text, &target)
    }
}

fn flags(names: &[String], phase: Phase) -> Result<Options, ConfigError> {
    let mut options = Options::empty();
    for name in names {
        options |= Options::from_flag_name(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.clone()))?;
    }
    options.validate(phase)?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_config_defaults() {
        let config = RenderConfig::from_toml_str("").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert_eq!(config.options().unwrap(), Options::empty());
        assert_eq!(
            config.target().unwrap(),
            RenderTarget::html(Options::empty())
        );
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
format = "man"
width = 72
parse = ["smart", "normalize"]
render = ["hardbreaks", "safe"]
substitute_entities = true
"#;
        let config = RenderConfig::from_toml_str(toml).unwrap();
        assert_eq!(
            config.options().unwrap(),
            Options::SMART | Options::NORMALIZE | Options::HARD_BREAKS | Options::SAFE
        );
        let target = config.target().unwrap();
        assert_eq!(target.name(), "man");
        assert_eq!(target.width(), 72);
        assert!(config.substitute_entities);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = RenderConfig::from_toml_str("colour = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_format() {
        let config = RenderConfig::from_toml_str(r#"format = "rtf""#).unwrap();
        let err = config.target().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFormat(ref f) if f == "rtf"));
    }

    #[test]
    fn test_unknown_option() {
        let config = RenderConfig::from_toml_str(r#"render = ["tables"]"#).unwrap();
        let err = config.options().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption(ref o) if o == "tables"));
    }

    #[test]
    fn test_flag_in_wrong_phase() {
        let config = RenderConfig::from_toml_str(r#"parse = ["sourcepos"]"#).unwrap();
        let err = config.options().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Options(OptionsError::WrongPhase { flags, phase })
                if flags == Options::SOURCE_POS && phase == Phase::Parse
        ));
    }

    #[test]
    fn test_render_with_entities() {
        let toml = r#"
format = "latex"
substitute_entities = true
"#;
        let config = RenderConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.render(r"\agrave *la* carte").unwrap(), "à \\emph{la} carte\n");
    }

    #[test]
    fn test_render_without_entities() {
        let config = RenderConfig::from_toml_str(r#"format = "commonmark""#).unwrap();
        assert_eq!(config.render("This is *my* html.").unwrap(), "This is *my* html.\n");
    }

    #[test]
    fn test_render_reports_config_error() {
        let config = RenderConfig::from_toml_str(r#"format = "pdf""#).unwrap();
        let err = config.render("x").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::UnknownFormat(_))));
    }
}
