use crate::ConfigError;

/// Environment variable holding a comma separated list of the STRING formats the target api accepts.
pub const ALLOWED_STRING_FORMATS_ENV: &str = "LLMSCHEMA_ALLOWED_STRING_FORMATS";

/// The only STRING formats the target api accepts out of the box.
pub const DEFAULT_ALLOWED_STRING_FORMATS: &[&str] = &["enum", "date-time"];

/// What the sanitizer lets through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOptions {
    pub allowed_string_formats: Vec<String>,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            allowed_string_formats: DEFAULT_ALLOWED_STRING_FORMATS
                .iter()
                .map(|format| format.to_string())
                .collect(),
        }
    }
}

impl SanitizeOptions {
    pub fn with_allowed_string_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_string_formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads options from the process environment. Unset variables fall back to [`Default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads options through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let Some(value) = lookup(ALLOWED_STRING_FORMATS_ENV) else {
            return Ok(Self::default());
        };
        if value.trim().is_empty() {
            return Ok(Self::with_allowed_string_formats(Vec::<String>::new()));
        }
        let mut formats = Vec::new();
        for format in value.split(',') {
            let format = format.trim();
            if format.is_empty() {
                return Err(ConfigError::EmptyFormat {
                    key: ALLOWED_STRING_FORMATS_ENV.to_owned(),
                    value,
                });
            }
            formats.push(format.to_owned());
        }
        Ok(Self::with_allowed_string_formats(formats))
    }

    pub fn is_allowed_format(&self, format: &str) -> bool {
        self.allowed_string_formats
            .iter()
            .any(|allowed| allowed == format)
    }
}
