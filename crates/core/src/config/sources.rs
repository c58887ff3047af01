/// Where a configuration tree came from, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from JSON text
    Json,
    /// Parsed from YAML text
    Yaml,
    /// Handed over as an already parsed value
    Programmatic,
    /// No configuration was supplied
    Empty,
}

impl ConfigSource {
    /// Get source description
    pub fn description(&self) -> &'static str {
        match self {
            ConfigSource::Json => "JSON document",
            ConfigSource::Yaml => "YAML document",
            ConfigSource::Programmatic => "programmatic value",
            ConfigSource::Empty => "empty configuration",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
