use crate::config::ConfigError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Strongly typed settings owned by a single module.
///
/// Implementors derive `Deserialize` and `Default` and should carry
/// `#[serde(default)]` at the struct level so that omitted keys fall back to the
/// declared defaults. Unknown keys are ignored by serde unless the type opts into
/// `deny_unknown_fields`.
///
/// ```
/// use serde::Deserialize;
/// use weft_core::config::Configuration;
///
/// #[derive(Debug, Deserialize)]
/// #[serde(default)]
/// struct GreetingConfig {
///     message: String,
/// }
///
/// impl Default for GreetingConfig {
///     fn default() -> Self {
///         Self { message: "Default greeting".to_string() }
///     }
/// }
///
/// impl Configuration for GreetingConfig {}
///
/// let bound = GreetingConfig::bind(&serde_json::json!({ "message": "Hi" })).unwrap();
/// assert_eq!(bound.message, "Hi");
/// ```
pub trait Configuration: DeserializeOwned + Default + Send + Sync + 'static {
    /// Check the bound values. Called after binding and after code-side mutation.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Bind a configuration section into this type.
    ///
    /// A `null` section (absent from the tree) binds to `Default::default()`.
    fn bind(section: &Value) -> Result<Self, ConfigError> {
        let configuration = if section.is_null() {
            Self::default()
        } else {
            Self::deserialize(section)?
        };

        configuration.validate()?;
        Ok(configuration)
    }
}

/// Configuration for modules that take no settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct EmptyConfiguration {}

impl Configuration for EmptyConfiguration {}
