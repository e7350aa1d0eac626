//! Layered configuration for recipe runs.
//!
//! Precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`TUGPATTERN_*`)
//! 3. Defaults

use tugpattern_core::BundleFeed;

use crate::error::TugPatternError;
use crate::recipes::RecipeOptions;

/// Environment variable for the scope parameter name.
pub const ENV_SCOPE_PARAM: &str = "TUGPATTERN_SCOPE_PARAM";
/// Environment variable for the renamed parameter name.
pub const ENV_RENAMED_PARAM: &str = "TUGPATTERN_RENAMED_PARAM";
/// Environment variable for the injection token.
pub const ENV_INJECT_TOKEN: &str = "TUGPATTERN_INJECT_TOKEN";
/// Environment variable for the bundle feed policy.
pub const ENV_BUNDLE_FEED: &str = "TUGPATTERN_BUNDLE_FEED";

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From environment variable.
    EnvVar = 1,
    /// From CLI flag (highest precedence).
    CliFlag = 2,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --scope-param flag.
    pub scope_param: Option<String>,
    /// --renamed-param flag.
    pub renamed_param: Option<String>,
    /// --inject-token flag.
    pub inject_token: Option<String>,
    /// --bundle-feed flag.
    pub bundle_feed: Option<String>,
}

// ============================================================================
// Configuration Resolution
// ============================================================================

/// Resolved configuration with precedence information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Constructor parameter the scope recipe migrates away from.
    pub scope_param: ConfigValue<String>,
    /// Name of the replacement parameter.
    pub renamed_param: ConfigValue<String>,
    /// Token passed to the replacement parameter's `@Inject` decorator.
    pub inject_token: ConfigValue<String>,
    /// What feeds the next stage when a stage outputs a bundle.
    pub bundle_feed: ConfigValue<BundleFeed>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let defaults = RecipeOptions::default();
        ResolvedConfig {
            scope_param: ConfigValue::new(defaults.scope_param, ConfigSource::Default),
            renamed_param: ConfigValue::new(defaults.renamed_param, ConfigSource::Default),
            inject_token: ConfigValue::new(defaults.inject_token, ConfigSource::Default),
            bundle_feed: ConfigValue::new(BundleFeed::default(), ConfigSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Resolve configuration from the process environment and CLI flags.
    pub fn resolve(overrides: &CliOverrides) -> Result<Self, TugPatternError> {
        Self::resolve_with(|key| std::env::var(key).ok(), overrides)
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with<F>(env: F, overrides: &CliOverrides) -> Result<Self, TugPatternError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ResolvedConfig::default();
        config.apply_layer(
            ConfigSource::EnvVar,
            env(ENV_SCOPE_PARAM),
            env(ENV_RENAMED_PARAM),
            env(ENV_INJECT_TOKEN),
            env(ENV_BUNDLE_FEED),
        )?;
        config.apply_layer(
            ConfigSource::CliFlag,
            overrides.scope_param.clone(),
            overrides.renamed_param.clone(),
            overrides.inject_token.clone(),
            overrides.bundle_feed.clone(),
        )?;
        Ok(config)
    }

    fn apply_layer(
        &mut self,
        source: ConfigSource,
        scope_param: Option<String>,
        renamed_param: Option<String>,
        inject_token: Option<String>,
        bundle_feed: Option<String>,
    ) -> Result<(), TugPatternError> {
        if let Some(value) = scope_param {
            self.scope_param =
                merge(&self.scope_param, identifier(value, "scope parameter")?, source);
        }
        if let Some(value) = renamed_param {
            self.renamed_param =
                merge(&self.renamed_param, identifier(value, "renamed parameter")?, source);
        }
        if let Some(value) = inject_token {
            self.inject_token = merge(&self.inject_token, value, source);
        }
        if let Some(value) = bundle_feed {
            let feed = value
                .parse::<BundleFeed>()
                .map_err(TugPatternError::invalid_args)?;
            self.bundle_feed = merge(&self.bundle_feed, feed, source);
        }
        Ok(())
    }

    /// Recipe options from the resolved values.
    pub fn recipe_options(&self) -> RecipeOptions {
        RecipeOptions {
            scope_param: self.scope_param.value.clone(),
            renamed_param: self.renamed_param.value.clone(),
            inject_token: self.inject_token.value.clone(),
        }
    }
}

fn merge<T: Clone>(current: &ConfigValue<T>, value: T, source: ConfigSource) -> ConfigValue<T> {
    current.clone().merge(ConfigValue::new(value, source))
}

/// Parameter names end up as identifiers, so they must be non-empty and blank-free.
fn identifier(value: String, what: &str) -> Result<String, TugPatternError> {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(TugPatternError::invalid_args(format!(
            "invalid {} '{}': expected an identifier",
            what, value
        )));
    }
    Ok(value)
}
