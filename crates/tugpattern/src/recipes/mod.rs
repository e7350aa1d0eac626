//! Bundled migration recipes.
//!
//! A recipe is a named rule set over TypeScript-shaped trees. Recipes are
//! looked up by name and chained into a [`Pipeline`] in the order given.

pub mod factory;
pub mod scope;
pub mod service_mocks;

use serde::Serialize;
use thiserror::Error;
use tugpattern_core::{BundleFeed, KindTable, Pass, PatternError, Pipeline, RuleError};

/// A recipe could not be built.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// No recipe with that name.
    #[error("unknown recipe '{name}'")]
    Unknown { name: String },

    /// The recipe's pattern table was rejected.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Names the recipes substitute into the trees they build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeOptions {
    /// Constructor parameter `scope-to-this` migrates away from.
    pub scope_param: String,
    /// Name of the parameter that replaces it.
    pub renamed_param: String,
    /// Token passed to the replacement's `@Inject` decorator.
    pub inject_token: String,
}

impl Default for RecipeOptions {
    fn default() -> Self {
        RecipeOptions {
            scope_param: "$scope".to_string(),
            renamed_param: "rootScope".to_string(),
            inject_token: "$rootScope".to_string(),
        }
    }
}

/// Catalog entry for a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecipeInfo {
    pub name: &'static str,
    pub description: &'static str,
}

const CATALOG: &[RecipeInfo] = &[
    RecipeInfo {
        name: scope::NAME,
        description: "Inject a replacement for a constructor's scope parameter and move scope members onto the class",
    },
    RecipeInfo {
        name: service_mocks::NAME,
        description: "Add interfaces for @Injectable() classes and emit a mock class file for each",
    },
];

/// Every bundled recipe, in a stable order.
pub fn catalog() -> &'static [RecipeInfo] {
    CATALOG
}

/// Build the recipe called `name`.
///
/// # Errors
///
/// - [`RecipeError::Unknown`] if no recipe has that name
/// - [`RecipeError::Pattern`] if `kinds` cannot express the recipe
pub fn lookup(
    name: &str,
    options: &RecipeOptions,
    kinds: &KindTable,
) -> Result<Box<dyn Pass<RuleError>>, RecipeError> {
    match name {
        scope::NAME => Ok(Box::new(scope::stage(options, kinds)?)),
        service_mocks::NAME => Ok(Box::new(service_mocks::stage(kinds)?)),
        _ => Err(RecipeError::Unknown {
            name: name.to_string(),
        }),
    }
}

/// Chain the named recipes into a pipeline.
///
/// # Errors
///
/// The first recipe that fails [`lookup`].
pub fn pipeline<S: AsRef<str>>(
    names: &[S],
    options: &RecipeOptions,
    kinds: &KindTable,
    feed: BundleFeed,
) -> Result<Pipeline<RuleError>, RecipeError> {
    let mut pipeline = Pipeline::for_kinds(kinds).with_feed(feed);
    for name in names {
        pipeline.push(lookup(name.as_ref(), options, kinds)?);
    }
    Ok(pipeline)
}
