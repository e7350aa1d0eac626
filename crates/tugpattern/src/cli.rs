//! CLI command implementations.
//!
//! Each function does the work of one subcommand and returns its response
//! struct; `main.rs` owns argument parsing, emission and exit codes.
//!
//! ## Error Handling
//!
//! All fallible functions return `Result<T, TugPatternError>`, so engine,
//! codec and recipe errors surface with stable exit codes.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use tugpattern_core::{codec, KindTable, Node};

use crate::config::ResolvedConfig;
use crate::error::TugPatternError;
use crate::output::{KindInfo, KindsResponse, OutputTree, RecipesResponse, RunResponse};
use crate::recipes;

/// Inputs of the run command.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// JSON tree to rewrite.
    pub input: PathBuf,
    /// Recipe names, in pipeline order.
    pub recipes: Vec<String>,
    /// Directory for output trees; trees are inlined in the response without it.
    pub output_dir: Option<PathBuf>,
    /// Resolved recipe and pipeline settings.
    pub config: ResolvedConfig,
}

/// Run recipes over a JSON tree.
///
/// # Errors
///
/// - `InvalidArguments` if no recipe is given
/// - `FileNotFound` if the input does not exist
/// - `InvalidTree` if the input is not a tree over the built-in kinds
/// - `UnknownRecipe` for an unknown recipe name
/// - `RuleFailed` if a recipe rule fails
/// - `WriteFailed` if an output tree cannot be written, its name is not a
///   relative path inside the output directory, or two trees share a name
pub fn run_recipes(
    request: &RunRequest,
    kinds: &KindTable,
) -> Result<RunResponse, TugPatternError> {
    if request.recipes.is_empty() {
        return Err(TugPatternError::invalid_args("at least one --recipe is required"));
    }

    let text = read_input(&request.input)?;
    let tree = codec::decode(&text, kinds)?;

    let feed = request.config.bundle_feed.value;
    let pipeline = recipes::pipeline(
        &request.recipes,
        &request.config.recipe_options(),
        kinds,
        feed,
    )?;
    info!(
        stages = pipeline.len(),
        feed = %feed,
        nodes = tree.count(),
        "running pipeline"
    );

    let bundle = pipeline.run(tree)?.into_bundle();

    if let Some(dir) = &request.output_dir {
        check_output_names(dir, bundle.names())?;
    }

    let mut outputs = Vec::with_capacity(bundle.len());
    for (name, tree) in bundle.iter() {
        let output = match &request.output_dir {
            Some(dir) => write_output(dir, name, tree, kinds)?,
            None => OutputTree {
                name: name.to_string(),
                nodes: tree.count(),
                path: None,
                tree: Some(codec::encode_value(tree, kinds)?),
            },
        };
        outputs.push(output);
    }

    let stages = pipeline
        .stage_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok(RunResponse::new(stages, feed.as_str(), outputs))
}

/// List the kind table.
pub fn list_kinds(kinds: &KindTable) -> KindsResponse {
    let kinds = kinds
        .iter()
        .map(|(name, kind)| KindInfo {
            name: name.to_string(),
            code: kind.code(),
        })
        .collect();
    KindsResponse::new(kinds)
}

/// List the bundled recipes.
pub fn list_recipes() -> RecipesResponse {
    RecipesResponse::new(recipes::catalog().to_vec())
}

fn read_input(path: &Path) -> Result<String, TugPatternError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TugPatternError::file_not_found(path.display().to_string()),
        _ => TugPatternError::invalid_args(format!("cannot read {}: {}", path.display(), e)),
    })
}

/// Output names come from the trees' `fileName` attributes, so they must stay
/// inside `dir` and be unique. Checked before anything is written.
fn check_output_names<'a>(
    dir: &Path,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), TugPatternError> {
    let mut seen = HashSet::new();
    for name in names {
        let path = dir.join(format!("{}.json", name));
        let relative = Path::new(name);
        let contained = relative.components().next().is_some()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !contained {
            return Err(TugPatternError::WriteFailed {
                path: path.display().to_string(),
                message: format!("output name '{}' is not a relative file name", name),
            });
        }
        if !seen.insert(name) {
            return Err(TugPatternError::WriteFailed {
                path: path.display().to_string(),
                message: format!("more than one output tree is named '{}'", name),
            });
        }
    }
    Ok(())
}

/// Write one output tree to `<dir>/<name>.json`.
fn write_output(
    dir: &Path,
    name: &str,
    tree: &Node,
    kinds: &KindTable,
) -> Result<OutputTree, TugPatternError> {
    let path = dir.join(format!("{}.json", name));
    let write_failed = |e: io::Error| TugPatternError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let json = codec::encode(tree, kinds)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }
    fs::write(&path, json + "\n").map_err(write_failed)?;
    debug!(path = %path.display(), "wrote output tree");

    Ok(OutputTree {
        name: name.to_string(),
        nodes: tree.count(),
        path: Some(path.display().to_string()),
        tree: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OutputErrorCode;
    use crate::recipes::factory::{Factory, NAME_ATTR};
    use tugpattern_core::{Bundle, BundleFeed, NodeRef};

    use crate::config::{ConfigSource, ConfigValue};

    fn kinds() -> &'static KindTable {
        KindTable::typescript()
    }

    /// A service file with one injectable class.
    fn service_file() -> NodeRef {
        let f = Factory::new(kinds()).unwrap();
        let class = Node::new(f.class_declaration)
            .with_attr(NAME_ATTR, "FooService")
            .with_child(f.decorator("Injectable", vec![]))
            .with_child(f.method("doThis", vec![], None, vec![]))
            .into_ref();
        f.source_file("foo.service.ts", vec![class])
    }

    fn write_tree(dir: &Path, tree: &NodeRef) -> PathBuf {
        let path = dir.join("input.json");
        fs::write(&path, codec::encode(tree, kinds()).unwrap()).unwrap();
        path
    }

    fn request(input: PathBuf, recipes: &[&str]) -> RunRequest {
        RunRequest {
            input,
            recipes: recipes.iter().map(|r| r.to_string()).collect(),
            output_dir: None,
            config: ResolvedConfig::default(),
        }
    }

    mod run {
        use super::*;

        #[test]
        fn inlines_trees_without_output_dir() {
            let temp = tempfile::tempdir().unwrap();
            let input = write_tree(temp.path(), &service_file());

            let response = run_recipes(&request(input, &["service-mocks"]), kinds()).unwrap();

            assert_eq!(response.status, "ok");
            assert_eq!(response.stages, ["service-mocks"]);
            assert_eq!(response.bundle_feed, "whole");
            let names: Vec<&str> = response.outputs.iter().map(|o| o.name.as_str()).collect();
            assert_eq!(names, ["foo.service.ts", "fooService.mock.ts"]);
            let tree = response.outputs[0].tree.as_ref().unwrap();
            assert_eq!(tree["kind"], "SourceFile");
        }

        #[test]
        fn writes_trees_into_output_dir() {
            let temp = tempfile::tempdir().unwrap();
            let input = write_tree(temp.path(), &service_file());
            let out_dir = temp.path().join("out");
            let mut req = request(input, &["service-mocks"]);
            req.output_dir = Some(out_dir.clone());

            let response = run_recipes(&req, kinds()).unwrap();

            for output in &response.outputs {
                assert!(output.tree.is_none());
                let path = PathBuf::from(output.path.as_ref().unwrap());
                let written = fs::read_to_string(&path).unwrap();
                let tree = codec::decode(&written, kinds()).unwrap();
                assert_eq!(tree.count(), output.nodes);
            }
            assert!(out_dir.join("fooService.mock.ts.json").exists());
        }

        #[test]
        fn repeated_recipe_flattens_bundles() {
            let temp = tempfile::tempdir().unwrap();
            let input = write_tree(temp.path(), &service_file());

            let req = request(input, &["service-mocks", "service-mocks"]);
            let response = run_recipes(&req, kinds()).unwrap();

            let names: Vec<&str> = response.outputs.iter().map(|o| o.name.as_str()).collect();
            assert_eq!(names, ["foo.service.ts", "fooService.mock.ts"]);
        }

        #[test]
        fn halt_feed_is_reported() {
            let temp = tempfile::tempdir().unwrap();
            let input = write_tree(temp.path(), &service_file());
            let mut req = request(input, &["service-mocks", "scope-to-this"]);
            req.config.bundle_feed = ConfigValue::new(BundleFeed::Halt, ConfigSource::CliFlag);

            let response = run_recipes(&req, kinds()).unwrap();
            assert_eq!(response.bundle_feed, "halt");
            assert_eq!(response.outputs.len(), 2);
        }
    }

    mod failures {
        use super::*;

        fn run_into_dir(tree: &NodeRef, dir: &Path) -> Result<RunResponse, TugPatternError> {
            let input = write_tree(dir, tree);
            let mut req = request(input, &["scope-to-this"]);
            req.output_dir = Some(dir.join("out"));
            run_recipes(&req, kinds())
        }

        #[test]
        fn absolute_output_name_is_rejected() {
            let temp = tempfile::tempdir().unwrap();
            let escaped = temp.path().join("escaped");
            let f = Factory::new(kinds()).unwrap();
            let tree = f.source_file(escaped.to_str().unwrap(), vec![]);

            let err = run_into_dir(&tree, temp.path()).unwrap_err();

            assert!(matches!(err, TugPatternError::WriteFailed { .. }));
            assert!(!temp.path().join("escaped.json").exists());
        }

        #[test]
        fn parent_output_name_is_rejected() {
            let temp = tempfile::tempdir().unwrap();
            let f = Factory::new(kinds()).unwrap();
            let tree = f.source_file("../escaped", vec![]);

            let err = run_into_dir(&tree, temp.path()).unwrap_err();

            assert!(matches!(err, TugPatternError::WriteFailed { .. }));
            assert!(!temp.path().join("escaped.json").exists());
            assert!(!temp.path().join("out").exists());
        }

        #[test]
        fn nested_relative_output_name_is_written() {
            let temp = tempfile::tempdir().unwrap();
            let f = Factory::new(kinds()).unwrap();
            let tree = f.source_file("src/app.ts", vec![]);

            let response = run_into_dir(&tree, temp.path()).unwrap();

            assert_eq!(response.outputs[0].name, "src/app.ts");
            assert!(temp.path().join("out/src/app.ts.json").exists());
        }

        #[test]
        fn duplicate_output_names_are_rejected() {
            let temp = tempfile::tempdir().unwrap();
            let f = Factory::new(kinds()).unwrap();
            let mut trees = Bundle::new();
            trees.push_tree(f.source_file("same.ts", vec![]));
            trees.push_tree(f.source_file("same.ts", vec![]));
            let tree = f.bundle(trees);

            let err = run_into_dir(&tree, temp.path()).unwrap_err();

            match err {
                TugPatternError::WriteFailed { message, .. } => {
                    assert!(message.contains("same.ts"));
                }
                other => panic!("unexpected error: {:?}", other),
            }
            assert!(!temp.path().join("out").exists());
        }

        #[test]
        fn missing_input() {
            let temp = tempfile::tempdir().unwrap();
            let req = request(temp.path().join("absent.json"), &["scope-to-this"]);
            let err = run_recipes(&req, kinds()).unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
        }

        #[test]
        fn malformed_tree() {
            let temp = tempfile::tempdir().unwrap();
            let input = temp.path().join("input.json");
            fs::write(&input, r#"{"kind": "JsxElement"}"#).unwrap();
            let err = run_recipes(&request(input, &["scope-to-this"]), kinds()).unwrap_err();
            assert!(matches!(err, TugPatternError::InvalidTree { .. }));
        }

        #[test]
        fn unknown_recipe() {
            let temp = tempfile::tempdir().unwrap();
            let input = write_tree(temp.path(), &service_file());
            let err = run_recipes(&request(input, &["inline-all"]), kinds()).unwrap_err();
            assert!(matches!(err, TugPatternError::UnknownRecipe { .. }));
        }

        #[test]
        fn no_recipes() {
            let temp = tempfile::tempdir().unwrap();
            let input = write_tree(temp.path(), &service_file());
            let err = run_recipes(&request(input, &[]), kinds()).unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }
    }

    mod listings {
        use super::*;

        #[test]
        fn kinds_are_canonical_and_ordered() {
            let response = list_kinds(kinds());
            assert_eq!(response.kinds.len(), kinds().len());
            assert!(response.kinds.windows(2).all(|w| w[0].code < w[1].code));
            assert!(response.kinds.iter().any(|k| k.name == "EqualsToken"));
            assert!(!response.kinds.iter().any(|k| k.name == "FirstAssignment"));
        }

        #[test]
        fn recipes_follow_catalog() {
            let response = list_recipes();
            let names: Vec<&str> = response.recipes.iter().map(|r| r.name).collect();
            assert_eq!(names, ["scope-to-this", "service-mocks"]);
        }
    }
}
