//! `scope-to-this`: migrate a controller's scope parameter to class members.
//!
//! Inside each class constructor:
//! - the parameter named `scope_param` becomes `@Inject('<token>') <renamed_param>`
//! - every `scope_param.name` access becomes `this.name`
//!
//! Each accessed name is recorded in the pass context, and the class's
//! `leave` declares the names it does not already declare as `name: any;`.

use std::rc::Rc;

use tugpattern_core::{
    KindTable, MatchRule, Node, NodeRef, PatternError, PatternTable, Rewrite, RuleError, Stage,
};

use super::factory::{Factory, NAME_ATTR, TEXT_ATTR};
use super::RecipeOptions;

/// Recipe name.
pub const NAME: &str = "scope-to-this";

/// Member names found in the class being rewritten, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    properties: Vec<String>,
}

impl ScopeContext {
    /// Record a member name once.
    pub fn record(&mut self, name: &str) {
        if !self.properties.iter().any(|known| known == name) {
            self.properties.push(name.to_string());
        }
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }
}

/// Build the `scope-to-this` stage.
///
/// # Errors
///
/// [`PatternError`] if `kinds` lacks a kind the recipe builds or matches.
pub fn stage(
    options: &RecipeOptions,
    kinds: &KindTable,
) -> Result<Stage<ScopeContext>, PatternError> {
    let factory = Factory::new(kinds)?;
    let scope = Rc::new(options.scope_param.clone());
    let renamed = Rc::new(options.renamed_param.clone());
    let token = Rc::new(options.inject_token.clone());

    let parameter = {
        let scope = Rc::clone(&scope);
        MatchRule::new()
            .filter(move |node: &Node, _: &mut ScopeContext| {
                Ok(node.attr_str(NAME_ATTR) == Some(scope.as_str()))
            })
            .visit(move |node: &NodeRef, _: &mut ScopeContext| {
                inject_parameter(node, &factory, &renamed, &token)
            })
    };

    let access = {
        let scope = Rc::clone(&scope);
        MatchRule::new()
            .filter(move |node: &Node, _: &mut ScopeContext| Ok(targets(node, &factory, &scope)))
            .visit(move |node: &NodeRef, ctx: &mut ScopeContext| {
                access_through_this(node, ctx, &factory)
            })
    };

    let constructor = PatternTable::builder(kinds)
        .rule("Parameter", parameter)
        .rule("PropertyAccessExpression", access)
        .build()?;

    let class = MatchRule::new()
        .nested("Constructor", constructor)
        .leave(move |node: &NodeRef, ctx: &mut ScopeContext| {
            declare_properties(node, ctx, &factory)
        });

    let table = PatternTable::builder(kinds)
        .rule("ClassDeclaration", class)
        .build()?;
    Ok(Stage::new(NAME, table))
}

/// `$scope` becomes `@Inject('$rootScope') rootScope`, keeping its other children.
fn inject_parameter(
    node: &NodeRef,
    factory: &Factory,
    renamed: &str,
    token: &str,
) -> Result<Rewrite, RuleError> {
    let inject = factory.decorator("Inject", vec![factory.string_literal(token)]);
    let children = std::iter::once(inject)
        .chain(node.children().iter().cloned())
        .collect();
    Ok(Rewrite::with(node.rebuilt(children).with_attr(NAME_ATTR, renamed)))
}

/// True when `node` is an access whose target is the identifier `scope`.
fn targets(node: &Node, factory: &Factory, scope: &str) -> bool {
    node.child(0).is_some_and(|target| {
        target.is(factory.identifier) && target.attr_str(TEXT_ATTR) == Some(scope)
    })
}

fn access_through_this(
    node: &NodeRef,
    ctx: &mut ScopeContext,
    factory: &Factory,
) -> Result<Rewrite, RuleError> {
    let Some(name) = node.child(1).and_then(|member| member.attr_str(TEXT_ATTR)) else {
        return Err(RuleError::shape(
            "property access with a member name",
            "no member name",
        ));
    };
    ctx.record(name);
    Ok(Rewrite::Replaced(
        factory.property_access(factory.this_keyword(), name),
    ))
}

/// Append `name: any;` for each recorded name the class does not declare yet.
fn declare_properties(
    node: &NodeRef,
    ctx: &mut ScopeContext,
    factory: &Factory,
) -> Result<Rewrite, RuleError> {
    let recorded = std::mem::take(&mut ctx.properties);
    let declared: Vec<&str> = node
        .children_of(factory.property_declaration)
        .filter_map(|member| member.attr_str(NAME_ATTR))
        .collect();
    let missing: Vec<NodeRef> = recorded
        .iter()
        .filter(|name| !declared.contains(&name.as_str()))
        .map(|name| factory.property_declaration(name, factory.any_keyword()))
        .collect();
    if missing.is_empty() {
        return Ok(Rewrite::Unchanged);
    }
    let mut children = node.children().to_vec();
    children.extend(missing);
    Ok(Rewrite::with(node.rebuilt(children)))
}
