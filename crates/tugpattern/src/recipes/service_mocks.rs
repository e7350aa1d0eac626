//! `service-mocks`: generate interfaces and mock classes for injectable services.
//!
//! For every `@Injectable()` class in a source file that no interface in the
//! file already covers, the recipe:
//! - appends `export interface I<Class>` with the class's method signatures
//! - emits `export class <Class>Mock implements I<Class>` whose methods
//!   return `undefined`, in its own file `<lowerFirst(Class)>.mock.ts`
//!
//! A matched source file is replaced by a bundle of the updated file followed
//! by the mock files.

use std::rc::Rc;

use tracing::debug;
use tugpattern_core::{
    Bundle, KindTable, MatchRule, Node, NodeRef, PatternError, PatternTable, Rewrite, RuleError,
    Stage,
};

use super::factory::{declared_name, decorator_callee, lower_first, Factory};

/// Recipe name.
pub const NAME: &str = "service-mocks";

/// Decorator marking a class as a service.
const INJECTABLE: &str = "Injectable";

/// Declarations seen in the source file being rewritten.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockContext {
    interfaces: Vec<String>,
    classes: Vec<NodeRef>,
}

impl MockContext {
    /// Names of the interfaces declared in the file.
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Injectable classes declared in the file.
    pub fn classes(&self) -> &[NodeRef] {
        &self.classes
    }

    /// True when some existing interface name ends with `class_name`.
    fn is_covered(&self, class_name: &str) -> bool {
        self.interfaces.iter().any(|name| name.ends_with(class_name))
    }
}

/// Build the `service-mocks` stage.
///
/// # Errors
///
/// [`PatternError`] if `kinds` lacks a kind the recipe builds or matches.
pub fn stage(kinds: &KindTable) -> Result<Stage<MockContext>, PatternError> {
    let factory = Factory::new(kinds)?;

    let interface = MatchRule::new().visit(record_interface);
    let class = MatchRule::new()
        .filter(move |node: &Node, _: &mut MockContext| Ok(is_injectable(node, &factory)))
        .visit(record_class);

    let file = MatchRule::new()
        .rule("InterfaceDeclaration", interface)
        .rule("ClassDeclaration", class)
        .leave(move |node: &NodeRef, ctx: &mut MockContext| {
            generate_mocks(node, ctx, &factory)
        });

    let table = PatternTable::builder(kinds)
        .rule("SourceFile", file)
        .build()?;
    Ok(Stage::new(NAME, table))
}

fn record_interface(node: &NodeRef, ctx: &mut MockContext) -> Result<Rewrite, RuleError> {
    ctx.interfaces.push(declared_name(node)?.to_string());
    Ok(Rewrite::Unchanged)
}

fn record_class(node: &NodeRef, ctx: &mut MockContext) -> Result<Rewrite, RuleError> {
    ctx.classes.push(Rc::clone(node));
    Ok(Rewrite::Unchanged)
}

fn is_injectable(node: &Node, factory: &Factory) -> bool {
    node.children_of(factory.decorator)
        .any(|decorator| decorator_callee(decorator, factory) == Some(INJECTABLE))
}

/// Parameters and optional return type of a method declaration.
fn split_method(method: &Node, factory: &Factory) -> (Vec<NodeRef>, Option<NodeRef>) {
    let params = method.children_of(factory.parameter).cloned().collect();
    let ty = method
        .children()
        .iter()
        .find(|child| {
            ![factory.parameter, factory.block, factory.decorator].contains(&child.kind())
        })
        .cloned();
    (params, ty)
}

fn generate_mocks(
    file: &NodeRef,
    ctx: &mut MockContext,
    factory: &Factory,
) -> Result<Rewrite, RuleError> {
    let seen = std::mem::take(ctx);

    let mut interfaces = Vec::new();
    let mut mocks = Vec::new();
    for class in &seen.classes {
        let class_name = declared_name(class)?;
        if seen.is_covered(class_name) {
            debug!(class = class_name, "interface already declared");
            continue;
        }
        debug!(class = class_name, "adding interface");

        let mut signatures = Vec::new();
        let mut methods = Vec::new();
        for method in class.children_of(factory.method_declaration) {
            let method_name = declared_name(method)?;
            let (params, ty) = split_method(method, factory);
            signatures.push(factory.method_signature(method_name, params.clone(), ty.clone()));
            let body = factory.return_statement(factory.identifier("undefined"));
            methods.push(factory.method(method_name, params, ty, vec![body]));
        }

        let interface_name = format!("I{}", class_name);
        interfaces.push(factory.exported_interface(&interface_name, signatures));

        let mock = factory.exported_class(
            &format!("{}Mock", class_name),
            vec![factory.implements(&[interface_name.as_str()])],
            methods,
        );
        let mock_file = format!("{}.mock.ts", lower_first(class_name));
        mocks.push(factory.source_file(&mock_file, vec![mock]));
    }

    let mut statements = file.children().to_vec();
    statements.extend(interfaces);

    let mut bundle = Bundle::new();
    bundle.push_tree(Rc::new(file.rebuilt(statements)));
    for mock in mocks {
        bundle.push_tree(mock);
    }
    Ok(Rewrite::Replaced(factory.bundle(bundle)))
}
