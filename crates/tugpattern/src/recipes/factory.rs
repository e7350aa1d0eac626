//! Builders for the TypeScript-shaped nodes the recipes emit.
//!
//! Tree conventions shared by every recipe:
//! - `Identifier` and `StringLiteral` carry their text in `text`
//! - declarations carry their name in `name`
//! - `PropertyAccessExpression` children are `[target, Identifier]`
//! - `Decorator` wraps a `CallExpression` whose first child is the callee
//! - a method's children are its parameters, an optional return type, then its `Block`
//! - exported declarations start with an `ExportKeyword` child
//! - a `SourceFile` carries its file name in `fileName`

use tugpattern_core::bundle::FILE_NAME_ATTR;
use tugpattern_core::{Bundle, Kind, KindTable, Node, NodeRef, PatternError, RuleError};

/// Attribute holding identifier and literal text.
pub const TEXT_ATTR: &str = "text";
/// Attribute holding a declaration name.
pub const NAME_ATTR: &str = "name";
/// Attribute holding a heritage clause token (`implements` / `extends`).
pub const TOKEN_ATTR: &str = "token";

/// Node constructors bound to resolved kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Factory {
    pub identifier: Kind,
    pub string_literal: Kind,
    pub this_keyword: Kind,
    pub export_keyword: Kind,
    pub any_keyword: Kind,
    pub property_access: Kind,
    pub call: Kind,
    pub decorator: Kind,
    pub parameter: Kind,
    pub property_declaration: Kind,
    pub method_signature: Kind,
    pub method_declaration: Kind,
    pub constructor: Kind,
    pub heritage_clause: Kind,
    pub expression_with_type_arguments: Kind,
    pub return_statement: Kind,
    pub block: Kind,
    pub class_declaration: Kind,
    pub interface_declaration: Kind,
    pub source_file: Kind,
    pub bundle: Kind,
}

impl Factory {
    /// Resolve every kind the recipes build.
    ///
    /// # Errors
    ///
    /// [`PatternError::MissingKind`] when `kinds` lacks one of them.
    pub fn new(kinds: &KindTable) -> Result<Self, PatternError> {
        Ok(Factory {
            identifier: kinds.require("Identifier")?,
            string_literal: kinds.require("StringLiteral")?,
            this_keyword: kinds.require("ThisKeyword")?,
            export_keyword: kinds.require("ExportKeyword")?,
            any_keyword: kinds.require("AnyKeyword")?,
            property_access: kinds.require("PropertyAccessExpression")?,
            call: kinds.require("CallExpression")?,
            decorator: kinds.require("Decorator")?,
            parameter: kinds.require("Parameter")?,
            property_declaration: kinds.require("PropertyDeclaration")?,
            method_signature: kinds.require("MethodSignature")?,
            method_declaration: kinds.require("MethodDeclaration")?,
            constructor: kinds.require("Constructor")?,
            heritage_clause: kinds.require("HeritageClause")?,
            expression_with_type_arguments: kinds.require("ExpressionWithTypeArguments")?,
            return_statement: kinds.require("ReturnStatement")?,
            block: kinds.require("Block")?,
            class_declaration: kinds.require("ClassDeclaration")?,
            interface_declaration: kinds.require("InterfaceDeclaration")?,
            source_file: kinds.require("SourceFile")?,
            bundle: kinds.require("Bundle")?,
        })
    }

    pub fn identifier(&self, text: &str) -> NodeRef {
        Node::new(self.identifier).with_attr(TEXT_ATTR, text).into_ref()
    }

    pub fn this_keyword(&self) -> NodeRef {
        Node::new(self.this_keyword).into_ref()
    }

    pub fn export_keyword(&self) -> NodeRef {
        Node::new(self.export_keyword).into_ref()
    }

    pub fn any_keyword(&self) -> NodeRef {
        Node::new(self.any_keyword).into_ref()
    }

    /// `target.name`
    pub fn property_access(&self, target: NodeRef, name: &str) -> NodeRef {
        Node::new(self.property_access)
            .with_child(target)
            .with_child(self.identifier(name))
            .into_ref()
    }

    pub fn string_literal(&self, text: &str) -> NodeRef {
        Node::new(self.string_literal)
            .with_attr(TEXT_ATTR, text)
            .into_ref()
    }

    /// `@callee(args...)`
    pub fn decorator(&self, callee: &str, args: Vec<NodeRef>) -> NodeRef {
        let call = Node::new(self.call)
            .with_child(self.identifier(callee))
            .with_children(args)
            .into_ref();
        Node::new(self.decorator).with_child(call).into_ref()
    }

    /// A parameter with its decorators and optional type annotation.
    pub fn parameter(
        &self,
        name: &str,
        decorators: Vec<NodeRef>,
        ty: Option<NodeRef>,
    ) -> NodeRef {
        Node::new(self.parameter)
            .with_attr(NAME_ATTR, name)
            .with_children(decorators)
            .with_children(ty)
            .into_ref()
    }

    /// `name: ty;` as a class member.
    pub fn property_declaration(&self, name: &str, ty: NodeRef) -> NodeRef {
        Node::new(self.property_declaration)
            .with_attr(NAME_ATTR, name)
            .with_child(ty)
            .into_ref()
    }

    /// `name(params): ty;` as an interface member.
    pub fn method_signature(
        &self,
        name: &str,
        params: Vec<NodeRef>,
        ty: Option<NodeRef>,
    ) -> NodeRef {
        Node::new(self.method_signature)
            .with_attr(NAME_ATTR, name)
            .with_children(params)
            .with_children(ty)
            .into_ref()
    }

    /// `name(params): ty { body }` as a class member.
    pub fn method(
        &self,
        name: &str,
        params: Vec<NodeRef>,
        ty: Option<NodeRef>,
        body: Vec<NodeRef>,
    ) -> NodeRef {
        Node::new(self.method_declaration)
            .with_attr(NAME_ATTR, name)
            .with_children(params)
            .with_children(ty)
            .with_child(self.block(body))
            .into_ref()
    }

    /// `implements A, B`
    pub fn implements(&self, names: &[&str]) -> NodeRef {
        let types = names.iter().map(|name| {
            Node::new(self.expression_with_type_arguments)
                .with_child(self.identifier(name))
                .into_ref()
        });
        Node::new(self.heritage_clause)
            .with_attr(TOKEN_ATTR, "implements")
            .with_children(types)
            .into_ref()
    }

    /// `return expr;`
    pub fn return_statement(&self, expr: NodeRef) -> NodeRef {
        Node::new(self.return_statement).with_child(expr).into_ref()
    }

    pub fn block(&self, statements: Vec<NodeRef>) -> NodeRef {
        Node::new(self.block).with_children(statements).into_ref()
    }

    /// `export class name ... { members }`
    pub fn exported_class(
        &self,
        name: &str,
        heritage: Vec<NodeRef>,
        members: Vec<NodeRef>,
    ) -> NodeRef {
        Node::new(self.class_declaration)
            .with_attr(NAME_ATTR, name)
            .with_child(self.export_keyword())
            .with_children(heritage)
            .with_children(members)
            .into_ref()
    }

    /// `export interface name { members }`
    pub fn exported_interface(&self, name: &str, members: Vec<NodeRef>) -> NodeRef {
        Node::new(self.interface_declaration)
            .with_attr(NAME_ATTR, name)
            .with_child(self.export_keyword())
            .with_children(members)
            .into_ref()
    }

    pub fn source_file(&self, file_name: &str, statements: Vec<NodeRef>) -> NodeRef {
        Node::new(self.source_file)
            .with_attr(FILE_NAME_ATTR, file_name)
            .with_children(statements)
            .into_ref()
    }

    /// A bundle node holding `trees` in order.
    pub fn bundle(&self, trees: Bundle) -> NodeRef {
        trees.into_node(self.bundle)
    }
}

// ============================================================================
// Shape helpers
// ============================================================================

/// The `name` attribute of a declaration.
///
/// # Errors
///
/// [`RuleError::Shape`] when the node has no name.
pub fn declared_name(node: &Node) -> Result<&str, RuleError> {
    node.attr_str(NAME_ATTR)
        .ok_or_else(|| RuleError::shape("named declaration", format!("kind {}", node.kind())))
}

/// Callee name of a decorator (`@Injectable()` gives `Injectable`).
pub fn decorator_callee<'n>(decorator: &'n Node, factory: &Factory) -> Option<&'n str> {
    let call = decorator.first_child_of(factory.call)?;
    let callee = call.child(0)?;
    if callee.is(factory.identifier) {
        callee.attr_str(TEXT_ATTR)
    } else {
        None
    }
}

/// `lowerFirst`: `UserService` gives `userService`.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
