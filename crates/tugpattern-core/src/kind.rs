//! Kind discriminators and the name-to-kind lookup table.
//!
//! The set of node kinds is fixed by whoever produces the trees. The engine
//! only needs two capabilities from it: resolve a symbolic name to a
//! [`Kind`], and read the kind a node carries. [`KindTable`] provides the
//! first (plus the reverse lookup used for logging and encoding).
//!
//! # Aliases
//!
//! Several names may share one code. TypeScript, for example, exposes
//! range markers such as `FirstNode` that alias a real kind. The first name
//! registered for a code is its canonical name.
//!
//! # Reserved names
//!
//! `visit`, `leave` and `filter` name callback slots in rule sets, and names
//! starting with `_` mark private accumulation fields. None of them can be
//! registered as a kind name.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// Names that can never be kind names.
pub const RESERVED_NAMES: [&str; 3] = ["visit", "leave", "filter"];

/// Returns true if `name` is a callback slot or a private-field marker.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name) || name.starts_with('_')
}

// ============================================================================
// Kind
// ============================================================================

/// Discriminator identifying a node's syntactic role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(u16);

impl Kind {
    /// Create a kind from its numeric code.
    pub const fn new(code: u16) -> Self {
        Kind(code)
    }

    /// The numeric code.
    pub const fn code(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// KindTable
// ============================================================================

/// Bidirectional lookup between kind names and kinds.
#[derive(Debug, Clone, Default)]
pub struct KindTable {
    by_name: HashMap<String, Kind>,
    canonical: BTreeMap<Kind, String>,
}

impl KindTable {
    /// Build a table from `(name, code)` entries.
    ///
    /// # Errors
    ///
    /// - `PatternError::ReservedName` if a name is reserved
    /// - `PatternError::DuplicateName` if a name appears twice
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = (&'a str, u16)>,
    {
        let mut table = KindTable::default();
        for (name, code) in entries {
            if is_reserved(name) {
                return Err(PatternError::ReservedName {
                    name: name.to_string(),
                });
            }
            if table.by_name.contains_key(name) {
                return Err(PatternError::DuplicateName {
                    name: name.to_string(),
                });
            }
            table.insert(name, Kind::new(code));
        }
        Ok(table)
    }

    /// The built-in subset of TypeScript syntax kinds.
    ///
    /// Codes follow the TypeScript 2.x `SyntaxKind` enumeration.
    pub fn typescript() -> &'static KindTable {
        static TABLE: OnceLock<KindTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let mut table = KindTable::default();
            for &(name, code) in TYPESCRIPT_KINDS {
                table.insert(name, Kind::new(code));
            }
            table
        })
    }

    fn insert(&mut self, name: &str, kind: Kind) {
        self.by_name.insert(name.to_string(), kind);
        self.canonical.entry(kind).or_insert_with(|| name.to_string());
    }

    /// Resolve a name to its kind.
    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.by_name.get(name).copied()
    }

    /// Resolve a name that must exist.
    pub fn require(&self, name: &str) -> Result<Kind, PatternError> {
        self.kind_of(name).ok_or_else(|| PatternError::MissingKind {
            name: name.to_string(),
        })
    }

    /// Canonical name of a kind.
    pub fn name_of(&self, kind: Kind) -> Option<&str> {
        self.canonical.get(&kind).map(String::as_str)
    }

    /// Human-readable `Name (code)` description.
    pub fn describe(&self, kind: Kind) -> String {
        match self.name_of(kind) {
            Some(name) => format!("{} ({})", name, kind),
            None => format!("<unknown> ({})", kind),
        }
    }

    /// Returns true if some name maps to `kind`.
    pub fn contains(&self, kind: Kind) -> bool {
        self.canonical.contains_key(&kind)
    }

    /// Number of distinct kinds (aliases not counted).
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Canonical `(name, kind)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Kind)> {
        self.canonical.iter().map(|(kind, name)| (name.as_str(), *kind))
    }
}

const TYPESCRIPT_KINDS: &[(&str, u16)] = &[
    ("NumericLiteral", 8),
    ("StringLiteral", 9),
    ("EqualsToken", 58),
    ("FirstAssignment", 58),
    ("Identifier", 71),
    ("ExportKeyword", 84),
    ("ThisKeyword", 99),
    ("ImplementsKeyword", 108),
    ("PrivateKeyword", 112),
    ("PublicKeyword", 114),
    ("AnyKeyword", 119),
    ("ReadonlyKeyword", 131),
    ("NumberKeyword", 133),
    ("StringKeyword", 136),
    ("UndefinedKeyword", 139),
    ("QualifiedName", 143),
    ("FirstNode", 143),
    ("ComputedPropertyName", 144),
    ("TypeParameter", 145),
    ("Parameter", 146),
    ("Decorator", 147),
    ("PropertySignature", 148),
    ("PropertyDeclaration", 149),
    ("MethodSignature", 150),
    ("MethodDeclaration", 151),
    ("Constructor", 152),
    ("TypeReference", 159),
    ("PropertyAccessExpression", 179),
    ("CallExpression", 181),
    ("BinaryExpression", 194),
    ("ExpressionWithTypeArguments", 201),
    ("Block", 207),
    ("VariableStatement", 208),
    ("ExpressionStatement", 210),
    ("ReturnStatement", 219),
    ("ClassDeclaration", 229),
    ("InterfaceDeclaration", 230),
    ("ImportDeclaration", 238),
    ("HeritageClause", 259),
    ("SourceFile", 265),
    ("Bundle", 266),
];
