//! AST node definitions.
//!
//! Expressions and pattern elements form the typed tree the evaluator walks.
//! Every node carries a [`TokenRange`] back into the file's token vector;
//! nodes built programmatically (function results, substituted arguments)
//! use [`TokenRange::SYNTHETIC`].

use std::fmt;

use indexmap::IndexMap;

use ftl_util::{Error, Result, TokenRange};

/// The static type of an expression, used to check function arguments
/// against declared parameter types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => f.write_str("STRING"),
            ValueType::Number => f.write_str("NUMBER"),
        }
    }
}

/// What a plain reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    Message,
    Attribute,
    Variable,
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Quoted string literal
    String(StringLiteral),

    /// Number literal, integer or float
    Number(NumberLiteral),

    /// Message, attribute or variable reference
    Reference(Reference),

    /// Reference to a term (`-name`), resolved through the terms table
    TermReference(TermReference),

    /// Function call
    FunctionReference(FunctionReference),

    /// Selector with variants, one of which is the default
    Select(SelectExpression),

    /// Inlined pattern produced by term expansion, never by the parser
    Compound(CompoundExpression),
}

/// String literal with escapes already decoded
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub range: TokenRange,
}

/// Number literal
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
    pub value: NumberValue,
    pub range: TokenRange,
}

/// A parsed number: integer when the literal has no `.`, IEEE-754 double
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

impl NumberLiteral {
    /// The canonical decimal form the evaluator emits: the default
    /// integer/double formatting of the standard library.
    pub fn canonical(&self) -> String {
        match self.value {
            NumberValue::Int(value) => value.to_string(),
            NumberValue::Float(value) => value.to_string(),
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self.value, NumberValue::Float(_))
    }
}

/// Message, attribute or variable reference
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub name: String,
    /// Set iff `kind == Attribute`.
    pub attribute: Option<String>,
    pub range: TokenRange,
}

/// Term reference, optionally addressing an attribute and carrying named
/// call arguments in source order
#[derive(Debug, Clone, PartialEq)]
pub struct TermReference {
    pub name: String,
    pub attribute: Option<String>,
    pub arguments: IndexMap<String, Expression>,
    pub range: TokenRange,
}

/// Function call with arguments in source order; positional arguments have
/// no name
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionReference {
    pub name: String,
    pub arguments: Vec<CallArgument>,
    pub range: TokenRange,
}

/// A single call-site argument
#[derive(Debug, Clone, PartialEq)]
pub struct CallArgument {
    pub name: Option<String>,
    pub value: Expression,
}

/// Select expression
#[derive(Debug, Clone, PartialEq)]
pub struct SelectExpression {
    pub selector: Box<Expression>,
    /// Variants in declaration order; exactly one has `default == true`.
    pub variants: Vec<Variant>,
    pub range: TokenRange,
}

impl SelectExpression {
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.default)
    }
}

/// One variant of a select expression
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Key expression; matched by comparing its evaluated string form
    /// against the evaluated selector.
    pub key: Expression,
    pub elements: Vec<PatternElement>,
    pub default: bool,
    pub range: TokenRange,
}

/// Inlined pattern produced by term expansion
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundExpression {
    pub elements: Vec<PatternElement>,
    pub range: TokenRange,
}

impl Expression {
    /// Builds a synthetic string literal.
    pub fn string(value: impl Into<String>) -> Expression {
        Expression::String(StringLiteral {
            value: value.into(),
            range: TokenRange::SYNTHETIC,
        })
    }

    /// Builds a synthetic integer literal.
    pub fn integer(value: i64) -> Expression {
        Expression::Number(NumberLiteral {
            value: NumberValue::Int(value),
            range: TokenRange::SYNTHETIC,
        })
    }

    /// Builds a synthetic float literal.
    pub fn float(value: f64) -> Expression {
        Expression::Number(NumberLiteral {
            value: NumberValue::Float(value),
            range: TokenRange::SYNTHETIC,
        })
    }

    pub fn range(&self) -> TokenRange {
        match self {
            Expression::String(e) => e.range,
            Expression::Number(e) => e.range,
            Expression::Reference(e) => e.range,
            Expression::TermReference(e) => e.range,
            Expression::FunctionReference(e) => e.range,
            Expression::Select(e) => e.range,
            Expression::Compound(e) => e.range,
        }
    }

    /// The static type of the expression.
    ///
    /// References, selects and compounds always evaluate to strings. A
    /// function call has the declared return type of the registered
    /// function; an unknown function is an error. A term reference has no
    /// type before lowering: asking is a programming error.
    pub fn static_type(&self, functions: &dyn FunctionTypes) -> Result<ValueType> {
        match self {
            Expression::String(_)
            | Expression::Reference(_)
            | Expression::Select(_)
            | Expression::Compound(_) => Ok(ValueType::String),
            Expression::Number(_) => Ok(ValueType::Number),
            Expression::TermReference(term) => Err(Error::internal(format!(
                "unlowered term reference -{} has no static type",
                term.name
            ))),
            Expression::FunctionReference(call) => {
                functions.return_type(&call.name).ok_or_else(|| {
                    Error::unresolved_function(format!("unknown function {}", call.name))
                })
            }
        }
    }
}

/// Lookup seam for [`Expression::static_type`]: the evaluator's function
/// registry implements this.
pub trait FunctionTypes {
    /// Declared return type of a registered function, if any.
    fn return_type(&self, name: &str) -> Option<ValueType>;
}

/// Pattern element
#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    /// Literal text (leading blanks of its line already trimmed)
    Text(TextElement),

    /// Newline-prefixed element of a continuation line; renders as
    /// `"\n" + inner`
    Block(Box<PatternElement>),

    /// Expression used in place
    Placeable(Expression),
}

impl PatternElement {
    pub fn text(value: impl Into<String>) -> PatternElement {
        PatternElement::Text(TextElement {
            value: value.into(),
            range: TokenRange::SYNTHETIC,
        })
    }
}

/// Literal text run
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub value: String,
    pub range: TokenRange,
}

/// A top-level named entry: a message, or a term when `is_term` is set.
///
/// The `-` sigil of term identifiers is not part of `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub is_term: bool,
    pub elements: Vec<PatternElement>,
    /// Attributes in declaration order.
    pub attributes: IndexMap<String, Attribute>,
    pub range: TokenRange,
}

impl Entry {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

/// A named sub-pattern of an entry, addressed as `entry.attrib`. The owning
/// entry is recorded by name only.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub entry_name: String,
    pub name: String,
    pub elements: Vec<PatternElement>,
    pub range: TokenRange,
}
