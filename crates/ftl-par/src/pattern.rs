//! Pass 2: pattern building and term expansion.
//!
//! Builds the message and term tables of a parsed file. In expand mode every
//! term reference inside a message is replaced in place by a
//! [`CompoundExpression`] holding a substituted, recursively expanded copy of
//! the referenced term's elements. Expansion runs a LIFO worklist rather
//! than plain recursion so arbitrarily deep term chains cannot blow the
//! stack; `Leave` markers keep the `visited` path in sync for cycle
//! detection.

use std::rc::Rc;

use indexmap::IndexMap;

use ftl_lex::Token;
use ftl_util::{Error, FxHashMap, Result, SourceRange, TokenRange};

use crate::ast::{
    CompoundExpression, Entry, Expression, PatternElement, ReferenceKind, TermReference,
};
use crate::terms::collect_terms;

/// A fully built localization resource: the output of both construction
/// passes, immutable from here on.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    messages: IndexMap<String, Entry>,
    terms: IndexMap<String, Entry>,
    tokens: Vec<Token>,
}

impl Resource {
    pub fn message(&self, name: &str) -> Option<&Entry> {
        self.messages.get(name)
    }

    pub fn term(&self, name: &str) -> Option<&Entry> {
        self.terms.get(name)
    }

    /// Messages in declaration order.
    pub fn messages(&self) -> impl Iterator<Item = &Entry> {
        self.messages.values()
    }

    /// Terms in declaration order.
    pub fn terms(&self) -> impl Iterator<Item = &Entry> {
        self.terms.values()
    }

    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// The token vector the file was parsed from.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Resolves a node's token range to line/column form.
    pub fn resolve(&self, range: TokenRange) -> SourceRange {
        range.resolve(&self.tokens)
    }
}

/// Builds the message and term tables from parsed entries.
///
/// Terms are retained as entries in both modes so they stay enumerable and
/// lazily resolvable; expansion only guarantees that messages no longer
/// depend on them.
pub fn build_resource(
    entries: Vec<Entry>,
    tokens: Vec<Token>,
    expand_terms: bool,
) -> Result<Resource> {
    let table = collect_terms(&entries, &tokens)?;
    let mut messages = IndexMap::new();
    let mut terms = IndexMap::new();
    for entry in entries {
        if entry.is_term {
            // Duplicates were rejected by the collector.
            terms.insert(entry.name.clone(), entry);
        } else {
            if messages.contains_key(&entry.name) {
                return Err(Error::parser(
                    format!("duplicate message {}", entry.name),
                    entry.range.resolve(&tokens),
                ));
            }
            let entry = if expand_terms {
                expand_entry(entry, &table)?
            } else {
                entry
            };
            messages.insert(entry.name.clone(), entry);
        }
    }
    Ok(Resource {
        messages,
        terms,
        tokens,
    })
}

/// One step on the expansion path, for cycle detection and reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Step {
    Term(String),
    Attribute(String, String),
}

impl Step {
    fn of(reference: &TermReference) -> Step {
        match &reference.attribute {
            None => Step::Term(reference.name.clone()),
            Some(attribute) => Step::Attribute(reference.name.clone(), attribute.clone()),
        }
    }

    fn render(&self) -> String {
        match self {
            Step::Term(name) => format!("-{name}"),
            Step::Attribute(_, attribute) => format!(".{attribute}"),
        }
    }
}

fn render_path(visited: &[Step], repeat: &Step) -> String {
    let mut path = String::new();
    for step in visited.iter().chain(std::iter::once(repeat)) {
        if !path.is_empty() {
            path.push_str(" -> ");
        }
        path.push_str(&step.render());
    }
    path
}

type Arguments = Rc<IndexMap<String, Expression>>;

/// A worklist item: an element to expand under an active argument map, or a
/// marker popping the innermost visited step.
enum Work {
    Element(PatternElement, Arguments),
    Leave,
}

fn expand_entry(mut entry: Entry, table: &FxHashMap<String, Entry>) -> Result<Entry> {
    entry.elements = expand_elements(std::mem::take(&mut entry.elements), table)?;
    let attributes = std::mem::take(&mut entry.attributes);
    for (name, mut attribute) in attributes {
        attribute.elements = expand_elements(std::mem::take(&mut attribute.elements), table)?;
        entry.attributes.insert(name, attribute);
    }
    Ok(entry)
}

fn expand_elements(
    elements: Vec<PatternElement>,
    table: &FxHashMap<String, Entry>,
) -> Result<Vec<PatternElement>> {
    elements
        .into_iter()
        .map(|element| expand_element(element, table))
        .collect()
}

fn expand_element(
    element: PatternElement,
    table: &FxHashMap<String, Entry>,
) -> Result<PatternElement> {
    match element {
        PatternElement::Placeable(Expression::TermReference(reference)) => {
            let mut visited = Vec::new();
            let elements = expand_term_reference(&reference, table, &mut visited)?;
            Ok(PatternElement::Placeable(Expression::Compound(
                CompoundExpression {
                    elements,
                    range: reference.range,
                },
            )))
        }
        PatternElement::Placeable(Expression::Select(mut select)) => {
            if let Expression::TermReference(reference) = &*select.selector {
                let reference = reference.clone();
                let mut visited = Vec::new();
                let elements = expand_term_reference(&reference, table, &mut visited)?;
                select.selector = Box::new(Expression::Compound(CompoundExpression {
                    elements,
                    range: reference.range,
                }));
            }
            for variant in &mut select.variants {
                variant.elements = expand_elements(std::mem::take(&mut variant.elements), table)?;
            }
            Ok(PatternElement::Placeable(Expression::Select(select)))
        }
        PatternElement::Block(inner) => Ok(PatternElement::Block(Box::new(expand_element(
            *inner, table,
        )?))),
        other => Ok(other),
    }
}

/// Expands one term reference into the element list of its replacement
/// compound.
///
/// The worklist dispatch follows the element kind:
/// - term references look up their target, check `visited`, and push the
///   target's elements under the reference's own (substituted) arguments;
/// - variable references bound by the active argument map are replaced by
///   the bound expression, unbound ones stay as references for the runtime;
/// - blocks expand their inner element in place;
/// - everything else is emitted unchanged, in source order.
fn expand_term_reference(
    root: &TermReference,
    table: &FxHashMap<String, Entry>,
    visited: &mut Vec<Step>,
) -> Result<Vec<PatternElement>> {
    let mut output = Vec::new();
    let mut work = vec![Work::Element(
        PatternElement::Placeable(Expression::TermReference(root.clone())),
        Rc::new(IndexMap::new()),
    )];

    while let Some(item) = work.pop() {
        let (element, arguments) = match item {
            Work::Leave => {
                visited.pop();
                continue;
            }
            Work::Element(element, arguments) => (element, arguments),
        };
        match element {
            PatternElement::Placeable(Expression::TermReference(reference)) => {
                let step = Step::of(&reference);
                if visited.contains(&step) {
                    return Err(Error::cycle(render_path(visited, &step)));
                }
                let elements = resolve_target(&reference, table)?;
                visited.push(step);
                work.push(Work::Leave);
                let call_arguments = Rc::new(substitute_arguments(&reference, &arguments));
                for element in elements.iter().rev() {
                    work.push(Work::Element(element.clone(), Rc::clone(&call_arguments)));
                }
            }
            PatternElement::Placeable(Expression::Reference(reference))
                if reference.kind == ReferenceKind::Variable =>
            {
                match arguments.get(&reference.name) {
                    Some(expression) => {
                        output.push(PatternElement::Placeable(expression.clone()));
                    }
                    None => {
                        output.push(PatternElement::Placeable(Expression::Reference(reference)));
                    }
                }
            }
            PatternElement::Block(inner) => {
                let inner = expand_block_inner(*inner, table, &arguments, visited)?;
                output.push(PatternElement::Block(Box::new(inner)));
            }
            other => output.push(other),
        }
    }
    Ok(output)
}

/// Expands the element behind a block wrapper, keeping the wrapper.
fn expand_block_inner(
    element: PatternElement,
    table: &FxHashMap<String, Entry>,
    arguments: &Arguments,
    visited: &mut Vec<Step>,
) -> Result<PatternElement> {
    match element {
        PatternElement::Placeable(Expression::TermReference(mut reference)) => {
            reference.arguments = substitute_arguments(&reference, arguments);
            let elements = expand_term_reference(&reference, table, visited)?;
            Ok(PatternElement::Placeable(Expression::Compound(
                CompoundExpression {
                    elements,
                    range: reference.range,
                },
            )))
        }
        PatternElement::Placeable(Expression::Reference(reference))
            if reference.kind == ReferenceKind::Variable =>
        {
            match arguments.get(&reference.name) {
                Some(expression) => Ok(PatternElement::Placeable(expression.clone())),
                None => Ok(PatternElement::Placeable(Expression::Reference(reference))),
            }
        }
        PatternElement::Block(inner) => Ok(PatternElement::Block(Box::new(expand_block_inner(
            *inner, table, arguments, visited,
        )?))),
        other => Ok(other),
    }
}

/// The elements a term reference expands to: the term's own pattern, or the
/// named attribute's.
fn resolve_target<'e>(
    reference: &TermReference,
    table: &'e FxHashMap<String, Entry>,
) -> Result<&'e [PatternElement]> {
    let term = table
        .get(&reference.name)
        .ok_or_else(|| Error::unresolved_reference(format!("-{}", reference.name)))?;
    match &reference.attribute {
        None => Ok(&term.elements),
        Some(attribute) => term
            .attribute(attribute)
            .map(|a| a.elements.as_slice())
            .ok_or_else(|| {
                Error::unresolved_reference(format!("-{}.{attribute}", reference.name))
            }),
    }
}

/// Resolves a nested reference's own call arguments against the enclosing
/// argument map, so `-inner(x: $outer)` forwards the value bound for
/// `$outer`.
fn substitute_arguments(
    reference: &TermReference,
    outer: &IndexMap<String, Expression>,
) -> IndexMap<String, Expression> {
    reference
        .arguments
        .iter()
        .map(|(name, value)| {
            let value = match value {
                Expression::Reference(r) if r.kind == ReferenceKind::Variable => {
                    outer.get(&r.name).cloned().unwrap_or_else(|| value.clone())
                }
                _ => value.clone(),
            };
            (name.clone(), value)
        })
        .collect()
}
