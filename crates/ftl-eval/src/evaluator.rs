//! Tree-walking evaluation of patterns and expressions.
//!
//! Evaluation is a pure left-to-right walk: a pattern concatenates what its
//! elements produce, a block prefixes a newline, and every expression kind
//! is handled by one exhaustive match. References resolve against the
//! context's resource at runtime; the parent stack catches reference cycles.
//!
//! Missing things split two ways. A lookup that *should* have succeeded
//! (unknown message, term, attribute or function) is an error. An unbound
//! variable or a declining function callback is not: those render the
//! `<missing:…>` placeholders so one absent value cannot take down a whole
//! formatted string.

use tracing::warn;

use ftl_par::{Attribute, Entry, Expression, PatternElement, ReferenceKind};
use ftl_util::{Error, Result};

use crate::context::{EvaluationContext, StackEntry};

/// Formats a message entry. Evaluating a term directly is a programming
/// error: terms only ever surface through message expansion or references.
pub fn evaluate_entry(entry: &Entry, context: &EvaluationContext<'_>) -> Result<String> {
    if entry.is_term {
        return Err(Error::internal(format!(
            "term -{} cannot be evaluated directly",
            entry.name
        )));
    }
    let _guard = context.enter(StackEntry::Message(entry.name.clone()))?;
    evaluate_pattern(&entry.elements, context)
}

/// Formats an attribute of a message entry.
pub fn evaluate_attribute(attribute: &Attribute, context: &EvaluationContext<'_>) -> Result<String> {
    let _guard = context.enter(StackEntry::Attribute {
        entry: attribute.entry_name.clone(),
        name: attribute.name.clone(),
    })?;
    evaluate_pattern(&attribute.elements, context)
}

/// Concatenates the evaluation of each element, in source order.
pub fn evaluate_pattern(
    elements: &[PatternElement],
    context: &EvaluationContext<'_>,
) -> Result<String> {
    let mut output = String::new();
    for element in elements {
        output.push_str(&evaluate_element(element, context)?);
    }
    Ok(output)
}

fn evaluate_element(element: &PatternElement, context: &EvaluationContext<'_>) -> Result<String> {
    match element {
        PatternElement::Text(text) => Ok(text.value.clone()),
        PatternElement::Block(inner) => Ok(format!("\n{}", evaluate_element(inner, context)?)),
        PatternElement::Placeable(expression) => evaluate_expression(expression, context),
    }
}

/// Evaluates a single expression to its string form.
pub fn evaluate_expression(
    expression: &Expression,
    context: &EvaluationContext<'_>,
) -> Result<String> {
    match expression {
        Expression::String(literal) => Ok(literal.value.clone()),

        Expression::Number(literal) => Ok(literal.canonical()),

        Expression::Reference(reference) => match reference.kind {
            ReferenceKind::Variable => match context.variable(&reference.name) {
                Some(value) => {
                    let value = value.clone();
                    evaluate_expression(&value, context)
                }
                None => {
                    warn!(variable = %reference.name, "unbound variable in pattern");
                    Ok(format!("<missing:{}>", reference.name))
                }
            },
            ReferenceKind::Message => {
                let entry = context
                    .resource()
                    .message(&reference.name)
                    .ok_or_else(|| Error::unresolved_reference(reference.name.clone()))?;
                evaluate_entry(entry, context)
            }
            ReferenceKind::Attribute => {
                let Some(attribute_name) = reference.attribute.as_deref() else {
                    return Err(Error::internal(
                        "attribute reference without an attribute name",
                    ));
                };
                let attribute = context
                    .resource()
                    .message(&reference.name)
                    .and_then(|entry| entry.attribute(attribute_name))
                    .ok_or_else(|| {
                        Error::unresolved_reference(format!(
                            "{}.{attribute_name}",
                            reference.name
                        ))
                    })?;
                evaluate_attribute(attribute, context)
            }
        },

        Expression::TermReference(reference) => {
            let term = context
                .resource()
                .term(&reference.name)
                .ok_or_else(|| Error::unresolved_reference(format!("-{}", reference.name)))?;
            let (elements, stack_entry) = match reference.attribute.as_deref() {
                None => (&term.elements, StackEntry::Term(term.name.clone())),
                Some(attribute_name) => {
                    let attribute = term.attribute(attribute_name).ok_or_else(|| {
                        Error::unresolved_reference(format!(
                            "-{}.{attribute_name}",
                            reference.name
                        ))
                    })?;
                    (
                        &attribute.elements,
                        StackEntry::Attribute {
                            entry: format!("-{}", term.name),
                            name: attribute_name.to_string(),
                        },
                    )
                }
            };
            let _guard = context.enter(stack_entry)?;
            if reference.arguments.is_empty() {
                evaluate_pattern(elements, context)
            } else {
                // Call arguments overlay the variables for the term's body;
                // the outer context is untouched.
                let overlaid = context.overlay_variables(&reference.arguments);
                evaluate_pattern(elements, &overlaid)
            }
        }

        Expression::FunctionReference(call) => {
            let function = context.function(&call.name).ok_or_else(|| {
                Error::unresolved_function(format!("unknown function {}", call.name))
            })?;
            let bound = function.match_arguments(&call.arguments, context.functions())?;
            match function.invoke(&bound) {
                Some(result) => evaluate_expression(&result, context),
                None => {
                    warn!(function = %call.name, "function declined to produce a value");
                    Ok(format!("<missing:{}()>", call.name))
                }
            }
        }

        Expression::Select(select) => {
            let selector = evaluate_expression(&select.selector, context)?;
            let mut chosen = None;
            for variant in &select.variants {
                if evaluate_expression(&variant.key, context)? == selector {
                    chosen = Some(variant);
                    break;
                }
            }
            let variant = match chosen.or_else(|| select.default_variant()) {
                Some(variant) => variant,
                // The parser guarantees a default variant exists.
                None => {
                    return Err(Error::internal(
                        "select expression without a default variant",
                    ))
                }
            };
            evaluate_pattern(&variant.elements, context)
        }

        Expression::Compound(compound) => evaluate_pattern(&compound.elements, context),
    }
}
