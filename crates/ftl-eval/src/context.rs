//! Evaluation context: variables, functions and the parent stack.
//!
//! A context is built per format call and layered non-destructively for term
//! argument overlays. The parent stack of currently-evaluating named
//! elements is the one piece of state shared (by reference) across overlays,
//! so cycle detection stays coherent through nested evaluations. The
//! `Rc<RefCell<…>>` makes contexts `!Send`: a context stays on the thread
//! running the format call.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use ftl_par::{Expression, Resource};
use ftl_util::{Error, FxHashMap, Result};

use crate::functions::{FluentFunction, FunctionRegistry};

/// Closure composed into a context before evaluation. Files capture one of
/// these at parse time; format calls add their own on top.
pub type ContextInit = Arc<dyn Fn(&mut ContextBuilder) + Send + Sync>;

/// A named element currently being evaluated, as seen by cycle detection.
/// Holds names only, never owning references into the AST.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackEntry {
    Message(String),
    Term(String),
    Attribute { entry: String, name: String },
}

impl fmt::Display for StackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackEntry::Message(name) => f.write_str(name),
            StackEntry::Term(name) => write!(f, "-{name}"),
            StackEntry::Attribute { entry, name } => write!(f, "{entry}.{name}"),
        }
    }
}

type ParentStack = Rc<RefCell<Vec<StackEntry>>>;

/// Collects variables and functions for a context.
#[derive(Default)]
pub struct ContextBuilder {
    variables: FxHashMap<String, Expression>,
    functions: FunctionRegistry,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a string variable.
    pub fn string(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.variables.insert(name.into(), Expression::string(value));
        self
    }

    /// Binds an integer variable.
    pub fn integer(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.variables.insert(name.into(), Expression::integer(value));
        self
    }

    /// Binds a float variable.
    pub fn float(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.variables.insert(name.into(), Expression::float(value));
        self
    }

    /// Binds a boolean variable as the literal `true`/`false` string, which
    /// select keys can match on.
    pub fn boolean(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.variables
            .insert(name.into(), Expression::string(if value { "true" } else { "false" }));
        self
    }

    /// Binds a variable to an arbitrary expression.
    pub fn expression(&mut self, name: impl Into<String>, expression: Expression) -> &mut Self {
        self.variables.insert(name.into(), expression);
        self
    }

    /// Registers a function, replacing any earlier one of the same name.
    pub fn function(&mut self, function: FluentFunction) -> &mut Self {
        self.functions.register(function);
        self
    }

    pub fn shared_function(&mut self, function: Arc<FluentFunction>) -> &mut Self {
        self.functions.register_shared(function);
        self
    }

    /// Builds the immutable context for one evaluation over `resource`.
    pub fn build(self, resource: &Resource) -> EvaluationContext<'_> {
        EvaluationContext {
            resource,
            variables: self.variables,
            functions: self.functions,
            parent: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

/// Immutable snapshot of everything one evaluation needs: the file's
/// resource, the variable map, the function registry and the shared parent
/// stack.
pub struct EvaluationContext<'f> {
    resource: &'f Resource,
    variables: FxHashMap<String, Expression>,
    functions: FunctionRegistry,
    parent: ParentStack,
}

impl<'f> EvaluationContext<'f> {
    /// An empty context over a resource.
    pub fn new(resource: &'f Resource) -> Self {
        ContextBuilder::new().build(resource)
    }

    pub fn resource(&self) -> &'f Resource {
        self.resource
    }

    pub fn variable(&self, name: &str) -> Option<&Expression> {
        self.variables.get(name)
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<Arc<FluentFunction>> {
        self.functions.get(name).cloned()
    }

    /// A new context whose variables are the union of this context's and the
    /// overlay, the overlay winning on collisions. Neither input is mutated;
    /// the parent stack is shared.
    pub fn overlay_variables(
        &self,
        overlay: &IndexMap<String, Expression>,
    ) -> EvaluationContext<'f> {
        let mut variables = self.variables.clone();
        for (name, expression) in overlay {
            variables.insert(name.clone(), expression.clone());
        }
        EvaluationContext {
            resource: self.resource,
            variables,
            functions: self.functions.clone(),
            parent: Rc::clone(&self.parent),
        }
    }

    /// Like [`EvaluationContext::overlay_variables`] for functions.
    pub fn overlay_functions(&self, overlay: &FunctionRegistry) -> EvaluationContext<'f> {
        EvaluationContext {
            resource: self.resource,
            variables: self.variables.clone(),
            functions: self.functions.merged_with(overlay),
            parent: Rc::clone(&self.parent),
        }
    }

    /// Pushes a named element onto the parent stack for the lifetime of the
    /// returned guard. Fails with the rendered cycle path if the element is
    /// already on the stack.
    pub(crate) fn enter(&self, entry: StackEntry) -> Result<StackGuard> {
        if self.parent.borrow().contains(&entry) {
            return Err(Error::cycle(self.render_cycle(&entry)));
        }
        self.parent.borrow_mut().push(entry);
        Ok(StackGuard {
            stack: Rc::clone(&self.parent),
        })
    }

    fn render_cycle(&self, repeat: &StackEntry) -> String {
        let mut path = String::new();
        for entry in self.parent.borrow().iter() {
            if !path.is_empty() {
                path.push_str(" -> ");
            }
            path.push_str(&entry.to_string());
        }
        if !path.is_empty() {
            path.push_str(" -> ");
        }
        path.push_str(&repeat.to_string());
        path
    }
}

/// Pops the parent stack when dropped, so the pop happens on error paths
/// too.
#[derive(Debug)]
pub(crate) struct StackGuard {
    stack: ParentStack,
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftl_par::parse_resource;

    fn empty_resource() -> Resource {
        parse_resource("", true).unwrap()
    }

    #[test]
    fn test_builder_variables() {
        let resource = empty_resource();
        let mut builder = ContextBuilder::new();
        builder.string("s", "x").integer("i", 3).boolean("b", true);
        let context = builder.build(&resource);
        assert_eq!(context.variable("s"), Some(&Expression::string("x")));
        assert_eq!(context.variable("i"), Some(&Expression::integer(3)));
        assert_eq!(context.variable("b"), Some(&Expression::string("true")));
        assert_eq!(context.variable("missing"), None);
    }

    #[test]
    fn test_overlay_is_non_destructive() {
        let resource = empty_resource();
        let mut builder = ContextBuilder::new();
        builder.string("a", "outer").string("b", "outer");
        let context = builder.build(&resource);

        let mut overlay = IndexMap::new();
        overlay.insert("b".to_string(), Expression::string("inner"));
        let overlaid = context.overlay_variables(&overlay);

        assert_eq!(overlaid.variable("a"), Some(&Expression::string("outer")));
        assert_eq!(overlaid.variable("b"), Some(&Expression::string("inner")));
        // The outer context is untouched.
        assert_eq!(context.variable("b"), Some(&Expression::string("outer")));
    }

    #[test]
    fn test_enter_detects_cycle() {
        let resource = empty_resource();
        let context = EvaluationContext::new(&resource);
        let _a = context.enter(StackEntry::Message("a".into())).unwrap();
        let _b = context.enter(StackEntry::Message("b".into())).unwrap();
        let err = context.enter(StackEntry::Message("a".into())).unwrap_err();
        match err {
            Error::Cycle { path } => assert_eq!(path, "a -> b -> a"),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_guard_pops_on_drop() {
        let resource = empty_resource();
        let context = EvaluationContext::new(&resource);
        {
            let _guard = context.enter(StackEntry::Term("t".into())).unwrap();
            assert!(context.enter(StackEntry::Term("t".into())).is_err());
        }
        // After the guard is gone the same element may be entered again.
        assert!(context.enter(StackEntry::Term("t".into())).is_ok());
    }

    #[test]
    fn test_overlay_shares_parent_stack() {
        let resource = empty_resource();
        let context = EvaluationContext::new(&resource);
        let overlaid = context.overlay_variables(&IndexMap::new());
        let _guard = context.enter(StackEntry::Message("m".into())).unwrap();
        // The overlay sees the element pushed through the original context.
        assert!(overlaid.enter(StackEntry::Message("m".into())).is_err());
    }

    #[test]
    fn test_attribute_stack_entry_rendering() {
        let entry = StackEntry::Attribute {
            entry: "welcome".into(),
            name: "title".into(),
        };
        assert_eq!(entry.to_string(), "welcome.title");
        assert_eq!(StackEntry::Term("brand".into()).to_string(), "-brand");
    }
}
