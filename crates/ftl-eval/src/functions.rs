//! Typed function declarations, the registration builder and call-site
//! argument matching.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use ftl_par::{CallArgument, Expression, FunctionTypes, ValueType};
use ftl_util::{Error, FxHashMap, Result};

/// Callback invoked with the bound arguments of a call. Returning `None`
/// makes the call render the `<missing:NAME()>` placeholder instead of
/// failing.
pub type FunctionCallback =
    dyn Fn(&IndexMap<String, Expression>) -> Option<Expression> + Send + Sync;

/// A declared function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: ValueType,
}

/// A function callable from placeables.
///
/// Carries a name, a declared return type, an ordered parameter list and the
/// callback. The callback receives the bound subset of parameters and
/// returns an expression which is evaluated in the calling context, so
/// results can splice argument expressions back into a pattern.
pub struct FluentFunction {
    name: String,
    returns: ValueType,
    params: Vec<Parameter>,
    callback: Box<FunctionCallback>,
}

impl FluentFunction {
    /// Starts declaring a function. The return type defaults to `STRING`.
    pub fn builder(name: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder {
            name: name.into(),
            returns: ValueType::String,
            params: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn returns(&self) -> ValueType {
        self.returns
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) fn invoke(
        &self,
        arguments: &IndexMap<String, Expression>,
    ) -> Option<Expression> {
        (self.callback)(arguments)
    }

    /// Matches call-site arguments against the declared parameters.
    ///
    /// A positional cursor starts at the first parameter. Named arguments
    /// bind their parameter and move the cursor one past it, so following
    /// positionals resume after the named one. Positional arguments bind the
    /// parameter at the cursor. Every binding is type-checked against the
    /// declaration. Parameters left unbound are not an error; the callback
    /// simply does not receive them.
    pub fn match_arguments(
        &self,
        arguments: &[CallArgument],
        functions: &dyn FunctionTypes,
    ) -> Result<IndexMap<String, Expression>> {
        let mut bound = IndexMap::new();
        let mut cursor = 0usize;
        for argument in arguments {
            let index = match &argument.name {
                Some(name) => self
                    .params
                    .iter()
                    .position(|p| &p.name == name)
                    .ok_or_else(|| {
                        Error::unresolved_function(format!(
                            "{} has no parameter named {name}",
                            self.name
                        ))
                    })?,
                None => {
                    if cursor >= self.params.len() {
                        return Err(Error::unresolved_function(format!(
                            "could not match parameter {cursor} of {}",
                            self.name
                        )));
                    }
                    cursor
                }
            };
            let parameter = &self.params[index];
            let actual = argument.value.static_type(functions)?;
            if actual != parameter.ty {
                return Err(Error::type_mismatch(format!(
                    "parameter {} of {} expects {}, got {}",
                    parameter.name, self.name, parameter.ty, actual
                )));
            }
            bound.insert(parameter.name.clone(), argument.value.clone());
            cursor = index + 1;
        }
        Ok(bound)
    }
}

impl fmt::Debug for FluentFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluentFunction")
            .field("name", &self.name)
            .field("returns", &self.returns)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Chained declaration of a [`FluentFunction`].
pub struct FunctionBuilder {
    name: String,
    returns: ValueType,
    params: Vec<Parameter>,
}

impl FunctionBuilder {
    pub fn returns(mut self, ty: ValueType) -> Self {
        self.returns = ty;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: ValueType) -> Self {
        self.params.push(Parameter {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn build(
        self,
        callback: impl Fn(&IndexMap<String, Expression>) -> Option<Expression>
            + Send
            + Sync
            + 'static,
    ) -> FluentFunction {
        FluentFunction {
            name: self.name,
            returns: self.returns,
            params: self.params,
            callback: Box::new(callback),
        }
    }
}

/// Name-keyed set of registered functions. Shared by `Arc` so contexts and
/// overlays stay cheap to clone.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<FluentFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function, replacing any previous one with the same name.
    pub fn register(&mut self, function: FluentFunction) {
        self.functions
            .insert(function.name.clone(), Arc::new(function));
    }

    pub fn register_shared(&mut self, function: Arc<FluentFunction>) {
        self.functions.insert(function.name.clone(), function);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FluentFunction>> {
        self.functions.get(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Non-destructive union; the overlay wins on name collisions.
    pub fn merged_with(&self, overlay: &FunctionRegistry) -> FunctionRegistry {
        let mut functions = self.functions.clone();
        for (name, function) in &overlay.functions {
            functions.insert(name.clone(), Arc::clone(function));
        }
        FunctionRegistry { functions }
    }
}

impl FunctionTypes for FunctionRegistry {
    fn return_type(&self, name: &str) -> Option<ValueType> {
        self.functions.get(name).map(|f| f.returns)
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}
