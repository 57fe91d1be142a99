//! Value expanders: strategies turning one bound argument into its template string.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Converts a single bound value into the string substituted into a template.
pub trait Expander: fmt::Debug + Send + Sync {
    /// Expand one non-null value.
    fn expand(&self, value: &Value) -> String;
}

/// Expander using [`Value::to_template_string`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ToStringExpander;

impl Expander for ToStringExpander {
    fn expand(&self, value: &Value) -> String {
        value.to_template_string().unwrap_or_default()
    }
}

/// Expander backed by a plain function.
pub struct FnExpander<F> {
    name: &'static str,
    f: F,
}

impl<F> FnExpander<F>
where
    F: Fn(&Value) -> String + Send + Sync,
{
    /// Wrap `f`, naming it for debug output.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> fmt::Debug for FnExpander<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnExpander").field(&self.name).finish()
    }
}

impl<F> Expander for FnExpander<F>
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn expand(&self, value: &Value) -> String {
        (self.f)(value)
    }
}

/// Constructs an expander when the contract is scanned.
///
/// Construction may fail; the contract reports the failure as a violation.
#[derive(Clone)]
pub struct ExpanderFactory {
    name: &'static str,
    make: Arc<dyn Fn() -> Result<Arc<dyn Expander>, String> + Send + Sync>,
}

impl ExpanderFactory {
    /// A factory running `make` to build the expander.
    pub fn new<F>(name: &'static str, make: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Expander>, String> + Send + Sync + 'static,
    {
        Self {
            name,
            make: Arc::new(make),
        }
    }

    /// A factory that always hands out `expander`.
    pub fn of<E: Expander + 'static>(expander: E) -> Self {
        let name = std::any::type_name::<E>();
        let expander: Arc<dyn Expander> = Arc::new(expander);
        Self::new(name, move || Ok(Arc::clone(&expander)))
    }

    /// Name of the produced expander type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build the expander.
    ///
    /// # Errors
    /// Returns the construction failure message.
    pub fn build(&self) -> Result<Arc<dyn Expander>, String> {
        (self.make)()
    }
}

impl fmt::Debug for ExpanderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExpanderFactory").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_expand_with_to_string() {
        assert_eq!(ToStringExpander.expand(&Value::from(7_i64)), "7");
        assert_eq!(ToStringExpander.expand(&Value::Null), "");
    }

    #[test]
    fn test_should_build_from_factory() {
        let factory = ExpanderFactory::of(FnExpander::new("upper", |v: &Value| {
            v.to_template_string().unwrap_or_default().to_uppercase()
        }));
        let expander = factory.build().unwrap();
        assert_eq!(expander.expand(&Value::from("abc")), "ABC");
    }

    #[test]
    fn test_should_surface_construction_failure() {
        let factory = ExpanderFactory::new("Broken", || Err("no default constructor".to_owned()));
        assert_eq!(factory.build().unwrap_err(), "no default constructor");
    }
}
