//! Test data builders for creating test objects

use rhai::Dynamic;
use vidixy::{NodeFunction, ParamType};

/// Builder for native test functions with an explicit parameter schema
pub struct FunctionBuilder {
    ident: String,
    params: Vec<ParamType>,
}

impl FunctionBuilder {
    pub fn new(ident: &str) -> Self {
        Self {
            ident: ident.to_string(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, type_name: &str) -> Self {
        self.params.push(ParamType::typed(name, type_name));
        self
    }

    pub fn untyped(mut self, name: &str) -> Self {
        self.params.push(ParamType::untyped(name));
        self
    }

    /// A function that ignores its arguments
    pub fn build(self) -> NodeFunction {
        NodeFunction::native(self.ident, self.params, |_| Ok(Dynamic::UNIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_builder() {
        let f = FunctionBuilder::new("blend")
            .param("a", "Image")
            .untyped("mode")
            .build();

        assert_eq!(f.ident(), "blend");
        assert_eq!(f.arity(), 2);
        assert_eq!(f.params()[0].type_name.as_deref(), Some("Image"));
        assert_eq!(f.params()[1].type_name, None);
    }
}
