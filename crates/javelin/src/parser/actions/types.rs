//! Literals, types, type arguments and type parameters.

use super::unexpected_token;
use crate::ast::{
    ExprKind, Literal, LiteralKind, PrimitiveType, TypeArgument, TypeParameter, TypeRef,
    TypeRefKind, TypeSegment, WildcardBound,
};
use crate::error::Abort;
use crate::lexer::{TokenKind, TokenValue};
use crate::parser::driver::Session;
use crate::parser::node::GenericNode;

impl Session<'_> {
    /// `true`, `false` and `null` carry no value when shifted.
    pub(super) fn keyword_literal(&mut self) -> Result<(), Abort> {
        let token = self.rhs_token(0)?;
        let (kind, value) = match token {
            TokenKind::True => (LiteralKind::Boolean, TokenValue::Bool(true)),
            TokenKind::False => (LiteralKind::Boolean, TokenValue::Bool(false)),
            TokenKind::Null => (LiteralKind::Null, TokenValue::Null),
            other => return Err(unexpected_token(other)),
        };
        let text = token.fixed_text().unwrap_or_default();
        self.push_expr(ExprKind::Literal(Literal {
            kind,
            text: text.into(),
            value,
        }));
        Ok(())
    }

    pub(super) fn primitive_type(&mut self) -> Result<(), Abort> {
        let token = self.rhs_token(0)?;
        let primitive = PrimitiveType::from_token(token).ok_or_else(|| unexpected_token(token))?;
        self.push_type(TypeRef::primitive(primitive, self.lhs()));
        Ok(())
    }

    pub(super) fn class_or_interface(&mut self) -> Result<(), Abort> {
        let name = self.pop_name()?;
        self.push_type(TypeRef::from_name(name));
        Ok(())
    }

    /// `Outer<T>.Inner`
    pub(super) fn qualified_class_or_interface(&mut self) -> Result<(), Abort> {
        let name = self.pop_name()?;
        let mut ty = self.pop_type_raw()?;
        if let TypeRefKind::Class(segments) = &mut ty.kind {
            segments.extend(name.segments.into_iter().map(|name| TypeSegment {
                name,
                arguments: None,
            }));
        }
        ty.range = self.lhs();
        self.push_type(ty);
        Ok(())
    }

    /// Attaches type arguments to the last segment. `closers` is the number of `>` the
    /// final token of the right-hand side closes beyond this type's own list.
    pub(super) fn generic_type(&mut self, closers: u32) -> Result<(), Abort> {
        let arguments = self.pop_type_arguments()?;
        let mut ty = self.pop_type_raw()?;
        if let TypeRefKind::Class(segments) = &mut ty.kind
            && let Some(last) = segments.last_mut()
        {
            last.arguments = Some(arguments);
        }
        let lhs = self.lhs();
        ty.range = lhs.with_end(lhs.end().saturating_sub(closers));
        self.push_type(ty);
        Ok(())
    }

    pub(super) fn array_type(&mut self) -> Result<(), Abort> {
        let dims = self.pop_dims()?;
        let mut ty = self.pop_type_raw()?;
        ty.dims += dims;
        ty.range = self.lhs();
        self.push_type(ty);
        Ok(())
    }

    pub(super) fn name_array_type(&mut self) -> Result<(), Abort> {
        let dims = self.pop_dims()?;
        let mut ty = TypeRef::from_name(self.pop_name()?);
        ty.dims = dims;
        ty.range = self.lhs();
        self.push_type(ty);
        Ok(())
    }

    pub(super) fn qualified_generic_array_type(&mut self) -> Result<(), Abort> {
        let dims = self.pop_dims()?;
        self.qualified_class_or_interface()?;
        let mut ty = self.pop_type_raw()?;
        ty.dims = dims;
        self.push_type(ty);
        Ok(())
    }

    pub(super) fn type_argument(&mut self) -> Result<(), Abort> {
        let ty = self.pop_type_raw()?;
        self.values
            .generic
            .push(GenericNode::Argument(TypeArgument::Type(ty)));
        Ok(())
    }

    pub(super) fn wildcard(&mut self) -> Result<(), Abort> {
        let range = self.rhs(0);
        self.values
            .generic
            .push(GenericNode::Argument(TypeArgument::Wildcard { bound: None, range }));
        Ok(())
    }

    pub(super) fn bounded_wildcard(&mut self, lower: bool) -> Result<(), Abort> {
        let ty = self.pop_type_raw()?;
        let range = self.rhs(0).cover(ty.range);
        let bound = if lower {
            WildcardBound::Super(ty)
        } else {
            WildcardBound::Extends(ty)
        };
        self.values.generic.push(GenericNode::Argument(TypeArgument::Wildcard {
            bound: Some(bound),
            range,
        }));
        Ok(())
    }

    pub(super) fn type_parameter(&mut self) -> Result<(), Abort> {
        let name = self.pop_ident()?;
        let range = name.range;
        self.values.generic.push(GenericNode::Parameter(TypeParameter {
            name,
            bounds: Vec::new(),
            range,
        }));
        Ok(())
    }

    pub(super) fn type_parameter_bound(&mut self) -> Result<(), Abort> {
        let bound = self.pop_type()?;
        self.bind_type_parameter(vec![bound])
    }

    pub(super) fn type_parameter_bounds(&mut self) -> Result<(), Abort> {
        let additional = self.pop_types()?;
        let first = self.pop_type()?;
        let mut bounds = Vec::with_capacity(additional.len() + 1);
        bounds.push(first);
        bounds.extend(additional);
        self.bind_type_parameter(bounds)
    }

    fn bind_type_parameter(&mut self, bounds: Vec<TypeRef>) -> Result<(), Abort> {
        let mut parameter = self.values.generic.pop_one()?.into_parameter()?;
        if let Some(last) = bounds.last() {
            parameter.range = parameter.range.cover(last.range);
        }
        parameter.bounds = bounds;
        self.values.generic.push(GenericNode::Parameter(parameter));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ExprKind, TypeArgument, TypeRef, TypeRefKind, WildcardBound};
    use crate::parser::{Parser, ParserOptions};
    use crate::report::CollectingReporter;

    fn field_type(source: &str) -> (TypeRef, String) {
        let text = format!("class A {{ {source} }}");
        let mut parser = Parser::new(ParserOptions::default()).expect("grammar loads");
        let mut reporter = CollectingReporter::new();
        let outcome = parser
            .parse_compilation_unit(&text, &mut reporter)
            .expect("no abort");
        assert!(!reporter.has_errors(), "{:?}", reporter.problems());
        let field = outcome.unit.types[0].fields().next().expect("a field").clone();
        let written = field.ty.range.slice(&text).unwrap_or_default().to_string();
        (field.ty, written)
    }

    #[test]
    fn test_nested_generics_split_shift_tokens() {
        let (ty, written) = field_type("Map<String, List<Set<T>>> m;");
        assert_eq!(written, "Map<String, List<Set<T>>>");
        let arguments = ty.segments()[0].arguments.as_ref().expect("arguments");
        assert_eq!(arguments.len(), 2);
        let TypeArgument::Type(list) = &arguments[1] else {
            panic!("expected a type argument");
        };
        let TypeArgument::Type(set) = &list.segments()[0].arguments.as_ref().expect("list args")[0]
        else {
            panic!("expected a type argument");
        };
        assert_eq!(list.range.len(), "List<Set<T>>".len() as u32);
        assert_eq!(set.range.len(), "Set<T>".len() as u32);
    }

    #[test]
    fn test_wildcards() {
        let (ty, _) = field_type("List<? extends Number> a;");
        let arguments = ty.segments()[0].arguments.as_ref().expect("arguments");
        assert!(matches!(
            &arguments[0],
            TypeArgument::Wildcard { bound: Some(WildcardBound::Extends(_)), .. }
        ));
    }

    #[test]
    fn test_qualified_generic_array() {
        let (ty, written) = field_type("Outer<T>.Inner[][] x;");
        assert_eq!(ty.dims, 2);
        assert_eq!(written, "Outer<T>.Inner[][]");
        let TypeRefKind::Class(segments) = &ty.kind else {
            panic!("expected a class type");
        };
        assert_eq!(segments.len(), 2);
        assert!(segments[0].arguments.is_some());
        assert!(segments[1].arguments.is_none());
    }

    #[test]
    fn test_keyword_literals() {
        let mut parser = Parser::new(ParserOptions::default()).expect("grammar loads");
        let expr = parser
            .parse_expression("null", &mut CollectingReporter::new())
            .expect("no abort")
            .expect("expression");
        assert!(matches!(expr.kind, ExprKind::Literal(ref literal) if literal.text == "null"));
    }
}
