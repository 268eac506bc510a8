use deno_ast::swc::ast;

use crate::codegen::builders;

/// How a declared local type maps onto a constructor default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateType {
    Number,
    String,
    Boolean,
    /// `any`, `unknown`, `undefined` and missing annotations
    Any,
    Array,
    /// Unions and named types. No canonical zero value exists, so an empty
    /// object literal stands in.
    Structural,
}

impl StateType {
    /// Classify a declared type, or `None` when it has no default value
    pub fn classify(ty: &ast::TsType) -> Option<StateType> {
        match ty {
            ast::TsType::TsKeywordType(keyword) => match keyword.kind {
                ast::TsKeywordTypeKind::TsNumberKeyword => Some(StateType::Number),
                ast::TsKeywordTypeKind::TsStringKeyword => Some(StateType::String),
                ast::TsKeywordTypeKind::TsBooleanKeyword => Some(StateType::Boolean),
                ast::TsKeywordTypeKind::TsAnyKeyword
                | ast::TsKeywordTypeKind::TsUnknownKeyword
                | ast::TsKeywordTypeKind::TsUndefinedKeyword => Some(StateType::Any),
                _ => None,
            },
            ast::TsType::TsArrayType(_) => Some(StateType::Array),
            ast::TsType::TsTypeRef(type_ref) => match &type_ref.type_name {
                ast::TsEntityName::Ident(name)
                    if matches!(&*name.sym, "Array" | "ReadonlyArray") =>
                {
                    Some(StateType::Array)
                }
                _ => Some(StateType::Structural),
            },
            ast::TsType::TsUnionOrIntersectionType(ast::TsUnionOrIntersectionType::TsUnionType(
                _,
            )) => Some(StateType::Structural),
            ast::TsType::TsParenthesizedType(inner) => StateType::classify(&inner.type_ann),
            _ => None,
        }
    }

    /// The expression the constructor stores before first use
    pub fn default_value(self) -> Box<ast::Expr> {
        match self {
            StateType::Number => builders::num(0.0),
            StateType::String => builders::str_lit(""),
            StateType::Boolean => builders::bool_lit(false),
            StateType::Any => builders::undefined(),
            StateType::Array => builders::empty_array(),
            StateType::Structural => builders::empty_object(),
        }
    }
}

/// Human-readable name of a type node's shape, for diagnostics.
pub fn type_kind(ty: &ast::TsType) -> &'static str {
    match ty {
        ast::TsType::TsKeywordType(keyword) => match keyword.kind {
            ast::TsKeywordTypeKind::TsNullKeyword => "`null`",
            ast::TsKeywordTypeKind::TsNeverKeyword => "`never`",
            ast::TsKeywordTypeKind::TsVoidKeyword => "`void`",
            ast::TsKeywordTypeKind::TsObjectKeyword => "`object`",
            ast::TsKeywordTypeKind::TsBigIntKeyword => "`bigint`",
            ast::TsKeywordTypeKind::TsSymbolKeyword => "`symbol`",
            _ => "a keyword type",
        },
        ast::TsType::TsThisType(_) => "`this`",
        ast::TsType::TsFnOrConstructorType(_) => "a function type",
        ast::TsType::TsTypeQuery(_) => "a `typeof` query",
        ast::TsType::TsTypeLit(_) => "an object type literal",
        ast::TsType::TsTupleType(_) => "a tuple type",
        ast::TsType::TsUnionOrIntersectionType(
            ast::TsUnionOrIntersectionType::TsIntersectionType(_),
        ) => "an intersection type",
        ast::TsType::TsConditionalType(_) => "a conditional type",
        ast::TsType::TsTypeOperator(_) => "a type operator",
        ast::TsType::TsIndexedAccessType(_) => "an indexed access type",
        ast::TsType::TsMappedType(_) => "a mapped type",
        ast::TsType::TsLitType(_) => "a literal type",
        ast::TsType::TsImportType(_) => "an import type",
        _ => "an unsupported type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::builders::{any_array_type, keyword_type, type_ref};

    #[test]
    fn keywords_classify() {
        let number = keyword_type(ast::TsKeywordTypeKind::TsNumberKeyword);
        assert_eq!(StateType::classify(&number), Some(StateType::Number));
        let unknown = keyword_type(ast::TsKeywordTypeKind::TsUnknownKeyword);
        assert_eq!(StateType::classify(&unknown), Some(StateType::Any));
        let null = keyword_type(ast::TsKeywordTypeKind::TsNullKeyword);
        assert_eq!(StateType::classify(&null), None);
        assert_eq!(type_kind(&null), "`null`");
    }

    #[test]
    fn array_reference_is_an_array() {
        let generic = type_ref("Array", vec![keyword_type(ast::TsKeywordTypeKind::TsNumberKeyword)]);
        assert_eq!(StateType::classify(&generic), Some(StateType::Array));
        assert_eq!(StateType::classify(&any_array_type()), Some(StateType::Array));
        assert_eq!(StateType::classify(&type_ref("Point", vec![])), Some(StateType::Structural));
    }
}
