use deno_ast::swc::ast;

use crate::codegen::builders::any_type;
use crate::ir::GeneratorTypes;

/// Read `(yield, return, resume)` from a `Generator<Y, R, N>`-style annotation.
///
/// Any generic reference counts, so `AsyncGenerator` and `Iterator` work as
/// well. A missing annotation or missing trailing arguments degrade to `any`.
pub fn parse_return_type(function: &ast::Function) -> GeneratorTypes {
    let args: &[Box<ast::TsType>] = match function.return_type.as_deref() {
        Some(ast::TsTypeAnn { type_ann, .. }) => match &**type_ann {
            ast::TsType::TsTypeRef(ast::TsTypeRef {
                type_params: Some(params),
                ..
            }) => params.params.as_slice(),
            _ => &[],
        },
        None => &[],
    };
    let nth = |i: usize| args.get(i).cloned().unwrap_or_else(any_type);
    GeneratorTypes {
        yield_type: nth(0),
        return_type: nth(1),
        resume_type: nth(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{find_generators, parse_source};

    fn types_of(src: &str) -> GeneratorTypes {
        let parsed = parse_source(src).unwrap();
        let decl = find_generators(&parsed).remove(0).unwrap();
        parse_return_type(&decl.function)
    }

    fn keyword(ty: &ast::TsType) -> Option<ast::TsKeywordTypeKind> {
        match ty {
            ast::TsType::TsKeywordType(k) => Some(k.kind),
            _ => None,
        }
    }

    #[test]
    fn reads_all_three_arguments() {
        let types = types_of("function* g(): Generator<number, string, boolean> {}");
        assert_eq!(keyword(&types.yield_type), Some(ast::TsKeywordTypeKind::TsNumberKeyword));
        assert_eq!(keyword(&types.return_type), Some(ast::TsKeywordTypeKind::TsStringKeyword));
        assert_eq!(keyword(&types.resume_type), Some(ast::TsKeywordTypeKind::TsBooleanKeyword));
    }

    #[test]
    fn missing_annotation_is_any() {
        let types = types_of("function* g() {}");
        for ty in [&types.yield_type, &types.return_type, &types.resume_type] {
            assert_eq!(keyword(ty), Some(ast::TsKeywordTypeKind::TsAnyKeyword));
        }
    }

    #[test]
    fn missing_trailing_arguments_are_any() {
        let types = types_of("function* g(): Generator<number> {}");
        assert_eq!(keyword(&types.yield_type), Some(ast::TsKeywordTypeKind::TsNumberKeyword));
        assert_eq!(keyword(&types.resume_type), Some(ast::TsKeywordTypeKind::TsAnyKeyword));
    }
}
