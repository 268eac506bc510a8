use deno_ast::swc::codegen::text_writer::JsWriter;
use deno_ast::swc::codegen::{Config, Emitter, Node};
use deno_ast::swc::common::SourceMap;
use deno_ast::swc::common::sync::Lrc;

use crate::diagnostics::LoweringError;

/// Print a syntax node as TypeScript source, four-space indented.
pub fn print_node<N: Node>(node: &N) -> Result<String, LoweringError> {
    let cm: Lrc<SourceMap> = Lrc::default();
    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: Config::default(),
            cm: cm.clone(),
            comments: None,
            wr: JsWriter::new(cm, "\n", &mut buf, None),
        };
        node.emit_with(&mut emitter)
            .map_err(|source| LoweringError::Print { source })?;
    }
    String::from_utf8(buf).map_err(|_| LoweringError::NonUtf8Output)
}
