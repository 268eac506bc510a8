use anyhow::Result;

use genmachine::parser::{find_generators, parse_source};
use genmachine::{CompileOptions, CompiledUnit, GeneratorIR};

/// Compile a source holding exactly one generator.
#[allow(dead_code)]
pub fn compile_single(src: &str) -> Result<CompiledUnit> {
    compile_single_with(src, &CompileOptions::default())
}

#[allow(dead_code)]
pub fn compile_single_with(src: &str, options: &CompileOptions) -> Result<CompiledUnit> {
    let mut units = genmachine::compile_with_options(src, options)?;
    anyhow::ensure!(units.len() == 1, "expected one generator, found {}", units.len());
    Ok(units.remove(0)?)
}

/// IR of the first generator in `src`.
#[allow(dead_code)]
pub fn ir_for(src: &str) -> Result<GeneratorIR> {
    let parsed = parse_source(src)?;
    let decl = find_generators(&parsed)
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("no generator in source"))??;
    Ok(genmachine::parse_ir(&decl)?)
}

/// Drop all whitespace so assertions do not depend on printer layout.
#[allow(dead_code)]
pub fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Assert that every fragment appears in `text`, ignoring whitespace.
#[allow(dead_code)]
pub fn assert_contains_all(text: &str, fragments: &[&str]) {
    let squashed = squash(text);
    for fragment in fragments {
        assert!(
            squashed.contains(&squash(fragment)),
            "missing `{}` in emitted code:\n{}",
            fragment,
            text
        );
    }
}
