mod common;

use anyhow::Result;

use common::ir_for;
use genmachine::codegen::{dump_ir, print_node};

#[test]
fn parameters_flatten_to_leaf_bindings() -> Result<()> {
    let ir = ir_for(
        "function* g({ a, b: { c }, ...more }: Opts, [d, [e]]: any[], f?: string, g: number = 1, ...h: boolean[]) { yield 1; }",
    )?;
    let names: Vec<&str> = ir.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c", "more", "d", "e", "f", "g", "h"]);

    let types: Vec<String> = ir
        .parameters
        .iter()
        .map(|p| print_node(&p.ty))
        .collect::<Result<_, _>>()?;
    assert_eq!(types, vec!["any", "any", "any", "any", "any", "string", "number", "boolean[]"]);

    let optional: Vec<&str> = ir
        .parameters
        .iter()
        .filter(|p| p.optional)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(optional, vec!["f"]);
    Ok(())
}

#[test]
fn untyped_rest_parameter_is_any_array() -> Result<()> {
    let ir = ir_for("function* g(...items) { yield items; }")?;
    assert_eq!(print_node(&ir.parameters[0].ty)?, "any[]");
    Ok(())
}

#[test]
fn ir_records_types_locals_and_steps() -> Result<()> {
    let ir = ir_for(
        r#"
        async function* feed(limit: number): AsyncGenerator<string, number, boolean> {
            let count: number = 0;
            const more = yield "start";
            count = limit;
            return count;
        }
        "#,
    )?;
    assert_eq!(ir.name, "feed");
    assert!(ir.is_async);
    assert_eq!(print_node(&ir.types.yield_type)?, "string");
    assert_eq!(print_node(&ir.types.return_type)?, "number");
    assert_eq!(print_node(&ir.types.resume_type)?, "boolean");

    let locals: Vec<&str> = ir.locals.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(locals, vec!["count", "more"]);
    assert_eq!(print_node(&ir.locals[1].ty)?, "any");

    assert_eq!(ir.steps.len(), 2);
    assert_eq!(ir.steps[1].statements.len(), 1);
    assert!(ir.terminal_step().is_some());
    assert_eq!(ir.class_name("Generator"), "FeedGenerator");
    assert_eq!(
        ir.state_names().into_iter().collect::<Vec<_>>(),
        vec!["count", "limit", "more"]
    );
    Ok(())
}

#[test]
fn ir_dump_lists_every_step() -> Result<()> {
    let ir = ir_for("function* g(a: number) { let b = a; yield b; return a; }")?;
    let dump = dump_ir(&ir)?;
    assert!(dump.starts_with("generator g\n"));
    assert!(dump.contains("  parameters:\n    a: number\n"));
    assert!(dump.contains("    b: any = a\n"));
    assert!(dump.contains("  step 0:\n"));
    assert!(dump.contains("  step 1 (terminal):\n"));
    assert!(dump.contains("    produce: b\n"));
    Ok(())
}
