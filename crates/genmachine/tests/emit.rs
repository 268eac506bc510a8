mod common;

use anyhow::Result;

use common::{assert_contains_all, compile_single, compile_single_with, squash};
use genmachine::{CompileOptions, Warning};

const SUM: &str = r#"
function* sum(a: number, b: number): Generator<number, number, number> {
    let total: number = 0;
    total += yield a;
    total += yield b;
    return total;
}
"#;

#[test]
fn sum_emits_one_case_per_step() -> Result<()> {
    let unit = compile_single(SUM)?;
    assert_eq!(unit.name, "sum");
    assert_eq!(unit.class_name, "SumGenerator");
    assert!(!unit.warnings.has_warnings());
    assert_contains_all(
        &unit.source,
        &[
            "class SumGenerator {",
            "private state:",
            "constructor(a: number, b: number)",
            "this.state = { nextStep: 0, total: 0, a: a, b: b",
            "nextStep(value: number): IteratorResult<number, number>",
            "switch (this.state.nextStep)",
            "case 0: this.state.total = 0; this.state.nextStep = 1; return { value: this.state.a, done: false",
            "case 1: this.state.total += value; this.state.nextStep = 2; return { value: this.state.b, done: false",
            "case 2: this.state.total += value; return { value: this.state.total, done: true",
            r#"default: throw new Error("Invalid next step");"#,
        ],
    );
    Ok(())
}

#[test]
fn terminal_case_never_advances_the_counter() -> Result<()> {
    let unit = compile_single(SUM)?;
    let squashed = squash(&unit.source);
    assert!(!squashed.contains("this.state.nextStep=3"));
    Ok(())
}

#[test]
fn save_and_load_copy_the_whole_record() -> Result<()> {
    let unit = compile_single(SUM)?;
    assert_contains_all(
        &unit.source,
        &[
            "saveState(): {",
            "return { ...this.state",
            "loadState(state: object): void",
            "this.state = { ...(state as {",
            "nextStep: number",
            "total: number",
        ],
    );
    Ok(())
}

#[test]
fn locals_get_type_driven_defaults() -> Result<()> {
    let unit = compile_single(
        r#"
        function* defaults(): Generator<number> {
            let n: number;
            let s: string;
            let b: boolean;
            let x;
            let a: any;
            let xs: number[];
            let ys: Array<string>;
            let u: string | number;
            let p: Point;
            yield 1;
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &[
            r#"nextStep: 0, n: 0, s: "", b: false, x: undefined, a: undefined, xs: [], ys: [], u: {}, p: {}"#,
            // declarators without an initializer keep the constructor default
            "case 0: this.state.nextStep = 1; return { value: 1, done: false",
        ],
    );
    Ok(())
}

#[test]
fn parameters_keep_their_binding_forms() -> Result<()> {
    let unit = compile_single(
        r#"
        function* shapes({ x, y }: Point, [first, ...others]: number[], opt?: string, def: number = 3, ...rest: string[]) {
            yield x;
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &[
            "constructor({ x, y }: Point, [first, ...others]: number[], opt?: string, def: number = 3, ...rest: string[])",
            "x: x, y: y, first: first, others: others, opt: opt, def: def, rest: rest",
            "opt?: string",
            "rest: string[]",
            "value: this.state.x",
        ],
    );
    Ok(())
}

#[test]
fn yielded_literals_are_fully_qualified() -> Result<()> {
    let unit = compile_single(
        r#"
        function* pairs(a: number) {
            let b: number = a * 2;
            yield { a, b: b + a, list: [a, b] };
            return a + b;
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &[
            "this.state.b = this.state.a * 2;",
            "value: { a: this.state.a, b: this.state.b + this.state.a, list: [this.state.a, this.state.b] }",
            "value: this.state.a + this.state.b, done: true",
        ],
    );
    Ok(())
}

#[test]
fn property_names_are_left_alone() -> Result<()> {
    let unit = compile_single(
        r#"
        function* props(a: number) {
            const o = { a: 1 };
            yield o.a + a;
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &["this.state.o = { a: 1 }", "value: this.state.o.a + this.state.a"],
    );
    Ok(())
}

#[test]
fn nested_function_parameters_shadow_state() -> Result<()> {
    let unit = compile_single(
        r#"
        function* shadow(n: number) {
            const inc = (n: number) => n + 1;
            yield inc(n);
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &["(n: number)=>n + 1", "value: this.state.inc(this.state.n)"],
    );
    Ok(())
}

#[test]
fn destructuring_assignment_targets_state() -> Result<()> {
    let unit = compile_single(
        r#"
        function* swap(pair: number[]) {
            let x: number = 0;
            let y: number = 0;
            [x, y] = pair;
            yield x + y;
        }
        "#,
    )?;
    assert_contains_all(&unit.source, &["[this.state.x, this.state.y] = this.state.pair;"]);
    Ok(())
}

#[test]
fn replayed_yield_shapes() -> Result<()> {
    let bare = compile_single("function* g() { yield 1; yield 2; }")?;
    assert_contains_all(
        &bare.source,
        &[
            "case 1: value; this.state.nextStep = 2; return { value: 2, done: false",
            "case 2: value; return { value: undefined, done: true",
        ],
    );

    let declared = compile_single(
        "function* g(): Generator<number, number, number> { let x: number = yield 1; return x * 2; }",
    )?;
    assert_contains_all(
        &declared.source,
        &["case 1: this.state.x = value; return { value: this.state.x * 2, done: true"],
    );

    let returned = compile_single("function* g(): Generator<number, string, string> { return yield 1; }")?;
    assert_contains_all(
        &returned.source,
        &[
            "nextStep(value: string): IteratorResult<number, string>",
            "case 1: return { value: value, done: true",
        ],
    );
    Ok(())
}

#[test]
fn async_generators_emit_async_next_step() -> Result<()> {
    let unit = compile_single(
        r#"
        async function* ticks(n: number): AsyncGenerator<number, void, unknown> {
            const t: number = await fetchTick(n);
            yield t;
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &[
            "async nextStep(value: unknown): Promise<IteratorResult<number, void>>",
            "this.state.t = await fetchTick(this.state.n);",
        ],
    );
    Ok(())
}

#[test]
fn resume_parameter_avoids_state_names() -> Result<()> {
    let unit = compile_single("function* g(value: number) { value += yield value; }")?;
    assert_contains_all(
        &unit.source,
        &["nextStep(value1: any)", "this.state.value += value1;"],
    );
    assert!(unit
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::ResumeNameRenamed { to, .. } if to == "value1")));
    Ok(())
}

#[test]
fn naming_follows_options() -> Result<()> {
    let options = CompileOptions {
        class_suffix: "Machine".to_string(),
        state_field: "s".to_string(),
        counter_field: "pc".to_string(),
        resume_param: "input".to_string(),
        invalid_step_message: "bad step".to_string(),
    };
    let unit = compile_single_with("function* count(n: number) { yield n; }", &options)?;
    assert_eq!(unit.class_name, "CountMachine");
    assert_contains_all(
        &unit.source,
        &[
            "class CountMachine",
            "private s:",
            "this.s = { pc: 0, n: n",
            "nextStep(input: any)",
            "switch (this.s.pc)",
            "value: this.s.n",
            r#"throw new Error("bad step")"#,
        ],
    );
    Ok(())
}

#[test]
fn block_scoped_names_shadow_state() -> Result<()> {
    let unit = compile_single(
        r#"
        function* inner(n: number) {
            const f = () => { let n = 1; return n; };
            yield f();
            yield n;
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &[
            "() => { let n = 1; return n; }",
            "value: this.state.f()",
            "value: this.state.n, done: false",
        ],
    );
    assert!(!squash(&unit.source).contains("returnthis.state.n"));
    Ok(())
}

#[test]
fn loop_counters_shadow_state() -> Result<()> {
    let unit = compile_single(
        r#"
        function* loops(i: number) {
            let total: number = 0;
            for (let i = 0; i < 3; i++) { total += i; }
            yield i;
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &[
            "for (let i = 0; i < 3; i++) { this.state.total += i; }",
            "value: this.state.i, done: false",
        ],
    );
    Ok(())
}

#[test]
fn hoisted_vars_shadow_state_in_nested_functions() -> Result<()> {
    let unit = compile_single(
        r#"
        function* hoist(n: number) {
            const f = function () { if (n > 0) { var n = 2; } return n; };
            yield f();
        }
        "#,
    )?;
    assert_contains_all(&unit.source, &["if (n > 0) { var n = 2; } return n;"]);
    Ok(())
}

#[test]
fn resume_parameter_avoids_free_names() -> Result<()> {
    let unit = compile_single("const value = 42; function* g() { yield value; }")?;
    assert_contains_all(
        &unit.source,
        &["nextStep(value1: any)", "return { value: value, done: false"],
    );
    assert!(unit
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::ResumeNameRenamed { to, .. } if to == "value1")));
    Ok(())
}

#[test]
fn nested_return_ends_the_machine() -> Result<()> {
    let unit = compile_single("function* g(c: boolean, x: number) { yield 1; if (c) return x; }")?;
    assert_contains_all(
        &unit.source,
        &["case 1: value; return { value: this.state.x, done: true"],
    );
    assert!(!squash(&unit.source).contains("if(this.state.c)"));
    assert!(unit
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::NestedReturn { offset: Some(_) })));
    Ok(())
}

#[test]
fn catch_setter_and_constructor_bindings_shadow_state() -> Result<()> {
    let unit = compile_single(
        r#"
        function* scopes(e: number, v: number, n: number) {
            try { risky(); } catch (e) { log(e); }
            const o = { set v(v) { this.last = v; } };
            const C = class { constructor(n) { this.n = n; } };
            yield new C(e + v + n);
        }
        "#,
    )?;
    assert_contains_all(
        &unit.source,
        &[
            "catch (e) { log(e); }",
            "set v(v) { this.last = v; }",
            "constructor(n) { this.n = n; }",
            "value: new this.state.C(this.state.e + this.state.v + this.state.n)",
        ],
    );
    Ok(())
}

#[test]
fn shorthand_assignment_patterns_target_state() -> Result<()> {
    let unit = compile_single(
        r#"
        function* unpack(o: any) {
            let a: number = 0;
            ({ a } = o);
            yield a;
        }
        "#,
    )?;
    assert_contains_all(&unit.source, &["({ a: this.state.a } = this.state.o);"]);
    Ok(())
}
