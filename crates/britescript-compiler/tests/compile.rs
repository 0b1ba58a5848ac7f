use britescript_compiler::{
    compile_str, contains_extended_syntax, CompileResult, Compiler, Options, PassKind, Passes, TransformRequest,
};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn compile(id: &str, src: &str) -> CompileResult {
    compile_str(id, src, &Options::default())
}

#[test]
fn struct_becomes_type_alias() {
    let r = compile("user.bs", "struct User { name: string; age: number; }");
    assert!(r.errors.is_empty());
    assert!(r.code.contains("type User = {"));
    assert!(r.code.contains("name: string;"));
    assert!(r.code.contains("age: number;"));
}

#[test]
fn generic_struct_keeps_parameters() {
    let r = compile("c.bs", "struct Container<T> { value: T; count: number }");
    assert_eq!(r.code, "type Container<T> = {\n  value: T;\n  count: number;\n};");
}

#[test]
fn trait_becomes_interface() {
    let r = compile("d.bs", "trait Displayable { display(): string; }");
    assert!(r.code.contains("interface Displayable {"));
    assert!(r.code.contains("display(): string;"));
}

#[test]
fn let_bindings_become_const() {
    let r = compile("l.bs", "let x = 42;\nlet y = \"hello\";");
    assert_eq!(r.code, "const x = 42;\nconst y = \"hello\";");
    assert!(!contains_extended_syntax(&r.code));
}

#[test]
fn full_module() {
    let src = indoc! {r#"
        import { log } from './log';

        struct Point { x: number; y: number; }

        trait Describe {
          describe(): string;
        }

        impl Describe for Point {
          describe() {
            let s = `(${this.data.x}, ${this.data.y})`;
            return s |> log.format |> trim;
          }
        }
    "#};
    let expected = indoc! {r#"
        import { log } from './log';

        type Point = {
          x: number;
          y: number;
        };

        interface Describe {
          describe(): string;
        }

        class PointDescribeImpl implements Describe {
          constructor(private data: Point) {}
          describe() {
            const s = `(${this.data.x}, ${this.data.y})`;
            return trim(log.format(s));
          }
        }
    "#};
    let r = compile("point.bs", src);
    assert_eq!(r.code, expected);
    assert_eq!(r.dependencies, vec!["./log"]);
    assert!(r.warnings.is_empty());
}

#[test]
fn dependencies_in_first_seen_order() {
    let src = indoc! {r#"
        import React from 'react';
        import { useState } from 'react';
        import './styles.css';
        let n = 1;
    "#};
    let r = compile("app.bs", src);
    assert_eq!(r.dependencies, vec!["react", "react", "./styles.css"]);
}

#[test]
fn text_without_markers_is_untouched() {
    let src = "import x from 'y';\nconst a = 1; // plain TypeScript\nclass B implements C {}\n";
    let r = compile("plain.bs", src);
    assert_eq!(r.code, src);
    assert!(r.map.is_none());
    assert_eq!(r.dependencies, vec!["y"]);
    assert!(r.warnings.is_empty() && r.errors.is_empty());
}

#[test]
fn keywords_in_strings_and_comments_survive() {
    let src = "let msg = 'let struct X {}';\n// let y |> f\nconst t = `trait ${a}`;";
    let r = compile("s.bs", src);
    assert_eq!(r.code, "const msg = 'let struct X {}';\n// let y |> f\nconst t = `trait ${a}`;");
}

#[test]
fn markup_is_byte_identical() {
    let markup = r#"<div className="card" onClick={() => go(1)}>Hello World, let it be</div>"#;
    let src = format!("let view = () => {markup};\nlet n = count |> double;");
    let r = compile("card.bsx", &src);
    assert!(r.code.contains(markup));
    assert!(r.code.contains("const view"));
    assert!(r.code.contains("const n = double(count);"));
}

#[test]
fn markup_with_passthrough_disabled_is_still_lexed() {
    let o = Options { markup_passthrough: false, ..Default::default() };
    let r = compile_str("a.bsx", "let a = b < c;", &o);
    assert_eq!(r.code, "const a = b < c;");
}

#[test]
fn map_toggle() {
    let on = compile("m.bs", "let a = 1;");
    let map: serde_json::Value = serde_json::from_str(on.map.as_deref().unwrap()).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["sources"][0], "m.bs");
    assert_eq!(map["sourcesContent"][0], "let a = 1;");

    let o = Options { source_maps: false, ..Default::default() };
    assert!(compile_str("m.bs", "let a = 1;", &o).map.is_none());
    assert!(compile_str("m.bs", "const a = 1;", &o).map.is_none());
}

#[test]
fn long_pipe_chains_nest() {
    let r = compile("p.bs", "const out = data |> parse |> filter(isValid) |> map((x) => f(x, 1)) |> sum;");
    assert_eq!(r.code, "const out = sum(map(filter(parse(data), isValid), (x) => f(x, 1)));");
}

#[test]
fn pipe_head_is_postfix_expression() {
    let r = compile("p.bs", "api.get(url)[0].body |> json");
    assert_eq!(r.code, "json(api.get(url)[0].body)");
}

#[test]
fn disabled_pass_leaves_construct() {
    let c = Compiler::new(Options::default())
        .unwrap()
        .with_passes(Passes::standard().without(PassKind::Struct));
    let r = c.compile(&TransformRequest::new("a.bs", "struct S { a: number; } let b = 1;"));
    assert_eq!(r.code, "struct S { a: number; } const b = 1;");

    let only = Options { passes: vec!["pipe".into()], ..Default::default() };
    let r = compile_str("a.bs", "let v = x |> f;", &only);
    assert_eq!(r.code, "let v = f(x);");
}

#[test]
fn malformed_constructs_pass_through() {
    let r = compile("bad.bs", "struct { a: number; }\nlet ok = 1;\nstruct Open { a: number;");
    assert!(r.errors.is_empty());
    assert!(r.code.starts_with("struct { a: number; }\nconst ok = 1;"));
    assert_eq!(r.warnings.len(), 1);
}

#[test]
fn excessive_nesting_is_an_error() {
    let depth = 300;
    let src = format!("let x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    let r = compile("deep.bs", &src);
    assert_eq!(r.code, "");
    assert_eq!(r.errors.len(), 1);
    assert!(r.errors[0].contains("deep.bs"));
}

#[test]
fn unclosed_nested_constructs_stay_fast() {
    use std::time::{Duration, Instant};

    for src in ["let a = 0;\n".to_string() + &"a |> f(".repeat(40), "trait A { ".repeat(40), "impl A for B { ".repeat(40)] {
        let t = Instant::now();
        let r = compile("open.bs", &src);
        assert!(t.elapsed() < Duration::from_secs(2), "trop lent : {:?}", t.elapsed());
        assert!(r.errors.is_empty());
        assert!(r.code.ends_with(&src[src.len() - 10..]));
    }
    let r = compile("open.bs", &"trait A { ".repeat(40));
    assert_eq!(r.code, "trait A { ".repeat(40));
    assert!(!r.warnings.is_empty());
}

#[test]
fn deep_templates_and_markup_are_errors() {
    let r = compile("tpl.bs", &format!("let x = {}", "`${".repeat(50_000)));
    assert_eq!(r.code, "");
    assert_eq!(r.errors.len(), 1);
    assert!(r.errors[0].contains("tpl.bs:1:9"));

    let r = compile("view.bsx", &format!("let x = {}", "<a>{".repeat(50_000)));
    assert_eq!(r.code, "");
    assert_eq!(r.errors.len(), 1);
}

#[test]
fn tsx_generics_and_annotations_are_not_markup() {
    let src = indoc! {"
        const id = <T,>(x: T) => x;
        let y = 1;
        struct S { a: number; }
    "};
    let r = compile("g.bsx", src);
    assert!(r.errors.is_empty());
    assert_eq!(r.code, "const id = <T,>(x: T) => x;\nconst y = 1;\ntype S = {\n  a: number;\n};\n");

    let r = compile("h.bsx", "let f: <T>(x: T) => T = g;\nlet k = <U extends object>(u: U) => u;");
    assert_eq!(r.code, "const f: <T>(x: T) => T = g;\nconst k = <U extends object>(u: U) => u;");
}

#[test]
fn regex_literals_do_not_swallow_code() {
    let r = compile("re.bs", "let re = /\"/g; let x = 1;");
    assert_eq!(r.code, "const re = /\"/g; const x = 1;");
}

#[test]
fn host_transform_skips_ineligible_files() {
    let c = Compiler::new(Options::default()).unwrap();
    assert!(c.transform(&TransformRequest::new("node_modules/x/a.bs", "let a = 1;")).is_none());
    assert!(c.transform(&TransformRequest::new("src/a.bs?raw", "let a = 1;")).is_none());
    let r = c.transform(&TransformRequest::new(r"src\a.bs", "let a = 1;").build(true)).unwrap();
    assert_eq!(r.code, "const a = 1;");
}
