//! codegen.rs — Émission TypeScript depuis l’AST.
//!
//! Le texte source est recopié par tranches ; seuls les nœuds dont la passe
//! est active sont réécrits. Chaque tranche recopiée et chaque nœud réécrit
//! pose une *ancre* (offset généré ↔ offset source) pour la source map.

use crate::ast::{Callee, ImplDecl, Module, Node, PipeExpr, Seq, StructDecl, TraitDecl};
use crate::error::{slice, Result};
use crate::lexer::Span;
use crate::passes::{PassKind, Passes};

/// Correspondance d’un offset généré vers un offset source (octets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub generated: usize,
    pub original: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Output {
    pub code: String,
    pub anchors: Vec<Anchor>,
}

pub struct Emitter<'a> {
    src: &'a str,
    passes: &'a Passes,
    out: String,
    anchors: Vec<Anchor>,
}

impl<'a> Emitter<'a> {
    pub fn new(src: &'a str, passes: &'a Passes) -> Self {
        Self {
            src,
            passes,
            out: String::with_capacity(src.len() + src.len() / 4),
            anchors: Vec::new(),
        }
    }

    pub fn emit_module(mut self, module: &Module) -> Result<Output> {
        self.emit_nodes(&module.nodes)?;
        Ok(Output { code: self.out, anchors: self.anchors })
    }

    fn emit_nodes(&mut self, nodes: &[Node]) -> Result<()> {
        for n in nodes {
            self.emit_node(n)?;
        }
        Ok(())
    }

    fn emit_node(&mut self, node: &Node) -> Result<()> {
        let active = PassKind::of(node).is_some_and(|k| self.passes.enabled(k));
        match node {
            Node::Other(sp) => self.verbatim(*sp),
            Node::Struct(d) if active => self.lower_struct(d),
            Node::Trait(d) if active => self.lower_trait(d),
            Node::Impl(d) if active => self.lower_impl(d),
            Node::Let(b) if active => {
                self.mark(b.span.start);
                self.out.push_str("const");
                Ok(())
            }
            Node::Pipe(p) if active => {
                self.mark(p.span.start);
                let code = self.render_pipe(p)?;
                self.out.push_str(&code);
                Ok(())
            }
            _ => self.emit_with_holes(node.span(), &node.holes()),
        }
    }

    /// Recopie `span` en émettant récursivement les sous-séquences `holes`.
    fn emit_with_holes(&mut self, span: Span, holes: &[&Seq]) -> Result<()> {
        let mut cursor = span.start;
        for h in holes {
            self.verbatim(Span::new(cursor, h.span.start))?;
            self.emit_nodes(&h.nodes)?;
            cursor = h.span.end;
        }
        self.verbatim(Span::new(cursor, span.end))
    }

    /* ────── tranches & ancres ────── */

    fn verbatim(&mut self, span: Span) -> Result<()> {
        if span.is_empty() {
            return Ok(());
        }
        let text = slice(self.src, span.start, span.end)?;
        self.mark(span.start);
        for (i, _) in text.match_indices('\n') {
            if i + 1 < text.len() {
                self.anchors.push(Anchor { generated: self.out.len() + i + 1, original: span.start + i + 1 });
            }
        }
        self.out.push_str(text);
        Ok(())
    }

    fn mark(&mut self, original: usize) {
        self.anchors.push(Anchor { generated: self.out.len(), original });
    }

    /* ────── déclarations ────── */

    fn lower_struct(&mut self, d: &StructDecl) -> Result<()> {
        self.mark(d.span.start);
        self.out.push_str("type ");
        self.out.push_str(&d.name);
        push_generics(&mut self.out, d.generics.as_deref());
        if d.fields.is_empty() {
            self.out.push_str(" = {};");
            return Ok(());
        }
        self.out.push_str(" = {\n");
        for f in &d.fields {
            self.out.push_str("  ");
            self.out.push_str(f);
            self.out.push_str(";\n");
        }
        self.out.push_str("};");
        Ok(())
    }

    fn lower_trait(&mut self, d: &TraitDecl) -> Result<()> {
        self.mark(d.span.start);
        self.out.push_str("interface ");
        self.out.push_str(&d.name);
        push_generics(&mut self.out, d.generics.as_deref());
        self.out.push_str(" {");
        self.emit_body(&d.body)?;
        self.out.push('}');
        Ok(())
    }

    fn lower_impl(&mut self, d: &ImplDecl) -> Result<()> {
        self.mark(d.span.start);
        let out = &mut self.out;
        out.push_str("class ");
        out.push_str(&d.target);
        out.push_str(&d.trait_name);
        out.push_str("Impl");
        push_generics(out, d.generics.as_deref());
        out.push_str(" implements ");
        out.push_str(&d.trait_name);
        push_generics(out, d.generics.as_deref());
        out.push_str(" {\n  constructor(private data: ");
        out.push_str(&d.target);
        push_generics(out, d.target_generics.as_deref());
        out.push_str(") {}");
        self.emit_body(&d.body)?;
        self.out.push('}');
        Ok(())
    }

    /// Corps entre accolades : recopié, constructions imbriquées réécrites.
    fn emit_body(&mut self, body: &Seq) -> Result<()> {
        self.emit_nodes(&body.nodes)
    }

    /* ────── pipes ────── */

    /// Repli gauche : `acc = head ; acc = stage(acc)`.
    fn render_pipe(&self, p: &PipeExpr) -> Result<String> {
        let mut acc = self.render(&p.head)?.trim().to_string();
        for st in &p.stages {
            acc = match &st.callee {
                Callee::Path { path, args: None } => format!("{path}({acc})"),
                Callee::Path { path, args: Some(args) } => {
                    let inner = self.render(args)?;
                    if inner.trim().is_empty() {
                        format!("{path}({acc})")
                    } else {
                        format!("{path}({acc}, {})", inner.trim_start())
                    }
                }
                Callee::Expr(group) => format!("{}({acc})", self.render(group)?),
            };
        }
        Ok(acc)
    }

    /// Émission isolée d’une sous-séquence (sans ancres).
    fn render(&self, seq: &Seq) -> Result<String> {
        let mut sub = Emitter::new(self.src, self.passes);
        sub.emit_nodes(&seq.nodes)?;
        Ok(sub.out)
    }
}

fn push_generics(out: &mut String, generics: Option<&str>) {
    if let Some(g) = generics {
        out.push('<');
        out.push_str(g);
        out.push('>');
    }
}

/* ───────────────────────────── Tests ───────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn emit_with(src: &str, passes: &Passes) -> String {
        let (m, _) = Parser::new(src, "t.bs", false).parse_module().unwrap();
        Emitter::new(src, passes).emit_module(&m).unwrap().code
    }

    fn emit(src: &str) -> String {
        emit_with(src, &Passes::standard())
    }

    #[test]
    fn struct_becomes_type_alias() {
        assert_eq!(
            emit("struct User { name: string; age: number; }"),
            "type User = {\n  name: string;\n  age: number;\n};"
        );
        assert_eq!(emit("struct Unit {}"), "type Unit = {};");
    }

    #[test]
    fn trait_and_impl() {
        assert_eq!(emit("trait Show<T> { show(x: T): string; }"), "interface Show<T> { show(x: T): string; }");
        assert_eq!(
            emit("impl Show for User { show() { return this.data.name; } }"),
            "class UserShowImpl implements Show {\n  constructor(private data: User) {} show() { return this.data.name; } }"
        );
    }

    #[test]
    fn let_in_impl_body_is_rewritten() {
        let out = emit("impl A for B { run() { let x = 1; } }");
        assert!(out.contains("const x = 1;"));
        assert!(!out.contains("let"));
    }

    #[test]
    fn pipe_folds_left() {
        assert_eq!(emit("let r = x |> f |> g(1) |> h();"), "const r = h(g(f(x), 1));");
        assert_eq!(emit("v |> (n => n * 2) |> ns.log"), "ns.log((n => n * 2)(v))");
        assert_eq!(emit("f(a |> g, b)"), "f(g(a), b)");
    }

    #[test]
    fn nested_pipe_in_arguments() {
        assert_eq!(emit("x |> add(y |> double, 3)"), "add(x, double(y), 3)");
    }

    #[test]
    fn disabled_pass_keeps_node_but_rewrites_inside() {
        let p = Passes::standard().without(PassKind::Trait);
        let src = "trait T { f(): void; } let a = 1;";
        assert_eq!(emit_with(src, &p), "trait T { f(): void; } const a = 1;");

        let p = Passes::standard().without(PassKind::Pipe);
        assert_eq!(emit_with("let a = b |> f;", &p), "const a = b |> f;");
    }

    #[test]
    fn anchors_track_lines() {
        let src = "a;\nb;\nstruct S { x: number }\n";
        let (m, _) = Parser::new(src, "t.bs", false).parse_module().unwrap();
        let out = Emitter::new(src, &Passes::standard()).emit_module(&m).unwrap();
        assert!(out.anchors.contains(&Anchor { generated: 3, original: 3 }));
        assert!(out.anchors.contains(&Anchor { generated: 6, original: 6 }));
    }
}
