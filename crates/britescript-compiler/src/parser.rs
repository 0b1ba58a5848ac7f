//! parser.rs — Descente récursive tolérante : tokens → `Module`.
//!
//! Principe : on ne reconnaît que les constructions réécrites (`struct`,
//! `trait`, `impl … for`, `let`, `|>`), le reste devient des tranches `Other`.
//! Groupes `()`, `[]`, `{}` parcourus récursivement pour trouver les
//! constructions imbriquées (pipe dans des arguments, `let` dans un corps…).
//!
//! Une construction mal formée (nom absent, corps non fermé) n’est pas une
//! erreur : on revient au token de départ et il est recopié tel quel. Seule
//! une imbrication trop profonde fait échouer l’analyse.
//!
//! L’échec d’une tentative ne dépend que de son token de départ : il est mémorisé
//! (`failed`) pour qu’une construction non fermée imbriquée dans une autre ne
//! soit pas réanalysée à chaque retour arrière.

use crate::ast::{Callee, ImplDecl, LetBinding, Module, Node, PipeExpr, PipeStage, Seq, StructDecl, TraitDecl};
use crate::diagnostics::Diagnostic;
use crate::error::{slice, CompileError, Result};
use crate::lexer::{tokenize_checked, Span, TokKind, Token};

pub use crate::lexer::MAX_DEPTH;

/* ───────────────────────── Construction de séquences ───────────────────────── */

/// Accumule les nœuds réécrits d’une séquence ; les trous deviennent `Other`.
struct SeqBuilder {
    nodes: Vec<Node>,
    start: usize,
    cursor: usize,
}

impl SeqBuilder {
    fn new(start: usize) -> Self {
        Self { nodes: Vec::new(), start, cursor: start }
    }

    fn push(&mut self, node: Node) {
        let sp = node.span();
        self.gap_to(sp.start);
        self.nodes.push(node);
        self.cursor = sp.end;
    }

    /// Absorbe une sous-séquence déjà construite (opérande sans pipe).
    fn extend(&mut self, seq: Seq) {
        self.gap_to(seq.span.start);
        for n in seq.nodes {
            match n {
                Node::Other(sp) => self.other(sp),
                n => self.nodes.push(n),
            }
        }
        self.cursor = seq.span.end;
    }

    fn finish(mut self, end: usize) -> Seq {
        self.gap_to(end);
        Seq { nodes: self.nodes, span: Span::new(self.start, end.max(self.start)) }
    }

    fn gap_to(&mut self, to: usize) {
        if to > self.cursor {
            self.other(Span::new(self.cursor, to));
            self.cursor = to;
        }
    }

    fn other(&mut self, sp: Span) {
        if let Some(Node::Other(last)) = self.nodes.last_mut() {
            if last.end == sp.start {
                last.end = sp.end;
                return;
            }
        }
        self.nodes.push(Node::Other(sp));
    }
}

/* ───────────────────────── Parser ───────────────────────── */

pub struct Parser<'a> {
    src: &'a str,
    file: &'a str,
    toks: Vec<Token>,
    /// tentatives (`struct`/`trait`/`impl`, étape de pipe) déjà échouées, par token de départ
    failed: Vec<bool>,
    /// template ou markup trop imbriqué, signalé par le lexer
    too_deep: Option<(u32, u32)>,
    pos: usize,
    depth: usize,
    diags: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str, file: &'a str, markup: bool) -> Self {
        let (toks, too_deep) = tokenize_checked(src, markup);
        Self {
            src,
            file,
            failed: vec![false; toks.len()],
            toks,
            too_deep,
            pos: 0,
            depth: 0,
            diags: Vec::new(),
        }
    }

    /// Analyse le fichier entier. Retourne aussi les avertissements.
    pub fn parse_module(mut self) -> Result<(Module, Vec<Diagnostic>)> {
        if let Some((line, col)) = self.too_deep {
            return Err(self.too_deep_at(line, col));
        }
        let mut seq = SeqBuilder::new(0);
        self.parse_seq(&mut seq, None)?;
        let body = seq.finish(self.src.len());
        Ok((Module { nodes: body.nodes, span: body.span }, self.diags))
    }

    /* ────── séquences & groupes ────── */

    fn parse_seq(&mut self, seq: &mut SeqBuilder, stop: Option<TokKind>) -> Result<()> {
        self.enter()?;
        loop {
            let tok = self.peek();
            match tok.kind {
                TokKind::Eof => break,
                k if Some(k) == stop => break,
                TokKind::KwStruct => match self.try_struct()? {
                    Some(d) => seq.push(Node::Struct(d)),
                    None => self.skip(),
                },
                TokKind::KwTrait => match self.try_trait()? {
                    Some(d) => seq.push(Node::Trait(d)),
                    None => self.skip(),
                },
                TokKind::KwImpl => match self.try_impl()? {
                    Some(d) => seq.push(Node::Impl(d)),
                    None => self.skip(),
                },
                TokKind::KwLet => {
                    if !self.prev_is(TokKind::Dot) {
                        seq.push(Node::Let(LetBinding { span: tok.span }));
                    }
                    self.skip();
                }
                TokKind::LBrace => {
                    self.parse_group(seq, TokKind::RBrace)?;
                }
                TokKind::Ident | TokKind::Number | TokKind::Str | TokKind::Template
                | TokKind::Regex | TokKind::Markup | TokKind::LParen | TokKind::LBracket => {
                    self.parse_operand_or_pipe(seq)?;
                }
                _ => self.skip(),
            }
        }
        self.leave();
        Ok(())
    }

    /// Consomme `open … close`. `Ok(true)` si la fermeture a été trouvée.
    fn parse_group(&mut self, seq: &mut SeqBuilder, close: TokKind) -> Result<bool> {
        self.skip();
        self.parse_seq(seq, Some(close))?;
        if self.peek().kind == close {
            self.skip();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /* ────── opérandes & pipes ────── */

    fn parse_operand_or_pipe(&mut self, seq: &mut SeqBuilder) -> Result<()> {
        let head = self.parse_operand()?;
        if self.peek().kind == TokKind::Pipe {
            self.parse_pipe(head, seq)
        } else {
            seq.extend(head);
            Ok(())
        }
    }

    /// Expression postfixe : primaire puis `.membre`, `(args)`, `[index]`, template tagué.
    fn parse_operand(&mut self) -> Result<Seq> {
        let first = self.peek();
        let mut seq = SeqBuilder::new(first.span.start);
        match first.kind {
            TokKind::LParen => {
                self.parse_group(&mut seq, TokKind::RParen)?;
            }
            TokKind::LBracket => {
                self.parse_group(&mut seq, TokKind::RBracket)?;
            }
            _ => self.skip(),
        }
        loop {
            match self.peek().kind {
                TokKind::Dot if self.peek_at(1).kind.is_word() => {
                    self.skip();
                    self.skip();
                }
                TokKind::LParen => {
                    self.parse_group(&mut seq, TokKind::RParen)?;
                }
                TokKind::LBracket => {
                    self.parse_group(&mut seq, TokKind::RBracket)?;
                }
                TokKind::Template => self.skip(),
                _ => break,
            }
        }
        Ok(seq.finish(self.prev_end()))
    }

    fn parse_pipe(&mut self, head: Seq, seq: &mut SeqBuilder) -> Result<()> {
        let mut stages = Vec::new();
        while self.peek().kind == TokKind::Pipe {
            let save = self.pos;
            if self.failed[save] {
                break;
            }
            self.skip();
            match self.parse_stage()? {
                Some(stage) => stages.push(stage),
                None => {
                    self.give_up::<()>(save);
                    break;
                }
            }
        }
        let Some(last) = stages.last() else {
            let tok = self.peek();
            self.warn(tok, "`|>` sans étape valide ; laissé tel quel");
            seq.extend(head);
            return Ok(());
        };
        let span = Span::new(head.span.start, last.span.end);
        seq.push(Node::Pipe(PipeExpr { head, stages, span }));
        Ok(())
    }

    fn parse_stage(&mut self) -> Result<Option<PipeStage>> {
        let first = self.peek();
        match first.kind {
            TokKind::Ident => {
                let path_end = self.parse_path();
                let path = slice(self.src, first.span.start, path_end)?.to_string();
                if self.peek().kind != TokKind::LParen {
                    return Ok(Some(PipeStage {
                        callee: Callee::Path { path, args: None },
                        span: Span::new(first.span.start, path_end),
                    }));
                }
                let open = self.peek();
                self.skip();
                let mut args = SeqBuilder::new(open.span.end);
                self.parse_seq(&mut args, Some(TokKind::RParen))?;
                let close = self.peek();
                if close.kind != TokKind::RParen {
                    return Ok(None);
                }
                self.skip();
                Ok(Some(PipeStage {
                    callee: Callee::Path { path, args: Some(args.finish(close.span.start)) },
                    span: Span::new(first.span.start, close.span.end),
                }))
            }
            TokKind::LParen => {
                let mut group = SeqBuilder::new(first.span.start);
                if !self.parse_group(&mut group, TokKind::RParen)? {
                    return Ok(None);
                }
                let end = self.prev_end();
                Ok(Some(PipeStage { callee: Callee::Expr(group.finish(end)), span: Span::new(first.span.start, end) }))
            }
            _ => Ok(None),
        }
    }

    /// `a.b.c` ; retourne la fin du dernier segment.
    fn parse_path(&mut self) -> usize {
        self.skip();
        while self.peek().kind == TokKind::Dot && self.peek_at(1).kind.is_word() {
            self.skip();
            self.skip();
        }
        self.prev_end()
    }

    /* ────── déclarations ────── */

    /// `Name` + génériques optionnels `<…>`.
    fn parse_decl_head(&mut self) -> Result<Option<(String, Option<String>)>> {
        let name_tok = self.peek();
        if name_tok.kind != TokKind::Ident {
            return Ok(None);
        }
        self.skip();
        let name = name_tok.text(self.src).to_string();
        if self.peek().kind != TokKind::Lt {
            return Ok(Some((name, None)));
        }
        Ok(self.parse_generics()?.map(|g| (name, Some(g))))
    }

    /// `<…>` équilibré ; contenu rogné.
    fn parse_generics(&mut self) -> Result<Option<String>> {
        let lt = self.peek();
        self.skip();
        let mut depth = 1usize;
        loop {
            let t = self.peek();
            match t.kind {
                TokKind::Lt => depth += 1,
                TokKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        self.skip();
                        let inner = slice(self.src, lt.span.end, t.span.start)?.trim();
                        return Ok(Some(inner.to_string()));
                    }
                }
                TokKind::Eof | TokKind::LBrace | TokKind::RBrace | TokKind::Semicolon => return Ok(None),
                _ => {}
            }
            self.skip();
        }
    }

    fn try_struct(&mut self) -> Result<Option<StructDecl>> {
        let save = self.pos;
        if self.failed[save] {
            return Ok(None);
        }
        let kw = self.peek();
        self.skip();
        let Some((name, generics)) = self.parse_decl_head()? else {
            return Ok(self.give_up(save));
        };
        if self.peek().kind != TokKind::LBrace {
            return Ok(self.give_up(save));
        }
        let open = self.peek();
        self.skip();

        // champs séparés par `;` au niveau 0 du corps
        let mut fields = Vec::new();
        let mut seg_start = open.span.end;
        let mut depth = 0usize;
        loop {
            let t = self.peek();
            match t.kind {
                TokKind::Eof => {
                    self.warn(kw, format!("struct `{name}` non fermé ; laissé tel quel"));
                    return Ok(self.give_up(save));
                }
                TokKind::RBrace if depth == 0 => {
                    self.push_field(&mut fields, seg_start, t.span.start)?;
                    self.skip();
                    return Ok(Some(StructDecl { name, generics, fields, span: Span::new(kw.span.start, t.span.end) }));
                }
                TokKind::Semicolon if depth == 0 => {
                    self.push_field(&mut fields, seg_start, t.span.start)?;
                    seg_start = t.span.end;
                }
                TokKind::LBrace | TokKind::LParen | TokKind::LBracket => depth += 1,
                TokKind::RBrace | TokKind::RParen | TokKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.skip();
        }
    }

    fn push_field(&self, fields: &mut Vec<String>, start: usize, end: usize) -> Result<()> {
        let f = slice(self.src, start, end)?.trim();
        if !f.is_empty() {
            fields.push(f.to_string());
        }
        Ok(())
    }

    fn try_trait(&mut self) -> Result<Option<TraitDecl>> {
        let save = self.pos;
        if self.failed[save] {
            return Ok(None);
        }
        let kw = self.peek();
        self.skip();
        let Some((name, generics)) = self.parse_decl_head()? else {
            return Ok(self.give_up(save));
        };
        match self.parse_body(&kw, "trait", &name)? {
            Some((body, end)) => Ok(Some(TraitDecl { name, generics, body, span: Span::new(kw.span.start, end) })),
            None => Ok(self.give_up(save)),
        }
    }

    fn try_impl(&mut self) -> Result<Option<ImplDecl>> {
        let save = self.pos;
        if self.failed[save] {
            return Ok(None);
        }
        let kw = self.peek();
        self.skip();
        let Some((trait_name, generics)) = self.parse_decl_head()? else {
            return Ok(self.give_up(save));
        };
        if self.peek().kind != TokKind::KwFor {
            if self.peek().kind == TokKind::LBrace {
                self.warn(kw, format!("`impl {trait_name}` sans `for` non supporté ; laissé tel quel"));
            }
            return Ok(self.give_up(save));
        }
        self.skip();
        let Some((target, target_generics)) = self.parse_decl_head()? else {
            return Ok(self.give_up(save));
        };
        match self.parse_body(&kw, "impl", &trait_name)? {
            Some((body, end)) => Ok(Some(ImplDecl {
                trait_name,
                generics,
                target,
                target_generics,
                body,
                span: Span::new(kw.span.start, end),
            })),
            None => Ok(self.give_up(save)),
        }
    }

    /// `{ … }` dont l’intérieur est analysé ; retourne (intérieur, fin après `}`).
    fn parse_body(&mut self, kw: &Token, what: &str, name: &str) -> Result<Option<(Seq, usize)>> {
        let open = self.peek();
        if open.kind != TokKind::LBrace {
            return Ok(None);
        }
        self.skip();
        let mut body = SeqBuilder::new(open.span.end);
        self.parse_seq(&mut body, Some(TokKind::RBrace))?;
        let close = self.peek();
        if close.kind != TokKind::RBrace {
            self.warn(*kw, format!("{what} `{name}` non fermé ; laissé tel quel"));
            return Ok(None);
        }
        self.skip();
        Ok(Some((body.finish(close.span.start), close.span.end)))
    }

    /* ────── utilitaires ────── */

    fn peek(&self) -> Token {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Token {
        let last = self.toks.len().saturating_sub(1);
        self.toks[(self.pos + ahead).min(last)]
    }

    fn skip(&mut self) {
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
    }

    fn prev_is(&self, kind: TokKind) -> bool {
        self.pos > 0 && self.toks[self.pos - 1].kind == kind
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 { 0 } else { self.toks[self.pos - 1].span.end }
    }

    /// Retour au token `save`, mémorisé comme point d’échec.
    fn give_up<T>(&mut self, save: usize) -> Option<T> {
        self.failed[save] = true;
        self.pos = save;
        None
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let t = self.peek();
            return Err(self.too_deep_at(t.line, t.col));
        }
        Ok(())
    }

    fn too_deep_at(&self, line: u32, col: u32) -> CompileError {
        CompileError::NestingTooDeep { file: self.file.to_string(), line, col, limit: MAX_DEPTH }
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn warn(&mut self, at: Token, msg: impl Into<String>) {
        let d = Diagnostic::warning(msg).at(self.file, at.line, at.col);
        let dup = self.diags.iter().any(|x| x.message == d.message && x.line == d.line && x.column == d.column);
        if !dup {
            self.diags.push(d);
        }
    }
}

/* ───────────────────────────── Tests ───────────────────────────── */

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> (Module, Vec<Diagnostic>) {
        Parser::new(src, "t.bs", false).parse_module().unwrap()
    }

    fn rewritten(m: &Module) -> Vec<&Node> {
        m.nodes.iter().filter(|n| !matches!(n, Node::Other(_))).collect()
    }

    #[test]
    fn nodes_cover_the_source() {
        let src = "import x from 'y';\nlet a = b |> f;\nstruct S { x: number; }\n";
        let (m, _) = parse(src);
        let mut cursor = 0;
        for n in &m.nodes {
            assert_eq!(n.span().start, cursor);
            cursor = n.span().end;
        }
        assert_eq!(cursor, src.len());
    }

    #[test]
    fn struct_fields_split_on_semicolons() {
        let (m, _) = parse("struct Container<T> { value: T; count: number;; }");
        let Node::Struct(d) = rewritten(&m)[0] else { panic!("struct attendu") };
        assert_eq!(d.name, "Container");
        assert_eq!(d.generics.as_deref(), Some("T"));
        assert_eq!(d.fields, vec!["value: T", "count: number"]);
    }

    #[test]
    fn struct_with_nested_braces() {
        let (m, _) = parse("struct Cfg { inner: { a: number; b: string }; tag: string }");
        let Node::Struct(d) = rewritten(&m)[0] else { panic!("struct attendu") };
        assert_eq!(d.fields, vec!["inner: { a: number; b: string }", "tag: string"]);
    }

    #[test]
    fn impl_head_with_generics() {
        let (m, _) = parse("impl Show<T> for Box<T> { show() { return 1; } }");
        let Node::Impl(d) = rewritten(&m)[0] else { panic!("impl attendu") };
        assert_eq!((d.trait_name.as_str(), d.target.as_str()), ("Show", "Box"));
        assert_eq!(d.generics.as_deref(), Some("T"));
        assert_eq!(d.target_generics.as_deref(), Some("T"));
    }

    #[test]
    fn pipe_stages_and_nested_args() {
        let (m, _) = parse("x |> f |> g(1, h(2)) |> ns.k");
        let Node::Pipe(p) = rewritten(&m)[0] else { panic!("pipe attendu") };
        assert_eq!(p.stages.len(), 3);
        let Callee::Path { path, args: Some(args) } = &p.stages[1].callee else { panic!("appel attendu") };
        assert_eq!(path, "g");
        assert_eq!(&"x |> f |> g(1, h(2)) |> ns.k"[args.span.start..args.span.end], "1, h(2)");
    }

    #[test]
    fn let_after_dot_is_a_member() {
        let (m, _) = parse("obj.let = 1; let y = 2;");
        assert_eq!(rewritten(&m).len(), 1);
    }

    #[test]
    fn unterminated_struct_is_left_alone_with_warning() {
        let (m, diags) = parse("struct Open { a: number;");
        assert!(rewritten(&m).is_empty());
        assert_eq!(diags.len(), 1);
        assert!(diags[0].to_string().starts_with("t.bs:1:1:"));
    }

    #[test]
    fn inherent_impl_is_reported() {
        let (m, diags) = parse("impl Foo { bar() {} }");
        assert!(rewritten(&m).is_empty());
        assert!(diags[0].message.contains("sans `for`"));
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let src = format!("{}x{}", "(".repeat(MAX_DEPTH + 8), ")".repeat(MAX_DEPTH + 8));
        let err = Parser::new(&src, "deep.bs", false).parse_module().unwrap_err();
        assert!(matches!(err, CompileError::NestingTooDeep { limit: MAX_DEPTH, .. }));
    }
}
