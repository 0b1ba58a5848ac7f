//! lexer.rs — Analyse lexicale tolérante de Britescript (.bs / .bsx)
//!
//! Objectifs :
//! - Ne jamais échouer : toute entrée produit une suite de tokens terminée par `Eof`.
//! - Spans en octets + ligne/colonne 1-based : l’émission recopie la source par
//!   tranches, donc espaces et commentaires n’ont pas besoin d’être des tokens.
//! - Commentaires `//…` et `/* … */` ignorés (non fermé → fin de fichier).
//! - Chaînes `'…'` / `"…"` (non fermée → s’arrête en fin de ligne),
//!   templates `` `…${…}…` `` avec imbrication.
//! - Littéraux regex `/…/flags` là où un `/` ne peut pas être une division
//!   (heuristique sur le token précédent) ; sinon `/` reste une ponctuation.
//! - Mots-clés utiles à la réécriture : `struct trait impl for let import export from`.
//! - Mode markup (`.bsx`) : un `<` en position d’expression ouvre un token `Markup`
//!   qui couvre tout l’élément (voir `markup.rs`).
//!
//! - Imbrication (templates, markup) bornée par `MAX_DEPTH` : au-delà, le reste
//!   du texte devient un seul token et la position est signalée (`tokenize_checked`).
//!
//! API :
//!   let toks = tokenize(src, markup);

use crate::markup;

/// Profondeur max de groupes / templates / markup imbriqués.
pub const MAX_DEPTH: usize = 256;

/* ───────────────────────── Spans ───────────────────────── */

/// Tranche `[start, end)` en octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/* ───────────────────────── Tokens ───────────────────────── */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    // Ident & mots-clés
    Ident,
    KwStruct, KwTrait, KwImpl, KwFor, KwLet,
    KwImport, KwExport, KwFrom,

    // Littéraux
    Number,
    Str,
    Template,
    Regex,
    Markup,

    // Punctuation
    Pipe,      // |>
    Arrow,     // =>
    Dot,       // . ou ?.
    LParen, RParen, LBrace, RBrace, LBracket, RBracket,
    Lt, Gt, Semicolon, Comma, Star,
    Punct(char),

    // Fin
    Eof,
}

impl TokKind {
    /// Identifiant ou mot-clé (acceptable comme nom de membre après `.`).
    pub fn is_word(self) -> bool {
        matches!(
            self,
            TokKind::Ident
                | TokKind::KwStruct | TokKind::KwTrait | TokKind::KwImpl | TokKind::KwFor
                | TokKind::KwLet | TokKind::KwImport | TokKind::KwExport | TokKind::KwFrom
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokKind,
    pub span: Span,
    pub line: u32,
    pub col: u32,
}

impl Token {
    /// Lexème brut (slice de la source).
    pub fn text<'s>(&self, src: &'s str) -> &'s str {
        src.get(self.span.start..self.span.end).unwrap_or("")
    }
}

/// Tokenise intégralement la source (dernier token : `Eof`).
pub fn tokenize(src: &str, markup: bool) -> Vec<Token> {
    tokenize_checked(src, markup).0
}

/// Comme `tokenize`, avec la position (ligne, colonne) d’une imbrication trop profonde.
pub fn tokenize_checked(src: &str, markup: bool) -> (Vec<Token>, Option<(u32, u32)>) {
    let mut lx = Lexer::new(src, markup);
    let mut out = Vec::new();
    loop {
        let t = lx.next_token();
        let end = t.kind == TokKind::Eof;
        out.push(t);
        if end {
            break;
        }
    }
    (out, lx.too_deep)
}

/* ───────────────────────── Lexer ───────────────────────── */

pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    markup: bool,
    /// dernier token significatif (décide si `<` ouvre du markup)
    prev: Option<Token>,
    /// `?` de ternaires encore ouverts ; `:` ne précède du markup que s’il en ferme un
    ternaries: usize,
    colon_closes_ternary: bool,
    too_deep: Option<(u32, u32)>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, markup: bool) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            markup,
            prev: None,
            ternaries: 0,
            colon_closes_ternary: false,
            too_deep: None,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let (start, line, col) = (self.pos, self.line, self.col);
        let Some(c) = self.peek_char() else {
            return Token { kind: TokKind::Eof, span: Span::new(start, start), line, col };
        };

        let kind = match c {
            c if is_ident_start(c) => self.lex_word(),
            c if c.is_ascii_digit() => {
                self.lex_number();
                TokKind::Number
            }
            '"' | '\'' => {
                self.lex_quoted(c);
                TokKind::Str
            }
            '`' => {
                let end = scan_template(self.bytes, start).unwrap_or_else(|| {
                    self.too_deep.get_or_insert((line, col));
                    self.bytes.len()
                });
                self.advance_to(end);
                TokKind::Template
            }
            '|' if self.at(1) == Some(b'>') => self.punct2(TokKind::Pipe),
            '=' if self.at(1) == Some(b'>') => self.punct2(TokKind::Arrow),
            '?' if self.at(1) == Some(b'.') && !self.at(2).is_some_and(|b| b.is_ascii_digit()) => {
                self.punct2(TokKind::Dot)
            }
            '<' if self.markup
                && self.markup_allowed()
                && markup::is_tag_start(self.bytes, start)
                && !markup::is_type_parameters(self.bytes, start) =>
            {
                match markup::scan_element(self.src, start) {
                    Some(end) if end > start + 1 => {
                        self.advance_to(end);
                        TokKind::Markup
                    }
                    Some(_) => self.punct1(TokKind::Lt),
                    None => {
                        self.too_deep.get_or_insert((line, col));
                        self.advance_to(self.bytes.len());
                        TokKind::Markup
                    }
                }
            }
            '(' => self.punct1(TokKind::LParen),
            ')' => self.punct1(TokKind::RParen),
            '{' => self.punct1(TokKind::LBrace),
            '}' => self.punct1(TokKind::RBrace),
            '[' => self.punct1(TokKind::LBracket),
            ']' => self.punct1(TokKind::RBracket),
            '<' => self.punct1(TokKind::Lt),
            '>' => self.punct1(TokKind::Gt),
            ';' => self.punct1(TokKind::Semicolon),
            ',' => self.punct1(TokKind::Comma),
            '.' => self.punct1(TokKind::Dot),
            '*' => self.punct1(TokKind::Star),
            '/' if self.regex_allowed() => match scan_regex(self.bytes, start) {
                Some(end) => {
                    self.advance_to(end);
                    TokKind::Regex
                }
                None => self.punct1(TokKind::Punct('/')),
            },
            other => {
                self.bump();
                TokKind::Punct(other)
            }
        };

        let tok = Token { kind, span: Span::new(start, self.pos), line, col };
        self.track_ternary(tok);
        self.prev = Some(tok);
        tok
    }

    /* ────── core ────── */

    fn peek_char(&self) -> Option<char> {
        self.src.get(self.pos..).and_then(|s| s.chars().next())
    }

    fn at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_to(&mut self, end: usize) {
        while self.pos < end {
            if self.bump().is_none() {
                break;
            }
        }
    }

    fn punct1(&mut self, kind: TokKind) -> TokKind {
        self.bump();
        kind
    }

    fn punct2(&mut self, kind: TokKind) -> TokKind {
        self.bump();
        self.bump();
        kind
    }

    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            let rest = &self.bytes[self.pos..];
            if rest.starts_with(b"//") || (self.pos == 0 && rest.starts_with(b"#!")) {
                while matches!(self.peek_char(), Some(c) if c != '\n') {
                    self.bump();
                }
                continue;
            }
            if rest.starts_with(b"/*") {
                let end = rest[2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(self.bytes.len(), |p| self.pos + 2 + p + 2);
                self.advance_to(end);
                continue;
            }
            break;
        }
    }

    fn lex_word(&mut self) -> TokKind {
        let start = self.pos;
        while matches!(self.peek_char(), Some(c) if is_ident_continue(c)) {
            self.bump();
        }
        match &self.src[start..self.pos] {
            "struct" => TokKind::KwStruct,
            "trait" => TokKind::KwTrait,
            "impl" => TokKind::KwImpl,
            "for" => TokKind::KwFor,
            "let" => TokKind::KwLet,
            "import" => TokKind::KwImport,
            "export" => TokKind::KwExport,
            "from" => TokKind::KwFrom,
            _ => TokKind::Ident,
        }
    }

    fn lex_number(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
                    self.bump();
                }
                Some('.') if self.at(1).is_some_and(|b| b.is_ascii_digit()) => {
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn lex_quoted(&mut self, quote: char) {
        self.bump();
        while let Some(c) = self.peek_char() {
            match c {
                '\\' => {
                    self.bump();
                    if self.peek_char() != Some('\n') {
                        self.bump();
                    }
                }
                '\n' => break,
                c if c == quote => {
                    self.bump();
                    break;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// `<` ouvre du markup seulement en position d’expression.
    fn markup_allowed(&self) -> bool {
        let Some(prev) = self.prev else { return true };
        match prev.kind {
            TokKind::LParen | TokKind::LBracket | TokKind::LBrace | TokKind::Comma
            | TokKind::Semicolon | TokKind::Arrow => true,
            // `: <T>() => T` est une annotation de type
            TokKind::Punct(':') => self.colon_closes_ternary,
            TokKind::Punct(c) => matches!(c, '=' | '?' | '&' | '|' | '!'),
            TokKind::Ident => matches!(prev.text(self.src), "return" | "yield" | "default" | "case"),
            _ => false,
        }
    }

    /// `/` ouvre une regex sauf après une valeur (où c’est une division).
    fn regex_allowed(&self) -> bool {
        let Some(prev) = self.prev else { return true };
        match prev.kind {
            TokKind::Ident => matches!(
                prev.text(self.src),
                "return" | "typeof" | "case" | "do" | "else" | "in" | "of" | "instanceof"
                    | "new" | "delete" | "void" | "throw" | "yield" | "await"
            ),
            TokKind::Number | TokKind::Str | TokKind::Template | TokKind::Regex | TokKind::Markup
            | TokKind::RParen | TokKind::RBracket | TokKind::RBrace => false,
            k => !k.is_word(),
        }
    }

    fn track_ternary(&mut self, tok: Token) {
        match tok.kind {
            // `??` et `??=` ne sont pas des ternaires
            TokKind::Punct('?') => {
                let s = tok.span.start;
                let doubled = self.bytes.get(s + 1) == Some(&b'?') || (s > 0 && self.bytes[s - 1] == b'?');
                if !doubled {
                    self.ternaries += 1;
                }
            }
            TokKind::Punct(':') => {
                self.colon_closes_ternary = self.ternaries > 0;
                self.ternaries = self.ternaries.saturating_sub(1);
            }
            TokKind::Semicolon => self.ternaries = 0,
            _ => {}
        }
    }
}

/// Fin (exclusive) d’un template littéral commençant à `start` (sur `` ` ``).
/// `None` si l’imbrication `${ `…` }` dépasse `MAX_DEPTH`.
///
/// Pile explicite : `0` = dans le texte d’un template, `n > 0` = dans une
/// substitution `${…}` avec `n` accolades ouvertes.
fn scan_template(b: &[u8], start: usize) -> Option<usize> {
    let mut stack: Vec<usize> = vec![0];
    let mut i = start + 1;
    while i < b.len() {
        let Some(&top) = stack.last() else { break };
        if top == 0 {
            match b[i] {
                b'\\' => i += 2,
                b'`' => {
                    stack.pop();
                    i += 1;
                    if stack.is_empty() {
                        return Some(i);
                    }
                }
                b'$' if b.get(i + 1) == Some(&b'{') => {
                    stack.push(1);
                    i += 2;
                }
                _ => i += 1,
            }
        } else {
            let last = stack.len() - 1;
            match b[i] {
                b'{' => {
                    stack[last] += 1;
                    i += 1;
                }
                b'}' => {
                    stack[last] -= 1;
                    if stack[last] == 0 {
                        stack.pop();
                    }
                    i += 1;
                }
                b'`' => {
                    stack.push(0);
                    i += 1;
                }
                b'"' | b'\'' => i = skip_line_string(b, i),
                _ => i += 1,
            }
        }
        if stack.len() > MAX_DEPTH {
            return None;
        }
    }
    Some(b.len())
}

/// Fin d’un littéral regex (drapeaux compris). `None` si non fermé sur la ligne.
fn scan_regex(b: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    while i < b.len() {
        match b[i] {
            b'\n' => return None,
            b'\\' => i += 1,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                i += 1;
                while i < b.len() && (b[i].is_ascii_alphanumeric() || b[i] == b'_') {
                    i += 1;
                }
                return Some(i);
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Chaîne `'…'` / `"…"` dans une substitution ; s’arrête en fin de ligne.
fn skip_line_string(b: &[u8], start: usize) -> usize {
    let q = b[start];
    let mut i = start + 1;
    while i < b.len() && b[i] != q && b[i] != b'\n' {
        if b[i] == b'\\' {
            i += 1;
        }
        i += 1;
    }
    (i + 1).min(b.len())
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/* ───────────────────────────── Tests ───────────────────────────── */
