//! deps.rs — Extraction des cibles d’import du texte final.
//!
//! Formes reconnues (ordre d’apparition, doublons conservés) :
//!   import x from 'a'        import { y } from "a"      import type T from 'a'
//!   import 'side-effect'     import('dyn')              export * from 'a'
//!   export { z } from 'a'
//! Travaille sur les tokens : chaînes et commentaires ne sont jamais lus
//! comme des imports.

use crate::lexer::{tokenize, TokKind, Token};

pub fn extract_dependencies(text: &str, markup: bool) -> Vec<String> {
    let toks = tokenize(text, markup);
    let mut out = Vec::new();
    let mut i = 0;
    while i < toks.len() {
        let t = toks[i];
        // `obj.import` / `x.export` ne sont que des membres
        let is_member = i > 0 && toks[i - 1].kind == TokKind::Dot;
        match t.kind {
            TokKind::KwImport if !is_member => {
                let next = toks.get(i + 1).map(|t| t.kind);
                match next {
                    Some(TokKind::Str) => push_target(&mut out, text, &toks[i + 1]),
                    Some(TokKind::LParen) => {
                        if let (Some(s), Some(close)) = (toks.get(i + 2), toks.get(i + 3)) {
                            if s.kind == TokKind::Str && close.kind == TokKind::RParen {
                                push_target(&mut out, text, s);
                            }
                        }
                    }
                    // import.meta
                    Some(TokKind::Dot) => {}
                    _ => {
                        if let Some(j) = find_from_clause(&toks, i + 1) {
                            push_target(&mut out, text, &toks[j]);
                            i = j;
                        }
                    }
                }
            }
            TokKind::KwExport if !is_member => {
                let next = toks.get(i + 1).map(|t| t.kind);
                if matches!(next, Some(TokKind::Star | TokKind::LBrace)) {
                    if let Some(j) = find_from_clause(&toks, i + 1) {
                        push_target(&mut out, text, &toks[j]);
                        i = j;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    out
}

/// Index de la chaîne qui suit `from`, avant la fin de l’instruction.
fn find_from_clause(toks: &[Token], start: usize) -> Option<usize> {
    let mut j = start;
    while let Some(t) = toks.get(j) {
        match t.kind {
            TokKind::KwFrom => {
                return toks.get(j + 1).filter(|s| s.kind == TokKind::Str).map(|_| j + 1);
            }
            TokKind::Semicolon | TokKind::Eof | TokKind::KwImport | TokKind::KwExport => return None,
            _ => j += 1,
        }
    }
    None
}

fn push_target(out: &mut Vec<String>, text: &str, tok: &Token) {
    if let Some(s) = unquote(tok.text(text)) {
        out.push(s.to_string());
    }
}

/// `'x'` / `"x"` → `x` ; chaîne non fermée → `None`.
fn unquote(lit: &str) -> Option<&str> {
    let q = lit.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    if lit.len() < 2 || !lit.ends_with(q) {
        return None;
    }
    Some(&lit[1..lit.len() - 1])
}
