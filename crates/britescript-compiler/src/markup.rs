//! markup.rs — Balayage opaque d’un élément markup (`<Tag …>…</Tag>`, `<X/>`, `<>…</>`).
//!
//! Le markup n’est jamais compilé ici : on cherche seulement **où il finit**,
//! pour que le lexer en fasse un seul token recopié octet pour octet.
//! Attributs et conteneurs `{…}` sont parcourus (chaînes sautées, markup
//! imbriqué récursif) uniquement pour trouver la fermeture correspondante.
//! Un élément non fermé s’étend jusqu’à la fin du texte.
//! L’alternance élément / conteneur est bornée par `MAX_DEPTH` (`None` au-delà).

use crate::lexer::MAX_DEPTH;

/// Fin (exclusive) de l’élément qui commence à `start` (sur un `<`).
/// `None` si les conteneurs `{…}` et le markup s’imbriquent trop profondément.
pub fn scan_element(src: &str, start: usize) -> Option<usize> {
    scan(src.as_bytes(), start, 0)
}

/// `<` suivi d’une lettre, de `/` (fermeture) ou de `>` (fragment).
pub fn is_tag_start(b: &[u8], i: usize) -> bool {
    b.get(i) == Some(&b'<')
        && matches!(b.get(i + 1), Some(c) if c.is_ascii_alphabetic() || *c == b'/' || *c == b'>')
}

/// `<T,>` ou `<T extends U>` : paramètres de type d’une fonction fléchée générique.
pub fn is_type_parameters(b: &[u8], i: usize) -> bool {
    let mut j = i + 1;
    while j < b.len() && (b[j].is_ascii_alphanumeric() || b[j] == b'_' || b[j] == b'$') {
        j += 1;
    }
    if j == i + 1 {
        return false;
    }
    while j < b.len() && b[j].is_ascii_whitespace() {
        j += 1;
    }
    let rest = &b[j..];
    rest.first() == Some(&b',')
        || (rest.starts_with(b"extends")
            && !rest.get(7).is_some_and(|c| c.is_ascii_alphanumeric() || *c == b'_' || *c == b'$'))
}

fn scan(b: &[u8], start: usize, level: usize) -> Option<usize> {
    if level > MAX_DEPTH {
        return None;
    }
    let mut i = start;
    let mut depth = 0usize;
    while i < b.len() {
        if is_tag_start(b, i) {
            if b[i + 1] == b'/' {
                i = skip_past(b, i + 2, b'>');
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
                continue;
            }
            let (end, self_closing) = scan_open_tag(b, i + 1, level)?;
            i = end;
            if !self_closing {
                depth += 1;
            } else if depth == 0 {
                return Some(i);
            }
            continue;
        }
        if depth == 0 {
            return Some(i);
        }
        // enfants : texte brut ou conteneur d’expression
        if b[i] == b'{' {
            i = skip_braces(b, i, level + 1)?;
        } else {
            i += 1;
        }
    }
    Some(b.len())
}

/// Parcourt `Tag attr="…" {...spread}` jusqu’à `>` ou `/>`.
fn scan_open_tag(b: &[u8], mut i: usize, level: usize) -> Option<(usize, bool)> {
    while i < b.len() {
        match b[i] {
            b'"' | b'\'' => i = skip_string(b, i),
            b'{' => i = skip_braces(b, i, level + 1)?,
            b'/' if b.get(i + 1) == Some(&b'>') => return Some((i + 2, true)),
            b'>' => return Some((i + 1, false)),
            _ => i += 1,
        }
    }
    Some((b.len(), false))
}

fn skip_past(b: &[u8], from: usize, ch: u8) -> usize {
    b[from.min(b.len())..]
        .iter()
        .position(|&c| c == ch)
        .map_or(b.len(), |p| from + p + 1)
}

fn skip_string(b: &[u8], start: usize) -> usize {
    let q = b[start];
    let mut i = start + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            c if c == q => return i + 1,
            _ => i += 1,
        }
    }
    b.len()
}

/// `{ … }` équilibré ; retourne l’index après la `}` fermante.
fn skip_braces(b: &[u8], start: usize, level: usize) -> Option<usize> {
    if level > MAX_DEPTH {
        return None;
    }
    let mut depth = 0usize;
    let mut i = start;
    while i < b.len() {
        match b[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'"' | b'\'' | b'`' => i = skip_string(b, i),
            b'/' if b.get(i + 1) == Some(&b'/') => i = skip_past(b, i, b'\n'),
            b'/' if b.get(i + 1) == Some(&b'*') => {
                i = b[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(b.len(), |p| i + 2 + p + 2);
            }
            b'<' if is_tag_start(b, i) && opens_expression(b, i) => i = scan(b, i, level + 1)?,
            _ => i += 1,
        }
    }
    Some(b.len())
}

/// Le caractère significatif précédent autorise-t-il une expression markup ?
fn opens_expression(b: &[u8], i: usize) -> bool {
    let prev = b[..i].iter().rev().find(|c| !c.is_ascii_whitespace());
    matches!(prev, Some(b'(' | b',' | b'{' | b'[' | b'&' | b'|' | b'?' | b':' | b'>' | b'=' | b'!'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(src: &str) -> &str {
        &src[..scan_element(src, 0).unwrap()]
    }

    #[test]
    fn simple_and_nested_elements() {
        assert_eq!(element("<div>Hello World</div>;"), "<div>Hello World</div>");
        assert_eq!(element("<ul><li>a</li><li>b</li></ul> rest"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn self_closing_and_fragments() {
        assert_eq!(element("<br/> x"), "<br/>");
        assert_eq!(element(r#"<Input value="a>b" /> x"#), r#"<Input value="a>b" />"#);
        assert_eq!(element("<>one<b>two</b></> tail"), "<>one<b>two</b></>");
    }

    #[test]
    fn text_with_apostrophes_and_keywords() {
        let src = "<p>Don't let it struct you</p>;";
        assert_eq!(element(src), "<p>Don't let it struct you</p>");
    }

    #[test]
    fn expression_containers_with_nested_markup() {
        let src = "<ul>{items.map(i => <li key={i}>{i > 2 ? 'big' : \"}\"}</li>)}</ul>;";
        assert_eq!(element(src), &src[..src.len() - 1]);
    }

    #[test]
    fn unterminated_runs_to_end() {
        assert_eq!(scan_element("<div>oops", 0), Some(9));
    }

    #[test]
    fn containers_nest_up_to_a_limit() {
        let ok = format!("{}{}", "<a>{".repeat(100), "}</a>".repeat(100));
        assert_eq!(scan_element(&ok, 0), Some(ok.len()));
        assert_eq!(scan_element(&"<a>{".repeat(50_000), 0), None);
    }

    #[test]
    fn generic_arrow_heads() {
        assert!(is_type_parameters(b"<T,>(x: T) => x", 0));
        assert!(is_type_parameters(b"<T extends object>(x: T) => x", 0));
        assert!(!is_type_parameters(b"<div>hi</div>", 0));
        assert!(!is_type_parameters(b"<Item extendsX />", 0));
        assert!(!is_type_parameters(b"<>frag</>", 0));
    }
}
