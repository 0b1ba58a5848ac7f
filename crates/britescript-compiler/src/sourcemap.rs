//! sourcemap.rs — Source map v3 à partir des ancres de l’émetteur.
//!
//! Un segment par ancre : `[col générée, source 0, ligne source, col source]`,
//! colonnes en unités UTF-16, champs relatifs encodés en Base64-VLQ.
//! Précision « au mieux » : l’intérieur d’un nœud réécrit pointe sur son début.

use serde::Serialize;

use crate::codegen::Anchor;
use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapV3<'a> {
    version: u8,
    file: &'a str,
    sources: [&'a str; 1],
    sources_content: [&'a str; 1],
    names: [&'a str; 0],
    mappings: String,
}

/// Sérialise la map JSON pour `id` (original → généré).
pub fn render(id: &str, original: &str, generated: &str, anchors: &[Anchor]) -> Result<String> {
    let map = SourceMapV3 {
        version: 3,
        file: id,
        sources: [id],
        sources_content: [original],
        names: [],
        mappings: encode_mappings(original, generated, anchors),
    };
    Ok(serde_json::to_string(&map)?)
}

/* ───────────────────────── Mappings ───────────────────────── */

/// Débuts de ligne d’un texte, pour convertir un offset en (ligne, colonne UTF-16).
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, starts }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|s| *s <= offset).saturating_sub(1);
        let start = self.starts[line];
        let col = self.text.get(start..offset).map_or(0, |s| s.encode_utf16().count());
        (line, col)
    }
}

pub(crate) fn encode_mappings(original: &str, generated: &str, anchors: &[Anchor]) -> String {
    let src_idx = LineIndex::new(original);
    let gen_idx = LineIndex::new(generated);

    let mut sorted: Vec<Anchor> = anchors.iter().copied().filter(|a| a.generated < generated.len()).collect();
    sorted.sort_by_key(|a| a.generated);
    sorted.dedup_by_key(|a| a.generated);

    let mut out = String::new();
    let mut cur_line = 0usize;
    let mut first_in_line = true;
    // champs précédents : col générée (remise à 0 par ligne), ligne src, col src
    let (mut prev_gcol, mut prev_sline, mut prev_scol) = (0i64, 0i64, 0i64);

    for a in sorted {
        let (gline, gcol) = gen_idx.locate(a.generated);
        let (sline, scol) = src_idx.locate(a.original.min(original.len()));
        while cur_line < gline {
            out.push(';');
            cur_line += 1;
            first_in_line = true;
            prev_gcol = 0;
        }
        if !first_in_line {
            out.push(',');
        }
        first_in_line = false;
        let (gcol, sline, scol) = (gcol as i64, sline as i64, scol as i64);
        vlq(&mut out, gcol - prev_gcol);
        vlq(&mut out, 0);
        vlq(&mut out, sline - prev_sline);
        vlq(&mut out, scol - prev_scol);
        prev_gcol = gcol;
        prev_sline = sline;
        prev_scol = scol;
    }
    out
}

const B64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn vlq(out: &mut String, value: i64) {
    let mut v = if value < 0 { ((-value) << 1) | 1 } else { value << 1 };
    loop {
        let mut digit = (v & 0b1_1111) as usize;
        v >>= 5;
        if v > 0 {
            digit |= 0b10_0000;
        }
        out.push(B64[digit] as char);
        if v == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(v: i64) -> String {
        let mut s = String::new();
        vlq(&mut s, v);
        s
    }

    #[test]
    fn vlq_values() {
        assert_eq!(enc(0), "A");
        assert_eq!(enc(1), "C");
        assert_eq!(enc(-1), "D");
        assert_eq!(enc(16), "gB");
    }

    #[test]
    fn single_anchor_maps_origin() {
        let a = [Anchor { generated: 0, original: 0 }];
        assert_eq!(encode_mappings("struct S {}", "type S = {};", &a), "AAAA");
    }

    #[test]
    fn line_breaks_reset_generated_column() {
        let a = [Anchor { generated: 0, original: 0 }, Anchor { generated: 3, original: 4 }];
        // ligne 2 générée ← ligne 2 source, col 0
        assert_eq!(encode_mappings("ab;\ncd;", "x;\ncd;", &a), "AAAA;AACA");
    }

    #[test]
    fn json_shape() {
        let json = render("a.bs", "let a = 1;", "const a = 1;", &[Anchor { generated: 0, original: 0 }]).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["version"], 3);
        assert_eq!(v["sources"][0], "a.bs");
        assert_eq!(v["sourcesContent"][0], "let a = 1;");
        assert!(v["names"].as_array().is_some_and(|n| n.is_empty()));
    }
}
