//! Tolerant decoding of legacy-encoded text files
//!
//! Drop files come from Windows game servers and are usually GBK. Candidates
//! are tried strictly in rank order; the first one that decodes without
//! errors wins. If none does, every candidate decodes lossily and the one
//! with the fewest undecodable bytes wins (rank breaks ties); its replacement
//! characters are dropped.

use encoding_rs::{Encoding, BIG5, GBK, UTF_8};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown text encoding '{0}'")]
pub struct UnknownEncoding(pub String);

/// Result of decoding one file
#[derive(Debug)]
pub struct Decoded<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
    /// Undecodable bytes were skipped
    pub lossy: bool,
}

/// Ranked list of candidate encodings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDecoder {
    candidates: Vec<&'static Encoding>,
}

impl Default for TextDecoder {
    fn default() -> Self {
        Self {
            candidates: vec![UTF_8, GBK, BIG5],
        }
    }
}

impl TextDecoder {
    /// Build from candidate encodings; an empty list falls back to UTF-8.
    pub fn new(candidates: Vec<&'static Encoding>) -> Self {
        if candidates.is_empty() {
            return Self {
                candidates: vec![UTF_8],
            };
        }
        Self { candidates }
    }

    /// Build from WHATWG labels such as `"utf-8"`, `"gbk"` or `"big5"`.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, UnknownEncoding>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates = labels
            .into_iter()
            .map(|label| {
                let label = label.as_ref();
                Encoding::for_label(label.trim().as_bytes())
                    .ok_or_else(|| UnknownEncoding(label.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(candidates))
    }

    pub fn candidates(&self) -> &[&'static Encoding] {
        &self.candidates
    }

    /// Decode bytes. Never fails.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Decoded<'a> {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            let (text, lossy) =
                encoding.decode_without_bom_handling(&bytes[bom_len..]);
            return finish(text, encoding, lossy);
        }

        for &encoding in &self.candidates {
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
            {
                return Decoded {
                    text,
                    encoding,
                    lossy: false,
                };
            }
        }

        let mut best: Option<(Cow<'a, str>, &'static Encoding, usize)> = None;
        for &encoding in &self.candidates {
            let (text, _) = encoding.decode_without_bom_handling(bytes);
            let errors = replacement_count(&text);
            if best.as_ref().map_or(true, |&(_, _, fewest)| errors < fewest) {
                best = Some((text, encoding, errors));
            }
        }

        match best {
            Some((text, encoding, errors)) => finish(text, encoding, errors > 0),
            None => {
                let (text, lossy) = UTF_8.decode_without_bom_handling(bytes);
                finish(text, UTF_8, lossy)
            }
        }
    }
}

fn replacement_count(text: &str) -> usize {
    text.chars()
        .filter(|&c| c == char::REPLACEMENT_CHARACTER)
        .count()
}

fn finish<'a>(text: Cow<'a, str>, encoding: &'static Encoding, lossy: bool) -> Decoded<'a> {
    let text = if lossy {
        Cow::Owned(text.chars().filter(|&c| c != char::REPLACEMENT_CHARACTER).collect())
    } else {
        text
    };
    Decoded {
        text,
        encoding,
        lossy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // "屠龙" in GBK
    const GBK_DRAGON_SLAYER: &[u8] = &[0xCD, 0xC0, 0xC1, 0xFA];

    #[test]
    fn test_utf8_passthrough() {
        let decoded = TextDecoder::default().decode("1/10 屠龙".as_bytes());
        assert_eq!(decoded.text, "1/10 屠龙");
        assert_eq!(decoded.encoding, UTF_8);
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_gbk_fallback() {
        let mut bytes = b"1/10 ".to_vec();
        bytes.extend_from_slice(GBK_DRAGON_SLAYER);

        let decoded = TextDecoder::default().decode(&bytes);
        assert_eq!(decoded.text, "1/10 屠龙");
        assert_eq!(decoded.encoding, GBK);
        assert!(!decoded.lossy);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"1/2 Gem");
        let decoded = TextDecoder::default().decode(&bytes);
        assert_eq!(decoded.text, "1/2 Gem");
    }

    #[test]
    fn test_undecodable_bytes_are_skipped() {
        // 0xFF is invalid in UTF-8, GBK and Big5; the tie goes to UTF-8 by rank
        let decoder = TextDecoder::from_labels(["utf-8", "gbk"]).unwrap();
        let decoded = decoder.decode(b"1/2 Ge\xFFm");
        assert!(decoded.lossy);
        assert_eq!(decoded.text, "1/2 Gem");
        assert_eq!(decoded.encoding, UTF_8);
    }

    #[test]
    fn test_utf8_with_stray_byte_keeps_names() {
        let mut bytes = "1/10 屠龙\n1/20 裁决之杖\n".as_bytes().to_vec();
        bytes.push(0xFF);

        let decoded = TextDecoder::default().decode(&bytes);
        assert!(decoded.lossy);
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "1/10 屠龙\n1/20 裁决之杖\n");
    }

    #[test]
    fn test_gbk_with_stray_byte_keeps_names() {
        let mut bytes = b"1/10 ".to_vec();
        bytes.extend_from_slice(GBK_DRAGON_SLAYER);
        bytes.extend_from_slice(b"\n\xFF");

        let decoded = TextDecoder::default().decode(&bytes);
        assert!(decoded.lossy);
        assert_eq!(decoded.encoding, GBK);
        assert_eq!(decoded.text, "1/10 屠龙\n");
    }

    #[test]
    fn test_from_labels() {
        let decoder = TextDecoder::from_labels(["gbk", " big5 "]).unwrap();
        assert_eq!(decoder.candidates(), &[GBK, BIG5]);

        assert_eq!(
            TextDecoder::from_labels(["klingon"]),
            Err(UnknownEncoding("klingon".to_string()))
        );
    }

    #[test]
    fn test_empty_candidates_fall_back_to_utf8() {
        let decoder = TextDecoder::new(Vec::new());
        assert_eq!(decoder.candidates(), &[UTF_8]);
        assert!(decoder.decode(b"caf\xFF").lossy);
    }
}
