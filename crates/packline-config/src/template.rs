//! Output naming templates.
//!
//! Templates support three placeholders: `[contenthash]` (optionally
//! `[contenthash:N]` for a truncated width, `[hash]` accepted as an alias),
//! `[ext]` for the original extension, and `[name]` for the logical stem.
//! Anything else inside brackets is rejected at resolve time.

use crate::error::{ConfigError, Result};

/// Default truncation width for `[contenthash]`.
pub const DEFAULT_HASH_WIDTH: usize = 10;

/// Content digest of `bytes`, lowercase hex, truncated to `width` characters.
///
/// Pure function of the input bytes: identical bytes always produce the same
/// digest, so hashed output names are stable across runs.
pub fn content_hash(bytes: &[u8], width: usize) -> String {
    let hex = blake3::hash(bytes).to_hex().to_string();
    let width = width.min(hex.len());
    hex[..width].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    ContentHash(usize),
    Ext,
    Name,
}

/// A parsed output naming template, e.g. `[contenthash:10].[ext]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl OutputTemplate {
    /// Parse a template string, rejecting unsupported placeholders.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();

        while let Some(ch) = chars.next() {
            if ch != '[' {
                literal.push(ch);
                continue;
            }

            let mut placeholder = String::new();
            let mut closed = false;
            for inner in chars.by_ref() {
                if inner == ']' {
                    closed = true;
                    break;
                }
                placeholder.push(inner);
            }
            if !closed {
                return Err(ConfigError::InvalidOutputTemplate {
                    template: raw.to_string(),
                    placeholder,
                });
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Self::parse_placeholder(raw, &placeholder)?);
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    fn parse_placeholder(raw: &str, placeholder: &str) -> Result<Segment> {
        let (name, width) = match placeholder.split_once(':') {
            Some((name, digits)) => {
                let width = digits.parse::<usize>().map_err(|_| {
                    ConfigError::InvalidOutputTemplate {
                        template: raw.to_string(),
                        placeholder: placeholder.to_string(),
                    }
                })?;
                (name, Some(width))
            }
            None => (placeholder, None),
        };

        match (name, width) {
            ("contenthash" | "hash", w) => {
                Ok(Segment::ContentHash(w.unwrap_or(DEFAULT_HASH_WIDTH)))
            }
            ("ext", None) => Ok(Segment::Ext),
            ("name", None) => Ok(Segment::Name),
            _ => Err(ConfigError::InvalidOutputTemplate {
                template: raw.to_string(),
                placeholder: placeholder.to_string(),
            }),
        }
    }

    /// The template string this was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether rendering depends on the file bytes.
    pub fn uses_content_hash(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::ContentHash(_)))
    }

    /// Render the template for a file with the given logical `name`,
    /// original `ext` (without the dot), and content `bytes`.
    pub fn render(&self, name: &str, ext: &str, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::ContentHash(width) => out.push_str(&content_hash(bytes, *width)),
                Segment::Ext => out.push_str(ext),
                Segment::Name => out.push_str(name),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_hash_ext_template() {
        let template = OutputTemplate::parse("[contenthash:10].[ext]").unwrap();
        let rendered = template.render("logo", "png", b"image bytes");
        assert_eq!(rendered.len(), 10 + 1 + 3);
        assert!(rendered.ends_with(".png"));
    }

    #[test]
    fn hash_is_stable_for_identical_bytes() {
        let a = content_hash(b"same bytes", DEFAULT_HASH_WIDTH);
        let b = content_hash(b"same bytes", DEFAULT_HASH_WIDTH);
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_HASH_WIDTH);
    }

    #[test]
    fn hash_differs_for_differing_bytes() {
        assert_ne!(content_hash(b"one", 16), content_hash(b"two", 16));
    }

    #[test]
    fn hash_alias_matches_contenthash() {
        let a = OutputTemplate::parse("[hash:10].[ext]").unwrap();
        let b = OutputTemplate::parse("[contenthash:10].[ext]").unwrap();
        assert_eq!(
            a.render("x", "gif", b"payload"),
            b.render("x", "gif", b"payload")
        );
    }

    #[test]
    fn name_placeholder_renders_stem() {
        let template = OutputTemplate::parse("js/[name].js").unwrap();
        assert_eq!(template.render("build", "js", b""), "js/build.js");
        assert!(!template.uses_content_hash());
    }

    #[test]
    fn unsupported_placeholder_is_rejected() {
        let err = OutputTemplate::parse("[chunkhash].[ext]").unwrap_err();
        match err {
            ConfigError::InvalidOutputTemplate { placeholder, .. } => {
                assert_eq!(placeholder, "chunkhash");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unterminated_placeholder_is_rejected() {
        assert!(OutputTemplate::parse("[contenthash.[ext]").is_err());
    }

    #[test]
    fn width_beyond_digest_is_clamped() {
        let full = blake3::hash(b"x").to_hex().to_string();
        assert_eq!(content_hash(b"x", 500), full);
    }
}
