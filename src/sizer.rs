//! Measuring chunk size.
//!
//! The limit a chunk must respect can be expressed in characters or in
//! model tokens. Characters are Unicode scalar values, not bytes, so a limit
//! of 100 means 100 `char`s whatever the script.
//!
//! Tokens are counted with the `cl100k_base` BPE. Token counts are not
//! additive: `tokens("ab") != tokens("a") + tokens("b")` in general, so the
//! chunker always measures the joined slice it is about to emit.

use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;

use crate::{Error, Result};

static CL100K: OnceCell<CoreBPE> = OnceCell::new();

/// Something that can measure a piece of text.
///
/// Implementations should be monotonic: extending a text never makes it
/// smaller. The character-count cut relies on this to search for the
/// longest fitting prefix.
pub trait ChunkSizer: Send + Sync {
    /// Size of `text` in this sizer's unit.
    fn size(&self, text: &str) -> usize;

    /// The unit reported by this sizer.
    fn unit(&self) -> SizeUnit;
}

/// Unit a chunk limit is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    /// Unicode scalar values.
    #[default]
    #[serde(alias = "chars")]
    Characters,
    /// `cl100k_base` BPE tokens.
    Tokens,
}

impl SizeUnit {
    /// Build the sizer for this unit.
    ///
    /// Loading the token sizer decodes the BPE ranks the first time it is
    /// called; later calls share the same instance.
    pub fn sizer(self) -> Result<Arc<dyn ChunkSizer>> {
        match self {
            Self::Characters => Ok(Arc::new(CharacterSizer)),
            Self::Tokens => Ok(Arc::new(TokenSizer::cl100k()?)),
        }
    }
}

impl std::fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Characters => f.write_str("characters"),
            Self::Tokens => f.write_str("tokens"),
        }
    }
}

impl FromStr for SizeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "characters" | "chars" | "char" => Ok(Self::Characters),
            "tokens" | "token" => Ok(Self::Tokens),
            other => Err(Error::InvalidConfiguration(format!(
                "unknown size unit '{other}' (expected 'characters' or 'tokens')"
            ))),
        }
    }
}

/// Counts Unicode scalar values.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterSizer;

impl ChunkSizer for CharacterSizer {
    fn size(&self, text: &str) -> usize {
        text.chars().count()
    }

    fn unit(&self) -> SizeUnit {
        SizeUnit::Characters
    }
}

/// Counts `cl100k_base` tokens.
#[derive(Clone, Copy)]
pub struct TokenSizer {
    bpe: &'static CoreBPE,
}

impl TokenSizer {
    /// The process-wide `cl100k_base` tokenizer.
    pub fn cl100k() -> Result<Self> {
        let bpe = CL100K.get_or_try_init(|| {
            tiktoken_rs::cl100k_base().map_err(|e| Error::Tokenizer(e.to_string()))
        })?;
        Ok(Self { bpe })
    }
}

impl std::fmt::Debug for TokenSizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSizer").field("encoding", &"cl100k_base").finish()
    }
}

impl ChunkSizer for TokenSizer {
    fn size(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn unit(&self) -> SizeUnit {
        SizeUnit::Tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characters_not_bytes() {
        let sizer = CharacterSizer;
        assert_eq!(sizer.size("abc"), 3);
        assert_eq!(sizer.size("日本語"), 3);
        assert_eq!(sizer.size(""), 0);
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("characters".parse::<SizeUnit>().unwrap(), SizeUnit::Characters);
        assert_eq!("Chars".parse::<SizeUnit>().unwrap(), SizeUnit::Characters);
        assert_eq!(" tokens ".parse::<SizeUnit>().unwrap(), SizeUnit::Tokens);
        assert!(matches!(
            "words".parse::<SizeUnit>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unit_display_round_trips() {
        for unit in [SizeUnit::Characters, SizeUnit::Tokens] {
            assert_eq!(unit.to_string().parse::<SizeUnit>().unwrap(), unit);
        }
    }

    #[test]
    fn test_token_sizer_counts() {
        let sizer = TokenSizer::cl100k().unwrap();
        assert_eq!(sizer.size(""), 0);
        assert!(sizer.size("hello world") >= 1);
        assert!(sizer.size("hello world") < "hello world".len());
        assert_eq!(sizer.unit(), SizeUnit::Tokens);
    }

    #[test]
    fn test_sizer_for_unit() {
        let sizer = SizeUnit::Characters.sizer().unwrap();
        assert_eq!(sizer.unit(), SizeUnit::Characters);
        assert_eq!(sizer.size("four"), 4);
    }
}
