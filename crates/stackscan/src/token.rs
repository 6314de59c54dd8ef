use alloc::{string::String, vec::Vec};

/// One lexical unit produced by a [`Lexer`].
///
/// Tokens are immutable. The engine refers to them by position only and
/// copies nothing but `text` into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// Position of the token in the stream, starting at 0.
    pub index: usize,
    /// Tag drawn from the lexer's fixed alphabet.
    pub tag: &'src str,
    /// The exact substring of the input this token covers.
    pub text: &'src str,
}

impl<'src> Token<'src> {
    /// Create a token at `index`.
    #[must_use]
    pub fn new(index: usize, tag: &'src str, text: &'src str) -> Self {
        Self { index, tag, text }
    }
}

/// Turns raw input into an ordered token sequence.
///
/// Implementations must produce tokens in input order with no gaps or
/// overlaps, and must not normalize token text: fragments are reassembled from
/// it verbatim. The engine does not validate either property.
pub trait Lexer {
    /// Tokenize the whole input.
    fn tokenize<'src>(&self, text: &'src str) -> Vec<Token<'src>>;
}

impl<L: Lexer + ?Sized> Lexer for &L {
    fn tokenize<'src>(&self, text: &'src str) -> Vec<Token<'src>> {
        (**self).tokenize(text)
    }
}

/// Owned copy of a [`Token`], detached from the input lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TokenSnapshot {
    /// Position of the token in the stream.
    pub index: usize,
    /// Token tag.
    pub tag: String,
    /// Token text.
    pub text: String,
}

impl From<&Token<'_>> for TokenSnapshot {
    fn from(token: &Token<'_>) -> Self {
        Self {
            index: token.index,
            tag: token.tag.into(),
            text: token.text.into(),
        }
    }
}
