use alloc::sync::Arc;

use tracing::debug;

use crate::{
    arena::{Arena, Tree},
    context::{DebugInfo, ParseContext},
    engine,
    error::ParseError,
    grammar::Grammar,
    options::ParserOptions,
    token::Lexer,
};

/// Wires a [`Lexer`] and a [`Grammar`] to the engine.
///
/// Every call to [`parse`](Self::parse) builds a fresh context, so one parser
/// can be reused for any number of inputs. The grammar is held by `Arc` and
/// can back several parsers on different threads at once.
///
/// ```rust
/// use std::sync::Arc;
///
/// use stackscan::{Grammar, GroupParser, Lexer, StateDef, Token};
///
/// struct Chars;
///
/// impl Lexer for Chars {
///     fn tokenize<'src>(&self, text: &'src str) -> Vec<Token<'src>> {
///         text.char_indices()
///             .enumerate()
///             .map(|(i, (at, c))| Token::new(i, "CHAR", &text[at..at + c.len_utf8()]))
///             .collect()
///     }
/// }
///
/// let grammar = Grammar::builder("text").state(StateDef::new("text")).build().unwrap();
/// let mut parser = GroupParser::new(Chars, Arc::new(grammar));
/// let tree = parser.parse("héllo").unwrap();
/// assert_eq!(tree.text("text"), "héllo");
/// ```
#[derive(Debug)]
pub struct GroupParser<L> {
    lexer: L,
    grammar: Arc<Grammar>,
    options: ParserOptions,
    last: Option<DebugInfo>,
}

impl<L: Lexer> GroupParser<L> {
    #[must_use]
    pub fn new(lexer: L, grammar: Arc<Grammar>) -> Self {
        Self::with_options(lexer, grammar, ParserOptions::default())
    }

    #[must_use]
    pub fn with_options(lexer: L, grammar: Arc<Grammar>, options: ParserOptions) -> Self {
        Self {
            lexer,
            grammar,
            options,
            last: None,
        }
    }

    #[must_use]
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    #[must_use]
    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse `text` and return a view of the root group.
    ///
    /// The view borrows the arena kept by this parser, so it lives until the
    /// next call. Absent or empty input returns an empty tree without invoking
    /// the lexer. Errors from the engine are returned unchanged; the arena and
    /// debug snapshot of the failed run remain available afterwards.
    pub fn parse<'a>(
        &mut self,
        text: impl Into<Option<&'a str>>,
    ) -> Result<Tree<'_>, ParseError> {
        let text = text.into().unwrap_or_default();
        if text.is_empty() {
            debug!("empty input");
            let info = self.last.insert(DebugInfo::default());
            return Ok(info.arena.root());
        }

        let tokens = self.lexer.tokenize(text);
        debug!(bytes = text.len(), tokens = tokens.len(), "parsing");

        let grammar = Arc::clone(&self.grammar);
        let mut ctx = ParseContext::new(&grammar, tokens, self.options);
        let result = engine::run(grammar.initial(), &mut ctx);
        let info = self.last.insert(ctx.into_debug_info());

        let stats = result?;
        debug!(steps = stats.steps, groups = info.arena.len(), "parsed");
        Ok(info.arena.root())
    }

    /// Arena of the most recent parse.
    #[must_use]
    pub fn arena_snapshot(&self) -> Option<&Arena> {
        self.last.as_ref().map(|info| &info.arena)
    }

    /// Diagnostics of the most recent parse: the token under the cursor, the
    /// stack as it was left, and the arena.
    #[must_use]
    pub fn debug_info(&self) -> Option<&DebugInfo> {
        self.last.as_ref()
    }
}
