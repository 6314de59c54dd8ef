/// Configuration for one parse run.
///
/// # Examples
///
/// ```rust
/// use stackscan::ParserOptions;
///
/// let options = ParserOptions {
///     strict_scopes: true,
///     max_depth: Some(64),
/// };
/// ```
///
/// # Default
///
/// Lenient scoping with no depth limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Whether running out of input inside a nested scope is an error.
    ///
    /// By default, end of input is an implicit ascend in every open scope:
    /// each one is closed and linked into its parent as if its closing token
    /// had been seen. When `true`, the parse instead fails with
    /// [`ParseError::UnterminatedScope`](crate::ParseError::UnterminatedScope).
    ///
    /// # Default
    ///
    /// `false`
    pub strict_scopes: bool,

    /// Maximum number of suspended scopes on the parse stack.
    ///
    /// Nesting depth is otherwise bounded only by memory, since the stack is
    /// an explicit vector rather than native recursion. A descent that would
    /// exceed this limit fails with
    /// [`ParseError::DepthLimit`](crate::ParseError::DepthLimit).
    ///
    /// # Default
    ///
    /// `None`
    pub max_depth: Option<usize>,
}
