//! N-token transform facade

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::nsig::interpreter;
use crate::nsig::parser::{self, NsigProgram};
use crate::Result;

/// Public entry point for the throttling-token transform.
///
/// Owns one snippet and the original token, and caches the extracted program
/// for the lifetime of the instance. Repeated [`transform`](NToken::transform)
/// calls return identical results; note the transform itself is not an
/// involution, so feeding the output back in does not recover the input.
pub struct NToken {
    snippet: String,
    token: String,
    entry: Option<String>,
    program: OnceCell<NsigProgram>,
}

impl NToken {
    /// Create a transformer for one snippet and original token. The entry
    /// function is located by structural shape.
    pub fn new(snippet: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            token: token.into(),
            entry: None,
            program: OnceCell::new(),
        }
    }

    /// Like [`new`](NToken::new), with the entry function pinned by name for
    /// snippets containing more than one candidate function.
    pub fn with_entry(
        snippet: impl Into<String>,
        token: impl Into<String>,
        entry: impl Into<String>,
    ) -> Self {
        Self {
            snippet: snippet.into(),
            token: token.into(),
            entry: Some(entry.into()),
            program: OnceCell::new(),
        }
    }

    /// Apply the extracted transform to the stored token.
    pub fn transform(&self) -> Result<String> {
        let program = self.program()?;
        interpreter::run(program, &self.token)
    }

    fn program(&self) -> Result<&NsigProgram> {
        self.program.get_or_try_init(|| {
            debug!("parsing n-transform snippet");
            parser::parse(&self.snippet, self.entry.as_deref())
        })
    }

    #[cfg(test)]
    pub(crate) fn is_parsed(&self) -> bool {
        self.program.get().is_some()
    }
}
