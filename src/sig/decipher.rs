//! Signature decipher facade

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::DescrambleError;
use crate::ops::OpSequence;
use crate::sig::{interpreter, parser};
use crate::utils::url as url_util;
use crate::Result;

/// Public entry point for signature deciphering.
///
/// Owns one snippet and caches its parsed operation sequence for the
/// lifetime of the instance, so repeated calls do not re-parse. The engine
/// never invalidates the cache; callers construct a fresh instance when the
/// player version changes.
pub struct SigDecipher {
    snippet: String,
    sequence: OnceCell<OpSequence>,
}

impl SigDecipher {
    /// Create a decipherer for one player-script snippet.
    pub fn new(snippet: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
            sequence: OnceCell::new(),
        }
    }

    /// Decipher the `s` query parameter of a signed media URL and return the
    /// URL with that parameter rewritten in place.
    ///
    /// A URL without an `s` parameter is a caller error and is rejected
    /// before any extraction or interpretation runs.
    pub fn decipher(&self, url: &str) -> Result<String> {
        let signature = url_util::query_value(url, "s")?.ok_or_else(|| {
            DescrambleError::CallerInput("URL is missing the `s` query parameter".to_string())
        })?;

        let sequence = self.sequence()?;
        let deciphered = interpreter::apply(sequence, &signature)?;
        debug!(len = deciphered.len(), "signature deciphered");

        url_util::replace_query_value(url, "s", &deciphered)
    }

    /// Parsed sequence, extracted on first use. Concurrent first calls may
    /// race to parse; the result is deterministic so the duplicate work is
    /// harmless and a single value wins the insert.
    fn sequence(&self) -> Result<&OpSequence> {
        self.sequence.get_or_try_init(|| {
            debug!("parsing signature snippet");
            parser::parse(&self.snippet)
        })
    }

    #[cfg(test)]
    pub(crate) fn is_parsed(&self) -> bool {
        self.sequence.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNIPPET: &str = concat!(
        r#"var LU={wS:function(a){a.reverse()},"#,
        r#"bH:function(a,b){a.splice(0,b)},"#,
        r#"Vo:function(a,b){var c=a[0];a[0]=a[b%a.length];a[b%a.length]=c}};"#,
        r#"function ns(a){a=a.split("");LU.Vo(a,3);LU.bH(a,2);LU.wS(a,1);"#,
        r#"return a.join("")}"#,
    );

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn test_decipher_rewrites_s_in_place() {
        init_tracing();
        let decipher = SigDecipher::new(SNIPPET);
        let url = "https://host/videoplayback?expire=123&s=abcdefgh&sp=sig&itag=22";
        assert_eq!(
            decipher.decipher(url).unwrap(),
            "https://host/videoplayback?expire=123&s=hgfeac&sp=sig&itag=22"
        );
    }

    #[test]
    fn test_parse_happens_once() {
        let decipher = SigDecipher::new(SNIPPET);
        assert!(!decipher.is_parsed());

        let url = "https://host/videoplayback?s=abcdefgh";
        let first = decipher.decipher(url).unwrap();
        assert!(decipher.is_parsed());

        let second = decipher.decipher(url).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_s_parameter_is_caller_error() {
        let decipher = SigDecipher::new(SNIPPET);
        let err = decipher
            .decipher("https://host/videoplayback?itag=22")
            .unwrap_err();
        assert!(matches!(err, DescrambleError::CallerInput(_)));
        // Rejected before extraction: the snippet was never parsed
        assert!(!decipher.is_parsed());
    }

    #[test]
    fn test_malformed_url_is_rejected() {
        let decipher = SigDecipher::new(SNIPPET);
        assert!(decipher.decipher("definitely not a url").is_err());
    }

    #[test]
    fn test_bad_snippet_fails_loudly() {
        // A snippet that lost its helper object must surface extraction
        // failure, never return the input URL unchanged.
        let decipher = SigDecipher::new("function ns(a){return a}");
        let err = decipher
            .decipher("https://host/videoplayback?s=abc")
            .unwrap_err();
        assert!(err.is_format_change());
    }
}
