//! # descramble - player-script descrambling engine
//!
//! Extracts and executes the two obfuscated algorithms embedded in a video
//! platform's client-side player script: the signature cipher that must be
//! reversed to recover a playable media URL, and the "n" token transform
//! used to bypass throttling.
//!
//! The snippet parsers pattern-match the isolated script fragments into a
//! canonical ordered operation sequence, and a small deterministic
//! interpreter applies that sequence to a token. Snippets are never executed
//! as script; any construct outside the supported grammar fails extraction
//! instead of being approximated.
//!
//! ## Example
//!
//! ```rust
//! use descramble::SigDecipher;
//!
//! let snippet = concat!(
//!     r#"var LU={wS:function(a){a.reverse()},"#,
//!     r#"bH:function(a,b){a.splice(0,b)},"#,
//!     r#"Vo:function(a,b){var c=a[0];a[0]=a[b%a.length];a[b%a.length]=c}};"#,
//!     r#"function ns(a){a=a.split("");LU.Vo(a,3);LU.bH(a,2);LU.wS(a,1);"#,
//!     r#"return a.join("")}"#,
//! );
//!
//! let decipher = SigDecipher::new(snippet);
//! let url = decipher
//!     .decipher("https://host/videoplayback?s=abcdefgh&itag=22")
//!     .unwrap();
//! assert_eq!(url, "https://host/videoplayback?s=hgfeac&itag=22");
//! ```

pub mod error;
pub mod nsig;
pub mod ops;
pub mod sig;
pub mod utils;

// Re-export main types
pub use error::DescrambleError;
pub use nsig::NToken;
pub use ops::{Op, OpSequence};
pub use sig::SigDecipher;

/// Result type alias for descramble operations
pub type Result<T> = std::result::Result<T, DescrambleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facades_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SigDecipher>();
        assert_send_sync::<NToken>();
    }
}
