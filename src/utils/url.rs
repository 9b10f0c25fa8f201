//! URL query utilities for the signature decipher facade

use crate::error::DescrambleError;
use crate::Result;
use url::Url;

/// Extract the percent-decoded value of a query parameter.
pub fn query_value(raw_url: &str, key: &str) -> Result<Option<String>> {
    let parsed = Url::parse(raw_url)?;
    Ok(parsed
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, value)| value.into_owned()))
}

/// Replace the value of a query parameter in place.
///
/// Operates on the raw string rather than re-serializing through `Url` so
/// that every byte outside the replaced value stays identical.
pub fn replace_query_value(raw_url: &str, key: &str, new_value: &str) -> Result<String> {
    let query_start = raw_url.find('?').ok_or_else(|| {
        DescrambleError::CallerInput(format!("URL has no query string: {}", raw_url))
    })?;
    let query_end = raw_url[query_start + 1..]
        .find('#')
        .map(|i| query_start + 1 + i)
        .unwrap_or(raw_url.len());
    let query = &raw_url[query_start + 1..query_end];

    let encoded: String = url::form_urlencoded::byte_serialize(new_value.as_bytes()).collect();
    let mut replaced = false;

    let rebuilt = query
        .split('&')
        .map(|segment| {
            let (k, _) = segment.split_once('=').unwrap_or((segment, ""));
            if k == key && !replaced {
                replaced = true;
                format!("{}={}", key, encoded)
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&");

    if !replaced {
        return Err(DescrambleError::CallerInput(format!(
            "query parameter `{}` not found",
            key
        )));
    }

    Ok(format!(
        "{}?{}{}",
        &raw_url[..query_start],
        rebuilt,
        &raw_url[query_end..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_value() {
        assert_eq!(
            query_value("https://host/videoplayback?a=1&s=ABC&b=2", "s").unwrap(),
            Some("ABC".to_string())
        );

        assert_eq!(
            query_value("https://host/videoplayback?a=1", "s").unwrap(),
            None
        );

        // Percent-encoded values are decoded
        assert_eq!(
            query_value("https://host/p?s=a%3Db", "s").unwrap(),
            Some("a=b".to_string())
        );

        // Malformed URLs are errors, not None
        assert!(query_value("not-a-url", "s").is_err());
    }

    #[test]
    fn test_replace_keeps_other_parameters_byte_identical() {
        let url = "https://host/videoplayback?expire=123&s=ENCRYPTED&sp=sig&itag=22";
        let out = replace_query_value(url, "s", "DECRYPTED").unwrap();
        assert_eq!(
            out,
            "https://host/videoplayback?expire=123&s=DECRYPTED&sp=sig&itag=22"
        );
    }

    #[test]
    fn test_replace_preserves_fragment() {
        let url = "https://host/p?s=AAA&x=1#frag";
        let out = replace_query_value(url, "s", "BBB").unwrap();
        assert_eq!(out, "https://host/p?s=BBB&x=1#frag");
    }

    #[test]
    fn test_replace_only_exact_key() {
        // `sp` must not be mistaken for `s`
        let url = "https://host/p?sp=sig&s=AAA";
        let out = replace_query_value(url, "s", "BBB").unwrap();
        assert_eq!(out, "https://host/p?sp=sig&s=BBB");
    }

    #[test]
    fn test_replace_missing_key_is_caller_error() {
        let err = replace_query_value("https://host/p?a=1", "s", "X").unwrap_err();
        assert!(matches!(err, DescrambleError::CallerInput(_)));
    }

    #[test]
    fn test_replace_without_query_is_caller_error() {
        assert!(replace_query_value("https://host/p", "s", "X").is_err());
    }
}
