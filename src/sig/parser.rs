//! Snippet parser for the signature cipher grammar
//!
//! Recognizes the helper object (a table of named one-line functions) and the
//! driver function that calls its members in sequence, and compiles the call
//! order into an [`OpSequence`] of the three signature operations. All
//! matching is by structural shape; identifier names are obfuscated and
//! rotate between player versions. Any shape outside the known grammar fails
//! extraction as a unit — a partial sequence is never returned.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::DescrambleError;
use crate::ops::{Op, OpSequence};
use crate::Result;

/// Any single-parameter function, named or anonymous
static FUNCTION_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"function\s*[a-zA-Z0-9$]*\s*\(\s*([a-zA-Z0-9$]+)\s*\)\s*\{([\s\S]*?)\}")
        .expect("valid function shape regex")
});

/// Helper object members: `name: function(a, b) { body }`
static MEMBER_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z0-9$]+)\s*:\s*function\s*\(\s*([a-zA-Z0-9$]+)[^)]*\)\s*\{([\s\S]*?)\}")
        .expect("valid member shape regex")
});

/// Operation kind a helper member was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemberKind {
    Reverse,
    RemovePrefix,
    SwapWithFirst,
}

/// Parse a signature snippet into its ordered operation sequence.
pub fn parse(snippet: &str) -> Result<OpSequence> {
    let (param, driver_body) = find_driver(snippet)?;
    debug!(param = %param, "located signature driver function");

    let helper_name = find_helper_name(&driver_body, &param)?;
    debug!(helper = %helper_name, "located helper object name");

    let helper_body = find_helper_body(snippet, &helper_name)?;
    let members = classify_members(&helper_body, &helper_name)?;
    debug!(members = members.len(), "classified helper members");

    let seq = compile_calls(&driver_body, &helper_name, &param, &members)?;
    debug!(ops = seq.len(), "compiled signature operation sequence");
    Ok(seq)
}

/// Locate the driver: a single-parameter function that splits its argument
/// into characters and joins it back on return.
fn find_driver(snippet: &str) -> Result<(String, String)> {
    for captures in FUNCTION_SHAPE.captures_iter(snippet) {
        let param = &captures[1];
        let body = &captures[2];

        if body.contains(&format!("{}.split(\"\")", param))
            && body.contains(&format!("return {}.join(\"\")", param))
        {
            return Ok((param.to_string(), body.to_string()));
        }
    }

    Err(DescrambleError::extraction(
        "driver",
        "no single-parameter function with split/join shape found",
    ))
}

/// Read the helper object's name off the first `obj.member(param, ...)`
/// callsite inside the driver body.
fn find_helper_name(driver_body: &str, param: &str) -> Result<String> {
    let callsite = Regex::new(&format!(
        r"([a-zA-Z0-9$]+)\.[a-zA-Z0-9$]+\({}(?:,\s*\d+)?\)",
        regex::escape(param)
    ))?;

    callsite
        .captures(driver_body)
        .map(|c| c[1].to_string())
        .ok_or_else(|| {
            DescrambleError::extraction("helper-name", "driver body contains no helper callsites")
        })
}

/// Extract the helper object literal's body from the snippet.
fn find_helper_body(snippet: &str, helper_name: &str) -> Result<String> {
    let literal = Regex::new(&format!(
        r"(?:var|let|const)\s+{}\s*=\s*\{{([\s\S]*?)\}}\s*;",
        regex::escape(helper_name)
    ))?;

    literal
        .captures(snippet)
        .map(|c| c[1].to_string())
        .ok_or_else(|| {
            DescrambleError::extraction(
                "helper-object",
                format!("object literal `{}` not found in snippet", helper_name),
            )
        })
}

/// Classify every member of the helper object by body shape alone.
///
/// An unclassifiable member fails the whole extraction: it signals the
/// platform added an operation this recognizer does not know.
fn classify_members(helper_body: &str, helper_name: &str) -> Result<HashMap<String, MemberKind>> {
    let mut members = HashMap::new();

    for captures in MEMBER_SHAPE.captures_iter(helper_body) {
        let name = &captures[1];
        let param = &captures[2];
        let body = &captures[3];

        let kind = if body.contains(".reverse()") {
            MemberKind::Reverse
        } else if body.contains(".splice(") {
            MemberKind::RemovePrefix
        } else if body.contains(&format!("{}[0]={}[", param, param))
            && body.contains(&format!("%{}.length]", param))
        {
            MemberKind::SwapWithFirst
        } else {
            return Err(DescrambleError::extraction(
                "helper-member",
                format!("member `{}` body matches no known shape: {}", name, body),
            ));
        };

        members.insert(name.to_string(), kind);
    }

    if members.len() < 3 {
        return Err(DescrambleError::extraction(
            "helper-object",
            format!(
                "object `{}` has {} function members, expected at least 3",
                helper_name,
                members.len()
            ),
        ));
    }

    Ok(members)
}

/// Scan the driver body in textual order and emit one operation per call.
fn compile_calls(
    driver_body: &str,
    helper_name: &str,
    param: &str,
    members: &HashMap<String, MemberKind>,
) -> Result<OpSequence> {
    let call = Regex::new(&format!(
        r"{}\.([a-zA-Z0-9$]+)\({}(?:,\s*(\d+))?\)",
        regex::escape(helper_name),
        regex::escape(param)
    ))?;

    let mut ops = Vec::new();

    for captures in call.captures_iter(driver_body) {
        let member = &captures[1];
        let kind = members.get(member).ok_or_else(|| {
            DescrambleError::extraction(
                "driver-call",
                format!("call to unclassified helper member `{}`", member),
            )
        })?;

        let arg = || -> Result<usize> {
            captures
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(|| {
                    DescrambleError::extraction(
                        "driver-call",
                        format!("call to `{}` is missing its integer argument", member),
                    )
                })
        };

        ops.push(match kind {
            MemberKind::Reverse => Op::Reverse,
            MemberKind::RemovePrefix => Op::RemovePrefix(arg()?),
            MemberKind::SwapWithFirst => Op::SwapWithFirst(arg()?),
        });
    }

    if ops.is_empty() {
        return Err(DescrambleError::extraction(
            "driver-call",
            "driver body contains no helper calls",
        ));
    }

    Ok(OpSequence::new(ops))
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

    #[test]
    fn test_parse_emits_calls_in_textual_order() {
        let seq = parse(SNIPPET).unwrap();
        assert_eq!(
            seq.ops(),
            &[Op::SwapWithFirst(3), Op::RemovePrefix(2), Op::Reverse]
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let first = parse(SNIPPET).unwrap();
        let second = parse(SNIPPET).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_missing_driver_fails() {
        let err = parse("var LU={wS:function(a){a.reverse()}};").unwrap_err();
        match err {
            DescrambleError::Extraction { stage, .. } => assert_eq!(stage, "driver"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_member_shape_fails() {
        // Third member pads the object but performs an unrecognized mutation
        let snippet = concat!(
            r#"var LU={wS:function(a){a.reverse()},"#,
            r#"bH:function(a,b){a.splice(0,b)},"#,
            r#"Qq:function(a,b){a.sort()}};"#,
            r#"function ns(a){a=a.split("");LU.wS(a,1);return a.join("")}"#,
        );
        let err = parse(snippet).unwrap_err();
        match err {
            DescrambleError::Extraction { stage, .. } => assert_eq!(stage, "helper-member"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_too_few_members_fails() {
        let snippet = concat!(
            r#"var LU={wS:function(a){a.reverse()},"#,
            r#"bH:function(a,b){a.splice(0,b)}};"#,
            r#"function ns(a){a=a.split("");LU.wS(a,1);return a.join("")}"#,
        );
        assert!(parse(snippet).is_err());
    }

    #[test]
    fn test_missing_helper_object_fails() {
        let snippet = r#"function ns(a){a=a.split("");LU.wS(a,1);return a.join("")}"#;
        let err = parse(snippet).unwrap_err();
        match err {
            DescrambleError::Extraction { stage, .. } => assert_eq!(stage, "helper-object"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_argument_fails() {
        let snippet = concat!(
            r#"var LU={wS:function(a){a.reverse()},"#,
            r#"bH:function(a,b){a.splice(0,b)},"#,
            r#"Vo:function(a,b){var c=a[0];a[0]=a[b%a.length];a[b%a.length]=c}};"#,
            r#"function ns(a){a=a.split("");LU.bH(a);return a.join("")}"#,
        );
        assert!(parse(snippet).is_err());
    }
}
