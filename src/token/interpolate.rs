//! Build join expressions from interleaved text segments and token holes

use thiserror::Error;

use super::Token;

/// Errors from token builders
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Segment and hole counts do not interleave
    #[error("interpolation needs one more segment than holes (got {segments} segments, {holes} holes)")]
    SegmentMismatch { segments: usize, holes: usize },
}

/// Interleave literal segments with token holes into a `Fn::Join` on `""`
///
/// `segments[0], holes[0], segments[1], ..., segments[n]`. Empty segments are
/// kept as empty literals so every position stays where it was written.
///
/// # Example
///
/// ```rust
/// use stackform::{interpolate, Token};
///
/// let name = interpolate(["", "-bucket"], [Token::<String>::reference("Stage")]).unwrap();
/// assert_eq!(
///     name,
///     Token::join("", ["".into(), Token::reference("Stage"), "-bucket".into()])
/// );
/// ```
pub fn interpolate<S, H>(
    segments: impl IntoIterator<Item = S>,
    holes: impl IntoIterator<Item = H>,
) -> Result<Token<String>, TokenError>
where
    S: Into<String>,
    H: Into<Token<String>>,
{
    let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
    let holes: Vec<Token<String>> = holes.into_iter().map(Into::into).collect();

    if segments.len() != holes.len() + 1 {
        return Err(TokenError::SegmentMismatch {
            segments: segments.len(),
            holes: holes.len(),
        });
    }

    let mut values = Vec::with_capacity(segments.len() + holes.len());
    let mut holes = holes.into_iter();
    for segment in segments {
        values.push(Token::Literal(segment));
        if let Some(hole) = holes.next() {
            values.push(hole);
        }
    }

    Ok(Token::join("", values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Intrinsic;

    fn operands(token: Token<String>) -> Vec<Token<String>> {
        match token {
            Token::Call(call) => match *call {
                Intrinsic::Join { delimiter, values } => {
                    assert_eq!(delimiter, "");
                    values
                }
                other => panic!("expected Fn::Join, got {:?}", other),
            },
            other => panic!("expected a call, got {:?}", other),
        }
    }

    #[test]
    fn test_interleaves_segments_and_holes() {
        let token = interpolate(
            ["pre-", "-mid-", "-post"],
            [Token::<String>::reference("p1"), Token::reference("p2")],
        )
        .unwrap();

        assert_eq!(
            operands(token),
            vec![
                Token::Literal("pre-".to_string()),
                Token::Ref("p1".to_string()),
                Token::Literal("-mid-".to_string()),
                Token::Ref("p2".to_string()),
                Token::Literal("-post".to_string()),
            ]
        );
    }

    #[test]
    fn test_keeps_empty_segments() {
        let token = interpolate(["", ""], [Token::<String>::reference("Only")]).unwrap();
        assert_eq!(
            operands(token),
            vec![
                Token::Literal(String::new()),
                Token::Ref("Only".to_string()),
                Token::Literal(String::new()),
            ]
        );
    }

    #[test]
    fn test_plain_text_without_holes() {
        let token = interpolate(["static"], Vec::<Token<String>>::new()).unwrap();
        assert_eq!(operands(token), vec![Token::Literal("static".to_string())]);
    }

    #[test]
    fn test_mismatched_counts() {
        let err = interpolate(["a", "b"], Vec::<Token<String>>::new()).unwrap_err();
        assert_eq!(err, TokenError::SegmentMismatch { segments: 2, holes: 0 });
    }
}
