//! Lexer for `Fn::Sub` template strings using logos

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
enum Piece<'a> {
    /// `${!Literal}` renders as `${Literal}` without substitution
    #[regex(r"\$\{![^}]*\}", |lex| { let s = lex.slice(); &s[3..s.len() - 1] })]
    Escaped(&'a str),

    /// `${Name}` or `${Resource.Attribute}`
    #[regex(r"\$\{[^!}][^}]*\}", |lex| { let s = lex.slice(); &s[2..s.len() - 1] })]
    Placeholder(&'a str),

    #[regex(r"[^$]+")]
    Text,

    #[token("$")]
    Dollar,
}

/// A `${...}` placeholder found in a substitution string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placeholder<'a> {
    /// Everything between the braces
    pub name: &'a str,
}

impl<'a> Placeholder<'a> {
    /// The logical name the placeholder resolves against: the part before
    /// the first `.` for attribute placeholders, otherwise the whole name
    pub fn target(&self) -> &'a str {
        match self.name.split_once('.') {
            Some((resource, _)) => resource,
            None => self.name,
        }
    }

    pub fn is_attribute(&self) -> bool {
        self.name.contains('.')
    }
}

/// Every placeholder in a substitution string, in order
pub(crate) fn placeholders(template: &str) -> Vec<Placeholder<'_>> {
    Piece::lexer(template)
        .filter_map(|piece| match piece {
            Ok(Piece::Placeholder(name)) => Some(Placeholder { name: name.trim() }),
            _ => None,
        })
        .collect()
}

/// The rendered string when no substitution is needed, or `None` when the
/// template contains placeholders
pub(crate) fn unescape(template: &str) -> Option<String> {
    let mut lexer = Piece::lexer(template);
    let mut out = String::with_capacity(template.len());
    while let Some(piece) = lexer.next() {
        match piece {
            Ok(Piece::Placeholder(_)) => return None,
            Ok(Piece::Escaped(literal)) => {
                out.push_str("${");
                out.push_str(literal);
                out.push('}');
            }
            _ => out.push_str(lexer.slice()),
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_placeholders() {
        let found = placeholders("arn:${AWS::Partition}:s3:::${Bucket}/${Web.Arn}");
        let names: Vec<_> = found.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["AWS::Partition", "Bucket", "Web.Arn"]);
        assert_eq!(found[2].target(), "Web");
        assert!(found[2].is_attribute());
        assert!(!found[1].is_attribute());
    }

    #[test]
    fn test_escaped_placeholders_are_text() {
        assert!(placeholders("cost ${!Literal} and $5").is_empty());
    }

    #[test]
    fn test_unclosed_brace_is_text() {
        assert!(placeholders("price: ${oops").is_empty());
        assert_eq!(unescape("price: ${oops").as_deref(), Some("price: ${oops"));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a ${!B} c").as_deref(), Some("a ${B} c"));
        assert_eq!(unescape("plain").as_deref(), Some("plain"));
        assert_eq!(unescape("x ${Y}"), None);
    }
}
