//! tolerant json: strip `//` and `/* */` comments
//!
//! String literals are copied verbatim, so `"http://example.com"` survives. Whitespace and line
//! breaks outside of comments are kept to preserve the line/column information of parse errors.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    String,
    /// the previous character inside a string was an unescaped `\`
    StringEscape,
    LineComment,
    BlockComment,
}

/// Removes all comments from `text`
pub fn strip(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        state = match state {
            State::Code => match (c, chars.peek().copied()) {
                ('"', _) => {
                    out.push(c);
                    State::String
                }
                ('/', Some('/')) => {
                    chars.next();
                    State::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    State::BlockComment
                }
                _ => {
                    out.push(c);
                    State::Code
                }
            },
            State::String => {
                out.push(c);
                match c {
                    '\\' => State::StringEscape,
                    '"' => State::Code,
                    _ => State::String,
                }
            }
            State::StringEscape => {
                out.push(c);
                State::String
            }
            State::LineComment => match c {
                '\n' | '\r' => {
                    out.push(c);
                    State::Code
                }
                _ => State::LineComment,
            },
            State::BlockComment => match (c, chars.peek().copied()) {
                ('*', Some('/')) => {
                    chars.next();
                    State::Code
                }
                // keep line numbers stable
                ('\n', _) => {
                    out.push(c);
                    State::BlockComment
                }
                _ => State::BlockComment,
            },
        };
    }

    if state == State::BlockComment {
        tracing::debug!("unterminated block comment swallowed the rest of the input");
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn block_comment() {
        assert_eq!(
            strip(r#"{ "a": 1, /* "b": "c", */ "d": true }"#),
            r#"{ "a": 1,  "d": true }"#
        );
    }

    #[test]
    fn line_comment() {
        assert_eq!(
            strip("{\n  \"a\": 1, // first\n  // \"b\": 2,\n  \"c\": 3\n}"),
            "{\n  \"a\": 1, \n  \n  \"c\": 3\n}"
        );
    }

    #[test]
    fn comment_markers_inside_strings() {
        let text = r#"{ "url": "http://example.com/*path*/", "c": "//" }"#;
        assert_eq!(strip(text), text);
    }

    #[test]
    fn escaped_quotes() {
        assert_eq!(
            strip(r#"{ "a": "say \"hi\" // not a comment" } // comment"#),
            r#"{ "a": "say \"hi\" // not a comment" } "#
        );
    }

    #[test]
    fn escaped_backslash_ends_string() {
        assert_eq!(
            strip(r#"{ "a": "dir\\" /* gone */ }"#),
            r#"{ "a": "dir\\"  }"#
        );
    }

    #[test]
    fn block_comment_keeps_line_breaks() {
        assert_eq!(strip("1 /* a\nb\n*/ 2"), "1 \n\n 2");
    }

    #[test]
    fn unterminated_block_comment() {
        assert_eq!(strip("{} /* never closed"), "{} ");
    }

    #[test]
    fn division_like_slash_is_kept() {
        assert_eq!(strip("a / b"), "a / b");
    }
}
