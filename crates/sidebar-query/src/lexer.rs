//! Predicate Lexer
//!
//! Tokenizes s-expression predicates into tokens.

/// Predicate token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// Quoted string
    Str(String),
    /// Keyword argument (`:on`)
    Keyword(String),
    /// Any other bare word, number or operator
    Atom(String),
    /// End of input
    Eof,
}

/// Token with its starting byte offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    /// Token
    pub token: Token,
    /// Byte offset in the query text
    pub position: usize,
}

/// Lexer error: message and offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Byte offset in the query text
    pub position: usize,
    /// What went wrong
    pub message: String,
}

/// Predicate lexer
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else if c == ';' {
                // Comment to end of line
                let skip = self.remaining().find('\n').unwrap_or(self.remaining().len());
                self.advance(skip);
            } else {
                break;
            }
        }
    }

    /// Get the next token
    ///
    /// # Errors
    /// Returns error on an unterminated string
    pub fn next_token(&mut self) -> Result<Spanned, LexError> {
        self.skip_whitespace();
        let position = self.pos;

        let Some(c) = self.peek() else {
            return Ok(Spanned {
                token: Token::Eof,
                position,
            });
        };

        let token = match c {
            '(' => {
                self.advance(1);
                Token::LeftParen
            }
            ')' => {
                self.advance(1);
                Token::RightParen
            }
            '"' => Token::Str(self.read_string()?),
            // Quote marks are accepted and ignored: '(a b) reads as (a b)
            '\'' => {
                self.advance(1);
                return self.next_token();
            }
            _ => {
                let word = self.read_word();
                match word.strip_prefix(':') {
                    Some(name) if !name.is_empty() => Token::Keyword(name.to_ascii_lowercase()),
                    _ => Token::Atom(word),
                }
            }
        };

        Ok(Spanned { token, position })
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.pos;
        self.advance(1);
        let mut out = String::new();
        while let Some(c) = self.peek() {
            self.advance(c.len_utf8());
            match c {
                '"' => return Ok(out),
                '\\' => {
                    if let Some(next) = self.peek() {
                        self.advance(next.len_utf8());
                        out.push(next);
                    }
                }
                _ => out.push(c),
            }
        }
        Err(LexError {
            position: start,
            message: "unterminated string".into(),
        })
    }

    fn read_word(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';') {
                break;
            }
            self.advance(c.len_utf8());
        }
        self.input[start..self.pos].to_string()
    }

    /// Tokenize the whole input, ending with `Eof`
    ///
    /// # Errors
    /// Returns error on an unterminated string
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn simple_form() {
        assert_eq!(
            tokens(r#"(tags "work" home)"#),
            vec![
                Token::LeftParen,
                Token::Atom("tags".into()),
                Token::Str("work".into()),
                Token::Atom("home".into()),
                Token::RightParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_numbers() {
        assert_eq!(
            tokens("(scheduled :from -2 :TO today)"),
            vec![
                Token::LeftParen,
                Token::Atom("scheduled".into()),
                Token::Keyword("from".into()),
                Token::Atom("-2".into()),
                Token::Keyword("to".into()),
                Token::Atom("today".into()),
                Token::RightParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn escapes_and_comments() {
        assert_eq!(
            tokens("(heading \"a \\\"b\\\"\") ; trailing"),
            vec![
                Token::LeftParen,
                Token::Atom("heading".into()),
                Token::Str("a \"b\"".into()),
                Token::RightParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string() {
        let err = Lexer::new("(heading \"oops").tokenize().unwrap_err();
        assert_eq!(err.position, 9);
    }
}
