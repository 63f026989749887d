//! Predicate Parser
//!
//! Two passes: tokens are read into s-expressions, then each form is
//! compiled into a [`Predicate`]. Syntax errors carry the byte offset of
//! the offending token.

use crate::error::{QueryError, QueryResult};
use crate::lexer::{Lexer, Spanned, Token};
use crate::predicate::{Comparator, DateRange, DateSpec, PlanningKind, Predicate, PriorityTest};
use regex::{Regex, RegexBuilder};

/// S-expression node
#[derive(Debug, Clone, PartialEq, Eq)]
enum Sexp {
    List(Vec<Sexp>, usize),
    Atom(String, usize),
    Str(String, usize),
    Keyword(String, usize),
}

impl Sexp {
    fn position(&self) -> usize {
        match self {
            Self::List(_, p) | Self::Atom(_, p) | Self::Str(_, p) | Self::Keyword(_, p) => *p,
        }
    }

    /// Text of an atom or string
    fn text(&self) -> Option<&str> {
        match self {
            Self::Atom(s, _) | Self::Str(s, _) => Some(s),
            _ => None,
        }
    }
}

fn syntax(position: usize, message: impl Into<String>) -> QueryError {
    QueryError::Syntax {
        query: String::new(),
        position,
        message: message.into(),
    }
}

/// Reads tokens into s-expressions
struct Reader {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Reader {
    fn current(&self) -> &Spanned {
        // tokenize() always ends with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn read(&mut self) -> QueryResult<Sexp> {
        let Spanned { token, position } = self.current().clone();
        self.advance();
        match token {
            Token::LeftParen => {
                let mut items = Vec::new();
                loop {
                    match self.current().token {
                        Token::RightParen => {
                            self.advance();
                            return Ok(Sexp::List(items, position));
                        }
                        Token::Eof => return Err(syntax(position, "unclosed parenthesis")),
                        _ => items.push(self.read()?),
                    }
                }
            }
            Token::RightParen => Err(syntax(position, "unexpected ')'")),
            Token::Str(s) => Ok(Sexp::Str(s, position)),
            Token::Keyword(k) => Ok(Sexp::Keyword(k, position)),
            Token::Atom(a) => Ok(Sexp::Atom(a, position)),
            Token::Eof => Err(syntax(position, "empty query")),
        }
    }
}

/// Parse predicate source text
///
/// # Errors
/// Returns `QueryError` for malformed text, unknown predicates, bad
/// arguments or invalid regexes
pub fn parse(input: &str) -> QueryResult<Predicate> {
    let tokens = Lexer::new(input)
        .tokenize()
        .map_err(|e| syntax(e.position, e.message).with_query(input))?;
    let mut reader = Reader { tokens, pos: 0 };

    let mut forms = Vec::new();
    while reader.current().token != Token::Eof {
        forms.push(reader.read().map_err(|e| e.with_query(input))?);
    }

    let predicate = match forms.len() {
        0 => return Err(syntax(0, "empty query").with_query(input)),
        1 => compile(&forms[0]),
        // Several top-level forms are an implicit `and`
        _ => forms.iter().map(compile).collect::<QueryResult<_>>().map(Predicate::And),
    };
    predicate.map_err(|e| e.with_query(input))
}

fn compile(sexp: &Sexp) -> QueryResult<Predicate> {
    let Sexp::List(items, position) = sexp else {
        return Err(syntax(sexp.position(), "expected a (predicate ...) form"));
    };
    let Some((head, args)) = items.split_first() else {
        return Err(syntax(*position, "empty form"));
    };
    let Sexp::Atom(name, _) = head else {
        return Err(syntax(head.position(), "predicate name must be a bare word"));
    };
    let name = name.to_ascii_lowercase();

    match name.as_str() {
        "and" => Ok(Predicate::And(compile_all(args)?)),
        "or" => Ok(Predicate::Or(compile_all(args)?)),
        "not" => Ok(Predicate::Not(Box::new(single(&name, args)?))),
        "ancestors" => Ok(Predicate::Ancestors(Box::new(single(&name, args)?))),
        "parent" => Ok(Predicate::Parent(Box::new(single(&name, args)?))),
        "todo" => Ok(Predicate::Todo(strings(&name, args)?)),
        "done" => {
            no_args(&name, args)?;
            Ok(Predicate::Done)
        }
        "tags" => Ok(Predicate::Tags(strings(&name, args)?)),
        "tags-local" => Ok(Predicate::TagsLocal(strings(&name, args)?)),
        "category" => Ok(Predicate::Category(strings(&name, args)?)),
        "priority" => priority(&name, args),
        "scheduled" => planning(PlanningKind::Scheduled, args),
        "deadline" => planning(PlanningKind::Deadline, args),
        "closed" => planning(PlanningKind::Closed, args),
        "planning" => planning(PlanningKind::Any, args),
        "level" => level(&name, args),
        "heading" => Ok(Predicate::Heading(regexes(&name, args)?)),
        "regexp" => Ok(Predicate::Regexp(regexes(&name, args)?)),
        "property" => property(&name, args),
        "true" | "t" => {
            no_args(&name, args)?;
            Ok(Predicate::True)
        }
        _ => Err(QueryError::UnknownPredicate {
            name,
            query: String::new(),
        }),
    }
}

fn compile_all(args: &[Sexp]) -> QueryResult<Vec<Predicate>> {
    args.iter().map(compile).collect()
}

fn single(name: &str, args: &[Sexp]) -> QueryResult<Predicate> {
    match args {
        [one] => compile(one),
        _ => Err(QueryError::invalid_argument(name, "expects exactly one predicate")),
    }
}

fn no_args(name: &str, args: &[Sexp]) -> QueryResult<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(QueryError::invalid_argument(name, "takes no arguments"))
    }
}

fn strings(name: &str, args: &[Sexp]) -> QueryResult<Vec<String>> {
    args.iter()
        .map(|a| {
            a.text()
                .map(str::to_string)
                .ok_or_else(|| QueryError::invalid_argument(name, "expects words or strings"))
        })
        .collect()
}

/// Smart case: a pattern without capitals matches case-insensitively
fn regex(pattern: &str) -> QueryResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!pattern.chars().any(char::is_uppercase))
        .build()
        .map_err(|e| QueryError::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn regexes(name: &str, args: &[Sexp]) -> QueryResult<Vec<Regex>> {
    if args.is_empty() {
        return Err(QueryError::invalid_argument(name, "expects at least one pattern"));
    }
    strings(name, args)?.iter().map(|p| regex(p)).collect()
}

fn priority_char(name: &str, s: &str) -> QueryResult<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Ok(c.to_ascii_uppercase()),
        _ => Err(QueryError::invalid_argument(
            name,
            format!("'{s}' is not a priority"),
        )),
    }
}

fn priority(name: &str, args: &[Sexp]) -> QueryResult<Predicate> {
    let words = strings(name, args)?;
    let test = match words.as_slice() {
        [] => PriorityTest::Any,
        [op, p] if Comparator::parse(op).is_some() => {
            let cmp = Comparator::parse(op)
                .ok_or_else(|| QueryError::invalid_argument(name, "bad comparator"))?;
            PriorityTest::Compare(cmp, priority_char(name, p)?)
        }
        list => PriorityTest::OneOf(
            list.iter()
                .map(|p| priority_char(name, p))
                .collect::<QueryResult<_>>()?,
        ),
    };
    Ok(Predicate::Priority(test))
}

fn date(kind: PlanningKind, arg: Option<&Sexp>) -> QueryResult<DateSpec> {
    let text = arg
        .and_then(Sexp::text)
        .ok_or_else(|| QueryError::invalid_argument(kind.to_string(), "keyword needs a date"))?;
    DateSpec::parse(text).ok_or_else(|| {
        QueryError::invalid_argument(kind.to_string(), format!("'{text}' is not a date"))
    })
}

fn planning(kind: PlanningKind, args: &[Sexp]) -> QueryResult<Predicate> {
    let mut range = DateRange::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let Sexp::Keyword(key, _) = arg else {
            return Err(QueryError::invalid_argument(
                kind.to_string(),
                "expects :on, :from or :to",
            ));
        };
        let value = date(kind, iter.next())?;
        match key.as_str() {
            "on" => range = DateRange::on(value),
            "from" => range.from = Some(value),
            "to" => range.to = Some(value),
            other => {
                return Err(QueryError::invalid_argument(
                    kind.to_string(),
                    format!("unknown keyword :{other}"),
                ))
            }
        }
    }
    Ok(Predicate::Planning(kind, range))
}

fn level(name: &str, args: &[Sexp]) -> QueryResult<Predicate> {
    let numbers = strings(name, args)?
        .iter()
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| QueryError::invalid_argument(name, format!("'{s}' is not a level")))
        })
        .collect::<QueryResult<Vec<_>>>()?;
    match numbers.as_slice() {
        [n] => Ok(Predicate::Level { min: *n, max: *n }),
        [a, b] => Ok(Predicate::Level {
            min: *a.min(b),
            max: *a.max(b),
        }),
        _ => Err(QueryError::invalid_argument(name, "expects one or two levels")),
    }
}

fn property(name: &str, args: &[Sexp]) -> QueryResult<Predicate> {
    let words = strings(name, args)?;
    match words.as_slice() {
        [key] => Ok(Predicate::Property {
            key: key.to_ascii_uppercase(),
            value: None,
        }),
        [key, value] => Ok(Predicate::Property {
            key: key.to_ascii_uppercase(),
            value: Some(value.clone()),
        }),
        _ => Err(QueryError::invalid_argument(name, "expects KEY [VALUE]")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_forms() {
        let p = parse("(and (todo) (or (tags \"work\") (not (priority C))))").unwrap();
        let Predicate::And(parts) = p else {
            panic!("expected and");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], Predicate::Todo(ref k) if k.is_empty()));
        assert!(matches!(parts[1], Predicate::Or(_)));
    }

    #[test]
    fn parses_planning_ranges() {
        let p = parse("(deadline :from today :to 7)").unwrap();
        let Predicate::Planning(PlanningKind::Deadline, range) = p else {
            panic!("expected deadline");
        };
        assert_eq!(range.from, Some(DateSpec::Today));
        assert_eq!(range.to, Some(DateSpec::Offset(7)));

        assert!(matches!(
            parse("(scheduled)").unwrap(),
            Predicate::Planning(PlanningKind::Scheduled, r) if r == DateRange::default()
        ));
    }

    #[test]
    fn top_level_forms_are_conjoined() {
        assert!(matches!(parse("(todo) (tags x)").unwrap(), Predicate::And(v) if v.len() == 2));
    }

    #[test]
    fn priority_forms() {
        assert!(matches!(
            parse("(priority >= B)").unwrap(),
            Predicate::Priority(PriorityTest::Compare(Comparator::GtEq, 'B'))
        ));
        assert!(matches!(
            parse("(priority a c)").unwrap(),
            Predicate::Priority(PriorityTest::OneOf(ref v)) if v == &['A', 'C']
        ));
    }

    #[test]
    fn malformed_queries_report_text() {
        let err = parse("(todo").unwrap_err();
        match err {
            QueryError::Syntax { query, position, .. } => {
                assert_eq!(query, "(todo");
                assert_eq!(position, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse(")"), Err(QueryError::Syntax { .. })));
        assert!(matches!(parse(""), Err(QueryError::Syntax { .. })));
        assert!(matches!(parse("todo"), Err(QueryError::Syntax { .. })));
    }

    #[test]
    fn unknown_predicate_and_arguments() {
        assert!(matches!(
            parse("(frobnicate)"),
            Err(QueryError::UnknownPredicate { ref name, ref query }) if name == "frobnicate" && query == "(frobnicate)"
        ));
        assert!(matches!(parse("(level x)"), Err(QueryError::InvalidArgument { .. })));
        assert!(matches!(parse("(not)"), Err(QueryError::InvalidArgument { .. })));
        assert!(matches!(parse("(scheduled :on someday)"), Err(QueryError::InvalidArgument { .. })));
        assert!(matches!(parse("(heading \"(\")"), Err(QueryError::InvalidRegex { .. })));
    }
}
