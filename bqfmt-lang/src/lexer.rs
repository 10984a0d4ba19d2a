use chumsky::Parser;
use chumsky::input::StrInput;
use chumsky::prelude::*;

use crate::token::Token;
use crate::utils::metadata::LineIndex;

type LexerError<'src> = chumsky::extra::Err<Rich<'src, char, SimpleSpan>>;

fn comment_parser<'src, I>() -> impl Parser<'src, I, &'src str, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    // line comments stop before the newline so that the newline stays a separator.
    let endline = text::newline().or(end()).rewind();
    let single_line = just("--")
        .or(just("#"))
        .then(any().and_is(text::newline().not()).repeated())
        .then_ignore(endline)
        .to_slice();

    let multi_line = just("/*")
        .then(any().and_is(just("*/").not()).repeated())
        .then(just("*/"))
        .to_slice();

    single_line.or(multi_line)
}

fn quoted_parser<'src, I>(q: char) -> impl Parser<'src, I, &'src str, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    let escaped = just('\\').then(any()).ignored();
    just(q)
        .then(escaped.or(none_of([q, '\\', '\n']).ignored()).repeated())
        .then(just(q))
        .to_slice()
}

fn triple_quoted_parser<'src, I>(
    q: &'static str,
) -> impl Parser<'src, I, &'src str, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    let escaped = just('\\').then(any()).ignored();
    just(q)
        .then(escaped.or(any().and_is(just(q).not()).ignored()).repeated())
        .then(just(q))
        .to_slice()
}

fn string_parser<'src, I>() -> impl Parser<'src, I, &'src str, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    choice((
        triple_quoted_parser("'''"),
        triple_quoted_parser("\"\"\""),
        quoted_parser('\''),
        quoted_parser('"'),
    ))
}

fn number_parser<'src, I>() -> impl Parser<'src, I, &'src str, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    let hex = just('0')
        .then(one_of("xX"))
        .then(text::digits::<I, LexerError<'src>>(16))
        .to_slice();
    let frac = just('.').then(text::digits::<I, LexerError<'src>>(10));
    let exp = one_of("eE")
        .then(one_of("+-").or_not())
        .then(text::digits::<I, LexerError<'src>>(10));
    let decimal = text::digits::<I, LexerError<'src>>(10)
        .then(frac.clone().or_not())
        .ignored()
        .or(frac.ignored())
        .then(exp.or_not())
        .to_slice();
    hex.or(decimal)
}

pub fn tokenizer<'src, I>() -> impl Parser<'src, I, &'src str, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    let quoted_ident = just('`')
        .then(none_of('`').repeated())
        .then(just('`'))
        .to_slice();

    // @param, @@system_variable, ?
    let parameter = just("@@")
        .or(just("@"))
        .then(text::ident())
        .to_slice()
        .or(just("?").to_slice());

    let ident = text::ident().to_slice();

    // multi-character operators must be tried before their single-character prefixes.
    let op = choice((
        just("||"),
        just("|>"),
        just("<<"),
        just("<="),
        just("<>"),
        just(">>"),
        just(">="),
        just("=>"),
        just("!="),
    ))
    .to_slice()
    .or(one_of("(),.;[]{}+-*/%=<>!|&^~:").to_slice());

    choice((
        comment_parser(),
        string_parser(),
        quoted_ident,
        number_parser(),
        parameter,
        ident,
        op,
    ))
}

pub fn lexer<'src, I>()
-> impl Parser<'src, I, Vec<(&'src str, SimpleSpan)>, LexerError<'src>> + Clone
where
    I: StrInput<'src, Token = char, Span = SimpleSpan, Slice = &'src str>,
{
    text::whitespace().ignore_then(
        tokenizer()
            .map_with(|t, e| (t, e.span()))
            .then_ignore(text::whitespace())
            .repeated()
            .collect::<Vec<_>>(),
    )
    .then_ignore(end())
}

/// Error produced while splitting a source into tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub span: std::ops::Range<usize>,
}

/// Splits `src` into positioned tokens. Comments are kept as tokens.
pub fn tokenize(src: &str) -> Result<Vec<Token>, Vec<LexError>> {
    let (output, errs) = lexer().parse(src).into_output_errors();
    if !errs.is_empty() {
        return Err(errs
            .into_iter()
            .map(|e| LexError {
                message: e.to_string(),
                span: e.span().start..e.span().end,
            })
            .collect());
    }
    let index = LineIndex::new(src);
    let tokens = output
        .unwrap_or_default()
        .into_iter()
        .map(|(literal, span)| {
            let (line, column) = index.position(span.start);
            let literal = if literal.starts_with("--") || literal.starts_with('#') {
                literal.trim_end()
            } else {
                literal
            };
            Token::new(line, column, literal)
        })
        .collect();
    Ok(split_type_closers(tokens))
}

/// `ARRAY<STRUCT<x INT64>>` ends with `>>`, which closes two type parameter lists
/// rather than shifting. Splits it while a type parameter list is open.
fn split_type_closers(tokens: Vec<Token>) -> Vec<Token> {
    let mut depth = 0usize;
    let mut res: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let after_type_keyword = res
            .iter()
            .rev()
            .find(|t| !t.is_comment())
            .is_some_and(|t| t.in_(&["ARRAY", "STRUCT", "RANGE"]));
        match token.literal.as_str() {
            "<" if after_type_keyword => {
                depth += 1;
                res.push(token);
            }
            ">" if depth > 0 => {
                depth -= 1;
                res.push(token);
            }
            ">>" if depth > 0 => {
                depth = depth.saturating_sub(2);
                res.push(Token::new(token.line, token.column, ">"));
                res.push(Token::new(token.line, token.column + 1, ">"));
            }
            _ => res.push(token),
        }
    }
    res
}

#[cfg(test)]
mod test {
    use super::*;

    fn literals(src: &str) -> Vec<String> {
        tokenize(src)
            .expect("tokenize failed")
            .into_iter()
            .map(|t| t.literal)
            .collect()
    }

    #[test]
    fn test_select() {
        let tokens = tokenize("SELECT a,\n  b FROM t;").expect("tokenize failed");
        let expected = [
            (1, 1, "SELECT"),
            (1, 8, "a"),
            (1, 9, ","),
            (2, 3, "b"),
            (2, 5, "FROM"),
            (2, 10, "t"),
            (2, 11, ";"),
        ];
        assert_eq!(tokens.len(), expected.len());
        for (t, (line, column, literal)) in tokens.iter().zip(expected) {
            assert_eq!((t.line, t.column, t.literal.as_str()), (line, column, literal));
        }
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            literals("SELECT 1 -- one  \n# two\n/* three\n */ 2"),
            vec!["SELECT", "1", "-- one", "# two", "/* three\n */", "2"]
        );
    }

    #[test]
    fn test_strings_and_identifiers() {
        assert_eq!(
            literals(r#"SELECT 'it\'s', "a", '''x'y''', r'\d', `p.d.t`"#),
            vec![
                "SELECT", "'it\\'s'", ",", "\"a\"", ",", "'''x'y'''", ",", "r", "'\\d'", ",",
                "`p.d.t`"
            ]
        );
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            literals("1.5e-3 + .5 <> a.b || @p >= @@x"),
            vec!["1.5e-3", "+", ".5", "<>", "a", ".", "b", "||", "@p", ">=", "@@x"]
        );
    }

    #[test]
    fn test_hex_numbers() {
        assert_eq!(literals("0x1F + 0XaB0 - 0"), vec!["0x1F", "+", "0XaB0", "-", "0"]);
        // `0x` without hex digits is a zero followed by an identifier
        assert_eq!(literals("0xZ"), vec!["0", "xZ"]);
    }

    #[test]
    fn test_nested_type_closer() {
        assert_eq!(
            literals("ARRAY<STRUCT<x INT64>>[] , 1 >> 2"),
            vec![
                "ARRAY", "<", "STRUCT", "<", "x", "INT64", ">", ">", "[", "]", ",", "1", ">>",
                "2"
            ]
        );
    }

    #[test]
    fn test_error() {
        let errs = tokenize("SELECT 'unterminated").expect_err("should fail");
        assert!(!errs.is_empty());
    }
}
