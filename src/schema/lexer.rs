//! Lexer for the schema definition language
//!
//! Tokenizes SDL source into a stream for the parser. Commas and `#` comments
//! are insignificant and produce no tokens.

use chumsky::prelude::*;
use std::ops::Range;

/// Token types for SDL
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    // Names (keywords are contextual and lexed as names)
    Name(String),

    // Literals
    Int(String),
    Float(String),
    Str(String),

    // Punctuation
    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Colon,    // :
    Bang,     // !
    At,       // @
    Eq,       // =
    Pipe,     // |
    Amp,      // &
    Dollar,   // $
    Spread,   // ...
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Name(s) => write!(f, "{}", s),
            Token::Int(s) => write!(f, "{}", s),
            Token::Float(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "{:?}", s),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Colon => write!(f, ":"),
            Token::Bang => write!(f, "!"),
            Token::At => write!(f, "@"),
            Token::Eq => write!(f, "="),
            Token::Pipe => write!(f, "|"),
            Token::Amp => write!(f, "&"),
            Token::Dollar => write!(f, "$"),
            Token::Spread => write!(f, "..."),
        }
    }
}

/// Type alias for spans
pub type Span = Range<usize>;

/// Create a lexer for SDL
pub fn lexer() -> impl Parser<char, Vec<(Token, Span)>, Error = Simple<char>> {
    let name = text::ident().map(Token::Name);

    let frac = just('.').chain(text::digits(10));
    let exp = just('e')
        .or(just('E'))
        .chain(just('+').or(just('-')).or_not())
        .chain::<char, _, _>(text::digits(10));
    let number = just('-')
        .or_not()
        .chain::<char, _, _>(text::int(10))
        .chain::<char, _, _>(frac.or_not().flatten())
        .chain::<char, _, _>(exp.or_not().flatten())
        .collect::<String>()
        .map(|digits| {
            if digits.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
                Token::Float(digits)
            } else {
                Token::Int(digits)
            }
        });

    let escape = just('\\').ignore_then(choice((
        just('\\'),
        just('/'),
        just('"'),
        just('b').to('\x08'),
        just('f').to('\x0C'),
        just('n').to('\n'),
        just('r').to('\r'),
        just('t').to('\t'),
        just('u').ignore_then(
            filter(|c: &char| c.is_ascii_hexdigit())
                .repeated()
                .exactly(4)
                .collect::<String>()
                .validate(|digits, span, emit| {
                    u32::from_str_radix(&digits, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .unwrap_or_else(|| {
                            emit(Simple::custom(span, "invalid unicode escape"));
                            '\u{FFFD}'
                        })
                }),
        ),
    )));

    let string = just('"')
        .ignore_then(filter(|c: &char| *c != '\\' && *c != '"' && *c != '\n').or(escape).repeated())
        .then_ignore(just('"'))
        .collect::<String>()
        .map(Token::Str);

    let block_string = just("\"\"\"")
        .ignore_then(take_until(just("\"\"\"")))
        .map(|(chars, _)| Token::Str(dedent_block(&chars.into_iter().collect::<String>())));

    let punctuation = choice((
        just("...").to(Token::Spread),
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('[').to(Token::LBracket),
        just(']').to(Token::RBracket),
        just(':').to(Token::Colon),
        just('!').to(Token::Bang),
        just('@').to(Token::At),
        just('=').to(Token::Eq),
        just('|').to(Token::Pipe),
        just('&').to(Token::Amp),
        just('$').to(Token::Dollar),
    ));

    let comment = just('#')
        .then(none_of('\n').repeated())
        .then(just('\n').or_not())
        .ignored();
    let comma = just(',').ignored();

    let token_or_skip = comment
        .or(comma)
        .to(None)
        .or(choice((block_string, string, number, name, punctuation)).map(Some));

    token_or_skip
        .map_with_span(|opt_tok, span| opt_tok.map(|tok| (tok, span)))
        .padded()
        .repeated()
        .then_ignore(end())
        .map(|items| items.into_iter().flatten().collect())
}

/// Strip common indentation and leading/trailing blank lines from a block string
fn dedent_block(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();

    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim_start().to_string()
            } else {
                line.get(indent..).unwrap_or_else(|| line.trim_start()).to_string()
            }
        })
        .collect();

    while out.first().map_or(false, |l| l.trim().is_empty()) {
        out.remove(0);
    }
    while out.last().map_or(false, |l| l.trim().is_empty()) {
        out.pop();
    }
    out.join("\n")
}
