//! Parser for the schema definition language
//!
//! Parses token streams into a [`Document`].

use std::fmt::Display;
use std::hash::Hash;

use chumsky::error::Error as _;
use chumsky::prelude::*;

use super::errors::{SchemaError, SchemaResult};
use super::lexer::{lexer, Token};
use super::types::*;

/// Parse SDL source text into a document
pub fn parse_document(source: &str) -> SchemaResult<Document> {
    let tokens = lexer()
        .parse(source)
        .map_err(|errs| syntax_error(source, errs))?;

    let len = source.chars().count();
    parser()
        .parse(chumsky::Stream::from_iter(len..len + 1, tokens.into_iter()))
        .map_err(|errs| syntax_error(source, errs))
}

fn syntax_error<T: Hash + Eq + Display>(source: &str, errors: Vec<Simple<T>>) -> SchemaError {
    match errors.into_iter().next() {
        Some(err) => {
            let (line, column) = position(source, err.span().start);
            SchemaError::syntax(line, column, err.to_string())
        }
        None => SchemaError::syntax(1, 1, "unrecognized input"),
    }
}

/// 1-based line and column of a character offset
fn position(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for c in source.chars().take(offset) {
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Create a parser for a complete SDL document
pub fn parser() -> impl Parser<Token, Document, Error = Simple<Token>> + Clone {
    choice((
        object_definition(),
        object_extension(),
        input_definition(),
        enum_definition(),
        scalar_definition(),
        directive_definition(),
    ))
    .repeated()
    .then_ignore(end())
    .map(|definitions| Document { definitions })
}

// ============================================================================
// Helpers
// ============================================================================

fn name() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    select! { Token::Name(s) => s }
}

fn keyword(word: &'static str) -> impl Parser<Token, (), Error = Simple<Token>> + Clone {
    just(Token::Name(word.to_string())).ignored()
}

fn description() -> impl Parser<Token, Option<String>, Error = Simple<Token>> + Clone {
    select! { Token::Str(s) => s }.or_not()
}

/// `Name`, `[Type]` and `Type!`
fn type_ref() -> impl Parser<Token, TypeRef, Error = Simple<Token>> + Clone {
    recursive(|ty| {
        let named = name().map(TypeRef::Named);
        let list = ty
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(TypeRef::list);

        named
            .or(list)
            .then(just(Token::Bang).or_not())
            .map(|(ty, bang)| if bang.is_some() { TypeRef::non_null(ty) } else { ty })
    })
}

fn const_value() -> impl Parser<Token, ConstValue, Error = Simple<Token>> + Clone {
    recursive(|value| {
        let number = filter_map(|span, tok: Token| match tok {
            Token::Int(digits) => digits
                .parse::<i64>()
                .map(ConstValue::Int)
                .map_err(|e| Simple::custom(span, format!("invalid integer {}: {}", digits, e))),
            Token::Float(digits) => digits
                .parse::<f64>()
                .map(ConstValue::Float)
                .map_err(|e| Simple::custom(span, format!("invalid float {}: {}", digits, e))),
            other => Err(Simple::expected_input_found(span, Vec::new(), Some(other))),
        });

        let string = select! { Token::Str(s) => ConstValue::String(s) };

        let named = name().map(|n| match n.as_str() {
            "true" => ConstValue::Boolean(true),
            "false" => ConstValue::Boolean(false),
            "null" => ConstValue::Null,
            _ => ConstValue::Enum(n),
        });

        let list = value
            .clone()
            .repeated()
            .delimited_by(just(Token::LBracket), just(Token::RBracket))
            .map(ConstValue::List);

        let object = name()
            .then_ignore(just(Token::Colon))
            .then(value)
            .repeated()
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(ConstValue::Object);

        choice((number, string, named, list, object))
    })
}

fn arguments() -> impl Parser<Token, Vec<(String, ConstValue)>, Error = Simple<Token>> + Clone {
    name()
        .then_ignore(just(Token::Colon))
        .then(const_value())
        .repeated()
        .delimited_by(just(Token::LParen), just(Token::RParen))
}

fn directives() -> impl Parser<Token, Vec<Directive>, Error = Simple<Token>> + Clone {
    just(Token::At)
        .ignore_then(name())
        .then(arguments().or_not())
        .map(|(name, arguments)| Directive {
            name,
            arguments: arguments.unwrap_or_default(),
        })
        .repeated()
}

fn input_value_definition() -> impl Parser<Token, InputValueDefinition, Error = Simple<Token>> + Clone
{
    description()
        .then(name())
        .then_ignore(just(Token::Colon))
        .then(type_ref())
        .then(just(Token::Eq).ignore_then(const_value()).or_not())
        .then(directives())
        .map(
            |((((description, name), ty), default_value), directives)| InputValueDefinition {
                description,
                name,
                ty,
                default_value,
                directives,
            },
        )
}

fn argument_definitions(
) -> impl Parser<Token, Vec<InputValueDefinition>, Error = Simple<Token>> + Clone {
    input_value_definition()
        .repeated()
        .delimited_by(just(Token::LParen), just(Token::RParen))
        .or_not()
        .map(Option::unwrap_or_default)
}

fn field_definition() -> impl Parser<Token, FieldDefinition, Error = Simple<Token>> + Clone {
    description()
        .then(name())
        .then(argument_definitions())
        .then_ignore(just(Token::Colon))
        .then(type_ref())
        .then(directives())
        .map(
            |((((description, name), arguments), ty), directives)| FieldDefinition {
                description,
                name,
                arguments,
                ty,
                directives,
            },
        )
}

/// `implements A & B`, with an optional leading `&`
fn implements() -> impl Parser<Token, Vec<String>, Error = Simple<Token>> + Clone {
    keyword("implements")
        .ignore_then(just(Token::Amp).or_not())
        .ignore_then(name().separated_by(just(Token::Amp)).at_least(1))
        .or_not()
        .map(Option::unwrap_or_default)
}

fn fields_block() -> impl Parser<Token, Vec<FieldDefinition>, Error = Simple<Token>> + Clone {
    field_definition()
        .repeated()
        .delimited_by(just(Token::LBrace), just(Token::RBrace))
        .or_not()
        .map(Option::unwrap_or_default)
}

// ============================================================================
// Definitions
// ============================================================================

fn object_definition() -> impl Parser<Token, Definition, Error = Simple<Token>> + Clone {
    description()
        .then_ignore(keyword("type"))
        .then(name())
        .then(implements())
        .then(directives())
        .then(fields_block())
        .map(|((((description, name), implements), directives), fields)| {
            Definition::Object(ObjectTypeDefinition {
                description,
                name,
                implements,
                directives,
                fields,
            })
        })
}

fn object_extension() -> impl Parser<Token, Definition, Error = Simple<Token>> + Clone {
    keyword("extend")
        .ignore_then(keyword("type"))
        .ignore_then(name())
        .then(implements())
        .then(directives())
        .then(fields_block())
        .map(|(((name, implements), directives), fields)| {
            Definition::ObjectExtension(ObjectTypeDefinition {
                description: None,
                name,
                implements,
                directives,
                fields,
            })
        })
}

fn input_definition() -> impl Parser<Token, Definition, Error = Simple<Token>> + Clone {
    description()
        .then_ignore(keyword("input"))
        .then(name())
        .then(directives())
        .then(
            input_value_definition()
                .repeated()
                .delimited_by(just(Token::LBrace), just(Token::RBrace))
                .or_not()
                .map(Option::unwrap_or_default),
        )
        .map(|(((description, name), directives), fields)| {
            Definition::InputObject(InputObjectTypeDefinition {
                description,
                name,
                directives,
                fields,
            })
        })
}

fn enum_definition() -> impl Parser<Token, Definition, Error = Simple<Token>> + Clone {
    let value = description()
        .then(name())
        .then(directives())
        .map(|((description, name), directives)| EnumValueDefinition {
            description,
            name,
            directives,
        });

    description()
        .then_ignore(keyword("enum"))
        .then(name())
        .then(directives())
        .then(
            value
                .repeated()
                .delimited_by(just(Token::LBrace), just(Token::RBrace))
                .or_not()
                .map(Option::unwrap_or_default),
        )
        .map(|(((description, name), directives), values)| {
            Definition::Enum(EnumTypeDefinition {
                description,
                name,
                directives,
                values,
            })
        })
}

fn scalar_definition() -> impl Parser<Token, Definition, Error = Simple<Token>> + Clone {
    description()
        .then_ignore(keyword("scalar"))
        .then(name())
        .then(directives())
        .map(|((description, name), directives)| {
            Definition::Scalar(ScalarTypeDefinition {
                description,
                name,
                directives,
            })
        })
}

fn directive_definition() -> impl Parser<Token, Definition, Error = Simple<Token>> + Clone {
    description()
        .then_ignore(keyword("directive"))
        .then_ignore(just(Token::At))
        .then(name())
        .then(argument_definitions())
        .then(keyword("repeatable").or_not())
        .then_ignore(keyword("on"))
        .then_ignore(just(Token::Pipe).or_not())
        .then(name().separated_by(just(Token::Pipe)).at_least(1))
        .map(|((((description, name), arguments), repeatable), locations)| {
            Definition::Directive(DirectiveDefinition {
                description,
                name,
                arguments,
                repeatable: repeatable.is_some(),
                locations,
            })
        })
}
