use super::ConfigError;
use logos::{Lexer, Logos};

/// A value as written in the configuration source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Value<'a> {
    /// `10`, `0.6`, `1e3`, kept as written
    Number(&'a str),
    /// `60%`, the number before the `%`
    Percent(&'a str),
    Word(&'a str),
}

/// One `key = value` line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Entry<'a> {
    pub line: usize,
    pub key: &'a str,
    pub value: Value<'a>,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum Token {
    #[regex(r"[#!][^\n]*")]
    Comment,
    #[token("\n")]
    Newline,
    #[regex("[=:]")]
    Separator,
    #[token("%")]
    Percent,
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
    #[regex(r"[A-Za-z_][A-Za-z0-9_.\-]*")]
    Word,
}

/// Split a properties source into its entries, in order.
pub(super) fn entries(source: &str) -> Result<Vec<Entry<'_>>, ConfigError> {
    let mut lex = Lexer::<Token>::new(source);
    let mut entries = Vec::new();
    let mut line = 1;
    let mut tokens: Vec<(Token, &str)> = Vec::new();

    while let Some(next) = lex.next() {
        let token = next.map_err(|()| ConfigError::Syntax {
            line,
            message: format!("unexpected `{}'", lex.slice()),
        })?;
        match token {
            Token::Comment => (),
            Token::Newline => {
                entries.extend(entry(line, &tokens)?);
                tokens.clear();
                line += 1;
            }
            token => tokens.push((token, lex.slice())),
        }
    }
    entries.extend(entry(line, &tokens)?);

    Ok(entries)
}

fn entry<'a>(line: usize, tokens: &[(Token, &'a str)]) -> Result<Option<Entry<'a>>, ConfigError> {
    use Token::*;

    let (key, value) = match *tokens {
        [] => return Ok(None),
        [(Word, key), (Separator, _), (Number, number)] => (key, Value::Number(number)),
        [(Word, key), (Separator, _), (Number, number), (Percent, _)] => (key, Value::Percent(number)),
        [(Word, key), (Separator, _), (Word, word)] => (key, Value::Word(word)),
        [(Word, key), (Separator, _)] => {
            return Err(ConfigError::Syntax {
                line,
                message: format!("missing value for `{key}'"),
            });
        }
        [(Word, key), ..] => {
            return Err(ConfigError::Syntax {
                line,
                message: format!("expecting `{key} = <value>'"),
            });
        }
        [(_, first), ..] => {
            return Err(ConfigError::Syntax {
                line,
                message: format!("expecting a key, got `{first}'"),
            });
        }
    };

    Ok(Some(Entry { line, key, value }))
}
