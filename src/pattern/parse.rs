use super::lexer::{lex, LexKind, Lexeme};
use super::{Key, KeyName, Modifier};
use crate::config::RouteOptions;
use crate::error::RouteError;

/// One element of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// Literal text, unescaped.
    Literal(String),
    /// A capture.
    Key(Key),
    /// A `{...}` group with no capture, e.g. `{/static}?`.
    Group {
        prefix: String,
        suffix: String,
        modifier: Modifier,
    },
}

/// Escape `chars` for use inside a regex character class.
pub(crate) fn escape_class(chars: &str) -> String {
    chars.chars().map(|c| regex::escape(&c.to_string())).collect()
}

/// Sub-pattern used by parameters that do not declare one.
pub(crate) fn default_pattern(delimiter: &str) -> String {
    if delimiter.is_empty() {
        ".+?".to_string()
    } else {
        format!("[^{}]+?", escape_class(delimiter))
    }
}

struct Cursor<'a> {
    source: &'a str,
    lexemes: &'a [Lexeme],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn done(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    fn try_consume(&mut self, kind: LexKind) -> Option<String> {
        match self.lexemes.get(self.pos) {
            Some(lexeme) if lexeme.kind == kind => {
                self.pos += 1;
                Some(lexeme.value.clone())
            }
            _ => None,
        }
    }

    fn must_consume(&mut self, kind: LexKind) -> Result<String, RouteError> {
        if let Some(value) = self.try_consume(kind) {
            return Ok(value);
        }
        let (found, index) = self
            .lexemes
            .get(self.pos)
            .map(|l| (l.kind.label(), l.index))
            .unwrap_or(("END", self.source.chars().count()));
        Err(RouteError::pattern(
            self.source,
            Some(index),
            format!("unexpected {found}, expected {}", kind.label()),
        ))
    }

    fn consume_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(value) = self
            .try_consume(LexKind::Char)
            .or_else(|| self.try_consume(LexKind::EscapedChar))
        {
            text.push_str(&value);
        }
        text
    }

    fn modifier(&mut self) -> Modifier {
        self.try_consume(LexKind::Modifier)
            .map(|m| Modifier::from_symbol(&m))
            .unwrap_or(Modifier::None)
    }
}

fn flush(path: &mut String, tokens: &mut Vec<Token>) {
    if !path.is_empty() {
        tokens.push(Token::Literal(std::mem::take(path)));
    }
}

/// Parse a pattern string into literal and key tokens.
pub(crate) fn parse(source: &str, options: &RouteOptions) -> Result<Vec<Token>, RouteError> {
    let lexemes = lex(source)?;
    let default_pattern = default_pattern(&options.delimiter);
    let mut cursor = Cursor {
        source,
        lexemes: &lexemes,
        pos: 0,
    };
    let mut tokens = Vec::new();
    let mut next_index = 0usize;
    let mut path = String::new();

    while !cursor.done() {
        let ch = cursor.try_consume(LexKind::Char);
        let name = cursor.try_consume(LexKind::Name);
        let pattern = cursor.try_consume(LexKind::Pattern);

        if name.is_some() || pattern.is_some() {
            let mut prefix = ch.unwrap_or_default();
            if !prefix.is_empty() && !options.prefixes.contains(prefix.as_str()) {
                path.push_str(&prefix);
                prefix.clear();
            }
            flush(&mut path, &mut tokens);

            let name = match name {
                Some(name) => KeyName::Named(name),
                None => {
                    next_index += 1;
                    KeyName::Index(next_index - 1)
                }
            };
            tokens.push(Token::Key(Key {
                name,
                prefix,
                suffix: String::new(),
                pattern: pattern.unwrap_or_else(|| default_pattern.clone()),
                modifier: cursor.modifier(),
            }));
            continue;
        }

        if let Some(value) = ch.or_else(|| cursor.try_consume(LexKind::EscapedChar)) {
            path.push_str(&value);
            continue;
        }

        flush(&mut path, &mut tokens);

        if cursor.try_consume(LexKind::Open).is_some() {
            let prefix = cursor.consume_text();
            let name = cursor.try_consume(LexKind::Name);
            let pattern = cursor.try_consume(LexKind::Pattern);
            let suffix = cursor.consume_text();
            cursor.must_consume(LexKind::Close)?;
            let modifier = cursor.modifier();

            let token = match (name, pattern) {
                (Some(name), pattern) => Token::Key(Key {
                    name: KeyName::Named(name),
                    prefix,
                    suffix,
                    pattern: pattern.unwrap_or_else(|| default_pattern.clone()),
                    modifier,
                }),
                (None, Some(pattern)) => {
                    next_index += 1;
                    Token::Key(Key {
                        name: KeyName::Index(next_index - 1),
                        prefix,
                        suffix,
                        pattern,
                        modifier,
                    })
                }
                (None, None) => Token::Group {
                    prefix,
                    suffix,
                    modifier,
                },
            };
            tokens.push(token);
            continue;
        }

        cursor.must_consume(LexKind::End)?;
    }

    Ok(tokens)
}
