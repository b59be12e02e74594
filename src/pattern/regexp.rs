use super::parse::{escape_class, Token};
use super::{Key, Modifier};
use crate::config::RouteOptions;
use crate::error::RouteError;
use regex::{Regex, RegexBuilder};

/// Build the matcher source for `tokens`.
///
/// The `regex` crate has no look-around, so end-of-route assertions are emitted
/// as consuming groups. Only the extent of the overall match changes; every
/// capture group lands on the same text.
pub(crate) fn to_regex_source(tokens: &[Token], options: &RouteOptions) -> String {
    let delimiter = if options.delimiter.is_empty() {
        None
    } else {
        Some(format!("[{}]", escape_class(&options.delimiter)))
    };
    let ends_with = if options.ends_with.is_empty() {
        "$".to_string()
    } else {
        format!("[{}]|$", escape_class(&options.ends_with))
    };
    let esc = |text: &str| regex::escape(&options.encode_str(text));

    let mut route = String::new();
    if options.start {
        route.push('^');
    }

    for token in tokens {
        match token {
            Token::Literal(text) => route.push_str(&esc(text)),
            Token::Key(key) => push_key(&mut route, key, &esc(&key.prefix), &esc(&key.suffix)),
            Token::Group {
                prefix,
                suffix,
                modifier,
            } => {
                route.push_str(&format!("(?:{}{})", esc(prefix), esc(suffix)));
                route.push_str(modifier.symbol());
            }
        }
    }

    if options.end {
        if let (false, Some(delimiter)) = (options.strict, &delimiter) {
            route.push_str(delimiter);
            route.push('?');
        }
        if options.ends_with.is_empty() {
            route.push('$');
        } else {
            route.push_str(&format!("(?:{ends_with})"));
        }
    } else {
        let end_delimited = match tokens.last() {
            None => true,
            Some(Token::Literal(text)) => text
                .chars()
                .last()
                .is_some_and(|c| options.delimiter.contains(c)),
            Some(_) => false,
        };
        if let Some(delimiter) = &delimiter {
            if !options.strict {
                route.push_str(&format!("(?:{delimiter}(?:{ends_with}))?"));
            }
            if !end_delimited {
                route.push_str(&format!("(?:{delimiter}|{ends_with})"));
            }
        } else if !end_delimited {
            route.push_str(&format!("(?:{ends_with})"));
        }
    }

    route
}

fn push_key(route: &mut String, key: &Key, prefix: &str, suffix: &str) {
    let pattern = &key.pattern;
    let repeats = key.modifier.repeats();
    if prefix.is_empty() && suffix.is_empty() {
        if repeats {
            route.push_str(&format!("((?:{pattern}){})", key.modifier.symbol()));
        } else {
            route.push_str(&format!("({pattern}){}", key.modifier.symbol()));
        }
        return;
    }
    if repeats {
        let optional = if key.modifier == Modifier::ZeroOrMore {
            "?"
        } else {
            ""
        };
        route.push_str(&format!(
            "(?:{prefix}((?:{pattern})(?:{suffix}{prefix}(?:{pattern}))*){suffix}){optional}"
        ));
    } else {
        route.push_str(&format!(
            "(?:{prefix}({pattern}){suffix}){}",
            key.modifier.symbol()
        ));
    }
}

/// Compile `source` with the case sensitivity from `options`.
pub(crate) fn build_regex(
    pattern: &str,
    source: &str,
    options: &RouteOptions,
) -> Result<Regex, RouteError> {
    RegexBuilder::new(source)
        .case_insensitive(!options.sensitive)
        .build()
        .map_err(|err| RouteError::pattern(pattern, None, err.to_string()))
}
