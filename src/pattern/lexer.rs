use crate::error::RouteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexKind {
    Open,
    Close,
    Pattern,
    Name,
    Char,
    EscapedChar,
    Modifier,
    End,
}

impl LexKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            LexKind::Open => "OPEN",
            LexKind::Close => "CLOSE",
            LexKind::Pattern => "PATTERN",
            LexKind::Name => "NAME",
            LexKind::Char => "CHAR",
            LexKind::EscapedChar => "ESCAPED_CHAR",
            LexKind::Modifier => "MODIFIER",
            LexKind::End => "END",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lexeme {
    pub kind: LexKind,
    pub index: usize,
    pub value: String,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split a route pattern into lexemes. Indexes are char offsets.
///
/// A `:` not followed by a name character is kept as a literal so absolute
/// patterns such as `http://host/:id` tokenize without escaping.
pub(crate) fn lex(source: &str) -> Result<Vec<Lexeme>, RouteError> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = Vec::with_capacity(chars.len() + 1);
    let mut i = 0;

    let push = |out: &mut Vec<Lexeme>, kind, index, value: String| {
        out.push(Lexeme { kind, index, value });
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' | '+' | '?' => {
                push(&mut out, LexKind::Modifier, i, c.to_string());
                i += 1;
            }
            '\\' => {
                let Some(&next) = chars.get(i + 1) else {
                    return Err(RouteError::pattern(source, Some(i), "trailing escape character"));
                };
                push(&mut out, LexKind::EscapedChar, i, next.to_string());
                i += 2;
            }
            '{' => {
                push(&mut out, LexKind::Open, i, c.to_string());
                i += 1;
            }
            '}' => {
                push(&mut out, LexKind::Close, i, c.to_string());
                i += 1;
            }
            ':' => {
                let name: String = chars[i + 1..]
                    .iter()
                    .take_while(|&&ch| is_name_char(ch))
                    .collect();
                if name.is_empty() {
                    push(&mut out, LexKind::Char, i, c.to_string());
                    i += 1;
                } else {
                    let len = name.chars().count();
                    push(&mut out, LexKind::Name, i, name);
                    i += 1 + len;
                }
            }
            '(' => {
                let (pattern, next) = lex_group(source, &chars, i)?;
                push(&mut out, LexKind::Pattern, i, pattern);
                i = next;
            }
            _ => {
                push(&mut out, LexKind::Char, i, c.to_string());
                i += 1;
            }
        }
    }

    push(&mut out, LexKind::End, i, String::new());
    Ok(out)
}

/// Read a `( ... )` sub-pattern starting at `start`. Returns the inner text and
/// the index after the closing paren.
fn lex_group(source: &str, chars: &[char], start: usize) -> Result<(String, usize), RouteError> {
    let mut depth = 1usize;
    let mut pattern = String::new();
    let mut j = start + 1;

    if chars.get(j) == Some(&'?') {
        return Err(RouteError::pattern(
            source,
            Some(j),
            "pattern cannot start with \"?\"",
        ));
    }

    while j < chars.len() {
        let ch = chars[j];
        if ch == '\\' {
            pattern.push(ch);
            if let Some(&escaped) = chars.get(j + 1) {
                pattern.push(escaped);
            }
            j += 2;
            continue;
        }
        if ch == ')' {
            depth -= 1;
            if depth == 0 {
                j += 1;
                break;
            }
        } else if ch == '(' {
            depth += 1;
            if chars.get(j + 1) != Some(&'?') {
                return Err(RouteError::pattern(
                    source,
                    Some(j),
                    "capturing groups are not allowed",
                ));
            }
        }
        pattern.push(ch);
        j += 1;
    }

    if depth != 0 {
        return Err(RouteError::pattern(source, Some(start), "unbalanced pattern"));
    }
    if pattern.is_empty() {
        return Err(RouteError::pattern(source, Some(start), "missing pattern"));
    }
    Ok((pattern, j))
}
