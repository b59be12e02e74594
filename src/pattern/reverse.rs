use super::parse::Token;
use super::KeyName;
use crate::config::{EncodeFn, RouteOptions};
use crate::error::RouteError;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeMap;

/// A value substituted into a pattern by [`PathBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    /// For `*` and `+` parameters
    Repeated(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Single(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl<T: Into<String>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::Repeated(values.into_iter().map(Into::into).collect())
    }
}

/// Parameters for reverse compilation, keyed by name (or positional index as text).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathParams(BTreeMap<String, ParamValue>);

impl PathParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Reverse of a compiled pattern: turns parameters back into a path.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    source: String,
    tokens: Vec<Token>,
    validators: Vec<Option<Regex>>,
    encode: Option<EncodeFn>,
}

impl PathBuilder {
    pub(crate) fn new(
        source: &str,
        tokens: Vec<Token>,
        options: &RouteOptions,
    ) -> Result<Self, RouteError> {
        let validators = tokens
            .iter()
            .map(|token| match token {
                Token::Key(key) => RegexBuilder::new(&format!("^(?:{})$", key.pattern))
                    .case_insensitive(!options.sensitive)
                    .build()
                    .map(Some)
                    .map_err(|err| RouteError::pattern(source, None, err.to_string())),
                _ => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: source.to_string(),
            tokens,
            validators,
            encode: options.encode.clone(),
        })
    }

    /// Pattern this builder was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    fn encode(&self, value: &str) -> String {
        match &self.encode {
            Some(encode) => encode.call(value),
            None => value.to_string(),
        }
    }

    fn checked(&self, name: &KeyName, idx: usize, value: &str) -> Result<String, RouteError> {
        let segment = self.encode(value);
        if let Some(validator) = &self.validators[idx] {
            if !validator.is_match(&segment) {
                let pattern = validator.as_str();
                let inner = &pattern[4..pattern.len() - 2];
                return Err(RouteError::param(
                    name,
                    format!("expected to match \"{inner}\", got \"{segment}\""),
                ));
            }
        }
        Ok(segment)
    }

    /// Build a concrete path.
    ///
    /// Missing required parameters, arrays passed to non-repeating parameters and
    /// values that fail their sub-pattern are all reported as [`RouteError::Param`].
    pub fn build(&self, params: &PathParams) -> Result<String, RouteError> {
        let mut path = String::new();

        for (idx, token) in self.tokens.iter().enumerate() {
            let key = match token {
                Token::Literal(text) => {
                    path.push_str(text);
                    continue;
                }
                Token::Group {
                    prefix,
                    suffix,
                    modifier,
                } => {
                    if !modifier.optional() {
                        path.push_str(prefix);
                        path.push_str(suffix);
                    }
                    continue;
                }
                Token::Key(key) => key,
            };

            let name = key.name.to_string();
            match params.get(&name) {
                Some(ParamValue::Repeated(values)) => {
                    if !key.modifier.repeats() {
                        return Err(RouteError::param(
                            &name,
                            "expected a single value, got an array",
                        ));
                    }
                    if values.is_empty() {
                        if key.modifier.optional() {
                            continue;
                        }
                        return Err(RouteError::param(&name, "expected a non-empty array"));
                    }
                    for value in values {
                        let segment = self.checked(&key.name, idx, value)?;
                        path.push_str(&key.prefix);
                        path.push_str(&segment);
                        path.push_str(&key.suffix);
                    }
                }
                Some(ParamValue::Single(value)) => {
                    let segment = self.checked(&key.name, idx, value)?;
                    path.push_str(&key.prefix);
                    path.push_str(&segment);
                    path.push_str(&key.suffix);
                }
                None if key.modifier.optional() => {}
                None => {
                    let expected = if key.modifier.repeats() {
                        "an array"
                    } else {
                        "a string"
                    };
                    return Err(RouteError::param(
                        &name,
                        format!("missing value, expected {expected}"),
                    ));
                }
            }
        }

        Ok(path)
    }
}
