use super::{UrlParser, UrlRecord};
use crate::error::RouteError;
use crate::normalize::decode_component;
use crate::pattern::{CompiledPattern, ParamValue, PathParams};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::Arc;

/// Name-keyed parameters in capture order.
///
/// Most routes have a handful of keys, so the pairs live on the stack. Key names
/// are shared with the route's compiled keys instead of being reallocated per
/// event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedParams(SmallVec<[(Arc<str>, Option<String>); 8]>);

impl NamedParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Arc<str>, value: Option<String>) {
        self.0.push((name, value));
    }

    /// Value for `name`; a later capture with the same name wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(key, _)| key.as_ref() == name)
            .and_then(|(_, value)| value.as_deref())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key.as_ref() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_ref(), value.as_deref()))
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

impl Serialize for NamedParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key.as_ref(), value)?;
        }
        map.end()
    }
}

/// Parameters extracted from one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RouteParams {
    /// Raw captures in order, for patterns without keys
    Positional(Vec<Option<String>>),
    /// Component-decoded captures keyed by name
    Named(NamedParams),
}

impl RouteParams {
    /// Look up a parameter by name. Positional params accept the index as text.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            RouteParams::Named(named) => named.get(name),
            RouteParams::Positional(values) => name
                .parse::<usize>()
                .ok()
                .and_then(|idx| values.get(idx))
                .and_then(|value| value.as_deref()),
        }
    }

    /// Look up a positional capture.
    #[must_use]
    pub fn index(&self, idx: usize) -> Option<&str> {
        self.get(&idx.to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            RouteParams::Named(named) => named.len(),
            RouteParams::Positional(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Present params become path params, so a match can be turned back into a path.
impl From<&RouteParams> for PathParams {
    fn from(params: &RouteParams) -> Self {
        match params {
            RouteParams::Named(named) => named
                .iter()
                .filter_map(|(name, value)| value.map(|v| (name.to_string(), ParamValue::from(v))))
                .collect(),
            RouteParams::Positional(values) => values
                .iter()
                .enumerate()
                .filter_map(|(idx, value)| {
                    value
                        .as_deref()
                        .map(|v| (idx.to_string(), ParamValue::from(v)))
                })
                .collect(),
        }
    }
}

/// What a route channel emits for every matching event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRoute {
    #[serde(flatten)]
    pub url: UrlRecord,
    pub params: RouteParams,
}

impl ParsedRoute {
    #[must_use]
    pub fn pathname(&self) -> &str {
        &self.url.pathname
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.url.search
    }

    #[must_use]
    pub fn hash(&self) -> &str {
        &self.url.hash
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}

/// Run `pattern` against `path` and build the emitted result.
///
/// The URL record comes from `parser`, resolving against `base`. Keyed captures
/// are component-decoded; captures of a keyless pattern are passed through raw.
/// The record's `search` is never decoded here.
pub fn to_url(
    path: &str,
    pattern: &CompiledPattern,
    base: &str,
    parser: &dyn UrlParser,
) -> Result<ParsedRoute, RouteError> {
    let captures = pattern
        .captures(path)
        .ok_or_else(|| RouteError::CaptureMismatch {
            pattern: pattern.source().to_string(),
            path: path.to_string(),
        })?;

    let keys = pattern.keys();
    let params = if keys.is_empty() {
        RouteParams::Positional(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        )
    } else {
        let mut named = NamedParams::new();
        for (idx, key) in keys.iter().enumerate() {
            let value = match captures.get(idx + 1) {
                Some(m) => Some(decode_component(m.as_str())?.into_owned()),
                None => None,
            };
            named.insert(Arc::from(key.name.to_string()), value);
        }
        RouteParams::Named(named)
    };

    let url = parser.parse(path, base)?;
    Ok(ParsedRoute { url, params })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteOptions;
    use crate::location::LegacyUrlParser;
    use crate::pattern::{PathToRegexp, PatternCompiler};
    use regex::Regex;

    fn compile(pattern: &str) -> CompiledPattern {
        PathToRegexp
            .compile(pattern, &RouteOptions::default())
            .unwrap()
    }

    #[test]
    fn test_named_params() {
        let result = to_url("foo/bar", &compile(":foo/:bar"), "", &LegacyUrlParser).unwrap();
        assert_eq!(result.param("foo"), Some("foo"));
        assert_eq!(result.param("bar"), Some("bar"));
        assert_eq!(result.pathname(), "foo/bar");
        assert_eq!(
            serde_json::to_value(&result.params).unwrap(),
            serde_json::json!({"foo": "foo", "bar": "bar"})
        );
    }

    #[test]
    fn test_parsed_route_serializes_flat() {
        let result = to_url("/users/7?tab=1", &compile(r"/users/:id\?(.*)"), "", &LegacyUrlParser)
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["pathname"], "/users/7");
        assert_eq!(json["search"], "?tab=1");
        assert_eq!(json["params"]["id"], "7");
        assert!(json.get("url").is_none());

        let positional = CompiledPattern::from_regex(Regex::new(r"^/files/(.+)$").unwrap());
        let result = to_url("/files/a", &positional, "", &LegacyUrlParser).unwrap();
        assert_eq!(
            serde_json::to_value(&result.params).unwrap(),
            serde_json::json!(["a"])
        );
    }

    #[test]
    fn test_query_is_not_decoded() {
        let pattern = compile(r":foo/:bar\?(.*)");
        let result = to_url("foo/ba%20r?x=test&y=%C3%A9", &pattern, "", &LegacyUrlParser).unwrap();
        assert_eq!(result.param("foo"), Some("foo"));
        assert_eq!(result.param("bar"), Some("ba r"));
        assert_eq!(result.search(), "?x=test&y=%C3%A9");
        assert_eq!(result.param("0"), Some("x=test&y=é"));
    }

    #[test]
    fn test_encoded_separator_stays_in_segment() {
        let result = to_url("/a%2Fb", &compile("/:slug"), "", &LegacyUrlParser).unwrap();
        assert_eq!(result.param("slug"), Some("a/b"));
        assert_eq!(result.pathname(), "/a%2Fb");
    }

    #[test]
    fn test_optional_param_is_none() {
        let pattern = compile("/users/:id?");
        let result = to_url("/users", &pattern, "", &LegacyUrlParser).unwrap();
        let RouteParams::Named(named) = &result.params else {
            panic!("expected named params");
        };
        assert!(named.contains("id"));
        assert_eq!(named.get("id"), None);
        assert_eq!(
            serde_json::to_value(&result.params).unwrap(),
            serde_json::json!({"id": null})
        );
    }

    #[test]
    fn test_positional_params_stay_raw() {
        let pattern = CompiledPattern::from_regex(Regex::new(r"^/files/([^/]+)/(.+)$").unwrap());
        let result = to_url("/files/a%20b/c", &pattern, "", &LegacyUrlParser).unwrap();
        assert_eq!(
            result.params,
            RouteParams::Positional(vec![Some("a%20b".into()), Some("c".into())])
        );
        assert_eq!(result.params.index(0), Some("a%20b"));
    }

    #[test]
    fn test_capture_mismatch() {
        let err = to_url("/posts/1", &compile("/users/:id"), "", &LegacyUrlParser).unwrap_err();
        assert!(matches!(err, RouteError::CaptureMismatch { .. }));
    }

    #[test]
    fn test_malformed_segment_is_decode_error() {
        let err = to_url("/%E0%A4%A", &compile("/:slug"), "", &LegacyUrlParser).unwrap_err();
        assert!(matches!(err, RouteError::Decode { .. }));
    }

    #[test]
    fn test_params_convert_back_to_path_params() {
        let result = to_url("/users/7", &compile("/users/:id"), "", &LegacyUrlParser).unwrap();
        let params = PathParams::from(&result.params);
        assert_eq!(params.get("id"), Some(&ParamValue::from("7")));
    }
}
