use crate::error::RouteError;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::env;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Segment encoder applied by the pattern compiler to literal text and by the
/// reverse compiler to parameter values.
#[derive(Clone)]
pub struct EncodeFn(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl EncodeFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn call(&self, value: &str) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for EncodeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncodeFn(..)")
    }
}

/// Effective options for one route.
///
/// Serialized keys are camelCase (`silentErrors`, `endsWith`, `decodeUri`) so a
/// JSON object of overrides can be merged key by key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOptions {
    /// Prefix removed from every incoming path before matching. Also the
    /// resolution base handed to the URL parser.
    #[serde(deserialize_with = "null_as_default")]
    pub base: String,
    /// Swallow subscriber and construction errors instead of returning them from `push`
    pub silent_errors: bool,
    /// Case sensitive matching
    pub sensitive: bool,
    /// Disallow the optional trailing delimiter
    pub strict: bool,
    /// Anchor the matcher at the start of the path
    pub start: bool,
    /// Anchor the matcher at the end of the path
    pub end: bool,
    /// Characters that terminate a default parameter segment
    pub delimiter: String,
    /// Extra characters treated as end of path
    #[serde(deserialize_with = "null_as_default")]
    pub ends_with: String,
    /// Characters automatically treated as a parameter prefix
    pub prefixes: String,
    /// Strip one leading `#` before matching (hash routing)
    pub hash: bool,
    /// Apply `decodeURI` to the whole path before anything else
    pub decode_uri: bool,
    /// Optional segment encoder
    #[serde(skip)]
    pub encode: Option<EncodeFn>,
    /// Keys this crate does not recognise, kept for forward compatibility
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            base: String::new(),
            silent_errors: false,
            sensitive: false,
            strict: false,
            start: true,
            end: true,
            delimiter: "/#?".to_string(),
            ends_with: String::new(),
            prefixes: "./".to_string(),
            hash: false,
            decode_uri: false,
            encode: None,
            extra: Map::new(),
        }
    }
}

impl RouteOptions {
    /// Load defaults, then apply `PATHSTREAM_BASE` and `PATHSTREAM_SILENT_ERRORS`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(base) = env::var("PATHSTREAM_BASE") {
            options.base = base;
        }
        if let Ok(val) = env::var("PATHSTREAM_SILENT_ERRORS") {
            options.silent_errors = matches!(
                val.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        options
    }

    /// Overlay every key of `overrides`, recognised or not.
    ///
    /// Unknown keys end up in [`RouteOptions::extra`].
    pub fn merged(&self, overrides: &Overrides) -> Result<RouteOptions, RouteError> {
        let mut map = self.to_map()?;
        for (key, value) in overrides.iter() {
            map.insert(key.clone(), value.clone());
        }
        let mut merged: RouteOptions = serde_json::from_value(Value::Object(map))?;
        merged.encode = overrides
            .encoder()
            .cloned()
            .or_else(|| self.encode.clone());
        Ok(merged)
    }

    /// Overlay only the keys `self` already has.
    fn configured(&self, overrides: &Overrides) -> Result<RouteOptions, RouteError> {
        let mut map = self.to_map()?;
        for (key, value) in overrides.iter() {
            if map.contains_key(key) {
                map.insert(key.clone(), value.clone());
            } else {
                debug!(key = %key, "Ignoring unknown configuration key");
            }
        }
        let mut updated: RouteOptions = serde_json::from_value(Value::Object(map))?;
        updated.encode = overrides
            .encoder()
            .cloned()
            .or_else(|| self.encode.clone());
        Ok(updated)
    }

    /// Serialize to a JSON object (recognised keys plus `extra`).
    pub fn to_map(&self) -> Result<Map<String, Value>, RouteError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(RouteError::Config {
                message: format!("options serialized to {other}, expected an object"),
            }),
        }
    }

    /// Run `value` through the configured encoder, if any.
    #[must_use]
    pub fn encode_str<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match &self.encode {
            Some(encode) => Cow::Owned(encode.call(value)),
            None => Cow::Borrowed(value),
        }
    }
}

/// Partial options used for per-route merges and for [`ConfigStore::configure`].
///
/// ```rust
/// use pathstream::config::Overrides;
///
/// let overrides = Overrides::new().base("/app").sensitive(true).set("validate", false);
/// assert!(overrides.contains("base"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    values: Map<String, Value>,
    encode: Option<EncodeFn>,
}

impl Overrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set any key, recognised or not.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn base(self, base: impl Into<String>) -> Self {
        self.set("base", base.into())
    }

    #[must_use]
    pub fn silent_errors(self, silent: bool) -> Self {
        self.set("silentErrors", silent)
    }

    #[must_use]
    pub fn sensitive(self, sensitive: bool) -> Self {
        self.set("sensitive", sensitive)
    }

    #[must_use]
    pub fn strict(self, strict: bool) -> Self {
        self.set("strict", strict)
    }

    #[must_use]
    pub fn start(self, start: bool) -> Self {
        self.set("start", start)
    }

    #[must_use]
    pub fn end(self, end: bool) -> Self {
        self.set("end", end)
    }

    #[must_use]
    pub fn delimiter(self, delimiter: impl Into<String>) -> Self {
        self.set("delimiter", delimiter.into())
    }

    #[must_use]
    pub fn ends_with(self, ends_with: impl Into<String>) -> Self {
        self.set("endsWith", ends_with.into())
    }

    #[must_use]
    pub fn prefixes(self, prefixes: impl Into<String>) -> Self {
        self.set("prefixes", prefixes.into())
    }

    #[must_use]
    pub fn hash(self, hash: bool) -> Self {
        self.set("hash", hash)
    }

    #[must_use]
    pub fn decode_uri(self, decode: bool) -> Self {
        self.set("decodeUri", decode)
    }

    #[must_use]
    pub fn encode<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.encode = Some(EncodeFn::new(f));
        self
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key) || (key == "encode" && self.encode.is_some())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn encoder(&self) -> Option<&EncodeFn> {
        self.encode.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.encode.is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl From<Map<String, Value>> for Overrides {
    fn from(values: Map<String, Value>) -> Self {
        Self {
            values,
            encode: None,
        }
    }
}

impl TryFrom<Value> for Overrides {
    type Error = RouteError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(values) => Ok(values.into()),
            Value::Null => Ok(Self::default()),
            other => Err(RouteError::Config {
                message: format!("overrides must be a JSON object, got {other}"),
            }),
        }
    }
}

/// Process-wide route defaults.
///
/// Reads are lock-free `Arc` snapshots; writers are serialised so two
/// concurrent `configure` calls cannot lose each other's keys.
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<RouteOptions>,
    write_lock: Mutex<()>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(RouteOptions::default())
    }
}

impl ConfigStore {
    #[must_use]
    pub fn new(defaults: RouteOptions) -> Self {
        Self {
            current: ArcSwap::from_pointee(defaults),
            write_lock: Mutex::new(()),
        }
    }

    /// Current defaults snapshot.
    #[must_use]
    pub fn defaults(&self) -> Arc<RouteOptions> {
        self.current.load_full()
    }

    /// Defaults overlaid with `overrides`. Does not touch the store.
    pub fn merge_options(&self, overrides: &Overrides) -> Result<RouteOptions, RouteError> {
        self.current.load().merged(overrides)
    }

    /// Update the defaults for allow-listed keys and return the new snapshot.
    pub fn configure(&self, overrides: &Overrides) -> Result<Arc<RouteOptions>, RouteError> {
        let _guard = self.write_lock.lock();
        let updated = Arc::new(self.current.load().configured(overrides)?);
        self.current.store(Arc::clone(&updated));
        info!(
            base = %updated.base,
            silent_errors = updated.silent_errors,
            "Route defaults updated"
        );
        Ok(updated)
    }

    /// Live base prefix.
    #[must_use]
    pub fn base(&self) -> String {
        self.current.load().base.clone()
    }

    /// Live error policy.
    #[must_use]
    pub fn silent_errors(&self) -> bool {
        self.current.load().silent_errors
    }
}
