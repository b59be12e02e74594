use super::channel::{BaseSource, RouteChannel, RouteInput};
use crate::config::{ConfigStore, Overrides, RouteOptions};
use crate::dispatcher::{DispatchEvent, Dispatcher, ErrorPolicy};
use crate::error::RouteError;
use crate::location::{default_url_parser, UrlParser};
use crate::matcher::match_or_skip;
use crate::normalize::{decode_uri, strip_base, strip_hash};
use crate::pattern::{CompiledPattern, PathBuilder, PathParams, PathToRegexp, PatternCompiler};
use crate::pipeline::{Pipeline, Step};
use crate::stream::Stream;
use regex::Regex;
use std::sync::Arc;
use tracing::info;

/// Routing context: configuration, dispatcher and the pluggable collaborators.
///
/// Cloning is cheap and every clone shares the same store and dispatcher.
#[derive(Debug, Clone)]
pub struct Router {
    store: Arc<ConfigStore>,
    dispatcher: Dispatcher,
    compiler: Arc<dyn PatternCompiler>,
    url_parser: Arc<dyn UrlParser>,
}

/// Builder for a [`Router`] with non-default collaborators.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    defaults: RouteOptions,
    compiler: Option<Arc<dyn PatternCompiler>>,
    url_parser: Option<Arc<dyn UrlParser>>,
}

impl RouterBuilder {
    #[must_use]
    pub fn defaults(mut self, defaults: RouteOptions) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn compiler(mut self, compiler: Arc<dyn PatternCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    #[must_use]
    pub fn url_parser(mut self, parser: Arc<dyn UrlParser>) -> Self {
        self.url_parser = Some(parser);
        self
    }

    #[must_use]
    pub fn build(self) -> Router {
        let store = Arc::new(ConfigStore::new(self.defaults));
        Router {
            dispatcher: Dispatcher::new(Arc::clone(&store)),
            store,
            compiler: self
                .compiler
                .unwrap_or_else(|| Arc::new(PathToRegexp) as Arc<dyn PatternCompiler>),
            url_parser: self.url_parser.unwrap_or_else(default_url_parser),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn with_options(defaults: RouteOptions) -> Self {
        Self::builder().defaults(defaults).build()
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    #[must_use]
    pub fn defaults(&self) -> Arc<RouteOptions> {
        self.store.defaults()
    }

    /// Update the shared defaults (recognised keys only).
    pub fn configure(&self, overrides: &Overrides) -> Result<Arc<RouteOptions>, RouteError> {
        self.store.configure(overrides)
    }

    pub fn merge_options(&self, overrides: &Overrides) -> Result<RouteOptions, RouteError> {
        self.store.merge_options(overrides)
    }

    /// Push a location into the dispatcher.
    pub fn push(&self, event: impl Into<DispatchEvent>) -> Result<(), RouteError> {
        self.dispatcher.push(event)
    }

    /// Create a route channel with the current defaults.
    pub fn route(&self, pattern: &str) -> Result<RouteChannel, RouteError> {
        self.route_with(pattern, &Overrides::new())
    }

    /// Create a route channel with per-route option overrides.
    ///
    /// A malformed pattern is returned here, before anything is registered.
    pub fn route_with(
        &self,
        pattern: &str,
        overrides: &Overrides,
    ) -> Result<RouteChannel, RouteError> {
        let options = self.store.merge_options(overrides)?;
        let compiled = self.compiler.compile(pattern, &options)?;
        Ok(self.attach(compiled, &options, overrides))
    }

    /// Create a route channel from a prebuilt regex. Captures are positional.
    pub fn route_regex(
        &self,
        regex: Regex,
        overrides: &Overrides,
    ) -> Result<RouteChannel, RouteError> {
        let options = self.store.merge_options(overrides)?;
        Ok(self.attach(CompiledPattern::from_regex(regex), &options, overrides))
    }

    /// Reverse-compile `pattern` with the defaults overlaid by `overrides`.
    pub fn compile_reverse(
        &self,
        pattern: &str,
        overrides: &Overrides,
    ) -> Result<PathBuilder, RouteError> {
        let options = self.store.merge_options(overrides)?;
        self.compiler.compile_reverse(pattern, &options)
    }

    /// Build a concrete path for `pattern` in one step.
    pub fn to_path(&self, pattern: &str, params: &PathParams) -> Result<String, RouteError> {
        self.compile_reverse(pattern, &Overrides::new())?
            .build(params)
    }

    fn pipeline(
        &self,
        pattern: &Arc<CompiledPattern>,
        options: &RouteOptions,
        base: &BaseSource,
    ) -> Pipeline {
        let mut pipeline = Pipeline::new();
        if options.decode_uri {
            pipeline = pipeline.stage("decode-uri", |path| {
                Ok(Step::Continue(decode_uri(&path)?.into_owned()))
            });
        }

        let base = base.clone();
        pipeline = pipeline.map("strip-base", move |path| {
            strip_base(&path, &base.current()).into_owned()
        });

        if options.hash {
            pipeline = pipeline.map("strip-hash", |path| strip_hash(&path).to_string());
        }

        let gate = Arc::clone(pattern);
        pipeline.stage("match", move |path| Ok(match_or_skip(path, &gate)))
    }

    fn attach(
        &self,
        compiled: CompiledPattern,
        options: &RouteOptions,
        overrides: &Overrides,
    ) -> RouteChannel {
        let pattern = Arc::new(compiled);
        let base = if overrides.contains("base") {
            BaseSource::Fixed(Arc::from(options.base.as_str()))
        } else {
            BaseSource::Live(Arc::clone(&self.store))
        };
        let silent = overrides
            .contains("silentErrors")
            .then_some(options.silent_errors);

        let output = Stream::new();
        let input = RouteInput {
            pipeline: self.pipeline(&pattern, options, &base),
            pattern: Arc::clone(&pattern),
            base,
            policy: ErrorPolicy::with_override(Arc::clone(&self.store), silent),
            url_parser: Arc::clone(&self.url_parser),
            output: output.clone(),
        };
        let forward_id = self
            .dispatcher
            .forward(move |path: &String| input.handle(path));

        info!(
            route_pattern = %pattern.source(),
            keys = pattern.keys().len(),
            routes_count = self.dispatcher.forwarding_count(),
            "Route channel created"
        );

        RouteChannel::new(pattern, output, self.dispatcher.clone(), forward_id)
    }
}
