//! Route registration and fuzzy lookup.

use std::{fmt, future::Future, ops::Deref, sync::Arc};

use futures::FutureExt;

use crate::base::types::Void;

use super::{BoxedHandler, Request};

// Types.

/// Identifies a route within the router that registered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(usize);

impl RouteId {
    /// The registration index of the route.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A registered command route.
#[derive(Clone)]
pub struct Route {
    pub id: RouteId,
    /// The command word the route answers to.
    pub pattern: String,
    /// One-line summary shown in the route listing.
    pub description: String,
    /// Longer usage text, shown when help is requested for this route.
    pub help: String,
    pub handler: BoxedHandler,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("description", &self.description)
            .field("help", &self.help)
            .finish_non_exhaustive()
    }
}

// Builder.

/// Collects routes during startup.
///
/// Once [`RouterBuilder::build`] is called the routes are frozen, so a [`Router`]
/// can be shared across concurrent dispatches without locking.
pub struct RouterBuilder {
    routes: Vec<Route>,
    default: Option<RouteId>,
    prefix: String,
}

impl RouterBuilder {
    /// Creates an empty builder; `prefix` is the textual command prefix (empty disables it).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            routes: Vec::new(),
            default: None,
            prefix: prefix.into(),
        }
    }

    /// Appends a route.
    ///
    /// Empty and duplicate patterns are accepted; on ties the first registered route wins.
    pub fn register<F, Fut>(&mut self, pattern: impl Into<String>, description: impl Into<String>, handler: F) -> RouteId
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Void> + Send + 'static,
    {
        let id = RouteId(self.routes.len());

        self.routes.push(Route {
            id,
            pattern: pattern.into(),
            description: description.into(),
            help: String::new(),
            handler: Arc::new(move |request| handler(request).boxed()),
        });

        id
    }

    /// Attaches usage text to a registered route.
    pub fn with_help(&mut self, id: RouteId, help: impl Into<String>) -> &mut Self {
        if let Some(route) = self.routes.get_mut(id.0) {
            route.help = help.into();
        }

        self
    }

    /// Designates the route invoked for addressed messages that match nothing.
    pub fn set_default(&mut self, id: RouteId) -> &mut Self {
        self.default = Some(id);
        self
    }

    /// Freezes the registered routes.
    pub fn build(self) -> Router {
        Router {
            inner: Arc::new(RouterInner {
                routes: self.routes,
                default: self.default,
                prefix: self.prefix,
            }),
        }
    }
}

// Router.

/// The immutable route table.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Deref for Router {
    type Target = RouterInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Inner state of the router.
pub struct RouterInner {
    routes: Vec<Route>,
    default: Option<RouteId>,
    prefix: String,
}

impl RouterInner {
    /// All routes, in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Looks up a route by ID.
    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    /// The fallback route, if one was designated.
    pub fn default_route(&self) -> Option<&Route> {
        self.default.and_then(|id| self.route(id))
    }

    /// The configured command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Finds the route best matching the words of `text`.
    ///
    /// An exact pattern match on any word wins immediately, and the returned fields start at
    /// that word. Otherwise the route whose pattern starts with the longest word is chosen
    /// (earliest registered on equal length), and the returned fields are the slice starting
    /// at the last word scanned. Text without words yields `(None, None)`.
    pub fn fuzzy_match(&self, text: &str) -> (Option<&Route>, Option<Vec<String>>) {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.is_empty() {
            return (None, None);
        }

        let mut candidate = None;
        let mut rank = 0;

        for (index, field) in fields.iter().enumerate() {
            for route in &self.routes {
                if route.pattern == *field {
                    return (Some(route), Some(to_owned(&fields[index..])));
                }

                if route.pattern.starts_with(field) && field.len() > rank {
                    candidate = Some(route);
                    rank = field.len();
                }
            }
        }

        (candidate, Some(to_owned(&fields[fields.len() - 1..])))
    }
}

fn to_owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn router(patterns: &[&str]) -> Router {
        let mut builder = RouterBuilder::new("!");

        for pattern in patterns {
            builder.register(*pattern, format!("{pattern} command"), |_| async { Ok(()) });
        }

        builder.build()
    }

    fn pattern_of(matched: Option<&Route>) -> Option<&str> {
        matched.map(|r| r.pattern.as_str())
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut builder = RouterBuilder::new("");
        let first = builder.register("help", "Shows help", |_| async { Ok(()) });
        let second = builder.register("help", "Duplicate", |_| async { Ok(()) });

        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);

        let router = builder.build();
        assert_eq!(router.routes().len(), 2);
        assert_eq!(router.route(second).unwrap().description, "Duplicate");
    }

    #[test]
    fn test_with_help_and_default() {
        let mut builder = RouterBuilder::new("?");
        let id = builder.register("ping", "Replies with pong", |_| async { Ok(()) });
        builder.with_help(id, "Usage: ping").set_default(id);

        let router = builder.build();

        assert_eq!(router.route(id).unwrap().help, "Usage: ping");
        assert_eq!(router.default_route().unwrap().id, id);
        assert_eq!(router.prefix(), "?");
    }

    #[test]
    fn test_no_default_by_default() {
        assert!(router(&["help"]).default_route().is_none());
    }

    #[test]
    fn test_fuzzy_match_empty_text() {
        let router = router(&["help"]);

        let (route, fields) = router.fuzzy_match("");
        assert!(route.is_none());
        assert!(fields.is_none());

        let (route, fields) = router.fuzzy_match("   \t\n ");
        assert!(route.is_none());
        assert!(fields.is_none());
    }

    #[test]
    fn test_fuzzy_match_prefix_prefers_first_registered() {
        let router = router(&["help", "hello"]);

        let (route, fields) = router.fuzzy_match("he");

        assert_eq!(pattern_of(route), Some("help"));
        assert_eq!(fields, Some(vec!["he".to_string()]));
    }

    #[test]
    fn test_fuzzy_match_exact_includes_matching_field() {
        let router = router(&["help"]);

        let (route, fields) = router.fuzzy_match("help now");

        assert_eq!(pattern_of(route), Some("help"));
        assert_eq!(fields, Some(vec!["help".to_string(), "now".to_string()]));
    }

    #[test]
    fn test_fuzzy_match_exact_on_later_field() {
        let router = router(&["deploy"]);

        let (route, fields) = router.fuzzy_match("please deploy staging");

        assert_eq!(pattern_of(route), Some("deploy"));
        assert_eq!(fields, Some(vec!["deploy".to_string(), "staging".to_string()]));
    }

    #[test]
    fn test_fuzzy_match_exact_beats_longer_prefix() {
        let router = router(&["hello", "h"]);

        let (route, _) = router.fuzzy_match("hell h");

        assert_eq!(pattern_of(route), Some("h"));
    }

    #[test]
    fn test_fuzzy_match_longer_prefix_wins_across_fields() {
        let router = router(&["status", "stats"]);

        let (route, _) = router.fuzzy_match("st stat statu");

        assert_eq!(pattern_of(route), Some("status"));
    }

    #[test]
    fn test_fuzzy_match_equal_length_keeps_first_candidate() {
        let router = router(&["alpha", "beta"]);

        let (route, _) = router.fuzzy_match("al be");

        assert_eq!(pattern_of(route), Some("alpha"));
    }

    #[test]
    fn test_fuzzy_match_no_match_fields_anchor_at_last_word() {
        // The fields of a non-exact result start at the last word, not at the candidate's word.
        let router = router(&["help"]);

        let (route, fields) = router.fuzzy_match("what is this");
        assert!(route.is_none());
        assert_eq!(fields, Some(vec!["this".to_string()]));

        let (route, fields) = router.fuzzy_match("he please");
        assert_eq!(pattern_of(route), Some("help"));
        assert_eq!(fields, Some(vec!["please".to_string()]));
    }

    #[test]
    fn test_fuzzy_match_empty_pattern_never_matches() {
        // No word is a prefix of an empty pattern, and no word equals it either.
        let router = router(&[""]);

        let (route, _) = router.fuzzy_match("anything");

        assert!(route.is_none());
    }

    #[test]
    fn test_fuzzy_match_without_routes() {
        let router = router(&[]);

        let (route, fields) = router.fuzzy_match("help");

        assert!(route.is_none());
        assert_eq!(fields, Some(vec!["help".to_string()]));
    }
}
