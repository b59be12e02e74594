use super::{UrlParser, UrlRecord};
use crate::error::RouteError;

/// Lenient parser that accepts relative paths without a base.
///
/// Splits `input` into `protocol`, authority, `pathname`, `search` and `hash`
/// without normalising or re-encoding anything. A non-empty base is only used
/// when it is itself an absolute URL and `input` has no scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyUrlParser;

/// Standards parser backed by the `url` crate.
///
/// Mirrors `new URL(input, base)`: absolute input ignores the base, relative
/// input needs an absolute base.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatwgUrlParser;

/// Byte index of the `:` ending a URL scheme, if `input` starts with one.
fn scheme_end(input: &str) -> Option<usize> {
    let colon = input.find(':')?;
    let scheme = &input[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(colon)
}

fn split_at_char(input: &str, marker: char) -> (&str, String) {
    match input.find(marker) {
        Some(idx) => (&input[..idx], input[idx..].to_string()),
        None => (input, String::new()),
    }
}

/// Split `user@host:port` into (hostname, port).
fn split_authority(authority: &str) -> (String, Option<u16>) {
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    if host_port.starts_with('[') {
        if let Some(close) = host_port.find(']') {
            let hostname = host_port[..=close].to_ascii_lowercase();
            let port = host_port[close + 1..]
                .strip_prefix(':')
                .and_then(|p| p.parse().ok());
            return (hostname, port);
        }
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (host.to_ascii_lowercase(), port.parse().ok())
        }
        _ => (host_port.to_ascii_lowercase(), None),
    }
}

impl LegacyUrlParser {
    fn split(input: &str) -> UrlRecord {
        let (rest, hash) = split_at_char(input, '#');
        let (rest, search) = split_at_char(rest, '?');

        let (protocol, rest) = match scheme_end(rest) {
            Some(colon) => (Some(rest[..=colon].to_ascii_lowercase()), &rest[colon + 1..]),
            None => (None, rest),
        };

        let (authority, path) = match (protocol.is_some(), rest.strip_prefix("//")) {
            (true, Some(after)) => {
                let end = after.find('/').unwrap_or(after.len());
                (Some(&after[..end]), &after[end..])
            }
            _ => (None, rest),
        };

        let (host, hostname, port) = match authority {
            Some(authority) if !authority.is_empty() => {
                let (hostname, port) = split_authority(authority);
                let host = match port {
                    Some(port) => format!("{hostname}:{port}"),
                    None => hostname.clone(),
                };
                (Some(host), Some(hostname), port)
            }
            _ => (None, None, None),
        };

        let pathname = if path.is_empty() && authority.is_some() {
            "/".to_string()
        } else {
            path.to_string()
        };

        UrlRecord {
            protocol,
            host,
            hostname,
            port,
            pathname,
            search,
            hash,
            href: input.to_string(),
        }
    }
}

impl UrlParser for LegacyUrlParser {
    fn parse(&self, input: &str, base: &str) -> Result<UrlRecord, RouteError> {
        if !base.is_empty() && scheme_end(input).is_none() && ::url::Url::parse(base).is_ok() {
            return WhatwgUrlParser.parse(input, base);
        }
        Ok(Self::split(input))
    }
}

fn record_from(parsed: &::url::Url) -> UrlRecord {
    let hostname = parsed.host_str().map(str::to_string);
    let host = hostname.as_ref().map(|h| match parsed.port() {
        Some(port) => format!("{h}:{port}"),
        None => h.clone(),
    });
    UrlRecord {
        protocol: Some(format!("{}:", parsed.scheme())),
        host,
        hostname,
        port: parsed.port(),
        pathname: parsed.path().to_string(),
        search: parsed
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| format!("?{q}"))
            .unwrap_or_default(),
        hash: parsed
            .fragment()
            .filter(|f| !f.is_empty())
            .map(|f| format!("#{f}"))
            .unwrap_or_default(),
        href: parsed.as_str().to_string(),
    }
}

impl UrlParser for WhatwgUrlParser {
    fn parse(&self, input: &str, base: &str) -> Result<UrlRecord, RouteError> {
        let to_error = |err: ::url::ParseError| RouteError::Url {
            input: input.to_string(),
            message: err.to_string(),
        };
        let parsed = match ::url::Url::parse(input) {
            Ok(parsed) => parsed,
            Err(::url::ParseError::RelativeUrlWithoutBase) if !base.is_empty() => {
                ::url::Url::parse(base)
                    .and_then(|base| base.join(input))
                    .map_err(to_error)?
            }
            Err(err) => return Err(to_error(err)),
        };
        Ok(record_from(&parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_relative_path() {
        let record = LegacyUrlParser.parse("foo/bar", "").unwrap();
        assert_eq!(record.pathname, "foo/bar");
        assert_eq!(record.hostname, None);
        assert_eq!(record.protocol, None);
        assert_eq!(record.search, "");
        assert_eq!(record.href, "foo/bar");
    }

    #[test]
    fn test_legacy_hash_only() {
        let record = LegacyUrlParser.parse("#foo/bar", "").unwrap();
        assert_eq!(record.hash, "#foo/bar");
        assert_eq!(record.pathname, "");
    }

    #[test]
    fn test_legacy_keeps_query_encoded() {
        let record = LegacyUrlParser
            .parse("foo/ba%20r?x=test&y=%C3%A9", "")
            .unwrap();
        assert_eq!(record.pathname, "foo/ba%20r");
        assert_eq!(record.search, "?x=test&y=%C3%A9");
    }

    #[test]
    fn test_legacy_absolute() {
        let record = LegacyUrlParser
            .parse("HTTPS://user@Example.com:8080/a/b?q=1#top", "")
            .unwrap();
        assert_eq!(record.protocol.as_deref(), Some("https:"));
        assert_eq!(record.hostname.as_deref(), Some("example.com"));
        assert_eq!(record.port, Some(8080));
        assert_eq!(record.host.as_deref(), Some("example.com:8080"));
        assert_eq!(record.pathname, "/a/b");
        assert_eq!(record.search, "?q=1");
        assert_eq!(record.hash, "#top");

        let bare = LegacyUrlParser.parse("http://example.com", "").unwrap();
        assert_eq!(bare.pathname, "/");
    }

    #[test]
    fn test_legacy_resolves_against_absolute_base() {
        let record = LegacyUrlParser
            .parse("users/1", "http://example.com/app/")
            .unwrap();
        assert_eq!(record.pathname, "/app/users/1");
        assert_eq!(record.hostname.as_deref(), Some("example.com"));

        // non-URL base is only a prefix, not a resolution base
        let record = LegacyUrlParser.parse("users/1", "/app").unwrap();
        assert_eq!(record.pathname, "users/1");
    }

    #[test]
    fn test_whatwg_parses_absolute() {
        let record = WhatwgUrlParser
            .parse("https://example.com/a?x=%C3%A9#frag", "")
            .unwrap();
        assert_eq!(record.protocol.as_deref(), Some("https:"));
        assert_eq!(record.pathname, "/a");
        assert_eq!(record.search, "?x=%C3%A9");
        assert_eq!(record.hash, "#frag");
    }

    #[test]
    fn test_whatwg_requires_base_for_relative() {
        assert!(matches!(
            WhatwgUrlParser.parse("foo/bar", ""),
            Err(RouteError::Url { .. })
        ));
        let record = WhatwgUrlParser
            .parse("foo/bar", "https://example.com/")
            .unwrap();
        assert_eq!(record.pathname, "/foo/bar");
    }
}
