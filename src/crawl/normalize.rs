// src/crawl/normalize.rs
// =============================================================================
// This module turns the raw hrefs of a page into crawlable URLs.
//
// Rules, applied to every raw link:
// - Links that do not parse are dropped
// - Absolute links (own scheme, or scheme-relative "//host") are kept only
//   if their host is exactly the page's host. The scheme may differ.
// - Relative links take the page's scheme and host and keep their own path
//   as written (no merging with the page's directory)
// - Query string and fragment are always removed
// - The scheme is lowercased; bytes a URL path may not carry as-is
//   (non-ASCII, space, quotes, angle brackets) are percent-encoded, so
//   "/café" and "/caf%C3%A9" are the same link
// - The result is a set: exact duplicates collapse, nothing else does
//   ("https://x.com" and "https://x.com/" are two different links)
//
// Why not just use url::Url for all of it?
// - Url serializes "https://x.com" as "https://x.com/", lowercases hosts
//   and drops default ports. Any of those would merge links we must keep
//   apart. We split the raw string ourselves and only ask `url` whether
//   the link is valid.
// =============================================================================

use std::borrow::Cow;
use std::collections::BTreeSet;

use tracing::{debug, error, trace};
use url::Url;

// The pieces of a URL reference we care about, borrowed from the raw string.
// Query and fragment are already cut off.
#[derive(Debug, PartialEq, Eq)]
struct UrlRef<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
}

impl<'a> UrlRef<'a> {
    // Splits a raw link into scheme, authority and path
    //
    // Returns None for strings that are not URL references at all:
    // control characters, an empty scheme (":foo"), or a colon in the
    // first segment of a relative reference ("1a:b").
    fn split(raw: &'a str) -> Option<Self> {
        if raw.chars().any(|c| c.is_control()) {
            return None;
        }

        let end = raw.find(['?', '#']).unwrap_or(raw.len());
        let rest = &raw[..end];

        let (scheme, rest) = match rest.find([':', '/']) {
            Some(i) if rest[i..].starts_with(':') => {
                let scheme = &rest[..i];
                if !is_scheme(scheme) {
                    return None;
                }
                (Some(scheme), &rest[i + 1..])
            }
            _ => (None, rest),
        };

        let (authority, path) = match rest.strip_prefix("//") {
            Some(after) => {
                let i = after.find('/').unwrap_or(after.len());
                (Some(&after[..i]), &after[i..])
            }
            None => (None, rest),
        };

        Some(Self {
            scheme,
            authority,
            path,
        })
    }

    // The host part of the authority: userinfo removed, port kept
    fn host(&self) -> &'a str {
        self.authority.map(host_of).unwrap_or("")
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// Bytes `url` would escape in a path. Controls never get this far, and
// '?' / '#' are already cut off.
fn needs_escape(b: u8) -> bool {
    !b.is_ascii() || matches!(b, b' ' | b'"' | b'<' | b'>' | b'`' | b'{' | b'}')
}

// Percent-encodes a raw path the way `url` serializes one
fn encode_path(path: &str) -> Cow<'_, str> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    if !path.bytes().any(needs_escape) {
        return Cow::Borrowed(path);
    }

    let mut encoded = String::with_capacity(path.len() * 3);
    for b in path.bytes() {
        if needs_escape(b) {
            encoded.push('%');
            encoded.push(HEX[usize::from(b >> 4)] as char);
            encoded.push(HEX[usize::from(b & 0x0f)] as char);
        } else {
            encoded.push(char::from(b));
        }
    }
    Cow::Owned(encoded)
}

fn host_of(authority: &str) -> &str {
    authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host)
}

// The page a set of links was found on
struct PageBase<'a> {
    url: Url,
    scheme: String,
    host: &'a str,
}

impl<'a> PageBase<'a> {
    fn parse(page_url: &'a str) -> Option<Self> {
        let url = Url::parse(page_url).ok()?;
        let parts = UrlRef::split(page_url)?;
        let scheme = parts.scheme?.to_ascii_lowercase();
        let host = parts.host();
        if host.is_empty() {
            return None;
        }
        Some(Self { url, scheme, host })
    }

    // Resolves one raw link against this page, or None if it is dropped
    fn resolve(&self, raw: &str) -> Option<String> {
        let Some(link) = UrlRef::split(raw).filter(|link| self.is_valid(link, raw)) else {
            debug!(link = raw, "Invalid page link");
            return None;
        };

        let path = encode_path(link.path);

        if link.authority.is_none() && link.scheme.is_none() {
            let separator = if path.is_empty() || path.starts_with('/') {
                ""
            } else {
                "/"
            };
            return Some(format!(
                "{}://{}{}{}",
                self.scheme, self.host, separator, path
            ));
        }

        if link.host() != self.host {
            trace!(link = raw, host = self.host, "Link leaves the crawled host");
            return None;
        }

        let scheme = link
            .scheme
            .map_or_else(|| self.scheme.clone(), str::to_ascii_lowercase);
        Some(format!(
            "{}://{}{}",
            scheme,
            link.authority.unwrap_or_default(),
            path
        ))
    }

    fn is_valid(&self, link: &UrlRef<'_>, raw: &str) -> bool {
        match link.scheme {
            Some(_) => Url::parse(raw).is_ok(),
            None => self.url.join(raw).is_ok(),
        }
    }
}

/// Filters and canonicalizes the raw links found on `page_url`.
///
/// Returns the same-host, absolute, query- and fragment-free links as a
/// sorted set. If `page_url` itself cannot be parsed, the raw links are
/// returned as they are: without a host there is nothing to filter against.
pub fn normalize_links(page_url: &str, raw_links: &[String]) -> BTreeSet<String> {
    let Some(base) = PageBase::parse(page_url) else {
        error!(page = page_url, "Page has an invalid URL, links left unfiltered");
        return raw_links.iter().cloned().collect();
    };

    raw_links
        .iter()
        .filter_map(|raw| base.resolve(raw))
        .collect()
}
