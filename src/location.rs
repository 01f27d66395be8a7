//! Resolution of a form `action` against the document URL.

#[derive(Debug, Clone, PartialEq, Eq)]
struct LocationParts {
    scheme: String,
    /// `host[:port]` for hierarchical URLs, `None` for opaque ones like `about:blank`.
    authority: Option<String>,
    path: String,
    search: String,
    hash: String,
}

impl LocationParts {
    fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let scheme_end = trimmed.find(':')?;
        let scheme = trimmed[..scheme_end].to_ascii_lowercase();
        if !is_valid_url_scheme(&scheme) {
            return None;
        }
        let rest = &trimmed[scheme_end + 1..];
        if let Some(without_slashes) = rest.strip_prefix("//") {
            let authority_end = without_slashes
                .find(|ch| ['/', '?', '#'].contains(&ch))
                .unwrap_or(without_slashes.len());
            let (path, search, hash) = split_path_search_hash(&without_slashes[authority_end..]);
            Some(Self {
                scheme,
                authority: Some(without_slashes[..authority_end].to_string()),
                path: normalize_pathname(&path),
                search,
                hash,
            })
        } else {
            let (path, search, hash) = split_path_search_hash(rest);
            Some(Self {
                scheme,
                authority: None,
                path,
                search,
                hash,
            })
        }
    }

    fn href(&self) -> String {
        match &self.authority {
            Some(authority) => format!(
                "{}://{}{}{}{}",
                self.scheme, authority, self.path, self.search, self.hash
            ),
            None => format!("{}:{}{}{}", self.scheme, self.path, self.search, self.hash),
        }
    }
}

fn is_valid_url_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

fn split_path_search_hash(tail: &str) -> (String, String, String) {
    let (rest, hash) = match tail.find('#') {
        Some(pos) => (&tail[..pos], &tail[pos..]),
        None => (tail, ""),
    };
    let (path, search) = match rest.find('?') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };
    (path.to_string(), search.to_string(), hash.to_string())
}

fn normalize_pathname(pathname: &str) -> String {
    let ends_with_slash = pathname.ends_with('/') && pathname.len() > 1;
    let mut parts = Vec::new();
    for segment in pathname.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(segment),
        }
    }
    let mut out = format!("/{}", parts.join("/"));
    if ends_with_slash && !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Resolves `input` the way a browser resolves a form `action`. An empty action
/// targets the document itself; relative input against an opaque base is kept as-is.
pub(crate) fn resolve_url(base: &str, input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return base.to_string();
    }
    if let Some(parts) = LocationParts::parse(input) {
        return parts.href();
    }
    let Some(mut next) = LocationParts::parse(base) else {
        return input.to_string();
    };
    if next.authority.is_none() {
        return input.to_string();
    }

    if input.starts_with("//") {
        return LocationParts::parse(&format!("{}:{input}", next.scheme))
            .map(|parts| parts.href())
            .unwrap_or_else(|| input.to_string());
    }
    if input.starts_with('#') {
        next.hash = input.to_string();
        return next.href();
    }

    let (relative, search, hash) = split_path_search_hash(input);
    if input.starts_with('?') {
        next.search = search;
        next.hash = hash;
        return next.href();
    }

    next.path = if relative.starts_with('/') {
        normalize_pathname(&relative)
    } else {
        let base_dir = next
            .path
            .rsplit_once('/')
            .map(|(prefix, _)| format!("{prefix}/"))
            .unwrap_or_else(|| "/".to_string());
        normalize_pathname(&format!("{base_dir}{relative}"))
    };
    next.search = search;
    next.hash = hash;
    next.href()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_action_replaces_last_segment() {
        assert_eq!(
            resolve_url("https://shelter.test/adopt/form.html?step=1", "confirmation.html"),
            "https://shelter.test/adopt/confirmation.html"
        );
        assert_eq!(
            resolve_url("https://shelter.test/adopt/form.html", "../thanks.html#top"),
            "https://shelter.test/thanks.html#top"
        );
    }

    #[test]
    fn rooted_and_absolute_actions() {
        assert_eq!(
            resolve_url("https://shelter.test/adopt/form.html", "/submit"),
            "https://shelter.test/submit"
        );
        assert_eq!(
            resolve_url("https://shelter.test/a", "http://other.test/x?y=1"),
            "http://other.test/x?y=1"
        );
        assert_eq!(
            resolve_url("https://shelter.test/a", "//cdn.test/b"),
            "https://cdn.test/b"
        );
    }

    #[test]
    fn empty_action_targets_document() {
        assert_eq!(
            resolve_url("https://shelter.test/form.html", "  "),
            "https://shelter.test/form.html"
        );
    }

    #[test]
    fn opaque_base_keeps_relative_input() {
        assert_eq!(resolve_url("about:blank", "confirmation.html"), "confirmation.html");
    }
}
