//! URL building

/// Join a base address, a urn and path segments into a request URL
///
/// The uri loses its trailing `/`; the urn and each segment lose leading
/// and trailing `/`; empty parts are dropped. An absolute `http(s)://`
/// urn replaces the uri and default urn entirely.
///
/// With `trailing_slash`, the last part gets a `/` inserted before its
/// first `?` or `;` (an inline query), or appended when it has neither.
pub fn build_url(uri: &str, urn: &str, path: &[&str], trailing_slash: bool) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(path.len() + 2);
    if is_absolute(urn) {
        parts.push(urn.trim_end_matches('/').to_string());
    } else {
        parts.push(uri.trim_end_matches('/').to_string());
        parts.push(urn.trim_matches('/').to_string());
    }
    parts.extend(path.iter().map(|segment| segment.trim_matches('/').to_string()));
    parts.retain(|part| !part.is_empty());

    if trailing_slash {
        if let Some(last) = parts.last_mut() {
            add_trailing_slash(last);
        }
    }
    parts.join("/")
}

pub(crate) fn is_absolute(urn: &str) -> bool {
    urn.starts_with("http://") || urn.starts_with("https://")
}

fn add_trailing_slash(part: &mut String) {
    match part.find(['?', ';']) {
        Some(idx) => {
            if !part[..idx].ends_with('/') {
                part.insert(idx, '/');
            }
        }
        None => {
            if !part.ends_with('/') {
                part.push('/');
            }
        }
    }
}

#[cfg(test)]
mod url_tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[], true, "https://tld/urn/" ; "no segments")]
    #[test_case(&["one"], true, "https://tld/urn/one/" ; "one segment")]
    #[test_case(&["one", "/two/"], true, "https://tld/urn/one/two/" ; "slashes stripped")]
    #[test_case(&["", "one", "/"], true, "https://tld/urn/one/" ; "empty segments dropped")]
    #[test_case(&["foo?hide=me"], true, "https://tld/urn/foo/?hide=me" ; "inline query")]
    #[test_case(&["foo/?hide=me"], true, "https://tld/urn/foo/?hide=me" ; "inline query already slashed")]
    #[test_case(&["foo;v=1?x=2"], true, "https://tld/urn/foo/;v=1?x=2" ; "matrix param")]
    #[test_case(&[], false, "https://tld/urn" ; "no trailing slash")]
    #[test_case(&["one", "two"], false, "https://tld/urn/one/two" ; "segments without trailing slash")]
    fn test_build_url(path: &[&str], trailing_slash: bool, expected: &str) {
        assert_eq!(build_url("https://tld/", "/urn/", path, trailing_slash), expected);
    }

    #[test_case("https://tld/", "/urn/" ; "both slashed")]
    #[test_case("https://tld", "urn" ; "neither slashed")]
    #[test_case("https://tld", "/urn" ; "leading urn slash")]
    #[test_case("https://tld", "urn/" ; "trailing urn slash")]
    #[test_case("https://tld/", "urn" ; "trailing uri slash")]
    #[test_case("https://tld/", "/urn" ; "trailing uri and leading urn slash")]
    fn test_build_url_base_variants(uri: &str, urn: &str) {
        assert_eq!(build_url(uri, urn, &["one"], true), "https://tld/urn/one/");
        assert_eq!(build_url(uri, urn, &["one"], false), "https://tld/urn/one");
        assert_eq!(build_url(uri, urn, &[], true), "https://tld/urn/");
    }

    #[test_case("https://tld/" ; "slashed uri")]
    #[test_case("https://tld" ; "bare uri")]
    fn test_build_url_empty_urn(uri: &str) {
        assert_eq!(build_url(uri, "", &["one"], true), "https://tld/one/");
        assert_eq!(build_url(uri, "/", &[], false), "https://tld");
    }

    #[test]
    fn test_absolute_urn_replaces_base() {
        assert_eq!(
            build_url("https://tld/", "https://other.example/api/items?page=2", &[], true),
            "https://other.example/api/items/?page=2"
        );
        assert_eq!(
            build_url("https://tld", "http://other.example/x/", &["y"], false),
            "http://other.example/x/y"
        );
    }

    #[test]
    fn test_relative_cursor_urn() {
        assert_eq!(
            build_url("https://tld", "/api/v1/items?page=2", &[], true),
            "https://tld/api/v1/items/?page=2"
        );
    }

    #[test]
    fn test_empty_urn() {
        assert_eq!(build_url("https://tld/", "", &["a"], true), "https://tld/a/");
        assert!(!is_absolute("/urn"));
    }
}
