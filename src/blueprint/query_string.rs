//! Flat key/value argument lists -> URL query strings.

use url::form_urlencoded;

/// Encode a flat `[k1, v1, k2, v2, ...]` list as a query string.
/// Pairs are consumed two at a time; an odd trailing key is dropped; repeated keys are kept in order.
///
/// ```
/// use architect_admin::blueprint::encode_pairs;
///
/// assert_eq!(encode_pairs(&["a", "1", "c", "d"]), "a=1&c=d");
/// assert_eq!(encode_pairs(&["a", "1", "a", "2", "dangling"]), "a=1&a=2");
/// ```
pub fn encode_pairs<S: AsRef<str>>(args: &[S]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for pair in args.chunks_exact(2) {
        serializer.append_pair(pair[0].as_ref(), pair[1].as_ref());
    }
    serializer.finish()
}

/// Encode already-paired arguments. Same rules as [`encode_pairs`] minus the odd-length case.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}

/// Flatten pairs into the `[k1, v1, ...]` form accepted by resolution.
pub fn flatten_pairs(pairs: &[(String, String)]) -> Vec<String> {
    pairs
        .iter()
        .flat_map(|(k, v)| [k.clone(), v.clone()])
        .collect()
}

/// Parse a raw query string (or form body) into ordered pairs. Never fails: invalid
/// percent-escapes decode lossily.
pub fn parse_pairs(raw: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(raw)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Append an encoded query to a path, if non-empty.
pub(crate) fn with_query(mut path: String, query: &str) -> String {
    if !query.is_empty() {
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str(query);
    }
    path
}
