//! Identifier case handling for columns: field names (snake_case or CamelCase) -> storage names and labels.

/// Split an identifier into words on underscores and camel-case boundaries.
/// e.g. "ZenOfScreaming" -> ["Zen", "Of", "Screaming"], "user_id" -> ["user", "id"],
/// "HTTPServer" -> ["HTTP", "Server"], "UserID" -> ["User", "ID"]
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map(|n| n.is_lowercase()).unwrap_or(false);
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert an identifier to snake_case (storage/DB column name).
/// e.g. "ZenOfScreaming" -> "zen_of_screaming", "createdAt" -> "created_at"
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Human label for a field: words split on camel-case boundaries, first letter of each word uppercased.
/// e.g. "ZenOfScreaming" -> "Zen Of Screaming", "created_at" -> "Created At"
pub fn to_label(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_splits_camel_case() {
        assert_eq!(to_label("ZenOfScreaming"), "Zen Of Screaming");
        assert_eq!(to_label("created_at"), "Created At");
        assert_eq!(to_label("UserID"), "User ID");
        assert_eq!(to_label("id"), "Id");
    }

    #[test]
    fn snake_case_from_mixed_identifiers() {
        assert_eq!(to_snake_case("ZenOfScreaming"), "zen_of_screaming");
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("Page2Title"), "page2_title");
    }
}
