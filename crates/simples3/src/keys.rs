//! Logical-to-effective key mapping and listing-prefix selection.

/// Map a logical key to the key used against the store.
///
/// With a non-empty prefix the result is `prefix/key`; otherwise the key is
/// returned unchanged.
pub fn apply_prefix(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}/{key}"),
        _ => key.to_string(),
    }
}

/// Longest common leading substring of `keys`, compared character by
/// character with no notion of path segments.
///
/// Returns `""` for an empty slice or when the keys share no first
/// character.
pub fn common_prefix<'a>(keys: &[&'a str]) -> &'a str {
    let Some((first, rest)) = keys.split_first() else {
        return "";
    };
    let mut end = first.len();
    for key in rest {
        end = first[..end]
            .char_indices()
            .zip(key.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, c), _)| i + c.len_utf8());
        if end == 0 {
            break;
        }
    }
    &first[..end]
}

/// Prefix to list when checking `keys` for existence.
///
/// The common prefix of the logical keys, mapped through the configured
/// prefix. When the keys share nothing the configured prefix is used as is
/// (no trailing `/`), and with no configured prefix the whole bucket is
/// listed.
pub fn listing_prefix(prefix: Option<&str>, keys: &[&str]) -> String {
    let common = common_prefix(keys);
    if common.is_empty() {
        prefix.unwrap_or_default().to_string()
    } else {
        apply_prefix(prefix, common)
    }
}
