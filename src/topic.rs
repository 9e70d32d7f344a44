//! MQTT topic filter matching
//!
//! Pure functions implementing the standard hierarchical matching rules:
//! `/`-delimited levels, `+` matches exactly one level, `#` as the final
//! level matches that level and everything below it. No locking, no state;
//! safe to call from any context.

/// Check that a filter is structurally valid.
///
/// `#` must be alone in its level and must be the final level; `+` must be
/// alone in its level. Partial-level wildcards like `a+` or `a/#b` are
/// rejected. The empty string is not a valid filter.
pub fn valid_filter(filter: &str) -> bool {
    if filter.is_empty() {
        return false;
    }

    let levels: Vec<&str> = filter.split('/').collect();
    let last = levels.len() - 1;

    for (i, level) in levels.iter().enumerate() {
        if level.contains('#') && (*level != "#" || i != last) {
            return false;
        }
        if level.contains('+') && *level != "+" {
            return false;
        }
    }
    true
}

/// Evaluate whether `topic` satisfies the subscription `filter`.
///
/// Follows broker semantics: `a/#` also matches its parent level `a`, empty
/// levels participate as ordinary levels, and topics beginning with `$`
/// (broker-reserved, e.g. `$SYS`) never match filters whose first level is
/// a wildcard. Invalid filters match nothing.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    if !valid_filter(filter) {
        return false;
    }

    // Reserved-topic convention: "$SYS/..." is invisible to "#" and "+/...".
    if topic.starts_with('$') && (filter.starts_with('#') || filter.starts_with('+')) {
        return false;
    }

    let filter_levels: Vec<&str> = filter.split('/').collect();
    let topic_levels: Vec<&str> = topic.split('/').collect();

    let mut i = 0;
    loop {
        match (filter_levels.get(i), topic_levels.get(i)) {
            // valid_filter guarantees '#' is the final level, so it swallows
            // the rest of the topic, including the case where the topic ends
            // exactly at the parent level.
            (Some(&"#"), _) => return true,
            (Some(&"+"), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
        i += 1;
    }
}
