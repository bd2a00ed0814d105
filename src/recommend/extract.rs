use regex::Regex;
use std::sync::OnceLock;

static NUMBERED_ITEM: OnceLock<Regex> = OnceLock::new();

fn numbered_item() -> &'static Regex {
    NUMBERED_ITEM.get_or_init(|| Regex::new(r"^\d+\.\s*(?:\*\*)?([^*\n]+)(?:\*\*)?").unwrap())
}

/// Pull the entries of a numbered list (`1. Title`, `2. **Title**`) out of
/// free-form model output, in order. Lines that are not list entries are
/// skipped.
pub fn extract_items(text: &str) -> Vec<String> {
    let re = numbered_item();

    text.split('\n')
        .filter_map(|line| re.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}
