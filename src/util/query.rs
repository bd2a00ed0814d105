use std::collections::HashMap;

/// Query parameters parsed from a raw `a=1&b=2` string.
#[derive(Debug, Default)]
pub struct QueryParams {
    map: HashMap<String, String>,
}

impl QueryParams {
    /// Pairs without a `=` are skipped. When a key occurs more than once
    /// the last value wins. A component that is not valid percent-encoding
    /// is kept as-is.
    pub fn parse(raw: &str) -> Self {
        let mut map = HashMap::new();

        for pair in raw.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                map.insert(unescape(key), unescape(value));
            }
        }

        QueryParams { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|x| x.as_str())
    }
}

fn unescape(s: &str) -> String {
    match urlencoding::decode(s) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_string(),
    }
}
