//! Column resolution by header pattern.
//!
//! Upstream exports rename and re-encode their headers between versions, so
//! fields are looked up through an ordered list of acceptable spellings
//! instead of a fixed header name. A missing column is not an error: it
//! resolves to an empty string.

/// One raw table row: header/value pairs in file column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.fields.push((header.into(), value.into()));
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }

    /// Resolve `patterns` against this row's headers. See [`resolve`].
    pub fn resolve(&self, patterns: &[&str]) -> &str {
        self.value_at(self.position(patterns))
    }

    /// Column index `patterns` selects, if any.
    pub fn position(&self, patterns: &[&str]) -> Option<usize> {
        resolve_index(self.headers(), patterns)
    }

    /// Like [`RawRow::resolve`], but the column at `taken` is invisible.
    /// Used when a broad pattern such as `Address` must not land on a column
    /// another field already owns (`Email Address`).
    pub fn resolve_excluding(&self, patterns: &[&str], taken: Option<usize>) -> &str {
        let headers = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, (h, _))| if Some(i) == taken { "" } else { h.as_str() });
        self.value_at(resolve_index(headers, patterns))
    }

    /// Value of the column at `index`, or `""` when there is none.
    pub fn value_at(&self, index: Option<usize>) -> &str {
        index
            .and_then(|i| self.fields.get(i))
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }
}

/// Find the header a list of patterns selects.
///
/// 1. An exact header match, trying patterns in order.
/// 2. Otherwise a case-insensitive substring match, trying patterns in
///    order and, for each pattern, headers in column order.
///
/// Empty patterns never match.
pub fn resolve_index<'a, I>(headers: I, patterns: &[&str]) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let headers: Vec<&str> = headers.into_iter().collect();

    for pattern in patterns.iter().filter(|p| !p.is_empty()) {
        if let Some(i) = headers.iter().position(|h| h == pattern) {
            return Some(i);
        }
    }

    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    for pattern in patterns.iter().filter(|p| !p.is_empty()) {
        let needle = pattern.to_lowercase();
        if let Some(i) = lowered.iter().position(|h| h.contains(&needle)) {
            return Some(i);
        }
    }

    None
}

/// Value of the first column `patterns` selects in `row`, or `""`.
pub fn resolve<'a>(row: &'a RawRow, patterns: &[&str]) -> &'a str {
    row.resolve(patterns)
}
