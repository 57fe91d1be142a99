//! Insertion-ordered string multimap used for query parameters and headers.

/// An ordered `name -> [values]` map.
///
/// Header maps compare names case-insensitively; query maps compare them exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multimap {
    entries: Vec<(String, Vec<String>)>,
    case_insensitive: bool,
}

impl Multimap {
    /// An empty map with exact name matching.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty map with ASCII case-insensitive name matching.
    #[must_use]
    pub fn case_insensitive() -> Self {
        Self {
            entries: Vec::new(),
            case_insensitive: true,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| {
            if self.case_insensitive {
                k.eq_ignore_ascii_case(name)
            } else {
                k == name
            }
        })
    }

    /// Values stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|i| self.entries[i].1.as_slice())
    }

    /// First value stored under `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Append `values` under `name`, creating the entry when missing.
    pub fn append<S: Into<String>>(&mut self, name: &str, values: impl IntoIterator<Item = S>) {
        let values = values.into_iter().map(Into::into);
        match self.position(name) {
            Some(i) => self.entries[i].1.extend(values),
            None => self.entries.push((name.to_owned(), values.collect())),
        }
    }

    /// Replace the values under `name`, keeping its position when present.
    pub fn replace<S: Into<String>>(&mut self, name: &str, values: impl IntoIterator<Item = S>) {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.position(name) {
            Some(i) => self.entries[i].1 = values,
            None => self.entries.push((name.to_owned(), values)),
        }
    }

    /// Remove `name`, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Keep only entries for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&str, &mut Vec<String>) -> bool) {
        self.entries.retain_mut(|(k, v)| f(k, v));
    }

    /// Iterate over `(name, values)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterate mutably over the value lists in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<String>)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
