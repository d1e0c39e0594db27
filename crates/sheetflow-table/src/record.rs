//! Header-keyed rows

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Table contents, row 0 being the header
pub type Grid = Vec<Vec<String>>;

/// One row as header name → value, in insertion order
///
/// Insertion order matters: it decides the header layout synthesized for an
/// empty table and the order in which missing columns are added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    /// Create empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With field set
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set field, keeping its original position if already present
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Field value
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether the field is present
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no fields are set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record whose values are the keys themselves (a header-row record)
    #[must_use]
    pub fn header<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|n| {
                let n = n.into();
                (n.clone(), n)
            })
            .collect()
    }

    /// Build a record from a header row and a data row
    ///
    /// Short rows (trailing cells trimmed by the service) yield empty values.
    #[must_use]
    pub fn from_row(headers: &[String], row: &[String]) -> Self {
        headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect()
    }

    /// Values aligned to `headers`, empty string for absent fields
    #[must_use]
    pub fn align(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|h| self.get(h).unwrap_or_default().to_string())
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Record {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Cell at `col`, empty when the row was trimmed short
#[inline]
#[must_use]
pub fn cell(row: &[String], col: usize) -> &str {
    row.get(col).map_or("", String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn keeps_insertion_order() {
        let record = Record::new().with("Name", "A").with("Team", "X").with("Age", "3");
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Name", "Team", "Age"]);
    }

    #[test]
    fn align_fills_missing_with_empty() {
        let record = Record::new().with("Team", "X");
        let headers = strings(&["Name", "Team", "Role"]);
        assert_eq!(record.align(&headers), strings(&["", "X", ""]));
    }

    #[test]
    fn from_short_row() {
        let headers = strings(&["Name", "Team", "Role"]);
        let record = Record::from_row(&headers, &strings(&["A"]));
        assert_eq!(record.get("Name"), Some("A"));
        assert_eq!(record.get("Role"), Some(""));
    }

    #[test]
    fn header_record_maps_names_to_themselves() {
        let record = Record::header(["Team", "QuestionText"]);
        assert_eq!(record.get("QuestionText"), Some("QuestionText"));
    }

    #[test]
    fn serializes_as_object() {
        let record = Record::new().with("b", "1").with("a", "2");
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"b":"1","a":"2"}"#);
    }
}
