//! Building blocks of the navigation state: entries, paths and history
//!
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One row of the directory listing.
///
/// `items_cnt` is only set on the descriptor the listing uses for the
/// directory being viewed; its presence marks "the current directory itself".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub items_cnt: Option<usize>,
    pub mode: Option<u32>,
    pub owner: Option<String>,
    pub group: Option<String>,
}

impl Entry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// descriptor of the directory currently being viewed
    pub fn current_dir(name: impl Into<String>, items_cnt: usize) -> Self {
        Self {
            name: name.into(),
            items_cnt: Some(items_cnt),
            ..Default::default()
        }
    }

    pub fn is_current_dir(&self) -> bool {
        self.items_cnt.is_some()
    }
}

/// Entries marked in the current directory
pub type Selection = Vec<Entry>;

/// The directory being viewed, as segments.
///
/// An absolute path keeps an empty first segment, so `["", "home"]` joins to
/// `/home`. There is always at least one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirPath {
    segments: Vec<String>,
}

impl Default for DirPath {
    fn default() -> Self {
        Self::root()
    }
}

impl DirPath {
    pub fn root() -> Self {
        Self {
            segments: vec![String::new()],
        }
    }

    pub fn from_segments<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            Self::root()
        } else {
            Self { segments }
        }
    }

    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Self::root();
        }
        Self::from_segments(trimmed.split('/'))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn join(&self) -> String {
        self.segments.join("/")
    }

    /// `join() + "/" + name`
    pub fn child(&self, name: &str) -> String {
        format!("{}/{}", self.join(), name)
    }

    pub fn parent(&self) -> Self {
        if self.segments.len() <= 1 {
            return self.clone();
        }
        Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    pub fn last(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// percent-encoded join, the form navigation requests carry
    pub fn encoded(&self) -> String {
        utf8_percent_encode(&self.join(), COMPONENT).to_string()
    }
}

impl fmt::Display for DirPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

/// Back/forward stack of visited items.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    /// points at the entry being shown
    index: usize,
}

impl<T: Clone> History<T> {
    pub fn new(first: T) -> Self {
        Self {
            entries: vec![first],
            index: 0,
        }
    }

    /// drops any forward entries, then pushes
    pub fn visit(&mut self, item: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(item);
        self.index = self.entries.len() - 1;
    }

    /// Drops the last entry and steps the index back by one.
    /// The first entry is never removed.
    pub fn shrink(&mut self) {
        if self.entries.len() > 1 {
            self.entries.pop();
        }
        self.index = self.index.saturating_sub(1).min(self.entries.len() - 1);
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_and_join_absolute() {
        let path = DirPath::parse("/home/bob/");
        assert_eq!(path.segments(), ["", "home", "bob"]);
        assert_eq!(path.join(), "/home/bob");
        assert_eq!(path.child("a.txt"), "/home/bob/a.txt");
        assert_eq!(path.parent().join(), "/home");
    }

    #[test]
    fn test_root_never_empties() {
        let root = DirPath::parse("/");
        assert_eq!(root.segments().len(), 1);
        assert_eq!(root.parent(), root);
        assert_eq!(root.child("etc"), "/etc");
        assert_eq!(DirPath::from_segments(Vec::<String>::new()), DirPath::root());
    }

    #[test]
    fn test_encoded_escapes_slash_and_space() {
        let path = DirPath::parse("/srv/my dir");
        assert_eq!(path.encoded(), "%2Fsrv%2Fmy%20dir");
    }

    #[test]
    fn test_encoded_keeps_marks_and_escapes_utf8() {
        let path = DirPath::parse("/srv/it's(1)~*!/café");
        assert_eq!(path.encoded(), "%2Fsrv%2Fit's(1)~*!%2Fcaf%C3%A9");
    }

    #[test]
    fn test_history_visit_after_shrink_replaces_tail() {
        let mut history = History::new("a");
        history.visit("b");
        history.visit("c");
        history.shrink();
        history.visit("d");
        assert_eq!(history.entries, ["a", "b", "d"]);
        assert_eq!(history.index(), 2);
    }

    #[test]
    fn test_history_shrink_keeps_index_valid() {
        let mut history = History::new(1);
        history.visit(2);
        history.visit(3);
        history.shrink();
        assert_eq!((history.len(), history.index()), (2, 1));
        history.shrink();
        history.shrink();
        assert_eq!((history.len(), history.index()), (1, 0));
        assert_eq!(history.entries, [1]);
    }
}
