use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::model::component::{DirPath, History, Selection};

/// Path, selection and history of the client view.
///
/// Handlers only write to it once their command has settled.
#[derive(Debug, Clone)]
pub struct NavState {
    pub path: DirPath,
    pub selection: Selection,
    pub history: History<DirPath>,
}

pub type SharedNav = Arc<Mutex<NavState>>;

impl NavState {
    pub fn new(path: DirPath) -> Self {
        Self {
            history: History::new(path.clone()),
            path,
            selection: Selection::new(),
        }
    }

    pub fn shared(self) -> SharedNav {
        Arc::new(Mutex::new(self))
    }

    /// Pushes onto history and clears the selection.
    pub fn go(&mut self, path: DirPath) {
        self.history.visit(path.clone());
        self.path = path;
        self.selection.clear();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The viewed directory went away or moved; forget its history entry.
    pub fn drop_current(&mut self) {
        self.history.shrink();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::model::component::Entry;

    #[test]
    fn test_go_pushes_and_clears_selection() {
        let mut nav = NavState::new(DirPath::parse("/home"));
        nav.selection.push(Entry::named("a"));
        nav.go(DirPath::parse("/home/bob"));
        assert_eq!(nav.path.join(), "/home/bob");
        assert!(nav.selection.is_empty());
        assert_eq!((nav.history.len(), nav.history.index()), (2, 1));
    }

    #[test]
    fn test_drop_current_steps_back() {
        let mut nav = NavState::new(DirPath::parse("/home"));
        nav.go(DirPath::parse("/home/bob"));
        nav.drop_current();
        assert_eq!(nav.history.len(), 1);
        assert_eq!(nav.history.index(), 0);
    }
}
