/// Linear undo/redo over whole-value snapshots. Any edit after an undo
/// discards the redo branch.
#[derive(Clone, Debug)]
pub struct History<T> {
    current: T,
    undo: Vec<T>,
    redo: Vec<T>,
}

impl<T> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn edit(&mut self, value: T) {
        let previous = std::mem::replace(&mut self.current, value);
        self.undo.push(previous);
        self.redo.clear();
    }

    /// Replaces the current value without adding a step.
    pub fn amend(&mut self, value: T) {
        self.current = value;
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.redo.push(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.undo.push(current);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn undo_and_redo_walk_the_history() {
        let mut history = History::new("a".to_string());
        history.edit("b".to_string());
        history.edit("c".to_string());

        assert!(history.undo());
        assert_eq!(history.current(), "b");
        assert!(history.undo());
        assert_eq!(history.current(), "a");
        assert!(!history.undo());
        assert_eq!(history.current(), "a");

        assert!(history.redo());
        assert_eq!(history.current(), "b");
    }

    #[test]
    fn edit_after_undo_discards_redo_branch() {
        let mut history = History::new(1);
        history.edit(2);
        history.undo();
        history.edit(3);

        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(*history.current(), 3);
        history.undo();
        assert_eq!(*history.current(), 1);
    }

    #[test]
    fn amend_does_not_add_a_step() {
        let mut history = History::new("".to_string());
        history.edit("h".to_string());
        history.amend("he".to_string());
        history.amend("hey".to_string());

        assert!(history.undo());
        assert_eq!(history.current(), "");
        assert!(!history.can_undo());
        assert!(history.redo());
        assert_eq!(history.current(), "hey");
    }

    proptest! {
        #[test]
        fn undo_then_redo_is_inverse(initial in "[a-z]{0,5}", edits in proptest::collection::vec("[a-z]{0,5}", 0..16)) {
            let mut history = History::new(initial.clone());
            for edit in &edits {
                history.edit(edit.clone());
            }
            let last = history.current().clone();

            for _ in 0..edits.len() {
                prop_assert!(history.undo());
            }
            prop_assert_eq!(history.current(), &initial);

            for _ in 0..edits.len() {
                prop_assert!(history.redo());
            }
            prop_assert_eq!(history.current(), &last);
        }
    }
}
