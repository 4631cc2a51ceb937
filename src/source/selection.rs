use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct SelectionState {
    string: String,
    generation: u64,
}

/// A shared, observable selection query string.
///
/// Clones share state. Every non-silent change bumps a generation counter;
/// holders remember the generation they last acted on and notice changes
/// made through any clone.
#[derive(Debug, Clone, Default)]
pub struct Selection(Rc<RefCell<SelectionState>>);

impl Selection {
    /// Selection with an initial query string.
    #[must_use]
    pub fn new(string: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(SelectionState {
            string: string.into(),
            generation: 0,
        })))
    }

    /// Current query string.
    #[must_use]
    pub fn string(&self) -> String {
        self.0.borrow().string.clone()
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.0.borrow().generation
    }

    /// Change the query string and notify holders. Setting the current
    /// string again is not a change.
    pub fn set(&self, string: &str) {
        let mut state = self.0.borrow_mut();
        if state.string != string {
            string.clone_into(&mut state.string);
            state.generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_changes() {
        let a = Selection::new("protein");
        let b = a.clone();
        let seen = b.generation();
        a.set("protein");
        assert_eq!(b.generation(), seen);
        a.set(":A");
        assert_eq!(b.string(), ":A");
        assert_ne!(b.generation(), seen);
    }
}
