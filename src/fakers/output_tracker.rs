use std::{cell::RefCell, rc::Rc};

/// Records events pushed by a fake once `enable` has been called; until then
/// pushes are dropped.
#[derive(Default, Clone, Debug)]
pub struct OutputTracker<T> {
    store: Rc<RefCell<Option<Vec<T>>>>,
}

impl<T> OutputTracker<T> {
    pub fn new() -> Self {
        OutputTracker {
            store: Rc::new(RefCell::new(None)),
        }
    }
    pub fn len(&self) -> usize {
        self.store.borrow().as_ref().map_or(0, Vec::len)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + std::fmt::Debug> OutputTracker<T> {
    pub fn enable(&self) {
        let mut inner = self.store.borrow_mut();
        if inner.is_none() {
            *inner = Some(vec![]);
        }
    }
    pub fn push(&self, item: T) {
        if let Some(v) = &mut *self.store.borrow_mut() {
            v.push(item);
        }
    }
    pub fn items(&self) -> Vec<T> {
        self.store.borrow().clone().unwrap_or_default()
    }
    pub fn clear(&self) {
        if let Some(v) = &mut *self.store.borrow_mut() {
            v.clear();
        }
    }
}
