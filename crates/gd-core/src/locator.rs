//! Element locator cache.
//!
//! Canvas containers live in the host's element tree (the DOM in the
//! browser). Looking one up is comparatively slow, so resolved handles are
//! memoized by element id.
//!
//! Failed lookups are never cached: an element that has not rendered yet is
//! found on a later call once it appears. Successful lookups stay cached
//! until [`ElementLocator::invalidate`] or [`ElementLocator::clear`]. There
//! is no liveness check, so a handle to an element that was removed and
//! replaced under the same id stays stale until the caller invalidates it.

use std::collections::HashMap;

/// A resolved container element. Only its width is ever read.
pub trait ContainerHandle: Clone {
    /// Current content width in pixels.
    fn content_width(&self) -> f64;
}

/// Host primitive that looks up an element by id.
pub trait ElementResolver {
    type Handle: ContainerHandle;

    fn lookup(&self, id: &str) -> Option<Self::Handle>;
}

/// Memoizing wrapper around an [`ElementResolver`].
pub struct ElementLocator<R: ElementResolver> {
    resolver: R,
    cache: HashMap<String, R::Handle>,
}

impl<R: ElementResolver> ElementLocator<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            cache: HashMap::new(),
        }
    }

    /// Return the cached handle for `id`, or look it up and cache a hit.
    pub fn resolve(&mut self, id: &str) -> Option<R::Handle> {
        if let Some(handle) = self.cache.get(id) {
            log::trace!("locator hit {id}");
            return Some(handle.clone());
        }
        let handle = self.resolver.lookup(id)?;
        log::debug!("locator cached {id}");
        self.cache.insert(id.to_string(), handle.clone());
        Some(handle)
    }

    /// Drop the entry for `id`. Absent ids are ignored.
    pub fn invalidate(&mut self, id: &str) {
        if self.cache.remove(id).is_some() {
            log::debug!("locator invalidated {id}");
        }
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Clone)]
    struct Handle(f64);

    impl ContainerHandle for Handle {
        fn content_width(&self) -> f64 {
            self.0
        }
    }

    #[derive(Default)]
    struct Dom {
        elements: RefCell<HashMap<String, f64>>,
        lookups: Cell<usize>,
    }

    impl ElementResolver for Rc<Dom> {
        type Handle = Handle;

        fn lookup(&self, id: &str) -> Option<Handle> {
            self.lookups.set(self.lookups.get() + 1);
            self.elements.borrow().get(id).copied().map(Handle)
        }
    }

    fn dom_with(id: &str, width: f64) -> Rc<Dom> {
        let dom = Rc::new(Dom::default());
        dom.elements.borrow_mut().insert(id.to_string(), width);
        dom
    }

    #[test]
    fn hit_is_cached() {
        let dom = dom_with("main", 800.0);
        let mut locator = ElementLocator::new(dom.clone());

        assert_eq!(locator.resolve("main").map(|h| h.0), Some(800.0));
        assert_eq!(locator.resolve("main").map(|h| h.0), Some(800.0));
        assert_eq!(dom.lookups.get(), 1);
    }

    #[test]
    fn miss_is_not_cached() {
        let dom = Rc::new(Dom::default());
        let mut locator = ElementLocator::new(dom.clone());

        assert!(locator.resolve("late").is_none());
        assert!(!locator.is_cached("late"));

        dom.elements.borrow_mut().insert("late".to_string(), 300.0);
        assert_eq!(locator.resolve("late").map(|h| h.0), Some(300.0));
        assert_eq!(dom.lookups.get(), 2);
    }

    #[test]
    fn stale_handle_survives_until_invalidated() {
        let dom = dom_with("main", 800.0);
        let mut locator = ElementLocator::new(dom.clone());
        locator.resolve("main");

        // Element replaced under the same id.
        dom.elements.borrow_mut().insert("main".to_string(), 640.0);
        assert_eq!(locator.resolve("main").map(|h| h.0), Some(800.0));

        locator.invalidate("main");
        assert_eq!(locator.resolve("main").map(|h| h.0), Some(640.0));
    }

    #[test]
    fn invalidate_absent_and_clear() {
        let dom = dom_with("a", 1.0);
        dom.elements.borrow_mut().insert("b".to_string(), 2.0);
        let mut locator = ElementLocator::new(dom);

        locator.invalidate("nope");
        locator.resolve("a");
        locator.resolve("b");
        assert_eq!(locator.len(), 2);

        locator.clear();
        assert!(locator.is_empty());
    }
}
