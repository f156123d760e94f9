//! Writing translations to elements
//!
//! Every applied translation is recorded in a [`TransformStore`] keyed by
//! element. The scanner reads it back to undo the translation when measuring,
//! and nested eligible elements inherit their ancestor's translation as a
//! baseline so they never need to be measured again just because a parent moved.

use std::collections::HashMap;

use tracing::trace;

use crate::dom::{Document, ElementId, Translate};
use crate::Result;

/// Where a recorded translation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Applied to the element itself
    Own,
    /// Copied from a transformed ancestor
    Inherited,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    pub translate: Translate,
    pub origin: Origin,
}

/// Recorded translation per element
#[derive(Debug, Clone, Default)]
pub struct TransformStore {
    states: HashMap<ElementId, TransformState>,
}

impl TransformStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: ElementId) -> Option<TransformState> {
        self.states.get(&element).copied()
    }

    /// Recorded translation regardless of origin
    pub fn translate(&self, element: ElementId) -> Option<Translate> {
        self.states.get(&element).map(|s| s.translate)
    }

    pub fn record(&mut self, element: ElementId, translate: Translate) {
        self.states.insert(
            element,
            TransformState {
                translate,
                origin: Origin::Own,
            },
        );
    }

    pub fn forget(&mut self, element: ElementId) {
        self.states.remove(&element);
    }

    /// Give every descendant without its own translation `translate` as baseline
    ///
    /// Returns how many descendants were updated.
    pub fn inherit(&mut self, descendants: &[ElementId], translate: Translate) -> usize {
        let mut updated = 0;
        for &child in descendants {
            let own = matches!(
                self.states.get(&child),
                Some(TransformState { origin: Origin::Own, .. })
            );
            if !own {
                self.states.insert(
                    child,
                    TransformState {
                        translate,
                        origin: Origin::Inherited,
                    },
                );
                updated += 1;
            }
        }
        updated
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Applies translations and propagates them to nested eligible elements
#[derive(Debug, Clone)]
pub struct TransformApplicator {
    selector: String,
}

impl TransformApplicator {
    /// `selector` picks the descendants that inherit a translation
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    pub fn apply<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        store: &mut TransformStore,
        element: ElementId,
        translate: Translate,
    ) -> Result<()> {
        doc.set_transform(element, Some(translate))?;
        store.record(element, translate);

        let descendants = doc.descendants(element, &self.selector);
        let inherited = store.inherit(&descendants, translate);
        trace!(%element, %translate, inherited, "Applied transform");
        Ok(())
    }

    /// Remove the element's translation; inheriting descendants fall back to zero
    pub fn clear<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        store: &mut TransformStore,
        element: ElementId,
    ) -> Result<()> {
        doc.set_transform(element, None)?;
        store.forget(element);

        let descendants = doc.descendants(element, &self.selector);
        store.inherit(&descendants, Translate::ZERO);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryDocument, NodeSpec};

    fn nested() -> (InMemoryDocument, ElementId, ElementId, ElementId) {
        let mut doc = InMemoryDocument::new(800.0);
        let parent = doc.insert(None, NodeSpec::new(1000.0, 400.0).class("js-animate"));
        let child = doc.insert(Some(parent), NodeSpec::new(1100.0, 50.0).class("js-animate"));
        let plain = doc.insert(Some(parent), NodeSpec::new(1200.0, 50.0));
        (doc, parent, child, plain)
    }

    #[test]
    fn test_apply_records_and_propagates() {
        let (mut doc, parent, child, plain) = nested();
        let mut store = TransformStore::new();
        let applicator = TransformApplicator::new(".js-animate");

        let t = Translate::vertical(-100.0);
        applicator.apply(&mut doc, &mut store, parent, t).unwrap();

        assert_eq!(doc.transform(parent), Some(t));
        assert_eq!(store.get(parent).unwrap().origin, Origin::Own);
        let inherited = store.get(child).unwrap();
        assert_eq!(inherited.translate, t);
        assert_eq!(inherited.origin, Origin::Inherited);
        // The descendant is only recorded, never styled
        assert_eq!(doc.transform(child), None);
        assert!(store.get(plain).is_none());
    }

    #[test]
    fn test_own_state_not_overwritten() {
        let (mut doc, parent, child, _) = nested();
        let mut store = TransformStore::new();
        let applicator = TransformApplicator::new(".js-animate");

        applicator
            .apply(&mut doc, &mut store, child, Translate::horizontal(30.0))
            .unwrap();
        applicator
            .apply(&mut doc, &mut store, parent, Translate::vertical(-50.0))
            .unwrap();

        assert_eq!(store.translate(child), Some(Translate::horizontal(30.0)));
    }

    #[test]
    fn test_inherited_state_follows_parent() {
        let (mut doc, parent, child, _) = nested();
        let mut store = TransformStore::new();
        let applicator = TransformApplicator::new(".js-animate");

        applicator
            .apply(&mut doc, &mut store, parent, Translate::vertical(-50.0))
            .unwrap();
        applicator
            .apply(&mut doc, &mut store, parent, Translate::vertical(-80.0))
            .unwrap();
        assert_eq!(store.translate(child), Some(Translate::vertical(-80.0)));

        applicator.clear(&mut doc, &mut store, parent).unwrap();
        assert_eq!(doc.transform(parent), None);
        assert!(store.get(parent).is_none());
        assert_eq!(store.translate(child), Some(Translate::ZERO));
    }

    #[test]
    fn test_inherit_refreshes_baseline_every_time() {
        let mut store = TransformStore::new();
        let (a, b) = (ElementId(1), ElementId(2));
        store.record(b, Translate::vertical(10.0));

        assert_eq!(store.inherit(&[a, b], Translate::vertical(-50.0)), 1);
        // A second inherit replaces the earlier baseline instead of keeping the first one
        assert_eq!(store.inherit(&[a, b], Translate::vertical(-80.0)), 1);
        assert_eq!(
            store.get(a),
            Some(TransformState {
                translate: Translate::vertical(-80.0),
                origin: Origin::Inherited,
            })
        );
        assert_eq!(store.get(b).unwrap().origin, Origin::Own);
    }

    #[test]
    fn test_detached_element_fails() {
        let mut doc = InMemoryDocument::new(800.0);
        let mut store = TransformStore::new();
        let applicator = TransformApplicator::new(".js-animate");

        let err = applicator
            .apply(&mut doc, &mut store, ElementId(42), Translate::ZERO)
            .unwrap_err();
        assert!(matches!(err, crate::Error::ElementNotFound(ElementId(42))));
        assert!(store.is_empty());
    }
}
