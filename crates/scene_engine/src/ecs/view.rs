//! Multi-kind views over the component store

use super::{ComponentKind, ComponentStore, EcsError, Entity, KindSet};

/// Entities having every `include` kind and none of the `exclude` kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentView {
    include: KindSet,
    exclude: KindSet,
}

impl ComponentView {
    /// View over entities having every kind in `include`
    pub fn new(include: impl Into<KindSet>) -> Self {
        Self {
            include: include.into(),
            exclude: KindSet::empty(),
        }
    }

    /// Also require the absence of `kinds`
    pub fn excluding(mut self, kinds: impl Into<KindSet>) -> Self {
        self.exclude |= kinds.into();
        self
    }

    /// Build a view from kind names; unknown names are rejected
    pub fn from_names<'a>(
        include: impl IntoIterator<Item = &'a str>,
        exclude: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, EcsError> {
        Ok(Self {
            include: parse_kinds(include)?,
            exclude: parse_kinds(exclude)?,
        })
    }

    /// Required kinds
    pub fn include(&self) -> KindSet {
        self.include
    }

    /// Excluded kinds
    pub fn exclude(&self) -> KindSet {
        self.exclude
    }

    /// Whether an entity mask satisfies the view
    pub fn matches(&self, mask: KindSet) -> bool {
        mask.contains(self.include) && !mask.intersects(self.exclude)
    }

    /// Iterate matching entities
    ///
    /// Iteration is driven by the smallest included table. A view with no
    /// included kinds walks every live entity.
    pub fn iter<'s>(&self, store: &'s ComponentStore) -> ViewIter<'s> {
        let driver = self
            .include
            .kinds()
            .min_by_key(|kind| store.count(*kind))
            .map(|kind| store.entities_of(kind).to_vec());
        let candidates = driver.unwrap_or_else(|| store.entities().collect());
        ViewIter {
            store,
            view: *self,
            candidates: candidates.into_iter(),
        }
    }
}

fn parse_kinds<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<KindSet, EcsError> {
    let mut set = KindSet::empty();
    for name in names {
        let kind = ComponentKind::from_name(name).ok_or_else(|| EcsError::UnknownKind(name.to_string()))?;
        set |= kind.set();
    }
    Ok(set)
}

/// Iterator returned by [`ComponentView::iter`]
pub struct ViewIter<'s> {
    store: &'s ComponentStore,
    view: ComponentView,
    candidates: std::vec::IntoIter<Entity>,
}

impl Iterator for ViewIter<'_> {
    type Item = Entity;

    fn next(&mut self) -> Option<Entity> {
        let store = self.store;
        let view = self.view;
        self.candidates.find(|entity| view.matches(store.mask(*entity)))
    }
}
