//! Render-diff tracking of component identities

use std::collections::HashSet;

use crate::component::ComponentId;

/// Records which components a render emitted, and which it no longer emits
#[derive(Debug, Clone, Default)]
pub struct RenderTracker {
    previously_rendered: Vec<ComponentId>,
    newly_rendered: Vec<ComponentId>,
    seen: HashSet<ComponentId>,
}

impl RenderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a render with an empty "newly rendered" set
    pub fn begin(&mut self) {
        self.newly_rendered.clear();
        self.seen.clear();
    }

    /// Record a component written to the output; repeats are ignored
    pub fn record(&mut self, id: &ComponentId) {
        if self.seen.insert(id.clone()) {
            self.newly_rendered.push(id.clone());
        }
    }

    /// Finish a render, returning the components that are no longer rendered
    ///
    /// The components rendered this time become the previous set.
    pub fn finish(&mut self) -> Vec<ComponentId> {
        let removed = self
            .previously_rendered
            .iter()
            .filter(|id| !self.seen.contains(*id))
            .cloned()
            .collect();
        self.previously_rendered = std::mem::take(&mut self.newly_rendered);
        self.seen.clear();
        removed
    }

    /// Forget the previous render, forcing full re-materialization
    pub fn reset(&mut self) {
        self.previously_rendered.clear();
    }

    /// Drop a component from both sets, used when ownership leaves the template
    pub fn forget(&mut self, id: &ComponentId) {
        self.previously_rendered.retain(|p| p != id);
        self.newly_rendered.retain(|p| p != id);
        self.seen.remove(id);
    }

    /// Components emitted by the last finished render, in order of first occurrence
    pub fn previously_rendered(&self) -> &[ComponentId] {
        &self.previously_rendered
    }

    pub fn was_rendered(&self, id: &ComponentId) -> bool {
        self.previously_rendered.contains(id)
    }
}
