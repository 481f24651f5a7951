//! Bounded in-memory flow store
//!
//! Newest-first list capped at a fixed capacity; the oldest flow is evicted
//! once the cap is exceeded. Flows are immutable after insertion except for
//! the operator `block` action.

use std::collections::VecDeque;

use tracing::debug;
use uuid::Uuid;

use crate::types::{FlowStatus, NetworkFlow, Protocol};

/// View filter over the flow list
#[derive(Debug, Clone, Default)]
pub struct FlowFilter {
    pub protocol: Option<Protocol>,
    pub status: Option<FlowStatus>,
    pub only_threats: bool,
}

/// Bounded newest-first flow list
#[derive(Debug)]
pub struct FlowStore {
    flows: VecDeque<NetworkFlow>,
    capacity: usize,
}

impl FlowStore {
    /// Maximum flows returned by a filtered view
    pub const VIEW_LIMIT: usize = 50;

    pub fn new(capacity: usize) -> Self {
        Self {
            flows: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Prepend a flow, evicting the oldest entries beyond capacity
    pub fn push(&mut self, flow: NetworkFlow) {
        self.flows.push_front(flow);
        while self.flows.len() > self.capacity {
            if let Some(evicted) = self.flows.pop_back() {
                debug!("Evicted flow {} from store", evicted.id);
            }
        }
    }

    /// Replace the whole list (truncated to capacity, newest first)
    pub fn set(&mut self, flows: Vec<NetworkFlow>) {
        self.flows = flows.into_iter().take(self.capacity).collect();
    }

    pub fn clear(&mut self) {
        self.flows.clear();
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest-first iteration
    pub fn iter(&self) -> impl Iterator<Item = &NetworkFlow> {
        self.flows.iter()
    }

    /// Clone out the current list, newest first
    pub fn snapshot(&self) -> Vec<NetworkFlow> {
        self.flows.iter().cloned().collect()
    }

    pub fn get(&self, id: Uuid) -> Option<&NetworkFlow> {
        self.flows.iter().find(|f| f.id == id)
    }

    /// Operator action: rewrite a flow's status to blocked.
    /// Returns false if the id is unknown.
    pub fn block(&mut self, id: Uuid) -> bool {
        match self.flows.iter_mut().find(|f| f.id == id) {
            Some(flow) => {
                flow.status = FlowStatus::Blocked;
                true
            }
            None => false,
        }
    }

    /// Filtered view, newest first, capped at [`Self::VIEW_LIMIT`]
    pub fn filtered(&self, filter: &FlowFilter) -> Vec<&NetworkFlow> {
        self.flows
            .iter()
            .filter(|f| filter.protocol.map_or(true, |p| f.protocol == p))
            .filter(|f| filter.status.map_or(true, |s| f.status == s))
            .filter(|f| !filter.only_threats || f.is_threat())
            .take(Self::VIEW_LIMIT)
            .collect()
    }

    /// Flows carrying any threat type
    pub fn threat_flows(&self) -> Vec<&NetworkFlow> {
        self.flows.iter().filter(|f| f.is_threat()).collect()
    }

    /// Flows with critical status
    pub fn critical_flows(&self) -> Vec<&NetworkFlow> {
        self.flows
            .iter()
            .filter(|f| f.status == FlowStatus::Critical)
            .collect()
    }
}

impl Default for FlowStore {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::FlowGenerationConfig;
    use crate::simulator::FlowGenerator;

    fn fill(store: &mut FlowStore, count: usize) -> Vec<Uuid> {
        let mut generator = FlowGenerator::new(Some(10));
        let config = FlowGenerationConfig::default();
        (0..count)
            .map(|_| {
                let flow = generator.generate(&config, &[]);
                let id = flow.id;
                store.push(flow);
                id
            })
            .collect()
    }

    #[test]
    fn test_capacity_and_eviction_order() {
        let mut store = FlowStore::new(200);
        let ids = fill(&mut store, 250);

        assert_eq!(store.len(), 200);
        // Newest first: the last pushed id leads the list
        assert_eq!(store.iter().next().map(|f| f.id), ids.last().copied());
        // The 50 oldest ids were evicted
        for id in &ids[..50] {
            assert!(store.get(*id).is_none());
        }
        assert!(store.get(ids[50]).is_some());
    }

    #[test]
    fn test_newest_first_ordering() {
        let mut store = FlowStore::new(200);
        fill(&mut store, 20);

        let timestamps: Vec<_> = store.iter().map(|f| f.timestamp).collect();
        for pair in timestamps.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_block_flow() {
        let mut store = FlowStore::new(10);
        let ids = fill(&mut store, 3);

        assert!(store.block(ids[1]));
        assert_eq!(store.get(ids[1]).map(|f| f.status), Some(FlowStatus::Blocked));
        assert!(!store.block(Uuid::new_v4()));
    }

    #[test]
    fn test_filtered_view_cap() {
        let mut store = FlowStore::new(200);
        fill(&mut store, 120);

        let view = store.filtered(&FlowFilter::default());
        assert_eq!(view.len(), FlowStore::VIEW_LIMIT);
    }

    #[test]
    fn test_filtered_by_status() {
        let mut store = FlowStore::new(200);
        fill(&mut store, 60);

        let filter = FlowFilter {
            status: Some(FlowStatus::Normal),
            ..FlowFilter::default()
        };
        assert!(store
            .filtered(&filter)
            .iter()
            .all(|f| f.status == FlowStatus::Normal));

        let threats = FlowFilter {
            only_threats: true,
            ..FlowFilter::default()
        };
        assert!(store.filtered(&threats).iter().all(|f| f.is_threat()));
    }

    #[test]
    fn test_set_truncates_to_capacity() {
        let mut store = FlowStore::new(5);
        let mut source = FlowStore::new(20);
        fill(&mut source, 12);

        store.set(source.snapshot());
        assert_eq!(store.len(), 5);
    }
}
