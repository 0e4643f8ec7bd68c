//! Graph model for an IoT network

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::invariants::InvariantChecker;
use crate::model::Device;

/// One network's devices and their directed adjacency, in insertion order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkGraph {
    devices: IndexMap<Uuid, Device>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self {
            devices: IndexMap::new(),
        }
    }

    /// Rebuild a snapshot from stored devices.
    ///
    /// Adjacency lists are kept exactly as stored, duplicates included, so the
    /// analyzer can see them. Later entries with a repeated id replace earlier ones.
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let devices = devices.into_iter().map(|d| (d.id, d)).collect();
        Self { devices }
    }

    /// Insert a device unless its id is already taken.
    ///
    /// Self references in the device's adjacency are dropped.
    pub fn add_device(&mut self, mut device: Device) -> bool {
        if self.devices.contains_key(&device.id) {
            return false;
        }
        let id = device.id;
        device.connections.retain(|c| *c != id);
        self.devices.insert(id, device);
        true
    }

    /// Insert a device, overwriting any device with the same id
    pub fn replace_device(&mut self, mut device: Device) -> Option<Device> {
        let id = device.id;
        device.connections.retain(|c| *c != id);
        self.devices.insert(id, device)
    }

    /// Append `to` to `from`'s adjacency.
    ///
    /// Ignored for self-loops, unknown endpoints and entries that already exist.
    pub fn add_connection(&mut self, from: Uuid, to: Uuid) -> bool {
        if from == to || !self.devices.contains_key(&to) {
            return false;
        }
        match self.devices.get_mut(&from) {
            Some(device) if !device.connections.contains(&to) => {
                device.connections.push(to);
                true
            }
            _ => false,
        }
    }

    /// Remove a device and every adjacency entry pointing at it
    pub fn remove_device(&mut self, id: Uuid) -> Option<Device> {
        let removed = self.devices.shift_remove(&id)?;
        for device in self.devices.values_mut() {
            device.connections.retain(|c| *c != id);
        }
        Some(removed)
    }

    /// False when the graph is empty or an adjacency entry points at a missing device
    pub fn validate(&self) -> bool {
        InvariantChecker::new().is_valid(self)
    }

    pub fn device(&self, id: Uuid) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.devices.contains_key(&id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.devices.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Every stored `(from, to)` entry, walked in device order
    pub fn directed_edges(&self) -> impl Iterator<Item = (Uuid, Uuid)> + '_ {
        self.devices
            .values()
            .flat_map(|d| d.connections.iter().map(move |to| (d.id, *to)))
    }

    /// Number of stored adjacency entries
    pub fn edge_count(&self) -> usize {
        self.devices.values().map(|d| d.connections.len()).sum()
    }

    /// Distinct undirected neighbors of every device: outgoing plus incoming,
    /// without self references or references to missing devices.
    pub fn neighbor_sets(&self) -> HashMap<Uuid, HashSet<Uuid>> {
        let mut sets: HashMap<Uuid, HashSet<Uuid>> =
            self.devices.keys().map(|id| (*id, HashSet::new())).collect();

        for (from, to) in self.directed_edges() {
            if from == to || !self.devices.contains_key(&to) {
                continue;
            }
            if let Some(set) = sets.get_mut(&from) {
                set.insert(to);
            }
            if let Some(set) = sets.get_mut(&to) {
                set.insert(from);
            }
        }

        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeviceType;

    fn sensor(id: Uuid) -> Device {
        Device::new(id, format!("sensor-{}", &id.to_string()[..4]), DeviceType::Sensor)
    }

    #[test]
    fn add_device_does_not_overwrite() {
        let mut graph = NetworkGraph::new();
        let id = Uuid::new_v4();

        assert!(graph.add_device(sensor(id)));
        let renamed = Device::new(id, "renamed", DeviceType::Gateway);
        assert!(!graph.add_device(renamed.clone()));
        assert_eq!(graph.device(id).unwrap().device_type, DeviceType::Sensor);

        let previous = graph.replace_device(renamed);
        assert_eq!(previous.unwrap().device_type, DeviceType::Sensor);
        assert_eq!(graph.device(id).unwrap().name, "renamed");
    }

    #[test]
    fn add_device_strips_self_references() {
        let mut graph = NetworkGraph::new();
        let id = Uuid::new_v4();
        graph.add_device(sensor(id).with_connections(vec![id]));
        assert!(graph.device(id).unwrap().connections.is_empty());
    }

    #[test]
    fn add_connection_ignores_self_loops_missing_targets_and_repeats() {
        let mut graph = NetworkGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        graph.add_device(sensor(a));
        graph.add_device(sensor(b));

        assert!(!graph.add_connection(a, a));
        assert!(!graph.add_connection(a, Uuid::new_v4()));
        assert!(graph.add_connection(a, b));
        assert!(!graph.add_connection(a, b));

        assert_eq!(graph.device(a).unwrap().connections, vec![b]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn remove_device_cascades_to_adjacency() {
        let mut graph = NetworkGraph::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        for id in [a, b, c] {
            graph.add_device(sensor(id));
        }
        graph.add_connection(a, b);
        graph.add_connection(c, b);
        graph.add_connection(b, a);

        let removed = graph.remove_device(b).unwrap();
        assert_eq!(removed.id, b);
        assert!(graph.devices().all(|d| d.connections.is_empty()));
        assert!(graph.validate());
        assert!(graph.remove_device(b).is_none());
    }

    #[test]
    fn validate_rejects_empty_and_dangling_graphs() {
        assert!(!NetworkGraph::new().validate());

        let a = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let graph = NetworkGraph::from_devices(vec![sensor(a).with_connections(vec![ghost])]);
        assert!(!graph.validate());

        let graph = NetworkGraph::from_devices(vec![sensor(a)]);
        assert!(graph.validate());
    }

    #[test]
    fn neighbors_are_undirected_and_distinct() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let graph = NetworkGraph::from_devices(vec![
            sensor(a).with_connections(vec![b, b]),
            sensor(b).with_connections(vec![a]),
            sensor(c),
        ]);

        let sets = graph.neighbor_sets();
        assert_eq!(sets[&a], HashSet::from([b]));
        assert_eq!(sets[&b], HashSet::from([a]));
        assert!(sets[&c].is_empty());
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn from_devices_keeps_insertion_order() {
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let graph = NetworkGraph::from_devices(ids.iter().map(|id| sensor(*id)));
        assert_eq!(graph.ids().collect::<Vec<_>>(), ids);
    }
}
