// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory flight record store.

use std::collections::HashMap;

use log::debug;

use crate::record::FlightRecord;

/// Current set of flight records, keyed by identifier.
///
/// Contents are only ever replaced wholesale by the active producer; readers
/// (overlay and presenter) get shared access. Iteration follows insertion
/// order so markers keep a stable paint order between frames.
#[derive(Debug, Default, Clone)]
pub struct FlightStore {
    records: Vec<FlightRecord>,
    index: HashMap<String, usize>,
}

impl FlightStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole store. Later duplicates of an identifier are dropped.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = FlightRecord>) {
        self.records.clear();
        self.index.clear();

        for record in records {
            if self.index.contains_key(&record.id) {
                debug!("Dropping duplicate flight id {}", record.id);
                continue;
            }
            self.index.insert(record.id.clone(), self.records.len());
            self.records.push(record);
        }
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FlightRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// Mutable access for in-place simulation updates.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut FlightRecord> {
        match self.index.get(id) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlightRecord> {
        self.records.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_all_discards_previous_contents() {
        let mut store = FlightStore::new();
        store.replace_all([FlightRecord::new("AA1234"), FlightRecord::new("DL5678")]);
        assert_eq!(store.len(), 2);

        store.replace_all([FlightRecord::new("SIM-01")]);
        assert_eq!(store.len(), 1);
        assert!(store.get("AA1234").is_none());
        assert!(store.contains("SIM-01"));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let mut store = FlightStore::new();
        let mut second = FlightRecord::new("A1B2C3");
        second.number = "SECOND".to_string();
        store.replace_all([FlightRecord::new("A1B2C3"), second]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("A1B2C3").unwrap().number, "A1B2C3");
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut store = FlightStore::new();
        store.replace_all(["C", "A", "B"].into_iter().map(FlightRecord::new));
        let ids: Vec<_> = store.ids().collect();
        assert_eq!(ids, ["C", "A", "B"]);
    }
}
