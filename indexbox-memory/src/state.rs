use std::collections::HashMap;

use bytes::Bytes;
use indexbox_backend::RawHash;
use indexbox_core::{Circle, Point};
use indexmap::{IndexMap, IndexSet};

use crate::geo;

/// Keys held by a memory store, one map per value type.
///
/// Empty sets are removed like Redis removes them, so a missing key and an
/// empty collection are indistinguishable.
#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) hashes: HashMap<Bytes, RawHash>,
    pub(crate) sets: HashMap<Bytes, IndexSet<Bytes>>,
    pub(crate) geo: HashMap<Bytes, IndexMap<Bytes, Point>>,
}

impl State {
    pub(crate) fn sadd(&mut self, key: Bytes, member: Bytes) -> bool {
        self.sets.entry(key).or_default().insert(member)
    }

    pub(crate) fn srem(&mut self, key: &[u8], member: &[u8]) -> bool {
        let Some(set) = self.sets.get_mut(key) else {
            return false;
        };
        let removed = set.shift_remove(member);
        if set.is_empty() {
            self.sets.remove(key);
        }
        removed
    }

    pub(crate) fn smembers(&self, key: &[u8]) -> Vec<Bytes> {
        self.sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn scard(&self, key: &[u8]) -> usize {
        self.sets.get(key).map_or(0, IndexSet::len)
    }

    pub(crate) fn intersect(&self, keys: &[Bytes]) -> Vec<Bytes> {
        let Some((first, rest)) = keys.split_first() else {
            return Vec::new();
        };
        let Some(first) = self.sets.get(first) else {
            return Vec::new();
        };
        let mut others = Vec::with_capacity(rest.len());
        for key in rest {
            match self.sets.get(key) {
                Some(set) => others.push(set),
                None => return Vec::new(),
            }
        }
        first
            .iter()
            .filter(|member| others.iter().all(|set| set.contains(*member)))
            .cloned()
            .collect()
    }

    pub(crate) fn union(&self, keys: &[Bytes]) -> Vec<Bytes> {
        let mut members = IndexSet::new();
        for set in keys.iter().filter_map(|key| self.sets.get(key)) {
            members.extend(set.iter().cloned());
        }
        members.into_iter().collect()
    }

    pub(crate) fn geo_add(&mut self, key: Bytes, member: Bytes, point: Point) {
        self.geo.entry(key).or_default().insert(member, point);
    }

    pub(crate) fn geo_remove(&mut self, key: &[u8], member: &[u8]) {
        if let Some(positions) = self.geo.get_mut(key) {
            positions.shift_remove(member);
            if positions.is_empty() {
                self.geo.remove(key);
            }
        }
    }

    pub(crate) fn geo_radius(&self, key: &[u8], within: Circle, limit: Option<usize>) -> Vec<Bytes> {
        let Some(positions) = self.geo.get(key) else {
            return Vec::new();
        };
        let radius = within.radius.in_meters();
        let mut matches: Vec<(&Bytes, f64)> = positions
            .iter()
            .map(|(member, point)| (member, geo::distance(within.center, *point)))
            .filter(|(_, distance)| *distance <= radius)
            .collect();
        // a bounded lookup returns the nearest members, as GEORADIUS with COUNT does
        if let Some(limit) = limit {
            matches.sort_by(|(_, a), (_, b)| a.total_cmp(b));
            matches.truncate(limit);
        }
        matches.into_iter().map(|(member, _)| member.clone()).collect()
    }

    pub(crate) fn hash(&self, key: &[u8]) -> RawHash {
        self.hashes.get(key).cloned().unwrap_or_default()
    }
}
