use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Deserializer};

/// Screen zone where notifications stack up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    #[default]
    BottomRight,
    TopRight,
    Center,
}

impl FromStr for Placement {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "bottomright" => Ok(Placement::BottomRight),
            "topright" => Ok(Placement::TopRight),
            "center" | "centre" => Ok(Placement::Center),
            _ => anyhow::bail!("Unknown notification placement '{s}'"),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Placement::BottomRight => "bottom-right",
            Placement::TopRight => "top-right",
            Placement::Center => "center",
        };
        f.write_str(name)
    }
}

/// Unknown placements fall back to the default instead of failing the whole settings load.
impl<'de> Deserialize<'de> for Placement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|error| {
            log::warn!("{error}, using {}", Placement::default());
            Placement::default()
        }))
    }
}

/// Hands out display slots per zone so concurrently visible notifications don't overlap.
/// Slot `0` is the one closest to the zone's anchor.
#[derive(Debug, Default)]
pub struct SlotAllocator {
    zones: Mutex<HashMap<Placement, BTreeSet<usize>>>,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the lowest free slot in `zone`.
    pub fn acquire(&self, zone: Placement) -> usize {
        let mut zones = self.lock();
        let taken = zones.entry(zone).or_default();
        let index = (0..=taken.len())
            .find(|index| !taken.contains(index))
            .unwrap_or(taken.len());
        taken.insert(index);
        index
    }

    /// Returns whether the slot was actually held.
    pub fn release(&self, zone: Placement, index: usize) -> bool {
        let mut zones = self.lock();
        zones
            .get_mut(&zone)
            .is_some_and(|taken| taken.remove(&index))
    }

    #[cfg(test)]
    pub fn occupied(&self, zone: Placement) -> usize {
        self.lock().get(&zone).map_or(0, BTreeSet::len)
    }

    /// Like [`SlotAllocator::acquire`], released when the lease drops.
    pub fn lease(self: &Arc<Self>, zone: Placement) -> SlotLease {
        let index = self.acquire(zone);
        SlotLease {
            allocator: Arc::clone(self),
            zone,
            index,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Placement, BTreeSet<usize>>> {
        self.zones.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct SlotLease {
    allocator: Arc<SlotAllocator>,
    zone: Placement,
    index: usize,
}

impl SlotLease {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn zone(&self) -> Placement {
        self.zone
    }
}

impl Drop for SlotLease {
    fn drop(&mut self) {
        self.allocator.release(self.zone, self.index);
    }
}
