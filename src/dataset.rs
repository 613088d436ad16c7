use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

pub type DayLabel = String;
pub type SlotTime = String;

/// Bookable times per rendered day for one location, across every week scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationAvailability {
    days: IndexMap<DayLabel, Vec<SlotTime>>,
}

impl LocationAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `slots` under `day`. Empty slot lists are dropped, and a label
    /// seen in an earlier week is extended rather than replaced.
    pub fn record_day(&mut self, day: DayLabel, slots: Vec<SlotTime>) {
        if slots.is_empty() {
            return;
        }
        self.days.entry(day).or_default().extend(slots);
    }

    pub fn slots(&self, day: &str) -> Option<&[SlotTime]> {
        self.days.get(day).map(Vec::as_slice)
    }

    pub fn days(&self) -> impl Iterator<Item = (&DayLabel, &Vec<SlotTime>)> {
        self.days.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn slot_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// Location name -> availability, in the order locations were enumerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    locations: IndexMap<String, LocationAvailability>,
}

impl Dataset {
    pub fn get(&self, location: &str) -> Option<&LocationAvailability> {
        self.locations.get(location)
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Whether at least one location recorded at least one slot.
    pub fn has_slots(&self) -> bool {
        self.locations.values().any(|a| !a.is_empty())
    }
}

/// Collects each location's result into the run's [`Dataset`].
#[derive(Debug, Default)]
pub struct DataAggregator {
    dataset: Dataset,
}

impl DataAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, location: &str, availability: LocationAvailability) {
        info!(
            "Recorded {} slot(s) over {} day(s) for {}",
            availability.slot_count(),
            availability.days.len(),
            location
        );
        self.dataset
            .locations
            .insert(location.to_string(), availability);
    }

    pub fn finish(self) -> Dataset {
        self.dataset
    }
}
