//! # Simulated Bagging Scale
//!
//! ## Event Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  after every add / remove / foreign placement:                          │
//! │                                                                         │
//! │  total > limit ............................... Overload                 │
//! │  total <= limit, was overloaded .............. OutOfOverload            │
//! │  |total - last reported| > sensitivity ....... WeightChanged { total }  │
//! │  otherwise ................................... BelowSensitivity         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The surface itself accepts any weight; refusing to overload it is the
//! session's job.

use kiosk_core::{DeviceFault, ElectronicScale, ItemId, ScaleEvent, ScannedItem, Weight};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct SimulatedScale {
    limit: Weight,
    sensitivity: Weight,
    disabled: bool,
    items: Vec<(ItemId, Weight)>,
    foreign: Weight,
    last_reported: Weight,
    overloaded: bool,
}

impl SimulatedScale {
    pub fn new(limit: Weight, sensitivity: Weight) -> Self {
        SimulatedScale {
            limit,
            sensitivity,
            disabled: false,
            items: Vec::new(),
            foreign: Weight::ZERO,
            last_reported: Weight::ZERO,
            overloaded: false,
        }
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    /// Puts something on the surface that was never scanned (a purse, an
    /// unpaid item).
    pub fn place_foreign(&mut self, weight: Weight) -> ScaleEvent {
        self.foreign = self.foreign + weight;
        self.settle()
    }

    /// Takes every unscanned object off the surface.
    pub fn clear_foreign(&mut self) -> ScaleEvent {
        self.foreign = Weight::ZERO;
        self.settle()
    }

    /// Whether a scanned item is currently on the surface.
    pub fn holds(&self, item: &ScannedItem) -> bool {
        self.items.iter().any(|(id, _)| *id == item.id())
    }

    /// Number of scanned items on the surface.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    fn settle(&mut self) -> ScaleEvent {
        let total = self.current_weight();

        let event = if total > self.limit {
            self.overloaded = true;
            ScaleEvent::Overload
        } else if self.overloaded {
            self.overloaded = false;
            self.last_reported = total;
            ScaleEvent::OutOfOverload
        } else if total.abs_diff(self.last_reported) > self.sensitivity {
            self.last_reported = total;
            ScaleEvent::WeightChanged { weight: total }
        } else {
            ScaleEvent::BelowSensitivity
        };

        trace!(%total, ?event, "Scale settled");
        event
    }
}

impl ElectronicScale for SimulatedScale {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn current_weight(&self) -> Weight {
        self.items.iter().map(|(_, w)| *w).sum::<Weight>() + self.foreign
    }

    fn weight_limit(&self) -> Weight {
        self.limit
    }

    fn sensitivity(&self) -> Weight {
        self.sensitivity
    }

    fn add(&mut self, item: &ScannedItem) -> Result<ScaleEvent, DeviceFault> {
        if self.disabled {
            return Err(DeviceFault::Disabled);
        }
        if self.holds(item) {
            return Err(DeviceFault::Blocked(format!(
                "item {} is already on the scale",
                item.id()
            )));
        }

        self.items.push((item.id(), item.weight()));
        Ok(self.settle())
    }

    fn remove(&mut self, item: &ScannedItem) -> Result<ScaleEvent, DeviceFault> {
        if self.disabled {
            return Err(DeviceFault::Disabled);
        }

        let index = self
            .items
            .iter()
            .position(|(id, _)| *id == item.id())
            .ok_or(DeviceFault::NotPresent)?;
        self.items.remove(index);
        Ok(self.settle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> SimulatedScale {
        SimulatedScale::new(Weight::from_grams(1000), Weight::from_grams(15))
    }

    #[test]
    fn test_small_changes_are_not_reported() {
        let mut scale = scale();
        let crumb = ScannedItem::parse("1", 10).unwrap();
        let crumb2 = ScannedItem::parse("2", 10).unwrap();

        assert_eq!(scale.add(&crumb).unwrap(), ScaleEvent::BelowSensitivity);
        // 20 g since the last report crosses the 15 g threshold.
        assert_eq!(
            scale.add(&crumb2).unwrap(),
            ScaleEvent::WeightChanged {
                weight: Weight::from_grams(20)
            }
        );
        assert_eq!(scale.current_weight(), Weight::from_grams(20));
    }

    #[test]
    fn test_overload_transitions() {
        let mut scale = scale();
        let heavy = ScannedItem::parse("1", 900).unwrap();

        assert!(matches!(scale.add(&heavy).unwrap(), ScaleEvent::WeightChanged { .. }));
        assert_eq!(scale.place_foreign(Weight::from_grams(200)), ScaleEvent::Overload);
        assert!(scale.state().is_overloaded());
        assert_eq!(scale.clear_foreign(), ScaleEvent::OutOfOverload);
        assert!(!scale.state().is_overloaded());
    }

    #[test]
    fn test_remove_absent_item() {
        let mut scale = scale();
        let item = ScannedItem::parse("1", 100).unwrap();
        assert_eq!(scale.remove(&item).unwrap_err(), DeviceFault::NotPresent);
    }

    #[test]
    fn test_same_item_cannot_be_added_twice() {
        let mut scale = scale();
        let item = ScannedItem::parse("1", 100).unwrap();
        scale.add(&item).unwrap();
        assert!(matches!(scale.add(&item), Err(DeviceFault::Blocked(_))));
        assert_eq!(scale.item_count(), 1);
    }

    #[test]
    fn test_disabled_scale() {
        let mut scale = scale();
        scale.disable();
        let item = ScannedItem::parse("1", 100).unwrap();
        assert_eq!(scale.add(&item).unwrap_err(), DeviceFault::Disabled);
        assert!(scale.current_weight().is_zero());
    }
}
