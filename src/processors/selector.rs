//! Sensor inclusion/exclusion criteria.
//!
//! Clients send criteria as
//! `{"selectors": [{"name": {"omit_sensors": ["Inverness"]}}, {"pc": {"select_sensors": ["IV1"]}}]}`.
//! Each attribute entry becomes one [`Criterion`] per mode it carries.

use crate::error::Result;
use crate::models::Sensor;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Keep only sensors whose attribute is one of the values.
    Select,
    /// Drop sensors whose attribute is one of the values.
    Omit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub attribute: String,
    pub mode: SelectionMode,
    pub values: BTreeSet<String>,
}

impl Criterion {
    pub fn new<I, S>(attribute: &str, mode: SelectionMode, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute: attribute.to_string(),
            mode,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn select<I, S>(attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(attribute, SelectionMode::Select, values)
    }

    pub fn omit<I, S>(attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(attribute, SelectionMode::Omit, values)
    }

    fn matches_value(&self, value: &str) -> bool {
        let listed = self.values.contains(value);
        match self.mode {
            SelectionMode::Select => listed,
            SelectionMode::Omit => !listed,
        }
    }

    /// Per-sensor check: a sensor lacking the attribute fails.
    pub fn admits(&self, sensor: &Sensor) -> bool {
        sensor
            .attribute(&self.attribute)
            .is_some_and(|value| self.matches_value(value))
    }

    /// Collection check: a sensor lacking the attribute can only fail a
    /// `Select`, since it cannot equal an omitted value.
    pub fn retains(&self, sensor: &Sensor) -> bool {
        match sensor.attribute(&self.attribute) {
            Some(value) => self.matches_value(value),
            None => self.mode == SelectionMode::Omit,
        }
    }
}

/// True when the sensor passes every criterion. An empty list admits all.
pub fn select(sensor: &Sensor, criteria: &[Criterion]) -> bool {
    criteria.iter().all(|criterion| criterion.admits(sensor))
}

/// The sensors of a collection that every criterion retains, in order.
pub fn filter<'a>(sensors: &'a [Sensor], criteria: &[Criterion]) -> Vec<&'a Sensor> {
    sensors
        .iter()
        .filter(|sensor| criteria.iter().all(|criterion| criterion.retains(sensor)))
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SelectorBody {
    Wrapped { selectors: Vec<WireEntry> },
    Bare(Vec<WireEntry>),
}

type WireEntry = BTreeMap<String, Option<WireSelector>>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireSelector {
    select_sensors: Option<Vec<String>>,
    omit_sensors: Option<Vec<String>>,
}

/// Parse criteria from a request body.
pub fn parse_criteria(body: &str) -> Result<Vec<Criterion>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries = match serde_json::from_str::<SelectorBody>(body)? {
        SelectorBody::Wrapped { selectors } => selectors,
        SelectorBody::Bare(entries) => entries,
    };

    let mut criteria = Vec::new();
    for entry in entries {
        for (attribute, selector) in entry {
            let Some(selector) = selector else {
                continue;
            };
            if let Some(values) = selector.select_sensors {
                criteria.push(Criterion::select(&attribute, values));
            }
            if let Some(values) = selector.omit_sensors {
                criteria.push(Criterion::omit(&attribute, values));
            }
        }
    }

    Ok(criteria)
}

/// Like [`parse_criteria`], but a malformed body selects everything.
pub fn parse_criteria_or_empty(body: &str) -> Vec<Criterion> {
    parse_criteria(body).unwrap_or_else(|e| {
        warn!("Ignoring malformed selector criteria: {}", e);
        Vec::new()
    })
}
