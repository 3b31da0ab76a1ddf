//! Correctness verdicts for bin arrivals.
//!
//! After classification the kiosk knows which bin each component belongs
//! in ([`ExpectedItems`]). When a bin region fires, the [`VerdictEngine`]
//! asks the classifier which component went in, looks up its expected bin
//! and compares it with the bin that actually received it.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::classify::{canonical_name, Classifier, Component, UNIDENTIFIED};
use crate::frame::Frame;
use crate::region::Region;

/// Components skipped when building the expected items.
pub const DEFAULT_IGNORED: &[&str] = &["box", "cardboard box", "packaging"];

/// Whether an item went into the right bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Correctness {
    Correct,
    Incorrect,
}

impl Correctness {
    pub fn is_correct(&self) -> bool {
        matches!(self, Correctness::Correct)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Correctness::Correct => "correct",
            Correctness::Incorrect => "incorrect",
        }
    }
}

impl fmt::Display for Correctness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component names or materials that never count as sortable items.
///
/// Typically the packaging the item was presented in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreList {
    names: Vec<String>,
}

impl Default for IgnoreList {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED.iter().copied())
    }
}

impl IgnoreList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| canonical_name(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// An ignore list that lets everything through.
    pub fn none() -> Self {
        Self { names: Vec::new() }
    }

    /// Whether the component's name or material is on the list.
    pub fn matches(&self, component: &Component) -> bool {
        let name = canonical_name(&component.component_name);
        let material = canonical_name(&component.material);
        self.names.iter().any(|n| *n == name || *n == material)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A component awaiting disposal and the bin it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedItem {
    /// Canonical name, used as the lookup key.
    pub name: String,
    /// Name as the classifier wrote it, used in prompts and announcements.
    pub display_name: String,
    pub material: String,
    pub expected_bin: String,
}

impl ExpectedItem {
    pub fn from_component(component: &Component) -> Self {
        Self {
            name: canonical_name(&component.component_name),
            display_name: component.component_name.trim().to_string(),
            material: component.material.trim().to_string(),
            expected_bin: component.disposable_category.trim().to_string(),
        }
    }
}

/// Expected items of one classified object, keyed by canonical name.
#[derive(Debug, Clone, Default)]
pub struct ExpectedItems {
    items: HashMap<String, ExpectedItem>,
    order: Vec<String>,
}

impl ExpectedItems {
    /// Build the expected items, skipping ignored components.
    ///
    /// When two components share a canonical name the first one is kept.
    pub fn from_components(components: &[Component], ignore: &IgnoreList) -> Self {
        let mut expected = Self::default();
        for component in components {
            if ignore.matches(component) {
                debug!(item = %component.component_name, "Ignoring component");
                continue;
            }
            let item = ExpectedItem::from_component(component);
            if item.name.is_empty() || expected.items.contains_key(&item.name) {
                continue;
            }
            expected.order.push(item.name.clone());
            expected.items.insert(item.name.clone(), item);
        }
        expected
    }

    /// Look up an item by any spelling of its name.
    pub fn get(&self, name: &str) -> Option<&ExpectedItem> {
        self.items.get(&canonical_name(name))
    }

    /// Display names in classification order.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|item| item.display_name.clone()).collect()
    }

    /// Items in classification order.
    pub fn iter(&self) -> impl Iterator<Item = &ExpectedItem> {
        self.order.iter().filter_map(|name| self.items.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Outcome of one bin arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub region_id: usize,
    /// Bin that received the item.
    pub bin_name: String,
    /// Canonical name of the identified item, or [`UNIDENTIFIED`].
    pub item: String,
    /// Where the item should have gone, if it is a known item.
    pub expected_bin: Option<String>,
    /// Material of the known item.
    pub material: Option<String>,
    pub correctness: Correctness,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        self.correctness.is_correct()
    }

    pub fn is_identified(&self) -> bool {
        self.item != UNIDENTIFIED
    }
}

/// Turns a fired region into a [`Verdict`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VerdictEngine;

impl VerdictEngine {
    pub fn new() -> Self {
        Self
    }

    /// Identify the item in `masked` and judge it against `region`.
    ///
    /// Identification errors, and answers that name none of `candidates`,
    /// are logged and treated as [`UNIDENTIFIED`].
    pub fn resolve(
        &self,
        classifier: &dyn Classifier,
        region: &Region,
        masked: &Frame,
        expected: &ExpectedItems,
        candidates: &[String],
    ) -> Verdict {
        let name = match classifier.identify_part(masked, candidates) {
            Ok(name) => name,
            Err(e) => {
                warn!(region = region.id(), error = %e, "Part identification failed");
                UNIDENTIFIED.to_string()
            }
        };
        let answer = canonical_name(&name);
        let name = if answer == UNIDENTIFIED
            || candidates.iter().any(|c| canonical_name(c) == answer)
        {
            name
        } else {
            warn!(region = region.id(), item = %name, "Answer is not a candidate");
            UNIDENTIFIED.to_string()
        };

        let verdict = self.judge(region, &name, expected);
        info!(
            region = verdict.region_id,
            bin = %verdict.bin_name,
            item = %verdict.item,
            expected = verdict.expected_bin.as_deref().unwrap_or("-"),
            result = %verdict.correctness,
            "Verdict"
        );
        verdict
    }

    /// Judge an already identified item. Pure.
    pub fn judge(&self, region: &Region, item_name: &str, expected: &ExpectedItems) -> Verdict {
        let item = canonical_name(item_name);
        let item = if item.is_empty() {
            UNIDENTIFIED.to_string()
        } else {
            item
        };

        let known = expected.get(&item);
        let expected_bin = known.map(|e| e.expected_bin.clone());
        let material = known
            .map(|e| e.material.clone())
            .filter(|m| !m.is_empty());
        let correctness = match &expected_bin {
            Some(bin) if region.is_bin(bin) => Correctness::Correct,
            _ => Correctness::Incorrect,
        };

        Verdict {
            region_id: region.id(),
            bin_name: region.bin_name().to_string(),
            item,
            expected_bin,
            material,
            correctness,
        }
    }
}
