//! Selection partitioning into export units

use crate::core::export::ExportSettings;
use crate::domain::{LiftError, ObjectId, Result, Scene};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Group name for objects that are not linked into any collection
pub const DEFAULT_GROUP: &str = "Scene Collection";

/// How a selection is split into units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionMode {
    /// One unit per selected object
    Individual,
    /// One unit per collection, pooling its selected members
    ByGroup,
    /// One unit per selected object without a selected ancestor, plus its descendants
    TopLevelWithChildren,
}

impl fmt::Display for PartitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PartitionMode::Individual => "individual",
            PartitionMode::ByGroup => "by_group",
            PartitionMode::TopLevelWithChildren => "top_level_with_children",
        })
    }
}

impl FromStr for PartitionMode {
    type Err = LiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "by_group" | "collections" => Ok(Self::ByGroup),
            "top_level_with_children" | "hierarchy" => Ok(Self::TopLevelWithChildren),
            _ => Err(LiftError::Configuration(format!(
                "Invalid partition mode: {s}. Expected individual, by_group or top_level_with_children"
            ))),
        }
    }
}

/// One grouping of objects exported and uploaded as a single blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportUnit {
    pub unit_name: String,
    /// Ordered, duplicate-free; the first member is the representative object
    pub members: Vec<ObjectId>,
    pub export_settings: ExportSettings,
}

/// Splits a selection into units
///
/// # Errors
///
/// - [`LiftError::EmptySelection`] for an empty selection
/// - [`LiftError::SceneGraph`] for unknown ids, or a parent cycle in
///   [`PartitionMode::TopLevelWithChildren`]
pub fn partition(
    scene: &Scene,
    selection: &[ObjectId],
    mode: PartitionMode,
    settings: &ExportSettings,
) -> Result<Vec<ExportUnit>> {
    if selection.is_empty() {
        return Err(LiftError::EmptySelection);
    }

    // Resolve everything up front so a bad id fails before any work
    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for id in selection {
        let obj = scene.resolve(id)?;
        if seen.insert(id.clone()) {
            selected.push(obj);
        }
    }

    let unit = |unit_name: String, members: Vec<ObjectId>| ExportUnit {
        unit_name,
        members,
        export_settings: settings.clone(),
    };

    let units = match mode {
        PartitionMode::Individual => selected
            .iter()
            .map(|obj| unit(obj.name.clone(), vec![obj.id.clone()]))
            .collect(),

        PartitionMode::ByGroup => {
            let mut order: Vec<String> = Vec::new();
            let mut groups: BTreeMap<String, Vec<ObjectId>> = BTreeMap::new();
            for obj in &selected {
                let names: Vec<&str> = if obj.collections.is_empty() {
                    vec![DEFAULT_GROUP]
                } else {
                    obj.collections.iter().map(String::as_str).collect()
                };
                for name in names {
                    let members = groups.entry(name.to_string()).or_insert_with(|| {
                        order.push(name.to_string());
                        Vec::new()
                    });
                    if !members.contains(&obj.id) {
                        members.push(obj.id.clone());
                    }
                }
            }
            order
                .into_iter()
                .map(|name| {
                    let members = groups.remove(&name).unwrap_or_default();
                    unit(name, members)
                })
                .collect()
        }

        PartitionMode::TopLevelWithChildren => {
            let mut units = Vec::new();
            for obj in &selected {
                let ancestors = scene.ancestors_of(&obj.id)?;
                if ancestors.iter().any(|a| seen.contains(a)) {
                    // Folded into the selected ancestor's unit
                    continue;
                }
                let mut members = vec![obj.id.clone()];
                members.extend(scene.descendants_of(&obj.id)?.into_iter().map(|d| d.id.clone()));
                units.push(unit(obj.name.clone(), members));
            }
            units
        }
    };

    Ok(units)
}
