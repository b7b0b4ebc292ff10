//! Scenario catalogue access for front ends.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use sx_scenarios::{ParamValue, Registry, ScenarioDef, parse_assignment};

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub default_duration_s: f64,
    pub param_count: usize,
}

pub fn list_scenarios(registry: &Registry) -> Vec<ScenarioSummary> {
    registry
        .iter()
        .map(|def| ScenarioSummary {
            id: def.id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            default_duration_s: def.default_duration_s,
            param_count: def.params.len(),
        })
        .collect()
}

/// Parse `key=value` strings against `def`'s parameters.
pub fn parse_overrides(
    def: &ScenarioDef,
    assignments: &[String],
) -> AppResult<BTreeMap<String, ParamValue>> {
    let pairs = assignments
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(def.parse_overrides(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?)
}

/// Text listing of the circuit `def` builds with `overrides`.
pub fn describe_topology(
    def: &ScenarioDef,
    overrides: &BTreeMap<String, ParamValue>,
) -> AppResult<String> {
    let built = def.build(overrides)?;
    let sim = &built.sim;
    let topology = sim.topology();

    let wire_name = |id| {
        topology
            .wire(id)
            .map(|w| w.name.as_str())
            .unwrap_or("<unregistered>")
    };

    let mut out = String::new();
    let _ = writeln!(out, "scenario: {}", def.id);
    let _ = writeln!(out, "dt: {}", sim.dt());
    let _ = writeln!(out, "input: {}", wire_name(topology.input_wire));

    let _ = writeln!(out, "components:");
    for c in &topology.components {
        let _ = writeln!(
            out,
            "  c{} {}: {} -> {}",
            c.id,
            c.kind,
            wire_name(c.input),
            wire_name(c.output)
        );
    }

    let _ = writeln!(out, "wires:");
    for w in &topology.wires {
        let readers: Vec<String> = w.effects.iter().map(|id| format!("c{id}")).collect();
        let readers = if readers.is_empty() {
            "-".to_string()
        } else {
            readers.join(", ")
        };
        let _ = writeln!(out, "  w{} {} (effects: {})", w.id, w.name, readers);
    }

    match topology.settle_depth() {
        Some(depth) => {
            let _ = writeln!(out, "settle passes per tick: {depth}");
        }
        None => {
            let _ = writeln!(out, "settle passes per tick: unbounded (cycle)");
        }
    }
    Ok(out)
}
