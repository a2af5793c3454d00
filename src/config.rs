use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::route_compute::{
    KShortestSolver, MetricKind, MetricSchema, ShortestPathSolver, SpfPolicy, Topology,
    DEFAULT_K_LIMIT,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub origin: u32,
    pub destination: u32,
    pub cost: Vec<f64>,
    pub bidirectional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub root: Option<u32>,
    pub k_limit: usize,
    pub policy: SpfPolicy,
    pub schema: MetricSchema,
    pub limits: Vec<f64>,
    pub nodes: Vec<u32>,
    pub links: Vec<LinkConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMetrics {
    Preset(String),
    Kinds(Vec<MetricKind>),
}

#[derive(Debug, Deserialize)]
struct RawLink {
    from: u32,
    to: u32,
    #[serde(default)]
    cost: Vec<f64>,
    bidirectional: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawEngineConfig {
    root: Option<u32>,
    k_limit: Option<usize>,
    policy: Option<SpfPolicy>,
    metrics: Option<RawMetrics>,
    #[serde(default)]
    limits: Vec<f64>,
    #[serde(default)]
    nodes: Vec<u32>,
    #[serde(default)]
    links: Vec<RawLink>,
}

/// Reads an engine config; `.json` files are parsed as JSON, anything else
/// as YAML.
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let raw_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let cfg = if is_json {
        parse_json_config(&raw_text)?
    } else {
        parse_yaml_config(&raw_text)?
    };
    debug!(
        path = %path.display(),
        links = cfg.links.len(),
        k_limit = cfg.k_limit,
        "loaded engine config"
    );
    Ok(cfg)
}

pub fn parse_yaml_config(text: &str) -> Result<EngineConfig> {
    let raw: RawEngineConfig =
        serde_yaml::from_str(text).context("failed to parse engine config yaml")?;
    resolve(raw)
}

pub fn parse_json_config(text: &str) -> Result<EngineConfig> {
    let raw: RawEngineConfig =
        serde_json::from_str(text).context("failed to parse engine config json")?;
    resolve(raw)
}

fn resolve(raw: RawEngineConfig) -> Result<EngineConfig> {
    let schema = match raw.metrics {
        None => MetricSchema::widest_shortest(),
        Some(RawMetrics::Preset(name)) => schema_preset(&name)?,
        Some(RawMetrics::Kinds(kinds)) => {
            if kinds.is_empty() {
                bail!("metrics list must not be empty");
            }
            MetricSchema::new(kinds)
        }
    };

    let k_limit = raw.k_limit.unwrap_or(DEFAULT_K_LIMIT);
    if k_limit == 0 {
        bail!("k_limit must be at least 1");
    }
    if raw.limits.len() > schema.len() {
        bail!(
            "{} limits configured for {} metrics",
            raw.limits.len(),
            schema.len()
        );
    }

    let links = raw
        .links
        .into_iter()
        .map(|link| LinkConfig {
            origin: link.from,
            destination: link.to,
            cost: link.cost,
            bidirectional: link.bidirectional.unwrap_or(true),
        })
        .collect();

    Ok(EngineConfig {
        root: raw.root,
        k_limit,
        policy: raw.policy.unwrap_or_default(),
        schema,
        limits: raw.limits,
        nodes: raw.nodes,
        links,
    })
}

fn schema_preset(name: &str) -> Result<MetricSchema> {
    match name.trim().to_lowercase().as_str() {
        "standard" => Ok(MetricSchema::standard()),
        "widest_shortest" => Ok(MetricSchema::widest_shortest()),
        "shortest_widest" => Ok(MetricSchema::shortest_widest()),
        other => bail!("unknown metrics preset: {other}"),
    }
}

impl EngineConfig {
    pub fn build_topology(&self) -> Result<Topology<u32>> {
        let mut topology = Topology::new(self.schema.clone());
        for node in &self.nodes {
            topology.add_node(*node);
        }
        for link in &self.links {
            let context = || format!("invalid link {} -> {}", link.origin, link.destination);
            topology
                .add_link(link.origin, link.destination, &link.cost)
                .with_context(context)?;
            if link.bidirectional {
                topology
                    .add_link(link.destination, link.origin, &link.cost)
                    .with_context(context)?;
            }
        }
        Ok(topology)
    }

    pub fn build_shortest_path_solver(&self) -> Result<ShortestPathSolver<u32>> {
        let mut solver = ShortestPathSolver::with_topology(self.build_topology()?);
        solver.set_policy(self.policy);
        if let Some(root) = self.root {
            solver.set_root(root);
        }
        Ok(solver)
    }

    pub fn build_k_shortest_solver(&self) -> Result<KShortestSolver<u32>> {
        let mut solver = KShortestSolver::with_topology(self.build_topology()?, self.k_limit)?;
        if !self.limits.is_empty() {
            solver.set_limits(&self.limits);
        }
        if let Some(root) = self.root {
            solver.set_root(root);
        }
        Ok(solver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
root: 1
k_limit: 2
policy: widest_shortest
metrics: [additive_min, concave_max]
limits: [10.0]
nodes: [9]
links:
  - { from: 1, to: 2, cost: [1.0, 10.0] }
  - { from: 2, to: 3, cost: [1.0, 10.0], bidirectional: false }
"#;

    #[test]
    fn parses_yaml_with_defaults() {
        let cfg = parse_yaml_config(SAMPLE).unwrap();
        assert_eq!(cfg.root, Some(1));
        assert_eq!(cfg.k_limit, 2);
        assert_eq!(cfg.policy, SpfPolicy::WidestShortest);
        assert_eq!(cfg.schema, MetricSchema::widest_shortest());
        assert!(cfg.links[0].bidirectional);
        assert!(!cfg.links[1].bidirectional);

        let topology = cfg.build_topology().unwrap();
        assert_eq!(topology.edge_count(), 3);
        assert!(topology.contains_node(&9));
        assert!(topology.get_edge(&3, &2).is_none());
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = parse_yaml_config("links: []").unwrap();
        assert_eq!(cfg.k_limit, DEFAULT_K_LIMIT);
        assert_eq!(cfg.policy, SpfPolicy::Basic);
        assert_eq!(cfg.root, None);
    }

    #[test]
    fn presets_and_json_are_accepted() {
        let cfg = parse_json_config(
            r#"{"root": 1, "metrics": "standard", "links": [{"from": 1, "to": 2, "cost": [1, 0.5, 100, 0]}]}"#,
        )
        .unwrap();
        assert_eq!(cfg.schema, MetricSchema::standard());
        assert_eq!(cfg.build_topology().unwrap().edge_count(), 2);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(parse_yaml_config("metrics: fastest").is_err());
        assert!(parse_yaml_config("k_limit: 0").is_err());
        assert!(parse_yaml_config("limits: [1, 2, 3]").is_err());

        let cfg = parse_yaml_config("links: [{ from: 1, to: 2, cost: [1.0] }]").unwrap();
        let err = cfg.build_topology().unwrap_err();
        assert!(err.to_string().contains("invalid link 1 -> 2"));
    }

    #[test]
    fn builds_ready_solvers() {
        let cfg = parse_yaml_config(SAMPLE).unwrap();

        let mut spf = cfg.build_shortest_path_solver().unwrap();
        assert!(spf.run_until(&3).unwrap());
        assert_eq!(spf.route(&3).unwrap(), Some(vec![1, 2, 3]));

        let mut ksp = cfg.build_k_shortest_solver().unwrap();
        ksp.run().unwrap();
        assert_eq!(ksp.routes_k(&3), &[vec![1, 2, 3]]);
        assert_eq!(ksp.limits().bound(0), Some(10.0));
    }

    #[test]
    fn load_reads_file_by_extension() {
        let dir = std::env::temp_dir().join(format!("pathcalc-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let cfg = load_engine_config(&path).unwrap();
        assert_eq!(cfg.links.len(), 2);
        assert!(load_engine_config(&dir.join("missing.yaml")).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
