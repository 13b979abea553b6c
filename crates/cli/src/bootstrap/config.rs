use fleetlb_domain::{CliOverrides, Config, Node};
use fleetlb_infrastructure::InventorySnapshot;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

pub fn load_inventory(path: &str) -> anyhow::Result<InventorySnapshot> {
    InventorySnapshot::from_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to load inventory {}: {}", path, e))
}

/// Nodes from a JSON array file, followed by bare node names.
pub fn load_nodes(file: Option<&str>, names: &[String]) -> anyhow::Result<Vec<Node>> {
    let mut nodes: Vec<Node> = match file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
            serde_json::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?
        }
        None => Vec::new(),
    };
    nodes.extend(names.iter().map(Node::new));
    Ok(nodes)
}
