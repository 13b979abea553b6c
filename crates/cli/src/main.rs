use clap::{Parser, Subcommand};
use fleetlb_application::ports::NodeManager;
use fleetlb_domain::{BackendPoolTarget, CliOverrides, Node};
use serde::Serialize;
use tracing::{info, warn};

mod bootstrap;
mod di;

const PROVIDER_ID_SCHEME: &str = "azure://";

#[derive(Parser)]
#[command(name = "fleetlb")]
#[command(version)]
#[command(about = "Scale set identity resolution and load balancer backend pool reconciliation")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Inventory snapshot (JSON) standing in for the cloud control plane
    #[arg(short = 'i', long, value_name = "FILE", global = true)]
    inventory: Option<String>,

    /// Write the updated inventory back to the snapshot file
    #[arg(long, global = true)]
    write: bool,

    /// Resource group of the cluster's scale sets
    #[arg(long, global = true)]
    resource_group: Option<String>,

    /// Primary scale set name
    #[arg(long, global = true)]
    primary_scale_set: Option<String>,

    /// Deadline for each remote call, in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print what is known about each node
    Describe {
        #[arg(required = true)]
        nodes: Vec<String>,
    },

    /// Print the VM sets eligible for a load balancer
    VmSetNames {
        /// Value of the service's load balancer mode annotation
        #[arg(long)]
        mode: Option<String>,

        /// JSON array of nodes with provider ids and labels
        #[arg(long, value_name = "FILE")]
        nodes_file: Option<String>,

        nodes: Vec<String>,
    },

    /// Make nodes members of a backend pool
    EnsurePool {
        #[arg(long)]
        pool: String,

        /// VM set the load balancer is scoped to
        #[arg(long, default_value = "")]
        vm_set: String,

        /// Join through the IPv6 IP configuration
        #[arg(long)]
        ipv6: bool,

        #[arg(long, value_name = "FILE")]
        nodes_file: Option<String>,

        nodes: Vec<String>,
    },

    /// Remove a backend pool from the given IP configurations
    DeletePool {
        #[arg(long)]
        pool: String,

        #[arg(long, default_value = "")]
        vm_set: String,

        /// Also remove the pool from the scale set templates
        #[arg(long)]
        from_vm_set: bool,

        #[arg(required = true)]
        ip_configurations: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        resource_group: cli.resource_group.clone(),
        primary_scale_set_name: cli.primary_scale_set.clone(),
        remote_call_timeout_secs: cli.timeout,
        log_level: cli.log_level.clone(),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting fleetlb v{}", env!("CARGO_PKG_VERSION"));

    let inventory_path = cli
        .inventory
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--inventory is required"))?;
    let inventory = bootstrap::load_inventory(inventory_path)?;

    let managers = di::NodeManagers::new(&config, inventory);
    let use_cases = di::UseCases::new(&managers);

    match cli.command {
        Command::Describe { nodes } => {
            let mut described = Vec::with_capacity(nodes.len());
            for node in &nodes {
                described.push(use_cases.describe_node.execute(node).await?);
            }
            print_json(&described)?;
        }
        Command::VmSetNames {
            mode,
            nodes_file,
            nodes,
        } => {
            let nodes = bootstrap::load_nodes(nodes_file.as_deref(), &nodes)?;
            let nodes = with_provider_ids(managers.node_manager.as_ref(), nodes).await;
            let names = use_cases
                .get_vm_set_names
                .execute(mode.as_deref(), &nodes)
                .await?;
            print_json(&names)?;
        }
        Command::EnsurePool {
            pool,
            vm_set,
            ipv6,
            nodes_file,
            nodes,
        } => {
            let nodes = bootstrap::load_nodes(nodes_file.as_deref(), &nodes)?;
            let nodes = with_provider_ids(managers.node_manager.as_ref(), nodes).await;
            let target = BackendPoolTarget::new(pool, vm_set).with_ipv6(ipv6);
            use_cases
                .ensure_hosts_in_pool
                .execute(&nodes, &target)
                .await?;
        }
        Command::DeletePool {
            pool,
            vm_set,
            from_vm_set,
            ip_configurations,
        } => {
            use_cases
                .ensure_backend_pool_deleted
                .execute(&pool, &vm_set, &ip_configurations, from_vm_set)
                .await?;
        }
    }

    if cli.write {
        managers
            .client
            .snapshot()
            .await
            .save(inventory_path)
            .map_err(|e| anyhow::anyhow!("Failed to write inventory: {}", e))?;
        info!(path = %inventory_path, "Inventory written");
    }

    Ok(())
}

/// Fills in missing provider ids from the instance ids the node manager knows.
async fn with_provider_ids(node_manager: &dyn NodeManager, nodes: Vec<Node>) -> Vec<Node> {
    let mut resolved = Vec::with_capacity(nodes.len());
    for node in nodes {
        if !node.provider_id.is_empty() {
            resolved.push(node);
            continue;
        }
        match node_manager.get_instance_id(&node.name).await {
            Ok(instance_id) => {
                let provider_id = format!("{PROVIDER_ID_SCHEME}{instance_id}");
                resolved.push(node.with_provider_id(provider_id));
            }
            Err(e) => {
                warn!(node = %node.name, error = %e, "No provider id for node");
                resolved.push(node);
            }
        }
    }
    resolved
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
