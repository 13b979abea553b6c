#![allow(dead_code)]
use fleetlb_domain::fleet::FleetRecord;
use fleetlb_domain::instance::{InstanceRecord, InstanceStatus, InstanceView};
use fleetlb_domain::network::{
    InterfaceIpConfiguration, IpConfiguration, IpVersion, NetworkInterfaceConfiguration,
    NetworkInterfaceRecord, NetworkInterfaceReference, PublicIpRecord,
};
use fleetlb_infrastructure::client::{InventorySnapshot, SnapshotInterface, SnapshotPublicIp};

pub const SUBSCRIPTION: &str = "sub";
pub const RESOURCE_GROUP: &str = "rg";
pub const NIC_NAME: &str = "nic";
pub const IP_CONFIG_NAME: &str = "ipconfig1";

pub fn pool_id(load_balancer: &str, pool: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/loadBalancers/{}/backendAddressPools/{}",
        SUBSCRIPTION, RESOURCE_GROUP, load_balancer, pool
    )
}

pub fn vm_id(resource_group: &str, fleet: &str, instance_id: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/virtualMachineScaleSets/{}/virtualMachines/{}",
        SUBSCRIPTION, resource_group, fleet, instance_id
    )
}

pub fn provider_id(resource_group: &str, fleet: &str, instance_id: &str) -> String {
    format!("azure://{}", vm_id(resource_group, fleet, instance_id))
}

pub fn nic_id(resource_group: &str, fleet: &str, instance_id: &str) -> String {
    format!(
        "{}/networkInterfaces/{}",
        vm_id(resource_group, fleet, instance_id),
        NIC_NAME
    )
}

pub fn ip_configuration_id(resource_group: &str, fleet: &str, instance_id: &str) -> String {
    format!(
        "{}/ipConfigurations/{}",
        nic_id(resource_group, fleet, instance_id),
        IP_CONFIG_NAME
    )
}

pub fn public_ip_id(resource_group: &str, fleet: &str, instance_id: &str, name: &str) -> String {
    format!(
        "{}/publicIPAddresses/{}",
        ip_configuration_id(resource_group, fleet, instance_id),
        name
    )
}

/// Computer name of instance `instance_id` of a fleet with the given prefix.
pub fn computer_name(prefix: &str, instance_id: u64) -> String {
    let digits = "0123456789abcdefghijklmnopqrstuvwxyz".as_bytes();
    let mut n = instance_id;
    let mut suffix = Vec::new();
    while n > 0 {
        suffix.push(digits[(n % 36) as usize] as char);
        n /= 36;
    }
    let encoded: String = suffix.iter().rev().collect();
    format!("{}{:0>6}", prefix, encoded)
}

/// One primary NIC with one primary IPv4 configuration in `pools`.
pub fn nic_configs(pools: &[String]) -> Vec<NetworkInterfaceConfiguration> {
    vec![NetworkInterfaceConfiguration {
        name: NIC_NAME.to_string(),
        primary: Some(true),
        ip_configurations: vec![IpConfiguration {
            name: IP_CONFIG_NAME.to_string(),
            primary: Some(true),
            private_ip_address_version: IpVersion::IPv4,
            load_balancer_backend_address_pools: pools.to_vec(),
        }],
    }]
}

/// Dual-stack NIC: IPv4 primary configuration plus an IPv6 one.
pub fn dual_stack_nic_configs(ipv4_pools: &[String], ipv6_pools: &[String]) -> Vec<NetworkInterfaceConfiguration> {
    let mut configs = nic_configs(ipv4_pools);
    configs[0].ip_configurations.push(IpConfiguration {
        name: "ipconfig-v6".to_string(),
        primary: Some(false),
        private_ip_address_version: IpVersion::IPv6,
        load_balancer_backend_address_pools: ipv6_pools.to_vec(),
    });
    configs
}

pub struct FleetBuilder {
    record: FleetRecord,
}

impl FleetBuilder {
    pub fn new(name: &str) -> Self {
        let mut record = FleetRecord::new(name, RESOURCE_GROUP);
        record.location = Some("eastus".to_string());
        record.network_interface_configurations = Some(nic_configs(&[]));
        Self { record }
    }

    pub fn resource_group(mut self, resource_group: &str) -> Self {
        self.record.resource_group = resource_group.to_string();
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.record.computer_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn pools(mut self, pools: &[String]) -> Self {
        self.record.network_interface_configurations = Some(nic_configs(pools));
        self
    }

    pub fn configs(mut self, configs: Option<Vec<NetworkInterfaceConfiguration>>) -> Self {
        self.record.network_interface_configurations = configs;
        self
    }

    pub fn deallocating(mut self) -> Self {
        self.record.provisioning_state = Some("Deallocating".to_string());
        self
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.record.tags.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> FleetRecord {
        self.record
    }
}

pub struct InstanceBuilder {
    record: InstanceRecord,
}

impl InstanceBuilder {
    /// Instance `instance_id` of `fleet`, named after `prefix`.
    pub fn new(fleet: &str, prefix: &str, instance_id: u64) -> Self {
        let id = instance_id.to_string();
        Self {
            record: InstanceRecord {
                id: vm_id(RESOURCE_GROUP, fleet, &id),
                instance_id: id.clone(),
                fleet_name: fleet.to_string(),
                resource_group: RESOURCE_GROUP.to_string(),
                computer_name: Some(computer_name(prefix, instance_id)),
                location: "eastus".to_string(),
                provisioning_state: Some("Succeeded".to_string()),
                zones: vec![],
                sku: Some("Standard_D2s_v3".to_string()),
                hardware_profile: None,
                network_interfaces: vec![NetworkInterfaceReference {
                    id: nic_id(RESOURCE_GROUP, fleet, &id),
                    primary: Some(true),
                }],
                network_interface_configurations: Some(nic_configs(&[])),
                instance_view: Some(InstanceView {
                    statuses: vec![InstanceStatus {
                        code: "PowerState/running".to_string(),
                    }],
                    platform_fault_domain: Some(0),
                }),
            },
        }
    }

    pub fn resource_group(mut self, resource_group: &str) -> Self {
        self.record.resource_group = resource_group.to_string();
        self.record.id = vm_id(resource_group, &self.record.fleet_name, &self.record.instance_id);
        self
    }

    pub fn pools(mut self, pools: &[String]) -> Self {
        self.record.network_interface_configurations = Some(nic_configs(pools));
        self
    }

    pub fn configs(mut self, configs: Option<Vec<NetworkInterfaceConfiguration>>) -> Self {
        self.record.network_interface_configurations = configs;
        self
    }

    pub fn zones(mut self, zones: &[&str]) -> Self {
        self.record.zones = zones.iter().map(|z| z.to_string()).collect();
        self
    }

    pub fn without_computer_name(mut self) -> Self {
        self.record.computer_name = None;
        self
    }

    pub fn build(self) -> InstanceRecord {
        self.record
    }
}

pub fn interface(fleet: &str, instance_id: &str, private_ip: &str, public_ip: Option<&str>) -> SnapshotInterface {
    SnapshotInterface {
        resource_group: RESOURCE_GROUP.to_string(),
        fleet_name: fleet.to_string(),
        instance_id: instance_id.to_string(),
        interface: NetworkInterfaceRecord {
            id: nic_id(RESOURCE_GROUP, fleet, instance_id),
            name: NIC_NAME.to_string(),
            location: None,
            ip_configurations: vec![
                InterfaceIpConfiguration {
                    name: IP_CONFIG_NAME.to_string(),
                    primary: Some(true),
                    private_ip_address: Some(private_ip.to_string()),
                    private_ip_address_version: IpVersion::IPv4,
                    public_ip_address_id: public_ip
                        .map(|name| public_ip_id(RESOURCE_GROUP, fleet, instance_id, name)),
                },
                InterfaceIpConfiguration {
                    name: "ipconfig-v6".to_string(),
                    primary: Some(false),
                    private_ip_address: Some("fd00::4".to_string()),
                    private_ip_address_version: IpVersion::IPv6,
                    public_ip_address_id: None,
                },
            ],
        },
    }
}

pub fn public_ip(fleet: &str, instance_id: &str, name: &str, address: &str) -> SnapshotPublicIp {
    SnapshotPublicIp {
        resource_group: RESOURCE_GROUP.to_string(),
        fleet_name: fleet.to_string(),
        instance_id: instance_id.to_string(),
        nic_name: NIC_NAME.to_string(),
        ip_configuration_name: IP_CONFIG_NAME.to_string(),
        record: PublicIpRecord {
            id: public_ip_id(RESOURCE_GROUP, fleet, instance_id, name),
            name: name.to_string(),
            ip_address: Some(address.to_string()),
        },
    }
}

pub struct SnapshotBuilder {
    snapshot: InventorySnapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: InventorySnapshot {
                resource_groups: vec![RESOURCE_GROUP.to_string()],
                ..Default::default()
            },
        }
    }

    pub fn resource_group(mut self, resource_group: &str) -> Self {
        self.snapshot.resource_groups.push(resource_group.to_string());
        self
    }

    pub fn fleet(mut self, fleet: FleetRecord) -> Self {
        self.snapshot.fleets.push(fleet);
        self
    }

    pub fn instance(mut self, instance: InstanceRecord) -> Self {
        self.snapshot.instances.push(instance);
        self
    }

    pub fn interface(mut self, interface: SnapshotInterface) -> Self {
        self.snapshot.network_interfaces.push(interface);
        self
    }

    pub fn public_ip(mut self, public_ip: SnapshotPublicIp) -> Self {
        self.snapshot.public_ips.push(public_ip);
        self
    }

    pub fn build(self) -> InventorySnapshot {
        self.snapshot
    }
}

/// Pools of the primary IP configuration of `configs`.
pub fn primary_pools(configs: &Option<Vec<NetworkInterfaceConfiguration>>) -> Vec<String> {
    configs
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|nic| nic.ip_configurations.first())
        .map(|ip| ip.load_balancer_backend_address_pools.clone())
        .unwrap_or_default()
}
