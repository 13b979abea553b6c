mod helpers;

use fleetlb_application::ports::ComputeClient;
use fleetlb_domain::fleet::FleetTemplateDelta;
use fleetlb_domain::instance::InstanceDelta;
use fleetlb_infrastructure::client::{InMemoryComputeClient, InventorySnapshot};
use helpers::*;
use std::collections::HashMap;

fn snapshot() -> InventorySnapshot {
    SnapshotBuilder::new()
        .fleet(FleetBuilder::new("vmss-a").prefix("aks-pool1-vmss").build())
        .instance(InstanceBuilder::new("vmss-a", "aks-pool1-vmss", 0).build())
        .interface(interface("vmss-a", "0", "10.0.0.4", Some("pip-0")))
        .public_ip(public_ip("vmss-a", "0", "pip-0", "20.1.2.3"))
        .build()
}

#[tokio::test]
async fn test_snapshot_survives_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.json");

    snapshot().save(&path).unwrap();
    let loaded = InventorySnapshot::from_file(&path).unwrap();

    assert_eq!(loaded, snapshot());
}

#[tokio::test]
async fn test_updates_are_visible_in_the_snapshot() {
    let client = InMemoryComputeClient::new(snapshot());
    let pools = vec![pool_id("kubernetes", "kubernetes")];

    client
        .update_instances_batch(
            RESOURCE_GROUP,
            "vmss-a",
            HashMap::from([(
                "0".to_string(),
                InstanceDelta {
                    location: "eastus".to_string(),
                    hardware_profile: None,
                    network_interface_configurations: nic_configs(&pools),
                },
            )]),
            "network_update",
            1,
        )
        .await
        .unwrap();
    client
        .update_fleet_template(
            RESOURCE_GROUP,
            "VMSS-A",
            FleetTemplateDelta {
                location: None,
                network_interface_configurations: nic_configs(&pools),
            },
        )
        .await
        .unwrap();

    let state = client.snapshot().await;
    assert_eq!(primary_pools(&state.instances[0].network_interface_configurations), pools);
    assert_eq!(primary_pools(&state.fleets[0].network_interface_configurations), pools);
    assert_eq!(state.fleets[0].location.as_deref(), Some("eastus"));
}

#[tokio::test]
async fn test_interface_and_public_ip_lookups() {
    let client = InMemoryComputeClient::new(snapshot());

    let nic = client
        .get_network_interface(RESOURCE_GROUP, "vmss-a", "0", NIC_NAME)
        .await
        .unwrap();
    assert_eq!(nic.ip_configurations.len(), 2);

    let pip = client
        .get_public_ip(RESOURCE_GROUP, "vmss-a", "0", NIC_NAME, IP_CONFIG_NAME, "pip-0")
        .await
        .unwrap();
    assert_eq!(pip.ip_address.as_deref(), Some("20.1.2.3"));

    assert!(client
        .get_network_interface(RESOURCE_GROUP, "vmss-a", "1", NIC_NAME)
        .await
        .is_err());
}
