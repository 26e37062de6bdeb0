//! `google_compute_instance`

use cai2hcl_model::{links, AssetRecord, Fields, JsonMap, JsonValue, OutputBlock, Value};
use serde_json::json;

use super::flatten::user_labels;
use super::iam::PolicyTarget;
use super::{required_str, TransformContext};
use crate::error::TransformError;

/// Block kind and transform id
pub const KIND: &str = "google_compute_instance";

/// Asset type of instance records
pub const ASSET: &str = "compute.googleapis.com/Instance";

type Object = JsonMap<String, JsonValue>;

/// Convert instance records, one block each
///
/// # Errors
///
/// Returns [`TransformError::MissingIdentity`] for an instance without
/// `name`, or a normalization failure in strict mode.
pub fn convert(
    ctx: &TransformContext<'_>,
    records: &[&AssetRecord],
) -> Result<Vec<OutputBlock>, TransformError> {
    let mut blocks = Vec::with_capacity(records.len());
    for record in records {
        let name = required_str(record, "name")?;
        let data = instance_config(record);
        let body = ctx.normalize(record, KIND, &data)?;
        blocks.push(ctx.block(record, KIND, name, body)?);
    }
    Ok(blocks)
}

/// Policy identity of an instance record
///
/// # Errors
///
/// Returns [`TransformError::MissingIdentity`] if the name, zone or project
/// cannot be determined.
pub fn policy_target(record: &AssetRecord) -> Result<PolicyTarget, TransformError> {
    let name = required_str(record, "name")?;
    let zone = zone(record).ok_or_else(|| TransformError::missing_identity(record.name(), "zone"))?;
    let project = links::parse_field_value(record.name(), "projects")
        .ok_or_else(|| TransformError::missing_identity(record.name(), "project"))?;
    let identity: Fields = [
        ("project", Value::from(project)),
        ("zone", Value::from(zone)),
        ("instance_name", Value::from(name)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    Ok(PolicyTarget::new(format!("{project}_{zone}_{name}"), identity))
}

fn instance_config(record: &AssetRecord) -> Object {
    let props = record.properties();
    let mut data = Object::new();
    for (from, to) in [
        ("name", "name"),
        ("description", "description"),
        ("canIpForward", "can_ip_forward"),
        ("minCpuPlatform", "min_cpu_platform"),
        ("deletionProtection", "deletion_protection"),
        ("hostname", "hostname"),
        ("labelFingerprint", "label_fingerprint"),
    ] {
        copy(props, from, &mut data, to);
    }
    if let Some(machine_type) = record.property_str("machineType") {
        data.insert(
            "machine_type".into(),
            links::resource_name_from_self_link(machine_type).into(),
        );
    }
    if let Some(zone) = zone(record) {
        data.insert("zone".into(), zone.into());
    }
    if let Some(labels) = user_labels(record.property("labels")) {
        data.insert("labels".into(), labels);
    }
    if let Some(tags) = props.get("tags").and_then(JsonValue::as_object) {
        if let Some(JsonValue::Array(items)) = tags.get("items") {
            let mut items: Vec<&str> = items.iter().filter_map(JsonValue::as_str).collect();
            items.sort_unstable();
            data.insert("tags".into(), json!(items));
        }
        copy(tags, "fingerprint", &mut data, "tags_fingerprint");
    }
    if let Some(metadata) = props.get("metadata").and_then(JsonValue::as_object) {
        copy(metadata, "fingerprint", &mut data, "metadata_fingerprint");
        let entries: Object = objects(metadata.get("items"))
            .filter_map(|item| {
                let key = item.get("key")?.as_str()?;
                Some((key.to_string(), item.get("value")?.clone()))
            })
            .collect();
        data.insert("metadata".into(), JsonValue::Object(entries));
    }

    // Only the first boot disk can be the boot_disk block; later ones attach.
    let (mut boot, mut scratch, mut attached) = (None, Vec::new(), Vec::new());
    for disk in objects(props.get("disks")) {
        if flag(disk, "boot") && boot.is_none() {
            boot = Some(boot_disk(disk));
        } else if disk.get("type").and_then(JsonValue::as_str) == Some("SCRATCH") {
            let mut out = Object::new();
            copy(disk, "interface", &mut out, "interface");
            scratch.push(JsonValue::Object(out));
        } else {
            attached.push(attached_disk(disk));
        }
    }
    if let Some(boot) = boot {
        data.insert("boot_disk".into(), boot);
    }
    for (key, disks) in [("scratch_disk", scratch), ("attached_disk", attached)] {
        if !disks.is_empty() {
            data.insert(key.into(), JsonValue::Array(disks));
        }
    }

    let interfaces: Vec<JsonValue> = objects(props.get("networkInterfaces"))
        .map(network_interface)
        .collect();
    data.insert("network_interface".into(), JsonValue::Array(interfaces));

    let accounts: Vec<JsonValue> = objects(props.get("serviceAccounts"))
        .map(|account| {
            let mut out = Object::new();
            copy(account, "email", &mut out, "email");
            copy(account, "scopes", &mut out, "scopes");
            JsonValue::Object(out)
        })
        .collect();
    data.insert("service_account".into(), JsonValue::Array(accounts));

    let accelerators: Vec<JsonValue> = objects(props.get("guestAccelerators"))
        .map(|accelerator| {
            let mut out = Object::new();
            copy(accelerator, "acceleratorCount", &mut out, "count");
            if let Some(kind) = accelerator.get("acceleratorType").and_then(JsonValue::as_str) {
                out.insert("type".into(), links::resource_name_from_self_link(kind).into());
            }
            JsonValue::Object(out)
        })
        .collect();
    data.insert("guest_accelerator".into(), JsonValue::Array(accelerators));

    if let Some(scheduling) = props.get("scheduling").and_then(JsonValue::as_object) {
        data.insert("scheduling".into(), scheduling_block(scheduling));
    }
    if let Some(shielded) = props.get("shieldedInstanceConfig").and_then(JsonValue::as_object) {
        let mut out = Object::new();
        copy(shielded, "enableSecureBoot", &mut out, "enable_secure_boot");
        copy(shielded, "enableVtpm", &mut out, "enable_vtpm");
        copy(shielded, "enableIntegrityMonitoring", &mut out, "enable_integrity_monitoring");
        data.insert("shielded_instance_config".into(), JsonValue::Object(out));
    }
    if let Some(display) = props.get("displayDevice").and_then(JsonValue::as_object) {
        copy(display, "enableDisplay", &mut data, "enable_display");
    }
    data
}

fn boot_disk(disk: &Object) -> JsonValue {
    let mut out = Object::new();
    copy(disk, "autoDelete", &mut out, "auto_delete");
    copy(disk, "deviceName", &mut out, "device_name");
    copy(disk, "source", &mut out, "source");
    copy(disk, "mode", &mut out, "mode");
    encryption(disk, &mut out);
    if let Some(params) = disk.get("initializeParams").and_then(JsonValue::as_object) {
        let mut init = Object::new();
        copy(params, "diskSizeGb", &mut init, "size");
        if let Some(disk_type) = params.get("diskType").and_then(JsonValue::as_str) {
            let name = links::parse_field_value(disk_type, "diskTypes")
                .unwrap_or_else(|| links::resource_name_from_self_link(disk_type));
            init.insert("type".into(), name.into());
        }
        copy(params, "sourceImage", &mut init, "image");
        copy(params, "labels", &mut init, "labels");
        out.insert("initialize_params".into(), JsonValue::Object(init));
    }
    JsonValue::Object(out)
}

fn attached_disk(disk: &Object) -> JsonValue {
    let mut out = Object::new();
    copy(disk, "source", &mut out, "source");
    copy(disk, "deviceName", &mut out, "device_name");
    copy(disk, "mode", &mut out, "mode");
    encryption(disk, &mut out);
    JsonValue::Object(out)
}

fn encryption(disk: &Object, out: &mut Object) {
    let Some(key) = disk.get("diskEncryptionKey").and_then(JsonValue::as_object) else {
        return;
    };
    copy(key, "rawKey", out, "disk_encryption_key_raw");
    copy(key, "sha256", out, "disk_encryption_key_sha256");
    if let Some(kms) = key.get("kmsKeyName").and_then(JsonValue::as_str) {
        out.insert("kms_key_self_link".into(), links::strip_key_version(kms).into());
    }
}

fn network_interface(nic: &Object) -> JsonValue {
    let mut out = Object::new();
    copy(nic, "networkIP", &mut out, "network_ip");
    for key in ["network", "subnetwork"] {
        if let Some(link) = nic.get(key).and_then(JsonValue::as_str) {
            out.insert(key.into(), links::self_link_to_v1(link).into());
        }
    }
    copy(nic, "nicType", &mut out, "nic_type");
    copy(nic, "stackType", &mut out, "stack_type");
    copy(nic, "queueCount", &mut out, "queue_count");
    copy(nic, "name", &mut out, "name");

    let access: Vec<JsonValue> = objects(nic.get("accessConfigs"))
        .map(|config| {
            let mut item = Object::new();
            copy(config, "natIP", &mut item, "nat_ip");
            copy(config, "networkTier", &mut item, "network_tier");
            copy(config, "publicPtrDomainName", &mut item, "public_ptr_domain_name");
            JsonValue::Object(item)
        })
        .collect();
    out.insert("access_config".into(), JsonValue::Array(access));

    let ipv6: Vec<JsonValue> = objects(nic.get("ipv6AccessConfigs"))
        .map(|config| {
            let mut item = Object::new();
            copy(config, "networkTier", &mut item, "network_tier");
            copy(config, "publicPtrDomainName", &mut item, "public_ptr_domain_name");
            JsonValue::Object(item)
        })
        .collect();
    out.insert("ipv6_access_config".into(), JsonValue::Array(ipv6));

    let aliases: Vec<JsonValue> = objects(nic.get("aliasIpRanges"))
        .map(|range| {
            let mut item = Object::new();
            copy(range, "ipCidrRange", &mut item, "ip_cidr_range");
            copy(range, "subnetworkRangeName", &mut item, "subnetwork_range_name");
            JsonValue::Object(item)
        })
        .collect();
    out.insert("alias_ip_range".into(), JsonValue::Array(aliases));
    JsonValue::Object(out)
}

fn scheduling_block(scheduling: &Object) -> JsonValue {
    let mut out = Object::new();
    copy(scheduling, "automaticRestart", &mut out, "automatic_restart");
    copy(scheduling, "preemptible", &mut out, "preemptible");
    copy(scheduling, "onHostMaintenance", &mut out, "on_host_maintenance");
    copy(scheduling, "minNodeCpus", &mut out, "min_node_cpus");
    copy(scheduling, "provisioningModel", &mut out, "provisioning_model");
    let affinities: Vec<JsonValue> = objects(scheduling.get("nodeAffinities"))
        .map(|affinity| {
            let mut item = Object::new();
            copy(affinity, "key", &mut item, "key");
            copy(affinity, "operator", &mut item, "operator");
            copy(affinity, "values", &mut item, "values");
            JsonValue::Object(item)
        })
        .collect();
    out.insert("node_affinities".into(), JsonValue::Array(affinities));
    JsonValue::Object(out)
}

fn zone(record: &AssetRecord) -> Option<&str> {
    record
        .property_str("zone")
        .map(links::resource_name_from_self_link)
        .filter(|z| !z.is_empty())
        .or_else(|| links::parse_field_value(record.name(), "zones"))
}

fn objects(value: Option<&JsonValue>) -> impl Iterator<Item = &Object> {
    value
        .and_then(JsonValue::as_array)
        .into_iter()
        .flatten()
        .filter_map(JsonValue::as_object)
}

fn flag(object: &Object, key: &str) -> bool {
    object.get(key).and_then(JsonValue::as_bool).unwrap_or(false)
}

fn copy(from: &Object, key: &str, to: &mut Object, as_key: &str) {
    if let Some(value) = from.get(key) {
        to.insert(as_key.to_string(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::builtin_schemas;
    use cai2hcl_hcl::{render, Normalizer};

    const NAME: &str = "//compute.googleapis.com/projects/my-proj/zones/us-central1-a/instances/vm-1";

    fn instance() -> AssetRecord {
        AssetRecord::new(NAME, ASSET).with_data(json!({
            "name": "vm-1",
            "machineType": "https://www.googleapis.com/compute/v1/projects/my-proj/zones/us-central1-a/machineTypes/e2-medium",
            "zone": "https://www.googleapis.com/compute/v1/projects/my-proj/zones/us-central1-a",
            "status": "RUNNING",
            "tags": {"items": ["web", "allow-ssh"], "fingerprint": "abc"},
            "labels": {"team": "core", "goog-terraform-provisioned": "true"},
            "disks": [
                {
                    "boot": true,
                    "autoDelete": true,
                    "deviceName": "persistent-disk-0",
                    "source": "https://www.googleapis.com/compute/v1/projects/my-proj/zones/us-central1-a/disks/vm-1",
                    "mode": "READ_WRITE",
                    "type": "PERSISTENT",
                    "diskEncryptionKey": {
                        "kmsKeyName": "projects/my-proj/locations/global/keyRings/r/cryptoKeys/k/cryptoKeyVersions/1"
                    }
                },
                {"type": "SCRATCH", "interface": "NVME"},
                {"source": "https://www.googleapis.com/compute/v1/projects/my-proj/zones/us-central1-a/disks/data", "mode": "READ_ONLY", "type": "PERSISTENT"}
            ],
            "networkInterfaces": [{
                "network": "https://www.googleapis.com/compute/beta/projects/my-proj/global/networks/default",
                "networkIP": "10.0.0.2",
                "accessConfigs": [{"natIP": "34.1.2.3", "networkTier": "PREMIUM", "type": "ONE_TO_ONE_NAT"}]
            }],
            "serviceAccounts": [{"email": "sa@my-proj.iam.gserviceaccount.com", "scopes": ["https://www.googleapis.com/auth/cloud-platform"]}],
            "scheduling": {"automaticRestart": true, "onHostMaintenance": "MIGRATE", "preemptible": false},
            "metadata": {"fingerprint": "fp", "items": [{"key": "enable-oslogin", "value": "TRUE"}]}
        }))
    }

    fn run(record: &AssetRecord) -> OutputBlock {
        let schemas = builtin_schemas();
        let ctx = TransformContext::new(KIND, &schemas, Normalizer::best_effort());
        convert(&ctx, &[record]).unwrap().remove(0)
    }

    #[test]
    fn disks_are_split() {
        let block = run(&instance());
        assert_eq!(block.labels, vec!["google_compute_instance", "vm-1"]);
        let boot = block.body.get("boot_disk").unwrap();
        assert_eq!(
            boot.get("kms_key_self_link").and_then(Value::as_str),
            Some("projects/my-proj/locations/global/keyRings/r/cryptoKeys/k")
        );
        let scratch = block.body.get("scratch_disk").and_then(Value::as_list).unwrap();
        assert_eq!(scratch.len(), 1);
        let attached = block.body.get("attached_disk").and_then(Value::as_list).unwrap();
        assert_eq!(attached[0].get("mode").and_then(Value::as_str), Some("READ_ONLY"));
    }

    #[test]
    fn second_boot_disk_is_attached() {
        let record = AssetRecord::new(NAME, ASSET).with_data(json!({
            "name": "vm-1",
            "disks": [
                {"boot": true, "source": "https://www.googleapis.com/compute/v1/projects/my-proj/zones/us-central1-a/disks/first"},
                {"boot": true, "source": "https://www.googleapis.com/compute/v1/projects/my-proj/zones/us-central1-a/disks/second"}
            ]
        }));
        let block = run(&record);
        let boot = block.body.get("boot_disk").unwrap();
        assert!(boot.get("source").and_then(Value::as_str).unwrap().ends_with("/disks/first"));
        let attached = block.body.get("attached_disk").and_then(Value::as_list).unwrap();
        assert_eq!(attached.len(), 1);
        assert!(attached[0].get("source").and_then(Value::as_str).unwrap().ends_with("/disks/second"));
    }

    #[test]
    fn names_and_links() {
        let block = run(&instance());
        assert_eq!(block.body.get("machine_type").and_then(Value::as_str), Some("e2-medium"));
        assert_eq!(block.body.get("zone").and_then(Value::as_str), Some("us-central1-a"));
        let nic = &block.body.get("network_interface").and_then(Value::as_list).unwrap()[0];
        assert_eq!(
            nic.get("network").and_then(Value::as_str),
            Some("https://www.googleapis.com/compute/v1/projects/my-proj/global/networks/default")
        );
        assert_eq!(
            block.body.get("tags"),
            Some(&Value::string_list(["allow-ssh", "web"]))
        );
        assert!(block.body.get("status").is_none());
    }

    #[test]
    fn renders_nested_blocks() {
        let text = render(&[run(&instance())]).unwrap();
        assert!(text.contains("  boot_disk {\n"));
        assert!(text.contains("  network_interface {\n    network = "));
        assert!(text.contains("    access_config {\n      nat_ip = \"34.1.2.3\"\n"));
        assert!(text.contains("    enable-oslogin = \"TRUE\"\n"));
        assert!(!text.contains("goog-terraform-provisioned"));
    }

    #[test]
    fn zone_falls_back_to_asset_name() {
        let record = AssetRecord::new(NAME, ASSET).with_data(json!({"name": "vm-1"}));
        let block = run(&record);
        assert_eq!(block.body.get("zone").and_then(Value::as_str), Some("us-central1-a"));
    }

    #[test]
    fn target_identity() {
        let target = policy_target(&instance()).unwrap();
        assert_eq!(target.id(), "my-proj_us-central1-a_vm-1");
        assert_eq!(target.identity().get("instance_name"), Some(&Value::from("vm-1")));
    }

    #[test]
    fn missing_name() {
        let schemas = builtin_schemas();
        let ctx = TransformContext::new(KIND, &schemas, Normalizer::best_effort());
        let record = AssetRecord::new(NAME, ASSET).with_data(json!({"zone": "z"}));
        assert!(matches!(
            convert(&ctx, &[&record]),
            Err(TransformError::MissingIdentity { .. })
        ));
    }
}
