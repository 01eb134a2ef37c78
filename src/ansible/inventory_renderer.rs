use serde_json::json;
use serde_yaml::{Mapping, Value};

use super::RenderError;
use super::group_name::ROOT_GROUP;
use super::inventory::Inventory;

/// Renders a static Ansible YAML inventory. Host variables are attached where
/// the host appears in the root group; every other group lists bare hosts.
pub fn render_yaml(inventory: &Inventory) -> Result<String, RenderError> {
    let mut yaml_inventory = Mapping::new();

    for (group_name, hostnames) in inventory.groups() {
        let mut hosts = Mapping::new();

        for hostname in hostnames {
            let vars = if group_name == ROOT_GROUP {
                host_variables(inventory, hostname)?
            } else {
                Value::Mapping(Mapping::new())
            };

            hosts.insert(Value::String(hostname.clone()), vars);
        }

        let mut group = Mapping::new();
        group.insert(Value::String("hosts".into()), Value::Mapping(hosts));

        yaml_inventory.insert(Value::String(group_name.clone()), Value::Mapping(group));
    }

    Ok(serde_yaml::to_string(&yaml_inventory)?)
}

/// Renders the document a dynamic inventory script emits for `--list`: one
/// object per group with its host list, plus `_meta.hostvars`.
pub fn render_json(inventory: &Inventory) -> Result<String, RenderError> {
    let mut document = serde_json::Map::new();

    for (group_name, hostnames) in inventory.groups() {
        document.insert(group_name.clone(), json!({ "hosts": hostnames }));
    }

    document.insert(
        "_meta".to_owned(),
        json!({ "hostvars": inventory.hostvars() }),
    );

    Ok(serde_json::to_string_pretty(&document)?)
}

fn host_variables(inventory: &Inventory, hostname: &str) -> Result<Value, RenderError> {
    match inventory.host_variables(hostname) {
        Some(vars) => Ok(serde_yaml::to_value(vars)?),
        None => Ok(Value::Mapping(Mapping::new())),
    }
}
