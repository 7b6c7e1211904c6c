//! Prints the Machine CustomResourceDefinition as YAML.

use kube::CustomResourceExt;
use machine_api::Machine;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&Machine::crd())?);
    Ok(())
}
