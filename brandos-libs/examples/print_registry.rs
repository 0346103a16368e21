// Example: load a registry declaration (or the built-in one) and print it
use brandos_libs::{load_registry_config, RegistryConfig, WorkflowValidator};

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match load_registry_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("✗ Failed to load registry: {}", e);
                std::process::exit(1);
            }
        },
        None => RegistryConfig::builtin(),
    };

    let validator = match WorkflowValidator::from_config(&config) {
        Ok(validator) => validator,
        Err(e) => {
            eprintln!("✗ Inconsistent registry: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Registry loaded!");
    println!("\n  Port types:");
    for port in validator.ports().types() {
        println!("    - {} ({}) accepts {:?}", port.key, port.label, port.accepts);
    }

    println!("\n  Nodes:");
    for node in validator.catalog().all_nodes() {
        let cost = node.cost.map(|c| format!("{} credits", c)).unwrap_or_else(|| "free".to_string());
        let core = if node.is_core { " [core]" } else { "" };
        println!("    - {} [{}] {}{}", node.label, node.category, cost, core);
    }
}
