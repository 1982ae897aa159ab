//! `tasksmith validate`: load and check a manifest without running it.

use anyhow::Context;

pub fn run(config_path: &str) -> anyhow::Result<i32> {
    let validated = tasksmith_config::load_and_validate(config_path)
        .with_context(|| format!("failed to load manifest {config_path:?}"))?;

    println!("manifest is valid");
    println!("tasks: {}", validated.tasks.len());
    let mut names: Vec<&String> = validated.tasks.keys().collect();
    names.sort();
    for name in names {
        let task = &validated.tasks[name];
        let deps = if task.requires.is_empty() {
            String::new()
        } else {
            format!(" (requires: {})", task.requires.join(", "))
        };
        println!("  - {name} [{}]{deps}", task.workflow);
    }

    Ok(0)
}
