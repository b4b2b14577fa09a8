// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::infrastructure::TestEnvironment;
use anyhow::Result;

#[test]
fn config_with_unsupported_schema() -> Result<()> {
    let env = TestEnvironment::new("config_with_unsupported_schema")?;
    env.create_config("schema: 4.0\n")?;

    let result = env.run(&[])?;
    result.assert_failure()?;
    assert!(result.stderr().contains("Unsupported schema version: 4.0"));
    Ok(())
}

#[test]
fn config_with_relative_project_location() -> Result<()> {
    let env = TestEnvironment::new("config_with_relative_project_location")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n")])?;
    env.create_config("schema: 1.0\nworkspace:\n  projects:\n    - name: app\n      location: app\n")?;

    let result = env.run(&[])?;
    result.assert_failure()?;
    assert!(result.stderr().contains("Configuration validation failed"));
    Ok(())
}

#[test]
fn config_from_explicit_path() -> Result<()> {
    let env = TestEnvironment::new("config_from_explicit_path")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n")])?;
    let config = env.create_config(&env.projects_config(&["app"]))?;
    let renamed = env.root().join("settings.yml");
    std::fs::rename(&config, &renamed)?;

    let result =
        env.run_with_stdin(&["--config", "settings.yml", "--project", "app"], "main.c:1: error: x\n")?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(1)?;
    assert_eq!(markers.resource(0), ("file".to_string(), "/app/main.c".to_string()));
    Ok(())
}

#[test]
fn config_missing_uses_working_directory() -> Result<()> {
    // Without a configuration the working directory is the only project.
    let env = TestEnvironment::new("config_missing_uses_working_directory")?;
    env.create_source_files(&[("src/main.c", "int main() {}\n")])?;

    let result = env.run_with_stdin(&["--project", "demo"], "src/main.c:2:1: warning: unused\n")?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(1)?;
    assert_eq!(markers.resource(0), ("file".to_string(), "/demo/src/main.c".to_string()));
    Ok(())
}

#[test]
fn config_with_case_insensitive_matching() -> Result<()> {
    let env = TestEnvironment::new("config_with_case_insensitive_matching")?;
    env.create_source_files(&[("app/Main.c", "int main() {}\n")])?;
    let mut config = env.projects_config(&["app"]);
    config.push_str("matching:\n  case: insensitive\n");
    env.create_config(&config)?;

    let result = env.run_with_stdin(&[], "MAIN.C:1: error: x\n")?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(1)?;
    assert_eq!(markers.resource(0), ("file".to_string(), "/app/Main.c".to_string()));
    Ok(())
}

#[test]
fn config_with_linked_folder() -> Result<()> {
    let env = TestEnvironment::new("config_with_linked_folder")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n"), ("vendor/hal/gpio.c", "int gpio;\n")])?;
    let mut config = env.projects_config(&["app"]);
    config.push_str(&format!(
        "      links:\n        - path: external/hal\n          target: '{}'\n",
        env.root().join("vendor/hal").display()
    ));
    env.create_config(&config)?;

    let result = env.run_with_stdin(&[], "gpio.c:10:3: error: undeclared\n")?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(1)?;
    assert_eq!(markers.resource(0), ("file".to_string(), "/app/external/hal/gpio.c".to_string()));
    Ok(())
}
