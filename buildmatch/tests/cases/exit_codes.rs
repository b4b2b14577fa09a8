// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::infrastructure::TestEnvironment;
use anyhow::Result;

#[test]
fn exit_code_for_help() -> Result<()> {
    let env = TestEnvironment::new("exit_code_for_help")?;

    let result = env.run(&["--help"])?;
    result.assert_success()?;
    assert!(result.stdout().contains("Usage: buildmatch"));
    assert!(result.stdout().contains("--build-dir"));
    Ok(())
}

#[test]
fn exit_code_for_invalid_argument() -> Result<()> {
    let env = TestEnvironment::new("exit_code_for_invalid_argument")?;

    let result = env.run(&["invalid_argument"])?;
    result.assert_failure()?;
    assert!(result.stderr().contains("error: unexpected argument"));
    Ok(())
}

#[test]
fn exit_code_for_missing_input() -> Result<()> {
    let env = TestEnvironment::new("exit_code_for_missing_input")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n")])?;
    env.create_config(&env.projects_config(&["app"]))?;

    let result = env.run(&["--input", "missing.log"])?;
    result.assert_failure()?;
    assert!(result.stderr().contains("Build output file not found"));
    Ok(())
}

#[test]
fn exit_code_for_unknown_project() -> Result<()> {
    let env = TestEnvironment::new("exit_code_for_unknown_project")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n")])?;
    env.create_config(&env.projects_config(&["app"]))?;

    let result = env.run(&["--project", "nope"])?;
    result.assert_failure()?;
    assert!(result.stderr().contains("Project not found in the workspace: nope"));
    Ok(())
}

#[test]
fn exit_code_for_unspecified_project() -> Result<()> {
    let env = TestEnvironment::new("exit_code_for_unspecified_project")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n"), ("lib/util.c", "int util;\n")])?;
    env.create_config(&env.projects_config(&["app", "lib"]))?;

    let result = env.run(&[])?;
    result.assert_failure()?;
    assert!(result.stderr().contains("use --project to select one of: app, lib"));
    Ok(())
}

#[test]
fn exit_code_for_missing_project_location() -> Result<()> {
    let env = TestEnvironment::new("exit_code_for_missing_project_location")?;
    env.create_config(&env.projects_config(&["gone"]))?;

    let result = env.run(&[])?;
    result.assert_failure()?;
    assert!(result.stderr().contains("Failed to scan the workspace"));
    Ok(())
}

#[test]
fn exit_code_for_unwritable_output() -> Result<()> {
    let env = TestEnvironment::new("exit_code_for_unwritable_output")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n")])?;
    env.create_config(&env.projects_config(&["app"]))?;

    let result = env.run(&["--output", "no/such/directory/markers.json"])?;
    result.assert_failure()?;
    assert!(result.stderr().contains("Failed to create output"));
    Ok(())
}

#[test]
fn exit_code_for_unresolved_references() -> Result<()> {
    // Diagnostics without a matching file are reported, but are not failures.
    let env = TestEnvironment::new("exit_code_for_unresolved_references")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n")])?;
    env.create_config(&env.projects_config(&["app"]))?;

    let result = env.run_with_stdin(&[], "nowhere.c:1: error: missing\n")?;
    result.assert_success()?;
    result.markers()?.assert_count(1)?;
    Ok(())
}
