// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::infrastructure::TestEnvironment;
use anyhow::Result;

fn file(path: &str) -> (String, String) {
    ("file".to_string(), path.to_string())
}

fn project(name: &str) -> (String, String) {
    ("project".to_string(), name.to_string())
}

/// A project with a unique, a shadowed and a duplicated source file.
fn fixture(test_name: &str) -> Result<TestEnvironment> {
    let env = TestEnvironment::new(test_name)?;
    env.create_source_files(&[
        ("app/main.c", "int main() {}\n"),
        ("app/config.h", "#define X 1\n"),
        ("app/drivers/config.h", "#define Y 1\n"),
        ("app/drivers/uart.c", "int uart;\n"),
        ("app/net/uart.c", "int uart;\n"),
    ])?;
    env.create_config(&env.projects_config(&["app"]))?;
    Ok(env)
}

#[test]
fn matching_from_file_to_file() -> Result<()> {
    let env = fixture("matching_from_file_to_file")?;
    env.create_build_log(
        "build.log",
        &[
            "gcc -c main.c",
            "main.c:3:5: error: expected ';' before '}' token",
            "missing.c:12: warning: implicit declaration",
            "uart.c:7:1: note: previous definition",
            "config.h:1: info: included from here",
        ],
    )?;

    let result = env.run(&["--input", "build.log", "--output", "markers.json"])?;
    result.assert_success()?;

    let markers = env.load_markers("markers.json")?;
    markers.assert_count(4)?;

    assert_eq!(markers.resource(0), file("/app/main.c"));
    assert_eq!(markers.get(0)["line"], 3);
    assert_eq!(markers.get(0)["column"], 5);
    assert_eq!(markers.get(0)["severity"], "error");
    assert_eq!(markers.get(0)["description"], "expected ';' before '}' token");

    assert_eq!(markers.resource(1), project("app"));
    assert_eq!(markers.get(1)["severity"], "warning");
    assert_eq!(markers.get(1)["description"], "missing.c implicit declaration");
    assert!(markers.get(1).get("column").is_none());

    assert_eq!(markers.resource(2), project("app"));
    assert_eq!(markers.get(2)["severity"], "info");
    assert_eq!(markers.get(2)["description"], "uart.c previous definition");
    assert_eq!(markers.get(2)["candidates"], serde_json::json!(["/app/drivers/uart.c", "/app/net/uart.c"]));

    // The copy in the project root wins over the nested one.
    assert_eq!(markers.resource(3), file("/app/config.h"));
    assert_eq!(markers.get(3)["severity"], "info");

    assert_no_temporary_files(&env)?;
    Ok(())
}

fn assert_no_temporary_files(env: &TestEnvironment) -> Result<()> {
    for entry in std::fs::read_dir(env.root())? {
        let name = entry?.file_name();
        assert!(!name.to_string_lossy().starts_with(".buildmatch-"), "left behind: {name:?}");
    }
    Ok(())
}

#[test]
fn matching_build_output_with_tmp_extension() -> Result<()> {
    let env = fixture("matching_build_output_with_tmp_extension")?;
    let lines = ["main.c:3:5: error: expected ';' before '}' token", "uart.c:7:1: note: previous definition"];
    let log = env.create_build_log("build.tmp", &lines)?;
    let content = std::fs::read_to_string(&log)?;

    let result = env.run(&["-i", "build.tmp", "-o", "build.json"])?;
    result.assert_success()?;

    env.load_markers("build.json")?.assert_count(2)?;
    assert_eq!(std::fs::read_to_string(&log)?, content);
    assert_no_temporary_files(&env)?;
    Ok(())
}

#[test]
fn matching_from_stdin_to_stdout() -> Result<()> {
    let env = fixture("matching_from_stdin_to_stdout")?;

    let result = env.run_with_stdin(&[], "drivers/uart.c:4:2: error: unknown type\nlinking...\n")?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(1)?;
    assert_eq!(markers.resource(0), file("/app/drivers/uart.c"));
    Ok(())
}

#[test]
fn matching_empty_build_output() -> Result<()> {
    let env = fixture("matching_empty_build_output")?;

    let result = env.run_with_stdin(&["--output", "markers.json"], "")?;
    result.assert_success()?;

    env.load_markers("markers.json")?.assert_count(0)?;
    Ok(())
}

#[test]
fn matching_follows_make_directories() -> Result<()> {
    let env = fixture("matching_follows_make_directories")?;
    let net = env.root().join("app/net");
    let drivers = env.root().join("app/drivers");

    let log = format!(
        "make[1]: Entering directory '{}'\n\
         uart.c:1: error: in net\n\
         make[1]: Leaving directory '{}'\n\
         make[1]: Entering directory '{}'\n\
         uart.c:2: error: in drivers\n\
         ../net/uart.c:3: error: back in net\n\
         make[1]: Leaving directory '{}'\n\
         uart.c:4: error: at top\n",
        net.display(),
        net.display(),
        drivers.display(),
        drivers.display()
    );
    let result = env.run_with_stdin(&[], &log)?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(4)?;
    assert_eq!(markers.resource(0), file("/app/net/uart.c"));
    assert_eq!(markers.resource(1), file("/app/drivers/uart.c"));
    assert_eq!(markers.resource(2), file("/app/net/uart.c"));
    assert_eq!(markers.resource(3), project("app"));
    Ok(())
}

#[test]
fn matching_relative_to_build_directory() -> Result<()> {
    let env = fixture("matching_relative_to_build_directory")?;

    let result = env.run_with_stdin(&["--build-dir", "app/drivers"], "../net/uart.c:9: warning: shadowed\n")?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(1)?;
    assert_eq!(markers.resource(0), file("/app/net/uart.c"));
    Ok(())
}

#[test]
fn matching_absolute_paths() -> Result<()> {
    let env = fixture("matching_absolute_paths")?;
    let inside = env.root().join("app/net/uart.c");
    let outside = env.root().join("elsewhere/uart.c");

    let log = format!("{}:5: error: inside\n{}:6: error: outside\n", inside.display(), outside.display());
    let result = env.run_with_stdin(&[], &log)?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(2)?;
    assert_eq!(markers.resource(0), file("/app/net/uart.c"));
    assert_eq!(markers.resource(1), project("app"));
    Ok(())
}

#[test]
fn matching_selects_project_in_multi_project_workspace() -> Result<()> {
    let env = TestEnvironment::new("matching_selects_project_in_multi_project_workspace")?;
    env.create_source_files(&[("app/main.c", "int main() {}\n"), ("lib/main.c", "int lib;\n")])?;
    env.create_config(&env.projects_config(&["app", "lib"]))?;

    let result = env.run_with_stdin(&["--project", "lib"], "main.c:1: error: x\n")?;
    result.assert_success()?;

    let markers = result.markers()?;
    markers.assert_count(1)?;
    assert_eq!(markers.resource(0), file("/lib/main.c"));
    Ok(())
}
