//! `trail config` round trips and their effect on the store

use crate::common::TestStore;
use crate::trail;
use anyhow::Result;

#[test]
fn test_config_get_set() -> Result<()> {
    let store = TestStore::new()?;

    let value = trail!(store.path(), "config", "get", "max_page_size").assert_success()?;
    assert_eq!(value.stdout.trim(), "50");

    // default_page_size (20) may not exceed the page bound
    trail!(store.path(), "config", "set", "max_page_size", "2").assert_failure()?;
    trail!(store.path(), "config", "set", "default_page_size", "2").assert_success()?;
    trail!(store.path(), "config", "set", "max_page_size", "2").assert_success()?;
    let value = trail!(store.path(), "config", "get", "max_page_size").assert_success()?;
    assert_eq!(value.stdout.trim(), "2");

    trail!(store.path(), "config", "set", "max_page_size", "0").assert_failure()?;
    trail!(store.path(), "config", "set", "no_such_key", "1").assert_failure()?;
    Ok(())
}

#[test]
fn test_config_limits_apply_to_commands() -> Result<()> {
    let store = TestStore::new()?;
    trail!(store.path(), "config", "set", "max_content_bytes", "8").assert_success()?;

    store.save("12345678", &[])?;
    let result = trail!(store.path(), "save", "ada", "maze")
        .stdin("123456789")
        .assert_failure()?;
    assert!(result.contains_stderr("limit"));
    Ok(())
}

#[test]
fn test_config_path_and_example() -> Result<()> {
    let store = TestStore::new()?;

    let path = trail!(store.path(), "config", "path").assert_success()?;
    assert!(path.stdout.trim().ends_with("config.toml"));

    let example = trail!(store.path(), "config", "example").assert_success()?;
    assert!(example.contains_stdout("max_content_bytes"));
    Ok(())
}
