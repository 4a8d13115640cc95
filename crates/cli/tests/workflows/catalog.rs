//! Learner and exercise management

use crate::common::TestStore;
use crate::trail;
use anyhow::Result;
use tempfile::TempDir;

#[test]
fn test_commands_outside_a_store_fail() -> Result<()> {
    let dir = TempDir::new()?;

    let result = trail!(dir.path(), "user", "list").assert_failure()?;
    assert!(result.contains_stderr("Not a Codetrail store"));
    Ok(())
}

#[test]
fn test_init_twice_fails() -> Result<()> {
    let store = TestStore::new()?;

    let result = trail!(store.path(), "init").assert_failure()?;
    assert!(result.contains_stderr("already initialized"));
    Ok(())
}

#[test]
fn test_commands_work_from_subdirectories() -> Result<()> {
    let store = TestStore::new()?;
    let nested = store.path().join("src").join("levels");
    std::fs::create_dir_all(&nested)?;

    let users = trail!(&nested, "user", "list", "--json").assert_success()?.json()?;
    assert_eq!(users[0]["username"], "ada");
    Ok(())
}

#[test]
fn test_user_names_are_validated() -> Result<()> {
    let store = TestStore::new()?;

    trail!(store.path(), "user", "add", "a").assert_failure()?;
    let dup = trail!(store.path(), "user", "add", "ada").assert_failure()?;
    assert!(dup.contains_stderr("already exists"));

    trail!(store.path(), "user", "add", "  grace  ").assert_success()?;
    let users = trail!(store.path(), "user", "list", "--json")
        .assert_success()?
        .json()?;
    let names: Vec<_> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["ada", "grace"]);
    Ok(())
}

#[test]
fn test_game_list() -> Result<()> {
    let store = TestStore::new()?;
    trail!(store.path(), "game", "add", "loops", "--description", "Repeat yourself")
        .assert_success()?;

    let games = trail!(store.path(), "game", "list", "--json")
        .assert_success()?
        .json()?;
    assert_eq!(games[0]["name"], "maze");
    assert_eq!(games[0]["display_name"], "The Maze");
    assert_eq!(games[1]["display_name"], "loops");
    assert_eq!(games[1]["description"], "Repeat yourself");

    let dup = trail!(store.path(), "game", "add", "maze").assert_failure()?;
    assert!(dup.contains_stderr("already exists"));
    Ok(())
}

#[test]
fn test_user_remove_deletes_history() -> Result<()> {
    let store = TestStore::new()?;
    let saved = store.save("robot.forward()", &[])?;

    let declined = trail!(store.path(), "user", "remove", "ada")
        .stdin("n\n")
        .assert_success()?;
    assert!(declined.contains_stdout("Aborted"));

    let removed = trail!(store.path(), "user", "remove", "ada", "-y").assert_success()?;
    assert!(removed.contains_stdout("1 versions deleted"));

    let id = saved.to_string();
    trail!(store.path(), "show", id.as_str()).assert_failure()?;
    let result = trail!(store.path(), "load", "ada", "maze").assert_failure()?;
    assert!(result.contains_stderr("Unknown user"));

    let stats = trail!(store.path(), "stats", "--json").assert_success()?.json()?;
    assert_eq!(stats["total_users"], 0);
    assert_eq!(stats["total_saves"], 0);

    // The name can be registered again
    trail!(store.path(), "user", "add", "ada").assert_success()?;
    Ok(())
}
