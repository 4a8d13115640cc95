//! Save, history, diff and restore through the binary

use crate::common::TestStore;
use crate::trail;
use anyhow::Result;

#[test]
fn test_load_falls_back_to_template() -> Result<()> {
    let store = TestStore::new()?;

    let result = trail!(store.path(), "load", "ada", "maze").assert_success()?;
    assert_eq!(result.stdout, TestStore::TEMPLATE);

    let json = trail!(store.path(), "load", "ada", "maze", "--json")
        .assert_success()?
        .json()?;
    assert_eq!(json["code"], TestStore::TEMPLATE);
    assert!(json["version_id"].is_null());
    Ok(())
}

#[test]
fn test_save_dedup_and_checkpoint() -> Result<()> {
    let store = TestStore::new()?;

    let first = store.save("print(1)", &[])?;

    let again = trail!(store.path(), "save", "ada", "maze", "--json")
        .stdin("print(1)")
        .assert_success()?
        .json()?;
    assert_eq!(again["message"], "No changes detected");
    assert_eq!(again["version_id"], first);

    let checkpoint = store.save("print(1)", &["--checkpoint", "-m", "works"])?;
    assert!(checkpoint > first);

    let log = trail!(store.path(), "log", "ada", "maze", "--json")
        .assert_success()?
        .json()?;
    assert_eq!(log["total"], 2);
    assert_eq!(log["versions"][0]["id"], checkpoint);
    assert_eq!(log["versions"][0]["is_checkpoint"], true);
    assert_eq!(log["versions"][0]["message"], "works");
    assert_eq!(log["versions"][1]["id"], first);
    assert_eq!(log["has_more"], false);
    Ok(())
}

#[test]
fn test_save_from_file_and_show() -> Result<()> {
    let store = TestStore::new()?;
    let program = store.path().join("solution.py");
    std::fs::write(&program, "robot.left()\nrobot.forward()\n")?;
    let program = program.to_string_lossy().to_string();

    let users = trail!(store.path(), "user", "list", "--json")
        .assert_success()?
        .json()?;
    let user_id = users[0]["id"].as_u64().unwrap().to_string();

    let saved = trail!(store.path(), "save", user_id.as_str(), "maze", program.as_str(), "--json")
        .assert_success()?
        .version_id()?;

    let id = saved.to_string();
    let shown = trail!(store.path(), "show", id.as_str(), "--json")
        .assert_success()?
        .json()?;
    assert_eq!(shown["code"], "robot.left()\nrobot.forward()\n");
    assert_eq!(shown["is_checkpoint"], false);

    let text = trail!(store.path(), "show", id.as_str()).assert_success()?;
    assert!(text.contains_stdout("robot.left()"));
    assert!(text.contains_stdout("The Maze"));
    Ok(())
}

#[test]
fn test_log_pages_with_cursor() -> Result<()> {
    let store = TestStore::new()?;
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(store.save(&format!("step({})", i), &[])?);
    }
    ids.reverse();

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let mut cmd = crate::common::cli::TrailCommand::new(store.path());
        cmd.args(&["log", "ada", "maze", "--limit", "2", "--json"]);
        if let Some(c) = &cursor {
            cmd.args(&["--cursor", c.as_str()]);
        }
        let page = cmd.assert_success()?.json()?;

        for version in page["versions"].as_array().into_iter().flatten() {
            seen.push(version["id"].as_u64().unwrap());
        }
        match page["next_cursor"].as_str() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    assert_eq!(seen, ids);
    Ok(())
}

#[test]
fn test_log_rejects_garbage_cursor() -> Result<()> {
    let store = TestStore::new()?;
    store.save("x", &[])?;

    let result = trail!(store.path(), "log", "ada", "maze", "--cursor", "not-a-cursor")
        .assert_failure()?;
    assert!(result.contains_stderr("cursor"));
    Ok(())
}

#[test]
fn test_restore_then_diff() -> Result<()> {
    let store = TestStore::new()?;

    let v1 = store.save("print(1)\n", &[])?;
    let v2 = store.save("print(2)\n", &["--checkpoint", "-m", "try"])?;

    let v1_arg = v1.to_string();
    let restored = trail!(store.path(), "restore", "ada", "maze", v1_arg.as_str(), "--json")
        .assert_success()?
        .json()?;
    assert_eq!(restored["code"], "print(1)\n");
    let v3 = restored["version_id"].as_u64().unwrap();

    let loaded = trail!(store.path(), "load", "ada", "maze").assert_success()?;
    assert_eq!(loaded.stdout, "print(1)\n");

    let v3_arg = v3.to_string();
    let same = trail!(store.path(), "diff", v1_arg.as_str(), v3_arg.as_str(), "--json")
        .assert_success()?
        .json()?;
    let blocks = same["blocks"].as_array().unwrap();
    assert!(blocks.iter().all(|b| b["op"] == "equal"));

    let v2_arg = v2.to_string();
    let changed = trail!(store.path(), "diff", v1_arg.as_str(), v2_arg.as_str(), "--json")
        .assert_success()?
        .json()?;
    assert_eq!(changed["stats"]["inserted"], 1);
    assert_eq!(changed["stats"]["deleted"], 1);
    assert_eq!(changed["diff"][0], format!("--- Version {}", v1));

    let log = trail!(store.path(), "log", "ada", "maze", "--json")
        .assert_success()?
        .json()?;
    assert_eq!(log["total"], 3);
    assert_eq!(
        log["versions"][0]["message"],
        format!("Restored from version {}", v1)
    );
    Ok(())
}

#[test]
fn test_missing_version_fails() -> Result<()> {
    let store = TestStore::new()?;

    let result = trail!(store.path(), "show", "987654").assert_failure()?;
    assert!(result.contains_stderr("not found"));
    Ok(())
}

#[test]
fn test_stats_counts_saves_by_kind() -> Result<()> {
    let store = TestStore::new()?;
    trail!(store.path(), "user", "add", "grace").assert_success()?;
    trail!(store.path(), "game", "add", "loops").assert_success()?;

    store.save("a", &[])?;
    store.save("a", &[])?;
    store.save("b", &["--checkpoint"])?;
    trail!(store.path(), "save", "grace", "loops")
        .stdin("for i in range(3): pass")
        .assert_success()?;

    let stats = trail!(store.path(), "stats", "--json")
        .assert_success()?
        .json()?;
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["total_games"], 2);
    assert_eq!(stats["total_saves"], 3);
    assert_eq!(stats["checkpoints"], 1);
    assert_eq!(stats["auto_saves"], 2);
    assert_eq!(stats["users"][0]["username"], "ada");
    assert_eq!(stats["users"][0]["saves"], 2);
    assert_eq!(stats["games"][1]["name"], "loops");
    assert_eq!(stats["games"][1]["saves"], 1);

    let text = trail!(store.path(), "stats").assert_success()?;
    assert!(text.contains_stdout("Checkpoints"));
    Ok(())
}

#[test]
fn test_history_spans_games() -> Result<()> {
    let store = TestStore::new()?;
    trail!(store.path(), "game", "add", "loops", "--display-name", "Loops").assert_success()?;

    for i in 0..7 {
        store.save(&format!("step({})", i), &[])?;
    }
    trail!(store.path(), "save", "ada", "loops", "-c", "-m", "first loop")
        .stdin("while True: break")
        .assert_success()?;

    let history = trail!(store.path(), "history", "ada", "--json")
        .assert_success()?
        .json()?;
    assert_eq!(history["username"], "ada");
    let games = history["games"].as_array().unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0]["display_name"], "The Maze");
    assert_eq!(games[0]["saves"], 7);
    assert_eq!(games[0]["versions"].as_array().unwrap().len(), 5);
    assert_eq!(games[1]["checkpoints"], 1);
    assert_eq!(games[1]["versions"][0]["message"], "first loop");

    let text = trail!(store.path(), "history", "ada").assert_success()?;
    assert!(text.contains_stdout("and 2 more"));

    trail!(store.path(), "history", "nobody").assert_failure()?;
    Ok(())
}
