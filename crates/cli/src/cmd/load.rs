//! Print the current program of a timeline

use crate::util::{self, Repo};
use anyhow::Result;
use serde_json::json;
use std::path::Path;
use trail_core::Current;

pub fn run(dir: Option<&Path>, user: &str, game: &str, json: bool) -> Result<()> {
    let repo = Repo::open(dir)?;
    let (_, _, key) = repo.resolve_key(user, game)?;

    let current = repo.journal.load(key)?;

    if json {
        let body = match &current {
            Current::Saved(version) => json!({
                "code": version.content,
                "version_id": version.id,
                "created_at": util::format_iso_time(version.created_at),
            }),
            Current::Template(template) => json!({
                "code": template,
                "version_id": null,
                "created_at": null,
            }),
        };
        return util::print_json(&body);
    }

    // Program text goes to stdout untouched so it can be piped
    print!("{}", current.content());
    if let Some(version) = current.version() {
        tracing::debug!(version = %version.id, "loaded head");
    } else {
        tracing::debug!(key = %key, "no history, printed template");
    }
    Ok(())
}
