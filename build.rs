extern crate time;

use std::process::Command;

fn main() {
    write_git_rev();
    write_compile_date();
}

/// Expose the current git hash as ORIKATA_GIT_REV so version.rs can print it.
fn write_git_rev() {
    let commit_hash = Command::new("git")
        .args(&["rev-parse", "--short", "HEAD"])
        .output();
    let changes_in_working_dir = Command::new("git")
        .args(&["status", "--porcelain"])
        .output();

    let (commit_hash, changes_in_working_dir) = match (commit_hash, changes_in_working_dir) {
        (Ok(h), Ok(c)) => (h, c),
        _ => return,
    };
    if !commit_hash.status.success() || !changes_in_working_dir.status.success() {
        return;
    }

    let wip = if changes_in_working_dir.stdout.is_empty() { "" } else { "WIP " };
    let hash = String::from_utf8_lossy(&commit_hash.stdout);
    println!("cargo:rustc-env=ORIKATA_GIT_REV={}{}", wip, hash.trim());
}

fn write_compile_date() {
    let now = time::now_utc();
    let date = time::strftime("%Y-%m-%d", &now).unwrap();
    println!("cargo:rustc-env=ORIKATA_BUILD_DATE={}", date);
}
