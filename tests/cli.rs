#![allow(deprecated)]

use assert_cmd::Command;
use httpmock::Method::GET;
use httpmock::MockServer;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn agilemeter(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("agilemeter").expect("binary should compile");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("GH_TOKEN")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn repo_json(name: &str, created_at: &str) -> serde_json::Value {
    json!({
        "full_name": format!("acme/{name}"),
        "created_at": created_at,
        "stargazers_count": 4,
        "forks_count": 1,
        "watchers_count": 2
    })
}

fn mock_repository(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/commits");
        then.status(200).json_body(json!([
            {"sha": "s1", "commit": {"message": "feat: add search endpoint",
                "author": {"date": "2024-09-02T10:00:00Z"}}},
            {"sha": "s2", "commit": {"message": "fix: handle empty query",
                "author": {"date": "2024-09-09T10:00:00Z"}}}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/issues");
        then.status(200).json_body(json!([
            {"number": 1, "title": "Search is slow", "state": "open",
             "created_at": "2024-09-03T10:00:00Z", "user": {"login": "dev"}},
            {"number": 2, "title": "PR shadow", "state": "closed",
             "created_at": "2024-09-04T10:00:00Z", "user": {"login": "ops"},
             "pull_request": {}}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/pulls");
        then.status(200).json_body(json!([
            {"number": 2, "title": "Add search", "state": "closed", "merged": true,
             "created_at": "2024-09-04T10:00:00Z", "user": {"login": "ops"}}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/contents");
        then.status(200).json_body(json!([
            {"name": "README.md", "path": "README.md", "type": "file"},
            {"name": "tests", "path": "tests", "type": "dir"}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/contents/tests");
        then.status(200).json_body(json!([
            {"name": "search.rs", "path": "tests/search.rs", "type": "file"}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/readme");
        then.status(200).body("# API\n\nSearch service.");
    });
}

#[test]
fn help_lists_subcommands() {
    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repos"))
        .stdout(predicate::str::contains("user"));
}

#[test]
fn version_reports_package_version() {
    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn repos_requires_org() {
    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .args(["repos", "--created-since", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--org"));
}

#[test]
fn invalid_date_is_a_runtime_failure() {
    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .args(["repos", "--org", "acme", "--created-since", "01/01/2024"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn user_without_token_is_rejected() {
    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .args(["user", "--repo", "acme/api", "--user", "dev", "--since", "2024-08-01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("GH_TOKEN"));
}

#[test]
fn user_rejects_malformed_repo_slug() {
    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .args(["user", "--repo", "acme", "--user", "dev", "--since", "2024-08-01"])
        .arg("--token")
        .arg("gh-token")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("acme"));
}

#[test]
fn repos_without_matches_exits_with_one() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/repos");
        then.status(200)
            .json_body(json!([repo_json("legacy", "2019-01-01T00:00:00Z")]));
    });

    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .args(["repos", "--org", "acme", "--created-since", "2024-01-01", "--disable-ai"])
        .arg("--api-url")
        .arg(server.base_url())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no repositories in acme"));
    assert!(!home.path().join("repos-analysis.xlsx").exists());
}

#[test]
fn repos_writes_json_report_for_recent_repositories() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/repos");
        then.status(200).json_body(json!([
            repo_json("api", "2024-06-01T00:00:00Z"),
            repo_json("legacy", "2019-01-01T00:00:00Z")
        ]));
    });
    mock_repository(&server);

    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .args(["repos", "--org", "acme", "--created-since", "2024-01-01", "--disable-ai"])
        .args(["--format", "json", "--out", "report.json", "--workers", "2"])
        .arg("--api-url")
        .arg(server.base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("Repositories found: 1"))
        .stdout(predicate::str::contains("Repositories analyzed: 1"));
    listing.assert();

    let written = fs::read_to_string(home.path().join("report.json")).expect("report written");
    let report: serde_json::Value = serde_json::from_str(&written).expect("valid json");
    assert_eq!(report["metadata"]["org"], "acme");
    assert_eq!(report["metadata"]["total_repos"], 1);
    let repo = &report["repositories"][0];
    assert_eq!(repo["repo_name"], "acme/api");
    assert_eq!(repo["collaboration_metrics"]["total_issues"], 1);
    assert_eq!(repo["collaboration_metrics"]["total_prs"], 1);
    assert_eq!(repo["collaboration_metrics"]["unique_contributors"], 2);
    assert_eq!(repo["structure_metrics"]["flags"]["has_readme"], true);
    assert_eq!(repo["structure_metrics"]["flags"]["has_tests"], true);
    assert_eq!(repo["ai_commit_analysis"]["score"], 0.5);
}

#[test]
fn repos_infers_markdown_from_extension() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/orgs/acme/repos");
        then.status(200)
            .json_body(json!([repo_json("api", "2024-06-01T00:00:00Z")]));
    });
    mock_repository(&server);

    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .args(["repos", "--org", "acme", "--created-since", "2024-01-01", "--disable-ai"])
        .args(["--out", "ranking.md"])
        .arg("--api-url")
        .arg(server.base_url())
        .assert()
        .success();

    let written = fs::read_to_string(home.path().join("ranking.md")).expect("report written");
    assert!(written.starts_with("# Agile Maturity Report"));
    assert!(written.contains("| 1 | acme/api |"));
}

#[test]
fn user_writes_markdown_report() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/user");
        then.status(200).json_body(json!({"login": "reviewer"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api");
        then.status(200)
            .json_body(repo_json("api", "2024-06-01T00:00:00Z"));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/api/commits")
            .query_param("author", "dev");
        then.status(200).json_body(json!([
            {"sha": "s1", "commit": {"message": "feat: add search endpoint",
                "author": {"date": "2024-09-02T10:00:00Z"}}}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/commits/s1");
        then.status(200).json_body(json!({
            "sha": "s1",
            "commit": {"message": "feat: add search endpoint",
                "author": {"date": "2024-09-02T10:00:00Z"}},
            "stats": {"additions": 40, "deletions": 10},
            "files": [{"filename": "src/search.rs"}, {"filename": "tests/search.rs"}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/issues");
        then.status(200).json_body(json!([
            {"number": 7, "title": "Search is slow", "state": "open",
             "created_at": "2024-09-03T10:00:00Z", "user": {"login": "dev"}}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/pulls");
        then.status(200).json_body(json!([
            {"number": 8, "title": "Add search", "state": "closed",
             "created_at": "2024-09-04T10:00:00Z", "user": {"login": "dev"}}
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/pulls/8");
        then.status(200).json_body(json!({
            "number": 8, "title": "Add search", "state": "closed", "merged": true,
            "created_at": "2024-09-04T10:00:00Z", "user": {"login": "dev"},
            "additions": 40, "deletions": 10, "changed_files": 2
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/issues/comments");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/api/pulls/comments");
        then.status(200).json_body(json!([]));
    });

    let home = TempDir::new().expect("temp dir should be created");
    agilemeter(&home)
        .args(["user", "--repo", "acme/api", "--user", "dev", "--since", "2024-08-01"])
        .args(["--token", "gh-token", "--disable-ai"])
        .arg("--api-url")
        .arg(server.base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("Authenticated as: reviewer"))
        .stdout(predicate::str::contains("- Commits: 1"));

    let written = fs::read_to_string(home.path().join("dev-acme-api-analysis.md"))
        .expect("report written");
    assert!(written.starts_with("# Detailed Agile Practices Report"));
    assert!(written.contains("**User:** dev"));
    assert!(written.contains("- **Lines Added:** 40"));
    assert!(written.contains("- **#8** (Merged): Add search"));
    assert!(written.contains("- **#7** (open): Search is slow"));
}
