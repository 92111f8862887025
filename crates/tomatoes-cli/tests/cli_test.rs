#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::{PredicateBooleanExt, predicate};

/// Writes a config pointing at `base_url` with the throttle and retry relaxed.
fn write_config(dir: &std::path::Path, base_url: &str) {
    let content = format!(
        "[api]\nkey = \"file-key\"\nbase_url = \"{base_url}\"\n\n\
         [throttle]\nmax_calls = 100\ninterval_ms = 1\n\n\
         [retry]\ndelay_ms = 0\nlimit = 1\n"
    );
    std::fs::write(dir.join("config.toml"), content).unwrap();
}

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("lists"))
        .stdout(predicate::str::contains("movie"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn test_lists_movies_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.args(["lists", "movies", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--page-limit"))
        .stdout(predicate::str::contains("--country"));
}

#[test]
fn test_lists_movies_rejects_unknown_list() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.args(["lists", "movies", "top-rentals"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown movie list"));
}

#[test]
fn test_movie_alias_missing_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.args(["movie", "alias"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id"));
}

#[test]
fn test_missing_api_key() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.env_remove("RT_API_KEY")
        .arg("--dir")
        .arg(dir.path())
        .args(["movie", "info", "770672122"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API key configured"));
}

#[test]
fn test_config_init_then_show() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut init = cargo_bin_cmd!("tomatoes");
    init.arg("--dir")
        .arg(dir.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(dir.path().join("config.toml").exists());

    let mut again = cargo_bin_cmd!("tomatoes");
    again
        .arg("--dir")
        .arg(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let mut show = cargo_bin_cmd!("tomatoes");
    show.arg("--dir")
        .arg(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_calls = 5"));
}

#[test]
fn test_config_show_masks_api_key() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "http://127.0.0.1:1/api/public/v1.0/");

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.arg("--dir")
        .arg(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("***"))
        .stdout(predicate::str::contains("file-key").not());
}

#[tokio::test]
async fn test_movie_info_against_mock_server() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;
    let json_body = include_str!("../../../fixtures/rottentomatoes/movie_770672122.json");

    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path(
            "/api/public/v1.0/movies/770672122.json",
        ))
        .and(wiremock::matchers::query_param("apikey", "env-key"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        &format!("{}/api/public/v1.0/", mock_server.uri()),
    );

    // Act & Assert (RT_API_KEY overrides api.key)
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.env("RT_API_KEY", "env-key")
        .env("NO_COLOR", "1")
        .arg("--dir")
        .arg(dir.path())
        .args(["movie", "info", "770672122"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Toy Story 3"))
        .stdout(predicate::str::contains("IMDb: tt0435761"));
}

#[tokio::test]
async fn test_not_found_reports_error() {
    // Arrange
    let mock_server = wiremock::MockServer::start().await;

    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_config(
        dir.path(),
        &format!("{}/api/public/v1.0/", mock_server.uri()),
    );

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.env_remove("RT_API_KEY")
        .arg("--dir")
        .arg(dir.path())
        .args(["movie", "cast", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to fetch cast of movie 1"));
}

#[test]
fn test_connection_error_hides_api_key() {
    // Arrange: nothing listens on port 1
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), "http://127.0.0.1:1/api/public/v1.0/");

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tomatoes");
    cmd.env_remove("RT_API_KEY")
        .arg("--dir")
        .arg(dir.path())
        .args(["movie", "info", "770672122"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("request failed"))
        .stderr(predicate::str::contains("file-key").not())
        .stderr(predicate::str::contains("apikey").not());
}
