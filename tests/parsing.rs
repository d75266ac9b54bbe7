use std::fs;
use std::path::PathBuf;

use props_terminal::api_client::{
    download_url, parse_data_json, parse_job_json, parse_jobs_json, parse_leagues_json,
    parse_scrape_response_json, parse_statistics_json, ScrapeStart,
};
use props_terminal::state::JobStatus;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_leagues_fixture() {
    let raw = read_fixture("leagues.json");
    let leagues = parse_leagues_json(&raw).expect("fixture should parse");
    assert_eq!(leagues, vec!["NBA", "NFL", "MLB", "NHL"]);
}

#[test]
fn parses_statistics_fixture() {
    let raw = read_fixture("statistics.json");
    let statistics = parse_statistics_json(&raw).expect("fixture should parse");
    assert_eq!(statistics, vec!["points", "rebounds", "assists", "touchdowns"]);
}

#[test]
fn parses_jobs_fixture_in_numeric_id_order() {
    let raw = read_fixture("jobs.json");
    let jobs = parse_jobs_json(&raw).expect("fixture should parse");

    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[0].id, "0");
    assert_eq!(jobs[1].id, "2");
    assert_eq!(jobs[2].id, "10");

    assert_eq!(jobs[0].status, JobStatus::Completed);
    assert_eq!(jobs[0].output_file.as_deref(), Some("nba_points.csv"));

    assert_eq!(jobs[1].status, JobStatus::Running);
    assert_eq!(jobs[1].leagues, vec!["NFL", "MLB"]);
    assert_eq!(jobs[1].output_file, None);

    // Statuses the client does not know stay carried verbatim.
    assert_eq!(jobs[2].status, JobStatus::Other("archived".to_string()));
}

#[test]
fn parses_failed_job_fixture() {
    let raw = read_fixture("job_failed.json");
    let job = parse_job_json(&raw, "3").expect("fixture should parse");
    assert_eq!(job.id, "3");
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("scrape timed out"));
    assert_eq!(job.output_file, None);
}

#[test]
fn scrape_acceptance_normalizes_numeric_job_id() {
    let raw = read_fixture("scrape_ok.json");
    let start = parse_scrape_response_json(&raw).expect("fixture should parse");
    assert_eq!(
        start,
        ScrapeStart::Accepted {
            job_id: "4".to_string()
        }
    );
}

#[test]
fn scrape_rejection_carries_the_server_message() {
    let raw = read_fixture("scrape_error.json");
    let start = parse_scrape_response_json(&raw).expect("fixture should parse");
    assert_eq!(
        start,
        ScrapeStart::Rejected {
            message: "Invalid statistic: xg".to_string()
        }
    );
}

#[test]
fn scrape_response_without_job_id_or_error_is_an_error() {
    assert!(parse_scrape_response_json(r#"{"status": "started"}"#).is_err());
}

#[test]
fn parses_data_fixture_with_mixed_cell_types() {
    let raw = read_fixture("data.json");
    let rows = parse_data_json(&raw).expect("fixture should parse");

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].game, "LAL @ BOS");
    assert_eq!(rows[0].player, "A. Davis");
    assert_eq!(rows[0].value, "24.5");
    assert_eq!(rows[0].odds, "-110");

    // Numeric odds and values render as their decimal text.
    assert_eq!(rows[1].odds, "-115");
    assert_eq!(rows[3].value, "26");

    // Null cells render empty.
    assert_eq!(rows[3].odds, "");

    assert_eq!(rows[4].team, "MIA");
}

#[test]
fn empty_data_fixture_parses_to_no_rows() {
    let raw = read_fixture("data_empty.json");
    let rows = parse_data_json(&raw).expect("fixture should parse");
    assert!(rows.is_empty());
}

#[test]
fn download_url_shape() {
    assert_eq!(
        download_url("http://127.0.0.1:5000", "nba_points.csv"),
        "http://127.0.0.1:5000/api/download/nba_points.csv"
    );
}
