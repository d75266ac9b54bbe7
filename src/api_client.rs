use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::http_client::http_client;
use crate::state::{Job, JobStatus, ResultRow};

pub fn fetch_leagues(base: &str) -> Result<Vec<String>> {
    let body = get_text(&format!("{base}/api/leagues"))?;
    parse_leagues_json(&body)
}

pub fn fetch_statistics(base: &str) -> Result<Vec<String>> {
    let body = get_text(&format!("{base}/api/statistics"))?;
    parse_statistics_json(&body)
}

pub fn fetch_jobs(base: &str) -> Result<Vec<Job>> {
    let body = get_text(&format!("{base}/api/jobs"))?;
    parse_jobs_json(&body)
}

pub fn fetch_job(base: &str, id: &str) -> Result<Job> {
    let body = get_text(&format!("{base}/api/job/{id}"))?;
    parse_job_json(&body, id)
}

pub fn fetch_data(base: &str, filename: &str) -> Result<Vec<ResultRow>> {
    let body = get_text(&format!("{base}/api/data/{filename}"))?;
    parse_data_json(&body)
}

pub fn start_scrape(base: &str, leagues: &[String], statistic: &str) -> Result<ScrapeStart> {
    let client = http_client()?;
    let url = format!("{base}/api/scrape");
    let resp = client
        .post(&url)
        .json(&serde_json::json!({ "leagues": leagues, "statistic": statistic }))
        .send()
        .with_context(|| format!("POST {url} failed"))?;
    let body = resp.text().context("response body unreadable")?;
    parse_scrape_response_json(&body)
}

pub fn download_url(base: &str, filename: &str) -> String {
    format!("{base}/api/download/{filename}")
}

/// Save the CSV behind `/api/download/{filename}` into `dest_dir`, named as
/// the server named it.
pub fn download_csv(base: &str, filename: &str, dest_dir: &Path) -> Result<PathBuf> {
    let client = http_client()?;
    let url = download_url(base, filename);
    let resp = client
        .get(&url)
        .send()
        .with_context(|| format!("GET {url} failed"))?;
    let bytes = resp.bytes().context("download body unreadable")?;
    let path = dest_dir.join(filename);
    fs::write(&path, &bytes).with_context(|| format!("write {} failed", path.display()))?;
    Ok(path)
}

fn get_text(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .send()
        .with_context(|| format!("GET {url} failed"))?;
    resp.text().context("response body unreadable")
}

/* ---------- wire shapes ---------- */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeStart {
    Accepted { job_id: String },
    Rejected { message: String },
}

#[derive(Debug, Deserialize)]
struct JobPayload {
    #[serde(default)]
    leagues: Vec<String>,
    #[serde(default)]
    statistic: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    output_file: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl JobPayload {
    fn into_job(self, id: String) -> Job {
        Job {
            id,
            leagues: self.leagues,
            statistic: self.statistic,
            status: JobStatus::parse(&self.status),
            output_file: self.output_file,
            error: self.error,
        }
    }
}

pub fn parse_leagues_json(raw: &str) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        leagues: Vec<String>,
    }
    let body: Body = serde_json::from_str(raw).context("invalid leagues json")?;
    Ok(body.leagues)
}

pub fn parse_statistics_json(raw: &str) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        statistics: Vec<String>,
    }
    let body: Body = serde_json::from_str(raw).context("invalid statistics json")?;
    Ok(body.statistics)
}

pub fn parse_jobs_json(raw: &str) -> Result<Vec<Job>> {
    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        jobs: HashMap<String, JobPayload>,
    }
    let body: Body = serde_json::from_str(raw).context("invalid jobs json")?;
    let mut jobs: Vec<Job> = body
        .jobs
        .into_iter()
        .map(|(id, payload)| payload.into_job(id))
        .collect();
    // The server issues numeric ids; order those numerically, the rest
    // lexically, so the panel is deterministic across fetches.
    jobs.sort_by(|a, b| match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.id.cmp(&b.id),
    });
    Ok(jobs)
}

pub fn parse_job_json(raw: &str, id: &str) -> Result<Job> {
    let payload: JobPayload = serde_json::from_str(raw).context("invalid job json")?;
    Ok(payload.into_job(id.to_string()))
}

pub fn parse_scrape_response_json(raw: &str) -> Result<ScrapeStart> {
    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        job_id: Option<Value>,
        #[serde(default)]
        error: Option<String>,
    }
    let body: Body = serde_json::from_str(raw).context("invalid scrape response json")?;
    if let Some(message) = body.error {
        return Ok(ScrapeStart::Rejected { message });
    }
    let job_id = body
        .job_id
        .as_ref()
        .and_then(id_string)
        .context("scrape response missing job_id")?;
    Ok(ScrapeStart::Accepted { job_id })
}

pub fn parse_data_json(raw: &str) -> Result<Vec<ResultRow>> {
    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        data: Vec<RowPayload>,
    }
    #[derive(Deserialize)]
    struct RowPayload {
        #[serde(default)]
        game: Value,
        #[serde(default)]
        player: Value,
        #[serde(default)]
        team: Value,
        #[serde(default)]
        statistic: Value,
        #[serde(default)]
        value: Value,
        #[serde(default)]
        odds: Value,
    }
    let body: Body = serde_json::from_str(raw).context("invalid data json")?;
    Ok(body
        .data
        .into_iter()
        .map(|row| ResultRow {
            game: cell_text(&row.game),
            player: cell_text(&row.player),
            team: cell_text(&row.team),
            statistic: cell_text(&row.statistic),
            value: cell_text(&row.value),
            odds: cell_text(&row.odds),
        })
        .collect())
}

// Job ids come back as JSON numbers from the server but are strings
// everywhere in the client.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
