use std::collections::{HashSet, VecDeque};

use crate::api_client::download_url;

/// Job status as reported by the scrape server. Anything outside the four
/// known values is carried verbatim in `Other` so the status panel can still
/// display it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> JobStatus {
        match raw {
            "starting" => JobStatus::Starting,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            "" => JobStatus::Other("unknown".to_string()),
            other => JobStatus::Other(other.to_string()),
        }
    }

    /// Active jobs are the only ones that get another poll armed.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Starting | JobStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn label(&self) -> &str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Running,
    Completed,
    Failed,
    None,
}

pub fn status_style(status: &JobStatus) -> StatusStyle {
    match status {
        JobStatus::Starting | JobStatus::Running => StatusStyle::Running,
        JobStatus::Completed => StatusStyle::Completed,
        JobStatus::Failed => StatusStyle::Failed,
        JobStatus::Other(_) => StatusStyle::None,
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub leagues: Vec<String>,
    pub statistic: String,
    pub status: JobStatus,
    pub output_file: Option<String>,
    pub error: Option<String>,
}

/// One record of scraped output, display-only. Cells are kept verbatim as
/// the server sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub game: String,
    pub player: String,
    pub team: String,
    pub statistic: String,
    pub value: String,
    pub odds: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Leagues,
    Statistics,
    Jobs,
}

#[derive(Debug, Clone)]
pub struct ResultsModal {
    pub filename: String,
    pub download_url: String,
    pub rows: Vec<ResultRow>,
    pub load_failed: bool,
    pub scroll: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsView<'a> {
    Placeholder(&'static str),
    Rows(&'a [ResultRow]),
}

impl ResultsModal {
    pub fn view(&self) -> ResultsView<'_> {
        if self.load_failed {
            ResultsView::Placeholder("Error loading data")
        } else if self.rows.is_empty() {
            ResultsView::Placeholder("No data available")
        } else {
            ResultsView::Rows(&self.rows)
        }
    }
}

/// Per-job view model for the status panel.
#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub leagues: String,
    pub statistic: String,
    pub status_label: String,
    pub style: StatusStyle,
    pub output_file: Option<String>,
    pub download_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub leagues: Vec<String>,
    pub statistic: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub base_url: String,
    pub leagues: Vec<String>,
    pub selected_leagues: HashSet<String>,
    pub statistics: Vec<String>,
    pub selected_statistic: Option<usize>,
    // Insertion-ordered; jobs are upserted by id and never removed during a
    // session.
    pub jobs: Vec<Job>,
    pub submitting: bool,
    pub alert: Option<String>,
    pub results: Option<ResultsModal>,
    pub focus: Pane,
    pub league_cursor: usize,
    pub statistic_cursor: usize,
    pub job_cursor: usize,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            leagues: Vec::new(),
            selected_leagues: HashSet::new(),
            statistics: Vec::new(),
            selected_statistic: None,
            jobs: Vec::new(),
            submitting: false,
            alert: None,
            results: None,
            focus: Pane::Leagues,
            league_cursor: 0,
            statistic_cursor: 0,
            job_cursor: 0,
            logs: VecDeque::with_capacity(200),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /* ---------- form ---------- */

    /// Checkbox view of the league list: (value, checked).
    pub fn league_options(&self) -> Vec<(&str, bool)> {
        self.leagues
            .iter()
            .map(|league| (league.as_str(), self.selected_leagues.contains(league)))
            .collect()
    }

    /// Radio view of the statistic list: (value, checked). At most one entry
    /// is checked.
    pub fn statistic_options(&self) -> Vec<(&str, bool)> {
        self.statistics
            .iter()
            .enumerate()
            .map(|(idx, stat)| (stat.as_str(), self.selected_statistic == Some(idx)))
            .collect()
    }

    pub fn toggle_league(&mut self) {
        let Some(league) = self.leagues.get(self.league_cursor) else {
            return;
        };
        if !self.selected_leagues.remove(league) {
            self.selected_leagues.insert(league.clone());
        }
    }

    pub fn choose_statistic(&mut self) {
        if self.statistic_cursor < self.statistics.len() {
            self.selected_statistic = Some(self.statistic_cursor);
        }
    }

    /// Checked leagues in list order.
    pub fn selected_league_values(&self) -> Vec<String> {
        self.leagues
            .iter()
            .filter(|league| self.selected_leagues.contains(*league))
            .cloned()
            .collect()
    }

    /// Validate the current selection. No request may be issued on `Err`.
    pub fn submission(&self) -> Result<ScrapeRequest, &'static str> {
        let leagues = self.selected_league_values();
        if leagues.is_empty() {
            return Err("Please select at least one league");
        }
        let statistic = self
            .selected_statistic
            .and_then(|idx| self.statistics.get(idx));
        let Some(statistic) = statistic else {
            return Err("Please select a statistic");
        };
        Ok(ScrapeRequest {
            leagues,
            statistic: statistic.clone(),
        })
    }

    /* ---------- jobs ---------- */

    pub fn upsert_job(&mut self, job: Job) {
        if let Some(existing) = self.jobs.iter_mut().find(|j| j.id == job.id) {
            *existing = job;
        } else {
            self.jobs.push(job);
        }
    }

    pub fn selected_job(&self) -> Option<&Job> {
        self.jobs.get(self.job_cursor)
    }

    pub fn job_rows(&self) -> Vec<JobRow> {
        self.jobs
            .iter()
            .map(|job| JobRow {
                id: job.id.clone(),
                leagues: job.leagues.join(", "),
                statistic: job.statistic.clone(),
                status_label: job.status.label().to_string(),
                style: status_style(&job.status),
                output_file: job.output_file.clone(),
                download_url: job
                    .output_file
                    .as_deref()
                    .map(|file| download_url(&self.base_url, file)),
                error: job.error.clone(),
            })
            .collect()
    }

    /* ---------- focus & cursors ---------- */

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Pane::Leagues => Pane::Statistics,
            Pane::Statistics => Pane::Jobs,
            Pane::Jobs => Pane::Leagues,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Pane::Leagues => Pane::Jobs,
            Pane::Statistics => Pane::Leagues,
            Pane::Jobs => Pane::Statistics,
        };
    }

    pub fn select_next(&mut self) {
        let (cursor, total) = self.focused_cursor();
        if total == 0 {
            *cursor = 0;
            return;
        }
        *cursor = (*cursor + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let (cursor, total) = self.focused_cursor();
        if total == 0 {
            *cursor = 0;
            return;
        }
        if *cursor == 0 {
            *cursor = total - 1;
        } else {
            *cursor -= 1;
        }
    }

    fn focused_cursor(&mut self) -> (&mut usize, usize) {
        match self.focus {
            Pane::Leagues => (&mut self.league_cursor, self.leagues.len()),
            Pane::Statistics => (&mut self.statistic_cursor, self.statistics.len()),
            Pane::Jobs => (&mut self.job_cursor, self.jobs.len()),
        }
    }

    pub fn clamp_cursors(&mut self) {
        clamp(&mut self.league_cursor, self.leagues.len());
        clamp(&mut self.statistic_cursor, self.statistics.len());
        clamp(&mut self.job_cursor, self.jobs.len());
    }
}

fn clamp(cursor: &mut usize, total: usize) {
    if total == 0 {
        *cursor = 0;
    } else if *cursor >= total {
        *cursor = total - 1;
    }
}

/// State mutations delivered from the provider thread. Applied on the UI
/// thread only.
#[derive(Debug, Clone)]
pub enum Delta {
    SetLeagues(Vec<String>),
    SetStatistics(Vec<String>),
    SetJobs(Vec<Job>),
    JobUpdate { job: Job },
    ScrapeStarted { job: Job },
    ScrapeFailed { message: String },
    ResultsLoaded { filename: String, rows: Vec<ResultRow> },
    ResultsFailed { filename: String },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    StartScrape { leagues: Vec<String>, statistic: String },
    FetchResults { filename: String },
    DownloadCsv { filename: String },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetLeagues(leagues) => {
            state.leagues = leagues;
            state.selected_leagues.clear();
            state.clamp_cursors();
        }
        Delta::SetStatistics(statistics) => {
            // First statistic is checked by default.
            state.selected_statistic = if statistics.is_empty() { None } else { Some(0) };
            state.statistics = statistics;
            state.clamp_cursors();
        }
        Delta::SetJobs(jobs) => {
            for job in jobs {
                state.upsert_job(job);
            }
            state.clamp_cursors();
        }
        Delta::JobUpdate { job } => {
            state.upsert_job(job);
        }
        Delta::ScrapeStarted { job } => {
            state.submitting = false;
            state.push_log(format!("[INFO] Scrape started (job {})", job.id));
            state.upsert_job(job);
        }
        Delta::ScrapeFailed { message } => {
            state.submitting = false;
            state.alert = Some(message);
        }
        Delta::ResultsLoaded { filename, rows } => {
            state.results = Some(ResultsModal {
                download_url: download_url(&state.base_url, &filename),
                filename,
                rows,
                load_failed: false,
                scroll: 0,
            });
        }
        Delta::ResultsFailed { filename } => {
            state.results = Some(ResultsModal {
                download_url: download_url(&state.base_url, &filename),
                filename,
                rows: Vec::new(),
                load_failed: true,
                scroll: 0,
            });
        }
        Delta::Log(msg) => {
            state.push_log(msg);
        }
    }
}
