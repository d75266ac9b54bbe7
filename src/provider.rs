use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::api_client::{self, ScrapeStart};
use crate::poll::PollSchedule;
use crate::state::{Delta, Job, JobStatus, ProviderCommand};

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

const TICK: Duration = Duration::from_millis(200);

/// Worker thread owning all network I/O. The UI thread sends commands in,
/// the worker sends `Delta`s back; all state mutation stays on the UI side.
pub fn spawn_provider(base_url: String, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut schedule = PollSchedule::new(POLL_INTERVAL);

        // Three independent bootstrap fetches. Failures are logged and
        // otherwise ignored; the panes just stay empty.
        match api_client::fetch_leagues(&base_url) {
            Ok(leagues) => {
                let _ = tx.send(Delta::SetLeagues(leagues));
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Error fetching leagues: {err:#}")));
            }
        }
        match api_client::fetch_statistics(&base_url) {
            Ok(statistics) => {
                let _ = tx.send(Delta::SetStatistics(statistics));
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] Error fetching statistics: {err:#}"
                )));
            }
        }
        match api_client::fetch_jobs(&base_url) {
            Ok(jobs) => {
                let now = Instant::now();
                for job in &jobs {
                    if job.status.is_active() {
                        schedule.schedule(job.id.clone(), now);
                    }
                }
                let _ = tx.send(Delta::SetJobs(jobs));
            }
            Err(err) => {
                let _ = tx.send(Delta::Log(format!("[WARN] Error fetching jobs: {err:#}")));
            }
        }

        loop {
            thread::sleep(TICK);

            run_due_polls(&base_url, &mut schedule, &tx);

            while let Ok(cmd) = cmd_rx.try_recv() {
                match cmd {
                    ProviderCommand::StartScrape { leagues, statistic } => {
                        start_scrape(&base_url, leagues, statistic, &mut schedule, &tx);
                    }
                    ProviderCommand::FetchResults { filename } => {
                        match api_client::fetch_data(&base_url, &filename) {
                            Ok(rows) => {
                                let _ = tx.send(Delta::ResultsLoaded { filename, rows });
                            }
                            Err(err) => {
                                let _ = tx.send(Delta::Log(format!(
                                    "[WARN] Error fetching results: {err:#}"
                                )));
                                let _ = tx.send(Delta::ResultsFailed { filename });
                            }
                        }
                    }
                    ProviderCommand::DownloadCsv { filename } => {
                        match api_client::download_csv(&base_url, &filename, Path::new(".")) {
                            Ok(path) => {
                                let _ = tx.send(Delta::Log(format!(
                                    "[INFO] Saved {}",
                                    path.display()
                                )));
                            }
                            Err(err) => {
                                let _ = tx.send(Delta::Log(format!(
                                    "[WARN] Error downloading {filename}: {err:#}"
                                )));
                            }
                        }
                    }
                }
            }
        }
    });
}

/// What happens to a job's poll chain after one poll completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Rearm,
    Stop,
}

/// Active statuses keep the chain alive. Terminal and unrecognized statuses
/// end it, and so does a failed poll (`None`): the panel keeps its last
/// known state until a restart re-derives it from /api/jobs.
pub fn poll_outcome(status: Option<&JobStatus>) -> PollOutcome {
    match status {
        Some(status) if status.is_active() => PollOutcome::Rearm,
        _ => PollOutcome::Stop,
    }
}

fn run_due_polls(base_url: &str, schedule: &mut PollSchedule, tx: &Sender<Delta>) {
    for id in schedule.due(Instant::now()) {
        match api_client::fetch_job(base_url, &id) {
            Ok(job) => {
                match poll_outcome(Some(&job.status)) {
                    PollOutcome::Rearm => schedule.schedule(id, Instant::now()),
                    PollOutcome::Stop => {
                        schedule.cancel(&id);
                    }
                }
                let _ = tx.send(Delta::JobUpdate { job });
            }
            Err(err) => {
                match poll_outcome(None) {
                    PollOutcome::Rearm => schedule.schedule(id.clone(), Instant::now()),
                    PollOutcome::Stop => {
                        schedule.cancel(&id);
                    }
                }
                let _ = tx.send(Delta::Log(format!("[WARN] Error polling job {id}: {err:#}")));
            }
        }
    }
}

fn start_scrape(
    base_url: &str,
    leagues: Vec<String>,
    statistic: String,
    schedule: &mut PollSchedule,
    tx: &Sender<Delta>,
) {
    match api_client::start_scrape(base_url, &leagues, &statistic) {
        Ok(ScrapeStart::Accepted { job_id }) => {
            schedule.schedule(job_id.clone(), Instant::now());
            let job = Job {
                id: job_id,
                leagues,
                statistic,
                status: JobStatus::Starting,
                output_file: None,
                error: None,
            };
            let _ = tx.send(Delta::ScrapeStarted { job });
        }
        Ok(ScrapeStart::Rejected { message }) => {
            let _ = tx.send(Delta::ScrapeFailed {
                message: format!("Error: {message}"),
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] Error starting scrape: {err:#}")));
            let _ = tx.send(Delta::ScrapeFailed {
                message: "An error occurred while starting the scrape".to_string(),
            });
        }
    }
}
