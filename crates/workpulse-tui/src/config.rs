use std::path::PathBuf;

use clap::Parser;
use workpulse_core::TimerMode;
use workpulse_service::{BlockingHttpService, ServiceError};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3720/api";

#[derive(Debug, Parser)]
#[command(name = "workpulse", about = "Kanban board and focus timer for workpulse")]
pub struct Config {
    /// Base URL of the task API, including the `/api` prefix
    #[arg(long, env = "WORKPULSE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Bearer token sent with every request
    #[arg(long, env = "WORKPULSE_API_TOKEN")]
    pub api_token: Option<String>,

    /// Initial timer preset: pomodoro, deep or marathon
    #[arg(long, env = "WORKPULSE_TIMER_MODE", default_value = "pomodoro", value_parser = parse_timer_mode)]
    pub timer_mode: TimerMode,

    /// Write logs here. Logging is off when unset.
    #[arg(long, env = "WORKPULSE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

fn parse_timer_mode(s: &str) -> Result<TimerMode, String> {
    TimerMode::from_str(s).ok_or_else(|| format!("unknown timer mode `{s}` (pomodoro|deep|marathon)"))
}

impl Config {
    /// Build the blocking client. An empty token counts as no token.
    pub fn service(&self) -> Result<BlockingHttpService, ServiceError> {
        match self.api_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => BlockingHttpService::with_token(&self.api_url, token.to_string()),
            None => BlockingHttpService::new(&self.api_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "workpulse",
            "--api-url",
            "http://tasks.internal:8080/api",
            "--timer-mode",
            "deep",
            "--log-file",
            "/tmp/workpulse.log",
        ])
        .unwrap();
        assert_eq!(cfg.api_url, "http://tasks.internal:8080/api");
        assert_eq!(cfg.timer_mode, TimerMode::Deep);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/workpulse.log")));
    }

    #[test]
    fn bad_timer_mode_is_rejected() {
        let err = Config::try_parse_from(["workpulse", "--timer-mode", "sprint"]).unwrap_err();
        assert!(err.to_string().contains("unknown timer mode"));
    }
}
