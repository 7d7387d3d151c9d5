//! Classification of `ureq` failures shared by the upstream clients.

use std::fmt;

/// Coarse failure class used for logging and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpFailureKind {
    Timeout,
    RateLimited,
    Hard,
}

impl fmt::Display for HttpFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate limited",
            Self::Hard => "hard failure",
        };
        f.write_str(label)
    }
}

/// Maps HTTP status codes to a failure class.
pub fn classify_status(code: u16) -> HttpFailureKind {
    match code {
        429 => HttpFailureKind::RateLimited,
        408 | 500 | 502 | 503 | 504 => HttpFailureKind::Timeout,
        _ => HttpFailureKind::Hard,
    }
}

pub fn classify_ureq_failure(error: &ureq::Error) -> HttpFailureKind {
    match error {
        ureq::Error::Status(code, _) => classify_status(*code),
        ureq::Error::Transport(transport) => {
            let lowered = transport.to_string().to_ascii_lowercase();
            if lowered.contains("timed out") || lowered.contains("timeout") {
                HttpFailureKind::Timeout
            } else {
                HttpFailureKind::Hard
            }
        }
    }
}

pub fn classify_io_failure(error: &std::io::Error) -> HttpFailureKind {
    if matches!(
        error.kind(),
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
    ) || error.to_string().to_ascii_lowercase().contains("timed out")
    {
        HttpFailureKind::Timeout
    } else {
        HttpFailureKind::Hard
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_io_failure, classify_status, HttpFailureKind};

    #[test]
    fn test_classify_status_codes() {
        assert_eq!(classify_status(429), HttpFailureKind::RateLimited);
        assert_eq!(classify_status(503), HttpFailureKind::Timeout);
        assert_eq!(classify_status(408), HttpFailureKind::Timeout);
        assert_eq!(classify_status(400), HttpFailureKind::Hard);
        assert_eq!(classify_status(404), HttpFailureKind::Hard);
    }

    #[test]
    fn test_classify_io_timeout() {
        let timed_out = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        let other = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
        assert_eq!(classify_io_failure(&timed_out), HttpFailureKind::Timeout);
        assert_eq!(classify_io_failure(&other), HttpFailureKind::Hard);
    }
}
