use std::io;
use thiserror::Error;

/// Failure classes of a benchmark run. Each one ends the process with its
/// own exit code, see [`BenchError::exit_code`].
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{0}")]
    Usage(String),

    #[error("unknown hostname: {0}")]
    UnknownHost(String),

    /// socket creation, bind, listen, accept or connect
    #[error("{stage} failure")]
    Setup {
        stage: &'static str,
        #[source]
        source: io::Error,
    },

    /// read or write on an established connection
    #[error("{stage} failure")]
    Transport {
        stage: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{0} time read failure")]
    Clock(&'static str),
}

impl BenchError {
    pub fn setup(stage: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| BenchError::Setup { stage, source }
    }

    pub fn transport(stage: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| BenchError::Transport { stage, source }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            BenchError::Usage(_) | BenchError::UnknownHost(_) => 2,
            BenchError::Setup { .. } => 3,
            BenchError::Transport { .. } => 4,
            BenchError::Clock(_) => 5,
        }
    }
}

/// Exit code for an error chain produced by the library. Errors that did not
/// originate from a [`BenchError`] map to 1.
pub fn exit_code_of(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<BenchError>()
        .map(BenchError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes_are_distinct_per_class() {
        let usage = BenchError::Usage("bad port".to_string());
        let setup = BenchError::setup("connect")(io::ErrorKind::ConnectionRefused.into());
        let transport = BenchError::transport("read")(io::ErrorKind::UnexpectedEof.into());
        let clock = BenchError::Clock("stop");

        let codes = [
            usage.exit_code(),
            setup.exit_code(),
            transport.exit_code(),
            clock.exit_code(),
        ];
        assert_eq!(codes, [2, 3, 4, 5]);
        assert_eq!(BenchError::UnknownHost("nowhere".into()).exit_code(), 2);
    }

    #[test]
    fn test_exit_code_survives_context() {
        let err = Err::<(), _>(BenchError::setup("bind")(io::ErrorKind::AddrInUse.into()))
            .context("starting receiver")
            .unwrap_err();
        assert_eq!(exit_code_of(&err), 3);
        assert_eq!(exit_code_of(&anyhow::anyhow!("something else")), 1);
    }

    #[test]
    fn test_display_names_the_stage() {
        let err = BenchError::transport("write")(io::ErrorKind::BrokenPipe.into());
        assert_eq!(err.to_string(), "write failure");
        assert_eq!(BenchError::Clock("lap").to_string(), "lap time read failure");
    }
}
