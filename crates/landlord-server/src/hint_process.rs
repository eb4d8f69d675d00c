use crate::config::HintConfig;
use landlord_bot::hint::{HintError, HintProvider, HintRequest, HintResponse};
use landlord_core::model::card::Card;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{Level, event};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Runs a configured command once per request: one JSON request line on
/// stdin, one JSON response document on stdout.
#[derive(Debug, Clone)]
pub struct ProcessHintProvider {
    name: String,
    config: HintConfig,
}

impl ProcessHintProvider {
    pub fn new(config: HintConfig) -> Self {
        Self {
            name: config.command.clone(),
            config,
        }
    }

    fn invoke(&self, request: &HintRequest) -> Result<HintResponse, HintError> {
        let mut cmd = Command::new(&self.config.command);
        if !self.config.args.is_empty() {
            cmd.args(&self.config.args);
        }
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let start = Instant::now();
        let deadline = Duration::from_millis(self.config.timeout_ms);
        let mut child = cmd.spawn().map_err(|err| HintError::Io(err.to_string()))?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| HintError::Io("stdin".into()))?;
            serde_json::to_writer(&mut stdin, request)
                .map_err(|err| HintError::Malformed(err.to_string()))?;
            stdin
                .write_all(b"\n")
                .map_err(|err| HintError::Io(err.to_string()))?;
        }

        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if start.elapsed() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    event!(
                        target: "landlord_server::hint",
                        Level::WARN,
                        provider = %self.name,
                        timeout_ms = self.config.timeout_ms,
                        "hint process exceeded timeout; killed"
                    );
                    return Err(HintError::Timeout(self.config.timeout_ms));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(err) => return Err(HintError::Io(err.to_string())),
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|err| HintError::Io(err.to_string()))?;
        if !output.status.success() {
            return Err(HintError::Provider(format!(
                "exit status {}",
                output.status
            )));
        }

        event!(
            target: "landlord_server::hint",
            Level::TRACE,
            provider = %self.name,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "hint process answered"
        );

        serde_json::from_slice(&output.stdout).map_err(|err| HintError::Malformed(err.to_string()))
    }
}

impl HintProvider for ProcessHintProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn suggest(&mut self, request: &HintRequest) -> Result<Vec<Card>, HintError> {
        self.invoke(request)?.into_result()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::ProcessHintProvider;
    use crate::config::HintConfig;
    use landlord_bot::hint::{HintError, HintProvider, HintRequest};
    use landlord_core::model::card::parse_cards;
    use landlord_core::model::seat::Seat;
    use landlord_core::model::table::Table;

    fn shell(script: &str, timeout_ms: u64) -> ProcessHintProvider {
        ProcessHintProvider::new(HintConfig {
            command: "sh".into(),
            args: vec!["-c".into(), script.into()],
            working_dir: None,
            timeout_ms,
        })
    }

    fn request() -> HintRequest {
        HintRequest::from_table(&Table::new(), Seat::First)
    }

    #[test]
    fn reads_cards_from_stdout() {
        let mut provider = shell(r#"cat > /dev/null; echo '{"cards": ["3S", "3H"]}'"#, 2_000);
        let cards = provider.suggest(&request()).unwrap();
        assert_eq!(cards, parse_cards("3S 3H").unwrap());
    }

    #[test]
    fn receives_the_request_on_stdin() {
        let mut provider = shell(
            r#"if grep -q '"hand_counts"'; then echo '{"cards": []}'; else echo '{"error": "no request"}'; fi"#,
            2_000,
        );
        assert_eq!(provider.suggest(&request()).unwrap(), Vec::new());
    }

    #[test]
    fn reported_errors_and_garbage_surface_as_errors() {
        let mut provider = shell(r#"cat > /dev/null; echo '{"error": "busy"}'"#, 2_000);
        assert_eq!(
            provider.suggest(&request()),
            Err(HintError::Provider("busy".into()))
        );

        let mut garbage = shell("cat > /dev/null; echo not-json", 2_000);
        assert!(matches!(
            garbage.suggest(&request()),
            Err(HintError::Malformed(_))
        ));

        let mut failing = shell("cat > /dev/null; exit 3", 2_000);
        assert!(matches!(
            failing.suggest(&request()),
            Err(HintError::Provider(_))
        ));
    }

    #[test]
    fn slow_process_is_killed() {
        let mut provider = shell("sleep 5", 50);
        assert_eq!(provider.suggest(&request()), Err(HintError::Timeout(50)));
    }

    #[test]
    fn missing_binary_is_an_io_error() {
        let mut provider = ProcessHintProvider::new(HintConfig {
            command: "__landlord_missing_hinter__".into(),
            args: Vec::new(),
            working_dir: None,
            timeout_ms: 100,
        });
        assert!(matches!(provider.suggest(&request()), Err(HintError::Io(_))));
    }
}
