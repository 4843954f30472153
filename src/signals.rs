/// Names for signals that terminate the child.
///
/// Unix only; other platforms never report a terminating signal.
#[cfg(unix)]
pub fn signal_name(signo: i32) -> String {
    match nix::sys::signal::Signal::try_from(signo) {
        Ok(sig) => sig.as_str().to_string(),
        Err(_) => format!("signal {signo}"),
    }
}

/// The signal that terminated a process, if it did not exit normally.
#[cfg(unix)]
pub fn terminating_signal(status: &std::process::ExitStatus) -> Option<String> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(signal_name)
}

#[cfg(not(unix))]
pub fn terminating_signal(_status: &std::process::ExitStatus) -> Option<String> {
    None
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_known_signal_names() {
        assert_eq!(signal_name(9), "SIGKILL");
        assert_eq!(signal_name(15), "SIGTERM");
        assert_eq!(signal_name(2), "SIGINT");
    }

    #[test]
    fn test_unknown_signal_number() {
        assert_eq!(signal_name(1000), "signal 1000");
    }

    #[test]
    fn test_terminating_signal_from_status() {
        let status = std::process::Command::new("sh")
            .args(["-c", "kill -TERM $$"])
            .status()
            .unwrap();
        assert_eq!(terminating_signal(&status).as_deref(), Some("SIGTERM"));

        let status = std::process::Command::new("true").status().unwrap();
        assert_eq!(terminating_signal(&status), None);
    }
}
