use session_core::session::Notifier;

/// Shows session notifications on the terminal.
///
/// Successes and infos go to stdout, errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("✔ {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("✘ {message}");
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }
}
