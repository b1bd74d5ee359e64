use super::{Diagnostic, Writer};

/// Sends every diagnostic it receives to a set of [`Writer`] sinks.
pub struct Logger<'a> {
    /// Whether this [`Logger`] will pass diagnostics it receives to the writers
    enabled: bool,

    /// The writer sinks that this [`Logger`] will use to write every
    /// diagnostic that it receives.
    writers: Vec<&'a dyn Writer>,

    /// Number of diagnostics passed to the writers
    written: usize,
}

impl<'a> Logger<'a> {
    /// Creates a new Logger with no writers and that is enabled.
    pub fn new() -> Logger<'a> {
        Logger {
            enabled: true,
            writers: vec![],
            written: 0,
        }
    }

    /// Write a diagnostic to every [`Writer`] in this [`Logger`]
    pub fn write(&mut self, diag: &Diagnostic) {
        if self.enabled {
            for w in &self.writers {
                w.write_diagnostic(diag);
            }
            self.written += 1;
        }
    }

    pub fn write_all(&mut self, diags: &[Diagnostic]) {
        for d in diags {
            self.write(d)
        }
    }

    /// Tell every [`Writer`] that no more diagnostics will follow
    pub fn finish(&self) {
        for w in &self.writers {
            w.finish();
        }
    }

    /// Add a [`Writer`] to this [`Logger`]
    pub fn add_writer(&mut self, w: &'a dyn Writer) {
        self.writers.push(w)
    }

    /// This [`Logger`] will send any diagnostic received through `write` to
    /// its [`Writer`]s.
    pub fn enable(&mut self) {
        self.enabled = true
    }

    /// This [`Logger`] will NOT send diagnostics received through `write` to
    /// its [`Writer`]s.
    pub fn disable(&mut self) {
        self.enabled = false
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl<'a> Default for Logger<'a> {
    fn default() -> Self {
        Self::new()
    }
}
