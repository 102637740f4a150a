/// Receives coarse completion percentages from an ingestion call.
pub trait ProgressSink: Send {
    fn report(&mut self, percent: f32);
}

impl<F> ProgressSink for F
where
    F: FnMut(f32) + Send,
{
    fn report(&mut self, percent: f32) {
        (*self)(percent)
    }
}

pub const VALIDATED: f32 = 10.0;
pub const BYTES_READ: f32 = 30.0;
pub const PDF_OPENED: f32 = 50.0;
/// Per-page PDF progress interpolates between `PDF_OPENED` and this.
pub const PDF_PAGES_DONE: f32 = 90.0;
pub const WORD_READ: f32 = 80.0;
pub const COMPLETE: f32 = 100.0;

/// Wraps an optional sink so emitted values stay within [0, 100] and never go
/// backwards within one call.
pub struct ProgressReporter<'a> {
    sink: Option<&'a mut dyn ProgressSink>,
    last: f32,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: Option<&'a mut dyn ProgressSink>) -> Self {
        Self { sink, last: 0.0 }
    }

    pub fn report(&mut self, percent: f32) {
        let percent = percent.clamp(0.0, COMPLETE).max(self.last);
        self.last = percent;
        if let Some(sink) = self.sink.as_mut() {
            sink.report(percent);
        }
    }

    /// Reports page `done` of `total` on the PDF page scale.
    pub fn report_page(&mut self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let fraction = done as f32 / total as f32;
        self.report(PDF_OPENED + fraction * (PDF_PAGES_DONE - PDF_OPENED));
    }
}

#[cfg(test)]
impl ProgressReporter<'_> {
    pub fn silent() -> Self {
        Self::new(None)
    }

    pub fn last(&self) -> f32 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_never_decrease() {
        let mut seen = Vec::new();
        let mut sink = |p: f32| seen.push(p);
        {
            let mut reporter = ProgressReporter::new(Some(&mut sink));
            reporter.report(30.0);
            reporter.report(10.0);
            reporter.report(150.0);
        }
        assert_eq!(seen, vec![30.0, 30.0, 100.0]);
    }

    #[test]
    fn test_page_interpolation() {
        let mut seen = Vec::new();
        let mut sink = |p: f32| seen.push(p);
        {
            let mut reporter = ProgressReporter::new(Some(&mut sink));
            reporter.report_page(1, 4);
            reporter.report_page(2, 4);
            reporter.report_page(4, 4);
            reporter.report_page(1, 0);
        }
        assert_eq!(seen, vec![60.0, 70.0, 90.0]);
    }

    #[test]
    fn test_silent_reporter_tracks_last_value() {
        let mut reporter = ProgressReporter::silent();
        reporter.report(42.0);
        assert_eq!(reporter.last(), 42.0);
    }
}
