use notice_center_util::{Exception, describe};

/// Out-of-band destination for every exception passed to `log_exception`
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, exception: &dyn Exception);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&dyn Exception) + Send + Sync,
{
    fn report(&self, exception: &dyn Exception) {
        self(exception)
    }
}

/// Reports exceptions through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, exception: &dyn Exception) {
        let summary = describe(exception);
        tracing::error!(
            name = %summary.name,
            details = ?summary.details,
            "{}: {:?}",
            summary.message,
            exception
        );
    }
}
