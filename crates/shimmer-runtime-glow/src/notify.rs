/// User-facing diagnostics sink.
///
/// Shader compile and link failures do not stop rendering; they are reported here once and the
/// program degrades to whatever GL leaves behind. Hosts pick the surface: a log line natively,
/// a blocking alert on the web.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Reports diagnostics as `tracing` errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::error!("{message}");
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}
