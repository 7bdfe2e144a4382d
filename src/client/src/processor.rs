use crate::json::ProgressStatus;

/// Receives each unit of a streamed response as soon as it is parsed.
pub trait MessageProcessor<T>: Send {
    fn process(&mut self, message: T);
}

impl<T, F> MessageProcessor<T> for F
where
    F: FnMut(T) + Send,
{
    fn process(&mut self, message: T) {
        self(message)
    }
}

/// Receives pull, push and build progress.
pub trait ProgressMonitor: Send {
    fn update(&mut self, status: &ProgressStatus);
}

impl<F> ProgressMonitor for F
where
    F: FnMut(&ProgressStatus) + Send,
{
    fn update(&mut self, status: &ProgressStatus) {
        self(status)
    }
}
