/*!
    Run an operation on a background thread.
*/

use std::io;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::cancel::CancelToken;
use crate::config::{CropConfig, EnvelopeConfig};
use crate::crop::{CropReport, CropWindow, crop_to_file_with};
use crate::envelope::{EnvelopeResult, try_extract_envelope};
use crate::error::{CropError, EnvelopeError};

/**
    Handle to an operation running on its own thread.

    Dropping the handle detaches the thread; call [`cancel`](Self::cancel)
    first to make it stop early.
*/
#[derive(Debug)]
pub struct Job<T> {
    handle: JoinHandle<T>,
    cancel: CancelToken,
}

impl<T: Send + 'static> Job<T> {
    /**
        Spawn `work` on a named thread. It receives the job's cancel token.
    */
    pub fn spawn<F>(name: &str, work: F) -> io::Result<Self>
    where
        F: FnOnce(CancelToken) -> T + Send + 'static,
    {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || work(token))?;
        Ok(Self { handle, cancel })
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /**
        Wait for the result. A panic on the job thread is resumed here.
    */
    pub fn join(self) -> T {
        match self.handle.join() {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/**
    Extract an envelope in the background.
*/
pub fn spawn_envelope(
    path: impl Into<PathBuf>,
    config: EnvelopeConfig,
) -> io::Result<Job<Result<EnvelopeResult, EnvelopeError>>> {
    let path = path.into();
    Job::spawn("envelope", move |cancel| {
        try_extract_envelope(&path, &config, &cancel)
    })
}

/**
    Crop in the background.
*/
pub fn spawn_crop(
    input: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
    window: CropWindow,
    config: CropConfig,
) -> io::Result<Job<Result<CropReport, CropError>>> {
    let (input, output) = (input.into(), output.into());
    Job::spawn("crop", move |cancel| {
        crop_to_file_with(&input, &output, window, &config, &cancel)
    })
}
