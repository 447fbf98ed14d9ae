//! Background execution of long-running filters.
//!
//! A single worker thread takes jobs from a channel and answers on a
//! second one. With one consumer and FIFO channels, results come back in
//! exactly the order they were submitted. Images are moved into the job,
//! so the caller cannot touch a buffer while it is being processed.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::error::{EngineError, Result};
use crate::operation::Operation;

/// Identifies a submitted job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A finished job.
#[derive(Debug)]
pub struct Completed {
    pub ticket: Ticket,
    pub operation: Operation,
    pub result: Result<PixelBuffer>,
}

struct Job {
    ticket: Ticket,
    operation: Operation,
    image: PixelBuffer,
}

/// Handle to the worker thread. Dropping it finishes queued jobs and joins the thread.
pub struct Worker {
    jobs: Option<Sender<Job>>,
    results: Receiver<Completed>,
    handle: Option<JoinHandle<()>>,
    next_ticket: u64,
    pending: usize,
}

impl Worker {
    /// Start the worker thread.
    pub fn spawn() -> Result<Self> {
        let (job_tx, job_rx) = channel::<Job>();
        let (result_tx, result_rx) = channel::<Completed>();

        let handle = thread::Builder::new()
            .name("imagetoolkit-worker".into())
            .spawn(move || run(job_rx, result_tx))
            .map_err(EngineError::WorkerSpawn)?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            handle: Some(handle),
            next_ticket: 0,
            pending: 0,
        })
    }

    /// Queue `operation` on `image`.
    pub fn submit(&mut self, operation: Operation, image: PixelBuffer) -> Result<Ticket> {
        let ticket = Ticket(self.next_ticket);
        let jobs = self.jobs.as_ref().ok_or(EngineError::WorkerDisconnected)?;
        jobs.send(Job {
            ticket,
            operation,
            image,
        })
        .map_err(|_| EngineError::WorkerDisconnected)?;

        self.next_ticket += 1;
        self.pending += 1;
        debug!("worker: queued {operation} as #{}", ticket.id());
        Ok(ticket)
    }

    /// Block until the oldest outstanding job finishes.
    ///
    /// Returns `Ok(None)` when nothing is outstanding.
    pub fn recv(&mut self) -> Result<Option<Completed>> {
        if self.pending == 0 {
            return Ok(None);
        }
        let completed = self
            .results
            .recv()
            .map_err(|_| EngineError::WorkerDisconnected)?;
        self.pending -= 1;
        Ok(Some(completed))
    }

    /// Number of submitted jobs whose results have not been received.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // closing the job channel ends the loop in `run`
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("worker: thread panicked");
            }
        }
    }
}

fn run(jobs: Receiver<Job>, results: Sender<Completed>) {
    for job in jobs {
        let result = job.operation.apply(&job.image);
        if let Err(err) = &result {
            debug!("worker: #{} failed: {err}", job.ticket.id());
        }
        let completed = Completed {
            ticket: job.ticket,
            operation: job.operation,
            result,
        };
        if results.send(completed).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CannyParams;
    use crate::filters;

    #[test]
    fn test_results_arrive_in_submission_order() {
        let img = PixelBuffer::filled(16, 16, [40, 80, 120, 255]).unwrap();
        let mut worker = Worker::spawn().unwrap();

        let ops = [
            Operation::Canny(CannyParams::default()),
            Operation::Invert,
            Operation::Brightness(5.0),
            Operation::Grayscale,
        ];
        let tickets: Vec<Ticket> = ops
            .iter()
            .map(|op| worker.submit(*op, img.clone()).unwrap())
            .collect();
        assert_eq!(worker.pending(), 4);

        for (ticket, op) in tickets.iter().zip(ops.iter()) {
            let done = worker.recv().unwrap().unwrap();
            assert_eq!(done.ticket, *ticket);
            assert_eq!(done.operation, *op);
        }
        assert_eq!(worker.pending(), 0);
        assert!(worker.recv().unwrap().is_none());
    }

    #[test]
    fn test_worker_result_matches_direct_call() {
        let img = PixelBuffer::filled(4, 4, [1, 2, 3, 255]).unwrap();
        let mut worker = Worker::spawn().unwrap();
        worker.submit(Operation::Invert, img.clone()).unwrap();
        let done = worker.recv().unwrap().unwrap();
        assert_eq!(done.result.unwrap(), filters::invert(&img));
    }

    #[test]
    fn test_worker_reports_errors() {
        let img = PixelBuffer::filled(4, 4, [1, 2, 3, 255]).unwrap();
        let mut worker = Worker::spawn().unwrap();
        worker.submit(Operation::Brightness(3.0), img).unwrap();
        let done = worker.recv().unwrap().unwrap();
        assert!(matches!(
            done.result,
            Err(EngineError::InvalidParameter { .. })
        ));
    }
}
