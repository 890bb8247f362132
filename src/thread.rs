//! tool for easy use of mutli threading.
//!
//! The sweep of the lattice distributes chunks of links over a fixed number of worker threads
//! with [`run_pool_parallel`]. The workers are scoped threads, they can borrow the gauge field
//! immutably and are all joined before the function returns.

use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{self, Display};
use std::hash::Hash;

use crossbeam::{channel, thread};

/// Multithreading error.
#[derive(Debug)]
#[non_exhaustive]
pub enum ThreadError {
    /// Tried to run some jobs with 0 threads
    ThreadNumberIncorrect,
    /// One of the thread panicked. inside the [`Box`] is the panic message.
    /// see [`run_pool_parallel`] example.
    Panic(Box<dyn Any + Send + 'static>),
}

impl ThreadError {
    /// The panic message if the error is a [`ThreadError::Panic`] with a string payload.
    #[must_use]
    #[inline]
    pub fn panic_message(&self) -> Option<&str> {
        match self {
            Self::ThreadNumberIncorrect => None,
            Self::Panic(any) => payload_message(any.as_ref()),
        }
    }
}

/// Message of a panic payload. [`crossbeam::thread::scope`] gathers the payloads of every
/// panicked thread in a [`Vec`], the first message found is returned.
fn payload_message(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return Some(message);
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return Some(message.as_str());
    }
    payload
        .downcast_ref::<Vec<Box<dyn Any + Send + 'static>>>()
        .and_then(|payloads| payloads.iter().find_map(|p| payload_message(p.as_ref())))
}

impl Display for ThreadError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThreadNumberIncorrect => write!(f, "number of thread is incorrect"),
            Self::Panic(any) => match self.panic_message() {
                Some(message) => write!(f, "a thread panicked with message \"{}\"", message),
                None => write!(f, "a thread panicked with message {:?}", any),
            },
        }
    }
}

impl Error for ThreadError {}

/// run jobs in parallel.
///
/// The pool of job is given by `iter`. the job is given by `closure` that have the form
/// `|key, common_data| -> Data`. `number_of_thread` determine the number of job done in
/// parallel and should be greater than 0, otherwise return
/// [`ThreadError::ThreadNumberIncorrect`]. `capacity` is used to determine the capacity of the
/// [`HashMap`] upon initialization (see [`HashMap::with_capacity`]).
///
/// The jobs are put in a channel that the threads drain, a thread takes a new job as soon as it
/// is done with the previous one. With one thread the jobs are executed on the calling thread.
///
/// # Errors
/// Returns [`ThreadError::ThreadNumberIncorrect`] is the number of threads is 0.
/// Returns [`ThreadError::Panic`] if a thread panicked. Contains the panic message.
///
/// # Example
/// let us computes the value of `i^2 * c` for i in [2,9999] with 4 threads
/// ```
/// # use lattice_qcd_metropolis::thread::run_pool_parallel;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let iter = 2..10000;
/// let c = 5;
/// // we could have put 5 inside the closure but this demonstrate how to use common data
/// let result = run_pool_parallel(iter, &c, &|i, c| i * i * c, 4, 10000 - 2)?;
/// assert_eq!(result.get(&40), Some(&(40 * 40 * c)));
/// assert_eq!(result.get(&1), None);
/// # Ok(())
/// # }
/// ```
/// In the next example a thread will panic, we demonstrate the return type.
/// ```
/// # use lattice_qcd_metropolis::thread::{run_pool_parallel, ThreadError};
/// let iter = 0..10;
/// let result = run_pool_parallel(iter, &(), &|_: &i32, _| -> i32 { panic!("panic message") }, 4, 10);
/// assert!(matches!(result, Err(ThreadError::Panic(_))));
/// ```
pub fn run_pool_parallel<Key, Data, CommonData, F>(
    iter: impl Iterator<Item = Key>,
    common_data: &CommonData,
    closure: &F,
    number_of_thread: usize,
    capacity: usize,
) -> Result<HashMap<Key, Data>, ThreadError>
where
    CommonData: Sync,
    Key: Eq + Hash + Send,
    Data: Send,
    F: Sync + Fn(&Key, &CommonData) -> Data,
{
    if number_of_thread == 0 {
        return Err(ThreadError::ThreadNumberIncorrect);
    }
    if number_of_thread == 1 {
        let mut hash_map = HashMap::<Key, Data>::with_capacity(capacity);
        for key in iter {
            let data = closure(&key, common_data);
            hash_map.insert(key, data);
        }
        return Ok(hash_map);
    }

    let (job_tx, job_rx) = channel::unbounded::<Key>();
    for key in iter {
        // the receiver is alive, sending cannot fail
        let _ = job_tx.send(key);
    }
    drop(job_tx);

    thread::scope(|s| {
        let (result_tx, result_rx) = channel::unbounded::<(Key, Data)>();
        for _ in 0..number_of_thread {
            let receiver = job_rx.clone();
            let transmitter = result_tx.clone();
            s.spawn(move |_| {
                for key in receiver.iter() {
                    let data = closure(&key, common_data);
                    if transmitter.send((key, data)).is_err() {
                        break;
                    }
                }
            });
        }
        // we drop channel so we can properly assert if they are closed
        drop(result_tx);
        let mut hash_map = HashMap::<Key, Data>::with_capacity(capacity);
        for (key, data) in result_rx.iter() {
            hash_map.insert(key, data);
        }
        hash_map
    })
    .map_err(ThreadError::Panic)
}
