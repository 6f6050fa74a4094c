
use rustfft::num_complex::Complex;
use thiserror::Error;

pub mod app;

pub mod filters;
pub mod fourier_analysis;
pub mod io;
pub mod gnss;
pub mod nco;
pub mod resample;

pub mod utils;

/// Complex baseband samples at a fixed rate.  Produced once by the front end and shared
/// read-only by every acquisition search.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
	samples: Vec<Complex<f64>>,
	fs: f64,
}

impl SampleBuffer {

	pub fn new(samples:Vec<Complex<f64>>, fs:f64) -> Self { Self { samples, fs } }

	pub fn fs(&self) -> f64 { self.fs }
	pub fn len(&self) -> usize { self.samples.len() }
	pub fn is_empty(&self) -> bool { self.samples.is_empty() }
	pub fn as_slice(&self) -> &[Complex<f64>] { &self.samples }

	/// Duration covered by the buffer in milliseconds
	pub fn duration_ms(&self) -> f64 { 1000.0 * (self.samples.len() as f64) / self.fs }

}

#[derive(Debug, Error)]
pub enum AcqErr {
	#[error("insufficient samples: search needs {required} but the buffer holds {available}")]
	InsufficientSamples { required:usize, available:usize },

	#[error("PRN {prn} is not valid for {signal}")]
	InvalidIdentifier { prn:usize, signal:&'static str },

	#[error("invalid Doppler search grid min={min} max={max} incr={incr}")]
	InvalidSearchGrid { min:f64, max:f64, incr:f64 },

	#[error("raw sample stream ended after {read} of {requested} samples")]
	StreamTruncated { requested:usize, read:usize },

	#[error("integration time of {ms} [ms] leaves no incoherent blocks of {block_ms} [ms]")]
	InvalidIntegrationTime { ms:usize, block_ms:usize },

	#[error("sample rate mismatch: expected {expected} [samples/sec], got {actual}")]
	SampleRateMismatch { expected:f64, actual:f64 },

	#[error("invalid code table: {0}")]
	InvalidCodeTable(String),

	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	#[error("unable to build worker pool: {0}")]
	WorkerPool(String),

	#[error("search cancelled")]
	Cancelled,

	#[error(transparent)]
	Io(#[from] std::io::Error),
}
