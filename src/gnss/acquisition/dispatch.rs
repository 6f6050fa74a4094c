
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{AcqErr, SampleBuffer};
use crate::gnss::signal::SignalType;

use super::{AcquisitionResult, DopplerGrid};

pub type PrnResult = (usize, Result<AcquisitionResult, AcqErr>);

/// Fans PRN searches out over an explicitly sized worker pool.  Every search borrows the same
/// read-only buffer and builds its own replica and working buffers.
pub struct Dispatcher {
	pool: ThreadPool,
	cancel: Arc<AtomicBool>,
}

impl Dispatcher {

	/// `n_threads` of zero sizes the pool to the available parallelism
	pub fn new(n_threads:usize) -> Result<Self, AcqErr> {
		let pool = ThreadPoolBuilder::new()
			.num_threads(n_threads)
			.thread_name(|idx| format!("acquisition-{}", idx))
			.build()
			.map_err(|e| AcqErr::WorkerPool(e.to_string()))?;

		Ok(Self { pool, cancel: Arc::new(AtomicBool::new(false)) })
	}

	pub fn n_threads(&self) -> usize { self.pool.current_num_threads() }

	/// Setting this flag makes every running search stop at its next Doppler bin
	pub fn cancel_flag(&self) -> Arc<AtomicBool> { self.cancel.clone() }

	pub fn cancel(&self) { self.cancel.store(true, Ordering::Relaxed); }

	pub fn is_cancelled(&self) -> bool { self.cancel.load(Ordering::Relaxed) }

	/// One entry per requested PRN, in request order.  Argument errors abort before any search
	/// starts; errors from an individual search only fill that PRN's slot.
	pub fn run_acquisition(&self, signal:&SignalType, samples:&SampleBuffer, prns:&[usize], grid:&DopplerGrid, integration_ms:usize) -> Result<Vec<PrnResult>, AcqErr> {

		for prn in prns { signal.validate_prn(*prn)?; }
		let blocks:usize = signal.incoherent_blocks(integration_ms)?;
		if (samples.fs() - signal.fs).abs() > 1.0e-9 * signal.fs {
			return Err(AcqErr::SampleRateMismatch{ expected: signal.fs, actual: samples.fs() });
		}

		info!("Searching {} PRN(s) of {} over {} Doppler bins and {} block(s) on {} thread(s)",
			prns.len(), signal.name, grid.len(), blocks, self.n_threads());

		let cancel:&AtomicBool = &self.cancel;
		let results:Vec<PrnResult> = self.pool.install(|| prns.par_iter().map(|prn| {
			let result = super::make_acquisition(signal, *prn)
				.and_then(|mut acq| acq.search(samples, grid, integration_ms, Some(cancel)));
			if let Err(e) = &result { warn!("PRN {} {}: {}", prn, signal.name, e); }
			(*prn, result)
		}).collect());

		Ok(results)
	}

}

#[cfg(test)]
mod tests {

	use super::*;

	#[test]
	fn pool_honours_requested_size() {
		let dispatcher = Dispatcher::new(3).unwrap();
		assert_eq!(dispatcher.n_threads(), 3);
		assert!(!dispatcher.cancel_flag().load(Ordering::Relaxed));
		dispatcher.cancel();
		assert!(dispatcher.cancel_flag().load(Ordering::Relaxed));
		assert!(dispatcher.is_cancelled());
	}

	#[test]
	fn empty_request_gives_empty_report() {
		let signal = SignalType::gps_l1ca();
		let samples = SampleBuffer::new(vec![], signal.fs);
		let grid = DopplerGrid::new(-500.0, 500.0, 250.0).unwrap();
		let results = Dispatcher::new(1).unwrap().run_acquisition(&signal, &samples, &[], &grid, 1).unwrap();
		assert!(results.is_empty());
	}

}
