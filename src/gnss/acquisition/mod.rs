
use std::str::FromStr;

use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;
use serde::Serialize;

use crate::{AcqErr, SampleBuffer};
use crate::fourier_analysis::FftPair;
use crate::gnss::signal::SignalType;
use crate::utils;

pub mod dispatch;
pub mod incoherent_pcps;

#[cfg(test)]
mod tests;

/// Candidate Doppler bins `min, min+incr, ...` up to but excluding `max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DopplerGrid {
	min_hz: f64,
	max_hz: f64,
	incr_hz: f64,
}

impl DopplerGrid {

	pub fn new(min_hz:f64, max_hz:f64, incr_hz:f64) -> Result<Self, AcqErr> {
		let finite = min_hz.is_finite() && max_hz.is_finite() && incr_hz.is_finite();
		if finite && incr_hz > 0.0 && min_hz < max_hz { Ok(Self { min_hz, max_hz, incr_hz }) }
		else { Err(AcqErr::InvalidSearchGrid{ min: min_hz, max: max_hz, incr: incr_hz }) }
	}

	pub fn min_hz(&self) -> f64 { self.min_hz }
	pub fn max_hz(&self) -> f64 { self.max_hz }
	pub fn incr_hz(&self) -> f64 { self.incr_hz }

	pub fn len(&self) -> usize { ((self.max_hz - self.min_hz) / self.incr_hz).ceil() as usize }
	pub fn is_empty(&self) -> bool { self.len() == 0 }

	/// Bins in ascending order; each is computed from its index so rounding doesn't accumulate
	pub fn bins(&self) -> impl Iterator<Item = f64> + '_ {
		(0..self.len()).map(move |idx| self.min_hz + (idx as f64) * self.incr_hz)
	}

	pub fn nearest_bin(&self, doppler_hz:f64) -> f64 {
		let last:f64 = (self.len() - 1) as f64;
		let idx:f64 = ((doppler_hz - self.min_hz) / self.incr_hz).round().max(0.0).min(last);
		self.min_hz + idx * self.incr_hz
	}

}

impl FromStr for DopplerGrid {
	type Err = AcqErr;

	fn from_str(s:&str) -> Result<Self, AcqErr> {
		match utils::parse_list_floats(s)?.as_slice() {
			[min, max, incr] => DopplerGrid::new(*min, *max, *incr),
			_ => Err(AcqErr::InvalidArgument(format!("Doppler search grid must be MIN,MAX,INCR, got {:?}", s))),
		}
	}
}

/// Best fit of one PRN over the whole Doppler/code-phase grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcquisitionResult {
	/// Accumulated correlation magnitude at the peak
	pub metric: f64,
	/// Code phase [chips], always in [0, code length)
	pub code_phase: f64,
	pub doppler_hz: f64,
	/// Winning accumulator's peak over its own mean; zero when nothing correlated at all
	pub peak_to_mean: f64,
}

impl AcquisitionResult {

	pub fn none() -> Self { Self { metric: 0.0, code_phase: 0.0, doppler_hz: 0.0, peak_to_mean: 0.0 } }

	/// A zero metric means no bin overlapped any signal; that's reported, but it is never a detection
	pub fn detected(&self, threshold:f64) -> bool { self.metric > 0.0 && self.peak_to_mean >= threshold }

}

pub fn make_acquisition(signal:&SignalType, prn:usize) -> Result<incoherent_pcps::Acquisition, AcqErr> {

	let n:usize = signal.samples_per_block;
	let len_fft:usize = 2*n;

	// Replica zero-padded to twice the coherent length
	let mut local_code_time_domain:Vec<Complex<f64>> = signal.replica(prn)?;
	local_code_time_domain.resize(len_fft, Complex::zero());

	// Forward FFT once; it's reused for every Doppler bin and every block
	let fft = FftPair::new(len_fft);
	let mut fft_out:Vec<Complex<f64>> = vec![Complex::zero(); len_fft];
	fft.fft(&mut local_code_time_domain, &mut fft_out);

	// Conjugated once so the search only multiplies; the peak lands at the signal's delay
	let local_code_freq_domain:Vec<Complex<f64>> = fft_out.iter().map(|p| p.conj()).collect();

	Ok(incoherent_pcps::Acquisition { signal: signal.clone(), prn, fft, local_code_freq_domain,
		time_domain: vec![Complex::zero(); len_fft], fft_out, ifft_out: vec![Complex::zero(); len_fft] })
}

/// Runs the full grid search for one PRN
pub fn search(signal:&SignalType, samples:&SampleBuffer, prn:usize, grid:&DopplerGrid, integration_ms:usize) -> Result<AcquisitionResult, AcqErr> {
	make_acquisition(signal, prn)?.search(samples, grid, integration_ms, None)
}
