
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use rustfft::num_complex::Complex;

use crate::{AcqErr, SampleBuffer, nco};
use crate::fourier_analysis::FftPair;
use crate::gnss::signal::SignalType;

use super::{AcquisitionResult, DopplerGrid};

/// Parallel code phase search over one PRN: circular correlation in the frequency domain over blocks of
/// 2n samples, with magnitudes summed incoherently across blocks for every Doppler bin.  Built by
/// `make_acquisition`; owns all of its working buffers.
pub struct Acquisition {
	pub signal: SignalType,
	pub prn: usize,
	pub fft: FftPair,
	pub local_code_freq_domain: Vec<Complex<f64>>,
	pub time_domain: Vec<Complex<f64>>,
	pub fft_out:  Vec<Complex<f64>>,
	pub ifft_out: Vec<Complex<f64>>,
}

impl Acquisition {

	pub fn search(&mut self, samples:&SampleBuffer, grid:&DopplerGrid, integration_ms:usize, cancel:Option<&AtomicBool>) -> Result<AcquisitionResult, AcqErr> {

		let fs:f64 = self.signal.fs;
		if (samples.fs() - fs).abs() > 1.0e-9 * fs {
			return Err(AcqErr::SampleRateMismatch{ expected: fs, actual: samples.fs() });
		}

		let n:usize = self.signal.samples_per_block;
		let len_fft:usize = 2*n;
		let code_length:f64 = self.signal.code_length() as f64;
		let blocks:usize = self.signal.incoherent_blocks(integration_ms)?;

		// The last block reads a full 2n samples starting at (blocks-1)*n
		let required:usize = self.signal.required_samples(integration_ms)?;
		if samples.len() < required {
			return Err(AcqErr::InsufficientSamples{ required, available: samples.len() });
		}
		let x:&[Complex<f64>] = samples.as_slice();

		let mut best_match = AcquisitionResult::none();
		let mut best_idx:usize = 0;

		// Try every frequency and update best_match every time we find a new best
		for doppler_hz in grid.bins() {
			if cancel.map(|c| c.load(Ordering::Relaxed)).unwrap_or(false) {
				return Err(AcqErr::Cancelled);
			}

			// The local oscillator undoes the Doppler the signal carries
			let lo:Vec<Complex<f64>> = nco::nco(-doppler_hz / fs, 0.0, len_fft);
			let mut accumulator:Vec<f64> = vec![0.0; len_fft];

			for block in 0..blocks {
				let b:&[Complex<f64>] = &x[(block*n)..(block*n + len_fft)];
				for ((dst, s), w) in self.time_domain.iter_mut().zip(b.iter()).zip(lo.iter()) {
					*dst = s * w;
				}

				// Run the forward FFT
				self.fft.fft(&mut self.time_domain, &mut self.fft_out);

				// Perform multiplication in the freq domain, which is correlation in the time domain
				for (a, c) in self.fft_out.iter_mut().zip(self.local_code_freq_domain.iter()) {
					*a = *a * c;
				}

				// Run the inverse FFT to get correlation in the time domain
				self.fft.ifft(&mut self.fft_out, &mut self.ifft_out);

				for (q, r) in accumulator.iter_mut().zip(self.ifft_out.iter()) {
					*q += r.norm();
				}
			}

			let (idx, peak) = argmax(&accumulator);
			if peak > best_match.metric {
				let mean:f64 = accumulator.iter().sum::<f64>() / (len_fft as f64);
				best_match = AcquisitionResult{ metric: peak, code_phase: code_length * ((idx as f64) / (n as f64)),
					doppler_hz, peak_to_mean: peak / mean };
				best_idx = idx;
				debug!("PRN {} {}: new best at {} [Hz], index {}, metric {:.1}", self.prn, self.signal.name, doppler_hz, idx, peak);
			}
		}

		best_match.code_phase = code_phase_from_index(best_idx, n, code_length);

		info!("PRN {} {}: doppler {:.1} [Hz], metric {:.1}, code phase {:.1} [chips], peak/mean {:.2}",
			self.prn, self.signal.name, best_match.doppler_hz, best_match.metric, best_match.code_phase, best_match.peak_to_mean);

		Ok(best_match)
	}

}

/// First index of the largest value; an all-zero input gives (0, 0.0)
pub fn argmax(x:&[f64]) -> (usize, f64) {
	x.iter().enumerate().fold((0, 0.0), |(best_idx, best), (idx, v)| if *v > best { (idx, *v) } else { (best_idx, best) })
}

/// Indices past n come from the zero-padded half of the correlation and wrap back into one code period
pub fn code_phase_from_index(idx:usize, n:usize, code_length:f64) -> f64 {
	(code_length * ((idx as f64) / (n as f64))) % code_length
}
