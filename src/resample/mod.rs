
use log::info;
use rustfft::num_complex::Complex;

use crate::{AcqErr, SampleBuffer};
use crate::{filters, nco};

pub const DEFAULT_N_TAPS:usize = 161;

/// Converts raw receiver samples at an arbitrary rate into a buffer at a signal type's fixed rate:
/// carrier wipe-off by the nominal offset, zero-phase anti-alias filtering, and linear interpolation
#[derive(Debug, Clone)]
pub struct FrontEnd {
	pub fs_in: f64,
	pub carrier_offset_hz: f64,
	pub cutoff_hz: f64,
	pub n_taps: usize,
}

impl FrontEnd {

	pub fn new(fs_in:f64, carrier_offset_hz:f64, cutoff_hz:f64) -> Self {
		Self { fs_in, carrier_offset_hz, cutoff_hz, n_taps: DEFAULT_N_TAPS }
	}

	/// Input rate and carrier offset both have to be finite, and the rate positive
	pub fn check(&self) -> Result<(), AcqErr> {
		if !(self.fs_in.is_finite() && self.fs_in > 0.0) {
			return Err(AcqErr::InvalidArgument(format!("sample rate must be a positive number, got {}", self.fs_in)));
		}
		if !self.carrier_offset_hz.is_finite() {
			return Err(AcqErr::InvalidArgument(format!("carrier offset must be a number, got {}", self.carrier_offset_hz)));
		}
		Ok(())
	}

	/// Number of raw samples covering `ms` milliseconds at the input rate
	pub fn input_len(&self, ms:usize) -> Result<usize, AcqErr> {
		self.check()?;
		let n:f64 = self.fs_in * 0.001 * (ms as f64);
		if n >= usize::MAX as f64 {
			return Err(AcqErr::InvalidArgument(format!("{} [ms] at {} [samples/sec] is too long to read", ms, self.fs_in)));
		}
		Ok(n as usize)
	}

	pub fn process(&self, mut x:Vec<Complex<f64>>, fs_out:f64, n_out:usize) -> Result<SampleBuffer, AcqErr> {
		self.check()?;
		if !(fs_out.is_finite() && fs_out > 0.0) {
			return Err(AcqErr::InvalidArgument(format!("output rate must be a positive number, got {}", fs_out)));
		}

		info!("Wiping off {} [Hz] carrier offset at {} [samples/sec]", self.carrier_offset_hz, self.fs_in);
		nco::mix(&mut x, -self.carrier_offset_hz / self.fs_in, 0.0);

		let taps = filters::firwin_hann(self.n_taps, self.cutoff_hz / (self.fs_in / 2.0))?;
		info!("Low-pass filtering {} samples with {} taps at {} [Hz]", x.len(), self.n_taps, self.cutoff_hz);
		let x = filters::filtfilt(&taps, &x)?;

		info!("Resampling to {} [samples/sec]", fs_out);
		let step:f64 = self.fs_in / fs_out;
		let samples:Vec<Complex<f64>> = (0..n_out).map(|idx| interp(&x, step * (idx as f64))).collect();

		Ok(SampleBuffer::new(samples, fs_out))
	}

}

/// Linear interpolation at a fractional index, clamped to the end values outside the input
pub fn interp(x:&[Complex<f64>], t:f64) -> Complex<f64> {
	let last:usize = x.len() - 1;
	if t <= 0.0 { return x[0]; }
	if t >= last as f64 { return x[last]; }

	let i0:usize = t.floor() as usize;
	let frac:f64 = t - (i0 as f64);
	x[i0] * (1.0 - frac) + x[i0 + 1] * frac
}
