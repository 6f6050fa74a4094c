
use std::sync::Arc;

use rustfft::{FFT, FFTplanner};
use rustfft::num_complex::Complex;

/// Forward and inverse plans of one length.  The inverse is scaled by 1/len so that ifft(fft(x)) == x.
pub struct FftPair {
	pub len: usize,
	fft:  Arc<dyn FFT<f64>>,
	ifft: Arc<dyn FFT<f64>>,
}

impl FftPair {

	pub fn new(len:usize) -> Self {
		let fft  = FFTplanner::new(false).plan_fft(len);
		let ifft = FFTplanner::new(true).plan_fft(len);
		Self { len, fft, ifft }
	}

	// The input buffer is used as scratch space by rustfft, so its contents are lost
	pub fn fft(&self, input:&mut [Complex<f64>], output:&mut [Complex<f64>]) {
		self.fft.process(input, output);
	}

	pub fn ifft(&self, input:&mut [Complex<f64>], output:&mut [Complex<f64>]) {
		self.ifft.process(input, output);
		let scale:f64 = 1.0 / (self.len as f64);
		for c in output.iter_mut() { *c = *c * scale; }
	}

}
