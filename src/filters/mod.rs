
use std::collections::VecDeque;
use std::f64::consts;

use rustfft::num_complex::Complex;

use crate::AcqErr;

pub trait SampleFilter {

	fn apply(&mut self, x:Complex<f64>) -> Complex<f64>;
	fn initialize(&mut self, x0:Complex<f64>);

}

pub struct FirFilter { pub taps: Vec<f64>,
					   history: VecDeque<Complex<f64>> }

impl FirFilter {

	pub fn new(taps:Vec<f64>) -> Self {
		let history = vec![Complex{ re: 0.0, im: 0.0 }; taps.len()].into_iter().collect();
		Self { taps, history }
	}

}

impl SampleFilter for FirFilter {

	fn apply(&mut self, x:Complex<f64>) -> Complex<f64> {
		self.history.pop_back();
		self.history.push_front(x);
		self.taps.iter().zip(self.history.iter()).fold(Complex{ re: 0.0, im: 0.0 }, |acc, (b, h)| acc + *h * *b)
	}

	// Equivalent to a history that has held x0 forever, i.e. the steady-state response to a step of height x0
	fn initialize(&mut self, x0:Complex<f64>) {
		for h in self.history.iter_mut() { *h = x0; }
	}

}

/// Windowed-sinc low-pass design with a symmetric Hann window and unity gain at DC.  The cutoff is
/// normalized so that 1.0 is the Nyquist frequency.
pub fn firwin_hann(n_taps:usize, cutoff:f64) -> Result<Vec<f64>, AcqErr> {
	if n_taps == 0 || n_taps % 2 == 0 {
		return Err(AcqErr::InvalidArgument(format!("low-pass filter needs an odd number of taps, got {}", n_taps)));
	}
	if !(cutoff > 0.0 && cutoff < 1.0) {
		return Err(AcqErr::InvalidArgument(format!("normalized cutoff {} must be in (0, 1)", cutoff)));
	}

	let alpha:f64 = 0.5 * ((n_taps - 1) as f64);
	let h:Vec<f64> = (0..n_taps).map(|k| {
		let m:f64 = (k as f64) - alpha;
		let window:f64 = if n_taps == 1 { 1.0 } else { 0.5 - 0.5 * ((2.0 * consts::PI * (k as f64)) / ((n_taps - 1) as f64)).cos() };
		cutoff * sinc(cutoff * m) * window
	}).collect();

	let gain:f64 = h.iter().sum();
	Ok(h.into_iter().map(|x| x / gain).collect())
}

fn sinc(x:f64) -> f64 {
	if x == 0.0 { 1.0 } else { (consts::PI * x).sin() / (consts::PI * x) }
}

/// Zero-phase filtering: runs the FIR forward then backward over an odd extension of the input so the
/// edges don't ring
pub fn filtfilt(taps:&[f64], x:&[Complex<f64>]) -> Result<Vec<Complex<f64>>, AcqErr> {
	let padlen:usize = 3 * taps.len();
	if x.len() <= padlen {
		return Err(AcqErr::InvalidArgument(format!("filtfilt needs more than {} samples, got {}", padlen, x.len())));
	}

	let first = x[0];
	let last  = x[x.len() - 1];
	let mut ext:Vec<Complex<f64>> = Vec::with_capacity(x.len() + 2*padlen);
	ext.extend((1..=padlen).rev().map(|idx| first*2.0 - x[idx]));
	ext.extend_from_slice(x);
	ext.extend((1..=padlen).map(|idx| last*2.0 - x[x.len() - 1 - idx]));

	let mut filter = FirFilter::new(taps.to_vec());

	filter.initialize(ext[0]);
	let mut y:Vec<Complex<f64>> = ext.into_iter().map(|s| filter.apply(s)).collect();
	y.reverse();

	filter.initialize(y[0]);
	let mut z:Vec<Complex<f64>> = y.into_iter().map(|s| filter.apply(s)).collect();
	z.reverse();

	Ok(z.drain(padlen..(z.len() - padlen)).collect())
}
