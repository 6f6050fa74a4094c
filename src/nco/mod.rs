
use std::f64::consts;

use rustfft::num_complex::Complex;

// Frequencies are normalized to the sample rate [cycles/sample] and phases are in [cycles]

pub fn nco(f:f64, p:f64, n:usize) -> Vec<Complex<f64>> {
	(0..n).map(|idx| {
		let phase:f64 = 2.0 * consts::PI * (f * (idx as f64) + p);
		Complex{ re: phase.cos(), im: phase.sin() }
	}).collect()
}

/// Frequency translation applied destructively to an existing buffer
pub fn mix(x:&mut [Complex<f64>], f:f64, p:f64) {
	for (idx, s) in x.iter_mut().enumerate() {
		let phase:f64 = 2.0 * consts::PI * (f * (idx as f64) + p);
		*s = *s * Complex{ re: phase.cos(), im: phase.sin() };
	}
}

/// BOC(1,1) square-wave sub-carrier: +1 over the first half of each chip and -1 over the second
pub fn boc11(chips:f64, frac:f64, incr:f64, n:usize) -> Vec<f64> {
	(0..n).map(|idx| {
		let p:f64 = chips + frac + incr * (idx as f64);
		let half_chip:i64 = (2.0 * p).floor() as i64;
		if half_chip.rem_euclid(2) == 0 { 1.0 } else { -1.0 }
	}).collect()
}
