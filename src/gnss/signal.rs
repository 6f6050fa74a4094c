
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use log::warn;
use rustfft::num_complex::Complex;

use crate::{AcqErr, nco};
use crate::gnss::{beidou_b1i, galileo_e1c, gps_l1_ca, gps_l2c};

/// Source of a satellite's spreading code.  Implementations must be pure per PRN.
pub trait CodeGenerator: Send + Sync {

	fn name(&self) -> &'static str;

	/// Chips in one period of the code
	fn code_length(&self) -> usize;

	fn prns(&self) -> RangeInclusive<usize>;

	/// One period of the code as +1/-1 chips (logic 0 maps to +1)
	fn chips(&self, prn:usize) -> Result<Vec<i8>, AcqErr>;

	/// Resamples the code by generation: sample `i` takes the chip at `chips + frac + incr*i`, modulo the code length
	fn code(&self, prn:usize, chips:f64, frac:f64, incr:f64, n:usize) -> Result<Vec<Complex<f64>>, AcqErr> {
		let c = self.chips(prn)?;
		Ok(sample_chips(&c, chips, frac, incr, n))
	}

}

pub fn sample_chips(c:&[i8], chips:f64, frac:f64, incr:f64, n:usize) -> Vec<Complex<f64>> {
	let len:f64 = c.len() as f64;
	let start:f64 = chips.rem_euclid(len) + frac;
	(0..n).map(|idx| {
		let chip_idx:usize = (start + incr * (idx as f64)).floor().rem_euclid(len) as usize;
		Complex{ re: c[chip_idx] as f64, im: 0.0 }
	}).collect()
}

pub fn check_prn(generator:&dyn CodeGenerator, prn:usize) -> Result<(), AcqErr> {
	if generator.prns().contains(&prn) { Ok(()) }
	else { Err(AcqErr::InvalidIdentifier{ prn, signal: generator.name() }) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcarrier {
	Boc11,
}

impl Subcarrier {

	pub fn generate(&self, chips:f64, frac:f64, incr:f64, n:usize) -> Vec<f64> { match self {
		Subcarrier::Boc11 => nco::boc11(chips, frac, incr, n),
	}}

}

/// Per-signal defaults for the acquisition programs
#[derive(Debug, Clone)]
pub struct CommandDefaults {
	pub about: &'static str,
	pub carrier: &'static str,
	pub prns: &'static str,
	pub prn_help: &'static str,
	pub doppler_search: &'static str,
	pub time_ms: usize,
	pub cutoff_hz: f64,
	pub prn_width: usize,
}

impl Default for CommandDefaults {
	fn default() -> Self {
		Self { about: "Acquire GNSS signals", carrier: "carrier", prns: "1-32", prn_help: "PRNs to search, e.g. 1,3,7-14,31", doppler_search: "-7000,7000,200",
			time_ms: 80, cutoff_hz: 1.5e6, prn_width: 2 }
	}
}

/// Everything the search engine needs to know about one navigation signal
#[derive(Clone)]
pub struct SignalType {
	pub name: &'static str,
	/// Fixed internal sample rate [samples/sec]
	pub fs: f64,
	/// Coherent integration length `n` [samples]; the correlation runs over 2n
	pub samples_per_block: usize,
	pub block_ms: usize,
	/// Blocks of margin held back from the incoherent sum
	pub reserved_blocks: usize,
	pub subcarrier: Option<Subcarrier>,
	pub defaults: CommandDefaults,
	generator: Arc<dyn CodeGenerator>,
}

impl fmt::Debug for SignalType {
	fn fmt(&self, f:&mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("SignalType")
			.field("name", &self.name)
			.field("fs", &self.fs)
			.field("samples_per_block", &self.samples_per_block)
			.field("block_ms", &self.block_ms)
			.field("reserved_blocks", &self.reserved_blocks)
			.field("subcarrier", &self.subcarrier)
			.field("code_length", &self.code_length())
			.finish()
	}
}

impl SignalType {

	/// Panics unless the block is a positive whole number of milliseconds with a positive whole number of samples in each
	pub fn new(name:&'static str, generator:Arc<dyn CodeGenerator>, fs:f64, samples_per_block:usize, block_ms:usize) -> Self {
		assert!(block_ms > 0, "{}: block_ms must be positive", name);
		assert!(samples_per_block > 0 && samples_per_block % block_ms == 0,
			"{}: {} samples per block doesn't divide into {} [ms]", name, samples_per_block, block_ms);
		Self { name, fs, samples_per_block, block_ms, reserved_blocks: 0, subcarrier: None,
			defaults: CommandDefaults::default(), generator }
	}

	pub fn with_reserved_blocks(mut self, reserved_blocks:usize) -> Self { self.reserved_blocks = reserved_blocks; self }
	pub fn with_subcarrier(mut self, subcarrier:Subcarrier) -> Self { self.subcarrier = Some(subcarrier); self }
	pub fn with_defaults(mut self, defaults:CommandDefaults) -> Self { self.defaults = defaults; self }

	pub fn beidou_b1i() -> Self { beidou_b1i::signal_type() }
	pub fn galileo_e1c(codes:galileo_e1c::MemoryCodes) -> Self { galileo_e1c::signal_type(codes) }
	pub fn gps_l2cm() -> Self { gps_l2c::signal_type() }
	pub fn gps_l1ca() -> Self { gps_l1_ca::signal_type() }

	pub fn generator(&self) -> &dyn CodeGenerator { self.generator.as_ref() }
	pub fn code_length(&self) -> usize { self.generator.code_length() }
	pub fn prns(&self) -> RangeInclusive<usize> { self.generator.prns() }
	pub fn samples_per_ms(&self) -> usize { self.samples_per_block / self.block_ms }

	/// Code chips advanced per sample at the fixed rate
	pub fn chips_per_sample(&self) -> f64 { (self.code_length() as f64) / (self.samples_per_block as f64) }

	pub fn validate_prn(&self, prn:usize) -> Result<(), AcqErr> { check_prn(self.generator(), prn) }

	/// Number of 2n-sample blocks summed incoherently for an integration time
	pub fn incoherent_blocks(&self, integration_ms:usize) -> Result<usize, AcqErr> {
		if integration_ms % self.block_ms != 0 {
			warn!("{} [ms] isn't a multiple of the {} {} [ms] block; the remainder is ignored", integration_ms, self.name, self.block_ms);
		}
		match (integration_ms / self.block_ms).checked_sub(self.reserved_blocks) {
			Some(blocks) if blocks > 0 => Ok(blocks),
			_ => Err(AcqErr::InvalidIntegrationTime{ ms: integration_ms, block_ms: self.block_ms }),
		}
	}

	/// Shortest buffer the search can run on; the last block reads one extra block past its start
	pub fn required_samples(&self, integration_ms:usize) -> Result<usize, AcqErr> {
		Ok((self.incoherent_blocks(integration_ms)? + 1) * self.samples_per_block)
	}

	/// One coherent block of replica, with the sub-carrier applied chip-wise if the signal has one
	pub fn replica(&self, prn:usize) -> Result<Vec<Complex<f64>>, AcqErr> {
		self.validate_prn(prn)?;
		let incr:f64 = self.chips_per_sample();
		let code = self.generator.code(prn, 0.0, 0.0, incr, self.samples_per_block)?;
		Ok(match self.subcarrier {
			Some(sc) => code.into_iter().zip(sc.generate(0.0, 0.0, incr, self.samples_per_block)).map(|(c, s)| c * s).collect(),
			None => code,
		})
	}

}
