
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::AcqErr;
use crate::gnss::signal::{CodeGenerator, CommandDefaults, SignalType};

pub mod signal_modulation;

pub const NAME:&str = "GPS L2CM";

pub const CODE_LENGTH:usize = 10230;
pub const N_PRN:usize = 32;

pub const FS:f64 = 4.096e6;
// One full 20 [ms] CM period per coherent block
pub const SAMPLES_PER_BLOCK:usize = 81920;
pub const BLOCK_MS:usize = 20;

pub struct CmCode;

impl CodeGenerator for CmCode {

	fn name(&self) -> &'static str { NAME }
	fn code_length(&self) -> usize { CODE_LENGTH }
	fn prns(&self) -> RangeInclusive<usize> { 1..=N_PRN }

	fn chips(&self, prn:usize) -> Result<Vec<i8>, AcqErr> {
		Ok(signal_modulation::cm_code(prn)?.iter().map(|b| if *b { -1 } else { 1 }).collect())
	}

}

pub fn signal_type() -> SignalType {
	SignalType::new(NAME, Arc::new(CmCode), FS, SAMPLES_PER_BLOCK, BLOCK_MS)
		.with_reserved_blocks(1)
		.with_defaults(command_defaults())
}

pub fn command_defaults() -> CommandDefaults {
	CommandDefaults {
		about: "Acquire GPS L2CM signals",
		carrier: "L2C",
		prns: "1-32",
		prn_help: "PRNs to search, e.g. 1,3,7-14,31",
		doppler_search: "-7000,7000,20",
		time_ms: 80,
		cutoff_hz: 1.5e6,
		prn_width: 3,
	}
}
