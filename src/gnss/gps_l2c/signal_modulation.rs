
use crate::AcqErr;

use super::{CODE_LENGTH, N_PRN};

// Given in IS-GPS-200K, Table 3-IIa
const CM_INITIAL_STATE:[[bool; 27]; N_PRN] = [
	[true,  true,  true,  true,  false, false, false, true,  false, true,  false, false, false, false, true,  true,  true,  true,  true,  true,  false, true,  true,  false, true,  false, false ],	// PRN 01
	[true,  true,  true,  true,  false, true,  true,  true,  false, false, false, false, false, false, true,  true,  false, false, false, false, false, false, true,  true,  true,  false, true  ],	// PRN 02
	[false, false, false, false, false, false, false, true,  false, true,  true,  true,  true,  false, false, true,  true,  true,  false, false, true,  true,  false, false, true,  false, false ],	// PRN 03
	[false, false, false, true,  true,  false, true,  true,  false, false, true,  false, true,  true,  false, true,  false, true,  true,  true,  true,  false, true,  false, true,  false, false ],	// PRN 04
	[true,  true,  false, false, false, false, false, false, true,  true,  false, false, false, false, false, false, true,  true,  true,  false, false, true,  true,  true,  false, false, true  ],	// PRN 05
	[true,  true,  true,  false, false, false, false, true,  true,  false, true,  false, false, true,  true,  false, true,  false, true,  true,  true,  false, true,  true,  false, true,  true  ],	// PRN 06
	[false, false, true,  false, true,  false, true,  false, false, true,  false, true,  false, false, true,  false, false, false, false, false, false, true,  true,  true,  false, false, false ],	// PRN 07
	[true,  true,  false, false, false, true,  true,  true,  true,  false, true,  true,  false, false, true,  true,  true,  false, false, true,  true,  true,  true,  false, false, false, true  ],	// PRN 08
	[false, false, false, true,  false, false, true,  true,  true,  true,  false, true,  true,  false, false, false, false, true,  true,  true,  false, false, true,  false, false, false, true  ],	// PRN 09
	[true,  true,  true,  false, true,  true,  false, true,  true,  false, false, false, false, true,  true,  false, false, true,  false, false, false, true,  false, false, true,  true,  false ],	// PRN 10
	[true,  true,  true,  false, false, true,  false, true,  true,  true,  false, true,  false, false, true,  false, true,  false, false, false, true,  true,  false, false, true,  false, true  ],	// PRN 11
	[false, false, false, false, true,  false, true,  false, false, true,  false, false, false, true,  true,  true,  true,  true,  true,  true,  false, false, false, false, true,  true,  false ],	// PRN 12
	[false, false, false, false, true,  false, false, false, true,  false, true,  false, true,  true,  false, true,  false, false, false, false, false, false, false, false, false, true,  true  ],	// PRN 13
	[false, true,  false, false, true,  true,  false, false, false, true,  true,  false, true,  false, true,  true,  false, true,  false, true,  true,  true,  false, true,  false, false, true  ],	// PRN 14
	[false, false, false, false, false, false, false, false, true,  false, true,  true,  false, false, true,  true,  false, false, true,  false, false, false, false, false, false, false, false ],	// PRN 15
	[false, true,  false, false, true,  false, false, true,  false, false, false, false, false, true,  false, false, false, true,  true,  false, true,  false, false, false, true,  true,  false ],	// PRN 16
	[true,  false, true,  true,  false, false, false, false, false, false, true,  false, true,  true,  false, true,  false, false, false, false, false, false, true,  false, true,  true,  false ],	// PRN 17
	[false, true,  false, false, false, false, true,  false, true,  true,  false, true,  false, true,  false, false, false, true,  true,  true,  true,  false, false, false, true,  false, true  ],	// PRN 18
	[false, false, false, true,  true,  false, true,  false, false, false, false, false, false, true,  false, false, true,  false, false, false, true,  true,  false, false, true,  false, false ],	// PRN 19
	[false, false, true,  false, true,  false, false, false, false, false, false, true,  true,  true,  false, false, false, true,  false, true,  false, true,  true,  true,  true,  false, false ],	// PRN 20
	[false, false, false, true,  false, false, true,  false, false, false, false, false, false, true,  false, false, true,  true,  true,  false, true,  false, true,  true,  false, true,  true  ],	// PRN 21
	[true,  true,  true,  false, true,  false, true,  false, false, true,  true,  true,  true,  false, false, true,  false, false, false, true,  true,  false, true,  false, true,  true,  true  ],	// PRN 22
	[false, false, false, true,  false, false, true,  false, true,  true,  true,  true,  true,  false, false, false, true,  true,  true,  false, true,  true,  true,  true,  true,  true,  true  ],	// PRN 23
	[true,  true,  true,  true,  false, false, false, false, true,  false, true,  false, false, false, false, false, false, true,  true,  true,  false, true,  true,  false, false, false, false ],	// PRN 24
	[true,  true,  true,  false, false, false, false, false, false, false, true,  false, true,  true,  true,  true,  false, false, false, false, true,  false, true,  true,  true,  false, false ],	// PRN 25
	[false, false, false, false, false, true,  false, false, false, false, true,  false, true,  false, false, true,  true,  true,  false, true,  false, true,  true,  false, false, false, true  ],	// PRN 26
	[true,  true,  true,  false, false, true,  false, true,  true,  true,  false, false, false, true,  true,  false, true,  true,  true,  false, false, true,  false, false, true,  false, true  ],	// PRN 27
	[true,  true,  true,  false, true,  true,  true,  true,  true,  false, true,  true,  false, true,  false, true,  false, false, false, false, true,  true,  true,  false, false, true,  false ],	// PRN 28
	[false, true,  true,  false, false, true,  false, false, true,  true,  true,  false, false, true,  false, true,  true,  true,  true,  false, false, false, true,  true,  true,  false, false ],	// PRN 29
	[true,  true,  true,  false, false, true,  false, false, false, true,  false, false, true,  false, true,  false, true,  false, false, false, false, false, false, false, true,  true,  true  ],	// PRN 30
	[true,  true,  true,  false, true,  false, false, true,  false, true,  false, false, true,  true,  false, false, true,  false, false, false, true,  false, true,  true,  false, true,  true  ],	// PRN 31
	[false, false, false, true,  false, true,  false, false, false, false, false, true,  true,  true,  true,  false, true,  false, false, true,  false, false, false, true,  false, true,  true  ]	// PRN 32
	];

/// 27-stage register with the feedback taps of the L2 CM/CL code generator
pub struct ModularShiftRegister {
	pub state: [bool; 27],
}

impl ModularShiftRegister {

	// Stages that take the output fed back into them
	const FEEDBACK_STAGES:[usize; 11] = [3, 6, 8, 11, 14, 16, 18, 21, 22, 23, 24];

	pub fn shift(&mut self) -> bool {
		let current_output:bool = self.state[26];

		for idx in (1..27).rev() {
			self.state[idx] = self.state[idx-1];
		}
		for idx in Self::FEEDBACK_STAGES.iter() {
			self.state[*idx] ^= current_output;
		}
		self.state[0] = current_output;

		current_output
	}

}

pub fn cm_code(prn:usize) -> Result<[bool; CODE_LENGTH], AcqErr> {
	if prn >= 1 && prn <= N_PRN {
		let mut ans:[bool; CODE_LENGTH] = [false; CODE_LENGTH];
		let mut shift_reg = ModularShiftRegister{ state: CM_INITIAL_STATE[prn-1] };
		for idx in 0..CODE_LENGTH {
			ans[idx] = shift_reg.shift();
		}
		Ok(ans)
	} else {
		Err(AcqErr::InvalidIdentifier{ prn, signal: super::NAME })
	}
}
