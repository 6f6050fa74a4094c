
/// Fibonacci (external feedback) shift register.  Stages are numbered from 1 the way the interface
/// documents number them; stage 1 receives the feedback and the last stage is the conventional output.
pub struct FibonacciShiftRegister {
	pub state: Vec<bool>,
	taps: &'static [usize],
}

impl FibonacciShiftRegister {

	pub fn new(state:Vec<bool>, taps:&'static [usize]) -> Self { Self { state, taps } }

	pub fn stage(&self, s:usize) -> bool { self.state[s-1] }

	pub fn output(&self) -> bool { self.state[self.state.len()-1] }

	pub fn shift(&mut self) {
		let feedback:bool = self.taps.iter().fold(false, |acc, s| acc ^ self.state[s-1]);
		self.state.rotate_right(1);
		self.state[0] = feedback;
	}

}
