
extern crate gnss_acquisition;

use gnss_acquisition::app;
use gnss_acquisition::gnss::beidou_b1i;
use gnss_acquisition::gnss::signal::SignalType;

fn main() {
	std::process::exit(app::main(beidou_b1i::command_defaults(), false, |_| Ok(SignalType::beidou_b1i())));
}
