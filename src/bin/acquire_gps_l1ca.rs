
extern crate gnss_acquisition;

use gnss_acquisition::app;
use gnss_acquisition::gnss::gps_l1_ca;
use gnss_acquisition::gnss::signal::SignalType;

fn main() {
	std::process::exit(app::main(gps_l1_ca::command_defaults(), false, |_| Ok(SignalType::gps_l1ca())));
}
