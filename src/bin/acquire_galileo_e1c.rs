
extern crate gnss_acquisition;

use gnss_acquisition::AcqErr;
use gnss_acquisition::app;
use gnss_acquisition::gnss::galileo_e1c::{self, MemoryCodes};
use gnss_acquisition::gnss::signal::SignalType;

fn main() {
	std::process::exit(app::main(galileo_e1c::command_defaults(), true, |config| {
		let path = config.codes.as_ref().ok_or_else(|| AcqErr::InvalidCodeTable("no code table given".to_string()))?;
		let codes = MemoryCodes::from_file(path)?;
		log::info!("Loaded {} memory codes from {}", codes.len(), path);
		Ok(SignalType::galileo_e1c(codes))
	}));
}
