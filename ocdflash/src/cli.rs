use clap::Parser;
use ocdflash_lib::FlashRequest;

/// Flash a firmware image with OpenOCD, then verify and reset the target.
///
/// All three arguments are runfiles identifiers, not filesystem paths.
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
pub struct Cli {
    /// Identifier of the OpenOCD executable (without `.exe`)
    #[arg(value_name = "OPENOCD")]
    pub openocd: String,

    /// Identifier of the firmware image
    #[arg(value_name = "FIRMWARE")]
    pub firmware: String,

    /// Identifier of the OpenOCD board configuration script
    #[arg(value_name = "CONFIG")]
    pub config: String,
}

impl Cli {
    pub fn to_request(&self) -> FlashRequest {
        FlashRequest {
            tool: self.openocd.clone(),
            firmware: self.firmware.clone(),
            config: self.config.clone(),
        }
    }
}
