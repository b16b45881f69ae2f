use std::error::Error;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::stress::Stress;
use crate::x11::X11Adapter;

mod config;
mod server;
mod stress;
mod x11;

fn main() -> Result<(), Box<dyn Error>> {
    let _log2 = log2::stdout().module(false).level("info").start();

    let config = config::load_config()?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let display_name = std::env::var("DISPLAY")?;
    let server = X11Adapter::new(&display_name)?;

    let mut stress = Stress::new(server, rng, config)?;
    stress.run();
    Ok(())
}
