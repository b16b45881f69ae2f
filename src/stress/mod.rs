use thiserror::Error;

mod driver;
mod pool;
mod window;

pub use driver::Stress;
pub use window::WindowRecord;

#[derive(Error, Debug)]
pub enum StressError {
    #[error("no windows could be created")]
    NoWindows,
}
