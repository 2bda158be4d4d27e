pub mod correlation;
pub mod intent;
pub mod lock;
pub mod moving_average;
pub mod recorder;
pub mod sample;
pub mod ui;
