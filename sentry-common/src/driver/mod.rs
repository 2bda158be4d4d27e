pub mod clock;
pub mod gyro;
pub mod l3gd20;
