use crate::gesture::sample::Sample;

/// Angular-rate sensor that produces one sample per data-ready event.
pub trait Gyroscope {
    type Error: core::fmt::Debug;

    /// Programs continuous sampling at the driver's fixed rate and range.
    /// Calling it again with the device already configured is harmless.
    async fn configure(&mut self) -> Result<(), Self::Error>;

    /// Waits for the next data-ready signal and returns that reading in rad/s.
    async fn read_sample(&mut self) -> Result<Sample, Self::Error>;
}

impl<T: Gyroscope> Gyroscope for &mut T {
    type Error = T::Error;

    async fn configure(&mut self) -> Result<(), Self::Error> {
        (**self).configure().await
    }

    async fn read_sample(&mut self) -> Result<Sample, Self::Error> {
        (**self).read_sample().await
    }
}
