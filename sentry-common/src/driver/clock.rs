/// Monotonic milliseconds since an arbitrary epoch.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

impl<T: Clock> Clock for &T {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}
