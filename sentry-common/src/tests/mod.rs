#[cfg(feature = "log")]
use log::LevelFilter;


fn init_logger() {
    #[cfg(feature = "log")]
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Error)
        .filter(Some("sentry_common"), LevelFilter::Trace)
        .is_test(true)
        .try_init();
}
