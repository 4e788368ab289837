//! Logger backend selection. Everything else logs through the `log` facade.

#[cfg(not(target_os = "android"))]
pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    // A second init (e.g. after a shell relaunch) is harmless.
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(target_os = "android")]
pub fn init() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("wallapp"),
    );
}
