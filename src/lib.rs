pub mod betting;
pub mod cards;
pub mod errors;
pub mod evaluation;
pub mod game;
pub mod rules;
pub mod table;
pub mod variants;

/// dimensional analysis types
pub type Chips = i64;
pub type Position = usize;
pub type PlayerId = u64;

/// default hand subset, used whenever a rule document leaves cards unnamed
pub const DEFAULT_SUBSET: &str = "default";

/// limit games cap the number of raises per betting round
pub const MAX_RAISE_REPEATS: usize = 3;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// initialize logging to stderr
#[cfg(feature = "server")]
pub fn init() {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        log::LevelFilter::Debug,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .expect("logger init");
}
