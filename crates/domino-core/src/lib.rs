pub mod belief;
pub mod board;
pub mod combin;
pub mod inference;
pub mod model;
pub mod zone;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "domino-infer"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
