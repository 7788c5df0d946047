//! Application module: the view model drawn by `ui` and driven by `runtime`.
//!
//! `App` lives in `app::model`; the per-screen state (login form, search
//! results, playlists, playlist picker) lives in `app::views`.

mod model;
mod views;

pub use model::*;
pub use views::*;
