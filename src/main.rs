mod api;
mod app;
mod audio;
mod auth;
mod config;
mod logging;
mod playback;
mod runtime;
mod secret;
mod track;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
