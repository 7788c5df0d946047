use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::info;

use crate::api::ApiClient;
use crate::audio::{PlatformAdapter, StatusEvent};
use crate::auth::AuthGuard;
use crate::config;
use crate::playback::PlaybackSession;
use crate::secret::{SecretStore, open_store};

pub type Guard = AuthGuard<ApiClient>;
pub type Session = PlaybackSession<PlatformAdapter<ApiClient>>;

/// Long-lived collaborators shared by the event loop and its tasks.
pub struct Services {
    pub api: ApiClient,
    pub store: Rc<dyn SecretStore>,
    pub guard: Rc<Guard>,
    pub session: Rc<Session>,
}

/// Build the API client, secret store, guard and playback session.
///
/// The audio output thread reports status events on the returned receiver.
pub fn build_services(
    settings: &config::Settings,
) -> Result<(Services, UnboundedReceiver<StatusEvent>), Box<dyn std::error::Error>> {
    let api = ApiClient::new(&settings.server)?;
    let store = open_store(settings);

    let guard = AuthGuard::new(
        api.clone(),
        store.clone(),
        Duration::from_millis(settings.auth.validate_timeout_ms),
    );

    let (status_tx, status_rx) = unbounded_channel();
    let adapter = PlatformAdapter::from_setting(settings.audio.backend, api.clone(), status_tx);
    let session = PlaybackSession::new(
        adapter,
        store.clone(),
        api.base_url(),
        settings.audio.default_volume,
        settings.playback.shuffle,
    );
    info!(
        base_url = api.base_url(),
        backend = ?settings.audio.backend,
        "services ready"
    );

    Ok((
        Services {
            api,
            store,
            guard: Rc::new(guard),
            session: Rc::new(session),
        },
        status_rx,
    ))
}
