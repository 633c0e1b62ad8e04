//! Playback selection: which variant and caption track are bound to the player.
//!
//! `PlaybackSelection` is the bare state machine over one variant set.
//! `PlaybackSession` wraps it with a load ticket so a stream response for an
//! episode the viewer has already moved away from is discarded instead of
//! overwriting the newer selection. `PlaybackRegistry` owns all live sessions
//! and pushes every accepted change to the player surface as a `PlayerEvent`.
use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::Serialize;
use tokio::{
    sync::{Mutex, broadcast},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    catalog::Catalog,
    models::{CaptionTrack, PlayerCommand, PlayerEvent, StreamVariant, VariantKind},
    streams::{StreamFetchFailed, StreamResolver},
};

// ── State machine ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Unloaded,
    Loaded {
        kind: VariantKind,
        caption: Option<String>,
    },
    /// Terminal for the current episode: nothing playable was returned.
    NoStream,
}

#[derive(Debug, Clone, Default)]
pub struct PlaybackSelection {
    variants: Vec<StreamVariant>,
    state: SelectionState,
}

impl PlaybackSelection {
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn variants(&self) -> &[StreamVariant] {
        &self.variants
    }

    // Variants without a source cannot be bound to the player.
    fn find(&self, kind: VariantKind) -> Option<&StreamVariant> {
        self.variants
            .iter()
            .find(|v| v.kind == kind && !v.sources.is_empty())
    }

    pub fn active_variant(&self) -> Option<&StreamVariant> {
        match &self.state {
            SelectionState::Loaded { kind, .. } => self.find(*kind),
            _ => None,
        }
    }

    /// The player binding for the current state, if any.
    pub fn command(&self) -> Option<PlayerCommand> {
        let SelectionState::Loaded { caption, .. } = &self.state else {
            return None;
        };
        let source = self.active_variant()?.primary_source()?;
        Some(PlayerCommand {
            source_url: source.file_url.clone(),
            caption_track_url: caption.clone(),
        })
    }

    /// Back to `Unloaded` with no variants.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Take a fresh variant set. Binds `sub` when present; stays `Unloaded`
    /// when only other kinds are playable; `NoStream` when nothing is.
    pub fn load(&mut self, variants: Vec<StreamVariant>) -> Option<PlayerCommand> {
        self.variants = variants;
        self.state = if self.find(VariantKind::Sub).is_some() {
            SelectionState::Loaded {
                kind: VariantKind::Sub,
                caption: None,
            }
        } else if self.variants.iter().any(|v| !v.sources.is_empty()) {
            SelectionState::Unloaded
        } else {
            SelectionState::NoStream
        };
        self.command()
    }

    /// The stream lookup failed; nothing will ever load for this episode.
    pub fn mark_unavailable(&mut self) {
        self.variants.clear();
        self.state = SelectionState::NoStream;
    }

    /// Switch to `kind`, clearing captions. No-op when `kind` is unavailable.
    pub fn switch_variant(&mut self, kind: VariantKind) -> Option<PlayerCommand> {
        if self.find(kind).is_none() {
            debug!("Variant {kind} unavailable, keeping current selection");
            return None;
        }
        self.state = SelectionState::Loaded {
            kind,
            caption: None,
        };
        self.command()
    }

    /// Bind a caption track of the active variant, or clear with `None`.
    /// Ignored outside `Loaded` and for tracks the active variant does not list.
    pub fn select_caption_track(&mut self, file_url: Option<&str>) -> Option<PlayerCommand> {
        if let Some(url) = file_url {
            if !self.active_variant()?.has_caption_track(url) {
                debug!("Caption track {url} not offered by the active variant");
                return None;
            }
        }
        let SelectionState::Loaded { caption, .. } = &mut self.state else {
            return None;
        };
        *caption = file_url.map(str::to_string);
        self.command()
    }
}

// ── Session with stale-response guard ──────────────────────────────────────────

/// Identifies one load; a response is applied only while its ticket is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    episode_id: String,
}

impl LoadTicket {
    pub fn episode_id(&self) -> &str {
        &self.episode_id
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoadResult {
    /// The response was applied; carries the binding if one was made.
    Applied(Option<PlayerCommand>),
    /// A newer load superseded this one; the response was dropped.
    Stale,
}

#[derive(Debug)]
pub struct PlaybackSession {
    id: Uuid,
    episode_id: Option<String>,
    generation: u64,
    pending: bool,
    selection: PlaybackSelection,
    last_touched: Instant,
}

/// Serializable view of one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub episode_id: Option<String>,
    pub loading: bool,
    pub selection: SelectionState,
    pub available_kinds: Vec<VariantKind>,
    pub player: Option<PlayerCommand>,
    pub caption_tracks: Vec<CaptionTrack>,
}

impl PlaybackSession {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            episode_id: None,
            generation: 0,
            pending: false,
            selection: PlaybackSelection::default(),
            last_touched: Instant::now(),
        }
    }

    /// Record viewer activity; idle sessions are evicted by the registry sweep.
    pub fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_touched.elapsed()
    }

    pub fn selection(&self) -> &PlaybackSelection {
        &self.selection
    }

    /// Start loading `episode_id`, superseding any load still in flight.
    pub fn begin_load(&mut self, episode_id: &str) -> LoadTicket {
        self.touch();
        self.generation += 1;
        self.episode_id = Some(episode_id.to_string());
        self.pending = true;
        self.selection.reset();
        LoadTicket {
            generation: self.generation,
            episode_id: episode_id.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
            && self.episode_id.as_deref() == Some(ticket.episode_id.as_str())
    }

    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        response: Result<Vec<StreamVariant>, StreamFetchFailed>,
    ) -> LoadResult {
        if !self.is_current(ticket) {
            return LoadResult::Stale;
        }
        self.pending = false;
        match response {
            Ok(variants) => LoadResult::Applied(self.selection.load(variants)),
            Err(_) => {
                self.selection.mark_unavailable();
                LoadResult::Applied(None)
            }
        }
    }

    pub fn switch_variant(&mut self, kind: VariantKind) -> Option<PlayerCommand> {
        self.touch();
        self.selection.switch_variant(kind)
    }

    pub fn select_caption_track(&mut self, file_url: Option<&str>) -> Option<PlayerCommand> {
        self.touch();
        self.selection.select_caption_track(file_url)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut available_kinds: Vec<VariantKind> = Vec::new();
        for v in self.selection.variants() {
            if !v.sources.is_empty() && !available_kinds.contains(&v.kind) {
                available_kinds.push(v.kind);
            }
        }
        SessionSnapshot {
            session_id: self.id,
            episode_id: self.episode_id.clone(),
            loading: self.pending,
            selection: self.selection.state().clone(),
            available_kinds,
            player: self.selection.command(),
            caption_tracks: self
                .selection
                .active_variant()
                .map(|v| v.caption_tracks.clone())
                .unwrap_or_default(),
        }
    }

    fn event_for(&self, command: Option<PlayerCommand>) -> Option<PlayerEvent> {
        let session_id = self.id;
        let episode_id = self.episode_id.clone()?;
        Some(match (command, self.selection.state()) {
            (Some(cmd), _) => PlayerEvent::Apply {
                session_id,
                episode_id,
                source_url: cmd.source_url,
                caption_track_url: cmd.caption_track_url,
            },
            (None, SelectionState::NoStream) => PlayerEvent::NoStream {
                session_id,
                episode_id,
            },
            (None, _) => PlayerEvent::AwaitingSelection {
                session_id,
                episode_id,
            },
        })
    }
}

// ── Registry ───────────────────────────────────────────────────────────────────

/// All live playback sessions, one per viewer.
#[derive(Debug)]
pub struct PlaybackRegistry<C> {
    sessions: Arc<Mutex<HashMap<Uuid, PlaybackSession>>>,
    streams: StreamResolver<C>,
    events: broadcast::Sender<PlayerEvent>,
}

impl<C> Clone for PlaybackRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            streams: self.streams.clone(),
            events: self.events.clone(),
        }
    }
}

impl<C: Catalog + 'static> PlaybackRegistry<C> {
    pub fn new(streams: StreamResolver<C>, events: broadcast::Sender<PlayerEvent>) -> Self {
        Self {
            sessions: Arc::default(),
            streams,
            events,
        }
    }

    /// Create a session and start loading `episode_id` in the background.
    pub async fn open(&self, episode_id: &str) -> (Uuid, JoinHandle<()>) {
        let id = Uuid::new_v4();
        let ticket = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions
                .entry(id)
                .or_insert_with(|| PlaybackSession::new(id));
            let ticket = session.begin_load(episode_id);
            self.announce_loading(id, &ticket);
            ticket
        };
        info!("Opened playback session {id}");
        (id, self.spawn_load(id, ticket))
    }

    /// Load a (different) episode into an existing session. The previous
    /// load, if still running, is superseded. `None` if the session is gone.
    pub async fn load_episode(&self, id: Uuid, episode_id: &str) -> Option<JoinHandle<()>> {
        let ticket = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions.get_mut(&id)?;
            let ticket = session.begin_load(episode_id);
            // Sent under the lock so `loading` events keep begin_load order.
            self.announce_loading(id, &ticket);
            ticket
        };
        Some(self.spawn_load(id, ticket))
    }

    fn announce_loading(&self, id: Uuid, ticket: &LoadTicket) {
        let _ = self.events.send(PlayerEvent::Loading {
            session_id: id,
            episode_id: ticket.episode_id().to_string(),
        });
    }

    fn spawn_load(&self, id: Uuid, ticket: LoadTicket) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            registry.finish_load(id, ticket).await;
        })
    }

    async fn finish_load(&self, id: Uuid, ticket: LoadTicket) {
        let response = self.streams.fetch_variants(ticket.episode_id()).await;

        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(&id) else {
            debug!("Session {id} closed before episode {} loaded", ticket.episode_id());
            return;
        };

        match session.complete_load(&ticket, response) {
            LoadResult::Stale => {
                debug!(
                    "Discarding stale stream response for episode {} in session {id}",
                    ticket.episode_id()
                );
            }
            LoadResult::Applied(command) => {
                if matches!(session.selection().state(), SelectionState::NoStream) {
                    warn!("No stream available for episode {}", ticket.episode_id());
                }
                if let Some(event) = session.event_for(command) {
                    let _ = self.events.send(event);
                }
            }
        }
    }

    /// `None` if the session does not exist.
    pub async fn switch_variant(&self, id: Uuid, kind: VariantKind) -> Option<SessionSnapshot> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id)?;
        if let Some(command) = session.switch_variant(kind) {
            if let Some(event) = session.event_for(Some(command)) {
                let _ = self.events.send(event);
            }
        }
        Some(session.snapshot())
    }

    /// `None` if the session does not exist.
    pub async fn select_caption_track(
        &self,
        id: Uuid,
        file_url: Option<&str>,
    ) -> Option<SessionSnapshot> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id)?;
        // Fire-and-forget: the player gets the command, nothing is awaited back.
        if let Some(command) = session.select_caption_track(file_url) {
            if let Some(event) = session.event_for(Some(command)) {
                let _ = self.events.send(event);
            }
        }
        Some(session.snapshot())
    }

    pub async fn snapshot(&self, id: Uuid) -> Option<SessionSnapshot> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id)?;
        session.touch();
        Some(session.snapshot())
    }

    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            info!("Closed playback session {id}");
        }
        removed
    }

    /// Drop sessions nobody has touched for `max_idle`. Returns how many went.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.idle_for() < max_idle);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle playback session(s)");
        }
        evicted
    }

    /// Periodically evict idle sessions for as long as the process runs.
    pub fn spawn_idle_sweep(&self, every: Duration, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                registry.evict_idle(max_idle).await;
            }
        })
    }
}
