// ABOUTME: Event loop driving the navigation session from terminal input and load completions
// ABOUTME: Loads run as background tasks that report back through a channel

use anyhow::{Context, Result};
use crossterm::event::EventStream;
use futures_util::StreamExt;
use imgcat_core::{
    load_frame, ColorProfile, Command, Event, ExitStatus, ImageFetcher, LoadRequest, Session,
};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::keys;
use crate::terminal;

/// Spawns one task per load request; each task's only effect is an `Event::Loaded`
pub struct LoadDispatcher<F: ImageFetcher + 'static> {
    fetcher: Arc<F>,
    profile: ColorProfile,
    sender: mpsc::UnboundedSender<Event>,
}

impl<F: ImageFetcher + 'static> LoadDispatcher<F> {
    pub fn new(fetcher: F, profile: ColorProfile) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let dispatcher = Self {
            fetcher: Arc::new(fetcher),
            profile,
            sender,
        };
        (dispatcher, receiver)
    }

    pub fn dispatch(&self, request: LoadRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let sender = self.sender.clone();
        let profile = self.profile;

        log::info!("Loading {} at {} rows", request.source, request.rows);

        tokio::spawn(async move {
            let result = load_frame(fetcher.as_ref(), &request, profile).await;
            if sender
                .send(Event::Loaded {
                    ticket: request.ticket,
                    result,
                })
                .is_err()
            {
                log::debug!("Viewer exited before {} finished loading", request.source);
            }
        });
    }
}

pub struct App<F: ImageFetcher + 'static> {
    session: Session,
    dispatcher: LoadDispatcher<F>,
    loads: mpsc::UnboundedReceiver<Event>,
}

impl<F: ImageFetcher + 'static> App<F> {
    pub fn new(session: Session, fetcher: F, profile: ColorProfile) -> Self {
        let (dispatcher, loads) = LoadDispatcher::new(fetcher, profile);
        Self {
            session,
            dispatcher,
            loads,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Feed one event to the session and carry out its command.
    ///
    /// Returns the exit status once the session asks to exit.
    pub fn step(&mut self, event: Event) -> Option<ExitStatus> {
        match self.session.transition(event)? {
            Command::Load(request) => {
                self.dispatcher.dispatch(request);
                None
            }
            Command::Exit(status) => Some(status),
        }
    }

    /// Wait for the next completed load
    pub async fn next_loaded(&mut self) -> Option<Event> {
        self.loads.recv().await
    }

    /// Run until the user quits or dismisses an error
    pub async fn run<W: Write>(&mut self, out: &mut W, initial_rows: u16) -> Result<ExitStatus> {
        let mut input = EventStream::new();

        if let Some(status) = self.step(Event::Resize { rows: initial_rows }) {
            return Ok(status);
        }
        self.draw(out)?;

        loop {
            let event = tokio::select! {
                maybe_event = input.next() => match maybe_event {
                    Some(Ok(raw)) => match keys::translate(raw) {
                        Some(event) => event,
                        None => continue,
                    },
                    Some(Err(e)) => return Err(e).context("Failed to read terminal input"),
                    None => {
                        log::warn!("Terminal input closed");
                        return Ok(ExitStatus::Success);
                    }
                },
                Some(loaded) = self.loads.recv() => loaded,
            };

            if let Some(status) = self.step(event) {
                return Ok(status);
            }
            self.draw(out)?;
        }
    }

    fn draw<W: Write>(&self, out: &mut W) -> Result<()> {
        terminal::draw(out, &self.session.view()).context("Failed to draw to terminal")
    }
}
