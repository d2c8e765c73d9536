// ABOUTME: Navigation state machine for browsing a fixed list of image references
// ABOUTME: Pure transition function turning input, resize and load events into commands

use thiserror::Error;

use crate::error::ImageError;
use crate::raster::TerminalFrame;
use crate::source::ImageSource;

/// Lines below the image reserved for the footer
pub const FOOTER_LINES: u16 = 1;

const SPARKLES: &str = "✨";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no images to show")]
pub struct NoImages;

/// Keyboard input after mapping from raw key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Next,
    Previous,
    Quit,
    Other,
}

/// Identifies one load request. Only the most recent ticket is ever accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub source: ImageSource,
    /// Text rows available to the rasterized image
    pub rows: u32,
}

#[derive(Debug)]
pub enum Event {
    Resize { rows: u16 },
    Key(Key),
    Loaded {
        ticket: LoadTicket,
        result: Result<TerminalFrame, ImageError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(LoadRequest),
    Exit(ExitStatus),
}

#[derive(Debug)]
pub enum State {
    /// Viewport size not known yet
    Idle,
    Loading {
        index: usize,
    },
    Displaying {
        index: usize,
        frame: TerminalFrame,
    },
    Failed {
        error: ImageError,
    },
}

#[derive(Debug)]
pub struct Session {
    sources: Vec<ImageSource>,
    selected: usize,
    viewport_height: Option<u16>,
    generation: u64,
    state: State,
}

impl Session {
    pub fn new(sources: Vec<ImageSource>) -> Result<Self, NoImages> {
        if sources.is_empty() {
            return Err(NoImages);
        }

        Ok(Self {
            sources,
            selected: 0,
            viewport_height: None,
            generation: 0,
            state: State::Idle,
        })
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_source(&self) -> &ImageSource {
        &self.sources[self.selected]
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn viewport_height(&self) -> Option<u16> {
        self.viewport_height
    }

    /// Text rows handed to the rasterizer, leaving room for the footer
    pub fn image_rows(&self) -> Option<u32> {
        self.viewport_height
            .map(|h| u32::from(h.saturating_sub(FOOTER_LINES).max(1)))
    }

    /// Apply one event and return the follow-up command, if any
    pub fn transition(&mut self, event: Event) -> Option<Command> {
        if matches!(self.state, State::Failed { .. }) {
            return match event {
                Event::Key(_) => Some(Command::Exit(ExitStatus::Failure)),
                _ => None,
            };
        }

        match event {
            Event::Resize { rows } => {
                self.viewport_height = Some(rows);
                self.begin_load()
            }
            Event::Key(Key::Quit) => Some(Command::Exit(ExitStatus::Success)),
            Event::Key(Key::Next) => {
                self.selected = (self.selected + 1) % self.sources.len();
                self.begin_load()
            }
            Event::Key(Key::Previous) => {
                let len = self.sources.len();
                self.selected = (self.selected + len - 1) % len;
                self.begin_load()
            }
            Event::Key(Key::Other) => None,
            Event::Loaded { ticket, result } => {
                self.complete_load(ticket, result);
                None
            }
        }
    }

    /// Issue a load for the selected reference once the viewport is known
    fn begin_load(&mut self) -> Option<Command> {
        let rows = self.image_rows()?;

        self.generation += 1;
        self.state = State::Loading {
            index: self.selected,
        };

        Some(Command::Load(LoadRequest {
            ticket: LoadTicket(self.generation),
            source: self.selected_source().clone(),
            rows,
        }))
    }

    fn complete_load(&mut self, ticket: LoadTicket, result: Result<TerminalFrame, ImageError>) {
        let index = match self.state {
            State::Loading { index } if ticket == LoadTicket(self.generation) => index,
            _ => {
                match &result {
                    Ok(_) => log::debug!("Dropping stale frame for load {:?}", ticket),
                    Err(e) => log::debug!("Dropping stale error for load {:?}: {}", ticket, e),
                }
                return;
            }
        };

        self.state = match result {
            Ok(frame) => State::Displaying { index, frame },
            Err(error) => {
                log::warn!("Failed to load {}: {}", self.sources[index], error);
                State::Failed { error }
            }
        };
    }

    /// Text for the whole screen, a pure function of the current state
    pub fn view(&self) -> String {
        match &self.state {
            State::Idle => format!("loading {} {}", self.selected_source(), SPARKLES),
            State::Loading { index } => format!("loading {} {}", self.sources[*index], SPARKLES),
            State::Displaying { index, frame } => {
                let mut out = frame.render();
                out.push_str(&self.footer(*index));
                out
            }
            State::Failed { error } => {
                format!("couldn't load image(s): {}\n\npress any key to exit", error)
            }
        }
    }

    fn footer(&self, index: usize) -> String {
        if self.sources.len() > 1 {
            format!(
                "q to quit | {} [{}/{}]",
                self.sources[index],
                index + 1,
                self.sources.len()
            )
        } else {
            format!("q to quit | {}", self.sources[index])
        }
    }
}
