//! Application state management for pitwatch
//!
//! Holds the latest snapshot and error report, applies messages from the
//! refresh task, and handles keyboard input.

use chrono::FixedOffset;
use crossterm::event::{KeyCode, KeyEvent};
use log::error;

use crate::config::Config;
use crate::error::ErrorReport;
use crate::pipeline::{CookSnapshot, CycleStage};
use crate::refresh::RefreshMessage;

/// Main application struct managing state and data
pub struct App {
    /// Cook being watched
    pub cook_id: u64,
    /// Meat target in °F
    pub target_temp: f64,
    /// Offset used to label times
    pub utc_offset: FixedOffset,
    /// Latest successful snapshot; kept on screen when a later cycle fails
    pub snapshot: Option<CookSnapshot>,
    /// Most recent cycle failure, cleared by the next success
    pub last_error: Option<ErrorReport>,
    /// Current pipeline stage
    pub stage: CycleStage,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a refresh has been requested
    pub refresh_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Whether the duty cycle panel is visible
    pub show_duty_cycle: bool,
}

impl App {
    /// Creates a new App for the configured cook
    pub fn new(config: &Config) -> Self {
        Self {
            cook_id: config.cook_id,
            target_temp: config.target_temp,
            utc_offset: config.utc_offset,
            snapshot: None,
            last_error: None,
            stage: CycleStage::Idle,
            should_quit: false,
            refresh_requested: false,
            show_help: false,
            show_duty_cycle: config.show_duty_cycle,
        }
    }

    /// Whether any data has arrived yet
    pub fn has_data(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Applies a message from the refresh task
    pub fn apply(&mut self, message: RefreshMessage) {
        match message {
            RefreshMessage::Stage(stage) => {
                self.stage = stage;
            }
            RefreshMessage::CookUpdated(snapshot) => {
                self.snapshot = Some(*snapshot);
                self.last_error = None;
                self.stage = CycleStage::Rendering;
            }
            RefreshMessage::RefreshError(report) => {
                error!("{}", report);
                self.last_error = Some(report);
                self.stage = CycleStage::Idle;
            }
        }
    }

    /// Called after a frame is drawn; completes the render stage
    pub fn frame_drawn(&mut self) {
        if self.stage == CycleStage::Rendering {
            self.stage = CycleStage::Idle;
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: Quit the application
    /// - `r`: Refresh now
    /// - `d`: Toggle the duty cycle panel
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.refresh_requested = true;
            }
            KeyCode::Char('d') => {
                self.show_duty_cycle = !self.show_duty_cycle;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
