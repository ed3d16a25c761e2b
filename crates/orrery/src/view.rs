//! One mounted view: the 3D scene plus the card carousel drawn over it.
//!
//! Both are scoped to the view. [`View::close`] tears down the scene (frame
//! request, input listeners, surface, GPU resources), stops the carousel timer
//! and releases the deck and the node label marker.

use std::time::Instant;

use carousel::{CardLayout, CardMotion, RotationQueue};
use engine_core::{GraphicsDevice, Viewport};
use glam::Vec2;
use input::PageScroll;
use scene::{FrameScheduler, SceneConfig, SceneError, Stage};
use winit::event::WindowEvent;

use crate::config::OrreryConfig;
use crate::deck::{Card, CardDeck};
use crate::label::LabelMarker;

pub struct View<D: GraphicsDevice, S: FrameScheduler> {
    stage: Stage<D, S>,
    config: SceneConfig,
    page: PageScroll,
    cards: Vec<Card>,
    carousel: RotationQueue<usize>,
    motion: CardMotion<usize>,
    deck: CardDeck,
    marker: LabelMarker,
    hovering: bool,
}

impl<D, S> View<D, S>
where
    D: GraphicsDevice,
    D::Mount: Clone,
    S: FrameScheduler,
{
    /// Build the scene on `mount` and start the carousel.
    pub fn open(
        device: D,
        scheduler: S,
        mount: D::Mount,
        viewport: Viewport,
        settings: &OrreryConfig,
        now: Instant,
    ) -> Result<Self, SceneError> {
        let config = settings.scene_config();
        let mut stage = Stage::new(device, scheduler, viewport);
        stage.create(config.clone(), mount, viewport, now)?;

        let cards = settings.cards();
        let layout = CardLayout::new(settings.card_vertical_distance);
        // On error the stage is dropped, which tears the scene down
        let mut deck = CardDeck::new(stage.device_mut(), &cards, layout)?;
        let marker = match LabelMarker::new(stage.device_mut()) {
            Ok(marker) => marker,
            Err(err) => {
                deck.release(stage.device_mut());
                return Err(err.into());
            }
        };
        let carousel = RotationQueue::new(0..cards.len(), settings.carousel_interval(), now)
            .with_pause_on_hover(settings.pause_on_hover);
        let motion = CardMotion::settled(layout, carousel.iter().copied());

        Ok(Self {
            stage,
            config,
            page: PageScroll::new(settings.page_height, settings.line_height),
            cards,
            carousel,
            motion,
            deck,
            marker,
            hovering: false,
        })
    }

    pub fn stage(&self) -> &Stage<D, S> {
        &self.stage
    }

    pub fn carousel(&self) -> &RotationQueue<usize> {
        &self.carousel
    }

    /// Label of the card at the front of the stack.
    pub fn front_label(&self) -> Option<&str> {
        let front = self.carousel.iter().next()?;
        self.cards.get(*front).map(|card| card.label.as_str())
    }

    /// Configuration of the current (or last) scene.
    pub fn scene_config(&self) -> &SceneConfig {
        &self.config
    }

    /// Feed scroll and pointer events to the input tracker.
    pub fn on_window_input(&mut self, event: &WindowEvent) -> bool {
        self.stage.input_mut().process_window_event(&mut self.page, event)
    }

    /// Cursor moved to `cursor` (logical pixels): track hovering over the deck.
    pub fn on_cursor(&mut self, cursor: Vec2, now: Instant) {
        let viewport = self.stage.input().viewport();
        let over = self.deck.hit(cursor, self.carousel.len(), &viewport);
        self.set_hovering(over, now);
    }

    pub fn on_cursor_left(&mut self, now: Instant) {
        self.set_hovering(false, now);
    }

    fn set_hovering(&mut self, hovering: bool, now: Instant) {
        if hovering == self.hovering {
            return;
        }
        self.hovering = hovering;
        if hovering {
            self.carousel.hover_enter(now);
        } else {
            self.carousel.hover_leave(now);
        }
    }

    /// A click on the deck brings the next card to the front.
    pub fn on_click(&mut self, now: Instant) -> bool {
        if !self.hovering {
            return false;
        }
        self.carousel.advance();
        self.rotated(now);
        true
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        self.stage.resize(viewport);
        // Keep the scroll offset inside the new page bounds
        let offset = self.page.scroll_by(0.0, viewport.height);
        self.stage.input_mut().on_scroll(offset, self.page.document_height());
    }

    pub fn toggle_theme(&mut self, now: Instant) -> Result<(), SceneError> {
        self.rebuild(self.config.with_theme(self.config.theme.toggled()), now)
    }

    pub fn toggle_kind(&mut self, now: Instant) -> Result<(), SceneError> {
        self.rebuild(self.config.with_kind(self.config.kind.next()), now)
    }

    fn rebuild(&mut self, config: SceneConfig, now: Instant) -> Result<(), SceneError> {
        let viewport = self.stage.input().viewport();
        self.stage.recreate(config.clone(), viewport, now)?;
        self.config = config;
        // The new scene starts from the current page position
        let offset = self.page.offset();
        self.stage.input_mut().on_scroll(offset, self.page.document_height());
        Ok(())
    }

    /// Fire the carousel timer if due. Returns when it next needs a wake-up.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        if self.carousel.poll(now) {
            self.rotated(now);
        }
        self.carousel.next_deadline()
    }

    /// The display refreshed.
    pub fn redraw(&mut self, now: Instant) -> Result<bool, SceneError> {
        let viewport = self.stage.input().viewport();
        let mut overlay = self.deck.overlay(&self.motion.poses(now), &viewport);
        overlay.extend(self.marker.draws(self.stage.hovered_node()));
        self.stage.on_refresh(now, &overlay)
    }

    /// Tear everything down. Safe to call more than once.
    pub fn close(&mut self) {
        if let Some(handle) = self.stage.live_handle() {
            self.stage.destroy(handle);
        }
        self.carousel.stop();
        self.deck.release(self.stage.device_mut());
        self.marker.release(self.stage.device_mut());
    }

    /// The queue order changed: start the cards moving towards it.
    fn rotated(&mut self, now: Instant) {
        self.motion.retarget(self.carousel.iter().copied(), now);
        if let Some(label) = self.front_label() {
            log::debug!("Carousel front card: {}", label);
        }
    }
}

impl<D: GraphicsDevice, S: FrameScheduler> Drop for View<D, S> {
    fn drop(&mut self) {
        self.carousel.stop();
        self.deck.release(self.stage.device_mut());
        self.marker.release(self.stage.device_mut());
    }
}
