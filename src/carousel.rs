// ABOUTME: Carousel view for the bitacora site
// ABOUTME: Composes navigation, image rotation and panel expansion behind one input surface

use crate::config::CarouselSettings;
use crate::errors::Result;
use crate::expansion::Expansion;
use crate::html;
use crate::images;
use crate::navigator::{NavigationState, SlideNavigator};
use crate::rotator::ImageRotator;
use crate::talks::{Catalog, Talk, TalkId};
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Instant;

/// Everything a viewer can do to the carousel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    /// Keyboard key name as reported by the browser (`ArrowLeft`, `ArrowRight`).
    Key { key: String },
    Previous,
    Next,
    SelectSlide { index: usize },
    SelectImage { index: usize },
    ToggleDescription,
    ToggleQuestions,
    Collapse,
    TouchStart { x: f64 },
    TouchMove { x: f64 },
    TouchEnd,
    /// The browser failed to load an image.
    ImageError { src: String },
}

/// What the owner of a view has to do after feeding it an input or a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    /// The rendered output changed.
    pub redraw: bool,
    /// Images for this talk should be fetched and handed to [`CarouselView::images_loaded`].
    pub fetch: Option<TalkId>,
}

impl Update {
    fn redraw() -> Self {
        Self {
            redraw: true,
            fetch: None,
        }
    }

    fn merge(&mut self, other: Update) {
        self.redraw |= other.redraw;
        if other.fetch.is_some() {
            self.fetch = other.fetch;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Previous,
    Next,
}

/// Horizontal drag recogniser for the main panel.
#[derive(Debug, Clone, Default)]
pub struct SwipeGesture {
    start: Option<f64>,
    last: Option<f64>,
}

impl SwipeGesture {
    pub fn start(&mut self, x: f64) {
        self.start = Some(x);
        self.last = None;
    }

    pub fn update(&mut self, x: f64) {
        if self.start.is_some() {
            self.last = Some(x);
        }
    }

    /// Dragging left past the threshold means next, dragging right means previous.
    pub fn finish(&mut self, threshold: f64) -> Option<Swipe> {
        let start = self.start.take()?;
        let last = self.last.take()?;
        let distance = start - last;
        if distance > threshold {
            Some(Swipe::Next)
        } else if distance < -threshold {
            Some(Swipe::Previous)
        } else {
            None
        }
    }
}

/// One viewer's carousel over the talk catalog.
#[derive(Debug, Clone)]
pub struct CarouselView {
    catalog: Catalog,
    settings: CarouselSettings,
    navigator: SlideNavigator,
    rotator: ImageRotator,
    expansion: Expansion,
    swipe: SwipeGesture,
    awaiting: Option<TalkId>,
    broken: HashSet<String>,
}

impl CarouselView {
    pub fn new(catalog: Catalog, settings: CarouselSettings) -> Self {
        let navigator = SlideNavigator::new(catalog.len(), settings.transition);
        Self {
            catalog,
            settings,
            navigator,
            rotator: ImageRotator::new(settings.rotation),
            expansion: Expansion::None,
            swipe: SwipeGesture::default(),
            awaiting: None,
            broken: HashSet::new(),
        }
    }

    /// Request the first talk's images.
    pub fn mount(&mut self) -> Update {
        let talk = self.current_talk_id();
        self.awaiting = Some(talk);
        Update {
            redraw: true,
            fetch: Some(talk),
        }
    }

    pub fn handle(&mut self, input: Input, now: Instant) -> Update {
        match input {
            Input::Key { key } => match key.as_str() {
                "ArrowLeft" => self.navigate(|nav| nav.previous(now)),
                "ArrowRight" => self.navigate(|nav| nav.next(now)),
                _ => Update::default(),
            },
            Input::Previous => self.navigate(|nav| nav.previous(now)),
            Input::Next => self.navigate(|nav| nav.next(now)),
            Input::SelectSlide { index } => self.navigate(|nav| nav.go_to(index, now)),
            Input::SelectImage { index } => {
                if self.rotator.select(index) {
                    Update::redraw()
                } else {
                    Update::default()
                }
            }
            Input::ToggleDescription => {
                self.expansion.toggle_description();
                Update::redraw()
            }
            Input::ToggleQuestions => {
                self.expansion.toggle_questions();
                Update::redraw()
            }
            Input::Collapse => {
                if self.expansion.is_expanded() {
                    self.expansion.collapse();
                    Update::redraw()
                } else {
                    Update::default()
                }
            }
            Input::TouchStart { x } => {
                self.swipe.start(x);
                Update::default()
            }
            Input::TouchMove { x } => {
                self.swipe.update(x);
                Update::default()
            }
            Input::TouchEnd => match self.swipe.finish(self.settings.swipe_threshold) {
                Some(Swipe::Next) => self.navigate(|nav| nav.next(now)),
                Some(Swipe::Previous) => self.navigate(|nav| nav.previous(now)),
                None => Update::default(),
            },
            Input::ImageError { src } => self.mark_broken(src),
        }
    }

    fn navigate(&mut self, request: impl FnOnce(&mut SlideNavigator) -> bool) -> Update {
        if request(&mut self.navigator) {
            Update::redraw()
        } else {
            Update::default()
        }
    }

    fn mark_broken(&mut self, src: String) -> Update {
        if !self.rotator.images().contains(&src) {
            debug!("Ignoring load error for image not on screen: {}", src);
            return Update::default();
        }
        if self.broken.insert(src) {
            Update::redraw()
        } else {
            Update::default()
        }
    }

    /// Drive the transition and rotation timers up to `now`.
    pub fn tick(&mut self, now: Instant) -> Update {
        let mut update = Update::default();

        if let Some(index) = self.navigator.tick(now) {
            let talk = TalkId::from_index(index);
            debug!("Committed slide {}", talk);
            self.expansion.collapse();
            self.rotator.clear();
            self.broken.clear();
            self.awaiting = Some(talk);
            update.merge(Update {
                redraw: true,
                fetch: Some(talk),
            });
        }

        if self.rotator.tick(now) {
            update.merge(Update::redraw());
        }

        update
    }

    /// Apply a fetched image set, unless the viewer has moved on since it was requested.
    pub fn images_loaded(
        &mut self,
        talk: TalkId,
        result: Result<Vec<String>>,
        now: Instant,
    ) -> Update {
        if self.awaiting != Some(talk) || talk != self.current_talk_id() {
            debug!("Discarding stale image listing for talk {}", talk);
            return Update::default();
        }
        self.awaiting = None;

        let images = match result {
            Ok(images) => images,
            Err(e) => {
                warn!("Failed to fetch images for talk {}: {}", talk, e);
                vec![images::fallback_image_path(talk)]
            }
        };

        self.broken.clear();
        self.rotator.set_images(images, now);
        Update::redraw()
    }

    /// Earliest instant at which [`CarouselView::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.navigator.next_deadline(), self.rotator.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn render(&self) -> String {
        html::render_carousel(self)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_talk(&self) -> &Talk {
        &self.catalog.talks()[self.navigator.current_index()]
    }

    pub fn current_talk_id(&self) -> TalkId {
        TalkId::from_index(self.navigator.current_index())
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigator.state()
    }

    pub fn expansion(&self) -> Expansion {
        self.expansion
    }

    pub fn images(&self) -> &[String] {
        self.rotator.images()
    }

    pub fn image_index(&self) -> usize {
        self.rotator.current_index()
    }

    pub fn current_image(&self) -> Option<&str> {
        self.rotator.current()
    }

    pub fn is_broken(&self, src: &str) -> bool {
        self.broken.contains(src)
    }

    /// An image listing has been requested and not yet applied.
    pub fn is_loading_images(&self) -> bool {
        self.awaiting.is_some()
    }
}
