// ABOUTME: Library module for the bitacora site.
// ABOUTME: Contains the talk catalog, carousel state machines, rendering and servers.

// Reexport modules
pub mod carousel;
pub mod config;
pub mod errors;
pub mod expansion;
pub mod html;
pub mod images;
pub mod live;
pub mod navigator;
pub mod resources;
pub mod rotator;
pub mod server;
pub mod talks;
pub mod utils;

// Reexport common types and functions
pub use carousel::{CarouselView, Input, Update};
pub use config::{CarouselSettings, Config};
pub use errors::{BitacoraError, Result};
pub use expansion::Expansion;
pub use images::{
    HttpImageSource, ImageDirectoryLister, ImageListing, ImageSource, LocalImageSource,
};
pub use navigator::{Direction, NavigationState, SlideNavigator};
pub use resources::ResourceFile;
pub use rotator::ImageRotator;
pub use server::{Site, SiteServer};
pub use talks::{Catalog, QuestionAnswer, Talk, TalkId};

#[cfg(test)]
mod tests;
