//! Metadata resolution: turns a `DiscoveryRequest` into a `Track` by merging
//! a synchronous tag reader with an asynchronous container prober.

mod artwork;
mod merge;
mod probe;
mod resolve;
mod tags;

pub use artwork::{ArtFrame, EmbeddedArt, first_artwork};
pub use merge::merge;
pub use probe::{LoftyProber, ProbeReport, Prober, TimedProber};
pub use resolve::Resolver;
pub use tags::{LoftyTagReader, TagReader, TagReport};

#[cfg(test)]
mod tests;
