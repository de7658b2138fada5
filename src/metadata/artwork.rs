//! Embedded artwork, one variant per tag family that can carry pictures.

use lofty::tag::{Tag, TagType};

/// A single embedded picture, detached from the tag it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtFrame {
    pub description: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedArt {
    /// ID3v2 `APIC` frames.
    Framed(Vec<ArtFrame>),
    /// MP4 `covr` atom list.
    AtomList(Vec<ArtFrame>),
    /// FLAC/Vorbis picture blocks.
    BlockPicture(Vec<ArtFrame>),
}

impl EmbeddedArt {
    /// Classify a lofty tag. Tag families that never carry pictures yield `None`.
    pub fn from_tag(tag: &Tag) -> Option<Self> {
        let frames: Vec<ArtFrame> = tag
            .pictures()
            .iter()
            .map(|p| ArtFrame {
                description: p.description().map(str::to_string),
                data: p.data().to_vec(),
            })
            .collect();

        match tag.tag_type() {
            TagType::Id3v2 => Some(EmbeddedArt::Framed(frames)),
            TagType::Mp4Ilst => Some(EmbeddedArt::AtomList(frames)),
            TagType::VorbisComments => Some(EmbeddedArt::BlockPicture(frames)),
            _ => None,
        }
    }

    fn priority(&self) -> u8 {
        match self {
            EmbeddedArt::Framed(_) => 0,
            EmbeddedArt::AtomList(_) => 1,
            EmbeddedArt::BlockPicture(_) => 2,
        }
    }

    /// The first usable image carried by this tag.
    pub fn first_artwork(&self) -> Option<Vec<u8>> {
        let usable = |f: &&ArtFrame| !f.data.is_empty();
        match self {
            // The undescribed APIC frame is the conventional cover slot.
            EmbeddedArt::Framed(frames) => frames
                .iter()
                .filter(usable)
                .find(|f| f.description.as_deref().is_none_or(str::is_empty))
                .or_else(|| frames.iter().find(usable))
                .map(|f| f.data.clone()),
            EmbeddedArt::AtomList(frames) | EmbeddedArt::BlockPicture(frames) => {
                frames.iter().find(usable).map(|f| f.data.clone())
            }
        }
    }
}

/// Pick artwork across several tag families: framed, then atom, then block
/// pictures; the first non-empty one wins.
pub fn first_artwork(mut arts: Vec<EmbeddedArt>) -> Option<Vec<u8>> {
    arts.sort_by_key(EmbeddedArt::priority);
    arts.iter().find_map(EmbeddedArt::first_artwork)
}
