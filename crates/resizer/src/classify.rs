//! Raster/vector classification of visual elements.

use dom::{Document, NodeKey};
use url::Url;

/// Prefix of an inline vector image source.
pub const VECTOR_DATA_URI_PREFIX: &str = "data:image/svg+xml";

/// Path suffix of an external vector image.
pub const VECTOR_EXTENSION: &str = ".svg";

/// The kind of visual element, derived from its tag and source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// An `img` showing a bitmap.
    RasterImage,
    /// An `img` whose source is an inline vector data URI.
    InlineVectorImage,
    /// An `img` whose resolved source path ends in `.svg`.
    ExternalVectorImage,
    /// A literal `svg` element.
    VectorMarkup,
}

impl Classification {
    /// Every kind except `RasterImage` holds vector content.
    pub const fn is_vector(self) -> bool {
        !matches!(self, Self::RasterImage)
    }
}

/// Classify an element of `doc`. `None` for anything that is not `img` or `svg`.
pub fn classify(doc: &Document, node: NodeKey) -> Option<Classification> {
    match doc.tag(node)? {
        "svg" => Some(Classification::VectorMarkup),
        "img" => Some(classify_source(
            doc.attr(node, "src").unwrap_or_default(),
            doc.url(),
        )),
        _ => None,
    }
}

/// Classify an `img` source against the document base. Sources that cannot
/// be resolved are raster.
pub fn classify_source(src: &str, base: &Url) -> Classification {
    let src = src.trim_matches(|ch: char| ch.is_ascii_whitespace());
    let inline = src
        .get(..VECTOR_DATA_URI_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(VECTOR_DATA_URI_PREFIX));
    if inline {
        return Classification::InlineVectorImage;
    }
    match base.join(src) {
        Ok(resolved) if resolved.path().to_ascii_lowercase().ends_with(VECTOR_EXTENSION) => {
            Classification::ExternalVectorImage
        }
        Ok(_) | Err(_) => Classification::RasterImage,
    }
}
