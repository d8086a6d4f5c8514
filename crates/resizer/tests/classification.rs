use anyhow::Result;
use dom::{Document, NodeKey};
use resizer::{Classification, classify, classify_source};
use url::Url;

fn base() -> Result<Url> {
    Ok(Url::parse("https://x/y/page.html")?)
}

#[test]
fn img_sources_map_to_the_expected_kind() -> Result<()> {
    let base = base()?;
    let cases = [
        ("data:image/svg+xml;base64,PHN2Zz48L3N2Zz4=", Classification::InlineVectorImage),
        ("DATA:image/SVG+xml;utf8,<svg/>", Classification::InlineVectorImage),
        ("https://x/y/z.svg", Classification::ExternalVectorImage),
        ("icons/logo.SVG?v=3", Classification::ExternalVectorImage),
        ("/z.svg#frag", Classification::ExternalVectorImage),
        ("https://x/y/z.png", Classification::RasterImage),
        ("https://x/y/z.svg.png", Classification::RasterImage),
        ("data:image/png;base64,iVBORw0KGgo=", Classification::RasterImage),
        ("not a url", Classification::RasterImage),
        ("http://[::1", Classification::RasterImage),
        ("", Classification::RasterImage),
    ];
    for (src, expected) in cases {
        assert_eq!(classify_source(src, &base), expected, "src {src:?}");
    }
    Ok(())
}

#[test]
fn elements_are_classified_by_tag_and_source() -> Result<()> {
    let mut doc = Document::new(base()?);
    let svg = doc.create_element("svg");
    doc.set_attr(svg, "src", "photo.png")?;
    let external = doc.create_element("img");
    doc.set_attr(external, "src", "diagram.svg")?;
    let bare = doc.create_element("img");
    let div = doc.create_element("div");
    for node in [svg, external, bare, div] {
        doc.append_child(NodeKey::ROOT, node)?;
    }

    assert_eq!(classify(&doc, svg), Some(Classification::VectorMarkup));
    assert_eq!(classify(&doc, external), Some(Classification::ExternalVectorImage));
    assert_eq!(classify(&doc, bare), Some(Classification::RasterImage));
    assert_eq!(classify(&doc, div), None);
    assert_eq!(classify(&doc, NodeKey::ROOT), None);
    Ok(())
}

#[test]
fn relative_sources_resolve_against_the_document_url() -> Result<()> {
    let mut doc = Document::new(Url::parse("https://x/assets.svg/index.html")?);
    let img = doc.create_element("img");
    doc.set_attr(img, "src", "thumb.jpg")?;
    doc.append_child(NodeKey::ROOT, img)?;
    assert_eq!(classify(&doc, img), Some(Classification::RasterImage));

    doc.set_url(Url::parse("https://x/")?);
    doc.set_attr(img, "src", "thumb.svg")?;
    assert_eq!(classify(&doc, img), Some(Classification::ExternalVectorImage));
    Ok(())
}

#[test]
fn only_raster_is_not_vector() {
    assert!(!Classification::RasterImage.is_vector());
    assert!(Classification::InlineVectorImage.is_vector());
    assert!(Classification::ExternalVectorImage.is_vector());
    assert!(Classification::VectorMarkup.is_vector());
}
