//! Foreground extraction
//!
//! Turns a raw photo into a clean RGBA cutout: decode, normalize EXIF
//! orientation, remove the background through the pluggable matting
//! provider, keep the largest connected foreground region, smooth the mask
//! edges with a morphological closing, and crop to the subject with a small
//! proportional margin.

use image::{imageops, DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::{debug, warn};

use crate::domain::RenderStyle;
use crate::matting::BackgroundRemover;

use super::{apply_alpha_mask, PipelineError};

/// Smallest fraction of total pixel area the winning connected component
/// may cover. Below this, connectivity analysis is considered to have
/// misfired on a noisy alpha channel and the unfiltered mask is kept.
const MIN_KEEP_RATIO: f32 = 0.02;

/// Morphological closing radius for mask edge smoothing.
const CLOSE_RADIUS: u8 = 2;

/// Bounding-box crop margin as a fraction of the longer image dimension.
const BBOX_PAD_RATIO: f32 = 0.04;

/// Extract the garment from an encoded photo as a tightly cropped cutout.
///
/// Decode failure is fatal for the request. An empty mask after matting is
/// a degenerate case, not an error: the uncropped image passes through with
/// a fully transparent alpha channel.
pub fn extract_subject(
    bytes: &[u8],
    style: RenderStyle,
    matter: &dyn BackgroundRemover,
) -> Result<RgbaImage, PipelineError> {
    let decoded = image::load_from_memory(bytes).map_err(PipelineError::Decode)?;
    let oriented = normalize_orientation(decoded, bytes);
    let source = oriented.to_rgba8();

    let cut = matter.remove_background(&source)?;
    let mask = subject_mask(&cut);

    let (w, h) = cut.dimensions();
    let mut cutout = match style {
        RenderStyle::Silhouette => RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])),
        RenderStyle::Preserve => cut,
    };
    apply_alpha_mask(&mut cutout, &mask);

    debug!(
        width = w,
        height = h,
        style = %style,
        backend = matter.name(),
        "Extracted subject"
    );

    Ok(crop_to_mask(&cutout, &mask, BBOX_PAD_RATIO))
}

/// Apply the photo's embedded orientation so pixels match the display
/// orientation. A sideways photo left unrotated silently corrupts all
/// downstream geometry, so this runs before anything else touches pixels.
fn normalize_orientation(image: DynamicImage, raw: &[u8]) -> DynamicImage {
    match exif_orientation(raw) {
        Some(2) => image.fliph(),
        Some(3) => image.rotate180(),
        Some(4) => image.flipv(),
        Some(5) => image.rotate90().fliph(),
        Some(6) => image.rotate90(),
        Some(7) => image.rotate270().fliph(),
        Some(8) => image.rotate270(),
        _ => image,
    }
}

fn exif_orientation(raw: &[u8]) -> Option<u32> {
    let exif = exif::Reader::new()
        .read_from_container(&mut std::io::Cursor::new(raw))
        .ok()?;
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

/// Clean binary subject mask: largest connected alpha component, edges
/// smoothed by a closing.
fn subject_mask(cut: &RgbaImage) -> GrayImage {
    let (w, h) = cut.dimensions();
    let binary = GrayImage::from_fn(w, h, |x, y| {
        Luma([if cut.get_pixel(x, y).0[3] > 0 { 255 } else { 0 }])
    });
    let main = largest_component(&binary, MIN_KEEP_RATIO);
    close(&main, Norm::LInf, CLOSE_RADIUS)
}

/// Keep only the largest connected region of a binary mask.
///
/// Four-connectivity, matching the reference segmentation. With zero or one
/// component there is nothing to choose between; and if the winner covers
/// less than `min_keep` of the image, the unfiltered mask is returned so a
/// valid subject is never destroyed by a misfired labelling.
fn largest_component(binary: &GrayImage, min_keep: f32) -> GrayImage {
    let labels = connected_components(binary, Connectivity::Four, Luma([0u8]));
    let max_label = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0);
    if max_label <= 1 {
        return binary.clone();
    }

    let mut sizes = vec![0u32; (max_label + 1) as usize];
    for p in labels.pixels() {
        sizes[p.0[0] as usize] += 1;
    }
    sizes[0] = 0;
    let winner = sizes
        .iter()
        .enumerate()
        .max_by_key(|(_, size)| **size)
        .map(|(label, _)| label as u32)
        .unwrap_or(0);

    let total = binary.width() as u64 * binary.height() as u64;
    if (sizes[winner as usize] as f32) < total as f32 * min_keep {
        warn!(
            winner_px = sizes[winner as usize],
            total_px = total,
            "Largest component below keep threshold, falling back to unfiltered mask"
        );
        return binary.clone();
    }

    let (w, h) = binary.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        Luma([if labels.get_pixel(x, y).0[0] == winner { 255 } else { 0 }])
    })
}

/// Crop to the mask's bounding box plus a proportional margin on all sides.
/// An empty mask returns the image uncropped.
fn crop_to_mask(image: &RgbaImage, mask: &GrayImage, pad_ratio: f32) -> RgbaImage {
    let Some((min_x, min_y, max_x, max_y)) = mask_bbox(mask) else {
        return image.clone();
    };
    let (w, h) = image.dimensions();
    let pad = (w.max(h) as f32 * pad_ratio) as i64;

    let x0 = (min_x as i64 - pad).max(0) as u32;
    let y0 = (min_y as i64 - pad).max(0) as u32;
    let x1 = (max_x as i64 + 1 + pad).min(w as i64) as u32;
    let y1 = (max_y as i64 + 1 + pad).min(h as i64) as u32;

    imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image()
}

/// Inclusive bounding box of nonzero mask pixels, or `None` if empty.
fn mask_bbox(mask: &GrayImage) -> Option<(u32, u32, u32, u32)> {
    let mut bbox: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in mask.enumerate_pixels() {
        if p.0[0] == 0 {
            continue;
        }
        bbox = Some(match bbox {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }
    bbox
}
