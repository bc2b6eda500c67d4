use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::{AttackImage, Plane, TargetMask};
use crate::foundation::error::{AttackError, AttackResult};

/// Convert a decoded image into an [`AttackImage`].
///
/// Grayscale sources become one channel, opaque colour three and colour with alpha four.
pub fn attack_image_from_dynamic(img: &image::DynamicImage) -> AttackResult<AttackImage> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let color = img.color();
    let (channels, data) = match (color.has_color(), color.has_alpha()) {
        (false, _) => (1, img.to_luma8().into_raw()),
        (true, false) => (3, img.to_rgb8().into_raw()),
        (true, true) => (4, img.to_rgba8().into_raw()),
    };
    AttackImage::new(width, height, channels, data)
}

/// Decode encoded image bytes into an [`AttackImage`].
pub fn decode_attack_image(bytes: &[u8]) -> AttackResult<AttackImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    attack_image_from_dynamic(&dyn_img)
}

/// Decode a marker image and normalise it into a [`TargetMask`].
///
/// The image is reduced to 8-bit luma; every pixel that differs from `unmarked` is marked.
pub fn decode_target_mask(bytes: &[u8], unmarked: u8) -> AttackResult<TargetMask> {
    let dyn_img = image::load_from_memory(bytes).context("decode mask from memory")?;
    let luma = dyn_img.to_luma8();
    let (width, height) = (luma.width() as usize, luma.height() as usize);
    let plane = Plane::new(width, height, luma.into_raw())?;
    Ok(TargetMask::from_marker_plane(&plane, unmarked))
}

/// Encode an [`AttackImage`] as PNG bytes.
pub fn encode_png(img: &AttackImage) -> AttackResult<Vec<u8>> {
    let color = match img.channels() {
        1 => image::ColorType::L8,
        3 => image::ColorType::Rgb8,
        4 => image::ColorType::Rgba8,
        n => {
            return Err(AttackError::image(format!(
                "cannot encode a {n}-channel image as PNG"
            )));
        }
    };
    let width = u32::try_from(img.width()).map_err(|_| AttackError::image("width exceeds u32"))?;
    let height =
        u32::try_from(img.height()).map_err(|_| AttackError::image("height exceeds u32"))?;

    let mut buf = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut buf),
        img.as_slice(),
        width,
        height,
        color,
        image::ImageFormat::Png,
    )
    .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
