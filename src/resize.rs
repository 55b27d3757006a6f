//! # Resize Module
//!
//! Calcola le dimensioni di destinazione quando un'immagine supera la
//! larghezza massima. Solo la larghezza è vincolata; l'altezza segue
//! l'aspect ratio:
//!
//! ```text
//! new_height = round(height * max_width / width)
//! ```
//!
//! Le immagini non vengono mai ingrandite.

/// Target size for an image of `width` x `height`, or `None` when it
/// already fits within `max_width`
pub fn fit_to_width(width: u32, height: u32, max_width: u32) -> Option<(u32, u32)> {
    if width <= max_width || width == 0 {
        return None;
    }

    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round();
    let new_height = (scaled as u32).max(1);

    Some((max_width, new_height))
}
