/* Copyright 2026 @TwoCookingMice */

use crate::math::bitmap::Bitmap;

use std::fmt;
use std::path::Path;

use exr::prelude::write_rgb_file;

#[derive(Debug)]
pub enum ImageWriteError {
    EmptyImage,
    Exr(exr::error::Error),
}

impl fmt::Display for ImageWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageWriteError::EmptyImage => write!(f, "image has no pixels"),
            ImageWriteError::Exr(err) => write!(f, "exr error: {}", err),
        }
    }
}

impl std::error::Error for ImageWriteError {}

impl From<exr::error::Error> for ImageWriteError {
    fn from(err: exr::error::Error) -> Self {
        ImageWriteError::Exr(err)
    }
}

// Write EXR Image to file
pub fn write_exr_to_file<P: AsRef<Path>>(image: &Bitmap, file_path: P) -> Result<(), ImageWriteError> {
    let file_path = file_path.as_ref();
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageWriteError::EmptyImage);
    }
    log::info!("Starting writing openexr images: {}.", file_path.display());

    let non_finite = image.count_non_finite();
    if non_finite > 0 {
        log::warn!("{} pixels hold non-finite values.", non_finite);
    }

    write_rgb_file(file_path, image.width(), image.height(), |x, y| {
        let pixel = image[(x, y)];
        (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32)
    })?;

    log::info!("EXR written to: {}.", file_path.display());
    Ok(())
}
