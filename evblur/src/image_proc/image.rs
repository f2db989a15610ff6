use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageIoError {
    #[error("Image error for {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Converts an ndarray view of u8 values to an image::GrayImage
///
/// Array indices [y, x] map to pixel coordinates (x, y). Note that array
/// dimensions are (height, width) while image dimensions are (width, height).
pub fn array2_to_gray_image(arr: ArrayView2<u8>) -> GrayImage {
    let (height, width) = arr.dim();
    let mut img = GrayImage::new(width as u32, height as u32);

    for ((y, x), &value) in arr.indexed_iter() {
        img.put_pixel(x as u32, y as u32, Luma([value]));
    }

    img
}

/// Converts an image::GrayImage into an Array2<u8> of shape (height, width)
pub fn gray_image_to_array2(img: &GrayImage) -> Array2<u8> {
    let (width, height) = img.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        img.get_pixel(x as u32, y as u32)[0]
    })
}

/// Load any image format the `image` crate decodes as 8-bit luma.
pub fn load_gray(path: &Path) -> Result<Array2<u8>, ImageIoError> {
    let img = image::open(path).map_err(|source| ImageIoError::Image {
        path: path.display().to_string(),
        source,
    })?;
    Ok(gray_image_to_array2(&img.to_luma8()))
}

/// Save an array as a grayscale image; the format follows the file extension.
pub fn save_gray(arr: ArrayView2<u8>, path: &Path) -> Result<(), ImageIoError> {
    array2_to_gray_image(arr)
        .save(path)
        .map_err(|source| ImageIoError::Image {
            path: path.display().to_string(),
            source,
        })
}
