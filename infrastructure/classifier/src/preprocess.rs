use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageReader, ImageResult, RgbImage};
use tract_onnx::prelude::{IntoTensor, Tensor, tract_ndarray};

use crate::model_handle::InputSize;

/// Decodes an image by content, converts it to RGB and resizes it with
/// nearest-neighbour sampling.
pub fn load_rgb(path: &Path, size: InputSize) -> ImageResult<RgbImage> {
    let decoded = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let rgb = decoded.to_rgb8();
    Ok(imageops::resize(
        &rgb,
        size.width,
        size.height,
        FilterType::Nearest,
    ))
}

/// `[1, height, width, 3]` tensor with every channel scaled to `[0, 1]`.
pub fn to_input_tensor(image: &RgbImage) -> Tensor {
    let (width, height) = image.dimensions();
    let array = tract_ndarray::Array4::from_shape_fn(
        (1, height as usize, width as usize, 3),
        |(_, y, x, channel)| f32::from(image.get_pixel(x as u32, y as u32)[channel]) / 255.0,
    );
    array.into_tensor()
}
